use chrono::{DateTime, Utc};
use serde::Serialize;

/// Five visual tiers shared by status badges, ring colours and tag dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Excellent,
    Good,
    Moderate,
    Low,
    Critical,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Excellent => "hydration-excellent",
            Severity::Good => "hydration-good",
            Severity::Moderate => "hydration-moderate",
            Severity::Low => "hydration-low",
            Severity::Critical => "hydration-critical",
        }
    }

    pub fn stroke_color(self) -> &'static str {
        match self {
            Severity::Excellent => "#10b981",
            Severity::Good => "#3b82f6",
            Severity::Moderate => "#f59e0b",
            Severity::Low => "#f97316",
            Severity::Critical => "#ef4444",
        }
    }
}

pub fn format_amount(ml: f64) -> String {
    let rounded = ml.round();
    if rounded >= 1000.0 {
        return format!("{:.1}L", ml / 1000.0);
    }
    format!("{rounded}ml")
}

pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_seconds().div_euclid(60);
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    format!("{}d ago", hours / 24)
}

pub fn status_severity(status: &str) -> Severity {
    match status.trim().to_lowercase().as_str() {
        "well hydrated" => Severity::Excellent,
        "good hydration" => Severity::Good,
        "need more water" => Severity::Moderate,
        "dehydrated - drink more!" => Severity::Critical,
        _ => Severity::Low,
    }
}

pub fn percentage_severity(percentage: f64) -> Severity {
    if percentage >= 100.0 {
        Severity::Excellent
    } else if percentage >= 75.0 {
        Severity::Good
    } else if percentage >= 50.0 {
        Severity::Moderate
    } else if percentage >= 25.0 {
        Severity::Low
    } else {
        Severity::Critical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagActivity {
    RecentlyActive,
    ActiveToday,
    Inactive,
}

impl TagActivity {
    pub fn label(self) -> &'static str {
        match self {
            TagActivity::RecentlyActive => "Recently active",
            TagActivity::ActiveToday => "Active today",
            TagActivity::Inactive => "Inactive",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TagActivity::RecentlyActive => "dot-excellent",
            TagActivity::ActiveToday => "dot-moderate",
            TagActivity::Inactive => "dot-muted",
        }
    }
}

pub fn tag_activity(last_used: DateTime<Utc>, now: DateTime<Utc>) -> TagActivity {
    let elapsed = now - last_used;
    if elapsed < chrono::Duration::hours(1) {
        TagActivity::RecentlyActive
    } else if elapsed < chrono::Duration::hours(24) {
        TagActivity::ActiveToday
    } else {
        TagActivity::Inactive
    }
}

pub fn tag_suffix(tag: &str) -> &str {
    let count = tag.chars().count();
    if count <= 4 {
        return tag;
    }
    let start = tag
        .char_indices()
        .nth(count - 4)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &tag[start..]
}

/// Reads a leading integer the way a browser number field is read back:
/// `"300ml"` is 300, while blanks, junk and zero fall back to `default`.
pub fn coerce_ml(input: &str, default: u32) -> u32 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<u32>() {
        Ok(0) | Err(_) => default,
        Ok(_) if negative => default,
        Ok(value) => value,
    }
}
