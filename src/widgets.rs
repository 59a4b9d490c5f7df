//! Stateless HTML fragments. Each function is a pure mapping from already
//! shaped data to markup; none of them touch the network.

use crate::controller::{Notice, NoticeKind};
use crate::format::{format_amount, percentage_severity, tag_activity, tag_suffix, time_ago};
use crate::models::{DailySummary, IntakeRecord, TagInfo};
use crate::stats::{mean, weekly_points};
use chrono::{DateTime, Utc, Weekday};
use std::f64::consts::PI;
use std::fmt::Write;

const RING_RADIUS: f64 = 120.0;
const RING_STROKE: f64 = 12.0;
const ACTIVITY_LIMIT: usize = 8;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub normalized_radius: f64,
    pub circumference: f64,
    pub dash_offset: f64,
}

pub fn ring_geometry(percentage: f64) -> RingGeometry {
    let normalized_radius = RING_RADIUS - RING_STROKE * 2.0;
    let circumference = normalized_radius * 2.0 * PI;
    RingGeometry {
        normalized_radius,
        circumference,
        dash_offset: circumference - (percentage / 100.0) * circumference,
    }
}

/// The ring starts empty and fills to the target after a short delay; the
/// transition is pure CSS so the rendered markup stays deterministic.
pub fn progress_ring(summary: &DailySummary) -> String {
    let geometry = ring_geometry(summary.progress_percentage);
    let severity = percentage_severity(summary.progress_percentage);
    let size = RING_RADIUS * 2.0;

    format!(
        r#"<div class="ring">
  <svg height="{size}" width="{size}" class="ring-svg" aria-hidden="true">
    <circle class="ring-track" fill="transparent" stroke-width="{stroke}" r="{r:.2}" cx="{c}" cy="{c}" />
    <circle class="progress-ring" fill="transparent" stroke="{color}" stroke-width="{stroke}" stroke-linecap="round"
      stroke-dasharray="{circ:.2} {circ:.2}" stroke-dashoffset="{offset:.2}"
      style="--ring-from: {circ:.2}; --ring-to: {offset:.2};" r="{r:.2}" cx="{c}" cy="{c}" />
  </svg>
  <div class="ring-center">
    <span class="ring-value {class}">{pct}%</span>
    <span class="ring-caption">{current}ml of {goal}ml</span>
  </div>
</div>
<div class="badge {class}">{status}</div>"#,
        stroke = RING_STROKE,
        r = geometry.normalized_radius,
        c = RING_RADIUS,
        color = severity.stroke_color(),
        circ = geometry.circumference,
        offset = geometry.dash_offset,
        class = severity.css_class(),
        pct = summary.progress_percentage.round(),
        current = summary.total_consumed_ml.round(),
        goal = summary.goal_ml.round(),
        status = escape_html(&summary.hydration_status),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    fn css_class(self) -> &'static str {
        match self {
            Trend::Up => "trend-up",
            Trend::Down => "trend-down",
            Trend::Neutral => "trend-neutral",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatTile<'a> {
    pub title: &'a str,
    pub value: String,
    pub subtitle: Option<&'a str>,
    pub trend: Trend,
}

pub fn stat_tile(tile: &StatTile<'_>) -> String {
    let subtitle = tile
        .subtitle
        .map(|text| {
            format!(
                r#"<span class="subtitle {}">{}</span>"#,
                tile.trend.css_class(),
                escape_html(text)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="stat"><span class="label">{}</span><span class="value">{}</span>{}</div>"#,
        escape_html(tile.title),
        escape_html(&tile.value),
        subtitle
    )
}

pub fn stat_row(tiles: &[StatTile<'_>]) -> String {
    let mut out = String::from(r#"<section class="panel">"#);
    for tile in tiles {
        out.push_str(&stat_tile(tile));
    }
    out.push_str("</section>");
    out
}

pub fn weekly_chart(totals: &[f64], goal_ml: f64, today: Weekday) -> String {
    let points = weekly_points(totals, goal_ml, today);
    let scale = points
        .iter()
        .map(|point| point.amount_ml)
        .fold(goal_ml, f64::max)
        .max(1.0);

    let mut bars = String::new();
    for point in &points {
        let height = (point.amount_ml / scale * 100.0).clamp(0.0, 100.0);
        let _ = write!(
            bars,
            r#"<div class="bar{today}" title="{amount} - {pct}% of goal"><div class="bar-fill" style="height: {height:.1}%"></div><span class="bar-label">{day}</span></div>"#,
            today = if point.is_today { " today" } else { "" },
            amount = format_amount(point.amount_ml),
            pct = point.percentage_of_goal.round(),
            day = point.day,
        );
    }

    let goal_line = (goal_ml / scale * 100.0).clamp(0.0, 100.0);
    let average = if totals.is_empty() {
        "0L".to_string()
    } else {
        format!("{:.1}L", mean(totals) / 1000.0)
    };

    format!(
        r#"<section class="card chart-card">
  <h3>Weekly Progress</h3>
  <div class="bars" style="--goal-line: {goal_line:.1}%">{bars}</div>
  <div class="chart-footer"><span>Daily Goal: {goal}</span><span>Weekly Avg: {average}</span></div>
</section>"#,
        goal = format_amount(goal_ml),
    )
}

pub fn activity_list(intakes: &[IntakeRecord], now: DateTime<Utc>) -> String {
    if intakes.is_empty() {
        return r#"<section class="card"><h3>Recent Activity</h3><div class="empty"><p>No recent activity</p><p class="hint">Start drinking water to see your activity here</p></div></section>"#.to_string();
    }

    let mut rows = String::new();
    for intake in intakes.iter().take(ACTIVITY_LIMIT) {
        let _ = write!(
            rows,
            r#"<li class="activity"><div><strong>{}</strong><span class="hint">{}</span></div><span class="hint">Tag: {}</span></li>"#,
            format_amount(intake.amount_ml),
            time_ago(intake.timestamp, now),
            escape_html(tag_suffix(&intake.rfid_tag)),
        );
    }

    let more = if intakes.len() > ACTIVITY_LIMIT {
        r#"<p class="more">View all activity</p>"#
    } else {
        ""
    };

    format!(r#"<section class="card"><h3>Recent Activity</h3><ul class="activity-list">{rows}</ul>{more}</section>"#)
}

pub fn tag_card(tag: &TagInfo, goal_ml: f64, now: DateTime<Utc>, tracked: bool) -> String {
    let progress = if goal_ml > 0.0 {
        (tag.daily_total / goal_ml * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let activity = tag_activity(tag.last_used, now);
    let id = escape_html(&tag.rfid_tag);
    let action = if tracked {
        r#"<span class="pill">Tracking</span>"#.to_string()
    } else {
        format!(
            r#"<form method="post" action="/tag"><input type="hidden" name="tag" value="{id}" /><button class="btn-ghost" type="submit">Track this tag</button></form>"#
        )
    };

    format!(
        r#"<div class="card tag-card">
  <div class="tag-head"><div><h3>{name}</h3><span class="hint">{id}</span></div>{action}</div>
  <div class="row"><span class="hint">Today</span><strong>{today}</strong></div>
  <div class="meter"><div class="meter-fill" style="width: {progress:.1}%"></div></div>
  <div class="row"><span class="hint">Weekly Avg</span><span>{weekly}</span></div>
  <div class="row divider"><span class="hint">Last used</span><span>{last_used}</span></div>
  <div class="row"><span class="dot {dot}"></span><span class="hint">{label}</span></div>
</div>"#,
        name = escape_html(&tag.name),
        today = format_amount(tag.daily_total),
        weekly = format_amount(tag.weekly_average),
        last_used = time_ago(tag.last_used, now),
        dot = activity.css_class(),
        label = activity.label(),
    )
}

pub fn notice_banner(notice: Option<&Notice>) -> String {
    let Some(notice) = notice else {
        return String::new();
    };
    let kind = match notice.kind {
        NoticeKind::Info => "info",
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
    };
    format!(
        r#"<div class="status" data-type="{kind}" role="status"><strong>{}</strong> {}</div>"#,
        escape_html(&notice.title),
        escape_html(&notice.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{FallbackData, SampleData};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn ring_geometry_tracks_percentage() {
        let empty = ring_geometry(0.0);
        assert_eq!(empty.normalized_radius, 96.0);
        assert!((empty.dash_offset - empty.circumference).abs() < 1e-9);

        let full = ring_geometry(100.0);
        assert!(full.dash_offset.abs() < 1e-9);
    }

    #[test]
    fn progress_ring_shows_target_and_escapes_status() {
        let mut summary = SampleData.dashboard(now()).daily_summary;
        summary.hydration_status = "<Good> Hydration".to_string();
        let html = progress_ring(&summary);

        assert!(html.contains("83%"));
        assert!(html.contains("1650ml of 2000ml"));
        assert!(html.contains("hydration-good"));
        assert!(html.contains("&lt;Good&gt; Hydration"));
    }

    #[test]
    fn stat_tile_renders_optional_subtitle() {
        let with = stat_tile(&StatTile {
            title: "Best Day",
            value: "2.4L".to_string(),
            subtitle: Some("This week"),
            trend: Trend::Up,
        });
        assert!(with.contains("trend-up"));
        assert!(with.contains("This week"));

        let without = stat_tile(&StatTile {
            title: "Drinks",
            value: "7".to_string(),
            subtitle: None,
            trend: Trend::Neutral,
        });
        assert!(!without.contains("subtitle"));
    }

    #[test]
    fn weekly_chart_highlights_today_and_footer() {
        let totals = [1800.0, 2200.0, 1600.0, 2400.0, 1900.0, 1650.0, 1750.0];
        let html = weekly_chart(&totals, 2000.0, Weekday::Thu);

        assert_eq!(html.matches(r#"class="bar today""#).count(), 1);
        assert!(html.contains("2.4L - 120% of goal"));
        assert!(html.contains("Daily Goal: 2.0L"));
        assert!(html.contains("Weekly Avg: 1.9L"));
        assert!(weekly_chart(&[], 2000.0, Weekday::Thu).contains("Weekly Avg: 0L"));
    }

    #[test]
    fn activity_list_caps_rows_and_shows_empty_state() {
        let record = IntakeRecord {
            id: "1".to_string(),
            timestamp: now() - Duration::minutes(15),
            amount_ml: 250.0,
            rfid_tag: "TAG001".to_string(),
        };
        let many = vec![record.clone(); 10];
        let html = activity_list(&many, now());
        assert_eq!(html.matches(r#"<li class="activity">"#).count(), 8);
        assert!(html.contains("View all activity"));
        assert!(html.contains("15m ago"));
        assert!(html.contains("Tag: G001"));

        let one = activity_list(&many[..1], now());
        assert!(!one.contains("View all activity"));
        assert!(activity_list(&[], now()).contains("No recent activity"));
    }

    #[test]
    fn tag_card_caps_progress_and_labels_activity() {
        let tag = TagInfo {
            rfid_tag: "TAG009".to_string(),
            name: "Desk <Bottle>".to_string(),
            last_used: now() - Duration::hours(30),
            daily_total: 3000.0,
            weekly_average: 1200.0,
        };
        let html = tag_card(&tag, 2000.0, now(), false);
        assert!(html.contains("width: 100.0%"));
        assert!(html.contains("Inactive"));
        assert!(html.contains("Desk &lt;Bottle&gt;"));
        assert!(html.contains(r#"value="TAG009""#));

        assert!(tag_card(&tag, 2000.0, now(), true).contains("Tracking"));
    }

    #[test]
    fn identical_inputs_render_identically() {
        let data = SampleData.dashboard(now());
        assert_eq!(
            activity_list(&data.recent_intakes, now()),
            activity_list(&data.recent_intakes, now())
        );
        assert_eq!(
            progress_ring(&data.daily_summary),
            progress_ring(&data.daily_summary)
        );
    }
}
