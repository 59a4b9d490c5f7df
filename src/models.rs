use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_consumed_ml: f64,
    pub progress_percentage: f64,
    pub hydration_status: String,
    pub remaining_ml: f64,
    pub goal_ml: f64,
    pub drink_count: u32,
}

impl DailySummary {
    /// Adds one drink and recomputes the derived fields.
    pub fn add_drink(&mut self, amount_ml: f64) {
        self.total_consumed_ml += amount_ml;
        self.remaining_ml = remaining_ml(self.total_consumed_ml, self.goal_ml);
        self.progress_percentage = progress_percentage(self.total_consumed_ml, self.goal_ml);
        self.drink_count = self.drink_count.saturating_add(1);
    }
}

pub fn remaining_ml(total_ml: f64, goal_ml: f64) -> f64 {
    (goal_ml - total_ml).max(0.0)
}

/// Not clamped: over-achieving days report more than 100.
pub fn progress_percentage(total_ml: f64, goal_ml: f64) -> f64 {
    if goal_ml <= 0.0 {
        return 0.0;
    }
    total_ml * 100.0 / goal_ml
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub amount_ml: f64,
    pub rfid_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// Monday first.
    pub daily_totals: Vec<f64>,
    pub weekly_average: f64,
    pub best_day: f64,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInfo {
    pub rfid_tag: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_used: DateTime<Utc>,
    pub daily_total: f64,
    pub weekly_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub daily_summary: DailySummary,
    pub recent_intakes: Vec<IntakeRecord>,
    pub weekly_report: WeeklyReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkRequest {
    pub rfid_tag: String,
    pub amount_ml: f64,
}

/// Body of `POST /api/drink`; the amount defaults to the configured drink size.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDrinkBody {
    pub amount_ml: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TagSelection {
    pub tag: String,
}

/// Raw settings form; every field arrives as text and is coerced later.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub daily_goal: String,
    #[serde(default)]
    pub default_drink_amount: String,
    #[serde(default)]
    pub notifications: Option<String>,
    #[serde(default)]
    pub reminder_interval: String,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub daily_goal: u32,
    pub default_drink_amount: u32,
    pub notifications: bool,
    pub reminder_interval: u32,
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: 2000,
            default_drink_amount: 250,
            notifications: true,
            reminder_interval: 60,
            timezone: "UTC".to_string(),
        }
    }
}

/// Accepts RFC 3339 as well as the offset-less `2024-05-01T10:00:00` form,
/// which is read as local time.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
