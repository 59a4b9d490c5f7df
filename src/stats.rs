use crate::models::{TagInfo, WeeklyReport, progress_percentage};
use chrono::Weekday;
use serde::Serialize;

pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPoint {
    pub day: &'static str,
    pub amount_ml: f64,
    pub percentage_of_goal: f64,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTotals {
    pub active_tags: usize,
    pub today_total_ml: f64,
    /// Mean of the per-tag weekly averages, rounded; zero without tags.
    pub weekly_average_ml: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagShare {
    pub name: String,
    pub amount_ml: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub goal_ml: f64,
    pub average_daily_ml: f64,
    pub best_day_ml: f64,
    pub total_intake_ml: f64,
    pub days_at_goal: usize,
    pub goal_achievement: f64,
    pub current_streak: u32,
    pub days: Vec<DayPoint>,
    pub tag_shares: Vec<TagShare>,
}

/// Labels a Monday-first series. Values past the seventh are ignored.
pub fn weekly_points(totals: &[f64], goal_ml: f64, today: Weekday) -> Vec<DayPoint> {
    let today_index = today.num_days_from_monday() as usize;
    totals
        .iter()
        .zip(DAY_LABELS)
        .enumerate()
        .map(|(index, (&amount_ml, day))| DayPoint {
            day,
            amount_ml,
            percentage_of_goal: progress_percentage(amount_ml, goal_ml),
            is_today: index == today_index,
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn tag_totals(tags: &[TagInfo]) -> TagTotals {
    let averages: Vec<f64> = tags.iter().map(|tag| tag.weekly_average).collect();
    TagTotals {
        active_tags: tags.len(),
        today_total_ml: tags.iter().map(|tag| tag.daily_total).sum(),
        weekly_average_ml: mean(&averages).round(),
    }
}

pub fn tag_shares(tags: &[TagInfo]) -> Vec<TagShare> {
    let total: f64 = tags.iter().map(|tag| tag.daily_total).sum();
    tags.iter()
        .map(|tag| TagShare {
            name: tag.name.clone(),
            amount_ml: tag.daily_total,
            share: if total > 0.0 {
                tag.daily_total * 100.0 / total
            } else {
                0.0
            },
        })
        .collect()
}

pub fn build_analytics(
    report: &WeeklyReport,
    goal_ml: f64,
    tags: &[TagInfo],
    today: Weekday,
) -> AnalyticsView {
    let days = weekly_points(&report.daily_totals, goal_ml, today);
    let totals: Vec<f64> = days.iter().map(|point| point.amount_ml).collect();
    let days_at_goal = totals.iter().filter(|&&amount| goal_ml > 0.0 && amount >= goal_ml).count();
    let goal_achievement = if totals.is_empty() {
        0.0
    } else {
        days_at_goal as f64 * 100.0 / totals.len() as f64
    };

    AnalyticsView {
        goal_ml,
        average_daily_ml: mean(&totals),
        best_day_ml: totals.iter().copied().fold(0.0, f64::max),
        total_intake_ml: totals.iter().sum(),
        days_at_goal,
        goal_achievement,
        current_streak: report.current_streak,
        days,
        tag_shares: tag_shares(tags),
    }
}
