use crate::models::{DailySummary, DashboardData, IntakeRecord, TagInfo, WeeklyReport};
use chrono::{DateTime, Duration, Utc};

/// Supplies the data shown while the backend cannot be reached.
pub trait FallbackData: Send + Sync {
    fn dashboard(&self, now: DateTime<Utc>) -> DashboardData;
    fn tags(&self, now: DateTime<Utc>) -> Vec<TagInfo>;
}

/// The built-in sample snapshot. Timestamps are relative to `now` so the
/// activity list reads naturally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleData;

impl FallbackData for SampleData {
    fn dashboard(&self, now: DateTime<Utc>) -> DashboardData {
        let intakes = [
            ("1", Duration::minutes(15), 250.0),
            ("2", Duration::minutes(45), 200.0),
            ("3", Duration::hours(2), 300.0),
            ("4", Duration::hours(3), 250.0),
            ("5", Duration::hours(4), 200.0),
        ];

        DashboardData {
            daily_summary: DailySummary {
                total_consumed_ml: 1650.0,
                progress_percentage: 82.5,
                hydration_status: "Good Hydration".to_string(),
                remaining_ml: 350.0,
                goal_ml: 2000.0,
                drink_count: 7,
            },
            recent_intakes: intakes
                .into_iter()
                .map(|(id, ago, amount_ml)| IntakeRecord {
                    id: id.to_string(),
                    timestamp: now - ago,
                    amount_ml,
                    rfid_tag: "TAG001".to_string(),
                })
                .collect(),
            weekly_report: WeeklyReport {
                daily_totals: vec![1800.0, 2200.0, 1600.0, 2400.0, 1900.0, 1650.0, 1750.0],
                weekly_average: 1900.0,
                best_day: 2400.0,
                current_streak: 5,
            },
        }
    }

    fn tags(&self, now: DateTime<Utc>) -> Vec<TagInfo> {
        vec![
            TagInfo {
                rfid_tag: "TAG001".to_string(),
                name: "My Water Bottle".to_string(),
                last_used: now - Duration::minutes(15),
                daily_total: 1650.0,
                weekly_average: 1900.0,
            },
            TagInfo {
                rfid_tag: "TAG002".to_string(),
                name: "Office Bottle".to_string(),
                last_used: now - Duration::hours(2),
                daily_total: 800.0,
                weekly_average: 1200.0,
            },
            TagInfo {
                rfid_tag: "TAG003".to_string(),
                name: "Gym Bottle".to_string(),
                last_used: now - Duration::hours(24),
                daily_total: 0.0,
                weekly_average: 600.0,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{progress_percentage, remaining_ml};
    use chrono::TimeZone;

    #[test]
    fn sample_summary_is_self_consistent() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let data = SampleData.dashboard(now);
        let summary = &data.daily_summary;

        assert_eq!(
            summary.remaining_ml,
            remaining_ml(summary.total_consumed_ml, summary.goal_ml)
        );
        assert_eq!(
            summary.progress_percentage,
            progress_percentage(summary.total_consumed_ml, summary.goal_ml)
        );
        assert_eq!(data.weekly_report.daily_totals.len(), 7);
        assert!(data.recent_intakes.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }
}
