//! Document store accessors.
//!
//! One submodule per collection. Every function takes the pool explicitly and
//! returns `sqlx::Error` unchanged; callers decide whether a failure becomes a
//! fallback value or an error response.

mod campaigns;
mod chat;
mod missions;
mod predictions;
mod reports;
mod seed;
mod sensors;

pub use campaigns::{insert_campaign, list_campaigns};
pub use chat::insert_chat_session;
pub use missions::{all_missions, insert_missions, list_missions, missions_by_status};
pub use predictions::{insert_predictions, list_predictions};
pub use reports::{
    insert_report, list_reports, report_analytics, report_by_id, report_trends,
    reports_by_location, reports_by_severity, update_report_status, DailyCount, GroupCount,
    MonthlyTrend, ReportAnalytics, ReportTrends, WeeklyTrend,
};
pub use seed::{seed, seed_if_empty};
pub use sensors::{
    count_sensor_readings, insert_sensor_readings, list_sensor_readings, pollution_statistics,
    recent_sensor_readings, PollutionStatistics, RegionStat,
};

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Midnight UTC of the current day, shifted back by `days`.
pub(crate) fn start_of_day(days_back: i64) -> DateTime<Utc> {
    // ---
    let midnight = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    midnight - Duration::days(days_back)
}
