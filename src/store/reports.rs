use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::start_of_day;
use crate::models::{CitizenReport, NewReport};

// ---

const REPORT_COLUMNS: &str = "doc_id, report_id, location_name, description, pollution_level, \
                              lat, lng, reporter_name, contact, severity, status, reporter_type, \
                              pollution_type, image_path, image_analysis, status_notes, \
                              status_updated_at, reported_at, stored_at";

/// Count of reports sharing one value of a grouping field.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WeeklyTrend {
    pub year: i32,
    pub week: i32,
    pub count: i64,
}

/// Citizen report breakdowns for the analytics view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportAnalytics {
    pub status_statistics: Vec<GroupCount>,
    pub severity_statistics: Vec<GroupCount>,
    pub location_statistics: Vec<GroupCount>,
    pub pollution_type_statistics: Vec<GroupCount>,
    pub reporter_type_statistics: Vec<GroupCount>,
    pub daily_statistics: Vec<DailyCount>,
    pub total_reports: i64,
    pub reports_today: i64,
    pub reports_this_week: i64,
    pub reports_this_month: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTrends {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub weekly_trends: Vec<WeeklyTrend>,
}

/// Fields reports may be grouped by.
#[derive(Debug, Clone, Copy)]
enum GroupField {
    Status,
    Severity,
    Location,
    PollutionType,
    ReporterType,
}

impl GroupField {
    fn column(self) -> &'static str {
        match self {
            GroupField::Status => "status",
            GroupField::Severity => "severity",
            GroupField::Location => "location_name",
            GroupField::PollutionType => "pollution_type",
            GroupField::ReporterType => "reporter_type",
        }
    }
}

/// Insert a report and return its store-generated id.
pub async fn insert_report(pool: &PgPool, report: &NewReport) -> Result<Uuid, sqlx::Error> {
    // ---
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO pollution_reports (
            report_id, location_name, description, pollution_level, lat, lng,
            reporter_name, contact, severity, status, reporter_type, pollution_type,
            image_path, image_analysis, reported_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING doc_id
        "#,
    )
    .bind(&report.report_id)
    .bind(&report.location_name)
    .bind(&report.description)
    .bind(report.pollution_level)
    .bind(report.lat)
    .bind(report.lng)
    .bind(&report.reporter_name)
    .bind(&report.contact)
    .bind(&report.severity)
    .bind(&report.status)
    .bind(&report.reporter_type)
    .bind(&report.pollution_type)
    .bind(&report.image_path)
    .bind(report.image_analysis.as_ref().map(Json))
    .bind(report.timestamp)
    .fetch_one(pool)
    .await
}

/// All reports, newest first.
pub async fn list_reports(pool: &PgPool, limit: i64) -> Result<Vec<CitizenReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CitizenReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM pollution_reports ORDER BY stored_at DESC, reported_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn report_by_id(
    pool: &PgPool,
    report_id: &str,
) -> Result<Option<CitizenReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CitizenReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM pollution_reports WHERE report_id = $1 LIMIT 1"
    ))
    .bind(report_id)
    .fetch_optional(pool)
    .await
}

pub async fn reports_by_location(
    pool: &PgPool,
    location: &str,
) -> Result<Vec<CitizenReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CitizenReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM pollution_reports WHERE location_name = $1 ORDER BY reported_at DESC"
    ))
    .bind(location)
    .fetch_all(pool)
    .await
}

pub async fn reports_by_severity(
    pool: &PgPool,
    severity: &str,
) -> Result<Vec<CitizenReport>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CitizenReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM pollution_reports WHERE severity = $1 ORDER BY reported_at DESC"
    ))
    .bind(severity)
    .fetch_all(pool)
    .await
}

/// Set the status of a report. Any status string is accepted.
///
/// Returns `false` when no report with that id exists.
pub async fn update_report_status(
    pool: &PgPool,
    report_id: &str,
    status: &str,
    notes: &str,
) -> Result<bool, sqlx::Error> {
    // ---
    let result = sqlx::query(
        r#"
        UPDATE pollution_reports
        SET status = $2, status_notes = $3, status_updated_at = now()
        WHERE report_id = $1
        "#,
    )
    .bind(report_id)
    .bind(status)
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn count_by(pool: &PgPool, field: GroupField) -> Result<Vec<GroupCount>, sqlx::Error> {
    // ---
    let column = field.column();
    sqlx::query_as::<_, GroupCount>(&format!(
        "SELECT {column} AS key, COUNT(*) AS count FROM pollution_reports \
         GROUP BY {column} ORDER BY count DESC"
    ))
    .fetch_all(pool)
    .await
}

async fn count_since(pool: &PgPool, days_back: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pollution_reports WHERE reported_at >= $1")
        .bind(start_of_day(days_back))
        .fetch_one(pool)
        .await
}

/// Breakdowns by status, severity, location, pollution type and reporter
/// type, daily counts for the last 30 days and period totals.
pub async fn report_analytics(pool: &PgPool) -> Result<ReportAnalytics, sqlx::Error> {
    // ---
    let daily_statistics = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT
            to_char(reported_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS date,
            COUNT(*)                                              AS count
        FROM pollution_reports
        WHERE reported_at >= $1
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(start_of_day(30))
    .fetch_all(pool)
    .await?;

    let total_reports = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pollution_reports")
        .fetch_one(pool)
        .await?;

    Ok(ReportAnalytics {
        status_statistics: count_by(pool, GroupField::Status).await?,
        severity_statistics: count_by(pool, GroupField::Severity).await?,
        location_statistics: count_by(pool, GroupField::Location).await?,
        pollution_type_statistics: count_by(pool, GroupField::PollutionType).await?,
        reporter_type_statistics: count_by(pool, GroupField::ReporterType).await?,
        daily_statistics,
        total_reports,
        reports_today: count_since(pool, 0).await?,
        reports_this_week: count_since(pool, 7).await?,
        reports_this_month: count_since(pool, 30).await?,
    })
}

/// Monthly counts over the last year and ISO-week counts over the last 12 weeks.
pub async fn report_trends(pool: &PgPool) -> Result<ReportTrends, sqlx::Error> {
    // ---
    let monthly_trends = sqlx::query_as::<_, MonthlyTrend>(
        r#"
        SELECT
            EXTRACT(YEAR FROM reported_at AT TIME ZONE 'UTC')::INT  AS year,
            EXTRACT(MONTH FROM reported_at AT TIME ZONE 'UTC')::INT AS month,
            COUNT(*)                                                AS count
        FROM pollution_reports
        WHERE reported_at >= $1
        GROUP BY year, month
        ORDER BY year, month
        "#,
    )
    .bind(start_of_day(365))
    .fetch_all(pool)
    .await?;

    let weekly_trends = sqlx::query_as::<_, WeeklyTrend>(
        r#"
        SELECT
            EXTRACT(ISOYEAR FROM reported_at AT TIME ZONE 'UTC')::INT AS year,
            EXTRACT(WEEK FROM reported_at AT TIME ZONE 'UTC')::INT    AS week,
            COUNT(*)                                                  AS count
        FROM pollution_reports
        WHERE reported_at >= $1
        GROUP BY year, week
        ORDER BY year, week
        "#,
    )
    .bind(start_of_day(84))
    .fetch_all(pool)
    .await?;

    Ok(ReportTrends {
        monthly_trends,
        weekly_trends,
    })
}
