//! Citizen report submission, lookups and analytics.

use std::path::Path as FsPath;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{analytics_or_default, json_body, list_or_empty, read_form, unix_timestamp, Upload};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{ChatReport, CitizenVoiceReport};
use crate::models::{CitizenReport, NewReport};
use crate::store::{self, ReportAnalytics, ReportTrends};
use crate::AppState;

// ---

const SUMMARY_LIMIT: i64 = 100;
const ALL_REPORTS_LIMIT: i64 = 1000;

#[derive(Serialize)]
struct Submitted {
    message: &'static str,
    report_id: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct StatusUpdate {
    report_id: Option<String>,
    status: Option<String>,
    notes: String,
}

#[derive(Serialize)]
struct StatusUpdated {
    message: &'static str,
    report_id: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ChatRequest {
    message: String,
    user_id: Option<String>,
    session_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/submit-report", post(submit_report))
        .route("/api/citizen-reports", get(citizen_reports))
        .route("/api/citizen-reports-summary", get(citizen_reports_summary))
        .route("/api/citizen-report/{report_id}", get(citizen_report))
        .route("/api/citizen-reports-by-location/{location}", get(reports_by_location))
        .route("/api/citizen-reports-by-severity/{severity}", get(reports_by_severity))
        .route("/api/update-citizen-report-status", post(update_status))
        .route("/api/citizen-report-analytics", get(report_analytics))
        .route("/api/citizen-report-trends", get(report_trends))
        .route("/api/citizen-voice-report", post(citizen_voice_report))
        .route("/api/citizen-chat-report", post(citizen_chat_report))
}

/// Reduce an uploaded file name to a safe single path component.
fn secure_filename(name: &str) -> String {
    // ---
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']).to_string();

    if cleaned.is_empty() {
        format!("upload-{}", unix_timestamp())
    } else {
        cleaned
    }
}

/// Write an upload under `uploads_dir` and return its public path.
async fn save_upload(uploads_dir: &str, upload: &Upload) -> std::io::Result<String> {
    // ---
    let filename = secure_filename(&upload.file_name);
    tokio::fs::create_dir_all(uploads_dir).await?;
    tokio::fs::write(FsPath::new(uploads_dir).join(&filename), &upload.bytes).await?;
    Ok(format!("uploads/{filename}"))
}

/// Multipart report form with an optional `image` part. A named image is
/// saved to the uploads directory and labeled before the report is stored.
async fn submit_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Submitted>> {
    // ---
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Report submission is not multipart: {}", e);
        ApiError::bad_request("Report form must be multipart/form-data")
    })?;
    let form = read_form(multipart).await?;
    let mut report = NewReport::from_form(&form.fields).map_err(ApiError::bad_request)?;

    if let Some(image) = form.files.get("image").filter(|f| !f.file_name.is_empty()) {
        let image_path = save_upload(&state.config.uploads_dir, image).await.map_err(|e| {
            tracing::error!("Failed to save uploaded image: {}", e);
            ApiError::internal("Failed to save uploaded image")
        })?;
        report.image_analysis = Some(state.gateway.analyze_image(&image.bytes).await);
        report.image_path = Some(image_path);
    }

    store::insert_report(&state.pool, &report)
        .await
        .map_err(|e| ApiError::store(e, "Failed to submit report"))?;

    tracing::info!("Stored citizen report {}", report.report_id);
    Ok(Json(Submitted {
        message: "Report submitted successfully",
        report_id: report.report_id,
    }))
}

async fn citizen_reports(State(state): State<AppState>) -> Json<Vec<CitizenReport>> {
    // ---
    let reports = store::list_reports(&state.pool, ALL_REPORTS_LIMIT).await;
    Json(list_or_empty(reports, "citizen reports"))
}

async fn citizen_reports_summary(State(state): State<AppState>) -> Json<Vec<CitizenReport>> {
    // ---
    let reports = store::list_reports(&state.pool, SUMMARY_LIMIT).await;
    Json(list_or_empty(reports, "citizen report summary"))
}

async fn citizen_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> ApiResult<Json<CitizenReport>> {
    // ---
    store::report_by_id(&state.pool, &report_id)
        .await
        .map_err(|e| ApiError::store(e, "Failed to load citizen report"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Report not found"))
}

async fn reports_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<Vec<CitizenReport>> {
    // ---
    let reports = store::reports_by_location(&state.pool, &location).await;
    Json(list_or_empty(reports, "reports by location"))
}

async fn reports_by_severity(
    State(state): State<AppState>,
    Path(severity): Path<String>,
) -> Json<Vec<CitizenReport>> {
    // ---
    let reports = store::reports_by_severity(&state.pool, &severity).await;
    Json(list_or_empty(reports, "reports by severity"))
}

async fn update_status(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<StatusUpdated>> {
    // ---
    let update: StatusUpdate = json_body(&body)?;
    let (Some(report_id), Some(status)) = (
        update.report_id.filter(|s| !s.is_empty()),
        update.status.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Report ID and status are required"));
    };

    let updated = store::update_report_status(&state.pool, &report_id, &status, &update.notes)
        .await
        .map_err(|e| ApiError::store(e, "Failed to update status"))?;
    if !updated {
        return Err(ApiError::not_found("Report not found"));
    }

    tracing::info!("Report {} moved to {}", report_id, status);
    Ok(Json(StatusUpdated {
        message: "Status updated successfully",
        report_id,
    }))
}

async fn report_analytics(State(state): State<AppState>) -> Json<ReportAnalytics> {
    // ---
    Json(analytics_or_default(&state).await)
}

async fn report_trends(State(state): State<AppState>) -> Json<ReportTrends> {
    // ---
    Json(store::report_trends(&state.pool).await.unwrap_or_else(|e| {
        tracing::error!("Failed to compute report trends: {}", e);
        ReportTrends::default()
    }))
}

/// Citizen report built from a processed voice recording.
fn voice_report_record(voice: &CitizenVoiceReport) -> NewReport {
    // ---
    NewReport {
        report_id: voice.report_id.clone(),
        location_name: voice.location.clone(),
        description: Some(voice.transcription.clone()),
        pollution_level: None,
        lat: None,
        lng: None,
        reporter_name: voice.reporter_info.clone(),
        contact: None,
        severity: "medium".to_string(),
        status: "pending".to_string(),
        reporter_type: Some("voice".to_string()),
        pollution_type: None,
        image_path: None,
        image_analysis: None,
        timestamp: voice.timestamp,
    }
}

/// Transcribe, analyze and store a voice report. Every failure answers with
/// a simulated demo report instead of an error.
async fn citizen_voice_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<CitizenVoiceReport> {
    // ---
    let Ok(multipart) = multipart else {
        return Json(no_audio_report());
    };
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::error!("Citizen voice report failed: {}", e.message);
            return Json(CitizenVoiceReport::demo(
                "DEMO-VOICE-004",
                "Unable to process audio.",
                "Error processing voice report. Please try again later.",
            ));
        }
    };

    let Some(audio) = form.files.get("audio") else {
        return Json(no_audio_report());
    };
    if audio.file_name.is_empty() {
        return Json(CitizenVoiceReport::demo(
            "DEMO-VOICE-002",
            "No audio file selected.",
            "No audio provided. Please try again.",
        ));
    }

    let processed = state
        .gateway
        .process_citizen_voice_report(&audio.bytes, form.text("location"), form.text("reporter_info"))
        .await;
    let stored = match processed {
        Some(voice) => store::insert_report(&state.pool, &voice_report_record(&voice))
            .await
            .map(|_| voice)
            .map_err(|e| tracing::error!("Failed to store voice report: {}", e))
            .ok(),
        None => {
            tracing::error!("Voice report processing failed");
            None
        }
    };

    Json(stored.unwrap_or_else(|| {
        CitizenVoiceReport::demo(
            "DEMO-VOICE-003",
            "Discoloured water near the river mouth.",
            "Moderate bloom activity detected. Monitoring recommended.",
        )
    }))
}

fn no_audio_report() -> CitizenVoiceReport {
    CitizenVoiceReport::demo(
        "DEMO-VOICE-001",
        "Green scum spotted along the beach.",
        "High bloom density detected. Immediate water advisory recommended.",
    )
}

/// CHAT STUB: classify the message, store the exchange and return it.
async fn citizen_chat_report(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ChatReport>> {
    // ---
    let request: ChatRequest = json_body(&body)?;
    if request.message.is_empty() {
        return Err(ApiError::bad_request("No message provided"));
    }

    let report = state.gateway.process_chat_report(
        &request.message,
        request.user_id.as_deref(),
        request.session_id.as_deref(),
    );

    match serde_json::to_value(&report) {
        Ok(payload) => {
            if let Err(e) = store::insert_chat_session(
                &state.pool,
                &report.session_id,
                report.user_id.as_deref(),
                &payload,
            )
            .await
            {
                tracing::error!("Failed to store chat session {}: {}", report.session_id, e);
            }
        }
        Err(e) => tracing::error!("Failed to encode chat session: {}", e),
    }

    Ok(Json(report))
}
