//! Text analysis, alerts, derived insights and the speech/vision wrappers.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::{cleanup_summary, json_body, read_form, recent_readings};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{AgentResponse, DEFAULT_VOICE};
use crate::insights::{self, Alert, AlertDetail, DataLakeInsights, GlobalImpact, Hotspot};
use crate::models::ImageLabel;
use crate::AppState;

// ---

/// Agent consulted for alert recommendations.
const ALERT_AGENT: &str = "pollution-agent";

#[derive(Serialize)]
struct Analysis {
    analysis: String,
    html: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SpeechRequest {
    text: String,
    voice_id: Option<String>,
}

#[derive(Serialize)]
struct SpeechResponse {
    audio: String,
}

#[derive(Serialize)]
struct ImageAnalysis {
    labels: Vec<ImageLabel>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct AgentRequest {
    prompt: String,
    agent_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/ai-analysis", get(ai_analysis))
        .route("/api/ai-alerts", get(ai_alerts))
        .route("/api/ai-alert/{alert_id}", get(ai_alert_detail))
        .route("/api/hotspot-detection", get(hotspot_detection))
        .route("/api/data-lake-insights", get(data_lake_insights))
        .route("/api/global-impact", get(global_impact))
        .route("/api/synthesize-speech", post(synthesize_speech))
        .route("/api/analyze-image", post(analyze_image))
        .route("/api/bedrock-agent", post(invoke_agent))
}

async fn ai_analysis(State(state): State<AppState>) -> Json<Analysis> {
    // ---
    let readings = recent_readings(&state).await;
    let html = state.gateway.analyze_pollution(&readings).await;
    Json(Analysis {
        analysis: html.clone(),
        html,
    })
}

async fn ai_alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    // ---
    let readings = recent_readings(&state).await;
    let gateway = &state.gateway;
    let alerts = insights::alerts(&readings, |reading| {
        let prompt = insights::alert_prompt(reading);
        agent_recommendation(&gateway.invoke_agent(ALERT_AGENT, &prompt))
    });
    Json(alerts)
}

/// Agent reply as recommendation HTML, or `None` when the reply is blank.
fn agent_recommendation(reply: &AgentResponse) -> Option<String> {
    Some(reply.response.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

async fn ai_alert_detail(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> ApiResult<Json<AlertDetail>> {
    // ---
    let readings = recent_readings(&state).await;
    insights::alert_detail(&readings, &alert_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Alert not found"))
}

async fn hotspot_detection(State(state): State<AppState>) -> Json<Vec<Hotspot>> {
    // ---
    let readings = recent_readings(&state).await;
    Json(insights::hotspots(&readings))
}

async fn data_lake_insights(State(state): State<AppState>) -> Json<DataLakeInsights> {
    // ---
    let readings = recent_readings(&state).await;
    let cleanup = cleanup_summary(&state).await;
    let predictions = insights::echo_predictions(&readings);
    Json(insights::data_lake_insights(readings, predictions, cleanup))
}

async fn global_impact(State(state): State<AppState>) -> Json<GlobalImpact> {
    // ---
    let readings = recent_readings(&state).await;
    Json(insights::global_impact(&readings))
}

async fn synthesize_speech(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<SpeechResponse>> {
    // ---
    let request: SpeechRequest = json_body(&body)?;
    if request.text.is_empty() {
        return Err(ApiError::bad_request("No text provided"));
    }

    let voice_id = request.voice_id.as_deref().unwrap_or(DEFAULT_VOICE);
    let audio = state
        .gateway
        .synthesize_speech(&request.text, voice_id)
        .await
        .ok_or_else(|| ApiError::internal("Speech synthesis failed"))?;

    Ok(Json(SpeechResponse {
        audio: general_purpose::STANDARD.encode(audio),
    }))
}

async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImageAnalysis>> {
    // ---
    let Ok(multipart) = multipart else {
        return Err(ApiError::bad_request("No image provided"));
    };
    let form = read_form(multipart).await?;
    let image = form
        .files
        .get("image")
        .ok_or_else(|| ApiError::bad_request("No image provided"))?;
    if image.file_name.is_empty() {
        return Err(ApiError::bad_request("No image selected"));
    }

    let labels = state.gateway.analyze_image(&image.bytes).await;
    Ok(Json(ImageAnalysis { labels }))
}

/// AGENT STUB: keyword routed reply, labeled simulated.
async fn invoke_agent(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AgentResponse>> {
    // ---
    let request: AgentRequest = json_body(&body)?;
    if request.prompt.is_empty() {
        return Err(ApiError::bad_request("No prompt provided"));
    }

    let agent_id = request.agent_id.as_deref().unwrap_or("default-agent");
    Ok(Json(state.gateway.invoke_agent(agent_id, &request.prompt)))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_speech_request_defaults() {
        // ---
        let request: SpeechRequest = json_body(&Bytes::from_static(b"{}")).unwrap();
        assert!(request.text.is_empty());
        assert!(request.voice_id.is_none());
    }

    #[test]
    fn test_blank_agent_reply_has_no_recommendation() {
        // ---
        let mut reply = AgentResponse {
            agent_id: ALERT_AGENT.to_string(),
            user_input: String::new(),
            response: "  ",
            actions_taken: Vec::new(),
            confidence: 0.9,
            simulated: true,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(agent_recommendation(&reply), None);

        reply.response = "<p>Close the beach</p>";
        assert_eq!(agent_recommendation(&reply).as_deref(), Some("<p>Close the beach</p>"));
    }

    #[test]
    fn test_agent_request_keeps_custom_agent() {
        // ---
        let body = Bytes::from_static(br#"{"prompt":"coordinate cleanup","agent_id":"ops"}"#);
        let request: AgentRequest = json_body(&body).unwrap();
        assert_eq!(request.agent_id.as_deref(), Some("ops"));
        assert_eq!(request.prompt, "coordinate cleanup");
    }
}
