//! Transcription endpoints.
//!
//! Each accepts either a multipart form with an `audio` file part or a JSON
//! body. Without an uploaded file a fixed demo clip is transcribed instead.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    routing::post,
    Json, Router,
};
use serde_json::{Map, Value};

use super::{json_body, read_form};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{
    MultiLanguageResult, SpeakerIdentification, TranscribedVoiceReport, TranscriptionJob,
    DEFAULT_LANGUAGE,
};
use crate::AppState;

// ---

const DEFAULT_LANGUAGE_CODES: &str = "en-US,es-US,fr-CA";

/// Audio plus the text fields that came with it.
struct AudioInput {
    audio: Bytes,
    fields: HashMap<String, String>,
}

impl AudioInput {
    // ---
    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Flatten JSON body fields to text. Arrays of strings are comma joined.
fn text_fields(body: Map<String, Value>) -> HashMap<String, String> {
    // ---
    body.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
                Value::Null | Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect()
}

/// Read the audio and fields from either request shape, substituting `demo`
/// when no audio part was uploaded.
async fn audio_input(request: Request, demo: &'static [u8]) -> ApiResult<AudioInput> {
    // ---
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &()).await.map_err(|e| {
            tracing::debug!("Rejected multipart audio upload: {}", e);
            ApiError::bad_request("Malformed multipart body")
        })?;
        let mut form = read_form(multipart).await?;
        let audio = form
            .files
            .remove("audio")
            .map(|upload| upload.bytes)
            .unwrap_or_else(|| Bytes::from_static(demo));
        return Ok(AudioInput {
            audio,
            fields: form.fields,
        });
    }

    let body = Bytes::from_request(request, &()).await.map_err(|e| {
        tracing::debug!("Failed to read request body: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;
    let fields: Map<String, Value> = json_body(&body)?;
    Ok(AudioInput {
        audio: Bytes::from_static(demo),
        fields: text_fields(fields),
    })
}

fn language_codes(raw: Option<&str>) -> Vec<String> {
    // ---
    raw.unwrap_or(DEFAULT_LANGUAGE_CODES)
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/transcribe-audio", post(transcribe_audio))
        .route("/api/multi-language-transcribe", post(multi_language_transcribe))
        .route("/api/identify-speakers", post(identify_speakers))
        .route("/api/voice-report-transcription", post(voice_report_transcription))
}

async fn transcribe_audio(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<TranscriptionJob>> {
    // ---
    let input = audio_input(request, b"demo audio data for transcription").await?;
    let language = input.text("language_code").unwrap_or(DEFAULT_LANGUAGE);

    state
        .gateway
        .create_transcription_job(&input.audio, input.text("job_name"), language)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create transcription job"))
}

async fn multi_language_transcribe(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<MultiLanguageResult>> {
    // ---
    let input = audio_input(request, b"demo audio data for multi-language transcription").await?;
    let languages = language_codes(input.text("language_codes"));

    Ok(Json(
        state.gateway.process_multi_language(&input.audio, &languages).await,
    ))
}

/// SPEAKER STUB: the audio is read but not analyzed.
async fn identify_speakers(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<SpeakerIdentification>> {
    // ---
    let input = audio_input(request, b"demo audio data for speaker identification").await?;
    Ok(Json(state.gateway.identify_speakers(&input.audio)))
}

async fn voice_report_transcription(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<TranscribedVoiceReport>> {
    // ---
    let input = audio_input(request, b"demo audio data for voice report transcription").await?;

    state
        .gateway
        .create_voice_report_with_transcription(&input.audio, input.text("location"))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create voice report with transcription"))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_codes_default_and_trim() {
        // ---
        assert_eq!(language_codes(None), vec!["en-US", "es-US", "fr-CA"]);
        assert_eq!(language_codes(Some(" de-DE , ,it-IT")), vec!["de-DE", "it-IT"]);
    }

    #[test]
    fn test_text_fields_flatten_json() {
        // ---
        let Value::Object(body) = json!({
            "location": "Lake Erie",
            "language_codes": ["en-US", "es-US"],
            "retries": 2,
            "extra": null,
        }) else {
            unreachable!()
        };

        let fields = text_fields(body);
        assert_eq!(fields["location"], "Lake Erie");
        assert_eq!(fields["language_codes"], "en-US,es-US");
        assert_eq!(fields["retries"], "2");
        assert!(!fields.contains_key("extra"));
    }

    #[tokio::test]
    async fn test_json_request_uses_demo_audio() {
        // ---
        let request = axum::http::Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"location":"Bay"}"#))
            .unwrap();

        let input = audio_input(request, b"demo").await.unwrap();
        assert_eq!(&input.audio[..], b"demo");
        assert_eq!(input.text("location"), Some("Bay"));
    }

    #[tokio::test]
    async fn test_empty_body_is_demo_request() {
        // ---
        let request = axum::http::Request::builder().body(axum::body::Body::empty()).unwrap();
        let input = audio_input(request, b"demo").await.unwrap();
        assert!(input.fields.is_empty());
    }
}
