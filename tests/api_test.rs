//! HTTP tests against an in-process server whose database and cloud
//! endpoint are both unreachable, covering validation and fallback paths.

mod common;

use anyhow::Result;
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

use common::{spawn_app, UNREACHABLE_DB};

// ---

async fn get_json(client: &Client, url: &str) -> Result<(StatusCode, Value)> {
    let response = client.get(url).send().await?;
    Ok((response.status(), response.json().await?))
}

async fn post_json(client: &Client, url: &str, body: Value) -> Result<(StatusCode, Value)> {
    let response = client.post(url).json(&body).send().await?;
    Ok((response.status(), response.json().await?))
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let (status, body) = get_json(&Client::new(), &format!("{base}/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn list_endpoints_fall_back_to_empty() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    for path in [
        "/api/sensor-data",
        "/api/predictions",
        "/api/cleanup-status",
        "/api/citizen-reports",
        "/api/citizen-reports-summary",
        "/api/citizen-reports-by-location/Bay",
        "/api/citizen-reports-by-severity/high",
        "/api/campaigns",
        "/api/hotspot-detection",
        "/api/ai-alerts",
        "/api/iot-sensors",
        "/api/iam-roles",
        "/api/sagemaker-models",
    ] {
        let (status, body) = get_json(&client, &format!("{base}{path}")).await?;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, json!([]), "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn report_lookup_reports_store_errors() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let (status, body) =
        get_json(&Client::new(), &format!("{base}/api/citizen-report/CR-0000ABCD")).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load citizen report");
    Ok(())
}

#[tokio::test]
async fn report_analytics_default_to_zero_without_store() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let (status, body) = get_json(&client, &format!("{base}/api/citizen-report-analytics")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_reports"], 0);
    assert_eq!(body["reports_this_week"], 0);
    assert_eq!(body["status_statistics"], json!([]));

    let (status, body) = get_json(&client, &format!("{base}/api/citizen-report-trends")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthly_trends"], json!([]));
    assert_eq!(body["weekly_trends"], json!([]));
    Ok(())
}

#[tokio::test]
async fn dashboard_uses_defaults_without_store() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let (status, body) = get_json(&Client::new(), &format!("{base}/dashboard-data")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sensors"], json!([]));
    assert_eq!(body["predictions"], json!([]));
    assert_eq!(body["statistics"]["total_reports"], 0);
    assert!(body["cleanup"]["active_missions"].as_i64().is_some());
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn insights_fall_back_to_demo_data() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let (status, impact) = get_json(&client, &format!("{base}/api/global-impact")).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(impact.is_object());

    let (status, lake) = get_json(&client, &format!("{base}/api/data-lake-insights")).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(lake["hotspots"].as_array().is_some_and(|h| !h.is_empty()));
    Ok(())
}

#[tokio::test]
async fn unknown_alert_is_not_found() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let (status, body) =
        get_json(&Client::new(), &format!("{base}/api/ai-alert/alert-missing")).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Alert not found" }));
    Ok(())
}

#[tokio::test]
async fn speech_validation_and_failure() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();
    let url = format!("{base}/api/synthesize-speech");

    let (status, body) = post_json(&client, &url, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text provided");

    let (status, body) = post_json(&client, &url, json!({ "text": "Bloom alert" })).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Speech synthesis failed");
    Ok(())
}

#[tokio::test]
async fn invalid_json_body_is_rejected() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let response = Client::new()
        .post(format!("{base}/api/bedrock-agent"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Invalid JSON body");
    Ok(())
}

#[tokio::test]
async fn agent_stub_answers_prompts() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();
    let url = format!("{base}/api/bedrock-agent");

    let (status, body) = post_json(&client, &url, json!({ "prompt": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No prompt provided");

    let (status, body) =
        post_json(&client, &url, json!({ "prompt": "run a pollution analysis" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "default-agent");
    assert_eq!(body["simulated"], true);
    Ok(())
}

#[tokio::test]
async fn image_analysis_requires_an_image() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();
    let url = format!("{base}/api/analyze-image");

    let form = multipart::Form::new().text("note", "no file here");
    let response = client.post(&url).multipart(form).send().await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No image provided");

    let part = multipart::Part::bytes(vec![1, 2, 3]).file_name("");
    let form = multipart::Form::new().part("image", part);
    let response = client.post(&url).multipart(form).send().await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "No image selected");

    let part = multipart::Part::bytes(vec![1, 2, 3]).file_name("lake.jpg");
    let form = multipart::Form::new().part("image", part);
    let response = client.post(&url).multipart(form).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "labels": [] }));
    Ok(())
}

#[tokio::test]
async fn report_requests_are_validated() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/update-citizen-report-status"),
        json!({ "report_id": "CR-00000000" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Report ID and status are required");

    let (status, body) =
        post_json(&client, &format!("{base}/api/citizen-chat-report"), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No message provided");

    let form = multipart::Form::new()
        .text("location", "Lake Erie")
        .text("pollution_level", "high");
    let response = client
        .post(format!("{base}/submit-report"))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn chat_report_survives_store_failure() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let (status, body) = post_json(
        &Client::new(),
        &format!("{base}/api/citizen-chat-report"),
        json!({ "message": "Green scum and pollution at the marina", "session_id": "s-1" }),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "s-1");
    assert_eq!(body["bot_response"]["action_required"], true);
    assert_eq!(body["simulated"], true);
    Ok(())
}

#[tokio::test]
async fn voice_report_falls_back_to_demo_payloads() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();
    let url = format!("{base}/api/citizen-voice-report");

    let response = client.post(&url).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["report_id"], "DEMO-VOICE-001");

    let part = multipart::Part::bytes(vec![0; 16]).file_name("");
    let response = client
        .post(&url)
        .multipart(multipart::Form::new().part("audio", part))
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["report_id"], "DEMO-VOICE-002");

    // The transcription job cannot reach the cloud endpoint.
    let part = multipart::Part::bytes(vec![0; 16]).file_name("report.mp3");
    let response = client
        .post(&url)
        .multipart(multipart::Form::new().part("audio", part).text("location", "Bay"))
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["report_id"], "DEMO-VOICE-003");
    assert!(body["transcription"]
        .as_str()
        .is_some_and(|t| t.starts_with("Simulated transcription:")));
    Ok(())
}

#[tokio::test]
async fn transcription_endpoints_accept_json_and_stubs() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let response = client
        .post(format!("{base}/api/identify-speakers"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["total_speakers"], 2);
    assert_eq!(body["simulated"], true);

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/multi-language-transcribe"),
        json!({ "language_codes": "en-US,fr-CA" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["multi_language_results"]["en-US"], Value::Null);
    assert_eq!(body["detected_languages"], json!(["en-US", "fr-CA"]));

    let (status, body) =
        post_json(&client, &format!("{base}/api/transcribe-audio"), json!({})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create transcription job");
    Ok(())
}

#[tokio::test]
async fn cloud_wrappers_report_failures_and_stubs() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let (status, body) =
        post_json(&client, &format!("{base}/api/create-data-lake"), json!({})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create data lake");

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/create-lambda-function"),
        json!({ "function_type": "alert_processor" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "simulated_created");
    assert!(body["function_name"]
        .as_str()
        .is_some_and(|n| n.starts_with("pollution-alert_processor-")));

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/publish-iot-message"),
        json!({ "thing_name": "buoy-7" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "pollution/data");
    assert_eq!(body["message"], json!({}));

    let (status, body) =
        post_json(&client, &format!("{base}/api/lex-interaction"), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No user input provided");

    let response = client
        .delete(format!("{base}/api/delete-iam-role/PollutionRole-1"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) =
        post_json(&client, &format!("{base}/api/delete-junk-services"), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert!(body["details"].is_object());
    Ok(())
}

#[tokio::test]
async fn engagement_catalogue_and_metrics() -> Result<()> {
    // ---
    let base = spawn_app(UNREACHABLE_DB).await;
    let client = Client::new();

    let (status, body) = get_json(&client, &format!("{base}/api/engage-actions")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["citizen_actions"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["success_stories"][1]["participants"], 500);

    let (status, body) =
        get_json(&client, &format!("{base}/api/citizen-engagement-dashboard")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports_summary"]["reports"], json!([]));
    assert_eq!(body["engagement_metrics"]["total_citizens"], 15420);
    assert_eq!(body["analytics"]["total_reports"], 0);
    Ok(())
}
