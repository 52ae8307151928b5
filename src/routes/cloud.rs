//! Thin JSON wrappers over the cloud gateway: sensors, functions, storage,
//! bots, maintenance, roles and models.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{json_body, unix_timestamp};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{
    BackupSnapshot, BotConfig, BotInteraction, CreatedSensor, DataAnalytics, DataLakeBucket,
    DemoServices, FunctionDescriptor, JunkSweep, ModelDescriptor, ModelInfo, PublishedMessage,
    RoleInfo, RoleSummary, SensorThing, ServiceStatus, ThingWithCertificate, UploadedObject,
    VoiceReportOutcome, DEFAULT_BOT_NAME, DEFAULT_POLICY,
};
use crate::AppState;

// ---

const DEFAULT_TOPIC: &str = "pollution/data";
const DEFAULT_FUNCTION_TYPE: &str = "data_processor";
const DEFAULT_DATA_TYPE: &str = "sensor_data";

#[derive(Default, Deserialize)]
#[serde(default)]
struct SensorRequest {
    sensor_name: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ThingRequest {
    thing_name: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct PublishRequest {
    thing_name: Option<String>,
    topic: Option<String>,
    message: Option<Value>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct FunctionRequest {
    function_name: Option<String>,
    function_type: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BucketRequest {
    bucket_name: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct UploadRequest {
    bucket_name: Option<String>,
    data: Option<Value>,
    data_type: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BackupRequest {
    source_bucket: Option<String>,
    backup_bucket: Option<String>,
}

#[derive(Deserialize)]
struct AnalyticsQuery {
    data_type: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BotRequest {
    bot_name: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct InteractionRequest {
    user_input: Option<String>,
    bot_name: Option<String>,
    location: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RoleRequest {
    role_name: Option<String>,
    policies: Option<Vec<String>>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ModelRequest {
    model_name: Option<String>,
}

#[derive(Serialize)]
struct Outcome<T> {
    status: &'static str,
    details: T,
}

#[derive(Serialize)]
struct RoleDeleted {
    status: &'static str,
    role_name: String,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/aws-services-status", get(services_status))
        .route("/api/iot-sensors", get(iot_sensors))
        .route("/api/create-iot-sensor", post(create_iot_sensor))
        .route("/api/create-iot-thing", post(create_iot_thing))
        .route("/api/publish-iot-message", post(publish_iot_message))
        .route("/api/create-lambda-function", post(create_function))
        .route("/api/create-data-lake", post(create_data_lake))
        .route("/api/upload-pollution-data", post(upload_pollution_data))
        .route("/api/create-backup", post(create_backup))
        .route("/api/data-analytics/{bucket}", get(data_analytics))
        .route("/api/create-lex-bot", post(create_bot))
        .route("/api/lex-interaction", post(bot_interaction))
        .route("/api/voice-report-lex", post(voice_report_via_bot))
        .route("/api/delete-junk-services", post(delete_junk_services))
        .route("/api/recreate-demo-services", post(recreate_demo_services))
        .route("/api/iam-roles", get(iam_roles))
        .route("/api/create-iam-role", post(create_iam_role))
        .route("/api/delete-iam-role/{role_name}", delete(delete_iam_role))
        .route("/api/sagemaker-models", get(models))
        .route("/api/create-sagemaker-model", post(create_model))
}

/// Treat empty strings in optional request fields as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

async fn services_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.gateway.service_status().await)
}

async fn iot_sensors(State(state): State<AppState>) -> Json<Vec<SensorThing>> {
    Json(state.gateway.list_sensors().await)
}

async fn create_iot_sensor(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CreatedSensor>> {
    // ---
    let request: SensorRequest = json_body(&body)?;
    state
        .gateway
        .create_sensor(non_empty(&request.sensor_name))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create IoT sensor"))
}

async fn create_iot_thing(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ThingWithCertificate>> {
    // ---
    let request: ThingRequest = json_body(&body)?;
    state
        .gateway
        .create_thing_with_certificate(non_empty(&request.thing_name))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create IoT thing"))
}

/// PUBLISH STUB: the message is echoed back, labeled simulated.
async fn publish_iot_message(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<PublishedMessage>> {
    // ---
    let request: PublishRequest = json_body(&body)?;
    let topic = non_empty(&request.topic).unwrap_or(DEFAULT_TOPIC);
    let message = request.message.unwrap_or_else(|| Value::Object(Default::default()));

    Ok(Json(state.gateway.publish_message(
        non_empty(&request.thing_name),
        topic,
        message,
    )))
}

/// FUNCTION STUB: nothing is deployed.
async fn create_function(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<FunctionDescriptor>> {
    // ---
    let request: FunctionRequest = json_body(&body)?;
    let function_type = non_empty(&request.function_type).unwrap_or(DEFAULT_FUNCTION_TYPE);
    let function_name = non_empty(&request.function_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("pollution-{function_type}-{}", unix_timestamp()));

    Ok(Json(state.gateway.create_function(&function_name, function_type)))
}

async fn create_data_lake(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<DataLakeBucket>> {
    // ---
    let request: BucketRequest = json_body(&body)?;
    state
        .gateway
        .create_data_lake_bucket(non_empty(&request.bucket_name))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create data lake"))
}

async fn upload_pollution_data(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<UploadedObject>> {
    // ---
    let request: UploadRequest = json_body(&body)?;
    let Some(bucket) = non_empty(&request.bucket_name) else {
        return Err(ApiError::bad_request("No bucket name provided"));
    };
    let data = request.data.clone().unwrap_or_else(|| Value::Object(Default::default()));
    let data_type = non_empty(&request.data_type).unwrap_or(DEFAULT_DATA_TYPE);

    state
        .gateway
        .upload_pollution_data(bucket, &data, data_type)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to upload pollution data"))
}

async fn create_backup(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<BackupSnapshot>> {
    // ---
    let request: BackupRequest = json_body(&body)?;
    let Some(source) = non_empty(&request.source_bucket) else {
        return Err(ApiError::bad_request("No source bucket provided"));
    };

    state
        .gateway
        .create_backup_snapshot(source, non_empty(&request.backup_bucket))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create backup"))
}

async fn data_analytics(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<DataAnalytics>> {
    // ---
    let data_type = non_empty(&query.data_type).unwrap_or(DEFAULT_DATA_TYPE);
    state
        .gateway
        .data_analytics(&bucket, data_type)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to get data analytics"))
}

/// BOT STUB: returns the bot definition without deploying it.
async fn create_bot(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<BotConfig>> {
    // ---
    let request: BotRequest = json_body(&body)?;
    Ok(Json(state.gateway.create_bot(non_empty(&request.bot_name))))
}

async fn bot_interaction(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<BotInteraction>> {
    // ---
    let request: InteractionRequest = json_body(&body)?;
    let Some(input) = non_empty(&request.user_input) else {
        return Err(ApiError::bad_request("No user input provided"));
    };
    let bot_name = non_empty(&request.bot_name).unwrap_or(DEFAULT_BOT_NAME);

    Ok(Json(state.gateway.process_interaction(input, bot_name)))
}

async fn voice_report_via_bot(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<VoiceReportOutcome>> {
    // ---
    let request: InteractionRequest = json_body(&body)?;
    let Some(input) = non_empty(&request.user_input) else {
        return Err(ApiError::bad_request("No user input provided"));
    };

    Ok(Json(
        state
            .gateway
            .create_voice_report(input, non_empty(&request.location)),
    ))
}

async fn delete_junk_services(State(state): State<AppState>) -> Json<Outcome<JunkSweep>> {
    // ---
    let details = state.gateway.delete_junk_services().await;
    Json(Outcome {
        status: "deleted",
        details,
    })
}

async fn recreate_demo_services(State(state): State<AppState>) -> Json<Outcome<DemoServices>> {
    // ---
    let details = state.gateway.recreate_demo_services().await;
    Json(Outcome {
        status: "recreated",
        details,
    })
}

async fn iam_roles(State(state): State<AppState>) -> Json<Vec<RoleSummary>> {
    Json(state.gateway.list_roles().await)
}

async fn create_iam_role(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<RoleInfo>> {
    // ---
    let request: RoleRequest = json_body(&body)?;
    let role_name = non_empty(&request.role_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("PollutionRole-{}", unix_timestamp()));
    let policies = request
        .policies
        .unwrap_or_else(|| vec![DEFAULT_POLICY.to_string()]);

    state
        .gateway
        .create_role(&role_name, &policies)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create IAM role"))
}

async fn delete_iam_role(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<RoleDeleted>> {
    // ---
    if !state.gateway.delete_role(&role_name).await {
        return Err(ApiError::internal("Failed to delete IAM role"));
    }
    Ok(Json(RoleDeleted {
        status: "deleted",
        role_name,
    }))
}

async fn models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    Json(state.gateway.list_models().await)
}

/// MODEL STUB: nothing is trained.
async fn create_model(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ModelDescriptor>> {
    // ---
    let request: ModelRequest = json_body(&body)?;
    Ok(Json(state.gateway.create_model(non_empty(&request.model_name))))
}
