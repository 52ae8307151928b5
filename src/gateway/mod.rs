//! Cloud service gateway.
//!
//! One [`CloudGateway`] is built at startup and shared through application
//! state. Every public method performs at most one logical cloud operation
//! and never returns the underlying error: failures are logged and turned into
//! a sentinel (`None`, an empty list or a fixed fallback payload).
//!
//! Transport is JSON over HTTP: each operation is a `POST` to
//! `{cloud_api_url}/{service}/{Operation}` with the region in the
//! `x-cloud-region` header and HTTP basic auth when credentials are set.
//!
//! Methods documented as STUB never touch the network; their payloads are
//! marked as simulated.

mod bot;
mod engagement;
mod functions;
mod iam;
mod inference;
mod iot;
mod maintenance;
mod speech;
mod status;
mod storage;
mod text;
mod transcribe;
mod vision;

pub use bot::{
    BotConfig, BotInteraction, BotStatus, CitizenBot, VoiceReportOutcome, DEFAULT_BOT_NAME,
};
pub use engagement::{ChatReport, EngagementMetrics, EngagementSystem};
pub use functions::{FunctionDescriptor, FunctionKind, ReportProcessor};
pub use iam::{RoleInfo, RoleSummary, DEFAULT_POLICY};
pub use inference::{ModelDescriptor, ModelInfo};
pub use iot::{CreatedSensor, PublishedMessage, SensorThing, ThingWithCertificate};
pub use maintenance::{DemoServices, JunkSweep};
pub use speech::DEFAULT_VOICE;
pub use status::ServiceStatus;
pub use storage::{BackupSnapshot, BucketInfo, DataAnalytics, DataLakeBucket, UploadedObject};
pub use text::{AgentResponse, ANALYSIS_FALLBACK_HTML, REPORT_ANALYSIS_FALLBACK_HTML};
pub use transcribe::{
    CitizenVoiceReport, MultiLanguageResult, SpeakerIdentification, TranscribedVoiceReport,
    TranscriptionJob, DEFAULT_LANGUAGE,
};

use anyhow::{bail, Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::Config;

// ---

/// Account id used in the ARNs of simulated resources.
pub(crate) const DEMO_ACCOUNT_ID: &str = "123456789012";

/// Resource names containing any of these are swept by the junk cleanup.
pub(crate) const JUNK_KEYWORDS: [&str; 4] = ["test", "demo", "ui-test", "pollution"];

const REGION_HEADER: &str = "x-cloud-region";

/// Process-lifetime client for every cloud capability the dashboard uses.
#[derive(Debug, Clone)]
pub struct CloudGateway {
    http: Client,
    base_url: String,
    region: String,
    credentials: Option<(String, String)>,
    text_model_id: String,
}

impl CloudGateway {
    // ---
    pub fn new(config: &Config) -> Result<Self> {
        // ---
        let http = Client::builder()
            .build()
            .context("Failed to build cloud HTTP client")?;

        tracing::debug!(
            "Cloud gateway targeting {} in region {}",
            config.cloud_api_url,
            config.region
        );

        Ok(Self {
            http,
            base_url: config.cloud_api_url.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            credentials: config.credentials(),
            text_model_id: config.text_model_id.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn request(&self, service: &str, operation: &str) -> RequestBuilder {
        // ---
        let url = format!("{}/{}/{}", self.base_url, service, operation);
        let builder = self.http.post(url).header(REGION_HEADER, &self.region);
        match &self.credentials {
            Some((key, secret)) => builder.basic_auth(key, Some(secret)),
            None => builder,
        }
    }

    async fn send(&self, service: &str, operation: &str, body: &Value) -> Result<reqwest::Response> {
        // ---
        tracing::debug!("Cloud call {}/{}", service, operation);

        let response = self
            .request(service, operation)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{service}/{operation} request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("{service}/{operation} returned {status}: {detail}");
        }
        Ok(response)
    }

    /// Perform one operation and decode its JSON reply. An empty reply body
    /// decodes to `Value::Null`.
    pub(crate) async fn call(&self, service: &str, operation: &str, body: Value) -> Result<Value> {
        // ---
        let bytes = self.send(service, operation, &body).await?.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .with_context(|| format!("{service}/{operation} returned invalid JSON"))
    }

    /// Perform one operation whose reply is a raw byte stream.
    pub(crate) async fn call_bytes(
        &self,
        service: &str,
        operation: &str,
        body: Value,
    ) -> Result<Vec<u8>> {
        // ---
        let bytes = self.send(service, operation, &body).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

// ---

/// Seconds since the epoch, used to suffix generated resource names.
pub(crate) fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Whether a failed call reported that the resource already exists.
pub(crate) fn is_already_exists(err: &anyhow::Error) -> bool {
    let message = format!("{err:#}");
    message.contains("AlreadyExists") || message.contains("AlreadyOwnedByYou")
}

pub(crate) fn is_junk(name: &str) -> bool {
    let lower = name.to_lowercase();
    JUNK_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Collect `item[field]` strings from the array at `value[list]`.
pub(crate) fn string_field_list(value: &Value, list: &str, field: &str) -> Vec<String> {
    // ---
    value[list]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item[field].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Collect the plain strings in the array at `value[list]`.
pub(crate) fn string_list(value: &Value, list: &str) -> Vec<String> {
    // ---
    value[list]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
