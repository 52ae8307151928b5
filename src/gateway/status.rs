use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CloudGateway;

// ---

/// Composite availability report across cloud capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub iot_sensors: usize,
    pub lambda_functions: &'static str,
    pub sagemaker_models: usize,
    pub bedrock_ai: &'static str,
    pub polly_voices: &'static str,
    pub transcribe_jobs: &'static str,
    pub rekognition_api: &'static str,
    pub lex_bots: &'static str,
    pub s3_storage: usize,
    pub last_health_check: DateTime<Utc>,
}

impl CloudGateway {
    // ---
    /// Counts come from live listings and read zero when a listing fails.
    pub async fn service_status(&self) -> ServiceStatus {
        // ---
        let (sensors, models, buckets) =
            tokio::join!(self.list_sensors(), self.list_models(), self.list_buckets());

        ServiceStatus {
            iot_sensors: sensors.len(),
            lambda_functions: "Available for data processing",
            sagemaker_models: models.len(),
            bedrock_ai: "Active - text analysis",
            polly_voices: "Available - Multiple languages",
            transcribe_jobs: "Ready for audio processing",
            rekognition_api: "Active - Image analysis ready",
            lex_bots: self.bot_status().bot_status,
            s3_storage: buckets.len(),
            last_health_check: Utc::now(),
        }
    }
}
