use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::json;

use super::CloudGateway;
use crate::models::ImageLabel;

// ---

const MAX_LABELS: u32 = 10;
const MIN_CONFIDENCE: f64 = 70.0;

/// Labels kept from image analysis must contain one of these.
const BLOOM_KEYWORDS: [&str; 5] = ["harmful algae bloom", "algae", "waste", "trash", "debris"];

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsResponse {
    #[serde(default)]
    labels: Vec<DetectedLabel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectedLabel {
    name: String,
    confidence: f64,
}

fn bloom_labels(labels: Vec<DetectedLabel>) -> Vec<ImageLabel> {
    // ---
    labels
        .into_iter()
        .filter(|label| {
            let name = label.name.to_lowercase();
            BLOOM_KEYWORDS.iter().any(|k| name.contains(k))
        })
        .map(|label| ImageLabel {
            name: label.name,
            confidence: label.confidence,
        })
        .collect()
}

impl CloudGateway {
    // ---
    /// Detect labels in an image and keep the bloom-related ones.
    /// Empty on failure.
    pub async fn analyze_image(&self, image: &[u8]) -> Vec<ImageLabel> {
        // ---
        let body = json!({
            "Image": { "Bytes": general_purpose::STANDARD.encode(image) },
            "MaxLabels": MAX_LABELS,
            "MinConfidence": MIN_CONFIDENCE,
        });

        let reply = match self.call("vision", "DetectLabels", body).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Image analysis failed: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<DetectLabelsResponse>(reply) {
            Ok(detected) => bloom_labels(detected.labels),
            Err(e) => {
                tracing::error!("Unexpected image analysis reply: {}", e);
                Vec::new()
            }
        }
    }
}
