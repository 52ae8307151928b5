use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{unix_timestamp, CloudGateway, DEMO_ACCOUNT_ID};

// ---

/// Deployed prediction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename(deserialize = "ModelName"))]
    pub name: String,
    #[serde(rename(deserialize = "ModelArn"))]
    pub arn: String,
    #[serde(rename(deserialize = "CreationTime"), default)]
    pub creation_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub model_name: String,
    pub model_arn: String,
    pub status: &'static str,
    pub purpose: &'static str,
    pub algorithm: &'static str,
    pub accuracy: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl CloudGateway {
    // ---
    /// Models available for prediction. Empty on failure.
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        // ---
        let reply = match self.call("inference", "ListModels", json!({})).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to list models: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<ListModelsResponse>(reply) {
            Ok(listing) => listing.models,
            Err(e) => {
                tracing::error!("Unexpected ListModels reply: {}", e);
                Vec::new()
            }
        }
    }

    /// MODEL STUB: descriptor of the model that would be trained.
    pub fn create_model(&self, name: Option<&str>) -> ModelDescriptor {
        // ---
        let model_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("pollution-predictor-{}", unix_timestamp()));

        ModelDescriptor {
            model_arn: format!(
                "arn:aws:sagemaker:{}:{DEMO_ACCOUNT_ID}:model/{model_name}",
                self.region
            ),
            model_name,
            status: "simulated_created",
            purpose: "Harmful algae bloom prediction and analysis",
            algorithm: "XGBoost",
            accuracy: 0.89,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[test]
    fn test_model_stub() {
        // ---
        let gateway = unreachable_gateway();
        let model = gateway.create_model(Some("bloom-forecaster"));
        assert_eq!(model.model_name, "bloom-forecaster");
        assert!(model.model_arn.ends_with(":model/bloom-forecaster"));
        assert_eq!(model.algorithm, "XGBoost");

        assert!(gateway.create_model(None).model_name.starts_with("pollution-predictor-"));
    }

    #[test]
    fn test_model_listing_decoding() {
        // ---
        let listing: ListModelsResponse = serde_json::from_value(json!({
            "Models": [{"ModelName": "m1", "ModelArn": "arn:m1", "CreationTime": "2025-01-01T00:00:00Z"}]
        }))
        .unwrap();
        assert_eq!(listing.models[0].name, "m1");

        let out = serde_json::to_value(&listing.models[0]).unwrap();
        assert_eq!(out["creation_time"], "2025-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_list_models_empty_when_unreachable() {
        // ---
        assert!(unreachable_gateway().list_models().await.is_empty());
    }
}
