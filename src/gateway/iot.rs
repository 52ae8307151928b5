use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{is_already_exists, unix_timestamp, CloudGateway, DEMO_ACCOUNT_ID};

// ---

#[derive(Debug, Clone, Serialize)]
pub struct CreatedSensor {
    pub sensor_id: String,
    pub thing_arn: String,
    pub status: &'static str,
}

/// Registered thing as listed by the cloud registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorThing {
    #[serde(rename(deserialize = "thingName"))]
    pub name: String,
    #[serde(rename(deserialize = "thingArn"))]
    pub arn: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThingWithCertificate {
    pub thing_name: String,
    pub thing_arn: String,
    pub certificate_id: String,
    pub certificate_arn: String,
    pub policy_name: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedMessage {
    pub thing_name: Option<String>,
    pub topic: String,
    pub message: Value,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ListThingsResponse {
    #[serde(default)]
    things: Vec<SensorThing>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThingResponse {
    thing_arn: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateResponse {
    certificate_arn: String,
    certificate_id: String,
}

fn default_sensor_name(name: Option<&str>) -> String {
    name.filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("pollution-sensor-{}", unix_timestamp()))
}

fn sensor_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": ["iot:Connect", "iot:Publish", "iot:Subscribe", "iot:Receive"],
            "Resource": "*"
        }]
    })
}

impl CloudGateway {
    // ---
    async fn create_thing(&self, thing_name: &str) -> anyhow::Result<String> {
        let reply = self
            .call("iot", "CreateThing", json!({ "thingName": thing_name }))
            .await?;
        Ok(serde_json::from_value::<CreateThingResponse>(reply)?.thing_arn)
    }

    /// Register a bare thing. `None` on failure.
    pub async fn create_sensor(&self, name: Option<&str>) -> Option<CreatedSensor> {
        // ---
        let sensor_id = default_sensor_name(name);
        match self.create_thing(&sensor_id).await {
            Ok(thing_arn) => {
                tracing::info!("Created IoT sensor {}", sensor_id);
                Some(CreatedSensor {
                    sensor_id,
                    thing_arn,
                    status: "created",
                })
            }
            Err(e) => {
                tracing::error!("Failed to create IoT sensor {}: {:#}", sensor_id, e);
                None
            }
        }
    }

    /// Registered things. Empty on failure.
    pub async fn list_sensors(&self) -> Vec<SensorThing> {
        // ---
        let reply = match self.call("iot", "ListThings", json!({})).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to list IoT sensors: {:#}", e);
                return Vec::new();
            }
        };

        serde_json::from_value::<ListThingsResponse>(reply)
            .map(|r| r.things)
            .unwrap_or_else(|e| {
                tracing::error!("Unexpected ListThings reply: {}", e);
                Vec::new()
            })
    }

    /// Create a thing with an active certificate and a connect/publish policy.
    ///
    /// An existing thing is reported with `status: already_exists` and
    /// untouched. Policy creation tolerates an existing policy; the attach
    /// steps are logged and skipped on failure.
    pub async fn create_thing_with_certificate(
        &self,
        name: Option<&str>,
    ) -> Option<ThingWithCertificate> {
        // ---
        let thing_name = default_sensor_name(name);
        let policy_name = format!("{thing_name}-policy");

        if self
            .call("iot", "DescribeThing", json!({ "thingName": thing_name }))
            .await
            .is_ok()
        {
            let certificate_id = format!("existing-cert-{thing_name}");
            return Some(ThingWithCertificate {
                thing_arn: format!("arn:aws:iot:{}:{DEMO_ACCOUNT_ID}:thing/{thing_name}", self.region),
                certificate_arn: format!(
                    "arn:aws:iot:{}:{DEMO_ACCOUNT_ID}:cert/{certificate_id}",
                    self.region
                ),
                certificate_id,
                policy_name,
                thing_name,
                status: "already_exists",
            });
        }

        let thing_arn = match self.create_thing(&thing_name).await {
            Ok(arn) => arn,
            Err(e) => {
                tracing::error!("Failed to create IoT thing {}: {:#}", thing_name, e);
                return None;
            }
        };

        let certificate = match self
            .call("iot", "CreateKeysAndCertificate", json!({ "setAsActive": true }))
            .await
            .and_then(|reply| Ok(serde_json::from_value::<CertificateResponse>(reply)?))
        {
            Ok(certificate) => certificate,
            Err(e) => {
                tracing::error!("Failed to create certificate for {}: {:#}", thing_name, e);
                return None;
            }
        };

        let policy = json!({
            "policyName": policy_name,
            "policyDocument": sensor_policy().to_string(),
        });
        if let Err(e) = self.call("iot", "CreatePolicy", policy).await {
            if !is_already_exists(&e) {
                tracing::warn!("Failed to create policy {}: {:#}", policy_name, e);
            }
        }

        let attach_policy = json!({ "policyName": policy_name, "target": certificate.certificate_arn });
        if let Err(e) = self.call("iot", "AttachPolicy", attach_policy).await {
            tracing::warn!("Failed to attach policy {}: {:#}", policy_name, e);
        }

        let attach_principal = json!({ "thingName": thing_name, "principal": certificate.certificate_arn });
        if let Err(e) = self.call("iot", "AttachThingPrincipal", attach_principal).await {
            tracing::warn!("Failed to attach certificate to {}: {:#}", thing_name, e);
        }

        tracing::info!("Created IoT thing {} with certificate", thing_name);
        Some(ThingWithCertificate {
            thing_name,
            thing_arn,
            certificate_id: certificate.certificate_id,
            certificate_arn: certificate.certificate_arn,
            policy_name,
            status: "created_with_certificate",
        })
    }

    /// PUBLISH STUB: echoes the message with a timestamp, nothing is sent.
    pub fn publish_message(
        &self,
        thing_name: Option<&str>,
        topic: &str,
        message: Value,
    ) -> PublishedMessage {
        // ---
        tracing::info!("Simulated publish to {}", topic);
        PublishedMessage {
            thing_name: thing_name.map(str::to_string),
            topic: topic.to_string(),
            message,
            simulated: true,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[tokio::test]
    async fn test_fallbacks_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();
        assert!(gateway.create_sensor(Some("buoy-7")).await.is_none());
        assert!(gateway.list_sensors().await.is_empty());
        assert!(gateway.create_thing_with_certificate(None).await.is_none());
    }

    #[test]
    fn test_publish_echoes_message() {
        // ---
        let gateway = unreachable_gateway();
        let published = gateway.publish_message(Some("buoy-7"), "pollution/data", json!({"level": 7.4}));
        assert_eq!(published.topic, "pollution/data");
        assert_eq!(published.message["level"], 7.4);
        assert!(published.simulated);
    }

    #[test]
    fn test_thing_list_decoding() {
        // ---
        let reply: ListThingsResponse = serde_json::from_value(json!({
            "things": [{"thingName": "buoy-7", "thingArn": "arn:aws:iot:x:y:thing/buoy-7", "version": 2}]
        }))
        .unwrap();
        assert_eq!(reply.things[0].name, "buoy-7");

        let out = serde_json::to_value(&reply.things[0]).unwrap();
        assert_eq!(out["name"], "buoy-7");
        assert_eq!(out["version"], 2);
    }

    #[test]
    fn test_default_sensor_name() {
        // ---
        assert_eq!(default_sensor_name(Some("buoy")), "buoy");
        assert!(default_sensor_name(Some("")).starts_with("pollution-sensor-"));
    }
}
