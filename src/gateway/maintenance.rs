use anyhow::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};

use super::{
    bot::BotConfig, functions::FunctionDescriptor, is_junk, iot::ThingWithCertificate,
    storage::DataLakeBucket, string_field_list, string_list, unix_timestamp, CloudGateway,
};

// ---

/// Outcome of a junk sweep, one entry per step in execution order.
///
/// A successful step maps its name to the deleted resource names; a failed
/// listing maps `{step}_error` to the error text.
#[derive(Debug, Default, Clone)]
pub struct JunkSweep {
    entries: Vec<(String, Value)>,
}

impl JunkSweep {
    // ---
    fn record(&mut self, step: &str, outcome: Result<Vec<String>>) {
        // ---
        match outcome {
            Ok(deleted) => {
                tracing::info!("{}: {} items deleted", step, deleted.len());
                self.entries.push((step.to_string(), json!(deleted)));
            }
            Err(e) => {
                tracing::error!("Junk sweep step {} failed: {:#}", step, e);
                self.entries.push((format!("{step}_error"), json!(format!("{e:#}"))));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for JunkSweep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DemoServices {
    pub sensor: Option<ThingWithCertificate>,
    pub function: FunctionDescriptor,
    pub bucket: Option<DataLakeBucket>,
    pub bot: BotConfig,
    pub recreated: bool,
}

impl CloudGateway {
    // ---
    /// Junk-named entries of `list[field]` from one listing call.
    async fn junk_names(&self, service: &str, operation: &str, list: &str, field: &str) -> Result<Vec<String>> {
        let reply = self.call(service, operation, json!({})).await?;
        Ok(string_field_list(&reply, list, field)
            .into_iter()
            .filter(|name| is_junk(name))
            .collect())
    }

    async fn delete_thing_certificates(&self, thing: &str) -> Result<()> {
        // ---
        let reply = self
            .call("iot", "ListThingPrincipals", json!({ "thingName": thing }))
            .await?;
        for principal in string_list(&reply, "principals") {
            let certificate_id = principal.rsplit('/').next().unwrap_or(&principal).to_string();
            self.call(
                "iot",
                "DetachThingPrincipal",
                json!({ "thingName": thing, "principal": principal }),
            )
            .await?;
            self.call(
                "iot",
                "UpdateCertificate",
                json!({ "certificateId": certificate_id, "newStatus": "INACTIVE" }),
            )
            .await?;
            self.call(
                "iot",
                "DeleteCertificate",
                json!({ "certificateId": certificate_id, "forceDelete": true }),
            )
            .await?;
            tracing::debug!("Deleted certificate {}", certificate_id);
        }
        Ok(())
    }

    async fn sweep_things(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self.junk_names("iot", "ListThings", "things", "thingName").await? {
            if let Err(e) = self.delete_thing_certificates(&name).await {
                tracing::warn!("Failed to delete certificates of {}: {:#}", name, e);
            }
            match self.call("iot", "DeleteThing", json!({ "thingName": name })).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete thing {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    async fn sweep_policies(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self.junk_names("iot", "ListPolicies", "policies", "policyName").await? {
            match self
                .call("iot", "ListTargetsForPolicy", json!({ "policyName": name }))
                .await
            {
                Ok(reply) => {
                    for target in string_list(&reply, "targets") {
                        let detach = json!({ "policyName": name, "target": target });
                        if let Err(e) = self.call("iot", "DetachPolicy", detach).await {
                            tracing::warn!("Failed to detach policy {}: {:#}", name, e);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to list targets of {}: {:#}", name, e),
            }

            match self.call("iot", "DeletePolicy", json!({ "policyName": name })).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete policy {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    async fn sweep_functions(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self
            .junk_names("functions", "ListFunctions", "Functions", "FunctionName")
            .await?
        {
            match self
                .call("functions", "DeleteFunction", json!({ "FunctionName": name }))
                .await
            {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete function {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    async fn empty_bucket(&self, bucket: &str) -> Result<()> {
        // ---
        let versions = self
            .call("storage", "ListObjectVersions", json!({ "Bucket": bucket }))
            .await?;
        for list in ["Versions", "DeleteMarkers"] {
            let entries = versions[list].as_array().cloned().unwrap_or_default();
            for entry in entries {
                let delete = json!({ "Bucket": bucket, "Key": entry["Key"], "VersionId": entry["VersionId"] });
                self.call("storage", "DeleteObject", delete).await?;
            }
        }

        let objects = self
            .call("storage", "ListObjectsV2", json!({ "Bucket": bucket }))
            .await?;
        for key in string_field_list(&objects, "Contents", "Key") {
            self.call("storage", "DeleteObject", json!({ "Bucket": bucket, "Key": key }))
                .await?;
        }
        Ok(())
    }

    async fn sweep_buckets(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self.junk_names("storage", "ListBuckets", "Buckets", "Name").await? {
            if let Err(e) = self.empty_bucket(&name).await {
                tracing::warn!("Failed to empty bucket {}: {:#}", name, e);
            }
            match self.call("storage", "DeleteBucket", json!({ "Bucket": name })).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete bucket {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    async fn sweep_transcription_jobs(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self
            .junk_names(
                "transcribe",
                "ListTranscriptionJobs",
                "TranscriptionJobSummaries",
                "TranscriptionJobName",
            )
            .await?
        {
            let body = json!({ "TranscriptionJobName": name });
            match self.call("transcribe", "DeleteTranscriptionJob", body).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete transcription job {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    async fn sweep_notebooks(&self) -> Result<Vec<String>> {
        // ---
        let mut deleted = Vec::new();
        for name in self
            .junk_names(
                "inference",
                "ListNotebookInstances",
                "NotebookInstances",
                "NotebookInstanceName",
            )
            .await?
        {
            let body = json!({ "NotebookInstanceName": name });
            match self.call("inference", "DeleteNotebookInstance", body).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!("Failed to delete notebook {}: {:#}", name, e),
            }
        }
        Ok(deleted)
    }

    /// Delete every test/demo resource across services.
    ///
    /// Steps run in order and a failing step does not stop the sweep. Within a
    /// step, a resource that fails to delete is logged and left out of the
    /// deleted list.
    pub async fn delete_junk_services(&self) -> JunkSweep {
        // ---
        let mut sweep = JunkSweep::default();

        sweep.record("iot_things", self.sweep_things().await);
        sweep.record("iot_policies", self.sweep_policies().await);
        sweep.record("lambda_functions", self.sweep_functions().await);
        sweep.record("s3_buckets", self.sweep_buckets().await);
        sweep.entries.push((
            "lex_bots".to_string(),
            json!("Simulated deletion (bot cleanup not implemented)"),
        ));
        sweep.record("transcribe_jobs", self.sweep_transcription_jobs().await);
        sweep.record("sagemaker_notebooks", self.sweep_notebooks().await);

        sweep
    }

    /// Recreate the demo thing, function, bucket and bot with a shared
    /// timestamp suffix. Individual failures leave that entry empty.
    pub async fn recreate_demo_services(&self) -> DemoServices {
        // ---
        let timestamp = unix_timestamp();

        let sensor = self
            .create_thing_with_certificate(Some(&format!("demo-sensor-{timestamp}")))
            .await;
        let function = self.create_function(&format!("demo-data-processor-{timestamp}"), "data_processor");
        let bucket = self
            .create_data_lake_bucket(Some(&format!("demo-pollution-data-{timestamp}")))
            .await;
        let bot = self.create_bot(Some(&format!("DemoHarmfulAlgaeBloomBot-{timestamp}")));

        let recreated = sensor.is_some() && bucket.is_some();
        if recreated {
            tracing::info!("Demo services recreated with suffix {}", timestamp);
        } else {
            tracing::warn!("Demo services partially recreated with suffix {}", timestamp);
        }

        DemoServices {
            sensor,
            function,
            bucket,
            bot,
            recreated,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[tokio::test]
    async fn test_sweep_records_errors_in_order() {
        // ---
        let sweep = unreachable_gateway().delete_junk_services().await;
        let keys: Vec<&str> = sweep.keys().collect();
        assert_eq!(
            keys,
            vec![
                "iot_things_error",
                "iot_policies_error",
                "lambda_functions_error",
                "s3_buckets_error",
                "lex_bots",
                "transcribe_jobs_error",
                "sagemaker_notebooks_error",
            ]
        );

        let value = serde_json::to_value(&sweep).unwrap();
        assert!(value["lex_bots"].as_str().unwrap().starts_with("Simulated"));
    }

    #[test]
    fn test_record_success() {
        // ---
        let mut sweep = JunkSweep::default();
        sweep.record("iot_things", Ok(vec!["demo-sensor-1".to_string()]));
        assert_eq!(sweep.get("iot_things"), Some(&json!(["demo-sensor-1"])));
    }

    #[tokio::test]
    async fn test_recreate_never_fails() {
        // ---
        let demo = unreachable_gateway().recreate_demo_services().await;
        assert!(!demo.recreated);
        assert!(demo.sensor.is_none());
        assert!(demo.function.function_name.starts_with("demo-data-processor-"));
        assert!(demo.bot.bot_name.starts_with("DemoHarmfulAlgaeBloomBot-"));
    }
}
