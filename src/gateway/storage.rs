use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{is_already_exists, CloudGateway};

// ---

#[derive(Debug, Clone, Serialize)]
pub struct DataLakeBucket {
    pub bucket_name: String,
    pub bucket_arn: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedObject {
    pub bucket_name: String,
    pub key: String,
    pub s3_uri: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupSnapshot {
    pub source_bucket: String,
    pub backup_bucket: String,
    pub objects_backed_up: usize,
    pub backup_timestamp: DateTime<Utc>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataAnalytics {
    pub data_type: String,
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub date_range: DateRange,
    pub file_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoredObject {
    key: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListObjectsResponse {
    #[serde(default)]
    contents: Vec<StoredObject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketsResponse {
    #[serde(default)]
    buckets: Vec<BucketEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketEntry {
    name: String,
    #[serde(default)]
    creation_date: String,
}

/// Object key for an upload of `data_type` at `now`.
fn object_key(data_type: &str, now: DateTime<Utc>) -> String {
    // ---
    let stamp = now.format("%Y/%m/%d/%H%M%S");
    match data_type {
        "sensor_data" => format!("raw-data/sensors/{stamp}.json"),
        "reports" => format!("raw-data/reports/{stamp}.json"),
        "images" => format!("raw-data/images/{stamp}.jpg"),
        "analysis" => format!("processed-data/analysis/{stamp}.json"),
        other => format!("raw-data/{other}/{stamp}.json"),
    }
}

/// File count, size, date range and extension histogram of listed objects.
///
/// Dates come from the `YYYY/MM/DD` segment that follows the two-level
/// prefix written by [`object_key`].
fn summarize_objects(data_type: &str, objects: &[StoredObject]) -> DataAnalytics {
    // ---
    let mut date_range = DateRange::default();
    let mut file_types = BTreeMap::new();

    for object in objects {
        let parts: Vec<&str> = object.key.split('/').collect();
        if parts.len() >= 5 {
            let date = parts[2..5].join("/");
            if date_range.earliest.as_ref().map_or(true, |e| date < *e) {
                date_range.earliest = Some(date.clone());
            }
            if date_range.latest.as_ref().map_or(true, |l| date > *l) {
                date_range.latest = Some(date);
            }
        }

        let ext = match object.key.rsplit_once('.') {
            Some((_, ext)) => ext.to_string(),
            None => "unknown".to_string(),
        };
        *file_types.entry(ext).or_insert(0) += 1;
    }

    DataAnalytics {
        data_type: data_type.to_string(),
        total_files: objects.len(),
        total_size_bytes: objects.iter().map(|o| o.size).sum(),
        date_range,
        file_types,
    }
}

fn timestamped_name(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().format("%Y%m%d-%H%M%S"))
}

impl CloudGateway {
    // ---
    pub(crate) async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.call("storage", "CreateBucket", json!({ "Bucket": bucket }))
            .await
            .map(|_| ())
    }

    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<StoredObject>> {
        // ---
        let mut body = json!({ "Bucket": bucket });
        if let Some(prefix) = prefix {
            body["Prefix"] = json!(prefix);
        }
        let reply = self.call("storage", "ListObjectsV2", body).await?;
        Ok(serde_json::from_value::<ListObjectsResponse>(reply)?.contents)
    }

    pub(crate) async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Value,
        content_type: &str,
        metadata: Value,
    ) -> Result<()> {
        // ---
        let request = json!({
            "Bucket": bucket,
            "Key": key,
            "Body": body,
            "ContentType": content_type,
            "Metadata": metadata,
        });
        self.call("storage", "PutObject", request).await.map(|_| ())
    }

    async fn configure_data_lake(&self, bucket: &str) -> Result<()> {
        // ---
        self.create_bucket(bucket).await?;

        let versioning = json!({
            "Bucket": bucket,
            "VersioningConfiguration": { "Status": "Enabled" }
        });
        self.call("storage", "PutBucketVersioning", versioning).await?;

        let lifecycle = json!({
            "Bucket": bucket,
            "LifecycleConfiguration": {
                "Rules": [{
                    "ID": "DataRetention",
                    "Status": "Enabled",
                    "Filter": { "Prefix": "" },
                    "Transitions": [
                        { "Days": 30, "StorageClass": "STANDARD_IA" },
                        { "Days": 90, "StorageClass": "GLACIER" }
                    ]
                }]
            }
        });
        self.call("storage", "PutBucketLifecycleConfiguration", lifecycle)
            .await?;
        Ok(())
    }

    /// Create a versioned bucket that moves objects to infrequent access after
    /// 30 days and to archive after 90. `None` on failure.
    pub async fn create_data_lake_bucket(&self, name: Option<&str>) -> Option<DataLakeBucket> {
        // ---
        let bucket_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| timestamped_name("pollution-data-lake"));

        match self.configure_data_lake(&bucket_name).await {
            Ok(()) => {
                tracing::info!("Created data lake bucket {}", bucket_name);
                Some(DataLakeBucket {
                    bucket_arn: format!("arn:aws:s3:::{bucket_name}"),
                    bucket_name,
                    status: "created_with_lifecycle",
                })
            }
            Err(e) => {
                tracing::error!("Failed to create data lake bucket {}: {:#}", bucket_name, e);
                None
            }
        }
    }

    /// Upload a document under a key derived from its type and the current
    /// time. Objects are stored as pretty JSON; strings are stored verbatim.
    pub async fn upload_pollution_data(
        &self,
        bucket: &str,
        data: &Value,
        data_type: &str,
    ) -> Option<UploadedObject> {
        // ---
        let now = Utc::now();
        let key = object_key(data_type, now);

        let (content, content_type) = match data {
            Value::String(raw) => (raw.clone(), "application/octet-stream"),
            other => match serde_json::to_string_pretty(other) {
                Ok(text) => (text, "application/json"),
                Err(e) => {
                    tracing::error!("Failed to encode upload for {}: {}", bucket, e);
                    return None;
                }
            },
        };

        let metadata = json!({
            "data_type": data_type,
            "uploaded_at": now.to_rfc3339(),
            "source": "aquapulse",
        });

        match self
            .put_object(bucket, &key, json!(content), content_type, metadata)
            .await
        {
            Ok(()) => Some(UploadedObject {
                s3_uri: format!("s3://{bucket}/{key}"),
                bucket_name: bucket.to_string(),
                key,
                status: "uploaded",
            }),
            Err(e) => {
                tracing::error!("Failed to upload {} data to {}: {:#}", data_type, bucket, e);
                None
            }
        }
    }

    /// Copy every object of `source` into `backup` under a timestamped prefix.
    ///
    /// When the source bucket is not reachable a simulated result is returned
    /// instead. `None` when the backup bucket or the listing fails.
    pub async fn create_backup_snapshot(
        &self,
        source: &str,
        backup: Option<&str>,
    ) -> Option<BackupSnapshot> {
        // ---
        let backup_bucket = backup
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| timestamped_name("pollution-backup"));

        if let Err(e) = self.call("storage", "HeadBucket", json!({ "Bucket": source })).await {
            tracing::warn!("Source bucket {} not accessible, simulating backup: {:#}", source, e);
            return Some(BackupSnapshot {
                source_bucket: source.to_string(),
                backup_bucket,
                objects_backed_up: 5,
                backup_timestamp: Utc::now(),
                status: "completed_simulated",
                note: Some("Demo backup - source bucket not accessible"),
            });
        }

        if let Err(e) = self.create_bucket(&backup_bucket).await {
            if !is_already_exists(&e) {
                tracing::error!("Failed to create backup bucket {}: {:#}", backup_bucket, e);
                return None;
            }
        }

        let objects = match self.list_objects(source, None).await {
            Ok(objects) => objects,
            Err(e) => {
                tracing::error!("Failed to list objects in {}: {:#}", source, e);
                return None;
            }
        };

        let prefix = timestamped_name("backup");
        let mut copied = 0;
        for object in &objects {
            let copy = json!({
                "Bucket": backup_bucket,
                "CopySource": { "Bucket": source, "Key": object.key },
                "Key": format!("{prefix}/{}", object.key),
            });
            match self.call("storage", "CopyObject", copy).await {
                Ok(_) => copied += 1,
                Err(e) => tracing::warn!("Failed to copy {}: {:#}", object.key, e),
            }
        }

        tracing::info!("Backed up {} of {} objects from {}", copied, objects.len(), source);
        Some(BackupSnapshot {
            source_bucket: source.to_string(),
            backup_bucket,
            objects_backed_up: copied,
            backup_timestamp: Utc::now(),
            status: "completed",
            note: None,
        })
    }

    /// Statistics over the objects stored under `raw-data/{data_type}/`.
    pub async fn data_analytics(&self, bucket: &str, data_type: &str) -> Option<DataAnalytics> {
        // ---
        let prefix = format!("raw-data/{data_type}/");
        match self.list_objects(bucket, Some(&prefix)).await {
            Ok(objects) => Some(summarize_objects(data_type, &objects)),
            Err(e) => {
                tracing::error!("Failed to read analytics for {}: {:#}", bucket, e);
                None
            }
        }
    }

    /// Buckets whose name mentions pollution or this service. Empty on failure.
    pub async fn list_buckets(&self) -> Vec<BucketInfo> {
        // ---
        let reply = match self.call("storage", "ListBuckets", json!({})).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to list buckets: {:#}", e);
                return Vec::new();
            }
        };

        let buckets = match serde_json::from_value::<ListBucketsResponse>(reply) {
            Ok(listing) => listing.buckets,
            Err(e) => {
                tracing::error!("Unexpected ListBuckets reply: {}", e);
                return Vec::new();
            }
        };

        buckets
            .into_iter()
            .filter(|b| {
                let lower = b.name.to_lowercase();
                lower.contains("pollution") || lower.contains("aquapulse")
            })
            .map(|b| BucketInfo {
                name: b.name,
                creation_date: b.creation_date,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;
    use chrono::TimeZone;

    fn object(key: &str, size: u64) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            size,
        }
    }

    #[test]
    fn test_object_key_layout() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 7).unwrap();
        assert_eq!(object_key("sensor_data", now), "raw-data/sensors/2025/03/26/184507.json");
        assert_eq!(object_key("reports", now), "raw-data/reports/2025/03/26/184507.json");
        assert_eq!(object_key("images", now), "raw-data/images/2025/03/26/184507.jpg");
        assert_eq!(object_key("analysis", now), "processed-data/analysis/2025/03/26/184507.json");
        assert_eq!(object_key("buoys", now), "raw-data/buoys/2025/03/26/184507.json");
    }

    #[test]
    fn test_summarize_objects() {
        // ---
        let objects = vec![
            object("raw-data/sensors/2025/03/26/184507.json", 100),
            object("raw-data/sensors/2025/01/02/010101.json", 50),
            object("raw-data/sensors/2025/04/11/090000.csv", 25),
            object("raw-data/sensors/readme", 5),
        ];
        let analytics = summarize_objects("sensor_data", &objects);

        assert_eq!(analytics.total_files, 4);
        assert_eq!(analytics.total_size_bytes, 180);
        assert_eq!(analytics.date_range.earliest.as_deref(), Some("2025/01/02"));
        assert_eq!(analytics.date_range.latest.as_deref(), Some("2025/04/11"));
        assert_eq!(analytics.file_types["json"], 2);
        assert_eq!(analytics.file_types["csv"], 1);
        assert_eq!(analytics.file_types["unknown"], 1);
    }

    #[test]
    fn test_summarize_empty() {
        // ---
        let analytics = summarize_objects("reports", &[]);
        assert_eq!(analytics.total_files, 0);
        assert_eq!(analytics.date_range, DateRange::default());
        assert!(analytics.file_types.is_empty());
    }

    #[tokio::test]
    async fn test_fallbacks_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();

        assert!(gateway.create_data_lake_bucket(Some("pollution-lake")).await.is_none());
        assert!(gateway
            .upload_pollution_data("pollution-lake", &json!({"level": 7}), "sensor_data")
            .await
            .is_none());
        assert!(gateway.data_analytics("pollution-lake", "sensor_data").await.is_none());
        assert!(gateway.list_buckets().await.is_empty());

        let backup = gateway.create_backup_snapshot("pollution-lake", None).await.unwrap();
        assert_eq!(backup.status, "completed_simulated");
        assert_eq!(backup.objects_backed_up, 5);
        assert!(backup.backup_bucket.starts_with("pollution-backup-"));
    }
}
