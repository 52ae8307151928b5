//! Data models for sensor readings, citizen reports, predictions, cleanup
//! missions and campaigns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

// ---

/// Pollution level above which a reading is critical.
pub const CRITICAL_LEVEL: f64 = 8.0;

/// Pollution level above which a reading is a warning.
pub const WARNING_LEVEL: f64 = 6.0;

/// Severity status of a sensor reading, derived from its pollution level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Warning,
    Critical,
}

impl SensorStatus {
    // ---
    /// `> 8` is critical, `> 6` is warning, anything else is active.
    pub fn from_level(pollution_level: f64) -> Self {
        if pollution_level > CRITICAL_LEVEL {
            SensorStatus::Critical
        } else if pollution_level > WARNING_LEVEL {
            SensorStatus::Warning
        } else {
            SensorStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Active => "active",
            SensorStatus::Warning => "warning",
            SensorStatus::Critical => "critical",
        }
    }
}

/// Sensor reading as received by the ingestion endpoint.
///
/// Status is never accepted from the caller; it is derived from the level.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSensorReading {
    // ---
    pub id: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub pollution_level: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub microalgae: Option<i64>,
    pub temperature: Option<f64>,
    pub turbidity: Option<f64>,
}

/// Sensor reading as stored and served.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SensorReading {
    // ---
    #[serde(rename = "_id")]
    pub doc_id: Uuid,
    pub id: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub pollution_level: f64,
    pub status: String,
    #[sqlx(rename = "recorded_at")]
    pub timestamp: DateTime<Utc>,
    /// Microalgae concentration in cells/L.
    pub microalgae: i64,
    pub temperature: f64,
    pub turbidity: f64,
    pub stored_at: DateTime<Utc>,
}

impl RawSensorReading {
    // ---
    /// Fill the derived status and the default metrics for missing fields.
    pub fn to_reading(&self) -> SensorReading {
        // ---
        let now = Utc::now();
        SensorReading {
            doc_id: Uuid::new_v4(),
            id: self.id.clone(),
            location: self.location.clone(),
            lat: self.lat,
            lng: self.lng,
            pollution_level: self.pollution_level,
            status: SensorStatus::from_level(self.pollution_level).as_str().to_string(),
            timestamp: self.timestamp.unwrap_or(now),
            microalgae: self
                .microalgae
                .unwrap_or((self.pollution_level * 1000.0) as i64),
            temperature: self.temperature.unwrap_or(20.0),
            turbidity: self.turbidity.unwrap_or(self.pollution_level * 10.0),
            stored_at: now,
        }
    }
}

/// Label returned by image analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLabel {
    pub name: String,
    pub confidence: f64,
}

/// Citizen pollution report as stored and served.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CitizenReport {
    // ---
    #[serde(rename = "_id")]
    pub doc_id: Uuid,
    pub report_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollution_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub severity: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollution_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<Json<Vec<ImageLabel>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updated_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "reported_at")]
    pub timestamp: DateTime<Utc>,
    pub stored_at: DateTime<Utc>,
}

/// Citizen report ready to be inserted.
#[derive(Debug, Clone, Serialize)]
pub struct NewReport {
    // ---
    pub report_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollution_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub severity: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollution_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<Vec<ImageLabel>>,
    pub timestamp: DateTime<Utc>,
}

impl NewReport {
    // ---
    /// Build a report from the text fields of a submitted form.
    ///
    /// Coordinates are kept only when both are present and parse; a bad
    /// `pollution_level` is an error. Image fields are left unset.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, String> {
        // ---
        let text = |key: &str| fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let pollution_level = match text("pollution_level") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| format!("Invalid pollution_level: {raw}"))?,
            None => 0.0,
        };

        let coordinate = |key: &str| text(key).filter(|v| *v != "None");
        let (lat, lng) = match (coordinate("lat"), coordinate("lng")) {
            (Some(lat), Some(lng)) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
                (Ok(lat), Ok(lng)) => (Some(lat), Some(lng)),
                _ => {
                    tracing::warn!("Geo conversion failed for lat={lat} lng={lng}");
                    (None, None)
                }
            },
            _ => (None, None),
        };

        Ok(NewReport {
            report_id: new_report_id(),
            location_name: text("location").map(str::to_string),
            description: text("description").map(str::to_string),
            pollution_level: Some(pollution_level),
            lat,
            lng,
            reporter_name: Some(text("reporter_name").unwrap_or("Anonymous").to_string()),
            contact: Some(text("contact").unwrap_or_default().to_string()),
            severity: text("severity").unwrap_or("medium").to_string(),
            status: "pending".to_string(),
            reporter_type: Some("citizen".to_string()),
            pollution_type: None,
            image_path: None,
            image_analysis: None,
            timestamp: Utc::now(),
        })
    }
}

/// Generate a citizen report id of the form `CR-XXXXXXXX`.
pub fn new_report_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("CR-{}", simple[..8].to_uppercase())
}

/// Forecast for one region.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Prediction {
    // ---
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<Uuid>,
    pub region: String,
    pub current_level: f64,
    pub predicted_7days: f64,
    pub predicted_30days: f64,
    pub trend: String,
    pub confidence: f64,
}

/// Robots assigned to a cleanup mission, or totals across missions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RobotCounts {
    pub ocean_drones: i64,
    pub surface_vessels: i64,
    pub underwater_units: i64,
}

/// Cleanup mission as stored and served.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CleanupMission {
    // ---
    #[serde(rename = "_id")]
    pub doc_id: Uuid,
    pub mission_id: String,
    pub region: String,
    pub start_time: DateTime<Utc>,
    pub status: String,
    #[sqlx(flatten)]
    pub robots: RobotCounts,
    /// Waste collected in kg.
    pub waste_collected: i64,
    pub next_deployment: String,
}

/// Totals across all stored cleanup missions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub active_missions: i64,
    pub cleanup_robots: RobotCounts,
    pub waste_collected_today: i64,
    pub hotspots_addressed: i64,
    pub next_deployment: String,
}

/// Citizen engagement campaign.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Campaign {
    // ---
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<Uuid>,
    pub campaign_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<i64>,
    pub duration: String,
    pub activities: Json<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn create_test_raw_reading(location: &str, level: f64) -> RawSensorReading {
        // ---
        RawSensorReading {
            id: "sensor_test_001".to_string(),
            location: location.to_string(),
            lat: 43.7696,
            lng: 11.2558,
            pollution_level: level,
            timestamp: Some(Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()),
            microalgae: None,
            temperature: None,
            turbidity: None,
        }
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_status_thresholds() {
        // ---
        assert_eq!(SensorStatus::from_level(9.1), SensorStatus::Critical);
        assert_eq!(SensorStatus::from_level(8.01), SensorStatus::Critical);
        assert_eq!(SensorStatus::from_level(8.0), SensorStatus::Warning);
        assert_eq!(SensorStatus::from_level(7.2), SensorStatus::Warning);
        assert_eq!(SensorStatus::from_level(6.4), SensorStatus::Warning);
        assert_eq!(SensorStatus::from_level(6.0), SensorStatus::Active);
        assert_eq!(SensorStatus::from_level(3.2), SensorStatus::Active);
        assert_eq!(SensorStatus::from_level(0.0), SensorStatus::Active);
    }

    #[test]
    fn test_mediterranean_reading_is_critical() {
        // ---
        let reading = create_test_raw_reading("Mediterranean Sea", 9.1).to_reading();
        assert_eq!(reading.status, "critical");
        assert_eq!(reading.location, "Mediterranean Sea");
    }

    #[test]
    fn test_defaults_filled_from_level() {
        // ---
        let reading = create_test_raw_reading("Indian Ocean", 6.4).to_reading();
        assert_eq!(reading.microalgae, 6400);
        assert_eq!(reading.temperature, 20.0);
        assert!((reading.turbidity - 64.0).abs() < 1e-9);
        assert_eq!(reading.timestamp.to_rfc3339(), "2025-03-26T18:45:00+00:00");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        // ---
        let json = serde_json::to_string(&SensorStatus::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_report_without_image_omits_image_fields() {
        // ---
        let report = NewReport::from_form(&form(&[
            ("location", "Baltic Sea"),
            ("description", "Green scum along the shore"),
            ("pollution_level", "7"),
        ]))
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("image_path").is_none());
        assert!(json.get("image_analysis").is_none());
        assert_eq!(json["location_name"], "Baltic Sea");
        assert_eq!(json["reporter_name"], "Anonymous");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["status"], "pending");
        assert!(report.report_id.starts_with("CR-"));
        assert_eq!(report.report_id.len(), 11);
    }

    #[test]
    fn test_report_coordinates_need_both_values() {
        // ---
        let only_lat = NewReport::from_form(&form(&[("lat", "40.1"), ("lng", "None")])).unwrap();
        assert!(only_lat.lat.is_none());
        assert!(only_lat.lng.is_none());

        let both = NewReport::from_form(&form(&[("lat", "40.1"), ("lng", "-3.5")])).unwrap();
        assert_eq!(both.lat, Some(40.1));
        assert_eq!(both.lng, Some(-3.5));

        let garbage = NewReport::from_form(&form(&[("lat", "north"), ("lng", "-3.5")])).unwrap();
        assert!(garbage.lat.is_none());
    }

    #[test]
    fn test_report_rejects_bad_level() {
        // ---
        let err = NewReport::from_form(&form(&[("pollution_level", "very high")])).unwrap_err();
        assert!(err.contains("pollution_level"));
    }
}
