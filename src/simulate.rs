//! Simulated data sources.
//!
//! Nothing here is a model of real ocean conditions: readings and forecasts
//! are random walks around fixed per-region baselines, and seed data is drawn
//! uniformly from fixed lists. All generators take the RNG as a parameter so
//! tests can use a seeded one.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{
    Campaign, CleanupMission, CleanupSummary, NewReport, Prediction, RobotCounts, SensorReading,
    SensorStatus,
};

// ---

/// Region used by the live generators.
struct OceanRegion {
    name: &'static str,
    lat_range: (f64, f64),
    lng_range: (f64, f64),
    base_level: f64,
}

const OCEAN_REGIONS: [OceanRegion; 5] = [
    OceanRegion { name: "Pacific Ocean", lat_range: (30.0, 50.0), lng_range: (130.0, 180.0), base_level: 7.0 },
    OceanRegion { name: "Atlantic Ocean", lat_range: (30.0, 50.0), lng_range: (-80.0, -30.0), base_level: 5.5 },
    OceanRegion { name: "Mediterranean Sea", lat_range: (35.0, 45.0), lng_range: (10.0, 25.0), base_level: 8.5 },
    OceanRegion { name: "Indian Ocean", lat_range: (-40.0, -10.0), lng_range: (60.0, 120.0), base_level: 6.0 },
    OceanRegion { name: "Arctic Ocean", lat_range: (70.0, 85.0), lng_range: (-180.0, 180.0), base_level: 3.0 },
];

/// Seed locations: name, centre lat/lng and the jitter applied to each.
const SEED_LOCATIONS: [(&str, f64, f64, f64, f64); 10] = [
    ("Pacific Ocean", 35.0, 140.0, 10.0, 20.0),
    ("Atlantic Ocean", 40.0, -50.0, 10.0, 20.0),
    ("Mediterranean Sea", 40.0, 15.0, 5.0, 10.0),
    ("Indian Ocean", -20.0, 80.0, 10.0, 20.0),
    ("Arctic Ocean", 75.0, 0.0, 5.0, 180.0),
    ("Baltic Sea", 58.0, 20.0, 3.0, 5.0),
    ("North Sea", 55.0, 3.0, 3.0, 5.0),
    ("Caribbean Sea", 15.0, -75.0, 5.0, 10.0),
    ("South China Sea", 15.0, 115.0, 5.0, 10.0),
    ("Gulf of Mexico", 25.0, -90.0, 5.0, 10.0),
];

const DEPLOYMENT_ZONES: [&str; 5] = [
    "Mediterranean Sea - High Priority Zone",
    "Pacific Ocean - Critical Priority Zone",
    "Atlantic Ocean - Medium Priority Zone",
    "Indian Ocean - Monitoring Zone",
    "Arctic Ocean - Low Priority Zone",
];

const MISSION_STATUSES: [&str; 3] = ["active", "completed", "scheduled"];
const REPORT_SEVERITIES: [&str; 3] = ["low", "medium", "high"];
const REPORT_STATUSES: [&str; 3] = ["pending", "investigating", "resolved"];
const REPORTER_TYPES: [&str; 4] = ["citizen", "tourist", "volunteer", "student"];
const POLLUTION_TYPES: [&str; 5] = [
    "surface_scum",
    "discoloured_water",
    "fish_kill",
    "foam",
    "mixed_bloom",
];
const CAMPAIGN_TITLES: [&str; 4] = ["Awareness", "Cleanup", "Reporting", "Education"];

/// Everything written by a full seed.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub sensors: Vec<SensorReading>,
    pub missions: Vec<CleanupMission>,
    pub reports: Vec<NewReport>,
    pub campaigns: Vec<Campaign>,
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Build a reading whose status is derived from the already-rounded level.
#[allow(clippy::too_many_arguments)]
fn reading(
    id: String,
    location: &str,
    lat: f64,
    lng: f64,
    pollution_level: f64,
    timestamp: DateTime<Utc>,
    microalgae: i64,
    temperature: f64,
    turbidity: f64,
) -> SensorReading {
    // ---
    SensorReading {
        doc_id: Uuid::new_v4(),
        id,
        location: location.to_string(),
        lat,
        lng,
        pollution_level,
        status: SensorStatus::from_level(pollution_level).as_str().to_string(),
        timestamp,
        microalgae,
        temperature,
        turbidity,
        stored_at: Utc::now(),
    }
}

/// One fresh reading per ocean region, levels jittered ±1 around the region
/// baseline and clamped to `0.1..=10.0`.
pub fn live_sensor_readings<R: Rng + ?Sized>(rng: &mut R) -> Vec<SensorReading> {
    live_sensor_readings_at(rng, Utc::now())
}

/// Ids carry the batch time in milliseconds so batches taken within the same
/// second are all stored.
fn live_sensor_readings_at<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<SensorReading> {
    // ---
    let batch = now.timestamp_millis();

    OCEAN_REGIONS
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let lat = rng.gen_range(region.lat_range.0..=region.lat_range.1);
            let lng = rng.gen_range(region.lng_range.0..=region.lng_range.1);
            let level = (region.base_level + rng.gen_range(-1.0..=1.0)).clamp(0.1, 10.0);
            let level = round_to(level, 1);

            reading(
                format!("sensor_{batch}_{i:03}"),
                region.name,
                round_to(lat, 4),
                round_to(lng, 4),
                level,
                now,
                (level * 1000.0) as i64 + rng.gen_range(0..=500),
                round_to(20.0 + rng.gen_range(-10.0..=15.0), 1),
                round_to(level * 10.0 + rng.gen_range(0..=50) as f64, 1),
            )
        })
        .collect()
}

/// Random-walk forecasts per ocean region.
///
/// The current level is the region baseline ±1; the 7 and 30 day values apply
/// a random growth factor once and 1.5 times respectively, capped at 10.
pub fn random_walk_predictions<R: Rng + ?Sized>(rng: &mut R) -> Vec<Prediction> {
    // ---
    OCEAN_REGIONS
        .iter()
        .map(|region| {
            let current = (region.base_level + rng.gen_range(-1.0..=1.0)).clamp(0.1, 10.0);
            let factor: f64 = 1.0 + rng.gen_range(-0.1..=0.15);
            let predicted_7days = (current * factor).min(10.0);
            let predicted_30days = (current * factor.powf(1.5)).min(10.0);

            let trend = if predicted_7days > current * 1.05 {
                "increasing"
            } else if predicted_7days < current * 0.95 {
                "decreasing"
            } else {
                "stable"
            };

            Prediction {
                doc_id: None,
                region: region.name.to_string(),
                current_level: round_to(current, 1),
                predicted_7days: round_to(predicted_7days, 1),
                predicted_30days: round_to(predicted_30days, 1),
                trend: trend.to_string(),
                confidence: round_to(80.0 + rng.gen_range(0.0..=15.0), 1),
            }
        })
        .collect()
}

/// Random cleanup coordination snapshot, served when no missions are stored.
pub fn random_cleanup_summary<R: Rng + ?Sized>(rng: &mut R) -> CleanupSummary {
    // ---
    CleanupSummary {
        active_missions: rng.gen_range(8..=15),
        cleanup_robots: RobotCounts {
            ocean_drones: rng.gen_range(6..=10),
            surface_vessels: rng.gen_range(3..=6),
            underwater_units: rng.gen_range(4..=8),
        },
        waste_collected_today: rng.gen_range(2000..=3500),
        hotspots_addressed: rng.gen_range(10..=20),
        next_deployment: pick(rng, &DEPLOYMENT_ZONES).to_string(),
    }
}

/// Demo dataset: 120 sensors, 20 missions, 60 citizen reports, 10 campaigns.
pub fn seed_data<R: Rng + ?Sized>(rng: &mut R) -> SeedData {
    // ---
    let now = Utc::now();
    let region_names: Vec<&str> = SEED_LOCATIONS.iter().map(|l| l.0).collect();

    // Jitter each seed location once, as every record drawn from it shares the centre
    let centres: Vec<(&str, f64, f64)> = SEED_LOCATIONS
        .iter()
        .map(|&(name, lat, lng, lat_jitter, lng_jitter)| {
            (
                name,
                lat + rng.gen_range(-lat_jitter..=lat_jitter),
                lng + rng.gen_range(-lng_jitter..=lng_jitter),
            )
        })
        .collect();

    let sensors = (0..120)
        .map(|i| {
            let (name, lat, lng) = centres[rng.gen_range(0..centres.len())];
            let level = round_to(rng.gen_range(2.0..=10.0), 1);
            reading(
                format!("sensor_{i:03}"),
                name,
                round_to(lat + rng.gen_range(-1.0..=1.0), 4),
                round_to(lng + rng.gen_range(-1.0..=1.0), 4),
                level,
                now - Duration::hours(rng.gen_range(0..=72)),
                (level * 1000.0) as i64 + rng.gen_range(0..=500),
                round_to(15.0 + rng.gen_range(-5.0..=15.0), 1),
                round_to(level * 10.0 + rng.gen_range(0..=50) as f64, 1),
            )
        })
        .collect();

    let missions = (0..20)
        .map(|i| CleanupMission {
            doc_id: Uuid::new_v4(),
            mission_id: format!("mission_{i:03}"),
            region: pick(rng, &region_names).to_string(),
            start_time: now - Duration::days(rng.gen_range(0..=30)),
            status: pick(rng, &MISSION_STATUSES).to_string(),
            robots: RobotCounts {
                ocean_drones: rng.gen_range(2..=10),
                surface_vessels: rng.gen_range(1..=5),
                underwater_units: rng.gen_range(1..=5),
            },
            waste_collected: rng.gen_range(500..=5000),
            next_deployment: pick(rng, &region_names).to_string(),
        })
        .collect();

    let reports = (0..60)
        .map(|i| {
            let (name, lat, lng) = centres[rng.gen_range(0..centres.len())];
            NewReport {
                report_id: format!("CR-{i:04}"),
                location_name: Some(name.to_string()),
                description: None,
                pollution_level: None,
                lat: Some(round_to(lat, 4)),
                lng: Some(round_to(lng, 4)),
                reporter_name: None,
                contact: None,
                severity: pick(rng, &REPORT_SEVERITIES).to_string(),
                status: pick(rng, &REPORT_STATUSES).to_string(),
                reporter_type: Some(pick(rng, &REPORTER_TYPES).to_string()),
                pollution_type: Some(pick(rng, &POLLUTION_TYPES).to_string()),
                image_path: None,
                image_analysis: None,
                timestamp: now - Duration::hours(rng.gen_range(0..=200)),
            }
        })
        .collect();

    let campaigns = (0..10)
        .map(|i| Campaign {
            doc_id: None,
            campaign_id: format!("CAMP-{i:03}"),
            title: pick(rng, &CAMPAIGN_TITLES).to_string(),
            description: "Auto-seeded campaign.".to_string(),
            status: "active".to_string(),
            participants: Some(rng.gen_range(100..=10_000)),
            duration: format!("{} days", rng.gen_range(7..=30)),
            activities: Json(Vec::new()),
            target_audience: None,
            created_at: now - Duration::days(rng.gen_range(0..=60)),
        })
        .collect();

    SeedData {
        sensors,
        missions,
        reports,
        campaigns,
    }
}
