//! In-process derivations over fetched sensor readings and cleanup missions.
//!
//! Everything here is synchronous and side-effect free; handlers fetch from
//! the store, call into this module and serialize the result.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    CleanupMission, CleanupSummary, Prediction, SensorReading, CRITICAL_LEVEL, WARNING_LEVEL,
};
use crate::simulate::round_to;

// ---

/// Level above which a reading raises an alert.
pub const ALERT_LEVEL: f64 = 7.0;

const ALERT_ACTIONS: [&str; 2] = ["deploy_cleanup_units", "notify_authorities"];

pub const NO_RECOMMENDATION_HTML: &str = "<p><strong>⚠️ No recommendation available.</strong></p>";

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub location: String,
    pub pollution_level: f64,
    pub severity: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub actions_required: Vec<&'static str>,
    pub recommendation_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertDetail {
    pub id: String,
    pub location: String,
    pub pollution_level: f64,
    pub severity: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub actions_required: Vec<&'static str>,
    pub ai_analysis: &'static str,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    pub id: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub pollution_level: f64,
    pub microalgae: i64,
    pub status: String,
    pub priority: &'static str,
    pub detected_at: DateTime<Utc>,
    pub cleanup_units_dispatched: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionHotspot {
    pub location: String,
    pub pollution_level: f64,
    pub priority: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SensorStatistics {
    pub total_sensors: usize,
    pub active_sensors: usize,
    pub critical_alerts: usize,
    pub locations_monitored: usize,
    pub total_volume: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PollutionTrends {
    pub increasing_regions: Vec<String>,
    pub stable_regions: Vec<String>,
    pub improving_regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupEffectiveness {
    pub total_waste_collected_kg: i64,
    pub hotspots_addressed: i64,
    pub efficiency_rating: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataLakeInsights {
    pub sensor_data: Vec<SensorReading>,
    pub predictions: Vec<Prediction>,
    pub cleanup_status: CleanupSummary,
    pub statistics: SensorStatistics,
    pub pollution_trends: PollutionTrends,
    pub hotspots: Vec<RegionHotspot>,
    pub cleanup_effectiveness: CleanupEffectiveness,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalImpact {
    pub region: String,
    pub pollution_level: f64,
    pub trend: &'static str,
    pub impact: &'static str,
    pub affected_area_km2: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentStatus {
    pub total_oceans_affected: usize,
    pub marine_species_at_risk: usize,
    pub coastal_communities_impacted: usize,
    pub economic_cost_billion_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactForecast {
    pub predicted_increase_percent: u32,
    pub new_hotspots: usize,
    pub cleanup_effectiveness: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactPredictions {
    pub short_term_6_months: ImpactForecast,
    pub long_term_5_years: ImpactForecast,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalImpact {
    pub current_status: CurrentStatus,
    pub regional_analysis: Vec<RegionalImpact>,
    pub total_affected_area_km2: u64,
    pub predictions: ImpactPredictions,
    pub ai_recommendations: Vec<&'static str>,
}

// ---

/// Group pollution levels by location, keeping first-seen order.
fn levels_by_location(readings: &[SensorReading]) -> Vec<(&str, Vec<f64>)> {
    // ---
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for r in readings {
        match groups.iter_mut().find(|(loc, _)| *loc == r.location) {
            Some((_, levels)) => levels.push(r.pollution_level),
            None => groups.push((r.location.as_str(), vec![r.pollution_level])),
        }
    }
    groups
}

fn mean(levels: &[f64]) -> f64 {
    levels.iter().sum::<f64>() / levels.len() as f64
}

fn alert_severity(level: f64) -> &'static str {
    if level > CRITICAL_LEVEL {
        "high"
    } else {
        "medium"
    }
}

/// Prompt sent to the agent for an alert recommendation.
pub fn alert_prompt(reading: &SensorReading) -> String {
    format!(
        "A pollution alert has been triggered for {} with a pollution level of {}. \
         Provide a concise, actionable HTML recommendation (3-4 lines, use <p> tags, include \
         relevant emojis) for authorities and cleanup teams. Focus on immediate actions, \
         resource deployment, and community notification.",
        reading.location, reading.pollution_level
    )
}

/// PREDICTION STUB: copies each reading's current level forward unchanged,
/// with trend `stable` and confidence 90.
pub fn echo_predictions(readings: &[SensorReading]) -> Vec<Prediction> {
    // ---
    readings
        .iter()
        .map(|r| Prediction {
            doc_id: None,
            region: r.location.clone(),
            current_level: r.pollution_level,
            predicted_7days: r.pollution_level,
            predicted_30days: r.pollution_level,
            trend: "stable".to_string(),
            confidence: 90.0,
        })
        .collect()
}

/// Sum robots and waste across missions.
///
/// `hotspots_addressed` counts completed missions; `next_deployment` is the
/// first non-empty value in mission order.
pub fn summarize_missions(missions: &[CleanupMission]) -> CleanupSummary {
    // ---
    missions
        .iter()
        .fold(CleanupSummary::default(), |mut summary, m| {
            summary.cleanup_robots.ocean_drones += m.robots.ocean_drones;
            summary.cleanup_robots.surface_vessels += m.robots.surface_vessels;
            summary.cleanup_robots.underwater_units += m.robots.underwater_units;
            summary.waste_collected_today += m.waste_collected;
            match m.status.as_str() {
                "active" => summary.active_missions += 1,
                "completed" => summary.hotspots_addressed += 1,
                _ => {}
            }
            if summary.next_deployment.is_empty() {
                summary.next_deployment = m.next_deployment.clone();
            }
            summary
        })
}

/// Alerts for readings above [`ALERT_LEVEL`], each with a recommendation
/// from `recommend` or a placeholder when it has none.
pub fn alerts<F>(readings: &[SensorReading], mut recommend: F) -> Vec<Alert>
where
    F: FnMut(&SensorReading) -> Option<String>,
{
    // ---
    readings
        .iter()
        .filter(|r| r.pollution_level > ALERT_LEVEL)
        .map(|r| Alert {
            id: format!("alert-{}", r.id),
            location: r.location.clone(),
            pollution_level: r.pollution_level,
            severity: alert_severity(r.pollution_level),
            message: format!("High pollution detected in {}", r.location),
            timestamp: r.timestamp,
            actions_required: ALERT_ACTIONS.to_vec(),
            recommendation_html: recommend(r)
                .unwrap_or_else(|| NO_RECOMMENDATION_HTML.to_string()),
        })
        .collect()
}

/// Detail for `alert-{sensor id}`, or `None` when no reading matches.
pub fn alert_detail(readings: &[SensorReading], alert_id: &str) -> Option<AlertDetail> {
    // ---
    let sensor_id = alert_id.strip_prefix("alert-")?;
    let r = readings.iter().find(|r| r.id == sensor_id)?;
    let critical = r.pollution_level > CRITICAL_LEVEL;

    Some(AlertDetail {
        id: alert_id.to_string(),
        location: r.location.clone(),
        pollution_level: r.pollution_level,
        severity: alert_severity(r.pollution_level),
        message: if critical {
            "Critical pollution levels detected"
        } else {
            "High pollution detected"
        },
        timestamp: r.timestamp,
        actions_required: ALERT_ACTIONS.to_vec(),
        ai_analysis: if critical {
            "High concentration of harmful algae detected. Immediate cleanup required."
        } else {
            "Elevated pollution detected. Monitoring recommended."
        },
        recommendations: vec![
            "Deploy ocean drones to affected area",
            "Activate surface vessels for debris collection",
            "Notify local authorities and environmental agencies",
        ],
    })
}

/// Readings above the warning level, with dispatch priority.
pub fn hotspots(readings: &[SensorReading]) -> Vec<Hotspot> {
    // ---
    readings
        .iter()
        .filter(|r| r.pollution_level > WARNING_LEVEL)
        .map(|r| {
            let critical = r.pollution_level > CRITICAL_LEVEL;
            Hotspot {
                id: r.id.clone(),
                location: r.location.clone(),
                coordinates: Coordinates { lat: r.lat, lng: r.lng },
                pollution_level: r.pollution_level,
                microalgae: r.microalgae,
                status: r.status.clone(),
                priority: if critical { "high" } else { "medium" },
                detected_at: r.timestamp,
                cleanup_units_dispatched: if critical { 2 } else { 1 },
            }
        })
        .collect()
}

fn fallback_trends() -> PollutionTrends {
    PollutionTrends {
        increasing_regions: vec!["Mediterranean Sea".into(), "Pacific Ocean".into()],
        stable_regions: vec!["Atlantic Ocean".into(), "Arctic Ocean".into()],
        improving_regions: vec!["Indian Ocean".into()],
    }
}

fn fallback_region_hotspots() -> Vec<RegionHotspot> {
    [
        ("Mediterranean Sea", 9.1, "critical"),
        ("Pacific Ocean", 7.2, "high"),
        ("Atlantic Ocean", 5.8, "medium"),
    ]
    .into_iter()
    .map(|(location, pollution_level, priority)| RegionHotspot {
        location: location.to_string(),
        pollution_level,
        priority,
    })
    .collect()
}

/// Regional trends, per-region hotspots and cleanup effectiveness.
///
/// With no readings the trends and hotspots fall back to a fixed demo set
/// while the sensor statistics stay zeroed.
pub fn data_lake_insights(
    readings: Vec<SensorReading>,
    predictions: Vec<Prediction>,
    cleanup: CleanupSummary,
) -> DataLakeInsights {
    // ---
    let (pollution_trends, hotspots) = if readings.is_empty() {
        (fallback_trends(), fallback_region_hotspots())
    } else {
        let groups = levels_by_location(&readings);
        let mut trends = PollutionTrends::default();
        let mut hotspots = Vec::with_capacity(groups.len());

        for (location, levels) in &groups {
            let avg = mean(levels);
            if avg > ALERT_LEVEL {
                trends.increasing_regions.push(location.to_string());
            } else if avg < 4.0 {
                trends.improving_regions.push(location.to_string());
            } else {
                trends.stable_regions.push(location.to_string());
            }

            let max = levels.iter().copied().fold(f64::MIN, f64::max);
            hotspots.push(RegionHotspot {
                location: location.to_string(),
                pollution_level: round_to(max, 1),
                priority: if max > CRITICAL_LEVEL {
                    "critical"
                } else if max > WARNING_LEVEL {
                    "high"
                } else {
                    "medium"
                },
            });
        }

        hotspots.sort_by(|a, b| b.pollution_level.total_cmp(&a.pollution_level));
        (trends, hotspots)
    };

    let statistics = SensorStatistics {
        total_sensors: readings.len(),
        active_sensors: readings.iter().filter(|r| r.status == "active").count(),
        critical_alerts: readings.iter().filter(|r| r.status == "critical").count(),
        locations_monitored: levels_by_location(&readings).len(),
        total_volume: 0,
    };

    let cleanup_effectiveness = CleanupEffectiveness {
        total_waste_collected_kg: cleanup.waste_collected_today,
        hotspots_addressed: cleanup.hotspots_addressed,
        efficiency_rating: 85,
    };

    DataLakeInsights {
        sensor_data: readings,
        predictions,
        cleanup_status: cleanup,
        statistics,
        pollution_trends,
        hotspots,
        cleanup_effectiveness,
    }
}

fn impact_for(avg: f64) -> (&'static str, &'static str, u64) {
    if avg > ALERT_LEVEL {
        ("critical", "severe", 2_500_000)
    } else if avg > 5.0 {
        ("increasing", "high", 1_500_000)
    } else {
        ("stable", "medium", 1_000_000)
    }
}

/// Regional impact classification and headline estimates.
///
/// Estimates scale with the number of critical (`> 8`) and warning
/// (`6 < level <= 8`) readings. With no readings a fixed demo set is returned.
pub fn global_impact(readings: &[SensorReading]) -> GlobalImpact {
    // ---
    let (current_status, regional_analysis, total_affected_area_km2) = if readings.is_empty() {
        let regional = [
            ("Pacific Ocean", 7.2),
            ("Mediterranean Sea", 9.1),
            ("Atlantic Ocean", 5.8),
        ]
        .into_iter()
        .map(|(region, level)| {
            let (trend, impact, area) = match region {
                "Mediterranean Sea" => ("critical", "severe", 2_500_000),
                "Pacific Ocean" => ("increasing", "high", 1_500_000),
                _ => ("stable", "medium", 1_000_000),
            };
            RegionalImpact {
                region: region.to_string(),
                pollution_level: level,
                trend,
                impact,
                affected_area_km2: area,
            }
        })
        .collect();

        let status = CurrentStatus {
            total_oceans_affected: 5,
            marine_species_at_risk: 700,
            coastal_communities_impacted: 1000,
            economic_cost_billion_usd: 13.0,
        };
        (status, regional, 5_000_000)
    } else {
        let groups = levels_by_location(readings);
        let regional: Vec<RegionalImpact> = groups
            .iter()
            .map(|(region, levels)| {
                let avg = mean(levels);
                let (trend, impact, area) = impact_for(avg);
                RegionalImpact {
                    region: region.to_string(),
                    pollution_level: round_to(avg, 1),
                    trend,
                    impact,
                    affected_area_km2: area,
                }
            })
            .collect();
        let total_area = regional.iter().map(|r| r.affected_area_km2).sum();

        let critical = readings
            .iter()
            .filter(|r| r.pollution_level > CRITICAL_LEVEL)
            .count();
        let warning = readings
            .iter()
            .filter(|r| r.pollution_level > WARNING_LEVEL && r.pollution_level <= CRITICAL_LEVEL)
            .count();

        let status = CurrentStatus {
            total_oceans_affected: groups.len(),
            marine_species_at_risk: critical * 100 + warning * 50,
            coastal_communities_impacted: critical * 200 + warning * 100,
            economic_cost_billion_usd: round_to((critical * 2 + warning) as f64, 1),
        };
        (status, regional, total_area)
    };

    let increasing = regional_analysis
        .iter()
        .filter(|r| r.trend == "increasing")
        .count();

    GlobalImpact {
        predictions: ImpactPredictions {
            short_term_6_months: ImpactForecast {
                predicted_increase_percent: 15,
                new_hotspots: increasing,
                cleanup_effectiveness: 75,
            },
            long_term_5_years: ImpactForecast {
                predicted_increase_percent: 45,
                new_hotspots: regional_analysis.len() * 2,
                cleanup_effectiveness: 85,
            },
        },
        current_status,
        regional_analysis,
        total_affected_area_km2,
        ai_recommendations: vec![
            "Reduce nutrient runoff from agriculture and wastewater",
            "Increase investment in bloom monitoring and cleanup technologies",
            "Expand early-warning coverage for coastal communities",
            "Improve waste management infrastructure",
        ],
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{RawSensorReading, RobotCounts};
    use uuid::Uuid;

    fn reading(id: &str, location: &str, level: f64) -> SensorReading {
        // ---
        RawSensorReading {
            id: id.to_string(),
            location: location.to_string(),
            lat: 40.0,
            lng: 15.0,
            pollution_level: level,
            timestamp: None,
            microalgae: None,
            temperature: None,
            turbidity: None,
        }
        .to_reading()
    }

    fn mission(status: &str, drones: i64, waste: i64, next: &str) -> CleanupMission {
        // ---
        CleanupMission {
            doc_id: Uuid::new_v4(),
            mission_id: format!("mission_{status}"),
            region: "Baltic Sea".to_string(),
            start_time: Utc::now(),
            status: status.to_string(),
            robots: RobotCounts {
                ocean_drones: drones,
                surface_vessels: 1,
                underwater_units: 2,
            },
            waste_collected: waste,
            next_deployment: next.to_string(),
        }
    }

    #[test]
    fn test_mediterranean_critical_alert_is_high() {
        // ---
        let readings = vec![
            reading("sensor_001", "Mediterranean Sea", 9.1),
            reading("sensor_002", "Arctic Ocean", 3.2),
            reading("sensor_003", "Pacific Ocean", 7.5),
        ];

        let alerts = alerts(&readings, |_| None);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "alert-sensor_001");
        assert_eq!(alerts[0].severity, "high");
        assert_eq!(alerts[0].recommendation_html, NO_RECOMMENDATION_HTML);
        assert_eq!(alerts[1].severity, "medium");
        assert_eq!(alerts[1].actions_required, ALERT_ACTIONS.to_vec());
    }

    #[test]
    fn test_alert_uses_recommendation() {
        // ---
        let readings = vec![reading("s1", "Mediterranean Sea", 9.1)];
        let alerts = alerts(&readings, |r| Some(format!("<p>{}</p>", r.location)));
        assert_eq!(alerts[0].recommendation_html, "<p>Mediterranean Sea</p>");
    }

    #[test]
    fn test_alert_detail_lookup() {
        // ---
        let readings = vec![reading("s1", "Mediterranean Sea", 9.1), reading("s2", "Baltic Sea", 7.2)];

        let detail = alert_detail(&readings, "alert-s1").unwrap();
        assert_eq!(detail.message, "Critical pollution levels detected");
        assert_eq!(detail.recommendations.len(), 3);

        let detail = alert_detail(&readings, "alert-s2").unwrap();
        assert_eq!(detail.severity, "medium");
        assert_eq!(detail.message, "High pollution detected");

        assert!(alert_detail(&readings, "alert-missing").is_none());
        assert!(alert_detail(&readings, "s1").is_none());
    }

    #[test]
    fn test_hotspots_threshold_and_dispatch() {
        // ---
        let readings = vec![
            reading("a", "Mediterranean Sea", 9.1),
            reading("b", "Atlantic Ocean", 6.0),
            reading("c", "Pacific Ocean", 6.4),
        ];
        let spots = hotspots(&readings);
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].cleanup_units_dispatched, 2);
        assert_eq!(spots[0].priority, "high");
        assert_eq!(spots[1].cleanup_units_dispatched, 1);
        assert_eq!(spots[1].status, "warning");
    }

    #[test]
    fn test_summarize_missions() {
        // ---
        let missions = vec![
            mission("active", 4, 1000, ""),
            mission("completed", 2, 500, "North Sea"),
            mission("scheduled", 3, 700, "Baltic Sea"),
        ];
        let summary = summarize_missions(&missions);
        assert_eq!(summary.active_missions, 1);
        assert_eq!(summary.hotspots_addressed, 1);
        assert_eq!(summary.cleanup_robots.ocean_drones, 9);
        assert_eq!(summary.cleanup_robots.underwater_units, 6);
        assert_eq!(summary.waste_collected_today, 2200);
        assert_eq!(summary.next_deployment, "North Sea");
    }

    #[test]
    fn test_empty_inputs_are_zeroed() {
        // ---
        assert_eq!(summarize_missions(&[]), CleanupSummary::default());
        assert!(alerts(&[], |_| None).is_empty());
        assert!(hotspots(&[]).is_empty());
        assert!(echo_predictions(&[]).is_empty());

        let insights = data_lake_insights(Vec::new(), Vec::new(), CleanupSummary::default());
        assert_eq!(insights.statistics.total_sensors, 0);
        assert_eq!(insights.statistics.locations_monitored, 0);
        assert_eq!(insights.cleanup_effectiveness.total_waste_collected_kg, 0);
    }

    #[test]
    fn test_echo_predictions_copy_level() {
        // ---
        let preds = echo_predictions(&[reading("s1", "Indian Ocean", 6.4)]);
        assert_eq!(preds[0].region, "Indian Ocean");
        assert_eq!(preds[0].predicted_30days, 6.4);
        assert_eq!(preds[0].trend, "stable");
        assert_eq!(preds[0].confidence, 90.0);
    }

    #[test]
    fn test_data_lake_trends_and_hotspots() {
        // ---
        let readings = vec![
            reading("a", "Mediterranean Sea", 8.6),
            reading("b", "Mediterranean Sea", 9.0),
            reading("c", "Arctic Ocean", 2.5),
            reading("d", "Atlantic Ocean", 5.5),
        ];
        let insights = data_lake_insights(readings, Vec::new(), CleanupSummary::default());

        assert_eq!(insights.pollution_trends.increasing_regions, vec!["Mediterranean Sea"]);
        assert_eq!(insights.pollution_trends.improving_regions, vec!["Arctic Ocean"]);
        assert_eq!(insights.pollution_trends.stable_regions, vec!["Atlantic Ocean"]);

        assert_eq!(insights.hotspots[0].location, "Mediterranean Sea");
        assert_eq!(insights.hotspots[0].pollution_level, 9.0);
        assert_eq!(insights.hotspots[0].priority, "critical");
        assert_eq!(insights.hotspots.last().unwrap().location, "Arctic Ocean");

        assert_eq!(insights.statistics.total_sensors, 4);
        assert_eq!(insights.statistics.critical_alerts, 2);
        assert_eq!(insights.statistics.locations_monitored, 3);
        assert_eq!(insights.cleanup_effectiveness.efficiency_rating, 85);
    }

    #[test]
    fn test_global_impact_estimates() {
        // ---
        let readings = vec![
            reading("a", "Mediterranean Sea", 9.1),
            reading("b", "Pacific Ocean", 7.2),
            reading("c", "Pacific Ocean", 5.0),
        ];
        let impact = global_impact(&readings);

        assert_eq!(impact.current_status.total_oceans_affected, 2);
        assert_eq!(impact.current_status.marine_species_at_risk, 150);
        assert_eq!(impact.current_status.coastal_communities_impacted, 300);
        assert_eq!(impact.current_status.economic_cost_billion_usd, 3.0);

        assert_eq!(impact.regional_analysis[0].trend, "critical");
        assert_eq!(impact.regional_analysis[1].trend, "increasing");
        assert_eq!(impact.total_affected_area_km2, 4_000_000);
        assert_eq!(impact.predictions.short_term_6_months.new_hotspots, 1);
        assert_eq!(impact.predictions.long_term_5_years.new_hotspots, 4);
    }

    #[test]
    fn test_global_impact_fallback() {
        // ---
        let impact = global_impact(&[]);
        assert_eq!(impact.regional_analysis.len(), 3);
        assert_eq!(impact.current_status.total_oceans_affected, 5);
        assert_eq!(impact.total_affected_area_km2, 5_000_000);
    }
}
