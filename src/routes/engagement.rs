//! Citizen engagement: metrics, dashboard, bots and campaigns.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{analytics_or_default, json_body, list_or_empty};
use crate::error::{ApiError, ApiResult};
use crate::gateway::{CitizenBot, EngagementMetrics, EngagementSystem};
use crate::models::{Campaign, CitizenReport};
use crate::store::{self, ReportAnalytics};
use crate::AppState;

// ---

const CAMPAIGN_LIMIT: i64 = 20;
const SUMMARY_REPORTS: i64 = 10;

#[derive(Serialize)]
struct ReportsSummary {
    reports: Vec<CitizenReport>,
    statistics: ReportAnalytics,
}

#[derive(Serialize)]
struct EngagementDashboard {
    reports_summary: ReportsSummary,
    engagement_metrics: EngagementMetrics,
    analytics: ReportAnalytics,
    timestamp: DateTime<Utc>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BotRequest {
    bot_name: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct CampaignRequest {
    campaign_type: Option<String>,
}

#[derive(Serialize)]
struct Action {
    action: &'static str,
    description: &'static str,
    impact: &'static str,
}

#[derive(Serialize)]
struct SuccessStory {
    title: &'static str,
    description: &'static str,
    impact: &'static str,
    participants: u32,
}

#[derive(Serialize)]
struct EngageActions {
    citizen_actions: [Action; 2],
    organization_actions: [Action; 2],
    government_actions: [Action; 2],
    success_stories: [SuccessStory; 2],
}

static ENGAGE_ACTIONS: EngageActions = EngageActions {
    citizen_actions: [
        Action {
            action: "Report a Bloom",
            description: "Submit sightings of discoloured water or scum via the app.",
            impact: "high",
        },
        Action {
            action: "Join Water Sampling",
            description: "Help collect samples at local lakes and beaches.",
            impact: "high",
        },
    ],
    organization_actions: [
        Action {
            action: "Sponsor Monitoring",
            description: "Fund sensor buoys in at-risk waters.",
            impact: "very_high",
        },
        Action {
            action: "Nutrient Audit",
            description: "Audit fertilizer and wastewater discharge in operations.",
            impact: "high",
        },
    ],
    government_actions: [
        Action {
            action: "Limit Nutrient Runoff",
            description: "Regulate agricultural phosphorus and nitrogen runoff.",
            impact: "very_high",
        },
        Action {
            action: "Fund Early Warning",
            description: "Support public bloom alerts and beach closures.",
            impact: "high",
        },
    ],
    success_stories: [
        SuccessStory {
            title: "Lakeside Watch 2023",
            description: "Volunteers flagged 40 blooms before they reached beaches.",
            impact: "high",
            participants: 200,
        },
        SuccessStory {
            title: "Runoff Buffer Program",
            description: "Reduced bloom days by 40% in one watershed.",
            impact: "very_high",
            participants: 500,
        },
    ],
};

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/citizen-engagement-metrics", get(engagement_metrics))
        .route("/api/citizen-engagement-dashboard", get(engagement_dashboard))
        .route("/api/create-citizen-bot", post(create_citizen_bot))
        .route("/api/create-engagement-system", post(create_engagement_system))
        .route("/api/create-engagement-campaign", post(create_campaign))
        .route("/api/campaigns", get(campaigns))
        .route("/api/engage-actions", get(engage_actions))
}

async fn engagement_metrics(State(state): State<AppState>) -> Json<EngagementMetrics> {
    Json(state.gateway.engagement_metrics())
}

/// Recent reports, report analytics and engagement metrics in one payload.
async fn engagement_dashboard(State(state): State<AppState>) -> Json<EngagementDashboard> {
    // ---
    let reports = store::list_reports(&state.pool, SUMMARY_REPORTS).await;
    let analytics = analytics_or_default(&state).await;

    Json(EngagementDashboard {
        reports_summary: ReportsSummary {
            reports: list_or_empty(reports, "recent citizen reports"),
            statistics: analytics.clone(),
        },
        engagement_metrics: state.gateway.engagement_metrics(),
        analytics,
        timestamp: Utc::now(),
    })
}

async fn create_citizen_bot(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CitizenBot>> {
    // ---
    let request: BotRequest = json_body(&body)?;
    let name = request.bot_name.as_deref().filter(|n| !n.is_empty());
    state
        .gateway
        .create_citizen_bot(name)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create citizen bot"))
}

async fn create_engagement_system(
    State(state): State<AppState>,
) -> ApiResult<Json<EngagementSystem>> {
    // ---
    state
        .gateway
        .create_engagement_system()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to create engagement system"))
}

/// Build a campaign from its template and store it.
async fn create_campaign(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Campaign>> {
    // ---
    let request: CampaignRequest = json_body(&body)?;
    let campaign_type = request
        .campaign_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("awareness");

    let mut campaign = state.gateway.create_campaign(campaign_type);
    let doc_id = store::insert_campaign(&state.pool, &campaign)
        .await
        .map_err(|e| ApiError::store(e, "Failed to create campaign"))?;
    campaign.doc_id = Some(doc_id);

    tracing::info!("Created {} campaign {}", campaign_type, campaign.campaign_id);
    Ok(Json(campaign))
}

async fn campaigns(State(state): State<AppState>) -> Json<Vec<Campaign>> {
    // ---
    let campaigns = store::list_campaigns(&state.pool, CAMPAIGN_LIMIT).await;
    Json(list_or_empty(campaigns, "campaigns"))
}

async fn engage_actions() -> Json<&'static EngageActions> {
    Json(&ENGAGE_ACTIONS)
}
