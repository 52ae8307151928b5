use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;

use super::{functions::ReportProcessor, unix_timestamp, CloudGateway};
use crate::models::Campaign;

// ---

const REPORT_KEYWORDS: [&str; 7] = [
    "harmful algae bloom",
    "pollution",
    "waste",
    "trash",
    "debris",
    "bottle",
    "bag",
];

#[derive(Debug, Clone, Serialize)]
pub struct BotReply {
    pub message: &'static str,
    pub action_required: bool,
    pub priority: &'static str,
    pub next_steps: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatAnalysis {
    pub severity: &'static str,
    pub priority: &'static str,
    pub recommended_actions: [&'static str; 2],
    pub community_impact: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReport {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub user_message: String,
    pub bot_response: BotReply,
    pub analysis: ChatAnalysis,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementMetrics {
    pub total_citizens: u32,
    pub active_reporters: u32,
    pub reports_this_month: u32,
    pub response_time_avg: &'static str,
    pub satisfaction_rate: f64,
    pub community_events: u32,
    pub volunteer_hours: u32,
    pub social_media_reach: u32,
    pub mobile_app_users: u32,
    pub voice_reports: u32,
    pub photo_reports: u32,
    pub text_reports: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportsTable {
    pub table_name: &'static str,
    pub status: &'static str,
    pub attributes: [&'static str; 5],
    pub simulated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementSystem {
    pub engagement_system: &'static str,
    pub bucket_name: String,
    pub lambda_function: Option<ReportProcessor>,
    pub reports_table: ReportsTable,
}

struct CampaignTemplate {
    title: &'static str,
    description: &'static str,
    activities: [&'static str; 3],
    target_audience: &'static str,
    duration: &'static str,
}

fn campaign_template(campaign_type: &str) -> CampaignTemplate {
    // ---
    match campaign_type {
        "cleanup" => CampaignTemplate {
            title: "Community Cleanup Initiative",
            description: "Organize community cleanup events",
            activities: ["Beach cleanup", "River cleanup", "Park cleanup"],
            target_audience: "Local communities",
            duration: "7 days",
        },
        "reporting" => CampaignTemplate {
            title: "Enhanced Reporting System",
            description: "Improve citizen reporting capabilities",
            activities: ["Mobile app updates", "Voice reporting", "Photo reporting"],
            target_audience: "Active citizens",
            duration: "14 days",
        },
        _ => CampaignTemplate {
            title: "Harmful Algae Bloom Awareness Campaign",
            description: "Educate citizens about harmful algae bloom impact",
            activities: ["Workshops", "Social media posts", "School programs"],
            target_audience: "General public",
            duration: "30 days",
        },
    }
}

fn bot_reply(message: &str) -> BotReply {
    // ---
    let lower = message.to_lowercase();
    if REPORT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        BotReply {
            message: "Thank you for reporting this harmful algae bloom issue. Our team will \
                      investigate and take appropriate action. You'll receive updates on the progress.",
            action_required: true,
            priority: "medium",
            next_steps: vec!["Location verification", "Severity assessment", "Cleanup coordination"],
        }
    } else {
        BotReply {
            message: "Thank you for your message. How can I help you with harmful algae bloom \
                      reporting or environmental concerns?",
            action_required: false,
            priority: "low",
            next_steps: Vec::new(),
        }
    }
}

impl CloudGateway {
    // ---
    /// CHAT STUB: keyword classification of a citizen chat message.
    pub fn process_chat_report(
        &self,
        message: &str,
        user_id: Option<&str>,
        session_id: Option<&str>,
    ) -> ChatReport {
        // ---
        let session_id = session_id
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("session-{}", unix_timestamp()));

        ChatReport {
            session_id,
            user_id: user_id.map(str::to_string),
            user_message: message.to_string(),
            bot_response: bot_reply(message),
            analysis: ChatAnalysis {
                severity: "medium",
                priority: "normal",
                recommended_actions: ["Investigate location", "Coordinate cleanup"],
                community_impact: "moderate",
            },
            simulated: true,
            timestamp: Utc::now(),
        }
    }

    /// Campaign built from the template for `campaign_type`; unknown types
    /// get the awareness campaign.
    pub fn create_campaign(&self, campaign_type: &str) -> Campaign {
        // ---
        let template = campaign_template(campaign_type);
        Campaign {
            doc_id: None,
            campaign_id: format!("CAMP-{}", unix_timestamp()),
            title: template.title.to_string(),
            description: template.description.to_string(),
            status: "active".to_string(),
            participants: None,
            duration: template.duration.to_string(),
            activities: Json(template.activities.iter().map(|a| a.to_string()).collect()),
            target_audience: Some(template.target_audience.to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn engagement_metrics(&self) -> EngagementMetrics {
        EngagementMetrics {
            total_citizens: 15420,
            active_reporters: 3247,
            reports_this_month: 892,
            response_time_avg: "2.3 hours",
            satisfaction_rate: 94.2,
            community_events: 23,
            volunteer_hours: 1247,
            social_media_reach: 45678,
            mobile_app_users: 8923,
            voice_reports: 156,
            photo_reports: 423,
            text_reports: 313,
        }
    }

    /// Reports bucket plus report processing function. The reports table is
    /// simulated. `None` when the bucket cannot be created.
    pub async fn create_engagement_system(&self) -> Option<EngagementSystem> {
        // ---
        let bucket_name = format!("citizen-engagement-{}", Utc::now().format("%Y%m%d"));
        if let Err(e) = self.create_bucket(&bucket_name).await {
            tracing::error!("Failed to create engagement bucket {}: {:#}", bucket_name, e);
            return None;
        }

        let lambda_function = self.create_report_processor().await;

        Some(EngagementSystem {
            engagement_system: "created",
            bucket_name,
            lambda_function,
            reports_table: ReportsTable {
                table_name: "CitizenReports",
                status: "created",
                attributes: ["report_id", "timestamp", "location", "severity", "status"],
                simulated: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[test]
    fn test_chat_classification() {
        // ---
        let gateway = unreachable_gateway();

        let report = gateway.process_chat_report("Lots of DEBRIS and green foam", Some("u1"), None);
        assert!(report.bot_response.action_required);
        assert_eq!(report.bot_response.priority, "medium");
        assert_eq!(report.bot_response.next_steps.len(), 3);
        assert!(report.session_id.starts_with("session-"));

        let report = gateway.process_chat_report("hello", None, Some("session-42"));
        assert!(!report.bot_response.action_required);
        assert_eq!(report.bot_response.priority, "low");
        assert!(report.bot_response.next_steps.is_empty());
        assert_eq!(report.session_id, "session-42");
    }

    #[test]
    fn test_campaign_templates() {
        // ---
        let gateway = unreachable_gateway();

        let campaign = gateway.create_campaign("cleanup");
        assert_eq!(campaign.title, "Community Cleanup Initiative");
        assert_eq!(campaign.duration, "7 days");
        assert_eq!(campaign.status, "active");
        assert!(campaign.campaign_id.starts_with("CAMP-"));

        let fallback = gateway.create_campaign("fundraising");
        assert_eq!(fallback.title, "Harmful Algae Bloom Awareness Campaign");
        assert_eq!(fallback.activities.0.len(), 3);
    }

    #[tokio::test]
    async fn test_engagement_system_none_when_unreachable() {
        // ---
        assert!(unreachable_gateway().create_engagement_system().await.is_none());
    }
}
