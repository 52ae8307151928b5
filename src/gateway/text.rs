use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::CloudGateway;

// ---

pub const ANALYSIS_FALLBACK_HTML: &str = "<p><strong>🚨 AI Analysis Temporarily Unavailable</strong></p>\
     <p><em>Monitoring systems continue to collect data...</em></p>";

pub const REPORT_ANALYSIS_FALLBACK_HTML: &str =
    "<p><strong>📝 Report Analysis:</strong> Citizen report received and being processed.</p>";

/// Readings included in an analysis prompt.
const MAX_PROMPT_RECORDS: usize = 3;

#[derive(Deserialize)]
struct InvokeModelResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// Reply from the agent stub.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub agent_id: String,
    pub user_input: String,
    pub response: &'static str,
    pub actions_taken: Vec<&'static str>,
    pub confidence: f64,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

fn analysis_prompt(data: &str) -> String {
    format!(
        "Analyze this harmful algae bloom data and provide a concise 5-6 line HTML response.

Data: {data}

Format your response exactly like this sample:
<p><strong>🌊 Location-wise Algae Bloom Levels:</strong></p>
<p>The <em>North Sea</em> shows the highest algae bloom level at <strong>6.8</strong>, followed by the Caribbean Sea at <strong>3.9</strong>.</p>
<p><strong>📊 Microalgae Concentration:</strong></p>
<p>North Sea has <strong>7,297 cells/L</strong>, Caribbean Sea has <strong>3,947 cells/L</strong>.</p>
<p><strong>🚨 Status Alert:</strong> The North Sea is in <em>warning status</em>, requiring immediate attention.</p>

Requirements:
- Use exactly 5-6 lines with <p> tags
- Include relevant emojis (🌊 📊 🚨 🔍 🐠)
- Use <strong> for key numbers and <em> for emphasis
- Focus on algae bloom levels, microalgae, and status
- Keep it concise and actionable"
    )
}

fn citizen_report_prompt(transcription: &str, location: Option<&str>, reporter: Option<&str>) -> String {
    format!(
        "Analyze this citizen harmful algae bloom report and provide insights:

Report: {transcription}
Location: {}
Reporter: {}

Provide a concise analysis with:
1. Pollution type identification
2. Severity assessment
3. Recommended actions
4. Community engagement opportunities

Format as HTML with emojis and styling.",
        location.filter(|l| !l.is_empty()).unwrap_or("Not specified"),
        reporter.filter(|r| !r.is_empty()).unwrap_or("Anonymous"),
    )
}

impl CloudGateway {
    // ---
    async fn invoke_model(&self, prompt: &str) -> Result<String> {
        // ---
        let body = json!({
            "modelId": self.text_model_id,
            "contentType": "application/json",
            "accept": "application/json",
            "body": {
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 512,
                "messages": [{ "role": "user", "content": prompt }]
            }
        });

        let reply: InvokeModelResponse = serde_json::from_value(self.call("text", "InvokeModel", body).await?)?;
        reply
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| anyhow!("model returned no content"))
    }

    /// HTML analysis of up to three records, or [`ANALYSIS_FALLBACK_HTML`].
    pub async fn analyze_pollution<T: Serialize>(&self, records: &[T]) -> String {
        // ---
        let sample: Vec<&T> = records.iter().take(MAX_PROMPT_RECORDS).collect();
        let data = match serde_json::to_string(&sample) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to serialize analysis data: {}", e);
                return ANALYSIS_FALLBACK_HTML.to_string();
            }
        };

        match self.invoke_model(&analysis_prompt(&data)).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Text analysis failed: {:#}", e);
                ANALYSIS_FALLBACK_HTML.to_string()
            }
        }
    }

    /// HTML analysis of a citizen report, or [`REPORT_ANALYSIS_FALLBACK_HTML`].
    pub async fn analyze_citizen_report(
        &self,
        transcription: &str,
        location: Option<&str>,
        reporter: Option<&str>,
    ) -> String {
        // ---
        let prompt = citizen_report_prompt(transcription, location, reporter);
        match self.invoke_model(&prompt).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Citizen report analysis failed: {:#}", e);
                REPORT_ANALYSIS_FALLBACK_HTML.to_string()
            }
        }
    }

    /// AGENT STUB: routes on keywords in the input, no model is invoked.
    pub fn invoke_agent(&self, agent_id: &str, input: &str) -> AgentResponse {
        // ---
        let lower = input.to_lowercase();
        let (response, actions_taken) = if lower.contains("pollution") && lower.contains("analysis") {
            (
                "I'll analyze the current pollution data. Based on sensor readings, the \
                 Mediterranean Sea shows critical levels at 9.1, requiring immediate cleanup deployment.",
                vec!["data_analysis", "alert_generation"],
            )
        } else if lower.contains("cleanup") && lower.contains("coordinate") {
            (
                "I'm coordinating cleanup operations. Deploying 3 ocean drones and 2 surface \
                 vessels to the Mediterranean Sea hotspot. Estimated completion: 4 hours.",
                vec!["resource_allocation", "mission_planning"],
            )
        } else if lower.contains("alert") {
            (
                "Generating high-priority alert for Mediterranean Sea. Notifying authorities and \
                 activating emergency response protocols.",
                vec!["alert_generation", "authority_notification"],
            )
        } else {
            (
                "I'm your AI assistant for harmful algae bloom management. I can analyze data, \
                 coordinate cleanup, and generate alerts. How can I help?",
                vec!["general_assistance"],
            )
        };

        AgentResponse {
            agent_id: agent_id.to_string(),
            user_input: input.to_string(),
            response,
            actions_taken,
            confidence: 0.9,
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
    async fn test_analysis_falls_back_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();
        let html = gateway
            .analyze_pollution(&[json!({"location": "Mediterranean Sea", "pollution_level": 9.1})])
            .await;
        assert_eq!(html, ANALYSIS_FALLBACK_HTML);

        let html = gateway
            .analyze_citizen_report("green scum on the beach", Some("Baltic Sea"), None)
            .await;
        assert_eq!(html, REPORT_ANALYSIS_FALLBACK_HTML);
    }

    #[test]
    fn test_agent_keyword_routing() {
        // ---
        let gateway = unreachable_gateway();

        let reply = gateway.invoke_agent("a1", "Run a pollution ANALYSIS please");
        assert_eq!(reply.actions_taken, vec!["data_analysis", "alert_generation"]);

        let reply = gateway.invoke_agent("a1", "coordinate the cleanup crews");
        assert_eq!(reply.actions_taken, vec!["resource_allocation", "mission_planning"]);

        let reply = gateway.invoke_agent("a1", "raise an alert");
        assert_eq!(reply.actions_taken[0], "alert_generation");

        let reply = gateway.invoke_agent("a1", "hello");
        assert_eq!(reply.actions_taken, vec!["general_assistance"]);
        assert_eq!(reply.confidence, 0.9);
        assert!(reply.simulated);
    }

    #[test]
    fn test_report_prompt_defaults() {
        // ---
        let prompt = citizen_report_prompt("foam on the water", None, Some(""));
        assert!(prompt.contains("Location: Not specified"));
        assert!(prompt.contains("Reporter: Anonymous"));
    }
}
