use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::{speech::DEFAULT_VOICE, unix_timestamp, CloudGateway};

// ---

pub const DEFAULT_BOT_NAME: &str = "HarmfulAlgaeBloomReportBot";

const REPORT_INTENT: &str = "ReportHarmfulAlgaeBloom";

const OCEAN_NAMES: [&str; 5] = ["mediterranean", "pacific", "atlantic", "indian", "arctic"];

#[derive(Debug, Clone, Serialize)]
pub struct BotSlot {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub slot_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotIntent {
    pub name: &'static str,
    pub description: &'static str,
    pub slots: Vec<BotSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotConfig {
    pub bot_name: String,
    pub description: &'static str,
    pub intents: Vec<BotIntent>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotInteraction {
    pub bot_name: String,
    pub user_input: String,
    pub intent: &'static str,
    pub slots: BTreeMap<&'static str, String>,
    pub response: &'static str,
    pub confidence: f64,
}

/// Result of turning a chat message into a report.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VoiceReportOutcome {
    Report {
        source: &'static str,
        user_input: String,
        location: String,
        timestamp: DateTime<Utc>,
        confidence: f64,
        ai_analysis: String,
    },
    Rejected {
        error: &'static str,
        lex_response: BotInteraction,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CitizenBot {
    pub bot_name: String,
    pub status: &'static str,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub bot_status: &'static str,
    pub bot_name: &'static str,
    pub capabilities: [&'static str; 3],
    pub last_interaction: DateTime<Utc>,
}

fn slot(name: &'static str, slot_type: &'static str) -> BotSlot {
    BotSlot { name, slot_type }
}

fn report_intents() -> Vec<BotIntent> {
    // ---
    vec![
        BotIntent {
            name: REPORT_INTENT,
            description: "Handle harmful algae bloom reports from citizens",
            slots: vec![
                slot("Location", "AMAZON.US_CITY"),
                slot("PollutionLevel", "AMAZON.NUMBER"),
                slot("Description", "AMAZON.LITERAL"),
            ],
        },
        BotIntent {
            name: "QueryData",
            description: "Handle data queries about pollution levels",
            slots: vec![slot("Location", "AMAZON.US_CITY"), slot("TimeRange", "AMAZON.LITERAL")],
        },
        BotIntent {
            name: "GetHelp",
            description: "Provide help and information",
            slots: Vec::new(),
        },
    ]
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Title-cased ocean name mentioned in `lower`, if any.
fn ocean_slot(lower: &str) -> Option<String> {
    // ---
    OCEAN_NAMES.iter().find(|o| lower.contains(*o)).map(|o| {
        let mut chars = o.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    })
}

/// Prefix of at most `max` characters.
fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl CloudGateway {
    // ---
    /// BOT STUB: configuration of the reporting bot, nothing is deployed.
    pub fn create_bot(&self, name: Option<&str>) -> BotConfig {
        // ---
        let bot_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{DEFAULT_BOT_NAME}-{}", unix_timestamp()));

        BotConfig {
            bot_name,
            description: "AI chatbot for harmful algae bloom reporting and queries",
            intents: report_intents(),
            status: "simulated_created",
        }
    }

    /// BOT STUB: keyword intent routing over the lowercased input.
    pub fn process_interaction(&self, input: &str, bot_name: &str) -> BotInteraction {
        // ---
        let lower = input.to_lowercase();
        let mut slots = BTreeMap::new();

        let (intent, response) = if contains_any(&lower, &["report", "harmful algae bloom", "algae", "waste"]) {
            if let Some(location) = ocean_slot(&lower) {
                slots.insert("Location", location);
            }
            (
                REPORT_INTENT,
                "I can help you report harmful algae bloom. Please tell me the location and describe what you're seeing.",
            )
        } else if contains_any(&lower, &["data", "levels", "status", "how bad"]) {
            (
                "QueryData",
                "I can provide pollution data. Which location would you like to know about?",
            )
        } else if contains_any(&lower, &["help", "what can you do", "how"]) {
            (
                "GetHelp",
                "I can help you report harmful algae bloom, query data, and get information about harmful algae bloom levels. What would you like to do?",
            )
        } else {
            (
                "Unknown",
                "I'm here to help with harmful algae bloom reporting and data queries. You can report harmful algae bloom, ask about data, or get help.",
            )
        };

        BotInteraction {
            bot_name: bot_name.to_string(),
            user_input: input.to_string(),
            intent,
            slots,
            response,
            confidence: 0.8,
        }
    }

    /// Turn a chat message into a report when the bot recognizes a report
    /// intent. The location argument wins over the extracted slot.
    pub fn create_voice_report(&self, input: &str, location: Option<&str>) -> VoiceReportOutcome {
        // ---
        let interaction = self.process_interaction(input, DEFAULT_BOT_NAME);
        if interaction.intent != REPORT_INTENT {
            return VoiceReportOutcome::Rejected {
                error: "Could not process harmful algae bloom report",
                lex_response: interaction,
            };
        }

        let location = location
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or_else(|| interaction.slots.get("Location").cloned())
            .unwrap_or_else(|| "Unknown".to_string());

        VoiceReportOutcome::Report {
            source: "lex_chatbot",
            user_input: input.to_string(),
            location,
            timestamp: Utc::now(),
            confidence: interaction.confidence,
            ai_analysis: format!("Report processed via Lex: {}...", preview(input, 100)),
        }
    }

    /// Deploy the citizen reporting bot. `None` on failure.
    pub async fn create_citizen_bot(&self, name: Option<&str>) -> Option<CitizenBot> {
        // ---
        let bot_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("CitizenHarmfulAlgaeBloomReportBot-{}", unix_timestamp()));

        let intents: Vec<Value> = [REPORT_INTENT, "GetReportStatus", "EngageCommunity"]
            .iter()
            .map(|name| json!({ "intentName": name, "intentVersion": "$LATEST" }))
            .collect();

        let body = json!({
            "name": bot_name,
            "description": "Citizen harmful algae bloom reporting and engagement bot",
            "intents": intents,
            "clarificationPrompt": {
                "messages": [{
                    "contentType": "PlainText",
                    "content": "I didn't understand that. Could you please rephrase your harmful algae bloom report?"
                }],
                "maxAttempts": 3
            },
            "abortStatement": {
                "messages": [{
                    "contentType": "PlainText",
                    "content": "Thank you for your time. You can always report harmful algae bloom through our website or mobile app."
                }]
            },
            "idleSessionTTLInSeconds": 300,
            "voiceId": DEFAULT_VOICE,
        });

        match self.call("bot", "PutBot", body).await {
            Ok(response) => Some(CitizenBot {
                bot_name,
                status: "created",
                response,
            }),
            Err(e) => {
                tracing::error!("Failed to create citizen bot {}: {:#}", bot_name, e);
                None
            }
        }
    }

    pub fn bot_status(&self) -> BotStatus {
        BotStatus {
            bot_status: "active",
            bot_name: DEFAULT_BOT_NAME,
            capabilities: ["report_collection", "data_query", "voice_interaction"],
            last_interaction: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[test]
    fn test_intent_routing() {
        // ---
        let gateway = unreachable_gateway();

        let reply = gateway.process_interaction("I want to REPORT algae in the Pacific", DEFAULT_BOT_NAME);
        assert_eq!(reply.intent, "ReportHarmfulAlgaeBloom");
        assert_eq!(reply.slots.get("Location").map(String::as_str), Some("Pacific"));
        assert_eq!(reply.confidence, 0.8);

        let reply = gateway.process_interaction("how bad is it today", DEFAULT_BOT_NAME);
        assert_eq!(reply.intent, "QueryData");
        assert!(reply.slots.is_empty());

        let reply = gateway.process_interaction("what can you do", DEFAULT_BOT_NAME);
        assert_eq!(reply.intent, "GetHelp");

        let reply = gateway.process_interaction("good morning", "OtherBot");
        assert_eq!(reply.intent, "Unknown");
        assert_eq!(reply.bot_name, "OtherBot");
    }

    #[test]
    fn test_voice_report_outcomes() {
        // ---
        let gateway = unreachable_gateway();

        match gateway.create_voice_report("Algae scum near the arctic shelf", None) {
            VoiceReportOutcome::Report { location, source, .. } => {
                assert_eq!(location, "Arctic");
                assert_eq!(source, "lex_chatbot");
            }
            other => panic!("expected report, got {other:?}"),
        }

        match gateway.create_voice_report("algae everywhere", Some("Baltic Sea")) {
            VoiceReportOutcome::Report { location, .. } => assert_eq!(location, "Baltic Sea"),
            other => panic!("expected report, got {other:?}"),
        }

        let rejected = gateway.create_voice_report("hello there", None);
        let value = serde_json::to_value(&rejected).unwrap();
        assert_eq!(value["error"], "Could not process harmful algae bloom report");
        assert_eq!(value["lex_response"]["intent"], "Unknown");
    }

    #[test]
    fn test_analysis_preview_is_char_safe() {
        // ---
        let input = format!("algae {}", "é".repeat(150));
        assert_eq!(preview(&input, 100).chars().count(), 100);
        assert_eq!(preview("short", 100), "short");
    }

    #[test]
    fn test_bot_config_stub() {
        // ---
        let config = unreachable_gateway().create_bot(None);
        assert!(config.bot_name.starts_with("HarmfulAlgaeBloomReportBot-"));
        assert_eq!(config.intents.len(), 3);
        assert_eq!(config.status, "simulated_created");

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["intents"][0]["slots"][1]["type"], "AMAZON.NUMBER");
    }

    #[tokio::test]
    async fn test_citizen_bot_none_when_unreachable() {
        // ---
        assert!(unreachable_gateway().create_citizen_bot(None).await.is_none());
    }
}
