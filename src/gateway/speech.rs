use serde_json::json;

use super::CloudGateway;

// ---

pub const DEFAULT_VOICE: &str = "Joanna";

impl CloudGateway {
    // ---
    /// Synthesize `text` to mp3 audio. `None` when synthesis fails.
    pub async fn synthesize_speech(&self, text: &str, voice_id: &str) -> Option<Vec<u8>> {
        // ---
        let body = json!({
            "Text": text,
            "OutputFormat": "mp3",
            "VoiceId": voice_id,
        });

        match self.call_bytes("speech", "SynthesizeSpeech", body).await {
            Ok(audio) if !audio.is_empty() => Some(audio),
            Ok(_) => {
                tracing::warn!("Speech synthesis returned no audio");
                None
            }
            Err(e) => {
                tracing::error!("Speech synthesis failed: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[tokio::test]
    async fn test_synthesis_returns_none_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();
        assert!(gateway
            .synthesize_speech("Bloom levels are critical", DEFAULT_VOICE)
            .await
            .is_none());
    }
}
