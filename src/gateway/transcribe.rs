use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::{unix_timestamp, CloudGateway};
use crate::models::new_report_id;

// ---

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Transcripts served while transcription is simulated. Selection is keyed
/// on the audio content so the same clip always reads the same way.
const SAMPLE_TRANSCRIPTS: [&str; 5] = [
    "I am reporting harmful algae bloom in the Mediterranean Sea. The pollution level appears to be very high with visible harmful algae bloom debris floating on the surface.",
    "There's a lot of harmful algae bloom waste near the Pacific Ocean coastline. I can see bottles, bags, and other debris washing up on the shore.",
    "The Atlantic Ocean area shows concerning levels of microalgae. The water appears contaminated with small harmful algae bloom particles.",
    "I need to report pollution in the Indian Ocean. There are large amounts of harmful algae bloom waste affecting marine life in this area.",
    "The Arctic Ocean region has harmful algae bloom pollution that needs immediate attention. The cold temperatures are preserving the waste.",
];

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionJob {
    pub job_name: String,
    pub status: &'static str,
    pub language_code: String,
    pub media_uri: String,
    pub transcript: &'static str,
    pub confidence: f64,
    pub simulated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiLanguageResult {
    /// Per language, `None` where that job failed.
    pub multi_language_results: BTreeMap<String, Option<TranscriptionJob>>,
    pub primary_language: &'static str,
    pub detected_languages: Vec<String>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Speaker {
    pub speaker_id: &'static str,
    pub confidence: f64,
    pub gender: &'static str,
    pub age_range: &'static str,
    pub speech_segments: Vec<SpeechSegment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakerIdentification {
    pub speakers: Vec<Speaker>,
    pub total_speakers: usize,
    pub audio_duration: f64,
    pub confidence: f64,
    pub simulated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioMetadata {
    pub duration: f64,
    pub speaker_count: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscribedVoiceReport {
    pub report_type: &'static str,
    pub location: String,
    pub transcription: TranscriptionJob,
    pub speakers: SpeakerIdentification,
    pub timestamp: DateTime<Utc>,
    pub audio_metadata: AudioMetadata,
    pub ai_analysis: String,
}

/// Voice report from a citizen, or one of the canned replies used when the
/// audio could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenVoiceReport {
    pub report_id: String,
    pub transcription: String,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_info: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub simulated: bool,
}

impl CitizenVoiceReport {
    // ---
    pub fn demo(report_id: &str, transcription: &str, analysis: &str) -> Self {
        Self {
            report_id: report_id.to_string(),
            transcription: format!("Simulated transcription: \"{transcription}\""),
            analysis: format!("<p><strong>AI Analysis:</strong> {analysis}</p>"),
            location: None,
            reporter_info: None,
            timestamp: Utc::now(),
            simulated: true,
        }
    }
}

fn transcript_for(audio: &[u8]) -> &'static str {
    // ---
    let hash = blake3::hash(audio);
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    let index = u64::from_le_bytes(head) % SAMPLE_TRANSCRIPTS.len() as u64;
    SAMPLE_TRANSCRIPTS[index as usize]
}

fn segment(start_time: f64, end_time: f64, text: &'static str) -> SpeechSegment {
    SpeechSegment {
        start_time,
        end_time,
        text,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl CloudGateway {
    // ---
    /// Store the audio in a fresh bucket and describe the transcription job.
    ///
    /// The transcript itself is simulated. `None` when the bucket or the
    /// upload fails.
    pub async fn create_transcription_job(
        &self,
        audio: &[u8],
        job_name: Option<&str>,
        language_code: &str,
    ) -> Option<TranscriptionJob> {
        // ---
        let job_name = non_empty(job_name).unwrap_or_else(|| format!("transcribe-pollution-{}", unix_timestamp()));
        let bucket = format!("pollution-audio-{}", unix_timestamp());
        let key = format!("audio/{job_name}.mp3");

        if let Err(e) = self.create_bucket(&bucket).await {
            tracing::error!("Failed to create audio bucket {}: {:#}", bucket, e);
            return None;
        }

        let metadata = json!({ "job_name": job_name, "language_code": language_code });
        if let Err(e) = self
            .put_object(&bucket, &key, json!(STANDARD.encode(audio)), "audio/mpeg", metadata)
            .await
        {
            tracing::error!("Failed to upload audio for {}: {:#}", job_name, e);
            return None;
        }

        tracing::info!("Transcription job {} created for {} bytes", job_name, audio.len());
        Some(TranscriptionJob {
            job_name,
            status: "COMPLETED",
            language_code: language_code.to_string(),
            media_uri: format!("s3://{bucket}/{key}"),
            transcript: transcript_for(audio),
            confidence: 0.95,
            simulated: true,
            created_at: Utc::now(),
        })
    }

    /// One transcription job per language. Never fails; failed languages
    /// carry `None`.
    pub async fn process_multi_language(&self, audio: &[u8], languages: &[String]) -> MultiLanguageResult {
        // ---
        let mut results = BTreeMap::new();
        for language in languages {
            let job_name = format!("transcribe-{language}-{}", unix_timestamp());
            let job = self.create_transcription_job(audio, Some(&job_name), language).await;
            results.insert(language.clone(), job);
        }

        MultiLanguageResult {
            detected_languages: results.keys().cloned().collect(),
            multi_language_results: results,
            primary_language: DEFAULT_LANGUAGE,
            status: "completed",
        }
    }

    /// SPEAKER STUB: two fixed speakers regardless of the audio.
    pub fn identify_speakers(&self, _audio: &[u8]) -> SpeakerIdentification {
        // ---
        let speakers = vec![
            Speaker {
                speaker_id: "SPEAKER_00",
                confidence: 0.98,
                gender: "Female",
                age_range: "25-35",
                speech_segments: vec![
                    segment(0.0, 5.2, "Hello, I need to report an algae bloom..."),
                    segment(8.1, 12.5, "The situation is quite serious..."),
                ],
            },
            Speaker {
                speaker_id: "SPEAKER_01",
                confidence: 0.95,
                gender: "Male",
                age_range: "40-50",
                speech_segments: vec![
                    segment(5.3, 8.0, "Can you provide more details?"),
                    segment(12.6, 15.8, "Thank you for the report."),
                ],
            },
        ];

        SpeakerIdentification {
            total_speakers: speakers.len(),
            speakers,
            audio_duration: 15.8,
            confidence: 0.96,
            simulated: true,
        }
    }

    /// Transcription, speakers and a text analysis of the transcript.
    /// `None` when the transcription job fails.
    pub async fn create_voice_report_with_transcription(
        &self,
        audio: &[u8],
        location: Option<&str>,
    ) -> Option<TranscribedVoiceReport> {
        // ---
        let transcription = self.create_transcription_job(audio, None, DEFAULT_LANGUAGE).await?;
        let speakers = self.identify_speakers(audio);
        let location = non_empty(location).unwrap_or_else(|| "Unknown".to_string());

        let ai_analysis = self
            .analyze_pollution(&[json!({
                "transcript": transcription.transcript,
                "location": location,
                "type": "voice_transcription_report",
            })])
            .await;

        Some(TranscribedVoiceReport {
            report_type: "voice_with_transcription",
            location,
            audio_metadata: AudioMetadata {
                duration: speakers.audio_duration,
                speaker_count: speakers.total_speakers,
                confidence: transcription.confidence,
            },
            transcription,
            speakers,
            timestamp: Utc::now(),
            ai_analysis,
        })
    }

    /// Transcribe a citizen's recording and analyze it as a report.
    /// `None` when the transcription job fails.
    pub async fn process_citizen_voice_report(
        &self,
        audio: &[u8],
        location: Option<&str>,
        reporter: Option<&str>,
    ) -> Option<CitizenVoiceReport> {
        // ---
        let job = self.create_transcription_job(audio, None, DEFAULT_LANGUAGE).await?;
        let analysis = self
            .analyze_citizen_report(job.transcript, location, reporter)
            .await;

        Some(CitizenVoiceReport {
            report_id: new_report_id(),
            transcription: job.transcript.to_string(),
            analysis,
            location: non_empty(location),
            reporter_info: non_empty(reporter),
            timestamp: Utc::now(),
            simulated: job.simulated,
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[test]
    fn test_transcript_is_stable_per_audio() {
        // ---
        let audio = b"demo audio for transcription";
        assert_eq!(transcript_for(audio), transcript_for(audio));
        assert!(SAMPLE_TRANSCRIPTS.contains(&transcript_for(b"")));
    }

    #[test]
    fn test_speaker_stub() {
        // ---
        let speakers = unreachable_gateway().identify_speakers(b"abc");
        assert_eq!(speakers.total_speakers, 2);
        assert_eq!(speakers.speakers[0].speaker_id, "SPEAKER_00");
        assert_eq!(speakers.speakers[1].gender, "Male");
        assert_eq!(speakers.audio_duration, 15.8);
        assert!(speakers.simulated);
    }

    #[test]
    fn test_demo_voice_report() {
        // ---
        let report = CitizenVoiceReport::demo("DEMO-VOICE-001", "Green scum at the beach.", "Bloom likely.");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["report_id"], "DEMO-VOICE-001");
        assert!(value["transcription"].as_str().unwrap().starts_with("Simulated transcription"));
        assert!(value.get("location").is_none());
        assert_eq!(value["simulated"], true);
    }

    #[tokio::test]
    async fn test_fallbacks_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();
        let audio = b"audio";

        assert!(gateway.create_transcription_job(audio, None, "en-US").await.is_none());
        assert!(gateway.create_voice_report_with_transcription(audio, None).await.is_none());
        assert!(gateway
            .process_citizen_voice_report(audio, Some("Baltic Sea"), None)
            .await
            .is_none());

        let languages = vec!["en-US".to_string(), "es-US".to_string()];
        let multi = gateway.process_multi_language(audio, &languages).await;
        assert_eq!(multi.detected_languages, languages);
        assert!(multi.multi_language_results.values().all(Option::is_none));
        assert_eq!(multi.status, "completed");
    }
}
