// Gemini analysis client
//
// Wraps two independent calls to the Gemini generateContent API:
// - analyze_dream: text model with a structured-output contract
//   (analysis string, stressLevel integer, advice string)
// - generate_dream_image: image model asked for a 16:9 surreal
//   illustration, returned as a data URI
//
// The two calls have asymmetric failure policies. Text analysis is the
// product's core value and fails loudly with a typed error; the image is
// decorative and degrades to None on any failure, including a missing key.
// Neither call retries.

use crate::config::Config;
use crate::record::DreamAnalysis;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure taxonomy for the text-analysis call
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No credential configured - no network call is attempted
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    /// Network failure or an error response from the service
    #[error("analysis service error: {0}")]
    Service(String),

    /// The service answered but produced no text
    #[error("analysis response was empty")]
    EmptyResponse,

    /// The response text did not parse as the expected structure
    #[error("analysis response did not match the expected structure: {0}")]
    Schema(String),
}

/// Seam between the journal and the external service. Lets the
/// orchestrator be driven by a mock in tests and by canned output in
/// demo mode.
#[async_trait]
pub trait DreamAnalyzer: Send + Sync {
    /// Analyze a dream description. Single attempt, no retry.
    async fn analyze_dream(&self, dream_text: &str) -> Result<DreamAnalysis, AnalysisError>;

    /// Best-effort illustration as a data URI. Never fails the flow.
    async fn generate_dream_image(&self, dream_text: &str) -> Option<String>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize, Default)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "imageConfig", skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Structured output as the model emits it. stressLevel arrives as a raw
/// integer that may sit outside the canonical domain; conversion clamps it.
#[derive(Deserialize)]
struct RawAnalysis {
    analysis: String,
    #[serde(rename = "stressLevel")]
    stress_level: i64,
    advice: String,
}

impl From<RawAnalysis> for DreamAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        DreamAnalysis {
            analysis: raw.analysis,
            stress_level: raw.stress_level.clamp(0, 10) as u8,
            advice: raw.advice,
        }
    }
}

/// Schema the text model is bound to via responseSchema
fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "STRING",
                "description": "Psychological reading of the dream: likely causes, subconscious projections, what the imagery stands for."
            },
            "stressLevel": {
                "type": "INTEGER",
                "description": "Inferred stress score from the dream's intensity and negative emotion, 1 (calm) to 10 (extreme distress)."
            },
            "advice": {
                "type": "STRING",
                "description": "Warm, supportive, actionable suggestions for the day ahead."
            }
        },
        "required": ["analysis", "stressLevel", "advice"]
    })
}

fn analysis_prompt(dream_text: &str) -> String {
    format!(
        "You are a professional psychologist and dream interpreter. The user \
         describes a dream they had last night.\n\n\
         Your task:\n\
         1. Analyze the dream from a psychological angle, explaining likely causes \
         (anxiety, wish fulfillment, memory processing, and so on).\n\
         2. From the dream's intensity and negative emotion, estimate the user's \
         subconscious stress level from 1 (lowest) to 10 (extreme panic or pressure).\n\
         3. Offer warm, supportive, actionable advice to help the user adjust today.\n\n\
         Dream: \"{dream_text}\""
    )
}

fn image_prompt(dream_text: &str) -> String {
    format!(
        "Create a surreal, artistic, dream-like illustration representing this \
         dream: \"{dream_text}\". High quality, abstract or symbolic style."
    )
}

// ============================================================================
// Response extraction (pure, unit-testable)
// ============================================================================

/// Concatenated text of the first candidate, or None if there is none
fn first_candidate_text(response: &GenerateResponse) -> Option<String> {
    let parts = response
        .candidates
        .as_ref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_ref()?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = &part.text {
            text.push_str(t);
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse a structured-output response into a clamped analysis
fn parse_analysis(response: &GenerateResponse) -> Result<DreamAnalysis, AnalysisError> {
    if let Some(error) = &response.error {
        return Err(AnalysisError::Service(error.message.clone()));
    }

    let text = first_candidate_text(response).ok_or(AnalysisError::EmptyResponse)?;

    let raw: RawAnalysis =
        serde_json::from_str(&text).map_err(|e| AnalysisError::Schema(e.to_string()))?;

    Ok(raw.into())
}

/// First inline image payload of the first candidate, as a data URI
fn extract_inline_image(response: &GenerateResponse) -> Option<String> {
    let parts = response
        .candidates
        .as_ref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_ref()?;

    parts.iter().find_map(|part| {
        part.inline_data
            .as_ref()
            .map(|inline| format!("data:{};base64,{}", inline.mime_type, inline.data))
    })
}

// ============================================================================
// Live client
// ============================================================================

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
        key: &str,
    ) -> Result<GenerateResponse, AnalysisError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.api_base, model, key);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Service(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Service(format!("{status} - {body}")));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AnalysisError::Service(e.to_string()))
    }
}

#[async_trait]
impl DreamAnalyzer for GeminiClient {
    async fn analyze_dream(&self, dream_text: &str) -> Result<DreamAnalysis, AnalysisError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AnalysisError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: analysis_prompt(dream_text),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(analysis_schema()),
                temperature: Some(0.7),
                image_config: None,
            }),
        };

        let response = self.generate(&self.text_model, &request, key).await?;
        let analysis = parse_analysis(&response)?;

        tracing::debug!(stress_level = analysis.stress_level, "Dream analysis received");
        Ok(analysis)
    }

    async fn generate_dream_image(&self, dream_text: &str) -> Option<String> {
        let key = self.api_key.as_deref().filter(|k| !k.is_empty())?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: image_prompt(dream_text),
                }],
            }],
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: "16:9".to_string(),
                }),
                ..Default::default()
            }),
        };

        match self.generate(&self.image_model, &request, key).await {
            Ok(response) => {
                let image = extract_inline_image(&response);
                if image.is_none() {
                    tracing::warn!("Image response contained no inline payload");
                }
                image
            }
            Err(e) => {
                tracing::warn!("Image generation failed: {}", e);
                None
            }
        }
    }
}

// ============================================================================
// Demo analyzer
// ============================================================================

/// Tiny 1x1 gray PNG so demo records carry an illustration
const DEMO_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB\
CAYAAAAfFcSJAAAADUlEQVR42mOsqan5DwAFCAJS0sEbygAAAABJRU5ErkJggg==";

/// Offline analyzer for demo mode: deterministic canned output, no
/// network, short artificial latency so the loading state is visible.
pub struct CannedAnalyzer;

#[async_trait]
impl DreamAnalyzer for CannedAnalyzer {
    async fn analyze_dream(&self, dream_text: &str) -> Result<DreamAnalysis, AnalysisError> {
        tokio::time::sleep(std::time::Duration::from_millis(700)).await;

        // Pin the score to the text so repeated submissions vary a little
        let stress_level = (dream_text.len() % 10 + 1) as u8;
        Ok(DreamAnalysis {
            analysis: format!(
                "This dream reads as your mind rehearsing an unresolved situation. \
                 The imagery around \"{}\" suggests ordinary memory consolidation \
                 rather than acute distress.",
                crate::util::clip(dream_text, 40)
            ),
            stress_level,
            advice: "Keep a steady sleep schedule tonight and give yourself one \
                     unhurried break during the day."
                .to_string(),
        })
    }

    async fn generate_dream_image(&self, _dream_text: &str) -> Option<String> {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        Some(DEMO_IMAGE.to_string())
    }
}

/// Pick the analyzer for this run: canned in demo mode, live otherwise
pub fn analyzer_from_config(config: &Config) -> std::sync::Arc<dyn DreamAnalyzer> {
    if config.demo_mode {
        tracing::info!("Demo mode: using the canned analyzer, no network calls");
        std::sync::Arc::new(CannedAnalyzer)
    } else {
        std::sync::Arc::new(GeminiClient::new(config))
    }
}
