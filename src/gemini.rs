//! Gemini API interactions for wine analysis.
//!
//! This module talks to the generative sommelier model:
//! - `analyze_label`: identify a wine from label image bytes
//! - `analyze_query`: build a full report from a typed wine name
//! - `find_matches`: list likely matches for an ambiguous query
//!
//! The model is asked for raw JSON, but responses are treated as hostile
//! input: code fences are stripped, the payload is parsed strictly, and
//! anything malformed surfaces as a typed error rather than a panic.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{WineMatch, WineReport, generate_id};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// System instruction shared by the full-report requests.
const SYSTEM_INSTRUCTION: &str = "\
You are an expert Master Sommelier.
Provide a fast, accurate report on the requested wine.
Research using Google Search to find accurate, real-time data.

CRITICAL: Return ONLY raw JSON. No Markdown.

TASKS:
1. IDENTIFY: Wine, vintage, grapes, ABV, region.
2. SENSORY: Color, Nose, Taste.
3. CRITICS: Scores (Parker, Spectator, etc).
4. TERROIR: Soil, oak, farming. ESTIMATE BLEND: % of each grape (must sum to 100%).
5. VINTAGE: Compare requested vintage vs 4 other recent vintages to show quality trend.
6. INVEST: Drinking window (start, peak, end) and market value outlook.
7. SERVICE: Pairing, temperature, decanting, glassware.
8. ONLINE: Official winery URL and 4-6 direct image links (.jpg, .png).
9. HISTORY: Origins, fun facts, legendary vintages.
10. PIVOT: Recommend 2 similar wines.
11. EDUCATION: Climate, geography, vibe analogy, label terms, pronunciation.

Use the camelCase JSON keys: name, vintage, country, region, subRegion,
varietals, type, abv, color, nose, taste, closure, size, marketPrice,
wineryInfo, websiteUrl, onlineImage, imageCandidates, awards, funFacts,
bestVintages, criticScores, terroir, grapeComposition, styleProfile,
vintageComparison, aging (drinkFrom, drinkUntil, peakYears,
investmentPotential, estimatedValue5Years), pairing, recommendations,
education.";

/// Errors that can occur while consulting the sommelier model.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key configured (env var, state.kdl)
    #[error("No API key configured: set SOM_API_KEY or run `som config set-key`")]
    MissingApiKey,

    /// Network or HTTP-level failure
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The model returned no usable text
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// The model's text was not the JSON we asked for
    #[error("Failed to parse wine data: {0}")]
    ParseFailed(String),
}

// === Request body ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,

    contents: Vec<Content>,

    generation_config: GenerationConfig,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(data: String, mime_type: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

// === Response body (only fields we care about) ===

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,

    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let parts = &candidate.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() { None } else { Some(text) }
    }

    /// Grounding source attributions, de-duplicated in order.
    fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        if let Some(candidate) = self.candidates.first() {
            if let Some(metadata) = &candidate.grounding_metadata {
                for chunk in &metadata.grounding_chunks {
                    if let Some(web) = &chunk.web {
                        if let Some(label) = web.title.clone().or_else(|| web.uri.clone()) {
                            if !sources.contains(&label) {
                                sources.push(label);
                            }
                        }
                    }
                }
            }
        }
        sources
    }
}

/// Identify a wine from label image bytes.
pub fn analyze_label(
    api_key: &str,
    model: &str,
    image: &[u8],
    mime_type: &str,
) -> Result<WineReport, GeminiError> {
    let request = GenerateRequest {
        system_instruction: Some(Content {
            parts: vec![Part::text(SYSTEM_INSTRUCTION)],
        }),
        contents: vec![Content {
            parts: vec![
                Part::image(BASE64.encode(image), mime_type.to_string()),
                Part::text(
                    "Identify this wine label and provide a detailed report in JSON format.",
                ),
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
        tools: vec![Tool {
            google_search: serde_json::json!({}),
        }],
    };

    let response = generate(api_key, model, &request)?;
    let text = response.text().ok_or(GeminiError::EmptyResponse)?;
    parse_report(&text, response.sources())
}

/// Build a full report from a typed wine name.
pub fn analyze_query(api_key: &str, model: &str, query: &str) -> Result<WineReport, GeminiError> {
    let request = GenerateRequest {
        system_instruction: Some(Content {
            parts: vec![Part::text(SYSTEM_INSTRUCTION)],
        }),
        contents: vec![Content {
            parts: vec![Part::text(format!(
                "Please provide a detailed report for the following wine: {}. Use JSON format.",
                query
            ))],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
        tools: vec![Tool {
            google_search: serde_json::json!({}),
        }],
    };

    let response = generate(api_key, model, &request)?;
    let text = response.text().ok_or(GeminiError::EmptyResponse)?;
    parse_report(&text, response.sources())
}

/// List the most likely matches for an ambiguous query.
pub fn find_matches(
    api_key: &str,
    model: &str,
    query: &str,
) -> Result<Vec<WineMatch>, GeminiError> {
    let request = GenerateRequest {
        system_instruction: None,
        contents: vec![Content {
            parts: vec![Part::text(format!(
                "Search for wines matching: \"{}\". Provide a list of the 3-5 most likely \
                 matches as a JSON array of objects with 'name', 'vintage', and 'region'.",
                query
            ))],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
        tools: Vec::new(),
    };

    let response = generate(api_key, model, &request)?;
    let text = response.text().ok_or(GeminiError::EmptyResponse)?;
    parse_matches(&text)
}

/// Issue one generateContent call.
fn generate(
    api_key: &str,
    model: &str,
    request: &GenerateRequest,
) -> Result<GenerateResponse, GeminiError> {
    if api_key.is_empty() {
        return Err(GeminiError::MissingApiKey);
    }

    let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, model);
    let body =
        serde_json::to_value(request).map_err(|e| GeminiError::HttpError(e.to_string()))?;

    let response = ureq::post(&url)
        .set("x-goog-api-key", api_key)
        .set("Content-Type", "application/json")
        .send_json(body);

    match response {
        Ok(resp) => resp
            .into_json()
            .map_err(|e| GeminiError::ParseFailed(e.to_string())),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(GeminiError::HttpError(format!("HTTP {}: {}", code, body)))
        }
        Err(e) => Err(GeminiError::HttpError(e.to_string())),
    }
}

/// Strip Markdown code-fence wrappers the model sometimes adds despite the
/// raw-JSON instruction.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim_start()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Parse a full-report payload, stamp identity, and normalize image links.
fn parse_report(text: &str, sources: Vec<String>) -> Result<WineReport, GeminiError> {
    let payload = strip_code_fences(text);

    let mut report: WineReport =
        serde_json::from_str(payload).map_err(|e| GeminiError::ParseFailed(e.to_string()))?;

    report.id = generate_id("som", &format!("{}|{}", report.name, report.vintage));
    report.analyzed_at = Some(Utc::now());

    // The primary image and the candidate list back-fill each other.
    if report.online_image.is_none() {
        report.online_image = report.image_candidates.first().cloned();
    }
    if report.image_candidates.is_empty() {
        if let Some(primary) = &report.online_image {
            report.image_candidates = vec![primary.clone()];
        }
    }

    report.sources = sources;
    Ok(report)
}

/// Parse a match-list payload.
fn parse_matches(text: &str) -> Result<Vec<WineMatch>, GeminiError> {
    let payload = strip_code_fences(text);
    serde_json::from_str(payload).map_err(|e| GeminiError::ParseFailed(e.to_string()))
}
