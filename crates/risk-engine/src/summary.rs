//! Natural-language summary of an analysis result

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{round2, Attribution, Direction, RiskLevel};
use tracing::debug;

use crate::error::SummaryError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Number of attributions quoted in the prompt
pub const PROMPT_FACTORS: usize = 3;

/// Render the summary prompt from the score, its grade and the strongest factors
pub fn build_prompt(score: f64, level: RiskLevel, attributions: &[Attribution]) -> String {
    let mut top: Vec<&Attribution> = attributions.iter().collect();
    top.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    top.truncate(PROMPT_FACTORS);

    let factors = top
        .iter()
        .map(|a| {
            let effect = match a.direction {
                Direction::Up => "상승",
                Direction::Down => "완화",
            };
            format!("- {}: 영향도 {:.2}, 위험 {}", a.feature, a.impact.abs(), effect)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n전세사기 분석 결과입니다:\n\n\
         • 위험 점수: {}점\n\
         • 등급: {}\n\
         • 주요 영향 요인:\n\
         {}\n\n\
         이 내용을 바탕으로 사용자에게 간결하고 이해하기 쉬운 분석 요약을 작성해주세요.\n",
        round2(score),
        level.label(),
        factors
    )
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Returns the same text for every prompt
#[derive(Debug, Clone)]
pub struct StaticSummarizer {
    text: String,
}

impl StaticSummarizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Summarizer for StaticSummarizer {
    fn summarize(&self, _prompt: &str) -> Result<String, SummaryError> {
        Ok(self.text.clone())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Generative Language API (`models/{model}:generateContent`)
pub struct GeminiSummarizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SummaryError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummaryError::NotConfigured("missing API key".to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }
}

impl Summarizer for GeminiSummarizer {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!("Requesting summary from {}", url);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let response: GenerateResponse = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        response.first_text().ok_or(SummaryError::EmptyResponse)
    }
}
