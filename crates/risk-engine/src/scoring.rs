//! Risk scoring capability and its implementations
//!
//! A scoring model turns one `FeatureRecord` into a score on the 0–100 scale
//! and explains it as per-feature attributions. Two implementations ship:
//!
//! - [`LinearScoringModel`]: weights read from a TOML artifact; attributions
//!   are exact (`w * (x - baseline)`).
//! - [`HttpScoringModel`]: an external model server exposing `/predict` and
//!   `/explain`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{Attribution, FeatureRecord, FEATURE_COLUMNS};
use tracing::{debug, info};

use crate::error::ScoringError;

pub trait ScoringModel: Send + Sync {
    fn score(&self, features: &FeatureRecord) -> Result<f64, ScoringError>;

    /// Attributions ranked by absolute impact, largest first
    fn attribute(&self, features: &FeatureRecord) -> Result<Vec<Attribution>, ScoringError>;
}

/// Sort attributions by |impact| descending; equal magnitudes keep column order
pub fn rank_attributions(mut attributions: Vec<Attribution>) -> Vec<Attribution> {
    attributions.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    attributions
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct LinearArtifact {
    intercept: f64,
    weights: BTreeMap<String, f64>,
    #[serde(default)]
    baseline: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearScoringModel {
    intercept: f64,
    weights: [f64; 7],
    baseline: [f64; 7],
}

impl LinearScoringModel {
    pub fn new(intercept: f64, weights: [f64; 7], baseline: [f64; 7]) -> Self {
        Self {
            intercept,
            weights,
            baseline,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::Load(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_str(&content)?;
        info!("Loaded linear scoring model from {}", path.display());
        Ok(model)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ScoringError> {
        let artifact: LinearArtifact =
            toml::from_str(content).map_err(|e| ScoringError::Load(e.to_string()))?;

        for name in artifact.weights.keys().chain(artifact.baseline.keys()) {
            if !FEATURE_COLUMNS.contains(&name.as_str()) {
                return Err(ScoringError::UnknownFeature(name.clone()));
            }
        }

        let mut weights = [0.0; 7];
        let mut baseline = [0.0; 7];
        for (i, column) in FEATURE_COLUMNS.iter().enumerate() {
            weights[i] = *artifact
                .weights
                .get(*column)
                .ok_or_else(|| ScoringError::Load(format!("missing weight for '{}'", column)))?;
            baseline[i] = artifact.baseline.get(*column).copied().unwrap_or(0.0);
        }

        Ok(Self::new(artifact.intercept, weights, baseline))
    }
}

impl ScoringModel for LinearScoringModel {
    fn score(&self, features: &FeatureRecord) -> Result<f64, ScoringError> {
        let values = features.values();
        let sum: f64 = self
            .weights
            .iter()
            .zip(values.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + sum)
    }

    fn attribute(&self, features: &FeatureRecord) -> Result<Vec<Attribution>, ScoringError> {
        let attributions = features
            .columns()
            .enumerate()
            .map(|(i, (column, x))| Attribution::new(column, self.weights[i] * (x - self.baseline[i])))
            .collect();
        Ok(rank_attributions(attributions))
    }
}

#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    columns: &'a [&'static str],
    rows: Vec<[f64; 7]>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    score: f64,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    attributions: Vec<RemoteAttribution>,
}

#[derive(Debug, Deserialize)]
struct RemoteAttribution {
    feature: String,
    impact: f64,
}

/// Client for a model server exposing `POST /predict` and `POST /explain`
pub struct HttpScoringModel {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpScoringModel {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ScoringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        route: &str,
        features: &FeatureRecord,
    ) -> Result<T, ScoringError> {
        let url = format!("{}/{}", self.endpoint, route);
        debug!("POST {}", url);
        let request = ModelRequest {
            columns: &FEATURE_COLUMNS,
            rows: vec![features.values()],
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()?
            .error_for_status()?;
        response
            .json::<T>()
            .map_err(|e| ScoringError::InvalidResponse(e.to_string()))
    }
}

impl ScoringModel for HttpScoringModel {
    fn score(&self, features: &FeatureRecord) -> Result<f64, ScoringError> {
        let response: PredictResponse = self.post("predict", features)?;
        if !response.score.is_finite() {
            return Err(ScoringError::InvalidResponse(format!(
                "non-finite score {}",
                response.score
            )));
        }
        Ok(response.score)
    }

    fn attribute(&self, features: &FeatureRecord) -> Result<Vec<Attribution>, ScoringError> {
        let response: ExplainResponse = self.post("explain", features)?;
        let attributions = response
            .attributions
            .into_iter()
            .map(|a| Attribution::new(a.feature, a.impact))
            .collect();
        Ok(rank_attributions(attributions))
    }
}
