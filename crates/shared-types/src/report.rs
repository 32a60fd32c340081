//! Risk interpretation and the analysis response returned to callers

use serde::{Deserialize, Serialize};

/// Five-step risk grade shown to the tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "매우 높음")]
    VeryHigh,
    #[serde(rename = "높음")]
    High,
    #[serde(rename = "보통")]
    Moderate,
    #[serde(rename = "낮음")]
    Low,
    #[serde(rename = "매우 낮음")]
    VeryLow,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryHigh => "매우 높음",
            RiskLevel::High => "높음",
            RiskLevel::Moderate => "보통",
            RiskLevel::Low => "낮음",
            RiskLevel::VeryLow => "매우 낮음",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskLevel::VeryHigh => "⚠️ 보증금 반환이 어려울 가능성이 매우 높습니다.",
            RiskLevel::High => "⚠️ 보증금 반환에 위험 요소가 존재합니다.",
            RiskLevel::Moderate => "⚠️ 일부 위험 요소가 있습니다.",
            RiskLevel::Low => "✅ 위험 요소는 적은 편입니다.",
            RiskLevel::VeryLow => "✅ 위험 요소가 거의 없습니다.",
        }
    }
}

/// Whether a feature pushed the score up or down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Signed contribution of one feature to a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: String,
    pub impact: f64,
    pub direction: Direction,
}

impl Attribution {
    pub fn new(feature: impl Into<String>, impact: f64) -> Self {
        let direction = if impact > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            feature: feature.into(),
            impact,
            direction,
        }
    }
}

/// Full result of one registry analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub address: String,
    pub building: String,
    /// Matched comparable sale price in KRW
    pub sale_price: i64,
    pub jeonse_price: i64,
    /// Deposit-to-price ratio as a percentage, 2 decimals
    pub jeonse_ratio: f64,
    /// Model score, 2 decimals
    pub risk_score: f64,
    pub risk_level: String,
    pub risk_message: String,
    /// Attributions ranked by absolute impact
    pub shap: Vec<Attribution>,
    pub llm_explanation: String,
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
