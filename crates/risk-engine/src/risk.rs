// Risk score → five-step grade
use shared_types::RiskLevel;

/// Map a model score onto its risk grade
///
/// Bands are closed at the bottom: 80 is 매우 높음, 79.99 is 높음. Anything that
/// fails every comparison (including NaN) lands in the lowest band.
pub fn interpret_risk_score(score: f64) -> RiskLevel {
    if score >= 80.0 {
        RiskLevel::VeryHigh
    } else if score >= 60.0 {
        RiskLevel::High
    } else if score >= 40.0 {
        RiskLevel::Moderate
    } else if score >= 20.0 {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}
