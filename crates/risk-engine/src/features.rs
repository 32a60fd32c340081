//! Registry text → scoring model feature row

use shared_types::FeatureRecord;

use crate::extractors::numeric::extract_lien_amounts;
use crate::patterns::{
    strip_whitespace, LEASE_REGISTRATION_ORDER_KEYWORD, OWNERSHIP_TRANSFER_KEYWORD,
    PROVISIONAL_SEIZURE_KEYWORD, SEIZURE_KEYWORD, SENIOR_LIEN_SCALE, TRUST_KEYWORD,
};

/// Build the seven-column feature row from recognized registry text
///
/// `jeonse_ratio` is the deposit divided by the matched sale price and is
/// copied through untouched.
pub fn extract_features(text: &str, jeonse_ratio: f64) -> FeatureRecord {
    let text = strip_whitespace(text);

    FeatureRecord {
        jeonse_ratio,
        has_trust: presence(&text, TRUST_KEYWORD),
        normalized_senior_lien: normalized_senior_lien(&text),
        has_provisional_seizure: presence(&text, PROVISIONAL_SEIZURE_KEYWORD),
        has_seizure: presence(&text, SEIZURE_KEYWORD),
        has_ownership_transfer: presence(&text, OWNERSHIP_TRANSFER_KEYWORD),
        has_lease_registration_order: presence(&text, LEASE_REGISTRATION_ORDER_KEYWORD),
    }
}

fn presence(text: &str, keyword: &str) -> u8 {
    u8::from(text.contains(keyword))
}

/// Largest senior lien amount in hundred-million KRW, 0.0 when none is registered
pub fn normalized_senior_lien(stripped_text: &str) -> f64 {
    extract_lien_amounts(stripped_text)
        .into_iter()
        .max()
        .map(|amount| amount as f64 / SENIOR_LIEN_SCALE)
        .unwrap_or(0.0)
}
