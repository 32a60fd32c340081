//! Building name cleanup for the tokens after the lot number

use shared_types::BuildingName;

use super::tokens::Token;
use crate::patterns::{
    DIGITS_PATTERN, DONG_MARKER, FLOOR_MARKER, ORDINAL_MARKER, UNIT_NUMBER_PATTERN,
};

/// Administrative suffix found in a token trailing the building name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    /// `제` ordinal prefix (`제1층`, `제101호`)
    Ordinal,
    /// `101호`
    Unit,
    /// `층`
    Floor,
    /// `동` wing marker
    Wing,
    /// Any other digits
    Digits,
}

/// Classify a token as an administrative suffix, if it is one
pub fn suffix_kind(token: &str) -> Option<SuffixKind> {
    if token.contains(ORDINAL_MARKER) {
        Some(SuffixKind::Ordinal)
    } else if UNIT_NUMBER_PATTERN.is_match(token) {
        Some(SuffixKind::Unit)
    } else if token.contains(FLOOR_MARKER) {
        Some(SuffixKind::Floor)
    } else if token.contains(DONG_MARKER) {
        Some(SuffixKind::Wing)
    } else if DIGITS_PATTERN.is_match(token) {
        Some(SuffixKind::Digits)
    } else {
        None
    }
}

/// Join the non-suffix tokens and keep their Hangul syllables
pub fn building_name(tokens: &[Token<'_>]) -> Option<BuildingName> {
    let joined: String = tokens
        .iter()
        .filter(|token| suffix_kind(token.text).is_none())
        .map(|token| token.text)
        .collect();

    BuildingName::from_text(&joined)
}
