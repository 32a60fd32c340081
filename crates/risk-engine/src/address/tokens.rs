//! Tokenizer and token classifier for the `[집합건물]` line

use crate::patterns::{DONG_MARKER, LOT_NUMBER_PATTERN};

/// Lexical role of one whitespace-separated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Starts with a lot number such as `123-4`; ends the address part
    LotNumber,
    /// Contains `동`; candidate end of the neighborhood
    Neighborhood,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub class: TokenClass,
}

/// Lot number wins over `동` when a token qualifies as both (e.g. `101동`)
pub fn classify(token: &str) -> TokenClass {
    if LOT_NUMBER_PATTERN.is_match(token) {
        TokenClass::LotNumber
    } else if token.contains(DONG_MARKER) {
        TokenClass::Neighborhood
    } else {
        TokenClass::Word
    }
}

pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    line.split_whitespace()
        .map(|text| Token {
            text,
            class: classify(text),
        })
        .collect()
}

/// Index of the last token belonging to the neighborhood.
///
/// Scanning left to right, every `동` token moves the boundary onto itself; the
/// first lot number pins it to the preceding token and stops the scan. The two
/// rules can disagree on irregular lines (a later `동` token after an early lot
/// number is never seen); this precedence is kept as-is.
pub fn resolve_boundary(tokens: &[Token<'_>]) -> Option<usize> {
    let mut boundary = None;
    for (index, token) in tokens.iter().enumerate() {
        match token.class {
            TokenClass::LotNumber => return index.checked_sub(1),
            TokenClass::Neighborhood => boundary = Some(index),
            TokenClass::Word => {}
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(line: &str) -> Vec<TokenClass> {
        tokenize(line).into_iter().map(|t| t.class).collect()
    }

    #[test]
    fn test_classify_tokens() {
        use TokenClass::*;
        assert_eq!(
            classes("경기도 성남시 분당구 정자동 123-4 정자오피스텔 101동"),
            vec![Word, Word, Word, Neighborhood, LotNumber, Word, LotNumber]
        );
    }

    #[test]
    fn test_boundary_before_lot_number() {
        let tokens = tokenize("경기도 성남시 분당구 정자동 123-4 정자오피스텔");
        assert_eq!(resolve_boundary(&tokens), Some(3));
    }

    #[test]
    fn test_boundary_from_last_dong_without_lot_number() {
        let tokens = tokenize("경기도 수원시 영통구 이의동 광교 중앙동 센트럴타워");
        assert_eq!(resolve_boundary(&tokens), Some(5));
    }

    #[test]
    fn test_lot_number_overrides_later_dong() {
        // The trailing 동 token is never reached
        let tokens = tokenize("경기도 성남시 분당구 판교로 12 A동");
        assert_eq!(resolve_boundary(&tokens), Some(3));
    }

    #[test]
    fn test_leading_lot_number_has_no_boundary() {
        let tokens = tokenize("12-3 정자동");
        assert_eq!(resolve_boundary(&tokens), None);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(resolve_boundary(&tokenize("   ")), None);
    }
}
