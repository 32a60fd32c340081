// Numeric extraction utilities for registry and trade text
use crate::patterns::SENIOR_LIEN_PATTERN;

/// Parse an integer written with optional thousands separators, e.g. `" 12,500 "`
pub fn parse_grouped_integer(raw: &str) -> Option<i64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Every senior lien amount in whitespace-free registry text
///
/// Amounts too large for `i64` are skipped.
pub fn extract_lien_amounts(stripped_text: &str) -> Vec<i64> {
    SENIOR_LIEN_PATTERN
        .captures_iter(stripped_text)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| parse_grouped_integer(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grouped_integer() {
        assert_eq!(parse_grouped_integer("12,500"), Some(12_500));
        assert_eq!(parse_grouped_integer("   9,000"), Some(9_000));
        assert_eq!(parse_grouped_integer("5,000,000,000"), Some(5_000_000_000));
        assert_eq!(parse_grouped_integer(""), None);
        assert_eq!(parse_grouped_integer("12.5"), None);
        assert_eq!(parse_grouped_integer("-3"), None);
    }

    #[test]
    fn test_extract_lien_amounts() {
        let text = "근저당권설정금5,000,000,000원근저당권설정금300000000원";
        assert_eq!(extract_lien_amounts(text), vec![5_000_000_000, 300_000_000]);
        assert!(extract_lien_amounts("소유권이전").is_empty());
    }

    #[test]
    fn test_lien_label_requires_adjacent_amount() {
        assert!(extract_lien_amounts("근저당권설정금원5,000").is_empty());
    }
}
