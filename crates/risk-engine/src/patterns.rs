//! Keywords and regex patterns used to read registry text

use lazy_static::lazy_static;
use regex::Regex;

/// Trust registration (신탁)
pub const TRUST_KEYWORD: &str = "신탁";

/// Provisional seizure (가압류)
pub const PROVISIONAL_SEIZURE_KEYWORD: &str = "가압류";

/// Seizure (압류); also matches inside 가압류
pub const SEIZURE_KEYWORD: &str = "압류";

/// Ownership transfer (소유권이전)
pub const OWNERSHIP_TRANSFER_KEYWORD: &str = "소유권이전";

/// Lease registration order (임차권등기명령)
pub const LEASE_REGISTRATION_ORDER_KEYWORD: &str = "임차권등기명령";

/// Label that precedes a senior lien (근저당) amount once spacing is removed
pub const SENIOR_LIEN_LABEL: &str = "근저당권설정금";

/// Lien amounts are reported in units of one hundred million KRW
pub const SENIOR_LIEN_SCALE: f64 = 100_000_000.0;

/// Ordinal prefix of floor and unit numbers (`제1층`, `제101호`)
pub const ORDINAL_MARKER: char = '제';

pub const FLOOR_MARKER: char = '층';

/// Neighborhood suffix, also used for building wings (`A동`)
pub const DONG_MARKER: char = '동';

lazy_static! {
    /// `[집합건물]` marker, tolerating OCR spacing; captures the rest of the line
    pub static ref COLLECTIVE_BUILDING_MARKER: Regex =
        Regex::new(r"\[\s*집\s*합\s*건\s*물\s*\]\s*([^\n]+)").unwrap();

    /// Lot number at the start of a token: 1-4 digits, optional `-` and digits
    pub static ref LOT_NUMBER_PATTERN: Regex = Regex::new(r"^\d{1,4}-?\d*").unwrap();

    /// Decimal digits; Roman and circled numerals (`Ⅱ`, `①`) do not count
    pub static ref DIGITS_PATTERN: Regex = Regex::new(r"\d").unwrap();

    /// Unit marker such as `101호`
    pub static ref UNIT_NUMBER_PATTERN: Regex = Regex::new(r"\d+호").unwrap();

    /// Senior lien label followed by an amount with optional thousands separators
    pub static ref SENIOR_LIEN_PATTERN: Regex =
        Regex::new(r"근저당권설정금(\d+(?:,\d+)*)").unwrap();
}

/// Remove every whitespace character; OCR spacing carries no meaning in registry text
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_tolerates_spacing() {
        let caps = COLLECTIVE_BUILDING_MARKER
            .captures("표제부\n[ 집 합 건물 ] 경기도 성남시\n갑구")
            .unwrap();
        assert_eq!(&caps[1], "경기도 성남시");
    }

    #[test]
    fn test_lot_number_is_prefix_match() {
        assert!(LOT_NUMBER_PATTERN.is_match("123-4"));
        assert!(LOT_NUMBER_PATTERN.is_match("7"));
        assert!(LOT_NUMBER_PATTERN.is_match("101동"));
        assert!(!LOT_NUMBER_PATTERN.is_match("정자동"));
        assert!(!LOT_NUMBER_PATTERN.is_match("제1층"));
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" 가 압\n류\t"), "가압류");
    }
}
