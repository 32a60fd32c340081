use std::fmt;

use chrono::NaiveDate;

/// Text recognized from one rendered page
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecognizedPage {
    pub index: usize,
    pub text: String,
}

/// All recognized pages of a registry document, in page order
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecognizedDocument {
    pub pages: Vec<RecognizedPage>,
}

impl RecognizedDocument {
    pub fn new(pages: Vec<RecognizedPage>) -> Self {
        Self { pages }
    }

    /// Build a single-page document from raw text (fixtures, plain-text uploads)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![RecognizedPage {
                index: 0,
                text: text.into(),
            }],
        }
    }

    /// Concatenate every page, each followed by a newline
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            text.push_str(&page.text);
            text.push('\n');
        }
        text
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Region / city-district / neighborhood triple taken from the `[집합건물]` line.
///
/// All three parts are non-empty; the parser never builds a partial value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ParsedAddress {
    pub region: String,
    pub city_district: String,
    pub neighborhood: String,
}

impl ParsedAddress {
    pub fn new(
        region: impl Into<String>,
        city_district: impl Into<String>,
        neighborhood: impl Into<String>,
    ) -> Option<Self> {
        let address = Self {
            region: region.into(),
            city_district: city_district.into(),
            neighborhood: neighborhood.into(),
        };

        if address.region.is_empty()
            || address.city_district.is_empty()
            || address.neighborhood.is_empty()
        {
            return None;
        }

        Some(address)
    }
}

impl fmt::Display for ParsedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.region, self.city_district, self.neighborhood
        )
    }
}

/// Building name made of Hangul syllables only
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BuildingName(String);

impl BuildingName {
    /// Keep the Hangul syllables (U+AC00..=U+D7A3) of `raw`; `None` if nothing is left
    pub fn from_text(raw: &str) -> Option<Self> {
        let name: String = raw.chars().filter(|c| is_hangul_syllable(*c)).collect();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Five-character administrative (LAWD) region code
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AdministrativeCode(String);

impl AdministrativeCode {
    pub const LEN: usize = 5;

    /// Truncate a reference-table code (e.g. a 10-digit 법정동코드) to its region part
    pub fn from_reference(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.chars().count() < Self::LEN {
            return None;
        }
        Some(Self(code.chars().take(Self::LEN).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdministrativeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One officetel sale published by the transaction registry
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradeRecord {
    pub complex_name: String,
    /// Exclusive-use area in square meters
    pub area: f64,
    pub contract_date: NaiveDate,
    /// Deal amount as published, in units of 10,000 KRW
    pub amount: i64,
}

impl TradeRecord {
    /// Sale price in KRW
    pub fn sale_price(&self) -> i64 {
        self.amount.saturating_mul(10_000)
    }
}

/// Scoring model column names, in the order the model was trained on
pub const FEATURE_COLUMNS: [&str; 7] = [
    "전세가율",
    "신탁",
    "근저당정규화",
    "가압류",
    "압류",
    "소유권이전",
    "임차권등기명령",
];

/// Fixed seven-column input row for the risk scoring model
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "전세가율")]
    pub jeonse_ratio: f64,
    #[serde(rename = "신탁")]
    pub has_trust: u8,
    #[serde(rename = "근저당정규화")]
    pub normalized_senior_lien: f64,
    #[serde(rename = "가압류")]
    pub has_provisional_seizure: u8,
    #[serde(rename = "압류")]
    pub has_seizure: u8,
    #[serde(rename = "소유권이전")]
    pub has_ownership_transfer: u8,
    #[serde(rename = "임차권등기명령")]
    pub has_lease_registration_order: u8,
}

impl FeatureRecord {
    /// Row values in `FEATURE_COLUMNS` order
    pub fn values(&self) -> [f64; 7] {
        [
            self.jeonse_ratio,
            f64::from(self.has_trust),
            self.normalized_senior_lien,
            f64::from(self.has_provisional_seizure),
            f64::from(self.has_seizure),
            f64::from(self.has_ownership_transfer),
            f64::from(self.has_lease_registration_order),
        ]
    }

    /// `(column, value)` pairs in model order
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_COLUMNS.into_iter().zip(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_text_preserves_page_order() {
        let doc = RecognizedDocument::new(vec![
            RecognizedPage {
                index: 0,
                text: "첫째".to_string(),
            },
            RecognizedPage {
                index: 1,
                text: "둘째".to_string(),
            },
        ]);
        assert_eq!(doc.full_text(), "첫째\n둘째\n");
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_parsed_address_rejects_empty_part() {
        assert!(ParsedAddress::new("경기도", "", "정자동").is_none());
        let address = ParsedAddress::new("경기도", "성남시분당구", "정자동").unwrap();
        assert_eq!(address.to_string(), "경기도 성남시분당구 정자동");
    }

    #[test]
    fn test_building_name_keeps_hangul_only() {
        let name = BuildingName::from_text("○○오피스텔(A)").unwrap();
        assert_eq!(name.as_str(), "오피스텔");
        assert!(BuildingName::from_text("123-A").is_none());
    }

    #[test]
    fn test_administrative_code_truncates() {
        let code = AdministrativeCode::from_reference("4113510900").unwrap();
        assert_eq!(code.as_str(), "41135");
        assert!(AdministrativeCode::from_reference("411").is_none());
    }

    #[test]
    fn test_sale_price_scales_amount() {
        let record = TradeRecord {
            complex_name: "정자오피스텔".to_string(),
            area: 29.5,
            contract_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            amount: 23_500,
        };
        assert_eq!(record.sale_price(), 235_000_000);
    }

    #[test]
    fn test_feature_record_serializes_model_columns() {
        let record = FeatureRecord {
            jeonse_ratio: 0.8,
            has_trust: 1,
            normalized_senior_lien: 1.2,
            has_provisional_seizure: 0,
            has_seizure: 0,
            has_ownership_transfer: 1,
            has_lease_registration_order: 0,
        };

        let json = serde_json::to_value(record).unwrap();
        for column in FEATURE_COLUMNS {
            assert!(json.get(column).is_some(), "missing column {}", column);
        }

        let columns: Vec<_> = record.columns().map(|(name, _)| name).collect();
        assert_eq!(columns, FEATURE_COLUMNS.to_vec());
        assert_eq!(record.values()[1], 1.0);
    }

    mod proptests {
        use crate::types::{is_hangul_syllable, BuildingName};
        use proptest::prelude::*;

        proptest! {
            /// Property: building names never contain anything but Hangul syllables
            #[test]
            fn building_name_is_hangul_only(raw in "\\PC{0,40}") {
                if let Some(name) = BuildingName::from_text(&raw) {
                    prop_assert!(!name.as_str().is_empty());
                    prop_assert!(name.as_str().chars().all(is_hangul_syllable));
                }
            }
        }
    }
}
