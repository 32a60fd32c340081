//! Officetel trade registry: client capability, payload parsing and matching

pub mod matcher;
pub mod xml;

use std::time::Duration;

use chrono::NaiveDate;
use shared_types::{AdministrativeCode, TradeRecord};
use tracing::debug;

use crate::error::{MalformedRecord, RegistryError};
use crate::extractors::numeric::parse_grouped_integer;

pub use matcher::{select_best_match, TransactionMatcher};

pub const DEFAULT_ENDPOINT: &str =
    "http://apis.data.go.kr/1613000/RTMSDataSvcOffiTrade/getRTMSDataSvcOffiTrade";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One `<item>` exactly as published; every field may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeItem {
    /// `offiNm`
    pub complex_name: Option<String>,
    /// `excluUseAr`
    pub area: Option<String>,
    /// `dealYear`
    pub deal_year: Option<String>,
    /// `dealMonth`
    pub deal_month: Option<String>,
    /// `dealDay`
    pub deal_day: Option<String>,
    /// `dealAmount`
    pub deal_amount: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, MalformedRecord> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MalformedRecord::MissingField(field)),
    }
}

fn invalid(field: &'static str, value: &str) -> MalformedRecord {
    MalformedRecord::InvalidField {
        field,
        value: value.to_string(),
    }
}

impl TradeItem {
    /// Store a field read from the payload; the first occurrence wins
    pub(crate) fn set_field(&mut self, element: &[u8], value: String) {
        let slot = match element {
            b"offiNm" => &mut self.complex_name,
            b"excluUseAr" => &mut self.area,
            b"dealYear" => &mut self.deal_year,
            b"dealMonth" => &mut self.deal_month,
            b"dealDay" => &mut self.deal_day,
            b"dealAmount" => &mut self.deal_amount,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    pub fn to_record(&self) -> Result<TradeRecord, MalformedRecord> {
        let complex_name = required(&self.complex_name, "offiNm")?;

        let area_raw = required(&self.area, "excluUseAr")?;
        let area: f64 = area_raw
            .parse()
            .ok()
            .filter(|a: &f64| a.is_finite())
            .ok_or_else(|| invalid("excluUseAr", area_raw))?;

        let year = required(&self.deal_year, "dealYear")?;
        let month = required(&self.deal_month, "dealMonth")?;
        let day = required(&self.deal_day, "dealDay")?;
        let contract_date = parse_contract_date(year, month, day)
            .ok_or_else(|| invalid("contract date", &format!("{}-{}-{}", year, month, day)))?;

        let amount_raw = required(&self.deal_amount, "dealAmount")?;
        let amount = parse_grouped_integer(amount_raw)
            .filter(|amount| *amount > 0)
            .ok_or_else(|| invalid("dealAmount", amount_raw))?;

        Ok(TradeRecord {
            complex_name: complex_name.to_string(),
            area,
            contract_date,
            amount,
        })
    }
}

fn parse_contract_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// `DEAL_YMD` query value for one month
pub fn deal_ymd(year: i32, month: u32) -> String {
    format!("{:04}{:02}", year, month)
}

/// Source of raw trade items for one (code, month) query
pub trait RegistryClient: Send + Sync {
    fn fetch_month(
        &self,
        code: &AdministrativeCode,
        deal_ymd: &str,
    ) -> Result<Vec<TradeItem>, RegistryError>;
}

/// Blocking HTTP client for the public data portal
pub struct HttpRegistryClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    credential: String,
    page_size: u32,
}

impl HttpRegistryClient {
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential: credential.into(),
            page_size,
        })
    }
}

impl RegistryClient for HttpRegistryClient {
    fn fetch_month(
        &self,
        code: &AdministrativeCode,
        deal_ymd: &str,
    ) -> Result<Vec<TradeItem>, RegistryError> {
        let page_size = self.page_size.to_string();
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("serviceKey", self.credential.as_str()),
                ("LAWD_CD", code.as_str()),
                ("DEAL_YMD", deal_ymd),
                ("pageNo", "1"),
                ("numOfRows", page_size.as_str()),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        let items = xml::parse_trade_items(&body)?;
        debug!("{} items for {} / {}", items.len(), code, deal_ymd);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn item(name: &str, area: &str, date: (&str, &str, &str), amount: &str) -> TradeItem {
        TradeItem {
            complex_name: Some(name.to_string()),
            area: Some(area.to_string()),
            deal_year: Some(date.0.to_string()),
            deal_month: Some(date.1.to_string()),
            deal_day: Some(date.2.to_string()),
            deal_amount: Some(amount.to_string()),
        }
    }

    #[test]
    fn test_item_to_record() {
        let record = item("정자오피스텔", "29.85", ("2024", "3", "14"), "   23,500")
            .to_record()
            .unwrap();
        assert_eq!(
            record,
            TradeRecord {
                complex_name: "정자오피스텔".to_string(),
                area: 29.85,
                contract_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
                amount: 23_500,
            }
        );
        assert_eq!(record.sale_price(), 235_000_000);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut raw = item("정자오피스텔", "29.85", ("2024", "3", "14"), "23,500");
        raw.area = None;
        assert_eq!(
            raw.to_record(),
            Err(MalformedRecord::MissingField("excluUseAr"))
        );
    }

    #[test]
    fn test_invalid_values_are_malformed() {
        assert!(item("a", "29.85", ("2024", "2", "30"), "1")
            .to_record()
            .is_err());
        assert!(item("a", "NaN", ("2024", "2", "1"), "1").to_record().is_err());
        assert!(item("a", "29.85", ("2024", "2", "1"), "1만").to_record().is_err());
        assert!(item("a", "29.85", ("2024", "2", "1"), "0").to_record().is_err());
    }

    #[test]
    fn test_deal_ymd() {
        assert_eq!(deal_ymd(2024, 1), "202401");
        assert_eq!(deal_ymd(2024, 12), "202412");
    }
}
