//! Comparable-sale selection over one year of registry queries

use std::cmp::Ordering;

use shared_types::{AdministrativeCode, BuildingName, TradeRecord};
use tracing::{debug, info, warn};

use super::{deal_ymd, RegistryClient, TradeItem};
use crate::error::RegistryError;

/// Accumulates a year of trades for one code and picks the closest sale
pub struct TransactionMatcher<'a> {
    client: &'a dyn RegistryClient,
    query_year: i32,
    retries: u32,
}

impl<'a> TransactionMatcher<'a> {
    pub fn new(client: &'a dyn RegistryClient, query_year: i32) -> Self {
        Self {
            client,
            query_year,
            retries: 0,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Every well-formed record published for the code in the query year
    ///
    /// A month whose query fails contributes nothing; malformed items are skipped.
    pub fn collect_year(&self, code: &AdministrativeCode) -> Vec<TradeRecord> {
        let mut records = Vec::new();

        for month in 1..=12 {
            let ymd = deal_ymd(self.query_year, month);
            let items = match self.fetch_with_retries(code, &ymd) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Registry query {} / {} failed: {}", code, ymd, e);
                    continue;
                }
            };

            records.extend(items.iter().filter_map(|item| match item.to_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Skipping registry item in {}: {}", ymd, e);
                    None
                }
            }));
        }

        info!(
            "Collected {} trades for {} in {}",
            records.len(),
            code,
            self.query_year
        );
        records
    }

    fn fetch_with_retries(
        &self,
        code: &AdministrativeCode,
        ymd: &str,
    ) -> Result<Vec<TradeItem>, RegistryError> {
        let mut attempt = 0;
        loop {
            match self.client.fetch_month(code, ymd) {
                Ok(items) => return Ok(items),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    debug!("Retrying {} / {} (attempt {}): {}", code, ymd, attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn find_best_match(
        &self,
        code: &AdministrativeCode,
        building: &BuildingName,
        area: f64,
    ) -> Option<TradeRecord> {
        let records = self.collect_year(code);
        select_best_match(records, building.as_str(), area)
    }
}

/// Closest-area sale among records whose complex name contains `building`
///
/// Ties on area difference go to the later contract date; full ties keep the
/// earliest record in input order.
pub fn select_best_match(
    records: impl IntoIterator<Item = TradeRecord>,
    building: &str,
    area: f64,
) -> Option<TradeRecord> {
    let mut best: Option<(f64, TradeRecord)> = None;

    for record in records {
        if !record.complex_name.contains(building) {
            continue;
        }
        let diff = (record.area - area).abs();
        let better = match &best {
            None => true,
            Some((best_diff, best_record)) => match diff.total_cmp(best_diff) {
                Ordering::Less => true,
                Ordering::Equal => record.contract_date > best_record.contract_date,
                Ordering::Greater => false,
            },
        };
        if better {
            best = Some((diff, record));
        }
    }

    best.map(|(_, record)| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::item;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn record(name: &str, area: f64, date: (i32, u32, u32), amount: i64) -> TradeRecord {
        TradeRecord {
            complex_name: name.to_string(),
            area,
            contract_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount,
        }
    }

    /// Serves canned months; months without an entry fail
    struct FakeRegistry {
        months: HashMap<String, Vec<TradeItem>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn new(months: Vec<(&str, Vec<TradeItem>)>) -> Self {
            Self {
                months: months
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RegistryClient for FakeRegistry {
        fn fetch_month(
            &self,
            _code: &AdministrativeCode,
            deal_ymd: &str,
        ) -> Result<Vec<TradeItem>, RegistryError> {
            self.calls.lock().unwrap().push(deal_ymd.to_string());
            self.months
                .get(deal_ymd)
                .cloned()
                .ok_or_else(|| RegistryError::Payload("connection reset".to_string()))
        }
    }

    fn code() -> AdministrativeCode {
        AdministrativeCode::from_reference("4113510300").unwrap()
    }

    #[test]
    fn test_smallest_area_difference_wins() {
        let records = vec![
            record("정자오피스텔", 33.0, (2024, 5, 1), 25_000),
            record("정자오피스텔", 29.5, (2024, 2, 1), 23_000),
            record("정자오피스텔", 26.0, (2024, 9, 1), 21_000),
        ];
        let best = select_best_match(records, "오피스텔", 30.0).unwrap();
        assert_eq!(best.amount, 23_000);
    }

    #[test]
    fn test_tie_goes_to_later_date() {
        let records = vec![
            record("정자오피스텔", 31.0, (2024, 2, 1), 1),
            record("정자오피스텔", 29.0, (2024, 8, 1), 2),
            record("정자오피스텔", 31.0, (2024, 4, 1), 3),
        ];
        let best = select_best_match(records, "오피스텔", 30.0).unwrap();
        assert_eq!(best.amount, 2);
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let records = vec![
            record("정자오피스텔", 30.0, (2024, 2, 1), 1),
            record("정자오피스텔", 30.0, (2024, 2, 1), 2),
        ];
        assert_eq!(select_best_match(records, "오피스텔", 30.0).unwrap().amount, 1);
    }

    #[test]
    fn test_name_filter_is_substring() {
        let records = vec![
            record("분당타워", 30.0, (2024, 2, 1), 1),
            record("정자오피스텔2차", 40.0, (2024, 2, 1), 2),
        ];
        assert_eq!(select_best_match(records.clone(), "오피스텔", 30.0).unwrap().amount, 2);
        assert!(select_best_match(records, "한빛", 30.0).is_none());
    }

    #[test]
    fn test_empty_is_none() {
        assert!(select_best_match(Vec::new(), "오피스텔", 30.0).is_none());
    }

    #[test]
    fn test_collect_year_queries_every_month_and_skips_failures() {
        let registry = FakeRegistry::new(vec![
            (
                "202403",
                vec![
                    item("정자오피스텔", "29.85", ("2024", "3", "14"), "23,500"),
                    item("정자오피스텔", "", ("2024", "3", "15"), "23,000"),
                ],
            ),
            (
                "202411",
                vec![item("분당타워", "40.1", ("2024", "11", "2"), "31,000")],
            ),
        ]);

        let matcher = TransactionMatcher::new(&registry, 2024);
        let records = matcher.collect_year(&code());

        assert_eq!(records.len(), 2);
        let calls = registry.calls.lock().unwrap();
        assert_eq!(calls.len(), 12);
        assert_eq!(calls.first().map(String::as_str), Some("202401"));
        assert_eq!(calls.last().map(String::as_str), Some("202412"));
    }

    #[test]
    fn test_retries_failed_months() {
        let registry = FakeRegistry::new(vec![]);
        let matcher = TransactionMatcher::new(&registry, 2024).with_retries(2);
        assert!(matcher.collect_year(&code()).is_empty());
        assert_eq!(registry.calls.lock().unwrap().len(), 36);
    }

    struct NoDataRegistry {
        calls: Mutex<usize>,
    }

    impl RegistryClient for NoDataRegistry {
        fn fetch_month(
            &self,
            _code: &AdministrativeCode,
            _deal_ymd: &str,
        ) -> Result<Vec<TradeItem>, RegistryError> {
            *self.calls.lock().unwrap() += 1;
            Err(RegistryError::Service {
                code: "03".to_string(),
                message: "NO_DATA".to_string(),
            })
        }
    }

    #[test]
    fn test_service_answers_are_not_retried() {
        let registry = NoDataRegistry {
            calls: Mutex::new(0),
        };
        let matcher = TransactionMatcher::new(&registry, 2024).with_retries(1);
        assert!(matcher.collect_year(&code()).is_empty());
        assert_eq!(*registry.calls.lock().unwrap(), 12);
    }

    #[test]
    fn test_find_best_match_end_to_end() {
        let registry = FakeRegistry::new(vec![(
            "202406",
            vec![
                item("정자오피스텔", "24.0", ("2024", "6", "1"), "18,000"),
                item("정자오피스텔", "30.2", ("2024", "6", "9"), "24,000"),
            ],
        )]);
        let building = BuildingName::from_text("오피스텔").unwrap();
        let best = TransactionMatcher::new(&registry, 2024)
            .find_best_match(&code(), &building, 30.0)
            .unwrap();
        assert_eq!(best.sale_price(), 240_000_000);
    }

    mod proptests {
        use super::record;
        use crate::registry::select_best_match;
        use proptest::prelude::*;

        proptest! {
            /// Property: no candidate is strictly closer in area than the selected one
            #[test]
            fn best_match_minimizes_area_difference(
                areas in prop::collection::vec(10.0f64..80.0, 1..20),
                target in 10.0f64..80.0,
            ) {
                let records: Vec<_> = areas
                    .iter()
                    .enumerate()
                    .map(|(i, a)| record("오피스텔", *a, (2024, 1 + (i as u32 % 12), 1), i as i64))
                    .collect();
                let best = select_best_match(records.clone(), "오피스텔", target).unwrap();
                let best_diff = (best.area - target).abs();
                for r in &records {
                    prop_assert!((r.area - target).abs() >= best_diff);
                }
            }
        }
    }
}
