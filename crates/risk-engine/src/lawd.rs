//! Address → administrative (LAWD) code lookup
//!
//! The reference table is the public 법정동코드 listing: one row per legal
//! neighborhood with its province, city/district and 10-digit code. Only exact
//! matches are accepted.

use std::io::Read;
use std::path::Path;

use shared_types::{AdministrativeCode, ParsedAddress};
use tracing::{debug, info};

use crate::error::ReferenceTableError;

pub const REGION_COLUMN: &str = "시도명";
pub const CITY_DISTRICT_COLUMN: &str = "시군구명";
pub const NEIGHBORHOOD_COLUMN: &str = "읍면동명";
pub const CODE_COLUMN: &str = "법정동코드";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReferenceRow {
    region: String,
    city_district: String,
    neighborhood: String,
    code: String,
}

/// In-memory copy of the reference table, in file order
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, ReferenceTableError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path.as_ref())?;
        let table = Self::from_csv(reader)?;
        info!(
            "Loaded {} reference rows from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ReferenceTableError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ReferenceTableError> {
        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header.trim().trim_start_matches('\u{feff}') == name)
                .ok_or(ReferenceTableError::MissingColumn(name))
        };

        let region = column(REGION_COLUMN)?;
        let city_district = column(CITY_DISTRICT_COLUMN)?;
        let neighborhood = column(NEIGHBORHOOD_COLUMN)?;
        let code = column(CODE_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |index: usize| record.get(index).unwrap_or("").trim().to_string();
            rows.push(ReferenceRow {
                region: cell(region),
                city_district: cell(city_district),
                neighborhood: cell(neighborhood),
                code: cell(code),
            });
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up an address string of at least three whitespace-separated parts
    ///
    /// Only the first three parts take part in the match.
    pub fn resolve(&self, address: &str) -> Option<AdministrativeCode> {
        let parts: Vec<&str> = address.split_whitespace().collect();
        if parts.len() < 3 {
            debug!("Address '{}' does not have three parts", address);
            return None;
        }
        self.lookup(parts[0], parts[1], parts[2])
    }

    pub fn resolve_parts(&self, address: &ParsedAddress) -> Option<AdministrativeCode> {
        self.lookup(
            &address.region,
            &address.city_district,
            &address.neighborhood,
        )
    }

    fn lookup(
        &self,
        region: &str,
        city_district: &str,
        neighborhood: &str,
    ) -> Option<AdministrativeCode> {
        let row = self.rows.iter().find(|row| {
            row.region == region
                && row.city_district == city_district
                && row.neighborhood == neighborhood
        });

        match row {
            Some(row) => AdministrativeCode::from_reference(&row.code),
            None => {
                debug!(
                    "No reference row for {} / {} / {}",
                    region, city_district, neighborhood
                );
                None
            }
        }
    }
}
