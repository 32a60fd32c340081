//! Address and building name extraction from the `[집합건물]` line
//!
//! The line is processed in named stages so each one can be tested against
//! noisy OCR output on its own:
//!
//! 1. `marker`: locate the line after `[집합건물]`
//! 2. `tokens`: split on whitespace and classify each token
//! 3. `tokens::resolve_boundary`: find where the neighborhood ends
//! 4. assemble the region / city-district / neighborhood triple
//! 5. `building`: strip unit and floor markers from the remaining tokens

pub mod building;
pub mod marker;
pub mod tokens;

use shared_types::{BuildingName, ParsedAddress};
use tracing::debug;

use crate::error::ParseError;
use tokens::{resolve_boundary, tokenize, Token};

/// Region plus two city/district tokens must precede the neighborhood
const MIN_BOUNDARY: usize = 3;

/// Address and building name read from one registry document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySubject {
    pub address: ParsedAddress,
    pub building: BuildingName,
}

/// Parse the address and building name together; both succeed or neither does
pub fn parse_address_and_building(text: &str) -> Result<RegistrySubject, ParseError> {
    let line = marker::locate_marker_line(text)?;
    let tokens = tokenize(line);

    let boundary = match resolve_boundary(&tokens) {
        Some(boundary) if boundary >= MIN_BOUNDARY => boundary,
        other => {
            debug!("Rejecting marker line '{}' (boundary {:?})", line, other);
            return Err(ParseError::InsufficientTokens { boundary: other });
        }
    };

    let address = assemble_address(&tokens, boundary)
        .ok_or(ParseError::InsufficientTokens {
            boundary: Some(boundary),
        })?;

    // The token right after the boundary is the lot number (or, without one,
    // whatever follows the last 동 token); the building name starts after it.
    let trailing = tokens.get(boundary + 2..).unwrap_or(&[]);
    let building = building::building_name(trailing).ok_or(ParseError::MissingBuildingName)?;

    Ok(RegistrySubject { address, building })
}

fn assemble_address(tokens: &[Token<'_>], boundary: usize) -> Option<ParsedAddress> {
    let region = tokens.first()?.text;
    let city_district = format!("{}{}", tokens.get(1)?.text, tokens.get(2)?.text);
    let neighborhood: String = tokens
        .get(MIN_BOUNDARY..=boundary)?
        .iter()
        .map(|token| token.text)
        .collect();

    ParsedAddress::new(region, city_district, neighborhood)
}
