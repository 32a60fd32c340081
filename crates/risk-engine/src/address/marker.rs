use crate::error::ParseError;
use crate::patterns::COLLECTIVE_BUILDING_MARKER;

/// Text following the first `[집합건물]` marker, trimmed
pub fn locate_marker_line(text: &str) -> Result<&str, ParseError> {
    COLLECTIVE_BUILDING_MARKER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(ParseError::MarkerNotFound)
}
