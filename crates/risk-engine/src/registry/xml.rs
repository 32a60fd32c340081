//! XML payloads of the officetel trade registry (RTMSDataSvcOffiTrade)

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use super::TradeItem;
use crate::error::RegistryError;

const SUCCESS_CODES: &[&str] = &["00", "000"];

/// Envelope checked for the result code; items are read separately
#[derive(Debug, Deserialize)]
struct TradeResponse {
    header: Option<ResponseHeader>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "resultCode")]
    result_code: Option<String>,
    #[serde(rename = "resultMsg")]
    result_msg: Option<String>,
}

/// Gateway-level failure (bad key, quota, ...) returned instead of a normal response
#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(rename = "cmmMsgHeader")]
    header: GatewayHeader,
}

#[derive(Debug, Deserialize)]
struct GatewayHeader {
    #[serde(rename = "errMsg")]
    err_msg: Option<String>,
    #[serde(rename = "returnAuthMsg")]
    auth_msg: Option<String>,
    #[serde(rename = "returnReasonCode")]
    reason_code: Option<String>,
}

/// Extract every `<item>` of one registry response
pub fn parse_trade_items(payload: &str) -> Result<Vec<TradeItem>, RegistryError> {
    if payload.contains("<OpenAPI_ServiceResponse") {
        let gateway: GatewayError = quick_xml::de::from_str(payload)
            .map_err(|e| RegistryError::Payload(e.to_string()))?;
        let header = gateway.header;
        return Err(RegistryError::Service {
            code: header.reason_code.unwrap_or_default(),
            message: header
                .auth_msg
                .or(header.err_msg)
                .unwrap_or_else(|| "unknown gateway error".to_string()),
        });
    }

    let response: TradeResponse =
        quick_xml::de::from_str(payload).map_err(|e| RegistryError::Payload(e.to_string()))?;

    if let Some(header) = response.header {
        let code = header.result_code.unwrap_or_default();
        let code = code.trim();
        if !code.is_empty() && !SUCCESS_CODES.contains(&code) {
            return Err(RegistryError::Service {
                code: code.to_string(),
                message: header.result_msg.unwrap_or_default(),
            });
        }
    }

    read_items(payload)
}

fn payload_error(err: quick_xml::Error) -> RegistryError {
    RegistryError::Payload(err.to_string())
}

/// Walk every `<item>` element field by field
///
/// Items are not deserialized as a whole so that one irregular item (a
/// repeated field, markup inside a value) cannot discard its neighbours; its
/// fields keep their first value and `TradeItem::to_record` rejects it alone.
fn read_items(payload: &str) -> Result<Vec<TradeItem>, RegistryError> {
    let mut reader = Reader::from_str(payload);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<TradeItem> = None;
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(payload_error)? {
            Event::Start(e) if e.name().as_ref() == b"item" => {
                depth += 1;
                current = Some(TradeItem::default());
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"item" {
                    items.extend(current.take());
                }
            }
            // read_text consumes the matching end tag of a field
            Event::Start(e) => match current.as_mut() {
                Some(item) => {
                    let raw = reader.read_text(e.name()).map_err(payload_error)?;
                    let value = match quick_xml::escape::unescape(&raw) {
                        Ok(unescaped) => unescaped.into_owned(),
                        Err(_) => raw.to_string(),
                    };
                    item.set_field(e.name().as_ref(), value);
                }
                None => depth += 1,
            },
            Event::Eof if depth > 0 => {
                return Err(RegistryError::Payload("truncated payload".to_string()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}
