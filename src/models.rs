//! Raw API response types
//!
//! Mirrors the subset of the `/connections` response we display. Every
//! connection is decoded on its own so a bad record can be reported by its
//! position in the result list.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{FahrplanError, Result};

/// Top-level response body; connections stay untyped until [`decode_connections`]
#[derive(Debug, Deserialize)]
pub struct RawConnectionsResponse {
    pub connections: Vec<JsonValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConnection {
    /// 1-based position in the response, filled in by [`decode_connections`]
    #[serde(skip)]
    pub index: usize,
    pub from: RawCheckpoint,
    pub to: RawCheckpoint,
    pub sections: Vec<RawSection>,
}

/// A stop on the connection, either the origin or the destination
#[derive(Debug, Clone, Deserialize)]
pub struct RawCheckpoint {
    pub station: RawStation,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub arrival: Option<String>,
    #[serde(default)]
    pub prognosis: Option<RawPrognosis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    /// `null` or absent for walking legs
    #[serde(default)]
    pub journey: Option<RawJourney>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawJourney {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPrognosis {
    #[serde(default, rename = "capacity1st")]
    pub capacity_1st: Option<CapacityCode>,
    #[serde(default, rename = "capacity2nd")]
    pub capacity_2nd: Option<CapacityCode>,
}

/// Occupancy code; the API has sent both `"2"` and `2` over time
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CapacityCode {
    Number(i64),
    Text(String),
}

impl CapacityCode {
    pub fn as_code(&self) -> String {
        match self {
            CapacityCode::Number(n) => n.to_string(),
            CapacityCode::Text(s) => s.trim().to_string(),
        }
    }
}

/// Body the API sends along with a failure status
#[derive(Debug, Deserialize)]
struct RawErrorResponse {
    #[serde(default)]
    errors: Vec<RawApiError>,
}

#[derive(Debug, Deserialize)]
struct RawApiError {
    #[serde(default)]
    message: Option<String>,
}

/// Messages from an `{"errors": [{"message": ..}]}` body, joined by `"; "`.
pub fn api_error_message(body: &str) -> Option<String> {
    let response: RawErrorResponse = serde_json::from_str(body).ok()?;
    let messages: Vec<String> = response
        .errors
        .into_iter()
        .filter_map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

/// Parse a response body into its still-untyped connection list.
pub fn parse_response(body: &str) -> Result<Vec<JsonValue>> {
    let response: RawConnectionsResponse = serde_json::from_str(body).map_err(|e| {
        if e.is_syntax() || e.is_eof() {
            FahrplanError::InvalidResponse(format!("invalid JSON: {e}"))
        } else {
            FahrplanError::InvalidResponse(e.to_string())
        }
    })?;
    Ok(response.connections)
}

/// Decode each connection, tagging it (and any error) with its 1-based index.
pub fn decode_connections(values: Vec<JsonValue>) -> Result<Vec<RawConnection>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let index = i + 1;
            let mut connection: RawConnection = serde_json::from_value(value)
                .map_err(|source| FahrplanError::InvalidConnection { index, source })?;
            connection.index = index;
            Ok(connection)
        })
        .collect()
}
