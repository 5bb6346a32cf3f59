//! Relay request/summary types.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::relay::error::{RelayError, RelayResult};

/// Caller's description of one outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// HTTP method, sent verbatim.
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    /// Absolute target URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Headers set on the outbound request, overwriting client defaults.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
}

impl RelayRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Decode an inbound JSON body. Absent fields decode as empty.
    pub fn from_json(body: &[u8]) -> RelayResult<Self> {
        serde_json::from_slice(body).map_err(RelayError::Decode)
    }

    /// Reject descriptions without a method or URL. Nothing else is checked
    /// here; malformed values surface when the outbound request is built.
    pub fn validate(&self) -> RelayResult<()> {
        if self.method.is_empty() || self.url.is_empty() {
            return Err(RelayError::Validation);
        }
        Ok(())
    }
}

/// Summary returned to the caller. The body itself stays in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Registry key of the captured body.
    pub id: String,
    /// Upstream status code.
    pub status: u16,
    /// Upstream headers, first value per name.
    pub headers: BTreeMap<String, String>,
    /// Exact byte length of the upstream body.
    pub length: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
