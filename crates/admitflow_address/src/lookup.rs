//! The pincode lookup seam and its HTTP implementation.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use thiserror::Error;

use crate::config::LookupConfig;

/// Successful lookup payload.
///
/// The service guarantees `state`; city options are optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PincodeRecord {
    pub state: String,

    #[serde(default, rename = "acceptedCities")]
    pub accepted_cities: Vec<String>,

    #[serde(default, rename = "defaultcity")]
    pub default_city: Option<String>,
}

/// Lookup failures. All of these surface as one advisory error on the
/// postal-code field; none of them blocks the form.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Network-level failure (unreachable, timeout).
    #[error("Lookup request failed: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("Lookup returned status {0}")]
    Status(u16),

    /// Body did not parse, or parsed without a usable state.
    #[error("Lookup response malformed: {0}")]
    Malformed(String),
}

pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<PincodeRecord, LookupError>> + Send + 'a>>;

/// The lookup collaborator. One call per dispatched query.
pub trait PincodeLookup: Send + Sync {
    fn lookup<'a>(&'a self, alpha2: &'a str, postal: &'a str) -> LookupFuture<'a>;
}

/// Production implementation against
/// `GET {base}/countries/{alpha2}/pincodes/{postal}`.
pub struct HttpPincodeLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPincodeLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, alpha2: &str, postal: &str) -> Result<PincodeRecord, LookupError> {
        let url = format!("{}/countries/{}/pincodes/{}", self.base_url, alpha2, postal);
        tracing::debug!(%url, "dispatching pincode lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let record: PincodeRecord = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        if record.state.trim().is_empty() {
            return Err(LookupError::Malformed("missing state".to_string()));
        }

        Ok(record)
    }
}

impl PincodeLookup for HttpPincodeLookup {
    fn lookup<'a>(&'a self, alpha2: &'a str, postal: &'a str) -> LookupFuture<'a> {
        Box::pin(self.fetch(alpha2, postal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_field_aliases() {
        let record: PincodeRecord = serde_json::from_str(
            r#"{"state": "Tamil Nadu", "acceptedCities": ["Chennai", "Tambaram"], "defaultcity": "Chennai"}"#,
        )
        .unwrap();
        assert_eq!(record.state, "Tamil Nadu");
        assert_eq!(record.accepted_cities.len(), 2);
        assert_eq!(record.default_city.as_deref(), Some("Chennai"));
    }

    #[test]
    fn test_payload_minimal_body() {
        let record: PincodeRecord = serde_json::from_str(r#"{"state": "Goa"}"#).unwrap();
        assert!(record.accepted_cities.is_empty());
        assert!(record.default_city.is_none());
    }

    #[test]
    fn test_error_display() {
        assert!(LookupError::Status(404).to_string().contains("404"));
        assert!(LookupError::Transport("timed out".to_string())
            .to_string()
            .contains("timed out"));
    }
}
