//! Remaining-credit lookups against the scraping provider

use std::time::Duration;

use serde::Deserialize;

use crate::error::{CuadreError, CuadreResult};
use crate::models::mask_key;

/// Anything that can report the remaining monthly credits of a key
pub trait CreditSource {
    fn remaining_credits(&self, key: &str) -> CuadreResult<i64>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    request_limit: i64,
    request_count: i64,
}

/// Blocking client for the provider's `/account` endpoint
pub struct ScraperApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ScraperApiClient {
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>) -> CuadreResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl CreditSource for ScraperApiClient {
    fn remaining_credits(&self, key: &str) -> CuadreResult<i64> {
        let url = format!("{}/account", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", key)])
            .send()
            .map_err(|e| lookup_error(key, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CuadreError::Http(format!(
                "Credit lookup for {} returned {}",
                mask_key(key),
                status
            )));
        }

        let account: AccountResponse = response.json().map_err(|e| lookup_error(key, e))?;
        let remaining = account.request_limit - account.request_count;
        tracing::info!(key = %mask_key(key), remaining, "credits looked up");

        Ok(remaining)
    }
}

fn lookup_error(key: &str, err: reqwest::Error) -> CuadreError {
    CuadreError::Http(format!(
        "Credit lookup for {} failed: {}",
        mask_key(key),
        err.without_url()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_remaining_credits_from_account_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/account")
                .query_param("api_key", "key-0001-abcdef");
            then.status(200)
                .json_body(json!({"requestLimit": 1000, "requestCount": 275}));
        });

        let client = ScraperApiClient::new(server.base_url()).unwrap();
        let credits = client.remaining_credits("key-0001-abcdef").unwrap();

        mock.assert();
        assert_eq!(credits, 725);
    }

    #[test]
    fn test_error_status_is_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/account");
            then.status(401).body("invalid key");
        });

        let client = ScraperApiClient::new(format!("{}/", server.base_url())).unwrap();
        let err = client.remaining_credits("bad").unwrap_err();
        assert!(matches!(err, CuadreError::Http(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_malformed_body_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/account");
            then.status(200).json_body(json!({"unexpected": true}));
        });

        let client = ScraperApiClient::new(server.base_url()).unwrap();
        assert!(client.remaining_credits("k").is_err());
    }

    #[test]
    fn test_transport_error_masks_key() {
        let client = ScraperApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.remaining_credits("SUPERSECRETKEY123").unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, CuadreError::Http(_)));
        assert!(!message.contains("SUPERSECRETKEY123"), "{}", message);
        assert!(message.contains("SUPERSEC..."));
    }
}
