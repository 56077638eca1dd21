//! Blocking client for the collections REST API.

mod endpoints;

pub use endpoints::LoginResponse;

use log::{debug, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use ureq::http::Response;
use ureq::{Agent, Body};

use crate::config::ApiSettings;
use crate::error::{CobranzaError, Result};
use crate::session::Session;

/// Everything except RFC 3986 unreserved characters, `.` included so an id
/// can never become a dot segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// Encode an id for use as a single URL path segment.
pub fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

pub struct ApiClient {
    agent: Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T> {
        let url = self.url(path);
        debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .header("Authorization", session.authorization())
            .call()
            .map_err(|e| network_error(&url, e))?;
        read_json(&url, response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("POST {url}");
        let payload = serde_json::to_string(body).map_err(|e| CobranzaError::ApiSchema {
            url: url.clone(),
            source: e,
        })?;

        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(session) = session {
            request = request.header("Authorization", session.authorization());
        }
        let response = request
            .send(payload.as_str())
            .map_err(|e| network_error(&url, e))?;
        read_json(&url, response)
    }

    /// POST where the response body is irrelevant
    fn post_unit<B: Serialize>(&self, path: &str, body: &B, session: &Session) -> Result<()> {
        let url = self.url(path);
        debug!("POST {url}");
        let payload = serde_json::to_string(body).map_err(|e| CobranzaError::ApiSchema {
            url: url.clone(),
            source: e,
        })?;
        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", session.authorization())
            .send(payload.as_str())
            .map_err(|e| network_error(&url, e))?;
        check_status(&url, &response)
    }

    fn delete(&self, path: &str, session: &Session) -> Result<()> {
        let url = self.url(path);
        debug!("DELETE {url}");
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", session.authorization())
            .call()
            .map_err(|e| network_error(&url, e))?;
        check_status(&url, &response)
    }
}

fn network_error(url: &str, e: ureq::Error) -> CobranzaError {
    warn!("request to {url} failed: {e}");
    CobranzaError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

fn check_status(url: &str, response: &Response<Body>) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        warn!("{url} answered {status}");
        Err(CobranzaError::Api {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn read_json<T: DeserializeOwned>(url: &str, mut response: Response<Body>) -> Result<T> {
    check_status(url, &response)?;
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| network_error(url, e))?;
    parse_body(url, &body)
}

/// Decode a response body into its typed record, failing on shape mismatch.
pub fn parse_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| CobranzaError::ApiSchema {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cliente;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 1,
        })
    }

    #[test]
    fn joins_paths() {
        let api = client("http://localhost:3000/api/");
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert_eq!(api.url("/clientes"), "http://localhost:3000/api/clientes");
        assert_eq!(api.url("clientes/4"), "http://localhost:3000/api/clientes/4");
    }

    #[test]
    fn ids_stay_one_segment() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("a-b_c~d"), "a-b_c~d");
        assert_eq!(segment("a/../b"), "a%2F%2E%2E%2Fb");
        assert_eq!(segment("x?y#z"), "x%3Fy%23z");
        assert_eq!(segment("José"), "Jos%C3%A9");
    }

    #[test]
    fn schema_mismatch_is_typed() {
        let err = parse_body::<Vec<Cliente>>("http://x/clientes", r#"[{"id": 1}]"#).unwrap_err();
        assert!(matches!(err, CobranzaError::ApiSchema { .. }));
    }
}
