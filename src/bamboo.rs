//! BambooHR API interactions.
//!
//! This module fetches the three upstream feeds the reconciler consumes:
//! - `GET v1/meta/fields` - every field the company's schema advertises
//! - `POST v1/reports/custom` - a custom report over a list of fields
//! - `GET v1/employees/directory` - the employee directory
//!
//! Requests authenticate with HTTP basic auth (API key as user, `x` as
//! password) and are blocking.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::models::{CustomReport, DirectoryRecord, FieldDescriptor};
use crate::reconcile::EmployeeSource;

/// BambooHR API gateway root; the company domain is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://api.bamboohr.com/api/gateway.php";

/// Response header carrying BambooHR's explanation of a failed request.
pub const ERROR_HEADER: &str = "x-bamboohr-error-message";

/// Errors that can occur while talking to the BambooHR API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request was rejected (4xx)
    #[error("Client error in API request: HTTP {status}{}", detail(.message))]
    ClientError {
        status: u16,
        message: Option<String>,
    },

    /// The server failed or answered with an unexpected status (5xx, 3xx)
    #[error("Server error in API request: HTTP {status}{}", detail(.message))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    /// A successful response whose body could not be decoded
    #[error("Error parsing API response: {0}")]
    ParseError(String),

    /// No HTTP response at all (DNS, connection refused, timeout)
    #[error("Network error: {0}")]
    Network(String),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(" ({})", message),
        None => String::new(),
    }
}

impl TransportError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        if (400..=499).contains(&status) {
            TransportError::ClientError { status, message }
        } else {
            TransportError::ServerError { status, message }
        }
    }

    /// The HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::ClientError { status, .. } | TransportError::ServerError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Body of the directory endpoint (only the part we read).
#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    employees: Vec<DirectoryRecord>,
}

/// Blocking BambooHR API client for one company.
#[derive(Debug, Clone)]
pub struct BambooClient {
    agent: ureq::Agent,
    company_url: String,
    authorization: String,
}

impl BambooClient {
    /// Create a client for `company_domain` under the given gateway root.
    pub fn new(base_url: &str, company_domain: &str, api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            company_url: company_url(base_url, company_domain),
            authorization: basic_auth(api_key),
        }
    }

    /// The company-specific API root (always ends with `/`).
    pub fn company_url(&self) -> &str {
        &self.company_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.company_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        tracing::debug!(path, "GET");
        let response = self
            .agent
            .get(&self.url(path))
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
            .call();
        read_json(path, response)
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, TransportError> {
        tracing::debug!(path, "POST");
        let response = self
            .agent
            .post(&self.url(path))
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
            .send_json(body);
        read_json(path, response)
    }
}

impl EmployeeSource for BambooClient {
    fn fetch_field_list(&self) -> Result<Vec<FieldDescriptor>, TransportError> {
        self.get("v1/meta/fields")
    }

    fn fetch_report(&self, fields: &[String]) -> Result<CustomReport, TransportError> {
        self.post("v1/reports/custom", json!({ "fields": fields }))
    }

    fn fetch_directory(&self) -> Result<Vec<DirectoryRecord>, TransportError> {
        let response: DirectoryResponse = self.get("v1/employees/directory")?;
        Ok(response.employees)
    }
}

/// Build `{base_url}/{company_domain}/`.
pub fn company_url(base_url: &str, company_domain: &str) -> String {
    format!(
        "{}/{}/",
        base_url.trim_end_matches('/'),
        company_domain.trim_matches('/')
    )
}

/// `Basic` authorization header value for an API key.
fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:x", api_key)))
}

/// Decode a response body, classifying and logging failures.
fn read_json<T: DeserializeOwned>(
    path: &str,
    response: Result<ureq::Response, ureq::Error>,
) -> Result<T, TransportError> {
    let error = match response {
        Ok(resp) => match resp.into_json::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => TransportError::ParseError(e.to_string()),
        },
        Err(ureq::Error::Status(status, resp)) => {
            let message = resp.header(ERROR_HEADER).map(str::to_string);
            TransportError::from_status(status, message)
        }
        Err(e) => TransportError::Network(e.to_string()),
    };

    tracing::error!(path, status = ?error.status(), "{}", error);
    Err(error)
}
