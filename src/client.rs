//! Echoes API client
//!
//! Blocking HTTP calls against a running Echoes backend:
//! - `POST /api/echo` with a bearer token
//! - `GET /health` liveness probe

use crate::credentials::bearer_value;
use crate::error::{ServiceError, ServiceResult, UNKNOWN_ERROR};
use crate::metadata::user_agent;
use crate::types::{EchoReply, EchoRequest, ErrorBody};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const ECHO_PATH: &str = "/api/echo";
pub const HEALTH_PATH: &str = "/health";

/// Echoes API client
#[derive(Debug, Clone)]
pub struct EchoClient {
    base_url: String,
}

impl EchoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn echo_url(&self) -> String {
        format!("{}{}", self.base_url, ECHO_PATH)
    }

    /// Send `user_text` to the echo endpoint.
    ///
    /// A missing token is still sent, as `Bearer null`; the backend decides
    /// what to do with it.
    pub fn send_echo(&self, user_text: &str, token: Option<&str>) -> ServiceResult<EchoReply> {
        let url = self.echo_url();
        let body = serde_json::to_string(&EchoRequest::new(user_text))?;

        let result = ureq::post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &bearer_value(token))
            .set("User-Agent", &user_agent())
            .send_string(&body);

        match result {
            Ok(response) => {
                let status = response.status();
                let text = response.into_string().map_err(|e| {
                    ServiceError::Network(format!("Failed to read response: {}", e))
                })?;
                if !(200..300).contains(&status) {
                    return Err(http_failure(status, &text));
                }
                Ok(serde_json::from_str(&text)?)
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(http_failure(status, &text))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ServiceError::Network(transport.to_string()))
            }
        }
    }

    /// Probe the backend's health endpoint and return its body.
    pub fn health(&self) -> ServiceResult<String> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);

        let response = ureq::get(&url)
            .set("User-Agent", &user_agent())
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => {
                    let text = response.into_string().unwrap_or_default();
                    http_failure(status, &text)
                }
                ureq::Error::Transport(transport) => ServiceError::Network(transport.to_string()),
            })?;

        let text = response
            .into_string()
            .map_err(|e| ServiceError::Network(format!("Failed to read response: {}", e)))?;
        Ok(text.trim().to_string())
    }
}

fn http_failure(status: u16, body: &str) -> ServiceError {
    ServiceError::Http {
        status,
        message: ErrorBody::message_from(body).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
    }
}

/// Build a client from a connection string like `localhost:8080` or
/// `https://echoes.example.com/`.
pub fn create_echo_client(connection_string: &str) -> ServiceResult<EchoClient> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Config("base URL cannot be empty".to_string()));
    }

    let base_url = if let Some((scheme, _)) = trimmed.split_once("://") {
        if scheme != "http" && scheme != "https" {
            return Err(ServiceError::Config(format!(
                "Unsupported scheme '{scheme}' in base URL '{trimmed}'"
            )));
        }
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    Ok(EchoClient::new(&base_url))
}
