use std::time::Duration;

use dairy_cms_core::store::{StoreError, NO_ROWS_CODE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client carrying the project URL and API key.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request authorized with the project API key.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_as(method, path, &self.api_key)
    }

    /// Request authorized with a user's access token.
    pub fn request_as(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }
}

/// Error payloads differ between the table, storage and auth APIs; this
/// accepts all of their shapes.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
}

impl RemoteFailure {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let code = body.code.map(|code| match code {
            serde_json::Value::String(code) => code,
            other => other.to_string(),
        });
        let message = body
            .message
            .or(body.msg)
            .or(body.error_description)
            .or(body.error)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });
        Self {
            status,
            code,
            message,
        }
    }
}

impl From<RemoteFailure> for StoreError {
    fn from(failure: RemoteFailure) -> Self {
        match failure.code {
            Some(code) if code == NO_ROWS_CODE => StoreError::NoRows,
            code => StoreError::Remote {
                code: code.unwrap_or_else(|| failure.status.as_u16().to_string()),
                message: failure.message,
            },
        }
    }
}

pub(crate) fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}
