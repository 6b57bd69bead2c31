// OPNsense API HTTP client
//
// Wraps `reqwest::Client` with OPNsense URL construction, basic-auth
// credentials, and lenient JSON decoding. Endpoint helpers (filter rules,
// apply) live in separate files as inherent methods so this module stays
// focused on transport mechanics.

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// OPNsense error bodies look like `{"errorMessage": "...", "errorTitle": "..."}`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "errorMessage", alias = "message")]
    error_message: Option<String>,
}

/// A decoded response: HTTP status plus the untyped JSON body.
///
/// An empty body decodes to `Value::Null`; a non-JSON body on an error
/// status is kept as `Value::String` so it can still be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into an [`Error`], returning the body otherwise.
    pub fn into_success(self) -> Result<Value, Error> {
        if self.is_success() {
            return Ok(self.body);
        }

        let message = error_message(&self.body).unwrap_or_else(|| format!("HTTP {}", self.status));
        if matches!(self.status, 401 | 403) {
            return Err(Error::Authentication { message });
        }
        Err(Error::Api {
            status: self.status,
            message,
        })
    }
}

fn error_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.is_empty() => Some(s.chars().take(200).collect()),
        Value::Object(_) => serde_json::from_value::<ErrorBody>(body.clone())
            .ok()
            .and_then(|e| e.error_message),
        _ => None,
    }
}

/// Raw HTTP client for the OPNsense REST API.
///
/// Every endpoint lives under `{base}/api/{module}/{controller}/{command}`.
/// Methods return the decoded JSON alongside its status; callers decide
/// whether a non-success status is fatal or just means "try the next
/// endpoint".
pub struct OpnsenseClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl OpnsenseClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the appliance root (e.g. `https://192.168.1.1`).
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue one request and decode the body.
    ///
    /// Only transport failures and undecodable success bodies are errors;
    /// the status is returned as-is in [`ApiResponse`].
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.api_url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = self.credentials.apply(builder).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        trace!(status = status.as_u16(), bytes = text.len(), "response received");

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(v) => v,
                Err(_) if !status.is_success() => Value::String(text),
                Err(e) => {
                    let preview: String = text.chars().take(200).collect();
                    return Err(Error::Deserialization {
                        message: format!("{e} (body preview: {preview:?})"),
                        body: text,
                    });
                }
            }
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// POST a JSON body and return the response body, failing on non-2xx.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.request(reqwest::Method::POST, path, &[], Some(body))
            .await?
            .into_success()
    }
}
