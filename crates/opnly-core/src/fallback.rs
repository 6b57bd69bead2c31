// ── Endpoint fallback resolution ──
//
// Which endpoint answers, and in what shape, depends on the appliance's
// firmware. Callers describe an ordered chain of (path, adapter) attempts;
// `resolve` walks it and returns the first decoded success. Individual
// failures are recorded, never raised.

use opnly_api::{Method, OpnsenseClient};
use serde_json::Value;
use tracing::debug;

type Adapter<T> = Box<dyn Fn(Value) -> Option<T> + Send + Sync>;

/// One candidate endpoint plus the adapter that decodes its response.
pub struct EndpointAttempt<T> {
    pub path: String,
    pub query: Vec<(String, String)>,
    adapter: Adapter<T>,
}

impl<T> EndpointAttempt<T> {
    /// `adapter` returns `None` when the body is not the shape it expects,
    /// which counts as a failed attempt.
    pub fn new(
        path: impl Into<String>,
        adapter: impl Fn(Value) -> Option<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            adapter: Box::new(adapter),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn decode(&self, body: Value) -> Option<T> {
        (self.adapter)(body)
    }
}

impl<T> std::fmt::Debug for EndpointAttempt<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointAttempt")
            .field("path", &self.path)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Why a single attempt was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of walking a fallback chain.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    pub value: T,
    /// Path of the endpoint that answered; `None` when the chain was exhausted.
    pub answered_by: Option<String>,
    pub failures: Vec<AttemptFailure>,
}

impl<T> Resolution<T> {
    pub fn succeeded(&self) -> bool {
        self.answered_by.is_some()
    }

    pub fn into_parts(self) -> (T, bool) {
        let succeeded = self.succeeded();
        (self.value, succeeded)
    }
}

/// Try each attempt in order; the first decoded 2xx response wins.
///
/// Attempts run sequentially, never concurrently. When every attempt fails
/// the caller's `default` comes back with `answered_by == None`.
pub async fn resolve<T>(
    client: &OpnsenseClient,
    attempts: &[EndpointAttempt<T>],
    default: T,
) -> Resolution<T> {
    let mut failures = Vec::new();

    for attempt in attempts {
        let reason = match client
            .request(Method::GET, &attempt.path, &attempt.query, None)
            .await
        {
            Ok(resp) if resp.is_success() => match attempt.decode(resp.body) {
                Some(value) => {
                    debug!(path = %attempt.path, skipped = failures.len(), "endpoint answered");
                    return Resolution {
                        value,
                        answered_by: Some(attempt.path.clone()),
                        failures,
                    };
                }
                None => "unexpected response shape".to_string(),
            },
            Ok(resp) => format!("HTTP {}", resp.status),
            Err(e) => e.to_string(),
        };

        debug!(path = %attempt.path, %reason, "endpoint attempt failed");
        failures.push(AttemptFailure {
            path: attempt.path.clone(),
            reason,
        });
    }

    Resolution {
        value: default,
        answered_by: None,
        failures,
    }
}

/// Adapter accepting any JSON object as-is.
pub fn json_object(body: Value) -> Option<Value> {
    body.is_object().then_some(body)
}
