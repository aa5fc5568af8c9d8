use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
pub struct HelloParams {
    /// Seconds to sleep before touching the cache.
    #[serde(default)]
    pub sleep: i64,
    #[serde(default)]
    pub log: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Hello requests served so far, keyed by endpoint tag.
#[derive(Serialize)]
pub struct MetricsResponse {
    pub hello_requests: BTreeMap<&'static str, u64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
