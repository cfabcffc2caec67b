use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// A provider-side or domain-level failure, carrying the status we hand back.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        Self { status, message: message.into(), details }
    }

    pub fn no_data() -> Self {
        Self::new(404, "No forecast data found for the given coordinates.", None)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("{0}")]
    Api(ApiError),
    #[error("StormGlass API key is not configured")]
    MissingApiKey,
    #[error("Failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ApiError> for ForecastError {
    fn from(err: ApiError) -> Self {
        ForecastError::Api(err)
    }
}

/// `errors` member of a provider error body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProviderErrorDetail {
    Fields(BTreeMap<String, Vec<String>>),
    Message(String),
}

impl From<ProviderErrorDetail> for Value {
    fn from(detail: ProviderErrorDetail) -> Self {
        match detail {
            ProviderErrorDetail::Fields(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
            ProviderErrorDetail::Message(msg) => Value::String(msg),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub errors: Option<ProviderErrorDetail>,
}

impl ProviderErrorBody {
    /// Extract the detail payload from a non-success response body.
    ///
    /// Prefers the `errors` member; otherwise the whole JSON document, and for
    /// bodies that are not JSON at all, the (truncated) text itself.
    pub fn details_from_body(body: &str) -> Value {
        if let Ok(ProviderErrorBody { errors: Some(detail), .. }) = serde_json::from_str::<ProviderErrorBody>(body) {
            return detail.into();
        }

        serde_json::from_str::<Value>(body)
            .unwrap_or_else(|_| Value::String(truncate_body(body)))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
