use serde_json::Value;
use thiserror::Error;

/// Failure talking to the CRM.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("failed to reach CRM: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CRM error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid CRM response: {0}")]
    Decode(String),
    #[error("invalid CRM URL: {0}")]
    InvalidUrl(String),
}

impl CrmError {
    /// Upstream payload for reporting back to the webhook caller.
    ///
    /// A JSON error body is passed through as JSON; anything else becomes a string.
    pub fn payload(&self) -> Value {
        match self {
            CrmError::Status { body, .. } => serde_json::from_str::<Value>(body)
                .ok()
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::String(body.clone())),
            other => Value::String(other.to_string()),
        }
    }
}

/// Why a webhook could not be synced.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Email required from Jobber webhook")]
    MissingEmail,
    #[error(transparent)]
    Upstream(#[from] CrmError),
}
