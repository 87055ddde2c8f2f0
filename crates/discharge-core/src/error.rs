//! Error taxonomy (spec §7). Per-crate errors convert into this at the
//! coordinator/HTTP boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DischargeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("case not found: {0}")]
    NotFound(String),

    #[error("no {category} rows matched the filter")]
    CacheMiss { category: String },

    #[error("{upstream} error: {detail}")]
    Upstream { upstream: String, detail: String },

    #[error("{upstream} timed out after {deadline_secs}s")]
    Timeout { upstream: String, deadline_secs: u64 },

    #[error("{upstream} quota exceeded")]
    QuotaExceeded { upstream: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl DischargeError {
    /// Whether this error should be logged-and-downgraded inside a running
    /// workflow rather than aborting it outright (§7 propagation policy).
    pub fn is_recoverable_in_workflow(&self) -> bool {
        matches!(
            self,
            Self::CacheMiss { .. } | Self::Upstream { .. } | Self::Timeout { .. }
        )
    }

    /// HTTP status the façade should map this to when it does surface.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
            _ => 200,
        }
    }
}
