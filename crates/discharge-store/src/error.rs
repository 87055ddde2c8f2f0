use discharge_core::DischargeError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("case not found: {0}")]
    CaseNotFound(String),

    #[error("no rows matched filter for category {0}")]
    CacheMiss(String),
}

impl From<StoreError> for DischargeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CaseNotFound(id) => DischargeError::NotFound(id),
            StoreError::CacheMiss(category) => DischargeError::CacheMiss { category },
            StoreError::Database(e) => DischargeError::Internal(e.to_string()),
        }
    }
}
