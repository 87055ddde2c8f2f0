use discharge_core::DischargeError;
use discharge_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("browser fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScrapeError> for DischargeError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Fetch(detail) => DischargeError::Upstream {
                upstream: "scrape".to_string(),
                detail,
            },
            ScrapeError::Store(e) => e.into(),
        }
    }
}
