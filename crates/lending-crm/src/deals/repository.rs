use super::domain::{Deal, DealId};
use crate::engine::Stage;

/// Storage abstraction so the service can be exercised without a database.
pub trait DealRepository: Send + Sync {
    fn insert(&self, deal: Deal) -> Result<Deal, RepositoryError>;
    fn update(&self, deal: Deal) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError>;
    fn list(&self, stage: Option<Stage>) -> Result<Vec<Deal>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
