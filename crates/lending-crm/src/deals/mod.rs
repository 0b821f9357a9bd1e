//! Deal pipeline: the integration layer that runs the decision engine
//! whenever a deal is opened, re-underwritten, rescored or moved between
//! stages. Storage stays behind [`DealRepository`].

pub mod domain;
pub mod guard;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Deal, DealDraft, DealId, ScoredDeal, StageChangeRequest, Underwriting};
pub use guard::{UnderwritingGuard, UnderwritingViolation};
pub use repository::{DealRepository, RepositoryError};
pub use router::deal_router;
pub use service::{DealService, DealServiceError};
