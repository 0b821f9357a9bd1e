use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{Deal, DealDraft, DealId, ScoredDeal, Underwriting};
use super::guard::{UnderwritingGuard, UnderwritingViolation};
use super::repository::{DealRepository, RepositoryError};
use crate::config::UnderwritingLimits;
use crate::engine::{
    compute_amortization, compute_risk_score, validate_transition, AmortizationResult, Stage,
};

/// Service composing the underwriting guard, repository, and decision engine.
pub struct DealService<R> {
    guard: UnderwritingGuard,
    repository: Arc<R>,
}

static DEAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_deal_id() -> DealId {
    let id = DEAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DealId(format!("deal-{id:06}"))
}

impl<R> DealService<R>
where
    R: DealRepository + 'static,
{
    pub fn new(repository: Arc<R>, limits: UnderwritingLimits) -> Self {
        Self {
            guard: UnderwritingGuard::new(limits),
            repository,
        }
    }

    pub fn guard(&self) -> &UnderwritingGuard {
        &self.guard
    }

    /// Open a deal, scoring whatever underwriting data came with it.
    pub fn create(&self, draft: DealDraft) -> Result<ScoredDeal, DealServiceError> {
        self.guard.check_draft(&draft)?;

        let now = Utc::now();
        let mut deal = Deal {
            id: next_deal_id(),
            borrower_name: draft.borrower_name.trim().to_string(),
            stage: draft.stage.unwrap_or(Stage::Lead),
            underwriting: draft.underwriting,
            risk_rating: None,
            created_at: now,
            updated_at: now,
        };

        let risk = compute_risk_score(&deal.underwriting.risk_inputs());
        deal.apply_score(&risk);

        let deal = self.repository.insert(deal)?;
        info!(deal_id = %deal.id, stage = %deal.stage, score = risk.score, "deal opened");
        Ok(ScoredDeal { deal, risk })
    }

    pub fn get(&self, id: &DealId) -> Result<Deal, DealServiceError> {
        let deal = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(deal)
    }

    pub fn list(&self, stage: Option<Stage>) -> Result<Vec<Deal>, DealServiceError> {
        Ok(self.repository.list(stage)?)
    }

    /// Replace the underwriting snapshot and rescore.
    pub fn update_underwriting(
        &self,
        id: &DealId,
        underwriting: Underwriting,
    ) -> Result<ScoredDeal, DealServiceError> {
        self.guard.check_underwriting(&underwriting)?;

        let mut deal = self.get(id)?;
        deal.underwriting = underwriting;
        self.score_and_store(deal)
    }

    /// Recompute the rating from the stored underwriting data.
    pub fn rescore(&self, id: &DealId) -> Result<ScoredDeal, DealServiceError> {
        let deal = self.get(id)?;
        self.score_and_store(deal)
    }

    /// Move a deal to another pipeline stage if the lifecycle allows it.
    pub fn change_stage(&self, id: &DealId, to: Stage) -> Result<Deal, DealServiceError> {
        let mut deal = self.get(id)?;
        let from = deal.stage;

        let check = validate_transition(from, to);
        if !check.allowed {
            let reason = check
                .reason
                .unwrap_or_else(|| format!("cannot move from {} to {}", from.label(), to.label()));
            warn!(deal_id = %deal.id, %from, %to, %reason, "stage change rejected");
            return Err(DealServiceError::TransitionRejected { from, to, reason });
        }

        if from == to {
            return Ok(deal);
        }

        deal.stage = to;
        deal.updated_at = Utc::now();
        self.repository.update(deal.clone())?;
        info!(deal_id = %deal.id, %from, %to, "stage changed");
        Ok(deal)
    }

    /// Amortization schedule for the deal's requested amount, or `None` when
    /// the rate or term has not been captured yet.
    pub fn schedule(&self, id: &DealId) -> Result<Option<AmortizationResult>, DealServiceError> {
        let deal = self.get(id)?;
        let underwriting = &deal.underwriting;

        let (Some(rate), Some(term)) = (underwriting.interest_rate, underwriting.loan_term) else {
            debug!(deal_id = %deal.id, "schedule not applicable without rate and term");
            return Ok(None);
        };

        self.guard.check_schedule(underwriting.value, rate, term)?;
        Ok(Some(compute_amortization(underwriting.value, rate, term)))
    }

    fn score_and_store(&self, mut deal: Deal) -> Result<ScoredDeal, DealServiceError> {
        let risk = compute_risk_score(&deal.underwriting.risk_inputs());
        deal.apply_score(&risk);
        deal.updated_at = Utc::now();

        self.repository.update(deal.clone())?;
        info!(
            deal_id = %deal.id,
            score = risk.score,
            rating = risk.rating.as_str(),
            has_enough_data = risk.has_enough_data,
            "deal rescored"
        );
        Ok(ScoredDeal { deal, risk })
    }
}

/// Error raised by the deal service.
#[derive(Debug, thiserror::Error)]
pub enum DealServiceError {
    #[error(transparent)]
    Validation(#[from] UnderwritingViolation),
    #[error("{reason}")]
    TransitionRejected {
        from: Stage,
        to: Stage,
        reason: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
