use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::UnderwritingLimits;
use crate::deals::domain::{Deal, DealDraft, DealId, Underwriting};
use crate::deals::repository::{DealRepository, RepositoryError};
use crate::deals::{deal_router, DealService};
use crate::engine::Stage;

pub(super) fn strong_underwriting() -> Underwriting {
    Underwriting {
        value: 100_000.0,
        approved_amount: Some(98_000.0),
        credit_score: Some(800),
        ltv_ratio: Some(50.0),
        dti_ratio: Some(20.0),
        loan_term: Some(12),
        interest_rate: Some(6.0),
    }
}

pub(super) fn weak_underwriting() -> Underwriting {
    Underwriting {
        value: 100_000.0,
        approved_amount: Some(30_000.0),
        credit_score: Some(500),
        ltv_ratio: Some(95.0),
        dti_ratio: Some(55.0),
        loan_term: Some(300),
        interest_rate: Some(11.5),
    }
}

pub(super) fn draft(underwriting: Underwriting) -> DealDraft {
    DealDraft {
        borrower_name: "Harbor Street Bakery LLC".to_string(),
        stage: None,
        underwriting,
    }
}

pub(super) fn sparse_draft() -> DealDraft {
    draft(Underwriting {
        value: 250_000.0,
        ..Underwriting::default()
    })
}

pub(super) fn build_service() -> (DealService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = DealService::new(repository.clone(), UnderwritingLimits::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<DealId, Deal>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &DealId) -> Deal {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("deal stored")
    }
}

impl DealRepository for MemoryRepository {
    fn insert(&self, deal: Deal) -> Result<Deal, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&deal.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(deal.id.clone(), deal.clone());
        Ok(deal)
    }

    fn update(&self, deal: Deal) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(deal.id.clone(), deal);
        Ok(())
    }

    fn fetch(&self, id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, stage: Option<Stage>) -> Result<Vec<Deal>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut deals: Vec<Deal> = guard
            .values()
            .filter(|deal| stage.map_or(true, |stage| deal.stage == stage))
            .cloned()
            .collect();
        deals.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(deals)
    }
}

pub(super) struct ConflictRepository;

impl DealRepository for ConflictRepository {
    fn insert(&self, _deal: Deal) -> Result<Deal, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _deal: Deal) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _stage: Option<Stage>) -> Result<Vec<Deal>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl DealRepository for UnavailableRepository {
    fn insert(&self, _deal: Deal) -> Result<Deal, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _deal: Deal) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &DealId) -> Result<Option<Deal>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _stage: Option<Stage>) -> Result<Vec<Deal>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn deal_router_with_service(service: DealService<MemoryRepository>) -> axum::Router {
    deal_router(Arc::new(service))
}
