use lending_crm::deals::{Deal, DealId, DealRepository, RepositoryError, UnderwritingGuard};
use lending_crm::engine::Stage;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) guard: Arc<UnderwritingGuard>,
}

/// Process-local deal store used by the demo server and CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDealRepository {
    records: Arc<Mutex<HashMap<DealId, Deal>>>,
}

impl DealRepository for InMemoryDealRepository {
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
        if guard.contains_key(&deal.id) {
            guard.insert(deal.id.clone(), deal);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
        deals.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(deals)
    }
}

pub(crate) fn parse_stage(raw: &str) -> Result<Stage, String> {
    raw.parse::<Stage>().map_err(|err| err.to_string())
}
