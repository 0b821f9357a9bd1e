use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{DealDraft, DealId, StageChangeRequest, Underwriting};
use super::repository::{DealRepository, RepositoryError};
use super::service::{DealService, DealServiceError};
use crate::engine::{AmortizationResult, Stage};

/// Router builder exposing the deal pipeline endpoints.
pub fn deal_router<R>(service: Arc<DealService<R>>) -> Router
where
    R: DealRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/deals",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/deals/:deal_id", get(get_handler::<R>))
        .route(
            "/api/v1/deals/:deal_id/underwriting",
            put(underwriting_handler::<R>),
        )
        .route("/api/v1/deals/:deal_id/rescore", post(rescore_handler::<R>))
        .route("/api/v1/deals/:deal_id/stage", post(stage_handler::<R>))
        .route(
            "/api/v1/deals/:deal_id/amortization",
            get(amortization_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) stage: Option<Stage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleView {
    pub(crate) deal_id: DealId,
    pub(crate) applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) schedule: Option<AmortizationResult>,
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    axum::Json(draft): axum::Json<DealDraft>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.create(draft) {
        Ok(scored) => (StatusCode::CREATED, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.list(query.stage) {
        Ok(deals) => (StatusCode::OK, axum::Json(deals)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.get(&DealId(deal_id)) {
        Ok(deal) => (StatusCode::OK, axum::Json(deal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn underwriting_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Path(deal_id): Path<String>,
    axum::Json(underwriting): axum::Json<Underwriting>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.update_underwriting(&DealId(deal_id), underwriting) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rescore_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.rescore(&DealId(deal_id)) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stage_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Path(deal_id): Path<String>,
    axum::Json(request): axum::Json<StageChangeRequest>,
) -> Response
where
    R: DealRepository + 'static,
{
    match service.change_stage(&DealId(deal_id), request.stage) {
        Ok(deal) => (StatusCode::OK, axum::Json(deal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn amortization_handler<R>(
    State(service): State<Arc<DealService<R>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
{
    let deal_id = DealId(deal_id);
    match service.schedule(&deal_id) {
        Ok(schedule) => {
            let view = ScheduleView {
                deal_id,
                applicable: schedule.is_some(),
                schedule,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: DealServiceError) -> Response {
    let status = match &error {
        DealServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DealServiceError::TransitionRejected { .. } => StatusCode::CONFLICT,
        DealServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DealServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DealServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &error {
        DealServiceError::TransitionRejected { from, to, reason } => json!({
            "error": reason,
            "from": from,
            "to": to,
        }),
        other => json!({ "error": other.to_string() }),
    };

    (status, axum::Json(payload)).into_response()
}
