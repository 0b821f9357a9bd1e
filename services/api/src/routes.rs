use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lending_crm::deals::{deal_router, DealRepository, DealService};
use lending_crm::engine::{
    compute_amortization, compute_risk_score, validate_transition, AmortizationResult,
    RiskInputs, RiskScoreResult, Stage, TransitionCheck, NON_TERMINAL_STAGES, TERMINAL_STAGES,
};
use lending_crm::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StageView {
    pub(crate) key: Stage,
    pub(crate) label: &'static str,
    pub(crate) terminal: bool,
    pub(crate) valid_targets: Vec<Stage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StagesResponse {
    pub(crate) stages: Vec<StageView>,
    pub(crate) terminal: Vec<Stage>,
    pub(crate) non_terminal: Vec<Stage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) from: Stage,
    pub(crate) to: Stage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AmortizationRequest {
    pub(crate) principal: f64,
    pub(crate) annual_rate: f64,
    pub(crate) term_months: u32,
}

pub(crate) fn with_engine_routes<R>(service: Arc<DealService<R>>) -> axum::Router
where
    R: DealRepository + 'static,
{
    deal_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/engine/stages", axum::routing::get(stages_endpoint))
        .route(
            "/api/v1/engine/transitions/validate",
            axum::routing::post(transition_endpoint),
        )
        .route(
            "/api/v1/engine/risk-score",
            axum::routing::post(risk_score_endpoint),
        )
        .route(
            "/api/v1/engine/amortization",
            axum::routing::post(amortization_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn stages_endpoint() -> Json<StagesResponse> {
    let stages = Stage::ordered()
        .into_iter()
        .map(|stage| StageView {
            key: stage,
            label: stage.label(),
            terminal: stage.is_terminal(),
            valid_targets: stage.valid_targets().iter().copied().collect(),
        })
        .collect();

    Json(StagesResponse {
        stages,
        terminal: TERMINAL_STAGES.to_vec(),
        non_terminal: NON_TERMINAL_STAGES.to_vec(),
    })
}

pub(crate) async fn transition_endpoint(
    Json(request): Json<TransitionRequest>,
) -> Json<TransitionCheck> {
    Json(validate_transition(request.from, request.to))
}

pub(crate) async fn risk_score_endpoint(Json(inputs): Json<RiskInputs>) -> Json<RiskScoreResult> {
    let result = compute_risk_score(&inputs);
    debug!(score = result.score, rating = result.rating.as_str(), "scored snapshot");
    Json(result)
}

pub(crate) async fn amortization_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<AmortizationRequest>,
) -> Result<Json<AmortizationResult>, AppError> {
    let AmortizationRequest {
        principal,
        annual_rate,
        term_months,
    } = request;

    state
        .guard
        .check_schedule(principal, annual_rate, term_months)?;

    Ok(Json(compute_amortization(principal, annual_rate, term_months)))
}
