//! Loan decision engine: stage lifecycle rules, underwriting risk scoring and
//! fixed-rate amortization. Everything here is pure and allocation-light so
//! handlers can call it inline on every request.

pub mod amortization;
pub mod export;
pub mod lifecycle;
pub mod risk;

pub use amortization::{compute_amortization, round2, AmortizationResult, AmortizationRow};
pub use export::write_schedule_csv;
pub use lifecycle::{
    valid_transitions, validate_transition, Stage, TransitionCheck, UnknownStage,
    NON_TERMINAL_STAGES, TERMINAL_STAGES,
};
pub use risk::{
    compute_risk_score, MetricScore, MetricTier, RiskBreakdown, RiskInputs, RiskRating,
    RiskScoreResult, RiskWeights, WEIGHTS,
};
