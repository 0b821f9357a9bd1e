use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{RiskInputs, RiskRating, RiskScoreResult, Stage};

/// Identifier wrapper for deals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DealId(pub String);

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Underwriting fields the engine reads. Percentages are whole numbers (`72.5` means 72.5%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underwriting {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub approved_amount: Option<f64>,
    #[serde(default)]
    pub credit_score: Option<u16>,
    #[serde(default)]
    pub ltv_ratio: Option<f64>,
    #[serde(default)]
    pub dti_ratio: Option<f64>,
    #[serde(default)]
    pub loan_term: Option<u32>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

impl Underwriting {
    pub fn risk_inputs(&self) -> RiskInputs {
        RiskInputs {
            credit_score: self.credit_score,
            ltv_ratio: self.ltv_ratio,
            dti_ratio: self.dti_ratio,
            loan_term: self.loan_term,
            value: self.value,
            approved_amount: self.approved_amount,
        }
    }
}

/// Payload accepted when a deal is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealDraft {
    pub borrower_name: String,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub underwriting: Underwriting,
}

/// Stored deal as the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub borrower_name: String,
    pub stage: Stage,
    pub underwriting: Underwriting,
    pub risk_rating: Option<RiskRating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// Keep the stored rating in step with a fresh score. Sparse scores leave
    /// the previous rating untouched.
    pub(crate) fn apply_score(&mut self, result: &RiskScoreResult) {
        if result.has_enough_data {
            self.risk_rating = Some(result.rating);
        }
    }
}

/// Deal plus the score computed while handling the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDeal {
    pub deal: Deal,
    pub risk: RiskScoreResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChangeRequest {
    pub stage: Stage,
}
