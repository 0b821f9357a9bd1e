use serde::{Deserialize, Serialize};

/// Underwriting snapshot fed to the scorer. Only `value` is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInputs {
    #[serde(default)]
    pub credit_score: Option<u16>,
    #[serde(default)]
    pub ltv_ratio: Option<f64>,
    #[serde(default)]
    pub dti_ratio: Option<f64>,
    #[serde(default)]
    pub loan_term: Option<u32>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub approved_amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Unscored,
}

impl MetricTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            Self::Excellent
        } else if score >= 70 {
            Self::Good
        } else if score >= 45 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Unscored => "Not provided",
        }
    }
}

/// Letter grade, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskRating {
    A,
    B,
    C,
    D,
}

impl RiskRating {
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            Self::A
        } else if score >= 55 {
            Self::B
        } else if score >= 35 {
            Self::C
        } else {
            Self::D
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub value: Option<f64>,
    pub score: u8,
    pub tier: MetricTier,
    pub label: String,
}

impl MetricScore {
    fn scored(value: f64, score: u8) -> Self {
        let tier = MetricTier::from_score(score);
        Self {
            value: Some(value),
            score,
            tier,
            label: tier.label().to_string(),
        }
    }

    fn unscored() -> Self {
        Self {
            value: None,
            score: 0,
            tier: MetricTier::Unscored,
            label: MetricTier::Unscored.label().to_string(),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.tier != MetricTier::Unscored
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub credit_score: MetricScore,
    pub ltv: MetricScore,
    pub dti: MetricScore,
    pub loan_term: MetricScore,
    pub loan_amount: MetricScore,
}

impl RiskBreakdown {
    fn weighted(&self) -> [(&MetricScore, f64); 5] {
        [
            (&self.credit_score, WEIGHTS.credit_score),
            (&self.ltv, WEIGHTS.ltv),
            (&self.dti, WEIGHTS.dti),
            (&self.loan_term, WEIGHTS.loan_term),
            (&self.loan_amount, WEIGHTS.loan_amount),
        ]
    }

    pub fn scored_count(&self) -> usize {
        self.weighted()
            .iter()
            .filter(|(metric, _)| metric.is_scored())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreResult {
    pub score: u8,
    pub rating: RiskRating,
    pub breakdown: RiskBreakdown,
    pub has_enough_data: bool,
}

/// Share of the composite each metric carries before renormalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskWeights {
    pub credit_score: f64,
    pub ltv: f64,
    pub dti: f64,
    pub loan_term: f64,
    pub loan_amount: f64,
}

pub const WEIGHTS: RiskWeights = RiskWeights {
    credit_score: 0.35,
    ltv: 0.25,
    dti: 0.25,
    loan_term: 0.10,
    loan_amount: 0.05,
};

const MIN_SCORED_METRICS: usize = 2;

/// Score an underwriting snapshot. Missing inputs are left unscored and their
/// weight is dropped from the composite.
pub fn compute_risk_score(inputs: &RiskInputs) -> RiskScoreResult {
    let breakdown = RiskBreakdown {
        credit_score: score_credit(inputs.credit_score),
        ltv: score_ltv(inputs.ltv_ratio),
        dti: score_dti(inputs.dti_ratio),
        loan_term: score_loan_term(inputs.loan_term),
        loan_amount: score_loan_amount(inputs.value, inputs.approved_amount),
    };

    let (weighted_sum, weight_used) = breakdown
        .weighted()
        .iter()
        .filter(|(metric, _)| metric.is_scored())
        .fold((0.0, 0.0), |(sum, used), (metric, weight)| {
            (sum + f64::from(metric.score) * weight, used + weight)
        });

    let score = if weight_used > 0.0 {
        to_score(weighted_sum / weight_used)
    } else {
        0
    };

    RiskScoreResult {
        score,
        rating: RiskRating::from_score(score),
        has_enough_data: breakdown.scored_count() >= MIN_SCORED_METRICS,
        breakdown,
    }
}

/// Linear interpolation with `x` clamped to `[x0, x1]`.
fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + t * (y1 - y0)
}

fn to_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

fn score_credit(credit_score: Option<u16>) -> MetricScore {
    let Some(credit_score) = credit_score else {
        return MetricScore::unscored();
    };
    let x = f64::from(credit_score);
    let raw = if x >= 750.0 {
        lerp(x, 750.0, 850.0, 90.0, 100.0)
    } else if x >= 700.0 {
        lerp(x, 700.0, 749.0, 70.0, 89.0)
    } else if x >= 650.0 {
        lerp(x, 650.0, 699.0, 45.0, 69.0)
    } else {
        lerp(x, 300.0, 649.0, 0.0, 44.0)
    };
    MetricScore::scored(x, to_score(raw))
}

fn score_ltv(ltv_ratio: Option<f64>) -> MetricScore {
    let Some(x) = ltv_ratio else {
        return MetricScore::unscored();
    };
    let raw = if x < 60.0 {
        lerp(x, 0.0, 60.0, 100.0, 91.0)
    } else if x < 75.0 {
        lerp(x, 60.0, 75.0, 89.0, 70.0)
    } else if x < 85.0 {
        lerp(x, 75.0, 85.0, 69.0, 45.0)
    } else {
        lerp(x, 85.0, 100.0, 44.0, 0.0)
    };
    MetricScore::scored(x, to_score(raw))
}

fn score_dti(dti_ratio: Option<f64>) -> MetricScore {
    let Some(x) = dti_ratio else {
        return MetricScore::unscored();
    };
    let raw = if x < 28.0 {
        lerp(x, 0.0, 28.0, 100.0, 91.0)
    } else if x < 36.0 {
        lerp(x, 28.0, 36.0, 89.0, 70.0)
    } else if x < 43.0 {
        lerp(x, 36.0, 43.0, 69.0, 45.0)
    } else {
        lerp(x, 43.0, 80.0, 44.0, 0.0)
    };
    MetricScore::scored(x, to_score(raw))
}

fn score_loan_term(loan_term: Option<u32>) -> MetricScore {
    let Some(months) = loan_term else {
        return MetricScore::unscored();
    };
    let x = f64::from(months);
    let raw = match months {
        0..=12 => 100.0,
        13..=24 => lerp(x, 12.0, 24.0, 100.0, 85.0),
        25..=36 => lerp(x, 24.0, 36.0, 85.0, 70.0),
        37..=60 => lerp(x, 36.0, 60.0, 70.0, 55.0),
        61..=120 => lerp(x, 60.0, 120.0, 55.0, 35.0),
        _ => lerp(x, 120.0, 360.0, 35.0, 5.0),
    };
    MetricScore::scored(x, to_score(raw))
}

/// Approval ratio metric. Without an approval decision the metric is neutral
/// rather than unscored, so it always counts toward the composite.
fn score_loan_amount(value: f64, approved_amount: Option<f64>) -> MetricScore {
    let approved = match approved_amount {
        Some(approved) if value != 0.0 => approved,
        _ => {
            return MetricScore {
                value: None,
                score: 50,
                tier: MetricTier::Fair,
                label: "Pending approval".to_string(),
            }
        }
    };

    let ratio = approved / value;
    let raw = if ratio >= 0.95 {
        lerp(ratio, 0.95, 1.0, 90.0, 100.0)
    } else if ratio >= 0.80 {
        lerp(ratio, 0.80, 0.95, 70.0, 89.0)
    } else if ratio >= 0.60 {
        lerp(ratio, 0.60, 0.80, 45.0, 69.0)
    } else {
        lerp(ratio, 0.0, 0.60, 0.0, 44.0)
    };
    MetricScore::scored(ratio, to_score(raw))
}
