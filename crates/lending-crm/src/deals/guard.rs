use super::domain::{DealDraft, Underwriting};
use crate::config::UnderwritingLimits;

const MIN_CREDIT_SCORE: u16 = 300;
const MAX_CREDIT_SCORE: u16 = 850;

/// Validation errors raised before underwriting data reaches the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnderwritingViolation {
    #[error("borrower name is required")]
    MissingBorrowerName,
    #[error("{field} must be a finite, non-negative number (found {found})")]
    InvalidAmount { field: &'static str, found: f64 },
    #[error("credit score must be between 300 and 850 (found {0})")]
    CreditScoreOutOfRange(u16),
    #[error("loan term must be between 1 and {max} months (found {found})")]
    TermOutOfRange { found: u32, max: u32 },
}

/// Guard enforcing the caller-side contract of the decision engine.
#[derive(Debug, Clone, Default)]
pub struct UnderwritingGuard {
    limits: UnderwritingLimits,
}

impl UnderwritingGuard {
    pub fn new(limits: UnderwritingLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> UnderwritingLimits {
        self.limits
    }

    pub fn check_draft(&self, draft: &DealDraft) -> Result<(), UnderwritingViolation> {
        if draft.borrower_name.trim().is_empty() {
            return Err(UnderwritingViolation::MissingBorrowerName);
        }
        self.check_underwriting(&draft.underwriting)
    }

    pub fn check_underwriting(
        &self,
        underwriting: &Underwriting,
    ) -> Result<(), UnderwritingViolation> {
        check_amount("value", underwriting.value)?;

        let optional_amounts = [
            ("approved_amount", underwriting.approved_amount),
            ("ltv_ratio", underwriting.ltv_ratio),
            ("dti_ratio", underwriting.dti_ratio),
            ("interest_rate", underwriting.interest_rate),
        ];
        for (field, amount) in optional_amounts {
            if let Some(amount) = amount {
                check_amount(field, amount)?;
            }
        }

        if let Some(score) = underwriting.credit_score {
            if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score) {
                return Err(UnderwritingViolation::CreditScoreOutOfRange(score));
            }
        }

        if let Some(months) = underwriting.loan_term {
            self.check_term(months)?;
        }

        Ok(())
    }

    /// Preconditions of `compute_amortization`.
    pub fn check_schedule(
        &self,
        principal: f64,
        annual_rate_percent: f64,
        term_months: u32,
    ) -> Result<(), UnderwritingViolation> {
        check_amount("principal", principal)?;
        check_amount("annual_rate", annual_rate_percent)?;
        self.check_term(term_months)
    }

    fn check_term(&self, months: u32) -> Result<(), UnderwritingViolation> {
        if months == 0 || months > self.limits.max_term_months {
            return Err(UnderwritingViolation::TermOutOfRange {
                found: months,
                max: self.limits.max_term_months,
            });
        }
        Ok(())
    }
}

fn check_amount(field: &'static str, amount: f64) -> Result<(), UnderwritingViolation> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(UnderwritingViolation::InvalidAmount {
            field,
            found: amount,
        })
    }
}
