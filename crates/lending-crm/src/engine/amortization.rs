use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub rows: Vec<AmortizationRow>,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

/// Round a currency amount to cents.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Level monthly payment for a fixed-rate loan, or a straight split when the
/// rate is zero.
pub fn monthly_payment(principal: f64, monthly_rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months);
    if monthly_rate == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + monthly_rate).powf(n);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Build a month-by-month fixed-rate schedule.
///
/// Callers must pass `principal >= 0`, `annual_rate_percent >= 0` and
/// `term_months >= 1`; these are not re-checked here.
///
/// Row amounts are rounded to cents as each row is built while the running
/// balance stays unrounded. The final row absorbs any drift so the schedule
/// always ends at exactly zero.
pub fn compute_amortization(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
) -> AmortizationResult {
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let payment = monthly_payment(principal, monthly_rate, term_months);

    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let interest = balance * monthly_rate;
        let (row_payment, principal_paid) = if month == term_months {
            (balance + interest, balance)
        } else {
            (payment, payment - interest)
        };

        balance -= principal_paid;
        if month == term_months {
            balance = 0.0;
        }

        rows.push(AmortizationRow {
            month,
            payment: round2(row_payment),
            principal: round2(principal_paid),
            interest: round2(interest),
            balance: round2(balance),
        });
    }

    let total_paid = round2(rows.iter().map(|row| row.payment).sum());

    AmortizationResult {
        rows,
        monthly_payment: round2(payment),
        total_interest: round2(total_paid - principal),
        total_paid,
    }
}
