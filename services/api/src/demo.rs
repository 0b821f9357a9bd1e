use crate::infra::{parse_stage, InMemoryDealRepository};
use clap::Args;
use lending_crm::config::{AppConfig, UnderwritingLimits};
use lending_crm::deals::{
    DealDraft, DealService, DealServiceError, Underwriting, UnderwritingGuard,
};
use lending_crm::engine::{
    compute_amortization, compute_risk_score, write_schedule_csv, AmortizationResult,
    MetricScore, RiskInputs, RiskScoreResult, Stage,
};
use lending_crm::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Borrower credit score (300-850)
    #[arg(long)]
    pub(crate) credit_score: Option<u16>,
    /// Loan-to-value ratio as a whole-number percentage
    #[arg(long)]
    pub(crate) ltv: Option<f64>,
    /// Debt-to-income ratio as a whole-number percentage
    #[arg(long)]
    pub(crate) dti: Option<f64>,
    /// Loan term in months
    #[arg(long)]
    pub(crate) term: Option<u32>,
    /// Requested loan amount
    #[arg(long, default_value_t = 0.0)]
    pub(crate) value: f64,
    /// Approved loan amount, if underwriting has signed off
    #[arg(long)]
    pub(crate) approved_amount: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ScheduleArgs {
    /// Principal to amortize
    #[arg(long)]
    pub(crate) principal: f64,
    /// Annual interest rate as a percentage (6.5 means 6.5%)
    #[arg(long)]
    pub(crate) rate: f64,
    /// Term in months
    #[arg(long)]
    pub(crate) term: u32,
    /// Emit the schedule as CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Borrower name used for the sample deal
    #[arg(long)]
    pub(crate) borrower: Option<String>,
    /// Stage the sample deal finishes in
    #[arg(long, value_parser = parse_stage)]
    pub(crate) final_stage: Option<Stage>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        credit_score,
        ltv,
        dti,
        term,
        value,
        approved_amount,
    } = args;

    let underwriting = Underwriting {
        value,
        approved_amount,
        credit_score,
        ltv_ratio: ltv,
        dti_ratio: dti,
        loan_term: term,
        interest_rate: None,
    };
    UnderwritingGuard::new(configured_limits()).check_underwriting(&underwriting)?;

    let inputs: RiskInputs = underwriting.risk_inputs();
    render_score(&compute_risk_score(&inputs));
    Ok(())
}

pub(crate) fn run_schedule(args: ScheduleArgs) -> Result<(), AppError> {
    let ScheduleArgs {
        principal,
        rate,
        term,
        csv,
    } = args;

    UnderwritingGuard::new(configured_limits()).check_schedule(principal, rate, term)?;
    let schedule = compute_amortization(principal, rate, term);

    if csv {
        let stdout = std::io::stdout();
        write_schedule_csv(&schedule, stdout.lock())?;
    } else {
        render_schedule(&schedule);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        borrower,
        final_stage,
    } = args;
    let final_stage = final_stage.unwrap_or(Stage::Active);

    println!("Loan decision engine demo");
    let repository = Arc::new(InMemoryDealRepository::default());
    let service = DealService::new(repository, configured_limits());

    let opened = service.create(DealDraft {
        borrower_name: borrower.unwrap_or_else(|| "Harbor Street Bakery".to_string()),
        stage: None,
        underwriting: Underwriting {
            value: 250_000.0,
            credit_score: Some(742),
            ..Underwriting::default()
        },
    })?;
    let deal_id = opened.deal.id.clone();
    println!(
        "- Opened {} for {} in {}",
        deal_id,
        opened.deal.borrower_name,
        opened.deal.stage.label()
    );
    render_score(&opened.risk);

    let mut underwriting = opened.deal.underwriting.clone();
    underwriting.approved_amount = Some(240_000.0);
    underwriting.ltv_ratio = Some(68.0);
    underwriting.dti_ratio = Some(31.0);
    underwriting.loan_term = Some(120);
    underwriting.interest_rate = Some(7.25);
    let rescored = service.update_underwriting(&deal_id, underwriting)?;
    println!("\nUnderwriting captured");
    render_score(&rescored.risk);

    for stage in [Stage::PreQualification, Stage::Underwriting, Stage::Approved, final_stage] {
        match service.change_stage(&deal_id, stage) {
            Ok(deal) => println!("- Stage -> {}", deal.stage.label()),
            Err(err) => println!("- Stage change to {} refused: {}", stage.label(), err),
        }
    }

    if !final_stage.is_terminal() {
        service.change_stage(&deal_id, Stage::ClosedWon)?;
        println!("- Stage -> {}", Stage::ClosedWon.label());
    }
    match service.change_stage(&deal_id, Stage::Lead) {
        Err(DealServiceError::TransitionRejected { reason, .. }) => {
            println!("- Reopening refused: {reason}");
        }
        Err(err) => return Err(err.into()),
        Ok(deal) => println!("- Stage -> {}", deal.stage.label()),
    }

    match service.schedule(&deal_id)? {
        Some(schedule) => {
            println!("\nRepayment schedule");
            render_schedule_summary(&schedule);
        }
        None => println!("\nRepayment schedule not available without rate and term"),
    }

    Ok(())
}

fn configured_limits() -> UnderwritingLimits {
    AppConfig::load()
        .map(|config| config.underwriting)
        .unwrap_or_default()
}

fn render_score(result: &RiskScoreResult) {
    println!(
        "  Risk score {} (rating {}){}",
        result.score,
        result.rating.as_str(),
        if result.has_enough_data {
            ""
        } else {
            " - not enough data to rate"
        }
    );
    let breakdown = &result.breakdown;
    let metrics: [(&str, &MetricScore); 5] = [
        ("Credit score", &breakdown.credit_score),
        ("Loan-to-value", &breakdown.ltv),
        ("Debt-to-income", &breakdown.dti),
        ("Loan term", &breakdown.loan_term),
        ("Loan amount", &breakdown.loan_amount),
    ];
    for (name, metric) in metrics {
        let value = metric
            .value
            .map(|value| format!("{value:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    - {name}: {} ({}) value {value}",
            metric.score, metric.label
        );
    }
}

fn render_schedule_summary(schedule: &AmortizationResult) {
    println!(
        "  {} payments of {:.2} | total interest {:.2} | total paid {:.2}",
        schedule.rows.len(),
        schedule.monthly_payment,
        schedule.total_interest,
        schedule.total_paid
    );
}

fn render_schedule(schedule: &AmortizationResult) {
    render_schedule_summary(schedule);
    println!(
        "  {:>5} {:>12} {:>12} {:>12} {:>14}",
        "month", "payment", "principal", "interest", "balance"
    );
    for row in &schedule.rows {
        println!(
            "  {:>5} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.month, row.payment, row.principal, row.interest, row.balance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lending_crm::deals::UnderwritingViolation;

    #[test]
    fn demo_walks_a_deal_to_closed_won() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }

    #[test]
    fn demo_handles_terminal_final_stage() {
        run_demo(DemoArgs {
            borrower: Some("Lakeview Auto Repair".to_string()),
            final_stage: Some(Stage::ClosedLost),
        })
        .expect("demo completes");
    }

    #[test]
    fn schedule_command_writes_csv() {
        run_schedule(ScheduleArgs {
            principal: 12_000.0,
            rate: 0.0,
            term: 12,
            csv: true,
        })
        .expect("schedule prints");
    }

    #[test]
    fn schedule_command_rejects_zero_term() {
        let result = run_schedule(ScheduleArgs {
            principal: 12_000.0,
            rate: 5.0,
            term: 0,
            csv: false,
        });
        assert!(matches!(
            result,
            Err(AppError::InvalidRequest(UnderwritingViolation::TermOutOfRange { found: 0, .. }))
        ));
    }

    #[test]
    fn score_command_rejects_out_of_range_credit() {
        let result = run_score(ScoreArgs {
            credit_score: Some(900),
            value: 100_000.0,
            ..ScoreArgs::default()
        });
        assert!(matches!(
            result,
            Err(AppError::InvalidRequest(
                UnderwritingViolation::CreditScoreOutOfRange(900)
            ))
        ));
    }

    #[test]
    fn score_command_prints_breakdown() {
        run_score(ScoreArgs {
            credit_score: Some(720),
            ltv: Some(70.0),
            value: 180_000.0,
            ..ScoreArgs::default()
        })
        .expect("score prints");
    }
}
