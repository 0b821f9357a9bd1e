use super::common::*;
use crate::config::UnderwritingLimits;
use crate::deals::domain::{DealDraft, DealId, Underwriting};
use crate::deals::repository::{DealRepository, RepositoryError};
use crate::deals::{DealService, DealServiceError, UnderwritingViolation};
use crate::engine::{RiskRating, Stage};
use std::sync::Arc;

#[test]
fn create_scores_and_persists_rating() {
    let (service, repository) = build_service();

    let scored = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");

    assert_eq!(scored.deal.stage, Stage::Lead);
    assert_eq!(scored.risk.rating, RiskRating::A);
    assert_eq!(scored.deal.risk_rating, Some(RiskRating::A));
    assert_eq!(
        repository.stored(&scored.deal.id).risk_rating,
        Some(RiskRating::A)
    );
}

#[test]
fn create_without_enough_data_leaves_rating_empty() {
    let (service, repository) = build_service();

    let scored = service.create(sparse_draft()).expect("deal opens");

    assert!(!scored.risk.has_enough_data);
    assert_eq!(scored.risk.score, 50);
    assert_eq!(scored.deal.risk_rating, None);
    assert_eq!(repository.stored(&scored.deal.id).risk_rating, None);
}

#[test]
fn create_honors_requested_stage() {
    let (service, _) = build_service();
    let mut draft = draft(strong_underwriting());
    draft.stage = Some(Stage::Underwriting);

    let scored = service.create(draft).expect("deal opens");

    assert_eq!(scored.deal.stage, Stage::Underwriting);
}

#[test]
fn create_rejects_invalid_underwriting() {
    let (service, _) = build_service();

    let mut bad_credit = strong_underwriting();
    bad_credit.credit_score = Some(900);
    match service.create(draft(bad_credit)) {
        Err(DealServiceError::Validation(UnderwritingViolation::CreditScoreOutOfRange(900))) => {}
        other => panic!("expected credit score violation, got {other:?}"),
    }

    let mut negative_value = strong_underwriting();
    negative_value.value = -1.0;
    match service.create(draft(negative_value)) {
        Err(DealServiceError::Validation(UnderwritingViolation::InvalidAmount {
            field: "value",
            ..
        })) => {}
        other => panic!("expected invalid amount, got {other:?}"),
    }

    let nameless = DealDraft {
        borrower_name: "   ".to_string(),
        stage: None,
        underwriting: Underwriting::default(),
    };
    assert!(matches!(
        service.create(nameless),
        Err(DealServiceError::Validation(
            UnderwritingViolation::MissingBorrowerName
        ))
    ));
}

#[test]
fn term_limit_comes_from_configuration() {
    let repository = Arc::new(MemoryRepository::default());
    let service = DealService::new(repository, UnderwritingLimits { max_term_months: 120 });

    let mut long_term = strong_underwriting();
    long_term.loan_term = Some(180);

    match service.create(draft(long_term)) {
        Err(DealServiceError::Validation(UnderwritingViolation::TermOutOfRange {
            found: 180,
            max: 120,
        })) => {}
        other => panic!("expected term violation, got {other:?}"),
    }
}

#[test]
fn underwriting_update_rescores_and_overwrites_rating() {
    let (service, repository) = build_service();
    let opened = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");

    let rescored = service
        .update_underwriting(&opened.deal.id, weak_underwriting())
        .expect("update succeeds");

    assert_eq!(rescored.risk.rating, RiskRating::D);
    assert_eq!(
        repository.stored(&opened.deal.id).risk_rating,
        Some(RiskRating::D)
    );
    assert!(rescored.deal.updated_at >= opened.deal.updated_at);
}

#[test]
fn sparse_update_keeps_previous_rating() {
    let (service, repository) = build_service();
    let opened = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");

    let sparse = Underwriting {
        value: 100_000.0,
        ..Underwriting::default()
    };
    let rescored = service
        .update_underwriting(&opened.deal.id, sparse)
        .expect("update succeeds");

    assert!(!rescored.risk.has_enough_data);
    assert_eq!(rescored.deal.risk_rating, Some(RiskRating::A));
    assert_eq!(
        repository.stored(&opened.deal.id).risk_rating,
        Some(RiskRating::A)
    );
}

#[test]
fn rescore_fills_rating_once_data_arrives() {
    let (service, repository) = build_service();
    let opened = service.create(sparse_draft()).expect("deal opens");

    let mut stored = repository.stored(&opened.deal.id);
    stored.underwriting.credit_score = Some(720);
    repository.update(stored).expect("direct update");

    let rescored = service.rescore(&opened.deal.id).expect("rescore succeeds");

    assert!(rescored.risk.has_enough_data);
    assert!(rescored.deal.risk_rating.is_some());
}

#[test]
fn change_stage_moves_open_deals() {
    let (service, repository) = build_service();
    let opened = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");

    let moved = service
        .change_stage(&opened.deal.id, Stage::Approved)
        .expect("transition allowed");
    assert_eq!(moved.stage, Stage::Approved);

    let back = service
        .change_stage(&opened.deal.id, Stage::Lead)
        .expect("backward move allowed");
    assert_eq!(back.stage, Stage::Lead);
    assert_eq!(repository.stored(&opened.deal.id).stage, Stage::Lead);
}

#[test]
fn change_stage_rejects_leaving_terminal_stage() {
    let (service, repository) = build_service();
    let opened = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");
    service
        .change_stage(&opened.deal.id, Stage::ClosedWon)
        .expect("closing allowed");

    match service.change_stage(&opened.deal.id, Stage::Active) {
        Err(DealServiceError::TransitionRejected { from, to, reason }) => {
            assert_eq!(from, Stage::ClosedWon);
            assert_eq!(to, Stage::Active);
            assert!(reason.contains("Closed Won"));
        }
        other => panic!("expected rejected transition, got {other:?}"),
    }
    assert_eq!(repository.stored(&opened.deal.id).stage, Stage::ClosedWon);

    let same = service
        .change_stage(&opened.deal.id, Stage::ClosedWon)
        .expect("no-op move allowed");
    assert_eq!(same.stage, Stage::ClosedWon);
}

#[test]
fn schedule_uses_requested_amount_rate_and_term() {
    let (service, _) = build_service();
    let opened = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");

    let schedule = service
        .schedule(&opened.deal.id)
        .expect("schedule computed")
        .expect("schedule applicable");

    assert_eq!(schedule.rows.len(), 12);
    assert_eq!(schedule.rows[11].balance, 0.0);
    assert!(schedule.total_interest > 0.0);
}

#[test]
fn schedule_is_not_applicable_without_rate_or_term() {
    let (service, _) = build_service();
    let mut underwriting = strong_underwriting();
    underwriting.interest_rate = None;
    let opened = service.create(draft(underwriting)).expect("deal opens");

    assert!(service
        .schedule(&opened.deal.id)
        .expect("lookup succeeds")
        .is_none());
}

#[test]
fn list_filters_by_stage() {
    let (service, _) = build_service();
    let first = service
        .create(draft(strong_underwriting()))
        .expect("deal opens");
    service
        .create(draft(weak_underwriting()))
        .expect("deal opens");
    service
        .change_stage(&first.deal.id, Stage::Active)
        .expect("transition allowed");

    let active = service.list(Some(Stage::Active)).expect("list succeeds");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.deal.id);
    assert_eq!(service.list(None).expect("list succeeds").len(), 2);
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&DealId("missing".to_string())) {
        Err(DealServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn create_propagates_repository_conflicts() {
    let service = DealService::new(Arc::new(ConflictRepository), UnderwritingLimits::default());

    assert!(matches!(
        service.create(draft(strong_underwriting())),
        Err(DealServiceError::Repository(RepositoryError::Conflict))
    ));
}
