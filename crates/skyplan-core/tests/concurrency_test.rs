//! Racing mutations on one record: at most one wins per source status.

mod common;

use common::*;
use skyplan_core::{WorkflowError, service};
use skyplan_db::models::PlanStatus;
use skyplan_db::queries::plans;
use skyplan_test_utils::{create_seeded_test_db, drop_test_db};

fn is_guard<T>(result: &Result<T, WorkflowError>) -> bool {
    matches!(result, Err(WorkflowError::Guard { .. }))
}

#[tokio::test]
async fn racing_validations_record_one_verdict() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = draft_plan(&pool).await;
    let (a, b) = tokio::join!(
        service::validate_plan(&pool, OBSERVER, plan.id),
        service::validate_plan(&pool, OBSERVER, plan.id),
    );

    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one validation should win"
    );
    assert!(is_guard(&a) || is_guard(&b));
    assert_eq!(count_rows(&pool, "validation_results").await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn racing_submissions_create_one_program() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let payload = program_payload();
    let (a, b) = tokio::join!(
        service::submit_program(&pool, ASTRONOMER, plan.id, &payload),
        service::submit_program(&pool, ASTRONOMER, plan.id, &payload),
    );

    assert!(a.is_ok() != b.is_ok(), "exactly one submission should win");
    assert!(is_guard(&a) || is_guard(&b));
    assert_eq!(count_rows(&pool, "observing_programs").await, 1);

    let after = plans::get_plan(&pool, plan.id).await.unwrap().unwrap();
    assert_eq!(after.status, PlanStatus::Submitted);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn edit_racing_submit_never_edits_a_submitted_plan() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let edit_payload = plan_payload_with_exposure(12);
    let submit_payload = program_payload();
    let (edit, submit) = tokio::join!(
        service::edit_plan(&pool, ASTRONOMER, plan.id, &edit_payload),
        service::submit_program(&pool, ASTRONOMER, plan.id, &submit_payload),
    );

    // VALID is not editable, so the edit loses whichever runs first.
    assert!(is_guard(&edit));
    assert!(submit.is_ok());
    let after = plans::get_plan(&pool, plan.id).await.unwrap().unwrap();
    assert_eq!(after.status, PlanStatus::Submitted);
    assert_eq!(after.exposure, plan.exposure);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn racing_executions_complete_once() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let program = service::submit_program(&pool, ASTRONOMER, plan.id, &program_payload())
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        service::execute_program(&pool, OPERATOR, program.id),
        service::execute_program(&pool, OPERATOR, program.id),
    );
    assert!(a.is_ok() != b.is_ok(), "exactly one execution should win");
    assert!(is_guard(&a) || is_guard(&b));

    pool.close().await;
    drop_test_db(&db_name).await;
}
