//! Integration tests for the plan lifecycle against a real PostgreSQL.

mod common;

use uuid::Uuid;

use common::*;
use skyplan_core::authority::{APPROVED, EXPOSURE_OVER_LIMIT};
use skyplan_core::advisor::{ALL_CLEAR, HIGH_EXPOSURE_COLOR};
use skyplan_core::fields::{FieldViolation, PlanPayload};
use skyplan_core::{Entity, WorkflowError, service};
use skyplan_db::models::{PlanStatus, ProgramStatus};
use skyplan_db::queries::{plans, star_systems};
use skyplan_test_utils::{create_seeded_test_db, drop_test_db};

#[tokio::test]
async fn create_resolves_star_system_by_name_or_id() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = draft_plan(&pool).await;
    assert_eq!(plan.status, PlanStatus::Draft);
    let andromeda = star_systems::find_star_system_by_name(&pool, "Andromeda")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.star_system_id, andromeda.id);

    let by_id = PlanPayload {
        star_system: Some(andromeda.id.to_string()),
        ..plan_payload()
    };
    let plan = service::create_plan(&pool, ASTRONOMER, &by_id).await.unwrap();
    assert_eq!(plan.star_system_id, andromeda.id);

    let unknown = PlanPayload {
        star_system: Some("Nibiru".into()),
        ..plan_payload()
    };
    let err = service::create_plan(&pool, ASTRONOMER, &unknown)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::NotFound {
            entity: Entity::StarSystem,
            ..
        }
    ));
    assert_eq!(count_rows(&pool, "science_plans").await, 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn invalid_payload_is_never_persisted() {
    let (pool, db_name) = create_seeded_test_db().await;

    let payload = PlanPayload {
        objective: None,
        contrast: Some("51".into()),
        ..plan_payload()
    };
    let err = service::create_plan(&pool, ASTRONOMER, &payload)
        .await
        .unwrap_err();
    assert_eq!(
        err.violations(),
        [
            FieldViolation::Missing("objective"),
            FieldViolation::DialOutOfRange(skyplan_core::fields::Dial::Contrast),
        ]
    );
    assert_eq!(count_rows(&pool, "science_plans").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn exposure_46_is_invalid() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = service::create_plan(&pool, ASTRONOMER, &plan_payload_with_exposure(46))
        .await
        .unwrap();
    let result = service::validate_plan(&pool, OBSERVER, plan.id).await.unwrap();

    assert!(!result.verdict.approved);
    assert_eq!(result.verdict.messages, [EXPOSURE_OVER_LIMIT]);
    assert_eq!(result.plan.status, PlanStatus::Invalid);

    let detail = service::plan_detail(&pool, OBSERVER, plan.id).await.unwrap();
    assert_eq!(detail.history.len(), 1);
    assert_eq!(detail.history[0].is_valid, Some(false));
    assert_eq!(
        detail.history[0].message,
        format!("[OFFICIAL] {EXPOSURE_OVER_LIMIT}")
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn exposure_30_is_valid() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = draft_plan(&pool).await;
    let result = service::validate_plan(&pool, OBSERVER, plan.id).await.unwrap();

    assert!(result.verdict.approved);
    assert_eq!(result.verdict.messages, [APPROVED]);
    assert_eq!(result.plan.status, PlanStatus::Valid);

    let err = service::validate_plan(&pool, OBSERVER, plan.id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, WorkflowError::Guard { .. }),
        "validate only runs on DRAFT: {err}"
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn submit_creates_one_pending_program() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let program = service::submit_program(&pool, ASTRONOMER, plan.id, &program_payload())
        .await
        .unwrap();
    assert_eq!(program.plan_id, plan.id);
    assert_eq!(program.status, ProgramStatus::PendingReview);

    let detail = service::plan_detail(&pool, ASTRONOMER, plan.id).await.unwrap();
    assert_eq!(detail.plan.status, PlanStatus::Submitted);
    assert_eq!(detail.program.map(|p| p.id), Some(program.id));
    assert_eq!(count_rows(&pool, "observing_programs").await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn submit_outside_valid_creates_nothing() {
    let (pool, db_name) = create_seeded_test_db().await;

    let draft = draft_plan(&pool).await;
    let err = service::submit_program(&pool, ASTRONOMER, draft.id, &program_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    let invalid = service::create_plan(&pool, ASTRONOMER, &plan_payload_with_exposure(46))
        .await
        .unwrap();
    service::validate_plan(&pool, OBSERVER, invalid.id).await.unwrap();
    let err = service::submit_program(&pool, ASTRONOMER, invalid.id, &program_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    let submitted = valid_plan(&pool).await;
    service::submit_program(&pool, ASTRONOMER, submitted.id, &program_payload())
        .await
        .unwrap();
    let err = service::submit_program(&pool, ASTRONOMER, submitted.id, &program_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    assert_eq!(count_rows(&pool, "observing_programs").await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn bad_program_payload_leaves_plan_valid() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let mut payload = program_payload();
    payload.teleposition_degree = Some("400".into());

    let err = service::submit_program(&pool, ASTRONOMER, plan.id, &payload)
        .await
        .unwrap_err();
    assert_eq!(err.violations(), [FieldViolation::DegreeOutOfRange]);

    let after = plans::get_plan(&pool, plan.id).await.unwrap().unwrap();
    assert_eq!(after.status, PlanStatus::Valid);
    assert_eq!(count_rows(&pool, "observing_programs").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn simulate_warns_without_changing_status() {
    let (pool, db_name) = create_seeded_test_db().await;

    let payload = PlanPayload {
        image_mode: Some("Color".into()),
        ..plan_payload_with_exposure(42)
    };
    let plan = service::create_plan(&pool, ASTRONOMER, &payload).await.unwrap();

    let messages = service::simulate_plan(&pool, ASTRONOMER, plan.id).await.unwrap();
    assert!(messages.iter().any(|m| m == HIGH_EXPOSURE_COLOR));

    let detail = service::plan_detail(&pool, ASTRONOMER, plan.id).await.unwrap();
    assert_eq!(detail.plan.status, PlanStatus::Draft);
    assert_eq!(detail.plan.updated_at, plan.updated_at);
    assert_eq!(detail.history.len(), messages.len());
    assert!(detail.history.iter().all(|e| e.is_valid.is_none()));
    assert!(detail.history.iter().all(|e| e.message.starts_with("[SIMULATION] ")));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn simulate_allowed_until_submitted() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let messages = service::simulate_plan(&pool, ASTRONOMER, plan.id).await.unwrap();
    assert_eq!(messages, [ALL_CLEAR]);

    service::submit_program(&pool, ASTRONOMER, plan.id, &program_payload())
        .await
        .unwrap();
    let err = service::simulate_plan(&pool, ASTRONOMER, plan.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn edit_resets_invalid_plan_to_draft() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = service::create_plan(&pool, ASTRONOMER, &plan_payload_with_exposure(48))
        .await
        .unwrap();
    service::validate_plan(&pool, OBSERVER, plan.id).await.unwrap();

    let edited = service::edit_plan(&pool, ASTRONOMER, plan.id, &plan_payload_with_exposure(20))
        .await
        .unwrap();
    assert_eq!(edited.status, PlanStatus::Draft);
    assert_eq!(edited.exposure, 20);

    let result = service::validate_plan(&pool, OBSERVER, plan.id).await.unwrap();
    assert_eq!(result.plan.status, PlanStatus::Valid);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn edit_of_valid_or_submitted_plan_is_refused() {
    let (pool, db_name) = create_seeded_test_db().await;

    let valid = valid_plan(&pool).await;
    let err = service::edit_plan(&pool, ASTRONOMER, valid.id, &plan_payload_with_exposure(5))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");
    assert_eq!(plans::get_plan(&pool, valid.id).await.unwrap().unwrap(), valid);

    service::submit_program(&pool, ASTRONOMER, valid.id, &program_payload())
        .await
        .unwrap();
    let submitted = plans::get_plan(&pool, valid.id).await.unwrap().unwrap();
    let err = service::edit_plan(&pool, ASTRONOMER, valid.id, &plan_payload_with_exposure(5))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");
    assert_eq!(plans::get_plan(&pool, valid.id).await.unwrap().unwrap(), submitted);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn edit_with_bad_payload_changes_nothing() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = draft_plan(&pool).await;
    let err = service::edit_plan(&pool, ASTRONOMER, plan.id, &PlanPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation { .. }));
    assert_eq!(plans::get_plan(&pool, plan.id).await.unwrap().unwrap(), plan);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_cascades_audit_entries() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = service::create_plan(&pool, ASTRONOMER, &plan_payload_with_exposure(49))
        .await
        .unwrap();
    service::simulate_plan(&pool, ASTRONOMER, plan.id).await.unwrap();
    service::validate_plan(&pool, OBSERVER, plan.id).await.unwrap();

    let deleted = service::delete_plan(&pool, ASTRONOMER, plan.id).await.unwrap();
    assert_eq!(deleted.plan_id, plan.id);
    assert_eq!(deleted.audit_entries, 2);
    assert_eq!(deleted.programs, 0);

    assert!(plans::get_plan(&pool, plan.id).await.unwrap().is_none());
    assert_eq!(count_rows(&pool, "validation_results").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_refused_for_valid_and_submitted() {
    let (pool, db_name) = create_seeded_test_db().await;

    let plan = valid_plan(&pool).await;
    let err = service::delete_plan(&pool, ASTRONOMER, plan.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    service::submit_program(&pool, ASTRONOMER, plan.id, &program_payload())
        .await
        .unwrap();
    let err = service::delete_plan(&pool, ASTRONOMER, plan.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }), "{err}");

    assert_eq!(count_rows(&pool, "science_plans").await, 1);
    assert_eq!(count_rows(&pool, "observing_programs").await, 1);
    assert_eq!(count_rows(&pool, "validation_results").await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn missing_plan_is_not_found() {
    let (pool, db_name) = create_seeded_test_db().await;

    let id = Uuid::new_v4();
    for err in [
        service::edit_plan(&pool, ASTRONOMER, id, &plan_payload()).await.unwrap_err(),
        service::delete_plan(&pool, ASTRONOMER, id).await.unwrap_err(),
        service::simulate_plan(&pool, ASTRONOMER, id).await.unwrap_err(),
        service::submit_program(&pool, ASTRONOMER, id, &program_payload())
            .await
            .unwrap_err(),
        service::plan_detail(&pool, ASTRONOMER, id).await.unwrap_err(),
    ] {
        assert!(
            matches!(
                err,
                WorkflowError::NotFound {
                    entity: Entity::Plan,
                    ..
                }
            ),
            "{err}"
        );
    }
    let err = service::validate_plan(&pool, OBSERVER, id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound { .. }), "{err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_plans_filters_by_status() {
    let (pool, db_name) = create_seeded_test_db().await;

    let draft = draft_plan(&pool).await;
    let valid = valid_plan(&pool).await;

    let all = service::list_plans(&pool, OPERATOR, None).await.unwrap();
    assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), [valid.id, draft.id]);

    let drafts = service::list_plans(&pool, OPERATOR, Some(PlanStatus::Draft))
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, draft.id);

    let catalog = service::list_star_systems(&pool, OPERATOR).await.unwrap();
    assert_eq!(catalog.len(), 88);

    pool.close().await;
    drop_test_db(&db_name).await;
}
