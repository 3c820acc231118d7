//! Payload builders shared by the workflow integration tests.

#![allow(dead_code)]

use sqlx::PgPool;

use skyplan_core::fields::{PlanPayload, ProgramPayload};
use skyplan_core::service;
use skyplan_core::Role;
use skyplan_db::models::SciencePlan;

pub const ASTRONOMER: Option<Role> = Some(Role::Astronomer);
pub const OBSERVER: Option<Role> = Some(Role::ScienceObserver);
pub const OPERATOR: Option<Role> = Some(Role::TelescopeOperator);

/// A plan payload that passes every check and draws no advisor warnings.
pub fn plan_payload() -> PlanPayload {
    PlanPayload {
        creator: Some("V. Rubin".into()),
        submitter: Some("M. Keck".into()),
        funding: Some("2000".into()),
        objective: Some("Rotation curve of M31".into()),
        star_system: Some("Andromeda".into()),
        schedule_start: Some("2026-11-02T20:00".into()),
        schedule_end: Some("2026-11-03T02:00".into()),
        telescope_location: Some("Hawaii".into()),
        file_type: Some("PNG".into()),
        file_quality: Some("Fine".into()),
        image_mode: Some("Color".into()),
        exposure: Some("30".into()),
        contrast: Some("10".into()),
        brightness: Some("10".into()),
        saturation: Some("10".into()),
    }
}

pub fn plan_payload_with_exposure(exposure: i32) -> PlanPayload {
    PlanPayload {
        exposure: Some(exposure.to_string()),
        ..plan_payload()
    }
}

pub fn program_payload() -> ProgramPayload {
    ProgramPayload {
        calibration_unit: Some("ThAr".into()),
        light_type: Some("MaunaKeaSkyEmission".into()),
        fold_mirror_type: Some("CASSEGRAIN_FOCUS".into()),
        teleposition_degree: Some("123.5".into()),
        teleposition_direction: Some("East".into()),
    }
}

pub async fn draft_plan(pool: &PgPool) -> SciencePlan {
    service::create_plan(pool, ASTRONOMER, &plan_payload())
        .await
        .expect("create should succeed")
}

pub async fn valid_plan(pool: &PgPool) -> SciencePlan {
    let plan = draft_plan(pool).await;
    service::validate_plan(pool, OBSERVER, plan.id)
        .await
        .expect("validate should succeed")
        .plan
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("failed to count {table}: {e}"));
    n
}
