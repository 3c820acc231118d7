//! The official verdict that moves a plan to VALID or INVALID.

use serde::Serialize;

use skyplan_db::models::{PlanStatus, SciencePlan};

use crate::fields::{PlanPayload, validate_plan_fields};

pub const MAX_EXPOSURE: i32 = 45;
pub const MIN_FUNDING: f64 = 500.0;

pub const EXPOSURE_OVER_LIMIT: &str = "Exposure exceeds maximum allowed operational limit (45).";
pub const FUNDING_UNDER_MINIMUM: &str = "Funding below minimum requirement for approval.";
pub const APPROVED: &str = "Plan meets all validation criteria.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub approved: bool,
    pub messages: Vec<String>,
}

impl Verdict {
    fn rejected(messages: Vec<String>) -> Self {
        Self {
            approved: false,
            messages,
        }
    }

    /// The plan status this verdict assigns.
    pub fn status(&self) -> PlanStatus {
        if self.approved {
            PlanStatus::Valid
        } else {
            PlanStatus::Invalid
        }
    }
}

/// Decide a plan. Field violations win, then the first failing rule.
pub fn officially_validate(plan: &SciencePlan) -> Verdict {
    let violations = validate_plan_fields(&PlanPayload::from(plan));
    if !violations.is_empty() {
        return Verdict::rejected(violations.iter().map(ToString::to_string).collect());
    }
    if plan.exposure > MAX_EXPOSURE {
        return Verdict::rejected(vec![EXPOSURE_OVER_LIMIT.to_owned()]);
    }
    if plan.funding < MIN_FUNDING {
        return Verdict::rejected(vec![FUNDING_UNDER_MINIMUM.to_owned()]);
    }
    Verdict {
        approved: true,
        messages: vec![APPROVED.to_owned()],
    }
}
