//! Non-authoritative pre-flight checks an Astronomer can run at any time.
//!
//! The advisor never decides validity and never changes a plan's status.
//! Its output is advice to be recorded in the audit log.

use chrono::Duration;

use skyplan_db::models::{ImageMode, SciencePlan};

use crate::fields::{PlanPayload, validate_plan_fields};

pub const HIGH_EXPOSURE: i32 = 40;
pub const LOW_DIAL: i32 = 5;
pub const MAX_WINDOW_HOURS: i64 = 12;
pub const RECOMMENDED_FUNDING: f64 = 1000.0;

pub const HIGH_EXPOSURE_COLOR: &str =
    "Warning: High exposure with Color mode may cause sensor saturation.";
pub const LOW_CLARITY: &str = "Warning: Very low brightness and contrast may reduce image clarity.";
pub const LONG_WINDOW: &str =
    "Warning: Observation window exceeds 12 hours. Telescope allocation may be restricted.";
pub const LOW_FUNDING: &str = "Warning: Funding below recommended operational threshold.";
pub const ALL_CLEAR: &str = "Simulation successful. No technical issues detected.";

/// Run field validation plus heuristics. Never returns an empty list.
pub fn simulate(plan: &SciencePlan) -> Vec<String> {
    let mut messages: Vec<String> = validate_plan_fields(&PlanPayload::from(plan))
        .iter()
        .map(ToString::to_string)
        .collect();

    if plan.exposure > HIGH_EXPOSURE && plan.image_mode == ImageMode::Color {
        messages.push(HIGH_EXPOSURE_COLOR.to_owned());
    }
    if plan.brightness < LOW_DIAL && plan.contrast < LOW_DIAL {
        messages.push(LOW_CLARITY.to_owned());
    }
    if plan.schedule_end - plan.schedule_start > Duration::hours(MAX_WINDOW_HOURS) {
        messages.push(LONG_WINDOW.to_owned());
    }
    if plan.funding < RECOMMENDED_FUNDING {
        messages.push(LOW_FUNDING.to_owned());
    }

    if messages.is_empty() {
        messages.push(ALL_CLEAR.to_owned());
    }
    messages
}
