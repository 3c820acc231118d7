//! Role claims and the action permission table.
//!
//! Callers present at most one [`Role`]. Every workflow entry point names
//! the [`Action`] it performs and calls [`authorize`] before touching the
//! store. Which roles may perform which action lives in exactly one place,
//! [`Action::permitted_roles`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::WorkflowError;

/// The three workflow roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Drafts, simulates, edits, deletes and submits plans.
    Astronomer,
    /// Issues the official VALID/INVALID verdict.
    ScienceObserver,
    /// Executes submitted programs.
    TelescopeOperator,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::Astronomer,
        Role::ScienceObserver,
        Role::TelescopeOperator,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Astronomer => "Astronomer",
            Self::ScienceObserver => "ScienceObserver",
            Self::TelescopeOperator => "TelescopeOperator",
        };
        f.write_str(s)
    }
}

/// Error returned when a string does not name a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    /// Case-insensitive; `_`, `-` and spaces are ignored, so
    /// `science_observer` and `Science Observer` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "astronomer" => Ok(Self::Astronomer),
            "scienceobserver" => Ok(Self::ScienceObserver),
            "telescopeoperator" => Ok(Self::TelescopeOperator),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// Turn a raw claim from a request boundary into a role.
///
/// Absent, blank and unrecognised claims all mean "no valid claim".
pub fn parse_claim(raw: Option<&str>) -> Option<Role> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Every operation the workflow exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    CreatePlan,
    EditPlan,
    DeletePlan,
    SimulatePlan,
    ValidatePlan,
    SubmitProgram,
    ExecuteProgram,
    /// Read-only access: listings, plan detail, audit history, catalog.
    View,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::CreatePlan,
        Action::EditPlan,
        Action::DeletePlan,
        Action::SimulatePlan,
        Action::ValidatePlan,
        Action::SubmitProgram,
        Action::ExecuteProgram,
        Action::View,
    ];

    /// The roles allowed to perform this action.
    pub fn permitted_roles(self) -> &'static [Role] {
        match self {
            Self::CreatePlan
            | Self::EditPlan
            | Self::DeletePlan
            | Self::SimulatePlan
            | Self::SubmitProgram => &[Role::Astronomer],
            Self::ValidatePlan => &[Role::ScienceObserver],
            Self::ExecuteProgram => &[Role::TelescopeOperator],
            Self::View => &Role::ALL,
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.permitted_roles().contains(&role)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreatePlan => "create a plan",
            Self::EditPlan => "edit a plan",
            Self::DeletePlan => "delete a plan",
            Self::SimulatePlan => "simulate a plan",
            Self::ValidatePlan => "validate a plan",
            Self::SubmitProgram => "submit a program",
            Self::ExecuteProgram => "execute a program",
            Self::View => "view records",
        };
        f.write_str(s)
    }
}

/// Check a caller's claim against the permission table.
///
/// Returns the authorized role, or [`WorkflowError::Unauthorized`] when the
/// claim is missing or not permitted.
pub fn authorize(claim: Option<Role>, action: Action) -> Result<Role, WorkflowError> {
    match claim {
        Some(role) if action.permits(role) => Ok(role),
        _ => {
            warn!(
                role = claim.map(|r| r.to_string()).as_deref().unwrap_or("none"),
                %action,
                "authorization rejected"
            );
            Err(WorkflowError::Unauthorized {
                action,
                role: claim,
            })
        }
    }
}
