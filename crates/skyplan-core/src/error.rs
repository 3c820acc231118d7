//! Error taxonomy shared by every workflow entry point.

use std::fmt;

use crate::fields::FieldViolation;
use crate::role::{Action, Role};

/// The kinds of record a workflow error can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Plan,
    Program,
    StarSystem,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plan => "plan",
            Self::Program => "program",
            Self::StarSystem => "star system",
        };
        f.write_str(s)
    }
}

/// Why a workflow operation was refused.
///
/// Every variant except [`WorkflowError::Store`] is raised before any write,
/// and the enclosing transaction is dropped without commit, so the target
/// record is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The payload failed field validation.
    #[error("validation failed: {}", join_violations(.violations))]
    Validation { violations: Vec<FieldViolation> },

    /// The entity is not in a state that permits the action.
    #[error("cannot {action}: {entity} {id} is {state}")]
    Guard {
        action: Action,
        entity: Entity,
        id: String,
        state: String,
    },

    /// Missing role claim, or a role not permitted to perform the action.
    #[error("{} may not {action}", .role.map(|r| r.to_string()).unwrap_or_else(|| "caller without a role".to_owned()))]
    Unauthorized { action: Action, role: Option<Role> },

    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl WorkflowError {
    pub(crate) fn guard(
        action: Action,
        entity: Entity,
        id: impl fmt::Display,
        state: impl fmt::Display,
    ) -> Self {
        Self::Guard {
            action,
            entity,
            id: id.to_string(),
            state: state.to_string(),
        }
    }

    pub(crate) fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// The field violations, if this is a validation failure.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation { violations } => violations,
            _ => &[],
        }
    }
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.into())
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
