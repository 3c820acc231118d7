//! Append-only audit log of simulation and official validation messages.

use sqlx::PgConnection;
use uuid::Uuid;

use skyplan_db::models::ValidationResult;
use skyplan_db::queries::validation_results::{self, NewValidationResult};

/// Which component produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditChannel {
    /// Advisory output. Stored without a verdict.
    Simulation,
    /// An official verdict, stored with its approval flag.
    Official { approved: bool },
}

impl AuditChannel {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Simulation => "[SIMULATION] ",
            Self::Official { .. } => "[OFFICIAL] ",
        }
    }

    fn is_valid(self) -> Option<bool> {
        match self {
            Self::Simulation => None,
            Self::Official { approved } => Some(approved),
        }
    }
}

/// Append one entry per message, in order.
pub async fn append(
    conn: &mut PgConnection,
    plan_id: Uuid,
    channel: AuditChannel,
    messages: &[String],
) -> anyhow::Result<Vec<ValidationResult>> {
    let mut entries = Vec::with_capacity(messages.len());
    for message in messages {
        let entry = validation_results::insert_validation_result(
            &mut *conn,
            &NewValidationResult {
                plan_id,
                is_valid: channel.is_valid(),
                message: format!("{}{message}", channel.prefix()),
            },
        )
        .await?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Every entry for a plan, newest first.
pub async fn history(conn: &mut PgConnection, plan_id: Uuid) -> anyhow::Result<Vec<ValidationResult>> {
    validation_results::list_validation_results(conn, plan_id).await
}
