use chrono::{DateTime, Utc};
use herdbook_breeding::event::{CheckResult, ReproEvent, ReproEventKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored reproduction/health event row. Rows are append-only facts; the
/// engine never mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproEventRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub animal_id: Uuid,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub check_result: Option<String>,
    pub difficult_birth: Option<bool>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReproEventRecord {
    /// Map a stored row into an engine event. Unknown event types map to
    /// `Other` and an unparseable check result maps to None; the engine
    /// decides whether that makes the event malformed.
    pub fn to_event(&self) -> ReproEvent {
        ReproEvent {
            animal_id: self.animal_id,
            kind: ReproEventKind::parse(&self.event_type),
            occurred_at: self.occurred_at,
            check_result: self
                .check_result
                .as_deref()
                .and_then(CheckResult::parse),
            difficult_birth: self.difficult_birth,
        }
    }
}
