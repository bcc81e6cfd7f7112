use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reproduction event types the engine reacts to.
///
/// The wider system records many other event types (vaccination, shipment,
/// weighing, ...); those arrive as `Other` and are ignored during replay,
/// never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproEventKind {
    Insemination,
    PregnancyCheck,
    Calving,
    Abortion,
    Stillbirth,
    Arrival,
    Other(String),
}

impl ReproEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Insemination => "insemination",
            Self::PregnancyCheck => "pregnancy_check",
            Self::Calving => "calving",
            Self::Abortion => "abortion",
            Self::Stillbirth => "stillbirth",
            Self::Arrival => "arrival",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Total mapping from stored event-type strings; anything unrecognized
    /// becomes `Other` so foreign event types flow through harmlessly.
    pub fn parse(value: &str) -> Self {
        match value {
            "insemination" => Self::Insemination,
            "pregnancy_check" => Self::PregnancyCheck,
            "calving" => Self::Calving,
            "abortion" => Self::Abortion,
            "stillbirth" => Self::Stillbirth,
            "arrival" => Self::Arrival,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Positive,
    Negative,
}

impl CheckResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

/// An immutable reproduction fact. The engine treats events as read-only
/// input and never mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproEvent {
    pub animal_id: Uuid,
    pub kind: ReproEventKind,
    pub occurred_at: DateTime<Utc>,
    /// Present on pregnancy checks.
    pub check_result: Option<CheckResult>,
    /// Present on calvings.
    pub difficult_birth: Option<bool>,
}

/// Stable ascending sort by event time. Replay requires chronological order;
/// callers may hand over streams in any order.
pub fn sort_events(events: &mut [ReproEvent]) {
    events.sort_by_key(|e| e.occurred_at);
}
