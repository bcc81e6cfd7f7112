use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{BreedingConfig, SeverityBands};
use crate::cycle::CycleState;
use crate::stats::days_between;
use crate::status::BreedingStatus;

/// Namespace for v5 alert ids. Ids must be stable across recomputations for
/// the same (animal, kind) so the status store can reconcile regenerated
/// alerts with ones a person already acknowledged or dismissed.
const ALERT_NAMESPACE: Uuid = Uuid::from_u128(0x5b2c_f8a1_d6e4_4cbe_9f3a_7c0d_21e8_5a47);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Lifecycle of an alert once a person has seen it. The engine only ever
/// emits Active; the other states are set by people through the alert store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "acknowledged" => Some(Self::Acknowledged),
            "resolved" => Some(Self::Resolved),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    DaysOpenExceeded,
    RepeatBreeder,
    PregnancyCheckDue,
    CalvingApproaching,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DaysOpenExceeded => "days_open_exceeded",
            Self::RepeatBreeder => "repeat_breeder",
            Self::PregnancyCheckDue => "pregnancy_check_due",
            Self::CalvingApproaching => "calving_approaching",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "days_open_exceeded" => Some(Self::DaysOpenExceeded),
            "repeat_breeder" => Some(Self::RepeatBreeder),
            "pregnancy_check_due" => Some(Self::PregnancyCheckDue),
            "calving_approaching" => Some(Self::CalvingApproaching),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub severity: Severity,
    pub animal_id: Uuid,
    pub due_at: Option<DateTime<Utc>>,
    pub message: String,
    pub status: AlertStatus,
}

impl Alert {
    /// Deterministic id for an (animal, kind) pair.
    pub fn stable_id(animal_id: Uuid, kind: AlertKind) -> Uuid {
        let key = format!("{animal_id}:{}", kind.as_str());
        Uuid::new_v5(&ALERT_NAMESPACE, key.as_bytes())
    }

    fn new(
        animal_id: Uuid,
        kind: AlertKind,
        severity: Severity,
        due_at: Option<DateTime<Utc>>,
        message: String,
    ) -> Self {
        Self {
            id: Self::stable_id(animal_id, kind),
            kind,
            severity,
            animal_id,
            due_at,
            message,
            status: AlertStatus::Active,
        }
    }
}

fn band_severity(value: i64, bands: &SeverityBands) -> Option<Severity> {
    if value >= bands.high_from {
        Some(Severity::High)
    } else if value >= bands.medium_from {
        Some(Severity::Medium)
    } else if value >= bands.low_from {
        Some(Severity::Low)
    } else {
        None
    }
}

/// Derive attention alerts from current breeding statuses.
///
/// Stateless and re-run on demand: always emits fresh Active candidates,
/// and reconciling them against what a person already handled is the alert
/// store's job, keyed by the stable id.
pub fn derive_alerts(
    statuses: &[BreedingStatus],
    as_of: DateTime<Utc>,
    config: &BreedingConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let thresholds = &config.alerts;

    for status in statuses {
        let animal = status.animal_id;
        let pregnant = status.state == CycleState::Pregnant;

        // Days-open and repeat-breeder signals are moot once the animal has
        // a confirmed pregnancy; the open problem they flag is resolved.
        if !pregnant {
            if let Some(days) = status.days_open {
                if let Some(severity) = band_severity(days, &thresholds.days_open) {
                    alerts.push(Alert::new(
                        animal,
                        AlertKind::DaysOpenExceeded,
                        severity,
                        None,
                        format!("{days} days open without confirmed pregnancy"),
                    ));
                }
            }

            let services = i64::from(status.insemination_count);
            if let Some(severity) = band_severity(services, &thresholds.services) {
                alerts.push(Alert::new(
                    animal,
                    AlertKind::RepeatBreeder,
                    severity,
                    None,
                    format!("{services} services this cycle without conception"),
                ));
            }
        }

        if let Some(check_at) = status.scheduled_pregnancy_check_date {
            let days_until = days_between(as_of, check_at);
            if check_at <= as_of {
                alerts.push(Alert::new(
                    animal,
                    AlertKind::PregnancyCheckDue,
                    Severity::High,
                    Some(check_at),
                    format!("pregnancy check overdue by {} days", -days_until),
                ));
            } else if days_until <= thresholds.check_due_lead_days {
                alerts.push(Alert::new(
                    animal,
                    AlertKind::PregnancyCheckDue,
                    Severity::Medium,
                    Some(check_at),
                    format!("pregnancy check due in {days_until} days"),
                ));
            }
        }

        if let Some(calving_at) = status.expected_calving_date {
            let days_until = days_between(as_of, calving_at);
            // Reminder window includes an overdue due date: the pregnancy
            // stays on the books until a calving event is recorded.
            if days_until <= thresholds.calving_lead_days {
                alerts.push(Alert::new(
                    animal,
                    AlertKind::CalvingApproaching,
                    Severity::Medium,
                    Some(calving_at),
                    format!("expected calving in {days_until} days"),
                ));
            }
        }
    }

    alerts
}
