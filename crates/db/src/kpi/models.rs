use chrono::{DateTime, NaiveDate, Utc};
use herdbook_breeding::alert::Alert;
use herdbook_breeding::herd::{HerdKpiSnapshot, Period};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One herd KPI snapshot row, unique per farm and period. Metrics stay
/// nullable all the way to storage; a month without samples is not a month
/// of zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdKpiSnapshotRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub conception_rate: Option<f64>,
    pub avg_days_open: Option<f64>,
    pub avg_calving_interval: Option<f64>,
    pub ai_per_conception: Option<f64>,
    /// Animals skipped because their history was unusable.
    pub excluded_animals: i32,
    pub computed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl HerdKpiSnapshotRecord {
    pub fn new(
        farm_id: Uuid,
        period: Period,
        snapshot: &HerdKpiSnapshot,
        excluded_animals: i32,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            farm_id,
            period_start: period.start,
            period_end: period.end,
            conception_rate: snapshot.conception_rate,
            avg_days_open: snapshot.avg_days_open,
            avg_calving_interval: snapshot.avg_calving_interval,
            ai_per_conception: snapshot.ai_per_conception,
            excluded_animals,
            computed_at,
            created_at: computed_at,
        }
    }

    /// Back to the engine's shape, e.g. for trend deltas.
    pub fn kpi(&self) -> HerdKpiSnapshot {
        HerdKpiSnapshot {
            conception_rate: self.conception_rate,
            avg_days_open: self.avg_days_open,
            avg_calving_interval: self.avg_calving_interval,
            ai_per_conception: self.ai_per_conception,
        }
    }
}

/// A stored alert. Derived columns are refreshed on every recompute; the
/// `status` column belongs to people and is only changed through
/// `update_alert_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub animal_id: Uuid,
    pub alert_type: String,
    pub severity: String,
    pub due_at: Option<DateTime<Utc>>,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn from_alert(farm_id: Uuid, alert: &Alert, now: DateTime<Utc>) -> Self {
        Self {
            id: alert.id,
            farm_id,
            animal_id: alert.animal_id,
            alert_type: alert.kind.as_str().to_owned(),
            severity: alert.severity.as_str().to_owned(),
            due_at: alert.due_at,
            message: alert.message.clone(),
            status: alert.status.as_str().to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KpiFilter {
    pub farm_id: Option<Uuid>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
