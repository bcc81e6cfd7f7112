use chrono::{DateTime, Utc};
use herdbook_breeding::status::BreedingStatus;
use herdbook_breeding::summary::BreedingSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored per-animal breeding row: the current status projection plus the
/// lifetime summary, one row per animal, overwritten on every recompute.
///
/// `breeding_memo` is the one field the engine never touches; it is written
/// by people and survives recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingStatusRecord {
    pub farm_id: Uuid,
    pub animal_id: Uuid,
    pub state: String,
    pub parity: i32,
    pub days_open: Option<i64>,
    pub pregnancy_days: Option<i64>,
    pub days_after_calving: Option<i64>,
    pub days_after_insemination: Option<i64>,
    pub insemination_count: i32,
    pub expected_calving_date: Option<DateTime<Utc>>,
    pub scheduled_pregnancy_check_date: Option<DateTime<Utc>>,
    pub is_difficult_birth: Option<bool>,
    pub total_insemination_count: i64,
    pub average_days_open: Option<f64>,
    pub average_pregnancy_period: Option<f64>,
    pub average_calving_interval: Option<f64>,
    pub difficult_birth_count: i32,
    pub pregnancy_head_count: i32,
    pub pregnancy_success_rate: Option<f64>,
    pub breeding_memo: Option<String>,
    pub computed_at: DateTime<Utc>,
}

impl BreedingStatusRecord {
    pub fn from_parts(
        farm_id: Uuid,
        status: &BreedingStatus,
        summary: &BreedingSummary,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            farm_id,
            animal_id: status.animal_id,
            state: status.state.as_str().to_owned(),
            parity: status.parity as i32,
            days_open: status.days_open,
            pregnancy_days: status.pregnancy_days,
            days_after_calving: status.days_after_calving,
            days_after_insemination: status.days_after_insemination,
            insemination_count: status.insemination_count as i32,
            expected_calving_date: status.expected_calving_date,
            scheduled_pregnancy_check_date: status.scheduled_pregnancy_check_date,
            is_difficult_birth: status.is_difficult_birth,
            total_insemination_count: summary.total_insemination_count as i64,
            average_days_open: summary.average_days_open,
            average_pregnancy_period: summary.average_pregnancy_period,
            average_calving_interval: summary.average_calving_interval,
            difficult_birth_count: summary.difficult_birth_count as i32,
            pregnancy_head_count: summary.pregnancy_head_count as i32,
            pregnancy_success_rate: summary.pregnancy_success_rate,
            breeding_memo: None,
            computed_at,
        }
    }
}
