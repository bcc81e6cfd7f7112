use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BreedingConfig;
use crate::cycle::{CycleFold, CycleState};
use crate::error::BreedingError;
use crate::event::ReproEvent;
use crate::stats::days_between;

/// An animal's current breeding position, recomputed from scratch on every
/// call and overwritten wherever it is stored. No history is kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingStatus {
    pub animal_id: Uuid,
    pub state: CycleState,
    /// Lifetime count of completed calvings; never decreases.
    pub parity: u32,
    /// Reference point (last calving or arrival) to the most recent
    /// insemination, or to `as_of` when the cycle has none yet.
    pub days_open: Option<i64>,
    /// Non-null exactly when `state` is Pregnant.
    pub pregnancy_days: Option<i64>,
    pub days_after_calving: Option<i64>,
    pub days_after_insemination: Option<i64>,
    /// Inseminations within the current cycle; resets at calving.
    pub insemination_count: u32,
    pub expected_calving_date: Option<DateTime<Utc>>,
    pub scheduled_pregnancy_check_date: Option<DateTime<Utc>>,
    /// Copied from the most recent calving; None before the first one.
    pub is_difficult_birth: Option<bool>,
}

/// Replay `events` up to `as_of` and project the animal's current status.
///
/// Events after `as_of` are ignored; input order does not matter. Unknown
/// event kinds pass through silently, malformed events fail the animal.
pub fn resolve(
    animal_id: Uuid,
    events: &[ReproEvent],
    as_of: DateTime<Utc>,
    config: &BreedingConfig,
) -> Result<BreedingStatus, BreedingError> {
    let in_scope: Vec<ReproEvent> = events
        .iter()
        .filter(|e| e.occurred_at <= as_of)
        .cloned()
        .collect();
    let fold = CycleFold::replay(animal_id, &in_scope)?;

    let pregnant = fold.state == CycleState::Pregnant;
    let inseminated = fold.state == CycleState::Inseminated;

    let days_open = fold.reference().map(|r| {
        let until = fold.last_insemination.unwrap_or(as_of);
        days_between(r, until)
    });

    Ok(BreedingStatus {
        animal_id,
        state: fold.state,
        parity: fold.parity,
        days_open,
        pregnancy_days: if pregnant {
            fold.pregnancy_start.map(|p| days_between(p, as_of))
        } else {
            None
        },
        days_after_calving: fold.last_calving.map(|c| days_between(c, as_of)),
        days_after_insemination: fold.last_insemination.map(|i| days_between(i, as_of)),
        insemination_count: fold.cycle_services,
        expected_calving_date: if pregnant {
            fold.pregnancy_start
                .map(|p| p + Duration::days(config.gestation_days))
        } else {
            None
        },
        scheduled_pregnancy_check_date: if inseminated {
            fold.last_insemination
                .map(|i| i + Duration::days(config.pregnancy_check_offset_days))
        } else {
            None
        },
        is_difficult_birth: fold.is_difficult_birth,
    })
}
