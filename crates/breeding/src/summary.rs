use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::CycleFold;
use crate::error::BreedingError;
use crate::event::ReproEvent;
use crate::stats::mean;

/// Lifetime cumulative breeding statistics for one animal.
///
/// Every average is None, not zero, when no qualifying sample exists;
/// callers must keep "no data" and "zero" apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingSummary {
    pub animal_id: Uuid,
    pub total_insemination_count: u64,
    pub average_days_open: Option<f64>,
    pub average_pregnancy_period: Option<f64>,
    /// Mean of consecutive calving-to-calving spans; needs at least two
    /// calvings on record.
    pub average_calving_interval: Option<f64>,
    pub difficult_birth_count: u32,
    /// Cycles that reached confirmed pregnancy.
    pub pregnancy_head_count: u32,
    /// pregnancy_head_count / total_insemination_count x 100, in [0, 100];
    /// None when the animal was never inseminated.
    pub pregnancy_success_rate: Option<f64>,
}

/// Walk the full history once and accumulate lifetime statistics.
///
/// Completed cycles that reached confirmed pregnancy contribute one sample
/// each to days open (reference to conceiving insemination) and pregnancy
/// period (conceiving insemination to cycle end); calving intervals come
/// from consecutive calving timestamps only.
pub fn aggregate(animal_id: Uuid, events: &[ReproEvent]) -> Result<BreedingSummary, BreedingError> {
    let fold = CycleFold::replay(animal_id, events)?;

    let days_open_samples: Vec<i64> = fold
        .pregnant_cycles
        .iter()
        .filter_map(|c| c.days_open)
        .collect();
    let pregnancy_samples: Vec<i64> = fold
        .pregnant_cycles
        .iter()
        .filter_map(|c| c.pregnancy_days)
        .collect();
    let interval_samples: Vec<i64> = fold
        .calvings
        .iter()
        .filter_map(|c| c.interval_days)
        .collect();

    let pregnancy_success_rate = if fold.total_services > 0 {
        Some(fold.conceived_cycles as f64 / fold.total_services as f64 * 100.0)
    } else {
        None
    };

    Ok(BreedingSummary {
        animal_id,
        total_insemination_count: fold.total_services,
        average_days_open: mean(&days_open_samples),
        average_pregnancy_period: mean(&pregnancy_samples),
        average_calving_interval: mean(&interval_samples),
        difficult_birth_count: fold.difficult_births,
        pregnancy_head_count: fold.conceived_cycles,
        pregnancy_success_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CheckResult, ReproEventKind};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn insemination(animal: Uuid, at: DateTime<Utc>) -> ReproEvent {
        ReproEvent {
            animal_id: animal,
            kind: ReproEventKind::Insemination,
            occurred_at: at,
            check_result: None,
            difficult_birth: None,
        }
    }

    fn check(animal: Uuid, at: DateTime<Utc>, result: CheckResult) -> ReproEvent {
        ReproEvent {
            animal_id: animal,
            kind: ReproEventKind::PregnancyCheck,
            occurred_at: at,
            check_result: Some(result),
            difficult_birth: None,
        }
    }

    fn calving(animal: Uuid, at: DateTime<Utc>, difficult: bool) -> ReproEvent {
        ReproEvent {
            animal_id: animal,
            kind: ReproEventKind::Calving,
            occurred_at: at,
            check_result: None,
            difficult_birth: Some(difficult),
        }
    }

    /// Zero events: every average is None, never 0, and the success rate is
    /// None because there are no inseminations to divide by.
    #[test]
    fn empty_history_yields_nulls_not_zeros() {
        let a = Uuid::new_v4();
        let summary = aggregate(a, &[]).unwrap();

        assert_eq!(summary.total_insemination_count, 0);
        assert_eq!(summary.average_days_open, None);
        assert_eq!(summary.average_pregnancy_period, None);
        assert_eq!(summary.average_calving_interval, None);
        assert_eq!(summary.pregnancy_head_count, 0);
        assert_eq!(summary.difficult_birth_count, 0);
        assert_eq!(summary.pregnancy_success_rate, None);
    }

    /// Every insemination event in the history is counted, conceiving or not.
    #[test]
    fn insemination_count_is_conserved() {
        let a = Uuid::new_v4();
        let events = [
            calving(a, day(0), false),
            insemination(a, day(60)),
            insemination(a, day(81)),
            check(a, day(111), CheckResult::Positive),
            calving(a, day(363), false),
            insemination(a, day(430)),
        ];
        let summary = aggregate(a, &events).unwrap();
        let raw = events
            .iter()
            .filter(|e| e.kind == ReproEventKind::Insemination)
            .count() as u64;
        assert_eq!(summary.total_insemination_count, raw);
        assert_eq!(summary.total_insemination_count, 3);
    }

    #[test]
    fn two_full_cycles_average_correctly() {
        let a = Uuid::new_v4();
        // Cycle 1: calving day 0, conceives at day 60, calves day 342.
        // Cycle 2: conceives at day 432 (90 days open), calves day 714.
        let events = [
            calving(a, day(0), false),
            insemination(a, day(60)),
            check(a, day(90), CheckResult::Positive),
            calving(a, day(342), false),
            insemination(a, day(432)),
            check(a, day(462), CheckResult::Positive),
            calving(a, day(714), true),
        ];
        let summary = aggregate(a, &events).unwrap();

        // days open: 60 and 90 -> 75; pregnancy: 282 and 282 -> 282
        assert_eq!(summary.average_days_open, Some(75.0));
        assert_eq!(summary.average_pregnancy_period, Some(282.0));
        // calving intervals: 342 and 372 -> 357
        assert_eq!(summary.average_calving_interval, Some(357.0));
        assert_eq!(summary.pregnancy_head_count, 2);
        assert_eq!(summary.difficult_birth_count, 1);
        // 2 conceptions over 2 services
        assert_eq!(summary.pregnancy_success_rate, Some(100.0));
    }

    #[test]
    fn success_rate_counts_failed_services() {
        let a = Uuid::new_v4();
        let events = [
            calving(a, day(0), false),
            insemination(a, day(60)),
            insemination(a, day(81)),
            check(a, day(90), CheckResult::Negative),
            insemination(a, day(102)),
            insemination(a, day(123)),
            check(a, day(153), CheckResult::Positive),
            calving(a, day(405), false),
        ];
        let summary = aggregate(a, &events).unwrap();
        // 1 conception over 4 services -> 25%
        assert_eq!(summary.total_insemination_count, 4);
        assert_eq!(summary.pregnancy_head_count, 1);
        assert_eq!(summary.pregnancy_success_rate, Some(25.0));
    }

    #[test]
    fn success_rate_stays_in_bounds() {
        let a = Uuid::new_v4();
        let events = [
            insemination(a, day(0)),
            check(a, day(30), CheckResult::Positive),
        ];
        let summary = aggregate(a, &events).unwrap();
        let rate = summary.pregnancy_success_rate.unwrap();
        assert!((0.0..=100.0).contains(&rate));
        assert_eq!(rate, 100.0);
    }

    #[test]
    fn single_calving_gives_no_interval() {
        let a = Uuid::new_v4();
        let events = [
            insemination(a, day(0)),
            check(a, day(30), CheckResult::Positive),
            calving(a, day(282), false),
        ];
        let summary = aggregate(a, &events).unwrap();
        assert_eq!(summary.average_calving_interval, None);
    }

    /// An open, in-progress cycle contributes nothing to the averages.
    #[test]
    fn unfinished_cycle_adds_no_samples() {
        let a = Uuid::new_v4();
        let events = [
            calving(a, day(0), false),
            insemination(a, day(70)),
            check(a, day(100), CheckResult::Positive),
            // still pregnant, no second calving yet
        ];
        let summary = aggregate(a, &events).unwrap();
        assert_eq!(summary.average_days_open, None);
        assert_eq!(summary.average_pregnancy_period, None);
        // but the conception itself is already counted
        assert_eq!(summary.pregnancy_head_count, 1);
    }

    #[test]
    fn aggregate_is_deterministic() {
        let a = Uuid::new_v4();
        let events = [
            calving(a, day(0), false),
            insemination(a, day(60)),
            check(a, day(90), CheckResult::Positive),
            calving(a, day(342), false),
        ];
        let s1 = aggregate(a, &events).unwrap();
        let s2 = aggregate(a, &events).unwrap();
        assert_eq!(s1.average_days_open, s2.average_days_open);
        assert_eq!(s1.total_insemination_count, s2.total_insemination_count);
        assert_eq!(s1.pregnancy_success_rate, s2.pregnancy_success_rate);
    }
}
