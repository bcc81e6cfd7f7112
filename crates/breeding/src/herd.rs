use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::CycleFold;
use crate::error::BreedingError;
use crate::event::ReproEvent;
use crate::stats::mean;

/// Half-open reporting window `[start, end)` in calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        }
        .unwrap_or(start);
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        self.start <= date && date < self.end
    }
}

/// Herd-wide KPI values for one period. Each metric is independently None
/// when its sample count is zero; never coerced to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HerdKpiSnapshot {
    /// In-period conceptions / in-period inseminations x 100.
    pub conception_rate: Option<f64>,
    /// Mean days open at insemination, over in-period inseminations.
    pub avg_days_open: Option<f64>,
    /// Mean days between an in-period calving and the one before it.
    pub avg_calving_interval: Option<f64>,
    /// Mean inseminations consumed per cycle confirmed in-period.
    pub ai_per_conception: Option<f64>,
}

/// Snapshot plus the animals excluded from it.
#[derive(Debug)]
pub struct HerdAggregation {
    pub snapshot: HerdKpiSnapshot,
    /// Per-animal failures; these animals are skipped, not fatal.
    pub failures: Vec<BreedingError>,
}

impl HerdAggregation {
    pub fn excluded_count(&self) -> usize {
        self.failures.len()
    }
}

/// Compute the herd KPI snapshot for a period.
///
/// Each animal's full history is replayed (intervals may reach back before
/// the period), then samples are kept only where the triggering event falls
/// inside `period`. A malformed animal is excluded and reported in
/// `failures` without failing the rest of the herd.
pub fn snapshot_herd(
    herd_events: &HashMap<Uuid, Vec<ReproEvent>>,
    period: Period,
) -> HerdAggregation {
    let mut failures = Vec::new();

    let mut inseminations_in_period: u64 = 0;
    let mut conceptions_in_period: u64 = 0;
    let mut days_open_samples: Vec<i64> = Vec::new();
    let mut interval_samples: Vec<i64> = Vec::new();
    let mut services_per_conception: Vec<i64> = Vec::new();

    for (animal_id, events) in herd_events {
        let fold = match CycleFold::replay(*animal_id, events) {
            Ok(fold) => fold,
            Err(e) => {
                failures.push(e);
                continue;
            }
        };

        for service in fold.services.iter().filter(|s| period.contains(s.at)) {
            inseminations_in_period += 1;
            if let Some(days) = service.days_open {
                days_open_samples.push(days);
            }
        }

        for conception in fold
            .conceptions
            .iter()
            .filter(|c| period.contains(c.confirmed_at))
        {
            conceptions_in_period += 1;
            services_per_conception.push(i64::from(conception.services));
        }

        for calving in fold.calvings.iter().filter(|c| period.contains(c.at)) {
            if let Some(interval) = calving.interval_days {
                interval_samples.push(interval);
            }
        }
    }

    let conception_rate = if inseminations_in_period > 0 {
        Some(conceptions_in_period as f64 / inseminations_in_period as f64 * 100.0)
    } else {
        None
    };

    HerdAggregation {
        snapshot: HerdKpiSnapshot {
            conception_rate,
            avg_days_open: mean(&days_open_samples),
            avg_calving_interval: mean(&interval_samples),
            ai_per_conception: mean(&services_per_conception),
        },
        failures,
    }
}

/// Month-over-month movement of each KPI; None wherever either side has no
/// data, so a missing month never masquerades as a change of zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiTrendDelta {
    pub month: NaiveDate,
    pub conception_rate: Option<f64>,
    pub avg_days_open: Option<f64>,
    pub avg_calving_interval: Option<f64>,
    pub ai_per_conception: Option<f64>,
}

/// Signed per-metric difference `current - previous`.
pub fn delta(month: NaiveDate, current: &HerdKpiSnapshot, previous: &HerdKpiSnapshot) -> KpiTrendDelta {
    fn diff(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
        match (current, previous) {
            (Some(c), Some(p)) => Some(c - p),
            _ => None,
        }
    }

    KpiTrendDelta {
        month,
        conception_rate: diff(current.conception_rate, previous.conception_rate),
        avg_days_open: diff(current.avg_days_open, previous.avg_days_open),
        avg_calving_interval: diff(current.avg_calving_interval, previous.avg_calving_interval),
        ai_per_conception: diff(current.ai_per_conception, previous.ai_per_conception),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CheckResult, ReproEventKind};
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn march() -> Period {
        Period {
            start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        }
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

    #[test]
    fn month_of_clips_to_calendar_month() {
        let period = Period::month_of(NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());

        let december = Period::month_of(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert_eq!(december.end, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }

    #[test]
    fn period_end_is_exclusive() {
        let period = march();
        assert!(period.contains(Utc.with_ymd_and_hms(2026, 3, 31, 23, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap()));
    }

    /// Ten animals inseminated in-period, six confirmed in-period: 60%.
    #[test]
    fn conception_rate_sixty_percent() {
        let mut herd: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();
        for i in 0..10 {
            let a = Uuid::new_v4();
            let mut events = vec![insemination(a, day(1))];
            if i < 6 {
                events.push(check(a, day(20), CheckResult::Positive));
            }
            herd.insert(a, events);
        }

        let agg = snapshot_herd(&herd, march());
        assert_eq!(agg.snapshot.conception_rate, Some(60.0));
        assert_eq!(agg.snapshot.ai_per_conception, Some(1.0));
        // Nobody has a calving or arrival on record, so days open has no
        // reference point and must stay None, not 0.
        assert_eq!(agg.snapshot.avg_days_open, None);
        assert_eq!(agg.snapshot.avg_calving_interval, None);
        assert!(agg.failures.is_empty());
    }

    #[test]
    fn avg_days_open_uses_in_period_inseminations() {
        let mut herd: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();

        let a = Uuid::new_v4();
        herd.insert(
            a,
            vec![calving(a, day(-80), false), insemination(a, day(0))],
        );
        let b = Uuid::new_v4();
        herd.insert(
            b,
            vec![calving(b, day(-100), false), insemination(b, day(20))],
        );
        // Out-of-period insemination must not contribute.
        let c = Uuid::new_v4();
        herd.insert(
            c,
            vec![calving(c, day(-50), false), insemination(c, day(60))],
        );

        let agg = snapshot_herd(&herd, march());
        // a: 80 days open at service, b: 120 -> mean 100
        assert_eq!(agg.snapshot.avg_days_open, Some(100.0));
    }

    #[test]
    fn calving_interval_reaches_back_before_period() {
        let mut herd: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();
        let a = Uuid::new_v4();
        herd.insert(
            a,
            vec![calving(a, day(-370), false), calving(a, day(10), false)],
        );

        let agg = snapshot_herd(&herd, march());
        assert_eq!(agg.snapshot.avg_calving_interval, Some(380.0));
        // One calving pair, no services in period.
        assert_eq!(agg.snapshot.conception_rate, None);
    }

    #[test]
    fn ai_per_conception_counts_cycle_services() {
        let mut herd: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();
        let a = Uuid::new_v4();
        herd.insert(
            a,
            vec![
                insemination(a, day(-40)),
                insemination(a, day(-19)),
                insemination(a, day(2)),
                check(a, day(25), CheckResult::Positive),
            ],
        );

        let agg = snapshot_herd(&herd, march());
        // Confirmation in-period, cycle consumed 3 services.
        assert_eq!(agg.snapshot.ai_per_conception, Some(3.0));
        // Only one of those services was in-period.
        assert_eq!(agg.snapshot.conception_rate, Some(100.0));
    }

    #[test]
    fn malformed_animal_is_excluded_not_fatal() {
        let mut herd: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();

        let good = Uuid::new_v4();
        herd.insert(
            good,
            vec![
                insemination(good, day(1)),
                check(good, day(20), CheckResult::Positive),
            ],
        );

        let bad = Uuid::new_v4();
        let mut broken = check(bad, day(5), CheckResult::Positive);
        broken.check_result = None;
        herd.insert(bad, vec![insemination(bad, day(1)), broken]);

        let agg = snapshot_herd(&herd, march());
        assert_eq!(agg.excluded_count(), 1);
        assert_eq!(agg.failures[0].animal_id(), Some(bad));
        // The good animal still produced a full snapshot.
        assert_eq!(agg.snapshot.conception_rate, Some(100.0));
    }

    #[test]
    fn empty_herd_yields_all_none() {
        let herd = HashMap::new();
        let agg = snapshot_herd(&herd, march());
        assert_eq!(agg.snapshot.conception_rate, None);
        assert_eq!(agg.snapshot.avg_days_open, None);
        assert_eq!(agg.snapshot.avg_calving_interval, None);
        assert_eq!(agg.snapshot.ai_per_conception, None);
    }

    #[test]
    fn delta_subtracts_per_metric() {
        let current = HerdKpiSnapshot {
            conception_rate: Some(55.0),
            avg_days_open: Some(98.0),
            avg_calving_interval: None,
            ai_per_conception: Some(2.1),
        };
        let previous = HerdKpiSnapshot {
            conception_rate: Some(60.0),
            avg_days_open: Some(90.0),
            avg_calving_interval: Some(400.0),
            ai_per_conception: None,
        };

        let month = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let d = delta(month, &current, &previous);
        assert_eq!(d.conception_rate, Some(-5.0));
        assert_eq!(d.avg_days_open, Some(8.0));
        // Null on either side propagates.
        assert_eq!(d.avg_calving_interval, None);
        assert_eq!(d.ai_per_conception, None);
    }
}
