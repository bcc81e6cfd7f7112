use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BreedingError;
use crate::event::{CheckResult, ReproEvent, ReproEventKind};
use crate::stats::days_between;

/// Where an animal stands in its breeding cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Open,
    Inseminated,
    Pregnant,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Inseminated => "inseminated",
            Self::Pregnant => "pregnant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "inseminated" => Some(Self::Inseminated),
            "pregnant" => Some(Self::Pregnant),
            _ => None,
        }
    }
}

/// One insemination, with the days-open reading at that moment.
#[derive(Debug, Clone)]
pub(crate) struct ServiceRecord {
    pub at: DateTime<Utc>,
    pub days_open: Option<i64>,
}

/// First positive pregnancy check of a cycle.
#[derive(Debug, Clone)]
pub(crate) struct ConceptionRecord {
    pub confirmed_at: DateTime<Utc>,
    /// Inseminations consumed by the cycle up to confirmation.
    pub services: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct CalvingRecord {
    pub at: DateTime<Utc>,
    /// Days since the previous calving; None for the first calving on record.
    pub interval_days: Option<i64>,
    pub difficult: bool,
}

/// A completed cycle that reached confirmed pregnancy.
#[derive(Debug, Clone)]
pub(crate) struct PregnantCycle {
    /// Reference point to the conceiving insemination.
    pub days_open: Option<i64>,
    /// Conceiving insemination to the cycle-ending event.
    pub pregnancy_days: Option<i64>,
}

/// Fold accumulator for one animal's event history.
///
/// This is the single reducer behind the status resolver, the lifetime
/// aggregator, and the herd KPI aggregator: the resolver reads the final
/// state fields, the aggregators read the accumulated sample records.
#[derive(Debug, Clone)]
pub(crate) struct CycleFold {
    pub state: CycleState,
    pub parity: u32,
    pub arrival: Option<DateTime<Utc>>,
    pub last_calving: Option<DateTime<Utc>>,
    /// Most recent insemination of the current open cycle.
    pub last_insemination: Option<DateTime<Utc>>,
    /// Inseminations within the current cycle; resets when the cycle ends.
    pub cycle_services: u32,
    /// Date of the insemination that led to the current confirmed pregnancy.
    pub pregnancy_start: Option<DateTime<Utc>>,
    /// Whether the current cycle has ever reached Pregnant.
    cycle_conceived: bool,
    pub is_difficult_birth: Option<bool>,

    // lifetime accumulators
    pub total_services: u64,
    pub difficult_births: u32,
    pub conceived_cycles: u32,
    pub services: Vec<ServiceRecord>,
    pub conceptions: Vec<ConceptionRecord>,
    pub calvings: Vec<CalvingRecord>,
    pub pregnant_cycles: Vec<PregnantCycle>,
}

impl CycleFold {
    fn new() -> Self {
        Self {
            state: CycleState::Open,
            parity: 0,
            arrival: None,
            last_calving: None,
            last_insemination: None,
            cycle_services: 0,
            pregnancy_start: None,
            cycle_conceived: false,
            is_difficult_birth: None,
            total_services: 0,
            difficult_births: 0,
            conceived_cycles: 0,
            services: Vec::new(),
            conceptions: Vec::new(),
            calvings: Vec::new(),
            pregnant_cycles: Vec::new(),
        }
    }

    /// Replay a history in chronological order. The input is copied and
    /// sorted, so shuffled streams produce the same fold as pre-sorted ones.
    pub(crate) fn replay(animal_id: Uuid, events: &[ReproEvent]) -> Result<Self, BreedingError> {
        let mut ordered: Vec<&ReproEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.occurred_at);

        let mut fold = Self::new();
        for event in ordered {
            fold.apply(animal_id, event)?;
        }
        Ok(fold)
    }

    /// Days-open reference point: the later of the last calving and the
    /// farm-arrival date. Abortion and stillbirth do not move it.
    pub(crate) fn reference(&self) -> Option<DateTime<Utc>> {
        match (self.last_calving, self.arrival) {
            (Some(c), Some(a)) => Some(c.max(a)),
            (Some(c), None) => Some(c),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    fn apply(&mut self, animal_id: Uuid, event: &ReproEvent) -> Result<(), BreedingError> {
        let at = event.occurred_at;
        match &event.kind {
            ReproEventKind::Insemination => {
                // Re-service from Pregnant drops the confirmed pregnancy;
                // the cycle keeps counting services either way.
                self.state = CycleState::Inseminated;
                self.pregnancy_start = None;
                self.cycle_services += 1;
                self.total_services += 1;
                self.last_insemination = Some(at);
                self.services.push(ServiceRecord {
                    at,
                    days_open: self.reference().map(|r| days_between(r, at)),
                });
            }
            ReproEventKind::PregnancyCheck => {
                let result =
                    event
                        .check_result
                        .ok_or_else(|| BreedingError::MalformedEvent {
                            animal_id,
                            reason: format!("pregnancy check at {at} has no result"),
                        })?;
                // A check only means something while a service is pending.
                if self.state == CycleState::Inseminated {
                    match result {
                        CheckResult::Positive => {
                            self.state = CycleState::Pregnant;
                            self.pregnancy_start = self.last_insemination;
                            if !self.cycle_conceived {
                                self.cycle_conceived = true;
                                self.conceived_cycles += 1;
                                self.conceptions.push(ConceptionRecord {
                                    confirmed_at: at,
                                    services: self.cycle_services,
                                });
                            }
                        }
                        CheckResult::Negative => {
                            // Back to open; the cycle and its service count
                            // carry on until a calving or loss ends it.
                            self.state = CycleState::Open;
                        }
                    }
                }
            }
            ReproEventKind::Calving => {
                let difficult = event.difficult_birth.unwrap_or(false);
                self.parity += 1;
                if difficult {
                    self.difficult_births += 1;
                }
                self.is_difficult_birth = Some(difficult);
                self.calvings.push(CalvingRecord {
                    at,
                    interval_days: self.last_calving.map(|prev| days_between(prev, at)),
                    difficult,
                });
                if self.cycle_conceived {
                    self.record_pregnant_cycle(at);
                }
                self.close_cycle();
                self.last_calving = Some(at);
            }
            ReproEventKind::Abortion | ReproEventKind::Stillbirth => {
                // Ends the cycle without a parity increment and without
                // moving the days-open reference point.
                if self.cycle_conceived {
                    self.record_pregnant_cycle(at);
                }
                self.close_cycle();
            }
            ReproEventKind::Arrival => {
                self.arrival = Some(at);
            }
            ReproEventKind::Other(_) => {}
        }
        Ok(())
    }

    fn record_pregnant_cycle(&mut self, ended_at: DateTime<Utc>) {
        // The conceiving insemination is the pregnancy start; if a re-service
        // cleared it, fall back to the most recent insemination.
        let conceived_at = self.pregnancy_start.or(self.last_insemination);
        self.pregnant_cycles.push(PregnantCycle {
            days_open: conceived_at.and_then(|c| self.reference().map(|r| days_between(r, c))),
            pregnancy_days: self.pregnancy_start.map(|p| days_between(p, ended_at)),
        });
    }

    fn close_cycle(&mut self) {
        self.state = CycleState::Open;
        self.last_insemination = None;
        self.cycle_services = 0;
        self.pregnancy_start = None;
        self.cycle_conceived = false;
    }
}
