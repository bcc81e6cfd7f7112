use serde::{Deserialize, Serialize};

use crate::error::BreedingError;

/// Severity bands for a monotonically increasing signal.
///
/// A value below `low_from` raises nothing; `[low_from, medium_from)` is low,
/// `[medium_from, high_from)` is medium, `high_from` and above is high.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityBands {
    pub low_from: i64,
    pub medium_from: i64,
    pub high_from: i64,
}

impl SeverityBands {
    fn validate(&self, name: &str) -> Result<(), String> {
        if self.low_from <= 0 {
            return Err(format!("{name}.low_from must be positive"));
        }
        if !(self.low_from < self.medium_from && self.medium_from < self.high_from) {
            return Err(format!("{name} bands must be strictly increasing"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Days-open bands: 61-90 low, 91-120 medium, >120 high.
    pub days_open: SeverityBands,
    /// Services-per-cycle bands: 3 low, 4 medium, 5+ high.
    pub services: SeverityBands,
    /// How many days before a scheduled pregnancy check the reminder fires.
    pub check_due_lead_days: i64,
    /// How many days before the expected calving date the reminder fires.
    pub calving_lead_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            days_open: SeverityBands {
                low_from: 61,
                medium_from: 91,
                high_from: 121,
            },
            services: SeverityBands {
                low_from: 3,
                medium_from: 4,
                high_from: 5,
            },
            check_due_lead_days: 7,
            calving_lead_days: 14,
        }
    }
}

/// Per-farm tunables for the breeding engine.
///
/// Thresholds are configuration rather than constants so a farm can adjust
/// them without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingConfig {
    /// Target gestation length in days.
    pub gestation_days: i64,
    /// Days after an insemination at which the pregnancy check is scheduled.
    pub pregnancy_check_offset_days: i64,
    pub alerts: AlertThresholds,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            gestation_days: 282,
            pregnancy_check_offset_days: 30,
            alerts: AlertThresholds::default(),
        }
    }
}

impl BreedingConfig {
    /// Reject unusable thresholds up front; services call this at startup so
    /// a bad config never reaches per-animal computation.
    pub fn validate(&self) -> Result<(), BreedingError> {
        if self.gestation_days <= 0 {
            return Err(BreedingError::Config(
                "gestation_days must be positive".to_owned(),
            ));
        }
        if self.pregnancy_check_offset_days <= 0 {
            return Err(BreedingError::Config(
                "pregnancy_check_offset_days must be positive".to_owned(),
            ));
        }
        if self.alerts.check_due_lead_days < 0 || self.alerts.calving_lead_days < 0 {
            return Err(BreedingError::Config(
                "alert lead days must not be negative".to_owned(),
            ));
        }
        self.alerts
            .days_open
            .validate("alerts.days_open")
            .map_err(BreedingError::Config)?;
        self.alerts
            .services
            .validate("alerts.services")
            .map_err(BreedingError::Config)?;
        Ok(())
    }
}
