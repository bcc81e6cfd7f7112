use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use herdbook_breeding::alert::derive_alerts;
use herdbook_breeding::event::ReproEvent;
use herdbook_breeding::herd::{delta, snapshot_herd, Period};
use herdbook_breeding::status::{resolve, BreedingStatus};
use herdbook_breeding::summary::aggregate;
use herdbook_breeding::BreedingConfig;
use herdbook_common::error::HerdbookResult;
use herdbook_db::breeding::models::BreedingStatusRecord;
use herdbook_db::breeding::repositories::BreedingStatusRepository;
use herdbook_db::events::repositories::ReproEventRepository;
use herdbook_db::kpi::models::{AlertRecord, HerdKpiSnapshotRecord};
use herdbook_db::kpi::repositories::KpiRepository;

/// What one farm recompute produced.
#[derive(Debug)]
pub struct RecomputeOutcome {
    pub animals: usize,
    pub failed: usize,
    pub alerts: usize,
}

/// Recomputes breeding statuses, lifetime summaries, the monthly herd KPI
/// snapshot, and alerts for whole farms. The engine itself is pure; this
/// service owns all the fetching and persisting around it.
pub struct BreedingService<E, S, K> {
    events: E,
    statuses: S,
    kpi: K,
    config: BreedingConfig,
}

impl<E, S, K> BreedingService<E, S, K>
where
    E: ReproEventRepository,
    S: BreedingStatusRepository,
    K: KpiRepository,
{
    pub fn new(events: E, statuses: S, kpi: K, config: BreedingConfig) -> Self {
        Self {
            events,
            statuses,
            kpi,
            config,
        }
    }

    /// Recompute every farm that has events on record.
    ///
    /// A failing farm is logged and skipped so one broken herd cannot stall
    /// the rest of the pass.
    pub async fn recompute_all(&self, as_of: DateTime<Utc>) -> HerdbookResult<()> {
        let farms = self.events.farms_with_events().await?;
        tracing::info!(farms = farms.len(), "starting recompute pass");

        for farm_id in farms {
            match self.recompute_farm(farm_id, as_of).await {
                Ok(outcome) => tracing::info!(
                    %farm_id,
                    animals = outcome.animals,
                    failed = outcome.failed,
                    alerts = outcome.alerts,
                    "farm recomputed"
                ),
                Err(e) => tracing::error!(%farm_id, error = %e, "farm recompute failed"),
            }
        }
        Ok(())
    }

    /// Recompute one farm as of the given instant.
    ///
    /// Per-animal resolution fans out independently: an animal with an
    /// unusable history is logged, counted, and skipped, never fatal for
    /// the herd (its exclusion count is stored on the snapshot).
    pub async fn recompute_farm(
        &self,
        farm_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> HerdbookResult<RecomputeOutcome> {
        let histories = self.events.events_by_animal(farm_id).await?;

        // ── Per-animal status + lifetime summary ─────────────────────
        let mut statuses: Vec<BreedingStatus> = Vec::new();
        let mut failed = 0usize;
        let mut herd_events: HashMap<Uuid, Vec<ReproEvent>> = HashMap::new();

        for (animal_id, records) in &histories {
            let events: Vec<ReproEvent> = records.iter().map(|r| r.to_event()).collect();

            let projected = resolve(*animal_id, &events, as_of, &self.config)
                .and_then(|status| aggregate(*animal_id, &events).map(|summary| (status, summary)));

            match projected {
                Ok((status, summary)) => {
                    let record =
                        BreedingStatusRecord::from_parts(farm_id, &status, &summary, as_of);
                    self.statuses.upsert_status(record).await?;
                    statuses.push(status);
                }
                Err(e) => {
                    tracing::warn!(%animal_id, error = %e, "skipping animal");
                    failed += 1;
                }
            }

            herd_events.insert(*animal_id, events);
        }

        // ── Monthly herd snapshot + trend ────────────────────────────
        let period = Period::month_of(as_of.date_naive());
        let herd = snapshot_herd(&herd_events, period);
        let snapshot_record = HerdKpiSnapshotRecord::new(
            farm_id,
            period,
            &herd.snapshot,
            herd.excluded_count() as i32,
            as_of,
        );
        let saved = self.kpi.save_snapshot(snapshot_record).await?;

        if let Some(previous) = self.kpi.previous_snapshot(farm_id, period.start).await? {
            let trend = delta(period.start, &saved.kpi(), &previous.kpi());
            tracing::info!(
                %farm_id,
                month = %trend.month,
                conception_rate = ?trend.conception_rate,
                avg_days_open = ?trend.avg_days_open,
                avg_calving_interval = ?trend.avg_calving_interval,
                ai_per_conception = ?trend.ai_per_conception,
                "month-over-month KPI delta"
            );
        }

        // ── Alerts ───────────────────────────────────────────────────
        let alerts = derive_alerts(&statuses, as_of, &self.config);
        let alert_count = alerts.len();
        if !alerts.is_empty() {
            let records: Vec<AlertRecord> = alerts
                .iter()
                .map(|a| AlertRecord::from_alert(farm_id, a, as_of))
                .collect();
            self.kpi.upsert_alerts(records).await?;
        }

        Ok(RecomputeOutcome {
            animals: statuses.len(),
            failed,
            alerts: alert_count,
        })
    }
}
