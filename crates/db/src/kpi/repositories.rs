use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::kpi::models::{AlertRecord, HerdKpiSnapshotRecord, KpiFilter};
use herdbook_common::error::HerdbookResult;

#[async_trait]
pub trait KpiRepository: Send + Sync {
    async fn save_snapshot(
        &self,
        snapshot: HerdKpiSnapshotRecord,
    ) -> HerdbookResult<HerdKpiSnapshotRecord>;

    async fn get_latest(&self, farm_id: Uuid) -> HerdbookResult<Option<HerdKpiSnapshotRecord>>;

    /// Most recent snapshot whose period ended on or before `before`.
    async fn previous_snapshot(
        &self,
        farm_id: Uuid,
        before: NaiveDate,
    ) -> HerdbookResult<Option<HerdKpiSnapshotRecord>>;

    async fn list_snapshots(&self, filter: KpiFilter) -> HerdbookResult<Vec<HerdKpiSnapshotRecord>>;

    /// Insert fresh alert candidates or refresh the derived columns of ones
    /// already present. Must never change a stored `status`.
    async fn upsert_alerts(&self, alerts: Vec<AlertRecord>) -> HerdbookResult<Vec<AlertRecord>>;

    async fn list_active_alerts(&self, farm_id: Uuid) -> HerdbookResult<Vec<AlertRecord>>;

    /// The human side of the alert lifecycle: active -> acknowledged ->
    /// resolved, or dismissed at any point.
    async fn update_alert_status(
        &self,
        alert_id: Uuid,
        status: &str,
    ) -> HerdbookResult<Option<AlertRecord>>;
}
