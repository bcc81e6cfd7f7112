use async_trait::async_trait;
use uuid::Uuid;

use crate::breeding::models::BreedingStatusRecord;
use herdbook_common::error::HerdbookResult;

#[async_trait]
pub trait BreedingStatusRepository: Send + Sync {
    /// Insert or overwrite the computed columns for an animal. The stored
    /// `breeding_memo` must survive the upsert untouched.
    async fn upsert_status(
        &self,
        record: BreedingStatusRecord,
    ) -> HerdbookResult<BreedingStatusRecord>;

    async fn get_status(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
    ) -> HerdbookResult<Option<BreedingStatusRecord>>;

    async fn list_statuses(&self, farm_id: Uuid) -> HerdbookResult<Vec<BreedingStatusRecord>>;

    /// Human-edited free text; the only externally mutable column.
    async fn set_memo(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
        memo: Option<String>,
    ) -> HerdbookResult<()>;
}
