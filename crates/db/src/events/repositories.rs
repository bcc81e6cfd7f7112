use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::events::models::ReproEventRecord;
use herdbook_common::error::HerdbookResult;

/// Read contract the breeding engine consumes. Events come back ascending
/// by occurrence time; the engine re-sorts defensively either way.
#[async_trait]
pub trait ReproEventRepository: Send + Sync {
    async fn events_for_animal(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
    ) -> HerdbookResult<Vec<ReproEventRecord>>;

    /// Full histories for every animal of a farm, keyed by animal id.
    async fn events_by_animal(
        &self,
        farm_id: Uuid,
    ) -> HerdbookResult<HashMap<Uuid, Vec<ReproEventRecord>>>;

    /// Farms that have at least one event on record.
    async fn farms_with_events(&self) -> HerdbookResult<Vec<Uuid>>;
}
