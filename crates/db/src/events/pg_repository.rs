use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::events::models::ReproEventRecord;
use crate::events::repositories::ReproEventRepository;
use herdbook_common::error::{HerdbookError, HerdbookResult};

#[derive(Clone)]
pub struct PgReproEventRepository {
    pool: PgPool,
}

impl PgReproEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReproEventRepository for PgReproEventRepository {
    async fn events_for_animal(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
    ) -> HerdbookResult<Vec<ReproEventRecord>> {
        let rows = sqlx::query(
            "select id, farm_id, animal_id, event_type, occurred_at,
                    check_result, difficult_birth, memo, created_at
             from repro_events
             where farm_id = $1 and animal_id = $2
             order by occurred_at asc",
        )
        .bind(farm_id)
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(rows.iter().map(map_event_row).collect())
    }

    async fn events_by_animal(
        &self,
        farm_id: Uuid,
    ) -> HerdbookResult<HashMap<Uuid, Vec<ReproEventRecord>>> {
        let rows = sqlx::query(
            "select id, farm_id, animal_id, event_type, occurred_at,
                    check_result, difficult_birth, memo, created_at
             from repro_events
             where farm_id = $1
             order by animal_id, occurred_at asc",
        )
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        let mut by_animal: HashMap<Uuid, Vec<ReproEventRecord>> = HashMap::new();
        for row in &rows {
            let record = map_event_row(row);
            by_animal.entry(record.animal_id).or_default().push(record);
        }
        Ok(by_animal)
    }

    async fn farms_with_events(&self) -> HerdbookResult<Vec<Uuid>> {
        let rows = sqlx::query("select distinct farm_id from repro_events")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(rows.iter().map(|r| r.get("farm_id")).collect())
    }
}

fn map_event_row(row: &sqlx::postgres::PgRow) -> ReproEventRecord {
    ReproEventRecord {
        id: row.get("id"),
        farm_id: row.get("farm_id"),
        animal_id: row.get("animal_id"),
        event_type: row.get("event_type"),
        occurred_at: row.get("occurred_at"),
        check_result: row.get("check_result"),
        difficult_birth: row.get("difficult_birth"),
        memo: row.get("memo"),
        created_at: row.get("created_at"),
    }
}
