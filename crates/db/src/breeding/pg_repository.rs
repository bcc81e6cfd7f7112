use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::breeding::models::BreedingStatusRecord;
use crate::breeding::repositories::BreedingStatusRepository;
use herdbook_common::error::{HerdbookError, HerdbookResult};

const STATUS_COLUMNS: &str = "farm_id, animal_id, state, parity, days_open, pregnancy_days,
     days_after_calving, days_after_insemination, insemination_count,
     expected_calving_date, scheduled_pregnancy_check_date, is_difficult_birth,
     total_insemination_count, average_days_open, average_pregnancy_period,
     average_calving_interval, difficult_birth_count, pregnancy_head_count,
     pregnancy_success_rate, breeding_memo, computed_at";

#[derive(Clone)]
pub struct PgBreedingStatusRepository {
    pool: PgPool,
}

impl PgBreedingStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BreedingStatusRepository for PgBreedingStatusRepository {
    async fn upsert_status(
        &self,
        record: BreedingStatusRecord,
    ) -> HerdbookResult<BreedingStatusRecord> {
        // breeding_memo is deliberately absent from the conflict update:
        // recomputation must not clobber what a person wrote.
        let row = sqlx::query(&format!(
            "insert into breeding_status ({STATUS_COLUMNS})
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                     $13, $14, $15, $16, $17, $18, $19, $20, $21)
             on conflict (farm_id, animal_id)
             do update set
               state = excluded.state,
               parity = excluded.parity,
               days_open = excluded.days_open,
               pregnancy_days = excluded.pregnancy_days,
               days_after_calving = excluded.days_after_calving,
               days_after_insemination = excluded.days_after_insemination,
               insemination_count = excluded.insemination_count,
               expected_calving_date = excluded.expected_calving_date,
               scheduled_pregnancy_check_date = excluded.scheduled_pregnancy_check_date,
               is_difficult_birth = excluded.is_difficult_birth,
               total_insemination_count = excluded.total_insemination_count,
               average_days_open = excluded.average_days_open,
               average_pregnancy_period = excluded.average_pregnancy_period,
               average_calving_interval = excluded.average_calving_interval,
               difficult_birth_count = excluded.difficult_birth_count,
               pregnancy_head_count = excluded.pregnancy_head_count,
               pregnancy_success_rate = excluded.pregnancy_success_rate,
               computed_at = excluded.computed_at
             returning {STATUS_COLUMNS}"
        ))
        .bind(record.farm_id)
        .bind(record.animal_id)
        .bind(&record.state)
        .bind(record.parity)
        .bind(record.days_open)
        .bind(record.pregnancy_days)
        .bind(record.days_after_calving)
        .bind(record.days_after_insemination)
        .bind(record.insemination_count)
        .bind(record.expected_calving_date)
        .bind(record.scheduled_pregnancy_check_date)
        .bind(record.is_difficult_birth)
        .bind(record.total_insemination_count)
        .bind(record.average_days_open)
        .bind(record.average_pregnancy_period)
        .bind(record.average_calving_interval)
        .bind(record.difficult_birth_count)
        .bind(record.pregnancy_head_count)
        .bind(record.pregnancy_success_rate)
        .bind(&record.breeding_memo)
        .bind(record.computed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(map_status_row(&row))
    }

    async fn get_status(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
    ) -> HerdbookResult<Option<BreedingStatusRecord>> {
        let row = sqlx::query(&format!(
            "select {STATUS_COLUMNS}
             from breeding_status
             where farm_id = $1 and animal_id = $2"
        ))
        .bind(farm_id)
        .bind(animal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(row.map(|r| map_status_row(&r)))
    }

    async fn list_statuses(&self, farm_id: Uuid) -> HerdbookResult<Vec<BreedingStatusRecord>> {
        let rows = sqlx::query(&format!(
            "select {STATUS_COLUMNS}
             from breeding_status
             where farm_id = $1
             order by animal_id"
        ))
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(rows.iter().map(map_status_row).collect())
    }

    async fn set_memo(
        &self,
        farm_id: Uuid,
        animal_id: Uuid,
        memo: Option<String>,
    ) -> HerdbookResult<()> {
        sqlx::query(
            "update breeding_status
             set breeding_memo = $3
             where farm_id = $1 and animal_id = $2",
        )
        .bind(farm_id)
        .bind(animal_id)
        .bind(memo)
        .execute(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;
        Ok(())
    }
}

fn map_status_row(row: &sqlx::postgres::PgRow) -> BreedingStatusRecord {
    BreedingStatusRecord {
        farm_id: row.get("farm_id"),
        animal_id: row.get("animal_id"),
        state: row.get("state"),
        parity: row.get("parity"),
        days_open: row.get("days_open"),
        pregnancy_days: row.get("pregnancy_days"),
        days_after_calving: row.get("days_after_calving"),
        days_after_insemination: row.get("days_after_insemination"),
        insemination_count: row.get("insemination_count"),
        expected_calving_date: row.get("expected_calving_date"),
        scheduled_pregnancy_check_date: row.get("scheduled_pregnancy_check_date"),
        is_difficult_birth: row.get("is_difficult_birth"),
        total_insemination_count: row.get("total_insemination_count"),
        average_days_open: row.get("average_days_open"),
        average_pregnancy_period: row.get("average_pregnancy_period"),
        average_calving_interval: row.get("average_calving_interval"),
        difficult_birth_count: row.get("difficult_birth_count"),
        pregnancy_head_count: row.get("pregnancy_head_count"),
        pregnancy_success_rate: row.get("pregnancy_success_rate"),
        breeding_memo: row.get("breeding_memo"),
        computed_at: row.get("computed_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;
    use chrono::Utc;

    async fn test_repo() -> Option<PgBreedingStatusRepository> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = create_pool(&url).await.expect("db should connect");

        sqlx::query(
            "create table if not exists breeding_status (
              farm_id uuid not null,
              animal_id uuid not null,
              state text not null,
              parity integer not null default 0,
              days_open bigint,
              pregnancy_days bigint,
              days_after_calving bigint,
              days_after_insemination bigint,
              insemination_count integer not null default 0,
              expected_calving_date timestamptz,
              scheduled_pregnancy_check_date timestamptz,
              is_difficult_birth boolean,
              total_insemination_count bigint not null default 0,
              average_days_open double precision,
              average_pregnancy_period double precision,
              average_calving_interval double precision,
              difficult_birth_count integer not null default 0,
              pregnancy_head_count integer not null default 0,
              pregnancy_success_rate double precision,
              breeding_memo text,
              computed_at timestamptz not null,
              primary key (farm_id, animal_id)
            )",
        )
        .execute(&pool)
        .await
        .expect("create breeding_status");

        Some(PgBreedingStatusRepository::new(pool))
    }

    fn make_record(farm_id: Uuid, animal_id: Uuid) -> BreedingStatusRecord {
        BreedingStatusRecord {
            farm_id,
            animal_id,
            state: "inseminated".to_owned(),
            parity: 1,
            days_open: Some(72),
            pregnancy_days: None,
            days_after_calving: Some(72),
            days_after_insemination: Some(0),
            insemination_count: 1,
            expected_calving_date: None,
            scheduled_pregnancy_check_date: Some(Utc::now()),
            is_difficult_birth: Some(false),
            total_insemination_count: 3,
            average_days_open: Some(80.0),
            average_pregnancy_period: Some(282.0),
            average_calving_interval: None,
            difficult_birth_count: 0,
            pregnancy_head_count: 1,
            pregnancy_success_rate: Some(33.3),
            breeding_memo: None,
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let repo = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let farm = Uuid::new_v4();
        let animal = Uuid::new_v4();

        let saved = repo.upsert_status(make_record(farm, animal)).await.expect("save");
        assert_eq!(saved.state, "inseminated");

        let fetched = repo.get_status(farm, animal).await.expect("get");
        let fetched = fetched.expect("row should exist");
        assert_eq!(fetched.days_open, Some(72));
        assert_eq!(fetched.pregnancy_days, None);
    }

    #[tokio::test]
    async fn upsert_preserves_breeding_memo() {
        let repo = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let farm = Uuid::new_v4();
        let animal = Uuid::new_v4();

        repo.upsert_status(make_record(farm, animal)).await.expect("save");
        repo.set_memo(farm, animal, Some("watch for heat around the 20th".to_owned()))
            .await
            .expect("set memo");

        // Recompute overwrites every derived column...
        let mut next = make_record(farm, animal);
        next.state = "pregnant".to_owned();
        next.pregnancy_days = Some(31);
        let saved = repo.upsert_status(next).await.expect("second save");

        // ...but the memo a person wrote stays.
        assert_eq!(saved.state, "pregnant");
        assert_eq!(
            saved.breeding_memo.as_deref(),
            Some("watch for heat around the 20th")
        );
    }

    #[tokio::test]
    async fn list_statuses_scopes_by_farm() {
        let repo = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let farm1 = Uuid::new_v4();
        let farm2 = Uuid::new_v4();

        repo.upsert_status(make_record(farm1, Uuid::new_v4())).await.expect("save");
        repo.upsert_status(make_record(farm1, Uuid::new_v4())).await.expect("save");
        repo.upsert_status(make_record(farm2, Uuid::new_v4())).await.expect("save");

        let statuses = repo.list_statuses(farm1).await.expect("list");
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.farm_id == farm1));
    }

    #[tokio::test]
    async fn get_status_missing_animal_is_none() {
        let repo = match test_repo().await {
            Some(r) => r,
            None => return,
        };
        let result = repo.get_status(Uuid::new_v4(), Uuid::new_v4()).await.expect("get");
        assert!(result.is_none());
    }
}
