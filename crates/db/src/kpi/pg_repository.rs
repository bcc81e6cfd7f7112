use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::kpi::models::{AlertRecord, HerdKpiSnapshotRecord, KpiFilter};
use crate::kpi::repositories::KpiRepository;
use herdbook_common::error::{HerdbookError, HerdbookResult};

#[derive(Clone)]
pub struct PgKpiRepository {
    pool: PgPool,
}

impl PgKpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KpiRepository for PgKpiRepository {
    async fn save_snapshot(
        &self,
        snapshot: HerdKpiSnapshotRecord,
    ) -> HerdbookResult<HerdKpiSnapshotRecord> {
        let row = sqlx::query(
            "insert into herd_kpi_snapshots
             (id, farm_id, period_start, period_end, conception_rate, avg_days_open,
              avg_calving_interval, ai_per_conception, excluded_animals,
              computed_at, created_at)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             on conflict (farm_id, period_start, period_end)
             do update set
               conception_rate = excluded.conception_rate,
               avg_days_open = excluded.avg_days_open,
               avg_calving_interval = excluded.avg_calving_interval,
               ai_per_conception = excluded.ai_per_conception,
               excluded_animals = excluded.excluded_animals,
               computed_at = excluded.computed_at
             returning id, farm_id, period_start, period_end, conception_rate,
                       avg_days_open, avg_calving_interval, ai_per_conception,
                       excluded_animals, computed_at, created_at",
        )
        .bind(snapshot.id)
        .bind(snapshot.farm_id)
        .bind(snapshot.period_start)
        .bind(snapshot.period_end)
        .bind(snapshot.conception_rate)
        .bind(snapshot.avg_days_open)
        .bind(snapshot.avg_calving_interval)
        .bind(snapshot.ai_per_conception)
        .bind(snapshot.excluded_animals)
        .bind(snapshot.computed_at)
        .bind(snapshot.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(map_snapshot_row(&row))
    }

    async fn get_latest(&self, farm_id: Uuid) -> HerdbookResult<Option<HerdKpiSnapshotRecord>> {
        let row = sqlx::query(
            "select id, farm_id, period_start, period_end, conception_rate,
                    avg_days_open, avg_calving_interval, ai_per_conception,
                    excluded_animals, computed_at, created_at
             from herd_kpi_snapshots
             where farm_id = $1
             order by period_end desc, computed_at desc
             limit 1",
        )
        .bind(farm_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(row.map(|r| map_snapshot_row(&r)))
    }

    async fn previous_snapshot(
        &self,
        farm_id: Uuid,
        before: NaiveDate,
    ) -> HerdbookResult<Option<HerdKpiSnapshotRecord>> {
        let row = sqlx::query(
            "select id, farm_id, period_start, period_end, conception_rate,
                    avg_days_open, avg_calving_interval, ai_per_conception,
                    excluded_animals, computed_at, created_at
             from herd_kpi_snapshots
             where farm_id = $1 and period_end <= $2
             order by period_end desc, computed_at desc
             limit 1",
        )
        .bind(farm_id)
        .bind(before)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(row.map(|r| map_snapshot_row(&r)))
    }

    async fn list_snapshots(
        &self,
        filter: KpiFilter,
    ) -> HerdbookResult<Vec<HerdKpiSnapshotRecord>> {
        let mut qb = QueryBuilder::new(
            "select id, farm_id, period_start, period_end, conception_rate, \
             avg_days_open, avg_calving_interval, ai_per_conception, \
             excluded_animals, computed_at, created_at \
             from herd_kpi_snapshots where 1=1",
        );

        if let Some(farm_id) = filter.farm_id {
            qb.push(" and farm_id = ").push_bind(farm_id);
        }
        if let Some(start) = filter.period_start {
            qb.push(" and period_start >= ").push_bind(start);
        }
        if let Some(end) = filter.period_end {
            qb.push(" and period_end <= ").push_bind(end);
        }

        qb.push(" order by period_end desc, computed_at desc");
        qb.push(" limit ").push_bind(filter.limit.unwrap_or(50));
        qb.push(" offset ").push_bind(filter.offset.unwrap_or(0));

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(rows.iter().map(map_snapshot_row).collect())
    }

    async fn upsert_alerts(&self, alerts: Vec<AlertRecord>) -> HerdbookResult<Vec<AlertRecord>> {
        let mut saved = Vec::with_capacity(alerts.len());

        for alert in alerts {
            // status is absent from the update set: once a person has
            // acknowledged or dismissed an alert, a recompute that produces
            // the same stable id must not reopen it.
            let row = sqlx::query(
                "insert into breeding_alerts
                 (id, farm_id, animal_id, alert_type, severity, due_at,
                  message, status, created_at, updated_at)
                 values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 on conflict (id)
                 do update set
                   severity = excluded.severity,
                   due_at = excluded.due_at,
                   message = excluded.message,
                   updated_at = excluded.updated_at
                 returning id, farm_id, animal_id, alert_type, severity, due_at,
                           message, status, created_at, updated_at",
            )
            .bind(alert.id)
            .bind(alert.farm_id)
            .bind(alert.animal_id)
            .bind(&alert.alert_type)
            .bind(&alert.severity)
            .bind(alert.due_at)
            .bind(&alert.message)
            .bind(&alert.status)
            .bind(alert.created_at)
            .bind(alert.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HerdbookError::Database(e.to_string()))?;

            saved.push(map_alert_row(&row));
        }

        Ok(saved)
    }

    async fn list_active_alerts(&self, farm_id: Uuid) -> HerdbookResult<Vec<AlertRecord>> {
        let rows = sqlx::query(
            "select id, farm_id, animal_id, alert_type, severity, due_at,
                    message, status, created_at, updated_at
             from breeding_alerts
             where farm_id = $1 and status = 'active'
             order by due_at asc nulls last, created_at desc",
        )
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(rows.iter().map(map_alert_row).collect())
    }

    async fn update_alert_status(
        &self,
        alert_id: Uuid,
        status: &str,
    ) -> HerdbookResult<Option<AlertRecord>> {
        let row = sqlx::query(
            "update breeding_alerts
             set status = $2, updated_at = now()
             where id = $1
             returning id, farm_id, animal_id, alert_type, severity, due_at,
                       message, status, created_at, updated_at",
        )
        .bind(alert_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HerdbookError::Database(e.to_string()))?;

        Ok(row.map(|r| map_alert_row(&r)))
    }
}

fn map_snapshot_row(row: &sqlx::postgres::PgRow) -> HerdKpiSnapshotRecord {
    HerdKpiSnapshotRecord {
        id: row.get("id"),
        farm_id: row.get("farm_id"),
        period_start: row.get("period_start"),
        period_end: row.get("period_end"),
        conception_rate: row.get("conception_rate"),
        avg_days_open: row.get("avg_days_open"),
        avg_calving_interval: row.get("avg_calving_interval"),
        ai_per_conception: row.get("ai_per_conception"),
        excluded_animals: row.get("excluded_animals"),
        computed_at: row.get("computed_at"),
        created_at: row.get("created_at"),
    }
}

fn map_alert_row(row: &sqlx::postgres::PgRow) -> AlertRecord {
    AlertRecord {
        id: row.get("id"),
        farm_id: row.get("farm_id"),
        animal_id: row.get("animal_id"),
        alert_type: row.get("alert_type"),
        severity: row.get("severity"),
        due_at: row.get("due_at"),
        message: row.get("message"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
