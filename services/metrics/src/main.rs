mod breeding;

use std::time::Duration;

use chrono::Utc;

use breeding::BreedingService;
use herdbook_breeding::BreedingConfig;
use herdbook_common::types::ServiceInfo;
use herdbook_config::{init_tracing, AppConfig};
use herdbook_db::breeding::pg_repository::PgBreedingStatusRepository;
use herdbook_db::events::pg_repository::PgReproEventRepository;
use herdbook_db::kpi::pg_repository::PgKpiRepository;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let breeding_config = BreedingConfig::default();
    breeding_config
        .validate()
        .expect("invalid breeding thresholds");

    let info = ServiceInfo::new("herdbook-metrics");
    tracing::info!(service = %info.name, version = %info.version, "starting");

    let pool = herdbook_db::create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");

    let service = BreedingService::new(
        PgReproEventRepository::new(pool.clone()),
        PgBreedingStatusRepository::new(pool.clone()),
        PgKpiRepository::new(pool),
        breeding_config,
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(config.recompute_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = service.recompute_all(Utc::now()).await {
                    tracing::error!(error = %e, "recompute pass failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }
}
