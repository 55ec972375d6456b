//! # Relief API Server
//!
//! Actix-web entry point. Wires the configured cache, notification bus and
//! geocoder into shared state and serves the HTTP API.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);
    config.warn_rejected();

    tracing::info!(
        "Starting Relief API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    #[cfg(feature = "scheduler")]
    let mut scheduler = start_scheduler(&config, &state).await?;
    #[cfg(not(feature = "scheduler"))]
    warn_scheduler_disabled(&config);

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    stop_scheduler(scheduler.as_mut()).await?;

    Ok(())
}

#[cfg(feature = "scheduler")]
async fn start_scheduler(
    config: &AppConfig,
    state: &AppState,
) -> anyhow::Result<Option<background::Scheduler>> {
    let Some(schedule) = config.purge_schedule.as_deref() else {
        return Ok(None);
    };

    let scheduler = background::Scheduler::new().await?;
    background::register_purge_job(&scheduler, schedule, state.cache.clone()).await?;
    scheduler.start().await?;
    Ok(Some(scheduler))
}

#[cfg(feature = "scheduler")]
async fn stop_scheduler(scheduler: Option<&mut background::Scheduler>) -> anyhow::Result<()> {
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await?;
    }
    Ok(())
}

#[cfg(not(feature = "scheduler"))]
fn warn_scheduler_disabled(config: &AppConfig) {
    if config.purge_schedule.is_some() {
        tracing::warn!("CACHE_PURGE_SCHEDULE is set but the scheduler feature is disabled");
    }
}
