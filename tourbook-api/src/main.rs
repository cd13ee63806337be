use anyhow::Context;
use std::sync::Arc;
use tourbook_agent::{AgentSettings, TourAgent};
use tourbook_api::{app, AppState};
use tourbook_core::{BookingRepository, BookingService, TourQueryService, TourRepository};
use tourbook_store::app_config::Config;
use tourbook_store::seed::seed_if_empty;
use tourbook_store::{DbClient, MemoryStore, PgBookingRepository, PgTourRepository};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourbook_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("loading configuration")?;
    info!("Starting {} {} on port {}", config.app.name, config.app.version, config.server.port);

    let (tour_repo, booking_repo): (Arc<dyn TourRepository>, Arc<dyn BookingRepository>) =
        if config.database.is_memory() {
            info!("using the in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        } else {
            let db = DbClient::new(&config.database)
                .await
                .context("connecting to the database")?;
            db.migrate().await.context("running migrations")?;
            (
                Arc::new(PgTourRepository::new(db.pool.clone())),
                Arc::new(PgBookingRepository::new(db.pool.clone())),
            )
        };

    if config.database.seed_sample_data {
        seed_if_empty(tour_repo.as_ref())
            .await
            .context("seeding sample tours")?;
    }

    let state = AppState {
        tours: TourQueryService::new(tour_repo),
        bookings: BookingService::new(booking_repo),
        agent: build_agent(),
        version: config.app.version.clone(),
        cors_origins: config.app.cors_origins.clone(),
    };

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("binding {}:{}", config.server.host, config.server.port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The agent is built once here; a broken agent config disables chat instead of the whole API.
fn build_agent() -> Option<Arc<TourAgent>> {
    let settings = match AgentSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "agent settings unreadable, chat disabled");
            return None;
        }
    };
    if !settings.is_ready() {
        info!("chat agent disabled (turned off or no API key)");
        return None;
    }
    match TourAgent::from_settings(&settings) {
        Ok(agent) => Some(Arc::new(agent)),
        Err(e) => {
            warn!(error = %e, "could not build chat agent, chat disabled");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
