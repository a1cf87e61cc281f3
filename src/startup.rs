//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::application::services::{Repositories, Services};
use crate::config::Settings;
use crate::infrastructure::mail::LogMailer;
use crate::infrastructure::{database, metrics, repositories};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, create_trace_layer, RateLimiter};
use crate::shared::snowflake::SnowflakeGenerator;

/// Expired sessions, reset tokens and rate-limit windows are swept this often
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(600);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<Settings>,
    pub services: Services,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings, services: Services) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limit));
        Self {
            db,
            settings: Arc::new(settings),
            services,
            rate_limiter,
        }
    }
}

/// Routes plus the outer middleware stack (tracing, CORS, compression)
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(create_trace_layer())
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id,
            settings.snowflake.epoch,
        ));

        let repos = repositories::postgres(db.clone());
        let services = Services::new(repos.clone(), Arc::new(LogMailer), snowflake, &settings)?;

        let addr = settings.server_addr();
        let state = AppState::new(db, settings, services);

        spawn_maintenance(repos, state.rate_limiter.clone(), state.db.clone());

        let router = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until Ctrl-C / SIGTERM
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Periodic cleanup of expired rows and gauge refresh
fn spawn_maintenance(repos: Repositories, rate_limiter: Arc<RateLimiter>, db: PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            interval.tick().await;

            match repos.sessions.cleanup_expired().await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Expired sessions removed")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
            }

            match repos.password_resets.cleanup_expired().await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Expired reset tokens removed")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Reset token cleanup failed"),
            }

            rate_limiter.purge_expired();

            let idle = db.num_idle() as u32;
            let size = db.size();
            metrics::update_db_pool_stats(
                idle,
                size.saturating_sub(idle),
                db.options().get_max_connections(),
            );
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
