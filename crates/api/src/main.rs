use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use advisory_api::app::{create_app, AppState};
use advisory_api::config::Config;
use advisory_api::jobs::{DripDispatchJob, JobScheduler, PoolMetricsJob, RateLimitPruneJob};
use advisory_api::middleware;

#[tokio::main]
async fn main() -> Result<()> {
    // `advisory-site hash-password <password>` prints a PHC hash for admin.password_hash.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        return hash_password(args.get(2));
    }

    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting advisory site backend v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into())
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let addr = config.socket_addr().context("Invalid server address")?;
    let state = AppState::new(config, pool.clone())?;

    if let Err(e) = state.blog.ensure_dir().await {
        warn!(dir = %state.blog.dir().display(), error = %e, "Blog content directory unavailable");
    }
    if !state.email.is_configured() {
        warn!("Email is not configured; lead confirmations, drip and newsletter sends are disabled");
    }

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if let Some(limiter) = state.rate_limiter.clone() {
        scheduler.register(RateLimitPruneJob::new(limiter));
    }
    if state.config.drip.enabled {
        scheduler.register(DripDispatchJob::new(
            state.drip.clone(),
            state.config.drip.interval_minutes,
        ));
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;
    info!("Shutdown complete");

    Ok(())
}

fn hash_password(password: Option<&String>) -> Result<()> {
    let password = match password {
        Some(p) => p.clone(),
        None => {
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    anyhow::ensure!(!password.is_empty(), "Password must not be empty");

    let hash = shared::password::hash_password(&password).context("Failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
