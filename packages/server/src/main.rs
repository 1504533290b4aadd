use std::sync::Arc;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleet_server::config::AppConfig;
use fleet_server::database::{self, init_db};
use fleet_server::fleet::DroneLocks;
use fleet_server::monitor::{BatteryMonitor, run_battery_monitor};
use fleet_server::seed::seed_demo_fleet;
use fleet_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!(
        backend = database::backend_name(&config.database.url),
        "Database ready"
    );

    if config.seed.demo_fleet {
        let mut rng = StdRng::from_os_rng();
        seed_demo_fleet(&db, &config.seed, &mut rng)
            .await
            .context("Failed to seed demo fleet")?;
    }

    let locks = DroneLocks::new();

    if config.monitor.enabled {
        let monitor = Arc::new(BatteryMonitor::new(
            db.clone(),
            locks.clone(),
            config.monitor.clone(),
        ));
        tokio::spawn(run_battery_monitor(monitor));
    } else {
        info!("Battery monitor disabled");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        locks,
    };
    let app = fleet_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
