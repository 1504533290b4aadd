use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// The URL scheme (`sqlite`, `postgres`, ...), safe to log without leaking
/// credentials or hosts.
pub fn backend_name(db_url: &str) -> &str {
    db_url
        .split_once(':')
        .map(|(scheme, _)| scheme)
        .unwrap_or("unknown")
}

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    if db_url.starts_with("sqlite:") {
        // SQLite allows one writer at a time, and every pooled connection to
        // `sqlite::memory:` would otherwise open its own empty database.
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(false);
    } else {
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8))
            .sqlx_logging(true);
    }

    let db = Database::connect(opt).await?;
    db.get_schema_registry("fleet_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
