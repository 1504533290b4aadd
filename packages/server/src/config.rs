use config::{Config, ConfigError, Environment, File};
use fleet_common::MonitorConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Demo data inserted into an empty fleet on startup.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub demo_fleet: bool,
    pub drone_count: usize,
    pub medication_count: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            demo_fleet: false,
            drone_count: 10,
            medication_count: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://drones.db?mode=rwc")?
            .set_default("seed.demo_fleet", false)?
            .set_default("seed.drone_count", 10)?
            .set_default("seed.medication_count", 10)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FLEET__MONITOR__INTERVAL_SECS)
            .add_source(Environment::with_prefix("FLEET").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
