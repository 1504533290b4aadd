use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::fleet::DroneLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub locks: DroneLocks,
}
