use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Battery reading written by the battery monitor. Rows are never updated.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub drone_serial: String,

    pub timestamp: DateTimeUtc,

    pub battery_level: i32,
}

impl ActiveModelBehavior for ActiveModel {}
