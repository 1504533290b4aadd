use fleet_common::{DroneModel, DroneState};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "drone")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub serial_number: String,

    pub model: DroneModel,
    pub weight_limit: i32,     // grams
    pub battery_capacity: i32, // percent, maximum charge
    pub battery_level: i32,    // percent, current charge
    pub state: DroneState,

    #[sea_orm(has_many)]
    pub medications: HasMany<super::medication::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
