use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medication")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub weight: i32,
    pub code: String,
    #[sea_orm(column_type = "Text")]
    pub image: String,

    #[sea_orm(indexed)]
    pub drone_serial_number: String,
    #[sea_orm(
        belongs_to,
        from = "drone_serial_number",
        to = "serial_number",
        on_delete = "Cascade"
    )]
    pub drone: HasOne<super::drone::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
