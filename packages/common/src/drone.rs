#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a drone serial number.
pub const SERIAL_NUMBER_MAX_LEN: usize = 100;
/// Upper bound for a drone's weight limit and for a single medication's weight.
pub const MAX_WEIGHT: i32 = 500;
/// Upper bound for battery capacity and level, in percent.
pub const MAX_BATTERY: i32 = 100;
/// A drone in `LOADING` state must carry at least this much charge.
pub const MIN_LOADING_BATTERY: i32 = 25;

/// Weight class of a drone.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum DroneModel {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Lightweight"))]
    Lightweight,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Middleweight"))]
    Middleweight,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Cruiserweight"))]
    Cruiserweight,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Heavyweight"))]
    Heavyweight,
}

impl DroneModel {
    pub const ALL: &'static [DroneModel] = &[
        Self::Lightweight,
        Self::Middleweight,
        Self::Cruiserweight,
        Self::Heavyweight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lightweight => "Lightweight",
            Self::Middleweight => "Middleweight",
            Self::Cruiserweight => "Cruiserweight",
            Self::Heavyweight => "Heavyweight",
        }
    }
}

impl fmt::Display for DroneModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational state of a drone.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneState {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "IDLE"))]
    Idle,
    /// Medications are being put on board. Requires sufficient charge.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "LOADING"))]
    Loading,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "LOADED"))]
    Loaded,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DELIVERING"))]
    Delivering,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DELIVERED"))]
    Delivered,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RETURNING"))]
    Returning,
}

impl DroneState {
    pub const ALL: &'static [DroneState] = &[
        Self::Idle,
        Self::Loading,
        Self::Loaded,
        Self::Delivering,
        Self::Delivered,
        Self::Returning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Loaded => "LOADED",
            Self::Delivering => "DELIVERING",
            Self::Delivered => "DELIVERED",
            Self::Returning => "RETURNING",
        }
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
