use chrono::{DateTime, Utc};
use fleet_common::{
    DroneModel, DroneState, MAX_BATTERY, MAX_WEIGHT, MIN_LOADING_BATTERY, SERIAL_NUMBER_MAX_LEN,
};
use serde::{Deserialize, Serialize};

use crate::entity::{event_log, medication};
use crate::error::AppError;
use crate::fleet::DroneAggregate;

use super::shared::{is_valid_medication_code, is_valid_medication_name, validate_range};

/// A medication as submitted for registration or loading.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct MedicationRequest {
    /// Letters, digits, `-` and `_` only.
    #[schema(example = "Ibuprofen-200")]
    pub name: String,
    /// Weight in grams (0-500).
    #[schema(example = 120)]
    pub weight: i32,
    /// Upper case letters, digits and `_` only.
    #[schema(example = "IBU_200")]
    pub code: String,
    /// Opaque image reference.
    #[serde(default)]
    #[schema(example = "https://cdn.example.com/ibu200.png")]
    pub image: String,
}

/// Request body for drone registration.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterDroneRequest {
    /// Unique serial number (1-100 characters).
    #[schema(example = "DRN-0001")]
    pub serial_number: String,
    pub model: DroneModel,
    /// Maximum cargo weight in grams (0-500).
    #[schema(example = 500)]
    pub weight_limit: i32,
    /// Maximum charge in percent (0-100).
    #[schema(example = 100)]
    pub battery_capacity: i32,
    /// Current charge in percent, at most `battery_capacity`.
    #[schema(example = 80)]
    pub battery_level: i32,
    pub state: DroneState,
    /// Medications already on board.
    #[serde(default)]
    pub medications: Vec<MedicationRequest>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterDroneResponse {
    #[schema(example = "DRN-0001")]
    pub serial_number: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MedicationResponse {
    pub id: i32,
    pub name: String,
    pub weight: i32,
    pub code: String,
    pub image: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DroneResponse {
    pub serial_number: String,
    pub model: DroneModel,
    pub weight_limit: i32,
    pub battery_capacity: i32,
    pub battery_level: i32,
    pub state: DroneState,
    pub medications: Vec<MedicationResponse>,
}

/// One battery reading from the audit trail.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventLogResponse {
    pub id: i32,
    pub drone_serial: String,
    pub timestamp: DateTime<Utc>,
    pub battery_level: i32,
}

pub fn validate_register_drone(payload: &RegisterDroneRequest) -> Result<(), AppError> {
    let serial = payload.serial_number.trim();
    if serial.is_empty() || serial.chars().count() > SERIAL_NUMBER_MAX_LEN {
        return Err(AppError::field(
            "serial_number",
            format!("Serial number must be 1-{SERIAL_NUMBER_MAX_LEN} characters"),
        ));
    }

    validate_range("weight_limit", payload.weight_limit, 0, MAX_WEIGHT)?;
    validate_range("battery_capacity", payload.battery_capacity, 0, MAX_BATTERY)?;
    validate_range("battery_level", payload.battery_level, 0, MAX_BATTERY)?;
    if payload.battery_level > payload.battery_capacity {
        return Err(AppError::field(
            "battery_level",
            "Battery level must not exceed battery capacity",
        ));
    }
    if payload.state == DroneState::Loading && payload.battery_level < MIN_LOADING_BATTERY {
        return Err(AppError::field(
            "battery_level",
            format!("A drone in LOADING state needs at least {MIN_LOADING_BATTERY}% battery"),
        ));
    }

    validate_medications(&payload.medications, "medications")?;

    let requested = total_weight(&payload.medications);
    if requested > i64::from(payload.weight_limit) {
        return Err(AppError::WeightLimitExceeded {
            limit: payload.weight_limit,
            requested,
        });
    }
    Ok(())
}

/// Validate a load batch. An empty batch is rejected.
pub fn validate_load_request(medications: &[MedicationRequest]) -> Result<(), AppError> {
    if medications.is_empty() {
        return Err(AppError::Validation(
            "At least one medication must be provided".into(),
        ));
    }
    validate_medications(medications, "medications")
}

fn validate_medications(medications: &[MedicationRequest], prefix: &str) -> Result<(), AppError> {
    for (i, med) in medications.iter().enumerate() {
        let path = |field: &str| format!("{prefix}[{i}].{field}");

        if !is_valid_medication_name(&med.name) {
            return Err(AppError::field(
                path("name"),
                "Name must contain only letters, digits, '-' and '_'",
            ));
        }
        if !is_valid_medication_code(&med.code) {
            return Err(AppError::field(
                path("code"),
                "Code must contain only upper case letters, digits, and underscores",
            ));
        }
        validate_range(&path("weight"), med.weight, 0, MAX_WEIGHT)?;
    }
    Ok(())
}

pub fn total_weight(medications: &[MedicationRequest]) -> i64 {
    medications.iter().map(|m| i64::from(m.weight)).sum()
}

impl From<medication::Model> for MedicationResponse {
    fn from(m: medication::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            weight: m.weight,
            code: m.code,
            image: m.image,
        }
    }
}

impl From<DroneAggregate> for DroneResponse {
    fn from(a: DroneAggregate) -> Self {
        Self {
            serial_number: a.drone.serial_number,
            model: a.drone.model,
            weight_limit: a.drone.weight_limit,
            battery_capacity: a.drone.battery_capacity,
            battery_level: a.drone.battery_level,
            state: a.drone.state,
            medications: a.medications.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<event_log::Model> for EventLogResponse {
    fn from(m: event_log::Model) -> Self {
        Self {
            id: m.id,
            drone_serial: m.drone_serial,
            timestamp: m.timestamp,
            battery_level: m.battery_level,
        }
    }
}
