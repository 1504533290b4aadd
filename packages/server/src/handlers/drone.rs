use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::fleet::{FleetStore, LoadPlanner};
use crate::models::drone::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Drones",
    operation_id = "listAvailableDrones",
    summary = "List drones available for loading",
    description = "Returns every drone that is not currently in `LOADING` state, each with the medications it carries.",
    responses(
        (status = 200, description = "Available drones", body = Vec<DroneResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_available_drones(
    State(state): State<AppState>,
) -> Result<Json<Vec<DroneResponse>>, AppError> {
    let drones = FleetStore::new(&state.db).available_drones().await?;
    Ok(Json(drones.into_iter().map(DroneResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Drones",
    operation_id = "registerDrone",
    summary = "Register a new drone",
    description = "Registers a drone together with any medications already on board. The drone and its medications are stored atomically.",
    request_body = RegisterDroneRequest,
    responses(
        (status = 201, description = "Drone registered", body = RegisterDroneResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR), serial already used (SERIAL_NUMBER_TAKEN), or initial cargo too heavy (WEIGHT_LIMIT_EXCEEDED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(serial = %payload.serial_number))]
pub async fn register_drone(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterDroneRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_drone(&payload)?;

    let serial_number = FleetStore::new(&state.db).register_drone(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterDroneResponse { serial_number }),
    ))
}

#[utoipa::path(
    get,
    path = "/{serial}",
    tag = "Drones",
    operation_id = "getBatteryLevel",
    summary = "Get a drone's battery level",
    description = "Returns the drone's current charge in percent as a bare integer.",
    params(("serial" = String, Path, description = "Drone serial number")),
    responses(
        (status = 200, description = "Battery level", body = i32),
        (status = 404, description = "Drone not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_battery_level(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<i32>, AppError> {
    let level = FleetStore::new(&state.db).battery_level(&serial).await?;
    Ok(Json(level))
}

#[utoipa::path(
    post,
    path = "/{serial}/load",
    tag = "Drones",
    operation_id = "loadMedications",
    summary = "Load medications onto a drone",
    description = "Adds a batch of medications to the drone. Fails without changes if the total weight would exceed the drone's limit, or if the drone is `LOADING` with less than 25% battery.",
    params(("serial" = String, Path, description = "Drone serial number")),
    request_body = Vec<MedicationRequest>,
    responses(
        (status = 200, description = "Medications loaded; the updated drone", body = DroneResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR), weight limit exceeded (WEIGHT_LIMIT_EXCEEDED), or battery too low (LOW_BATTERY)", body = ErrorBody),
        (status = 404, description = "Drone not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(count = payload.len()))]
pub async fn load_medications(
    State(state): State<AppState>,
    Path(serial): Path<String>,
    AppJson(payload): AppJson<Vec<MedicationRequest>>,
) -> Result<Json<DroneResponse>, AppError> {
    validate_load_request(&payload)?;

    let drone = LoadPlanner::new(&state.db, &state.locks)
        .load(&serial, &payload)
        .await?;

    Ok(Json(drone.into()))
}

#[utoipa::path(
    get,
    path = "/{serial}/medications",
    tag = "Drones",
    operation_id = "listLoadedMedications",
    summary = "List medications loaded on a drone",
    params(("serial" = String, Path, description = "Drone serial number")),
    responses(
        (status = 200, description = "Loaded medications", body = Vec<MedicationResponse>),
        (status = 404, description = "Drone not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<Vec<MedicationResponse>>, AppError> {
    let medications = FleetStore::new(&state.db).medications_of(&serial).await?;
    Ok(Json(medications.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{serial}/events",
    tag = "Drones",
    operation_id = "listBatteryEvents",
    summary = "List battery audit records for a drone",
    description = "Returns the readings written by the battery monitor, oldest first.",
    params(("serial" = String, Path, description = "Drone serial number")),
    responses(
        (status = 200, description = "Battery readings", body = Vec<EventLogResponse>),
        (status = 404, description = "Drone not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_event_logs(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<Vec<EventLogResponse>>, AppError> {
    let events = FleetStore::new(&state.db).event_logs(&serial).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}
