use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fleet_common::DroneState;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::entity::{drone, event_log, medication};
use crate::error::AppError;
use crate::models::drone::{MedicationRequest, RegisterDroneRequest};

/// A drone together with every medication it carries, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneAggregate {
    pub drone: drone::Model,
    pub medications: Vec<medication::Model>,
}

impl DroneAggregate {
    pub fn loaded_weight(&self) -> i64 {
        self.medications.iter().map(|m| i64::from(m.weight)).sum()
    }
}

/// Repository over the drone, medication and event log tables.
///
/// Works on a plain connection or inside a transaction; callers that need
/// several writes to land together pass a `DatabaseTransaction`.
pub struct FleetStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FleetStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Look up a drone row without its medications.
    pub async fn find_drone(&self, serial: &str) -> Result<drone::Model, AppError> {
        drone::Entity::find_by_id(serial.to_owned())
            .one(self.conn)
            .await?
            .ok_or_else(|| drone_not_found(serial))
    }

    /// Look up a drone row and lock it until the surrounding transaction ends.
    pub async fn lock_drone(&self, serial: &str) -> Result<Option<drone::Model>, DbErr> {
        drone::Entity::find_by_id(serial.to_owned())
            .lock(LockType::Update)
            .one(self.conn)
            .await
    }

    pub async fn find_drone_for_update(&self, serial: &str) -> Result<drone::Model, AppError> {
        self.lock_drone(serial)
            .await?
            .ok_or_else(|| drone_not_found(serial))
    }

    /// Fetch a drone with its medications, or `NotFound`.
    pub async fn get_drone(&self, serial: &str) -> Result<DroneAggregate, AppError> {
        let drone = self.find_drone(serial).await?;
        let medications = self.load_medications(&drone.serial_number).await?;
        Ok(DroneAggregate { drone, medications })
    }

    /// Serial numbers of every registered drone, in ascending order.
    pub async fn all_serials(&self) -> Result<Vec<String>, DbErr> {
        drone::Entity::find()
            .select_only()
            .column(drone::Column::SerialNumber)
            .order_by_asc(drone::Column::SerialNumber)
            .into_tuple::<String>()
            .all(self.conn)
            .await
    }

    /// Insert a drone and its initial cargo.
    ///
    /// Fails with `SerialNumberTaken` when the serial is already registered,
    /// including when a concurrent registration wins the insert race.
    pub async fn insert_drone(&self, payload: &RegisterDroneRequest) -> Result<String, AppError> {
        let serial = payload.serial_number.trim().to_string();

        let existing = drone::Entity::find_by_id(serial.clone())
            .one(self.conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::SerialNumberTaken);
        }

        let new_drone = drone::ActiveModel {
            serial_number: Set(serial.clone()),
            model: Set(payload.model),
            weight_limit: Set(payload.weight_limit),
            battery_capacity: Set(payload.battery_capacity),
            battery_level: Set(payload.battery_level),
            state: Set(payload.state),
        };

        drone::Entity::insert(new_drone)
            .exec_without_returning(self.conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    tracing::debug!("Registration race condition: unique constraint caught on insert");
                    AppError::SerialNumberTaken
                }
                _ => AppError::from(e),
            })?;

        self.insert_medications(&serial, &payload.medications).await?;

        Ok(serial)
    }

    /// Attach medications to an existing drone.
    pub async fn append_medications(
        &self,
        serial: &str,
        medications: &[MedicationRequest],
    ) -> Result<(), AppError> {
        self.find_drone(serial).await?;
        self.insert_medications(serial, medications).await?;
        Ok(())
    }

    async fn insert_medications(
        &self,
        serial: &str,
        medications: &[MedicationRequest],
    ) -> Result<(), DbErr> {
        if medications.is_empty() {
            return Ok(());
        }

        let models = medications.iter().map(|m| medication::ActiveModel {
            name: Set(m.name.clone()),
            weight: Set(m.weight),
            code: Set(m.code.clone()),
            image: Set(m.image.clone()),
            drone_serial_number: Set(serial.to_string()),
            ..Default::default()
        });

        medication::Entity::insert_many(models)
            .exec(self.conn)
            .await?;
        Ok(())
    }

    pub async fn set_battery_level(
        &self,
        drone: drone::Model,
        battery_level: i32,
    ) -> Result<drone::Model, DbErr> {
        let mut active: drone::ActiveModel = drone.into();
        active.battery_level = Set(battery_level);
        active.update(self.conn).await
    }

    /// Append an audit record. Event log rows are never updated afterwards.
    pub async fn append_event_log(
        &self,
        serial: &str,
        battery_level: i32,
        timestamp: DateTime<Utc>,
    ) -> Result<event_log::Model, DbErr> {
        event_log::ActiveModel {
            drone_serial: Set(serial.to_string()),
            timestamp: Set(timestamp),
            battery_level: Set(battery_level),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    async fn load_medications(&self, serial: &str) -> Result<Vec<medication::Model>, DbErr> {
        medication::Entity::find()
            .filter(medication::Column::DroneSerialNumber.eq(serial))
            .order_by_asc(medication::Column::Id)
            .all(self.conn)
            .await
    }

    /// Attach medications to a batch of drones with a single query.
    async fn with_medications(
        &self,
        drones: Vec<drone::Model>,
    ) -> Result<Vec<DroneAggregate>, DbErr> {
        if drones.is_empty() {
            return Ok(Vec::new());
        }

        let serials: Vec<String> = drones.iter().map(|d| d.serial_number.clone()).collect();
        let mut by_drone: HashMap<String, Vec<medication::Model>> = HashMap::new();
        for med in medication::Entity::find()
            .filter(medication::Column::DroneSerialNumber.is_in(serials))
            .order_by_asc(medication::Column::Id)
            .all(self.conn)
            .await?
        {
            by_drone
                .entry(med.drone_serial_number.clone())
                .or_default()
                .push(med);
        }

        Ok(drones
            .into_iter()
            .map(|drone| {
                let medications = by_drone.remove(&drone.serial_number).unwrap_or_default();
                DroneAggregate { drone, medications }
            })
            .collect())
    }
}

// Read-only projections served to API clients.
impl<C: ConnectionTrait> FleetStore<'_, C> {
    /// Every drone not currently in `LOADING` state, with its medications.
    pub async fn available_drones(&self) -> Result<Vec<DroneAggregate>, AppError> {
        let drones = drone::Entity::find()
            .filter(drone::Column::State.ne(DroneState::Loading))
            .order_by_asc(drone::Column::SerialNumber)
            .all(self.conn)
            .await?;
        Ok(self.with_medications(drones).await?)
    }

    /// Medications loaded on a drone. `NotFound` if the drone does not exist.
    pub async fn medications_of(&self, serial: &str) -> Result<Vec<medication::Model>, AppError> {
        let drone = self.find_drone(serial).await?;
        Ok(self.load_medications(&drone.serial_number).await?)
    }

    pub async fn battery_level(&self, serial: &str) -> Result<i32, AppError> {
        Ok(self.find_drone(serial).await?.battery_level)
    }

    /// Audit trail of one drone, oldest first.
    pub async fn event_logs(&self, serial: &str) -> Result<Vec<event_log::Model>, AppError> {
        self.find_drone(serial).await?;
        Ok(event_log::Entity::find()
            .filter(event_log::Column::DroneSerial.eq(serial))
            .order_by_asc(event_log::Column::Timestamp)
            .order_by_asc(event_log::Column::Id)
            .all(self.conn)
            .await?)
    }
}

impl FleetStore<'_, DatabaseConnection> {
    /// Register a drone with its initial cargo in one transaction.
    pub async fn register_drone(&self, payload: &RegisterDroneRequest) -> Result<String, AppError> {
        let txn = self.conn.begin().await?;
        let serial = FleetStore::new(&txn).insert_drone(payload).await?;
        txn.commit().await?;

        tracing::info!(
            serial = %serial,
            model = %payload.model,
            state = %payload.state,
            medications = payload.medications.len(),
            "Registered drone"
        );
        Ok(serial)
    }
}

fn drone_not_found(serial: &str) -> AppError {
    AppError::NotFound(format!("Drone '{serial}' not found"))
}
