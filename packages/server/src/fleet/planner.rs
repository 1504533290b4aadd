use fleet_common::{DroneState, MIN_LOADING_BATTERY};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::entity::drone;
use crate::error::AppError;
use crate::models::drone::{MedicationRequest, total_weight};

use super::locks::DroneLocks;
use super::store::{DroneAggregate, FleetStore};

/// Applies load requests: checks a drone's capacity and charge, then attaches
/// the batch in one transaction.
pub struct LoadPlanner<'a> {
    db: &'a DatabaseConnection,
    locks: &'a DroneLocks,
}

impl<'a> LoadPlanner<'a> {
    pub fn new(db: &'a DatabaseConnection, locks: &'a DroneLocks) -> Self {
        Self { db, locks }
    }

    /// Load `batch` onto the drone and return the updated aggregate.
    ///
    /// The batch is expected to have passed static validation already. Nothing
    /// is written unless every check passes and the whole batch commits.
    pub async fn load(
        &self,
        serial: &str,
        batch: &[MedicationRequest],
    ) -> Result<DroneAggregate, AppError> {
        // Unknown serials are turned away before they reach the lock registry.
        FleetStore::new(self.db).find_drone(serial).await?;
        let _guard = self.locks.lock(serial).await;

        let txn = self.db.begin().await?;
        let store = FleetStore::new(&txn);

        let drone = store.find_drone_for_update(serial).await?;
        let loaded = store.medications_of(serial).await?;
        let loaded_weight: i64 = loaded.iter().map(|m| i64::from(m.weight)).sum();
        check_load(&drone, loaded_weight, total_weight(batch))?;

        store.append_medications(serial, batch).await?;
        let updated = store.get_drone(serial).await?;
        txn.commit().await?;

        info!(
            serial,
            state = %updated.drone.state,
            added = batch.len(),
            loaded_weight = updated.loaded_weight(),
            weight_limit = updated.drone.weight_limit,
            "Loaded medications"
        );
        Ok(updated)
    }
}

/// Business preconditions for a load, in the order they are reported:
/// capacity first, then the charge required while `LOADING`.
pub fn check_load(
    drone: &drone::Model,
    loaded_weight: i64,
    batch_weight: i64,
) -> Result<(), AppError> {
    let requested = loaded_weight + batch_weight;
    if requested > i64::from(drone.weight_limit) {
        return Err(AppError::WeightLimitExceeded {
            limit: drone.weight_limit,
            requested,
        });
    }

    if drone.state == DroneState::Loading && drone.battery_level < MIN_LOADING_BATTERY {
        return Err(AppError::LowBattery {
            battery_level: drone.battery_level,
        });
    }

    Ok(())
}
