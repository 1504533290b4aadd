use std::collections::HashSet;

use fleet_common::{DroneModel, DroneState, MAX_BATTERY, MAX_WEIGHT, MIN_LOADING_BATTERY};
use rand::Rng;
use rand::distr::Alphanumeric;
use sea_orm::*;
use tracing::{debug, info};

use crate::config::SeedConfig;
use crate::entity::drone;
use crate::error::AppError;
use crate::fleet::FleetStore;
use crate::models::drone::{MedicationRequest, RegisterDroneRequest};

/// Medication names used for the demo fleet.
const DEMO_MEDICATIONS: &[&str] = &[
    "Amoxicillin",
    "Ibuprofen",
    "Paracetamol",
    "Insulin-Glargine",
    "Salbutamol",
    "Epinephrine",
    "Morphine_Sulfate",
    "Ceftriaxone",
    "Oral-Rehydration",
    "Naloxone",
];

/// Populate an empty fleet with random drones and medications.
///
/// Does nothing if any drone exists. A medication goes to the first drone with
/// room for it, starting from a random one, and is skipped if none has room.
/// Returns the number of drones inserted.
pub async fn seed_demo_fleet<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    config: &SeedConfig,
    rng: &mut R,
) -> Result<usize, AppError> {
    let existing = drone::Entity::find().count(db).await?;
    if existing > 0 {
        info!(existing, "Fleet already populated, skipping demo seed");
        return Ok(0);
    }

    let mut drones = random_drones(config.drone_count, rng);
    if !drones.is_empty() {
        for _ in 0..config.medication_count {
            let medication = random_medication(rng);
            // Start at a random drone and take the first one with room left.
            let start = rng.random_range(0..drones.len());
            let count = drones.len();
            let target = (0..count).map(|i| (start + i) % count).find(|&i| {
                let loaded: i32 = drones[i].medications.iter().map(|m| m.weight).sum();
                loaded + medication.weight <= drones[i].weight_limit
            });
            match target {
                Some(i) => drones[i].medications.push(medication),
                None => debug!(
                    name = %medication.name,
                    weight = medication.weight,
                    "No drone has room for medication, skipping"
                ),
            }
        }
    }

    let txn = db.begin().await?;
    let store = FleetStore::new(&txn);
    for drone in &drones {
        store.insert_drone(drone).await?;
    }
    txn.commit().await?;

    let medications: usize = drones.iter().map(|d| d.medications.len()).sum();
    info!(drones = drones.len(), medications, "Seeded demo fleet");
    Ok(drones.len())
}

fn random_drones<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<RegisterDroneRequest> {
    let mut serials = HashSet::new();
    while serials.len() < count {
        let serial: String = (0..10)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        serials.insert(serial);
    }

    let mut serials: Vec<String> = serials.into_iter().collect();
    serials.sort();

    serials
        .into_iter()
        .map(|serial_number| {
            let battery_capacity = rng.random_range(0..=MAX_BATTERY);
            let battery_level = rng.random_range(0..=battery_capacity);
            let mut state = DroneState::ALL[rng.random_range(0..DroneState::ALL.len())];
            if state == DroneState::Loading && battery_level < MIN_LOADING_BATTERY {
                state = DroneState::Idle;
            }

            RegisterDroneRequest {
                serial_number,
                model: DroneModel::ALL[rng.random_range(0..DroneModel::ALL.len())],
                weight_limit: rng.random_range(0..=MAX_WEIGHT),
                battery_capacity,
                battery_level,
                state,
                medications: Vec::new(),
            }
        })
        .collect()
}

fn random_medication<R: Rng + ?Sized>(rng: &mut R) -> MedicationRequest {
    let name = DEMO_MEDICATIONS[rng.random_range(0..DEMO_MEDICATIONS.len())];
    let code = format!(
        "{}_{}",
        name.to_ascii_uppercase().replace('-', "_"),
        rng.random_range(1..=999)
    );

    MedicationRequest {
        name: name.to_string(),
        weight: rng.random_range(0..=MAX_WEIGHT),
        code,
        image: format!("https://images.example.com/medications/{}.png", name.to_lowercase()),
    }
}
