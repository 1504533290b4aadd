use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use fleet_common::MonitorConfig;
use fleet_common::retry::{RetryAttempt, calculate_backoff};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tracing::{error, info, warn};

use crate::fleet::{DroneLocks, FleetStore};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Battery level written for one drone during a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryReading {
    pub serial: String,
    pub battery_level: i32,
}

/// A drone whose update did not commit, with every failed attempt.
#[derive(Debug, Clone)]
pub struct DroneFailure {
    pub serial: String,
    pub history: Vec<RetryAttempt>,
}

/// Outcome of one battery check across the fleet.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Attempts made, including the first.
    pub attempts: u8,
    pub updated: Vec<BatteryReading>,
    /// Drones that disappeared between listing and update.
    pub skipped: Vec<String>,
    pub failed: Vec<DroneFailure>,
    /// Set when the drone list itself could not be read on the last attempt.
    pub listing_error: Option<String>,
}

impl TickReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.listing_error.is_none()
    }
}

/// Draw the next simulated battery level.
///
/// The delta is uniform over `[-level, capacity - level]`, so the result always
/// lands in `[0, capacity]`. A stored level outside that range is clamped first.
pub fn next_battery_level<R: Rng + ?Sized>(rng: &mut R, level: i32, capacity: i32) -> i32 {
    let capacity = capacity.max(0);
    let level = level.clamp(0, capacity);
    let delta = rng.random_range(-level..=capacity - level);
    level + delta
}

/// Periodically drains or recharges every drone and records the reading.
///
/// Each drone is updated in its own transaction, so one drone failing neither
/// rolls back nor blocks the others.
pub struct BatteryMonitor<R = StdRng> {
    db: DatabaseConnection,
    locks: DroneLocks,
    config: MonitorConfig,
    rng: Mutex<R>,
}

impl BatteryMonitor<StdRng> {
    /// Monitor seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(db: DatabaseConnection, locks: DroneLocks, config: MonitorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(db, locks, config, rng)
    }
}

impl<R: Rng + Send> BatteryMonitor<R> {
    pub fn with_rng(db: DatabaseConnection, locks: DroneLocks, config: MonitorConfig, rng: R) -> Self {
        Self {
            db,
            locks,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run a single pass over every registered drone.
    pub async fn check_battery_levels(&self) -> Result<TickReport, SweepError> {
        let serials = FleetStore::new(&self.db).all_serials().await?;
        Ok(self.check_drones(&serials, 1).await)
    }

    /// Update the given drones independently, collecting per-drone failures.
    pub async fn check_drones(&self, serials: &[String], attempt: u8) -> TickReport {
        let mut report = TickReport {
            attempts: attempt,
            ..Default::default()
        };

        for serial in serials {
            match self.recharge_drone(serial).await {
                Ok(Some(battery_level)) => report.updated.push(BatteryReading {
                    serial: serial.clone(),
                    battery_level,
                }),
                Ok(None) => report.skipped.push(serial.clone()),
                Err(e) => {
                    warn!(serial = %serial, attempt, error = %e, "Battery update failed");
                    report.failed.push(DroneFailure {
                        serial: serial.clone(),
                        history: vec![RetryAttempt::new(attempt, e.to_string())],
                    });
                }
            }
        }

        report
    }

    /// Run a check, then retry failed drones up to `max_retries` more times.
    ///
    /// Only drones whose update did not commit are retried, so a drone never
    /// receives two readings from the same check.
    pub async fn run_with_retry(&self) -> TickReport {
        let max_attempts = self.config.max_attempts();
        let mut report = TickReport::default();
        let mut pending: Option<Vec<String>> = None;

        for attempt in 1..=max_attempts {
            report.attempts = attempt;

            let serials = match pending.take() {
                Some(serials) => serials,
                None => match FleetStore::new(&self.db).all_serials().await {
                    Ok(serials) => {
                        report.listing_error = None;
                        serials
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "Failed to list drones for battery check");
                        report.listing_error = Some(e.to_string());
                        self.backoff(attempt, max_attempts).await;
                        continue;
                    }
                },
            };

            let pass = self.check_drones(&serials, attempt).await;
            report.updated.extend(pass.updated);
            report.skipped.extend(pass.skipped);

            let mut previous: HashMap<String, Vec<RetryAttempt>> = report
                .failed
                .drain(..)
                .map(|f| (f.serial, f.history))
                .collect();
            report.failed = pass
                .failed
                .into_iter()
                .map(|mut f| {
                    let mut history = previous.remove(&f.serial).unwrap_or_default();
                    history.append(&mut f.history);
                    DroneFailure {
                        serial: f.serial,
                        history,
                    }
                })
                .collect();

            if report.failed.is_empty() {
                break;
            }
            pending = Some(report.failed.iter().map(|f| f.serial.clone()).collect());
            self.backoff(attempt, max_attempts).await;
        }

        if let Some(e) = &report.listing_error {
            error!(attempts = report.attempts, error = %e, "Battery check could not list drones");
        }
        for failure in &report.failed {
            error!(
                serial = %failure.serial,
                attempts = failure.history.len(),
                last_error = failure.history.last().map(|a| a.error.as_str()).unwrap_or_default(),
                "Giving up on battery update"
            );
        }

        report
    }

    async fn backoff(&self, attempt: u8, max_attempts: u8) {
        if attempt < max_attempts {
            let delay = calculate_backoff(attempt, self.config.retry_base_ms, self.config.retry_max_ms);
            tokio::time::sleep(delay).await;
        }
    }

    /// Apply one simulated charge change and append its audit record.
    ///
    /// Returns `None` if the drone no longer exists.
    async fn recharge_drone(&self, serial: &str) -> Result<Option<i32>, SweepError> {
        let _guard = self.locks.lock(serial).await;

        let txn = self.db.begin().await?;
        let store = FleetStore::new(&txn);

        let Some(drone) = store.lock_drone(serial).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let previous = drone.battery_level;
        let battery_level = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            next_battery_level(&mut *rng, drone.battery_level, drone.battery_capacity)
        };

        store.set_battery_level(drone, battery_level).await?;
        store
            .append_event_log(serial, battery_level, Utc::now())
            .await?;
        txn.commit().await?;

        info!(serial, previous, battery_level, "Battery level updated");
        Ok(Some(battery_level))
    }
}
