use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single failed attempt, kept so a final failure can report its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    /// When this attempt occurred.
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Delay before retrying after failed attempt number `attempt`.
///
/// Doubles from `base_ms` with every attempt, adds up to 25% random jitter and
/// never exceeds `max_ms`. Attempt 0 waits nothing.
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    let Some(doublings) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let delay = base_ms.saturating_mul(2u64.saturating_pow(u32::from(doublings)));
    let jitter = match delay / 4 {
        0 => 0,
        quarter => rand::rng().random_range(0..=quarter),
    };

    Duration::from_millis(delay.saturating_add(jitter).min(max_ms))
}
