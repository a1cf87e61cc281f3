//! Snowflake ID Generator
//!
//! Time-ordered 64-bit IDs for users, games, reviews and everything else that
//! is exposed in URLs. Layout: 41 bits of milliseconds since the configured
//! epoch, 10 bits of machine ID, 12 bits of per-millisecond sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1_704_067_200_000;

const MACHINE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// Snowflake ID generator
#[derive(Debug)]
pub struct SnowflakeGenerator {
    machine_id: u64,
    epoch: u64,
    /// `(millis since epoch << SEQUENCE_BITS) | sequence` of the last ID
    last: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new generator; the machine ID is truncated to 10 bits.
    pub fn new(machine_id: u16, epoch: u64) -> Self {
        Self {
            machine_id: u64::from(machine_id) & ((1 << MACHINE_BITS) - 1),
            epoch,
            last: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut last = self.last.load(Ordering::Relaxed);

        loop {
            let now = current_millis().saturating_sub(self.epoch);
            // A spent sequence carries into the millisecond field, so IDs stay
            // unique and increasing even if the clock stalls or steps back
            let next = if now > last >> SEQUENCE_BITS {
                now << SEQUENCE_BITS
            } else {
                last + 1
            };

            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return self.compose(next),
                Err(actual) => last = actual,
            }
        }
    }

    fn compose(&self, state: u64) -> i64 {
        let millis = state >> SEQUENCE_BITS;
        let sequence = state & MAX_SEQUENCE;

        ((millis << (MACHINE_BITS + SEQUENCE_BITS)) | (self.machine_id << SEQUENCE_BITS) | sequence)
            as i64
    }

    /// Extract the creation time (Unix millis) from a snowflake ID
    pub fn timestamp_of(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> (MACHINE_BITS + SEQUENCE_BITS)) + self.epoch
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Parse a snowflake from a path segment
pub fn parse_id(raw: &str, what: &str) -> Result<i64, crate::shared::error::AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| crate::shared::error::AppError::BadRequest(format!("Invalid {} ID", what)))
}
