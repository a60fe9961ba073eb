//! Ledger close time
//!
//! Close timestamps are seconds since the ledger epoch, not the unix epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset between the ledger epoch (2000-01-01T00:00:00Z) and the unix epoch
pub const LEDGER_EPOCH_OFFSET: i64 = 946_684_800;

/// Seconds since the ledger epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LedgerTime(pub u32);

impl LedgerTime {
    /// Seconds since the unix epoch
    pub fn to_unix(self) -> i64 {
        i64::from(self.0) + LEDGER_EPOCH_OFFSET
    }

    /// Convert to a UTC timestamp
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.to_unix(), 0).unwrap_or_default()
    }

    /// Build from a unix timestamp; times before the ledger epoch clamp to 0
    pub fn from_unix(unix: i64) -> Self {
        Self((unix - LEDGER_EPOCH_OFFSET).clamp(0, i64::from(u32::MAX)) as u32)
    }
}
