//! Error types for board construction, wagers, and ledgers

use thiserror::Error;

use crate::wallet::Credits;

/// Errors raised by the simulation core and its ledgers.
#[derive(Debug, Error)]
pub enum Error {
    /// Zero, negative, or unparseable wager. No ball is created.
    #[error("invalid wager: {0}")]
    InvalidWager(String),
    #[error("zone affinity index {index} out of range (board has {zone_count} zones)")]
    UnknownZone { index: usize, zone_count: usize },
    #[error("insufficient balance: wager {wager} exceeds balance {balance}")]
    InsufficientBalance { wager: Credits, balance: Credits },
    /// Startup-time geometry problem; the board cannot be built.
    #[error("invalid board geometry: {0}")]
    InvalidGeometry(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
