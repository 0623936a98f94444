//! Plinko - a deterministic peg-board drop simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (peg field, zones, collisions, targeting, engine)
//! - `fixed`: Fixed-point unit conversion between internal and display scales
//! - `config`: Board configuration and validation
//! - `wallet`: Currency, multipliers, and payout ledgers
//! - `frame`: Read-only per-frame state for renderers
//!
//! Rendering, input and balance display live in the host shell. The shell
//! calls [`Engine::request_drop`], runs [`Engine::tick`] once per fixed step,
//! reads [`Engine::snapshot`] to draw, and receives payouts through a
//! [`PayoutLedger`].

pub mod config;
pub mod error;
pub mod fixed;
pub mod frame;
pub mod sim;
pub mod wallet;

pub use config::{BoardConfig, ConfigWarning};
pub use error::{Error, Result};
pub use frame::{BallView, CircleInstance, FrameSnapshot};
pub use sim::{
    Ball, BallPhase, Board, DropTicket, Engine, MultiplierZone, Peg, PegField, TargetingTable,
};
pub use wallet::{Credits, Multiplier, Payout, PayoutLedger, Wallet};

/// Reference board constants
pub mod consts {
    use crate::fixed::Display;
    use crate::wallet::Multiplier;

    /// Fixed simulation timestep (one `tick` per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board dimensions
    pub const BOARD_WIDTH: Display = 800;
    pub const BOARD_HEIGHT: Display = 800;
    pub const DROP_HEIGHT: Display = 50;
    /// Largest accepted board side; keeps squared internal distances in `i64`
    pub const MAX_BOARD_EXTENT: Display = 100_000;

    pub const BALL_RADIUS: Display = 7;
    pub const PEG_RADIUS: Display = 4;

    /// Peg lattice: rows FIRST_PEG_ROW..PEG_ROWS, row r holds r + 1 pegs
    pub const FIRST_PEG_ROW: u32 = 2;
    pub const PEG_ROWS: u32 = 16;
    pub const ROW_SPACING: Display = 35;
    pub const COL_SPACING: Display = 36;

    /// Display units per step²
    pub const GRAVITY: f64 = 0.2;
    /// Velocity damping applied on every peg bounce
    pub const HORIZONTAL_FRICTION: f64 = 0.4;
    pub const VERTICAL_FRICTION: f64 = 0.6;

    /// Zone row sits this far above the bottom edge
    pub const ZONE_BOTTOM_MARGIN: Display = 240;
    pub const ZONE_WIDTH: Display = 36;

    /// 108, 18, 9, 4.5, 1.8, 0.9, 0.5, 0, ... mirrored
    pub const REFERENCE_MULTIPLIERS: [Multiplier; 15] = [
        Multiplier::from_bp(1_080_000),
        Multiplier::from_bp(180_000),
        Multiplier::from_bp(90_000),
        Multiplier::from_bp(45_000),
        Multiplier::from_bp(18_000),
        Multiplier::from_bp(9_000),
        Multiplier::from_bp(5_000),
        Multiplier::from_bp(0),
        Multiplier::from_bp(5_000),
        Multiplier::from_bp(9_000),
        Multiplier::from_bp(18_000),
        Multiplier::from_bp(45_000),
        Multiplier::from_bp(90_000),
        Multiplier::from_bp(180_000),
        Multiplier::from_bp(1_080_000),
    ];

    /// Fair coin flips summed into a zone affinity index
    pub const AFFINITY_TRIALS: u32 = 14;

    /// Steps a ball may go without a new lowest point before it is lost
    pub const STALL_STEPS: u32 = 300;

    /// Steps a calibration drop may take before it is discarded
    pub const MAX_CALIBRATION_STEPS: u32 = 4_000;
}
