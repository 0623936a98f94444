//! Deterministic simulation module
//!
//! All board logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Integer physics state (internal units), stable iteration order
//! - No rendering or platform dependencies

pub mod collision;
pub mod peg;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod zone;

pub use collision::{
    CollisionPolicy, Friction, PegContact, ball_peg_contact, bounce_off_peg, resolve_peg_collisions,
};
pub use peg::{Peg, PegField};
pub use state::{Ball, BallPhase, Board, Settlement};
pub use targeting::{TargetEntry, TargetingTable, derive_zone_affinity_index};
pub use tick::{DropTicket, Engine};
pub use zone::MultiplierZone;
