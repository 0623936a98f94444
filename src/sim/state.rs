//! Board geometry and ball state
//!
//! The board is immutable after construction. Balls are owned by the engine
//! and advanced one fixed step at a time.

use glam::I64Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Friction, resolve_peg_collisions};
use super::peg::PegField;
use super::zone::MultiplierZone;
use crate::config::BoardConfig;
use crate::consts::STALL_STEPS;
use crate::error::{Error, Result};
use crate::fixed::{Display, Fixed, to_internal};
use crate::wallet::{Credits, Payout};

/// Where a ball is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallPhase {
    /// Free fall, no peg contact this step
    Falling,
    /// At least one peg contact was resolved this step
    Colliding,
    /// Entered a zone; pending removal
    Scored { zone_index: usize },
    /// Left the board, or stalled on a peg, without entering a zone;
    /// pending removal
    Lost,
}

/// Terminal outcome reported by [`Ball::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Scored(Payout),
    Lost,
}

/// A dropped ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    /// Centre, internal units
    pub pos: I64Vec2,
    /// Internal units per step
    pub vel: I64Vec2,
    pub radius: Display,
    pub wager: Credits,
    pub phase: BallPhase,
    /// Lowest centre reached so far (largest `y`)
    low_water: Fixed,
    /// Consecutive steps without a new `low_water`
    stalled_steps: u32,
}

impl Ball {
    pub fn new(id: u32, pos: I64Vec2, radius: Display, wager: Credits) -> Self {
        Self {
            id,
            pos,
            vel: I64Vec2::ZERO,
            radius,
            wager,
            phase: BallPhase::Falling,
            low_water: pos.y,
            stalled_steps: 0,
        }
    }

    #[inline]
    pub fn radius_internal(&self) -> Fixed {
        to_internal(self.radius)
    }

    pub fn pending_removal(&self) -> bool {
        matches!(self.phase, BallPhase::Scored { .. } | BallPhase::Lost)
    }

    /// No new lowest point for `STALL_STEPS` steps, e.g. balanced on a peg apex
    pub fn is_stalled(&self) -> bool {
        self.stalled_steps >= STALL_STEPS
    }

    fn track_progress(&mut self) {
        if self.pos.y > self.low_water {
            self.low_water = self.pos.y;
            self.stalled_steps = 0;
        } else {
            self.stalled_steps += 1;
        }
    }

    /// Advance one fixed step: integrate, resolve pegs, test zones
    ///
    /// A ball pending removal is inert: it never moves, collides or scores
    /// again.
    pub fn advance(&mut self, board: &Board) -> Option<Settlement> {
        if self.pending_removal() {
            return None;
        }
        let radius = self.radius_internal();

        self.vel.y += board.gravity;
        self.pos += self.vel;

        let hit = resolve_peg_collisions(
            &mut self.pos,
            &mut self.vel,
            radius,
            board.pegs.pegs(),
            board.friction,
            board.config.collision_policy,
        );
        self.phase = if hit.is_some() {
            BallPhase::Colliding
        } else {
            BallPhase::Falling
        };
        self.track_progress();

        // First match wins
        let peg_radius = board.config.peg_radius;
        if let Some((zone_index, zone)) = board
            .zones
            .iter()
            .enumerate()
            .find(|(_, zone)| zone.captures(self.pos, radius, peg_radius))
        {
            return self.score(zone_index, zone).map(Settlement::Scored);
        }

        if board.is_out_of_bounds(self.pos, radius) || self.is_stalled() {
            self.phase = BallPhase::Lost;
            return Some(Settlement::Lost);
        }

        None
    }

    /// Mark the ball as scored in `zone` and compute its payout
    ///
    /// Returns `None` if the ball has already settled.
    pub fn score(&mut self, zone_index: usize, zone: &MultiplierZone) -> Option<Payout> {
        if self.pending_removal() {
            return None;
        }
        self.phase = BallPhase::Scored { zone_index };
        Some(Payout::new(self.id, zone_index, self.wager, zone.value))
    }
}

/// Immutable board: peg lattice, zones, and the physics constants derived
/// from the configuration
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    pegs: PegField,
    zones: Vec<MultiplierZone>,
    gravity: Fixed,
    friction: Friction,
}

impl Board {
    /// Validate the configuration and build the geometry
    ///
    /// Configuration warnings are logged, not returned.
    pub fn new(config: BoardConfig) -> Result<Self> {
        config.validate()?;
        for warning in config.warnings() {
            log::warn!("{}", warning);
        }

        let pegs = PegField::from_config(&config);
        if pegs.is_empty() {
            return Err(Error::InvalidGeometry("peg field is empty".into()));
        }
        let zones = MultiplierZone::layout(&config);

        log::info!(
            "Board {}x{}: {} pegs in {} rows, {} zones",
            config.board_width,
            config.board_height,
            pegs.len(),
            config.peg_rows - crate::consts::FIRST_PEG_ROW,
            zones.len()
        );

        Ok(Self {
            gravity: config.gravity_internal(),
            friction: config.friction(),
            config,
            pegs,
            zones,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn pegs(&self) -> &PegField {
        &self.pegs
    }

    pub fn zones(&self) -> &[MultiplierZone] {
        &self.zones
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn center_x(&self) -> Fixed {
        to_internal(self.config.board_width) / 2
    }

    /// Drop point for a launch offset from the board centre
    pub fn launch_position(&self, offset: Display) -> I64Vec2 {
        I64Vec2::new(
            self.center_x() + to_internal(offset),
            to_internal(self.config.drop_height),
        )
    }

    /// A resting ball at the drop point
    pub fn spawn_ball(&self, id: u32, offset: Display, wager: Credits) -> Ball {
        Ball::new(
            id,
            self.launch_position(offset),
            self.config.ball_radius,
            wager,
        )
    }

    /// Top edge below the board, or centre more than a diameter off either side
    pub fn is_out_of_bounds(&self, pos: I64Vec2, radius: Fixed) -> bool {
        let width = to_internal(self.config.board_width);
        pos.y - radius > to_internal(self.config.board_height)
            || pos.x < -2 * radius
            || pos.x > width + 2 * radius
    }
}
