//! Board configuration
//!
//! Fixed for the lifetime of an engine. Defaults reproduce the reference
//! layout; a JSON document may override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::consts::*;
use crate::error::{Error, Result};
use crate::fixed::{Display, Fixed, from_display_f64};
use crate::sim::collision::{CollisionPolicy, Friction};
use crate::wallet::Multiplier;

/// Non-fatal configuration problems, logged at board construction
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigWarning {
    /// `trials + 1 != zones`: affinity indices beyond the last zone are
    /// clamped, so the tails of the binomial pile onto the edge zone (or the
    /// outer zones are never targeted).
    #[error(
        "configuration mismatch: {trials} affinity trials for {zones} zones; indices are clamped"
    )]
    ConfigurationMismatch { trials: u32, zones: usize },
    #[error("multiplier list is not mirror symmetric; the board is")]
    AsymmetricMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    // === Board ===
    pub board_width: Display,
    pub board_height: Display,
    /// Vertical position balls are dropped from
    pub drop_height: Display,

    // === Bodies ===
    pub ball_radius: Display,
    pub peg_radius: Display,

    // === Peg lattice ===
    /// Exclusive upper bound; rows start at `FIRST_PEG_ROW`
    pub peg_rows: u32,
    pub row_spacing: Display,
    pub col_spacing: Display,

    // === Physics ===
    /// Display units per step², fractional
    pub gravity: f64,
    pub horizontal_friction: f64,
    pub vertical_friction: f64,
    pub collision_policy: CollisionPolicy,

    // === Zones ===
    pub zone_width: Display,
    /// Vertical centre of the zone row
    pub zone_center_y: Display,
    /// One entry per zone, left to right
    pub multipliers: Vec<Multiplier>,

    // === Targeting ===
    pub affinity_trials: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            drop_height: DROP_HEIGHT,

            ball_radius: BALL_RADIUS,
            peg_radius: PEG_RADIUS,

            peg_rows: PEG_ROWS,
            row_spacing: ROW_SPACING,
            col_spacing: COL_SPACING,

            gravity: GRAVITY,
            horizontal_friction: HORIZONTAL_FRICTION,
            vertical_friction: VERTICAL_FRICTION,
            collision_policy: CollisionPolicy::default(),

            zone_width: ZONE_WIDTH,
            zone_center_y: BOARD_HEIGHT - ZONE_BOTTOM_MARGIN,
            multipliers: REFERENCE_MULTIPLIERS.to_vec(),

            affinity_trials: AFFINITY_TRIALS,
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn zone_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Gravity in internal units per step²
    pub fn gravity_internal(&self) -> Fixed {
        from_display_f64(self.gravity)
    }

    pub fn friction(&self) -> Friction {
        Friction {
            horizontal: self.horizontal_friction,
            vertical: self.vertical_friction,
        }
    }

    /// Reject geometry the simulation cannot run on
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("board_width", self.board_width),
            ("board_height", self.board_height),
            ("ball_radius", self.ball_radius),
            ("peg_radius", self.peg_radius),
            ("row_spacing", self.row_spacing),
            ("col_spacing", self.col_spacing),
            ("zone_width", self.zone_width),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(Error::InvalidGeometry(format!(
                    "{field} must be positive (got {value})"
                )));
            }
        }

        if self.peg_rows <= FIRST_PEG_ROW {
            return Err(Error::InvalidGeometry(format!(
                "peg_rows {} leaves no rows after row {}",
                self.peg_rows, FIRST_PEG_ROW
            )));
        }
        if self.zone_width <= 2 * self.peg_radius {
            return Err(Error::InvalidGeometry(format!(
                "zone_width {} leaves no catch span after the {} peg gap",
                self.zone_width,
                2 * self.peg_radius
            )));
        }
        if self.multipliers.is_empty() {
            return Err(Error::InvalidGeometry("no multiplier zones".into()));
        }
        let max_extent = self.board_width.max(self.board_height);
        if max_extent > MAX_BOARD_EXTENT || self.ball_radius > max_extent - self.peg_radius {
            return Err(Error::InvalidGeometry(format!(
                "board {}x{} with radii {}+{} is out of range (max side {MAX_BOARD_EXTENT})",
                self.board_width, self.board_height, self.ball_radius, self.peg_radius
            )));
        }

        // At most one ball diameter per step²
        let max_gravity = 2.0 * self.ball_radius as f64;
        let gravity_ok = self.gravity.is_finite()
            && self.gravity_internal() > 0
            && self.gravity <= max_gravity;
        if !gravity_ok {
            return Err(Error::InvalidGeometry(format!(
                "gravity must be in (0, {max_gravity}] (got {})",
                self.gravity
            )));
        }
        for (field, value) in [
            ("horizontal_friction", self.horizontal_friction),
            ("vertical_friction", self.vertical_friction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidGeometry(format!(
                    "{field} must be in [0, 1] (got {value})"
                )));
            }
        }

        Ok(())
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.affinity_trials as usize + 1 != self.zone_count() {
            warnings.push(ConfigWarning::ConfigurationMismatch {
                trials: self.affinity_trials,
                zones: self.zone_count(),
            });
        }
        if !self.multipliers.iter().eq(self.multipliers.iter().rev()) {
            warnings.push(ConfigWarning::AsymmetricMultipliers);
        }

        warnings
    }
}
