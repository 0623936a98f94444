//! Launch targeting
//!
//! A drop first sums fair coin flips into a zone affinity index, which is
//! binomially distributed like the landing spots of an ideal Galton board.
//! The index then selects a launch offset known to carry a ball into (or
//! next to) that zone.
//!
//! Offsets are found by calibration: every whole-unit offset across the
//! board is dropped once with the real physics and filed under the zone it
//! lands in. The physics is deterministic and balls never touch each other,
//! so a live ball from a calibrated offset retraces the calibration run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Board, Settlement};
use crate::consts::MAX_CALIBRATION_STEPS;
use crate::error::{Error, Result};
use crate::fixed::{Display, Fixed};
use crate::wallet::Credits;

/// Sum `trial_count` fair coin flips, clamped to a valid zone index
///
/// With `trial_count + 1 != zone_count` the clamp folds the upper tail onto
/// the last zone; boards warn about this at construction.
pub fn derive_zone_affinity_index<R: Rng>(
    rng: &mut R,
    trial_count: u32,
    zone_count: usize,
) -> usize {
    let heads = (0..trial_count).filter(|_| rng.random_bool(0.5)).count();
    heads.min(zone_count.saturating_sub(1))
}

/// Launch offsets registered for one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Signed offsets from the board centre, ascending
    pub offsets: Vec<Display>,
    /// `false` when no calibration drop reached the zone and the offsets
    /// are the drops that finished nearest its centre
    pub landed: bool,
}

/// Affinity index -> launch offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingTable {
    entries: Vec<TargetEntry>,
}

/// Result of one calibration drop
#[derive(Debug, Clone, Copy)]
struct CalibrationDrop {
    offset: Display,
    zone: Option<usize>,
    final_x: Fixed,
}

fn simulate_drop(board: &Board, offset: Display) -> Option<CalibrationDrop> {
    let mut ball = board.spawn_ball(0, offset, Credits::ZERO);
    for _ in 0..MAX_CALIBRATION_STEPS {
        let zone = match ball.advance(board) {
            None => continue,
            Some(Settlement::Scored(payout)) => Some(payout.zone_index),
            // Stalled drops never reach the zone row and are discarded
            Some(Settlement::Lost) if ball.is_stalled() => return None,
            Some(Settlement::Lost) => None,
        };
        return Some(CalibrationDrop {
            offset,
            zone,
            final_x: ball.pos.x,
        });
    }
    None
}

impl TargetingTable {
    /// Derive the table by dropping one ball from every whole-unit offset
    pub fn calibrate(board: &Board) -> Result<Self> {
        let config = board.config();
        let reach = config.board_width / 2 - config.ball_radius;

        let drops: Vec<CalibrationDrop> = (-reach..=reach)
            .filter_map(|offset| simulate_drop(board, offset))
            .collect();
        if drops.is_empty() {
            return Err(Error::InvalidGeometry(
                "no calibration drop left the peg field".into(),
            ));
        }

        let mut entries = vec![
            TargetEntry {
                offsets: Vec::new(),
                landed: true,
            };
            board.zone_count()
        ];
        for drop in &drops {
            if let Some(zone) = drop.zone {
                entries[zone].offsets.push(drop.offset);
            }
        }

        for (i, entry) in entries.iter_mut().enumerate() {
            if !entry.offsets.is_empty() {
                continue;
            }
            let center = board.zones()[i].center_x(config.peg_radius);
            let nearest = drops
                .iter()
                .map(|d| (d.final_x - center).abs())
                .min()
                .unwrap_or(0);
            entry.offsets = drops
                .iter()
                .filter(|d| (d.final_x - center).abs() == nearest)
                .map(|d| d.offset)
                .collect();
            entry.landed = false;
            log::warn!(
                "No calibration drop reached zone {}; targeting the {} nearest",
                i,
                entry.offsets.len()
            );
        }

        let landed = entries.iter().filter(|e| e.landed).count();
        log::info!(
            "Targeting calibrated: {} of {} offsets settled, {}/{} zones reachable",
            drops.len(),
            2 * reach + 1,
            landed,
            entries.len()
        );

        Ok(Self { entries })
    }

    /// Build from persisted entries
    ///
    /// Every entry must be non-empty, and entry `i` must be the negation of
    /// entry `n - 1 - i`, matching the board's mirror symmetry.
    pub fn from_entries(entries: Vec<TargetEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidGeometry("targeting table has no entries".into()));
        }
        let n = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            if entry.offsets.is_empty() {
                return Err(Error::InvalidGeometry(format!(
                    "targeting entry {i} has no offsets"
                )));
            }

            let mut own = entry.offsets.clone();
            own.sort_unstable();
            let mut mirrored: Vec<Display> =
                entries[n - 1 - i].offsets.iter().map(|o| -o).collect();
            mirrored.sort_unstable();
            if own != mirrored {
                return Err(Error::InvalidGeometry(format!(
                    "targeting entries {i} and {} are not mirror images",
                    n - 1 - i
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: TargetingTable = serde_json::from_str(json)?;
        Self::from_entries(table.entries)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn zone_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn entry(&self, zone_affinity_index: usize) -> Option<&TargetEntry> {
        self.entries.get(zone_affinity_index)
    }

    /// Uniform pick among the offsets registered for the index
    pub fn pick_launch_offset<R: Rng>(
        &self,
        zone_affinity_index: usize,
        rng: &mut R,
    ) -> Option<Display> {
        let offsets = &self.entries.get(zone_affinity_index)?.offsets;
        if offsets.is_empty() {
            return None;
        }
        Some(offsets[rng.random_range(0..offsets.len())])
    }
}
