//! Read-only frame state for renderers
//!
//! Everything here is in display units. Snapshots are taken between ticks;
//! the peg field and zones never change, so a renderer uploads them once.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::error::Result;
use crate::fixed::to_display_f32;
use crate::sim::{Ball, BallPhase, Engine, PegField};

/// Circle tags: what a [`CircleInstance`] is, for colouring
pub mod tags {
    pub const PEG: u32 = 0;
    pub const BALL_FALLING: u32 = 1;
    pub const BALL_COLLIDING: u32 = 2;
    pub const BALL_SCORED: u32 = 3;
    pub const BALL_LOST: u32 = 4;
}

/// One filled circle, laid out for direct GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub tag: u32,
}

/// A ball as the renderer sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub phase: BallPhase,
}

impl BallView {
    pub fn from_ball(ball: &Ball) -> Self {
        Self {
            id: ball.id,
            x: to_display_f32(ball.pos.x),
            y: to_display_f32(ball.pos.y),
            radius: ball.radius as f32,
            phase: ball.phase,
        }
    }

    pub fn instance(&self) -> CircleInstance {
        let tag = match self.phase {
            BallPhase::Falling => tags::BALL_FALLING,
            BallPhase::Colliding => tags::BALL_COLLIDING,
            BallPhase::Scored { .. } => tags::BALL_SCORED,
            BallPhase::Lost => tags::BALL_LOST,
        };
        CircleInstance {
            center: [self.x, self.y],
            radius: self.radius,
            tag,
        }
    }
}

/// Dynamic state after one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub balls: Vec<BallView>,
    /// Zones scored into during this tick ("just hit")
    pub zone_hits: Vec<bool>,
}

impl FrameSnapshot {
    pub fn capture(engine: &Engine) -> Self {
        Self {
            tick: engine.time_ticks(),
            balls: engine.live_balls().iter().map(BallView::from_ball).collect(),
            zone_hits: engine.zone_hits().to_vec(),
        }
    }

    pub fn ball_instances(&self) -> Vec<CircleInstance> {
        self.balls.iter().map(BallView::instance).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Static peg circles
pub fn peg_instances(field: &PegField) -> Vec<CircleInstance> {
    field
        .pegs()
        .iter()
        .map(|peg| CircleInstance {
            center: [to_display_f32(peg.pos.x), to_display_f32(peg.pos.y)],
            radius: peg.radius as f32,
            tag: tags::PEG,
        })
        .collect()
}
