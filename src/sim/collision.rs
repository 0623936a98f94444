//! Ball/peg collision detection and response
//!
//! The response replaces the ball's velocity with the peg-relative escape
//! direction scaled by the incoming speed and two independent damping
//! coefficients. It is not a reflection: the prior direction is discarded,
//! which is what gives the board its scatter.
//!
//! The incidence angle `atan2(dy, dx)` is carried as its unit vector
//! `(dx, dy) / distance`. That keeps the response exactly mirror symmetric
//! under `x -> -x`, which the targeting table relies on.

use glam::{DVec2, I64Vec2};
use serde::{Deserialize, Serialize};

use super::peg::Peg;
use crate::fixed::Fixed;

/// How a step resolves a ball that overlaps several pegs at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Every overlapping peg, in field order, against the updated position.
    /// The last contact sets the velocity; push-outs accumulate.
    #[default]
    Sequential,
    /// Only the deepest overlap (lowest index on ties). Remaining overlaps
    /// are picked up on the next step.
    Deepest,
}

/// Velocity damping applied on every bounce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Friction {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Overlap between a ball and one peg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PegContact {
    /// Unit vector from peg centre toward ball centre
    pub normal: DVec2,
    /// Centre distance, internal units
    pub distance: f64,
    /// `radius sum - distance`, internal units
    pub penetration: f64,
}

/// Check a ball against one peg
///
/// Touching exactly (`distance == radius sum`) is not a contact.
pub fn ball_peg_contact(ball_pos: I64Vec2, ball_radius: Fixed, peg: &Peg) -> Option<PegContact> {
    let reach = ball_radius + peg.radius_internal();
    let delta = ball_pos - peg.pos;

    // Broad phase on each axis before squaring
    if delta.x.abs() >= reach || delta.y.abs() >= reach {
        return None;
    }

    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }

    let distance = (dist_sq as f64).sqrt();
    // Coincident centres: atan2(0, 0) = 0, push along +x
    let normal = if dist_sq == 0 {
        DVec2::X
    } else {
        delta.as_dvec2() / distance
    };

    Some(PegContact {
        normal,
        distance,
        penetration: reach as f64 - distance,
    })
}

/// Apply the bounce for one contact
///
/// The ball is re-seated one internal unit beyond the radius sum along the
/// contact normal, so integer rounding can never leave it overlapping.
pub fn bounce_off_peg(
    pos: &mut I64Vec2,
    vel: &mut I64Vec2,
    ball_radius: Fixed,
    peg: &Peg,
    contact: &PegContact,
    friction: Friction,
) {
    let speed = vel.as_dvec2().length();
    *vel = I64Vec2::new(
        (contact.normal.x * speed * friction.horizontal).round() as Fixed,
        (contact.normal.y * speed * friction.vertical).round() as Fixed,
    );

    let rest = (ball_radius + peg.radius_internal() + 1) as f64;
    *pos = peg.pos
        + I64Vec2::new(
            (contact.normal.x * rest).round() as Fixed,
            (contact.normal.y * rest).round() as Fixed,
        );
}

/// Resolve every peg contact for one step under `policy`
///
/// Returns the index of the peg that set the final velocity, if any.
pub fn resolve_peg_collisions(
    pos: &mut I64Vec2,
    vel: &mut I64Vec2,
    ball_radius: Fixed,
    pegs: &[Peg],
    friction: Friction,
    policy: CollisionPolicy,
) -> Option<usize> {
    match policy {
        CollisionPolicy::Sequential => {
            let mut last = None;
            for (i, peg) in pegs.iter().enumerate() {
                if let Some(contact) = ball_peg_contact(*pos, ball_radius, peg) {
                    bounce_off_peg(pos, vel, ball_radius, peg, &contact, friction);
                    last = Some(i);
                }
            }
            last
        }
        CollisionPolicy::Deepest => {
            let deepest = pegs
                .iter()
                .enumerate()
                .filter_map(|(i, peg)| ball_peg_contact(*pos, ball_radius, peg).map(|c| (i, c)))
                .fold(None, |best: Option<(usize, PegContact)>, (i, contact)| match best {
                    Some((_, b)) if b.penetration >= contact.penetration => best,
                    _ => Some((i, contact)),
                });

            let (i, contact) = deepest?;
            bounce_off_peg(pos, vel, ball_radius, &pegs[i], &contact, friction);
            Some(i)
        }
    }
}
