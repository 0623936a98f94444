//! Payout zones beneath the peg field

use glam::I64Vec2;
use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::fixed::{Display, Fixed, to_internal};
use crate::wallet::Multiplier;

/// A horizontal payout band
///
/// `x` is the left edge, `y` the vertical centre. The catch span is narrowed
/// by one peg diameter on the right so neighbouring zones leave a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierZone {
    pub x: Display,
    pub y: Display,
    pub width: Display,
    pub height: Display,
    pub value: Multiplier,
    /// Distance from the centre zone; renderers map it to a colour
    pub tier: u8,
}

impl MultiplierZone {
    /// Lay out one zone per multiplier, centred on the board
    pub fn layout(config: &BoardConfig) -> Vec<Self> {
        let n = config.zone_count() as Display;
        let half_width = config.board_width / 2;

        config
            .multipliers
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let i = i as Display;
                let offset = ((2 * i - n) * config.zone_width).div_euclid(2);
                MultiplierZone {
                    x: half_width + offset + config.peg_radius,
                    y: config.zone_center_y,
                    width: config.zone_width,
                    height: config.zone_width,
                    value,
                    tier: ((2 * i).abs_diff(n - 1) / 2) as u8,
                }
            })
            .collect()
    }

    /// Open horizontal interval a ball centre must fall strictly inside
    pub fn catch_span(&self, peg_radius: Display) -> (Fixed, Fixed) {
        (
            to_internal(self.x),
            to_internal(self.x + self.width - 2 * peg_radius),
        )
    }

    /// Middle of the catch span
    pub fn center_x(&self, peg_radius: Display) -> Fixed {
        let (left, right) = self.catch_span(peg_radius);
        (left + right) / 2
    }

    /// Top edge
    pub fn top(&self) -> Fixed {
        to_internal(self.y) - to_internal(self.height) / 2
    }

    /// Ball centre strictly inside the span and bottom edge past the top
    pub fn captures(&self, pos: I64Vec2, ball_radius: Fixed, peg_radius: Display) -> bool {
        let (left, right) = self.catch_span(peg_radius);
        pos.x > left && pos.x < right && pos.y + ball_radius > self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn reference() -> Vec<MultiplierZone> {
        MultiplierZone::layout(&BoardConfig::default())
    }

    #[test]
    fn test_reference_layout() {
        let zones = reference();
        assert_eq!(zones.len(), 15);
        assert_eq!(zones[0].x, 134);
        assert_eq!(zones[7].x, 386);
        assert_eq!(zones[14].x, 638);
        assert!(zones.iter().all(|z| z.y == 560 && z.height == 36));
        assert_eq!(zones[7].value, Multiplier::ZERO);
        assert_eq!(zones[7].tier, 0);
        assert_eq!(zones[0].tier, 7);
        assert_eq!(zones[7].top(), to_internal(542));
    }

    #[test]
    fn test_zones_are_symmetric() {
        let zones = reference();
        let width = to_internal(BOARD_WIDTH);
        for (i, zone) in zones.iter().enumerate() {
            let mirror = &zones[zones.len() - 1 - i];
            let (left, right) = zone.catch_span(PEG_RADIUS);
            let (m_left, m_right) = mirror.catch_span(PEG_RADIUS);
            assert_eq!(width - right, m_left);
            assert_eq!(width - left, m_right);
            assert_eq!(zone.value, mirror.value);
            assert_eq!(zone.tier, mirror.tier);
        }
    }

    #[test]
    fn test_multipliers_fall_toward_center() {
        let zones = reference();
        for pair in zones[..8].windows(2) {
            assert!(pair[0].value > pair[1].value);
        }
    }

    #[test]
    fn test_captures_is_strict() {
        let zone = reference()[7];
        let r = to_internal(BALL_RADIUS);
        let y = zone.top();

        assert!(zone.captures(I64Vec2::new(to_internal(400), y), r, PEG_RADIUS));
        // Edges of the span do not count
        assert!(!zone.captures(I64Vec2::new(to_internal(386), y), r, PEG_RADIUS));
        assert!(!zone.captures(I64Vec2::new(to_internal(414), y), r, PEG_RADIUS));
        assert!(zone.captures(I64Vec2::new(to_internal(414) - 1, y), r, PEG_RADIUS));
        // Bottom edge exactly on the top edge is not a crossing
        assert!(!zone.captures(I64Vec2::new(to_internal(400), y - r), r, PEG_RADIUS));
        assert!(zone.captures(I64Vec2::new(to_internal(400), y - r + 1), r, PEG_RADIUS));
    }

    #[test]
    fn test_center_x() {
        let zone = reference()[7];
        assert_eq!(zone.center_x(PEG_RADIUS), to_internal(400));
    }
}
