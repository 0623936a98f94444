//! Static peg lattice
//!
//! Row `r` (from `FIRST_PEG_ROW` up to, not including, the row count) holds
//! `r + 1` pegs centred on the board, so the field is a triangle that is
//! exactly mirror symmetric about `board_width / 2` in internal units.

use glam::I64Vec2;
use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::consts::FIRST_PEG_ROW;
use crate::fixed::{Display, Fixed, to_internal};

/// A static circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peg {
    /// Centre, internal units
    pub pos: I64Vec2,
    pub radius: Display,
    pub row: u32,
    pub col: u32,
}

impl Peg {
    #[inline]
    pub fn radius_internal(&self) -> Fixed {
        to_internal(self.radius)
    }
}

/// Immutable peg lattice, generated once per board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PegField {
    pegs: Vec<Peg>,
}

impl PegField {
    pub fn generate(
        row_count: u32,
        row_spacing: Display,
        col_spacing: Display,
        board_width: Display,
        peg_radius: Display,
    ) -> Self {
        let center_x = to_internal(board_width) / 2;
        let col_spacing = to_internal(col_spacing);
        let row_spacing = to_internal(row_spacing);

        let mut pegs = Vec::new();
        for row in FIRST_PEG_ROW..row_count {
            let r = row as Fixed;
            // Left edge sits col_spacing * row / 2 from the centre
            let left = center_x - col_spacing * r / 2;
            let y = r * row_spacing;
            for col in 0..=row {
                pegs.push(Peg {
                    pos: I64Vec2::new(left + col_spacing * col as Fixed, y),
                    radius: peg_radius,
                    row,
                    col,
                });
            }
        }

        Self { pegs }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::generate(
            config.peg_rows,
            config.row_spacing,
            config.col_spacing,
            config.board_width,
            config.peg_radius,
        )
    }

    pub fn pegs(&self) -> &[Peg] {
        &self.pegs
    }

    pub fn len(&self) -> usize {
        self.pegs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pegs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn is_mirror_symmetric(field: &PegField, board_width: Display) -> bool {
        let width = to_internal(board_width);
        field.pegs().iter().all(|peg| {
            let mirrored = I64Vec2::new(width - peg.pos.x, peg.pos.y);
            field.pegs().iter().any(|other| other.pos == mirrored)
        })
    }

    #[test]
    fn test_reference_field() {
        let field = PegField::from_config(&BoardConfig::default());
        // rows 2..=15 hold 3..=16 pegs
        assert_eq!(field.len(), (3..=16).sum::<usize>());

        let top: Vec<_> = field.pegs().iter().filter(|p| p.row == 2).collect();
        assert_eq!(top.len(), 3);
        let xs: Vec<_> = top.iter().map(|p| p.pos.x).collect();
        assert_eq!(xs, vec![to_internal(364), to_internal(400), to_internal(436)]);
        assert!(top.iter().all(|p| p.pos.y == to_internal(70)));
        assert!(top.iter().all(|p| p.radius == PEG_RADIUS));

        let bottom = field.pegs().last().unwrap();
        assert_eq!(bottom.row, 15);
        assert_eq!(bottom.pos, I64Vec2::new(to_internal(670), to_internal(525)));
    }

    #[test]
    fn test_reference_field_is_symmetric() {
        let field = PegField::from_config(&BoardConfig::default());
        assert!(is_mirror_symmetric(&field, BOARD_WIDTH));
    }

    #[test]
    fn test_no_rows_means_no_pegs() {
        let field = PegField::generate(FIRST_PEG_ROW, 35, 36, 800, 4);
        assert!(field.is_empty());
    }

    proptest! {
        #[test]
        fn prop_field_is_symmetric(
            rows in 3u32..24,
            row_spacing in 1i32..60,
            col_spacing in 1i32..60,
            board_width in 1i32..2_000,
        ) {
            let field = PegField::generate(rows, row_spacing, col_spacing, board_width, 4);
            let expected: u32 = (FIRST_PEG_ROW..rows).map(|r| r + 1).sum();
            prop_assert_eq!(field.len(), expected as usize);
            prop_assert!(is_mirror_symmetric(&field, board_width));
        }
    }
}
