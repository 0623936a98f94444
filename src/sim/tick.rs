//! Simulation engine
//!
//! Owns the live balls of one board and advances them one fixed step per
//! `tick`. Multiple boards are multiple engines.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{Ball, Board, Settlement};
use super::targeting::{TargetingTable, derive_zone_affinity_index};
use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::fixed::Display;
use crate::frame::FrameSnapshot;
use crate::wallet::{Credits, PayoutLedger};

/// What a successful drop created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTicket {
    pub ball_id: u32,
    pub zone_affinity_index: usize,
    /// Signed launch offset from the board centre
    pub offset: Display,
}

/// Authoritative simulation state for one board
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    table: TargetingTable,
    /// Live balls, in drop order
    balls: Vec<Ball>,
    /// Zones scored into during the last tick
    zone_hits: Vec<bool>,
    rng: Pcg32,
    seed: u64,
    time_ticks: u64,
    next_id: u32,
}

impl Engine {
    /// Build the board, calibrate its targeting table, seed the RNG
    pub fn new(config: BoardConfig, seed: u64) -> Result<Self> {
        let board = Board::new(config)?;
        let table = TargetingTable::calibrate(&board)?;
        Self::with_table(board, table, seed)
    }

    /// Use a persisted or shared targeting table
    pub fn with_table(board: Board, table: TargetingTable, seed: u64) -> Result<Self> {
        if table.zone_count() != board.zone_count() {
            return Err(Error::InvalidGeometry(format!(
                "targeting table has {} entries for {} zones",
                table.zone_count(),
                board.zone_count()
            )));
        }

        log::info!("Engine ready, seed {}", seed);
        Ok(Self {
            zone_hits: vec![false; board.zone_count()],
            board,
            table,
            balls: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            time_ticks: 0,
            next_id: 0,
        })
    }

    /// Drop a ball with a binomially drawn affinity index
    ///
    /// The wager is checked before the RNG is touched, so a rejected request
    /// leaves the engine unchanged.
    pub fn request_drop(&mut self, wager: Credits) -> Result<DropTicket> {
        validate_wager(wager)?;
        let index = derive_zone_affinity_index(
            &mut self.rng,
            self.board.config().affinity_trials,
            self.board.zone_count(),
        );
        self.drop_ball(wager, index)
    }

    /// Drop a ball aimed at `zone_affinity_index`
    pub fn drop_ball(&mut self, wager: Credits, zone_affinity_index: usize) -> Result<DropTicket> {
        validate_wager(wager)?;
        let unknown = Error::UnknownZone {
            index: zone_affinity_index,
            zone_count: self.board.zone_count(),
        };
        if zone_affinity_index >= self.board.zone_count() {
            return Err(unknown);
        }
        let offset = self
            .table
            .pick_launch_offset(zone_affinity_index, &mut self.rng)
            .ok_or(unknown)?;

        let ball_id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.balls.push(self.board.spawn_ball(ball_id, offset, wager));

        log::debug!(
            "Ball {} dropped: wager {}, affinity {}, offset {}",
            ball_id,
            wager,
            zone_affinity_index,
            offset
        );
        Ok(DropTicket {
            ball_id,
            zone_affinity_index,
            offset,
        })
    }

    /// Advance one fixed step
    ///
    /// Balls that settled during the previous tick are removed first, so a
    /// settled ball is visible for exactly one frame after it settles.
    pub fn tick<L: PayoutLedger + ?Sized>(&mut self, ledger: &mut L) {
        self.balls.retain(|b| !b.pending_removal());
        self.zone_hits.fill(false);

        for ball in &mut self.balls {
            match ball.advance(&self.board) {
                Some(Settlement::Scored(payout)) => {
                    log::debug!(
                        "Ball {} scored in zone {} ({}): {}",
                        payout.ball_id,
                        payout.zone_index,
                        payout.multiplier,
                        payout.amount
                    );
                    self.zone_hits[payout.zone_index] = true;
                    ledger.on_payout(&payout);
                }
                Some(Settlement::Lost) => {
                    log::debug!("Ball {} lost at x {}", ball.id, ball.pos.x);
                    ledger.on_lost(ball.id, ball.wager);
                }
                None => {}
            }
        }

        self.time_ticks += 1;
    }

    /// Balls as of the last tick, settled ones included
    pub fn live_balls(&self) -> &[Ball] {
        &self.balls
    }

    /// One flag per zone: scored into during the last tick
    pub fn zone_hits(&self) -> &[bool] {
        &self.zone_hits
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn table(&self) -> &TargetingTable {
        &self.table
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// No ball still in play
    pub fn is_idle(&self) -> bool {
        self.balls.iter().all(Ball::pending_removal)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }
}

fn validate_wager(wager: Credits) -> Result<()> {
    if wager.is_zero() {
        return Err(Error::InvalidWager("wager must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::BallPhase;
    use crate::wallet::{Payout, Wallet};
    use std::sync::OnceLock;

    fn reference_table() -> &'static TargetingTable {
        static TABLE: OnceLock<TargetingTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let board = Board::new(BoardConfig::default()).unwrap();
            TargetingTable::calibrate(&board).unwrap()
        })
    }

    fn engine(seed: u64) -> Engine {
        let board = Board::new(BoardConfig::default()).unwrap();
        Engine::with_table(board, reference_table().clone(), seed).unwrap()
    }

    /// Tick until every ball has settled
    fn run_until_idle<L: PayoutLedger>(engine: &mut Engine, ledger: &mut L) {
        for _ in 0..=MAX_CALIBRATION_STEPS {
            if engine.is_idle() {
                return;
            }
            engine.tick(ledger);
        }
        panic!("balls still in play after {} ticks", MAX_CALIBRATION_STEPS);
    }

    #[test]
    fn test_center_drop_pays_zero_inside_center_zone() {
        let mut engine = engine(12345);
        let mut payouts: Vec<Payout> = Vec::new();
        let ticket = engine.drop_ball(Credits::from_units(10), 7).unwrap();

        run_until_idle(&mut engine, &mut payouts);

        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].ball_id, ticket.ball_id);
        assert_eq!(payouts[0].zone_index, 7);
        assert_eq!(payouts[0].amount, Credits::ZERO);

        let ball = &engine.live_balls()[0];
        let zone = &engine.board().zones()[7];
        let (left, right) = zone.catch_span(PEG_RADIUS);
        assert!(ball.pos.x > left && ball.pos.x < right);
        assert_eq!(ball.phase, BallPhase::Scored { zone_index: 7 });
    }

    #[test]
    fn test_settled_ball_is_removed_on_the_next_tick() {
        let mut engine = engine(1);
        let mut payouts: Vec<Payout> = Vec::new();
        engine.drop_ball(Credits::from_units(1), 7).unwrap();

        while payouts.is_empty() {
            assert!(engine.time_ticks() <= MAX_CALIBRATION_STEPS as u64);
            engine.tick(&mut payouts);
        }
        // Still visible for the frame in which it scored
        assert_eq!(engine.live_balls().len(), 1);
        assert!(engine.live_balls()[0].pending_removal());
        assert!(engine.zone_hits()[7]);
        assert_eq!(engine.snapshot().balls.len(), 1);

        engine.tick(&mut payouts);
        assert!(engine.live_balls().is_empty());
        assert!(engine.zone_hits().iter().all(|hit| !hit));
        assert_eq!(payouts.len(), 1);
    }

    #[test]
    fn test_each_ball_scores_at_most_once() {
        let mut engine = engine(99);
        let mut payouts: Vec<Payout> = Vec::new();
        for _ in 0..40 {
            engine.request_drop(Credits::from_units(1)).unwrap();
        }
        run_until_idle(&mut engine, &mut payouts);

        // A few extra ticks must not pay anything again
        for _ in 0..5 {
            engine.tick(&mut payouts);
        }

        let mut ids: Vec<u32> = payouts.iter().map(|p| p.ball_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), payouts.len());
        assert!(payouts.len() <= 40);
        assert!(engine.live_balls().is_empty());
    }

    #[test]
    fn test_no_ball_rests_inside_a_peg() {
        let mut engine = engine(7);
        let mut payouts: Vec<Payout> = Vec::new();
        for _ in 0..20 {
            engine.request_drop(Credits::from_units(1)).unwrap();
        }

        let board = engine.board().clone();
        for _ in 0..600 {
            engine.tick(&mut payouts);
            for ball in engine.live_balls() {
                for peg in board.pegs().pegs() {
                    let reach = ball.radius_internal() + peg.radius_internal();
                    assert!(
                        (ball.pos - peg.pos).length_squared() >= reach * reach,
                        "ball {} inside peg ({}, {}) at tick {}",
                        ball.id,
                        peg.row,
                        peg.col,
                        engine.time_ticks()
                    );
                }
            }
        }
    }

    #[test]
    fn test_landed_entries_reach_their_zone() {
        let mut engine = engine(2024);
        let mut payouts: Vec<Payout> = Vec::new();
        let mut expected = Vec::new();
        for (index, entry) in reference_table().entries().iter().enumerate() {
            if entry.landed {
                let ticket = engine.drop_ball(Credits::from_units(1), index).unwrap();
                expected.push((ticket.ball_id, index));
            }
        }
        run_until_idle(&mut engine, &mut payouts);

        for (ball_id, index) in expected {
            let payout = payouts.iter().find(|p| p.ball_id == ball_id).unwrap();
            assert_eq!(payout.zone_index, index);
        }
    }

    #[test]
    fn test_ball_stuck_on_a_peg_is_removed() {
        // Offset 0 lands dead centre on the apex peg and balances there
        let mut entries = reference_table().entries().to_vec();
        entries[7].offsets = vec![0];
        let table = TargetingTable::from_entries(entries).unwrap();
        let board = Board::new(BoardConfig::default()).unwrap();
        let mut engine = Engine::with_table(board, table, 8).unwrap();
        let mut wallet = Wallet::default();

        let ticket = engine.drop_ball(Credits::from_units(10), 7).unwrap();
        assert_eq!(ticket.offset, 0);
        run_until_idle(&mut engine, &mut wallet);

        assert_eq!(engine.live_balls()[0].phase, BallPhase::Lost);
        assert_eq!(wallet.lost_balls(), 1);
        assert_eq!(wallet.payouts(), 0);

        engine.tick(&mut wallet);
        assert!(engine.live_balls().is_empty());
    }

    #[test]
    fn test_same_seed_same_session() {
        let play = |seed| {
            let mut engine = engine(seed);
            let mut payouts: Vec<Payout> = Vec::new();
            let tickets: Vec<DropTicket> = (0..25)
                .map(|_| engine.request_drop(Credits::from_units(2)).unwrap())
                .collect();
            run_until_idle(&mut engine, &mut payouts);
            (tickets, payouts, engine.time_ticks())
        };

        assert_eq!(play(42), play(42));
    }

    #[test]
    fn test_invalid_drops_change_nothing() {
        let mut engine = engine(5);
        let before = engine.clone();

        assert!(matches!(
            engine.request_drop(Credits::ZERO),
            Err(Error::InvalidWager(_))
        ));
        assert!(matches!(
            engine.drop_ball(Credits::ZERO, 7),
            Err(Error::InvalidWager(_))
        ));
        assert!(matches!(
            engine.drop_ball(Credits::from_units(1), 15),
            Err(Error::UnknownZone {
                index: 15,
                zone_count: 15
            })
        ));

        assert!(engine.live_balls().is_empty());
        // RNG untouched: the next draw matches a fresh engine's
        let mut fresh = before;
        assert_eq!(
            engine.request_drop(Credits::from_units(1)).unwrap(),
            fresh.request_drop(Credits::from_units(1)).unwrap()
        );
    }

    #[test]
    fn test_table_must_match_board() {
        let config = BoardConfig {
            multipliers: REFERENCE_MULTIPLIERS[1..14].to_vec(),
            affinity_trials: 12,
            ..Default::default()
        };
        let board = Board::new(config).unwrap();
        assert!(matches!(
            Engine::with_table(board, reference_table().clone(), 0),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_wallet_session() {
        let mut engine = engine(31337);
        let mut wallet = Wallet::default();
        let wager = Credits::from_units(10);

        for _ in 0..10 {
            wallet.place_bet(wager).unwrap();
            engine.request_drop(wager).unwrap();
        }
        assert_eq!(wallet.balance(), Credits::from_units(900));

        run_until_idle(&mut engine, &mut wallet);
        assert_eq!(wallet.wagered(), Credits::from_units(100));
        assert_eq!(wallet.payouts() + wallet.lost_balls(), 10);
        assert_eq!(
            wallet.balance(),
            Credits::from_units(900).saturating_add(wallet.won())
        );
    }
}
