//! Plinko headless entry point
//!
//! Plays a seeded session against the reference board and prints where the
//! balls landed. A rendering shell drives the engine the same way: feed wall
//! clock time into the accumulator, tick at the fixed rate, draw the snapshot.
//!
//! Usage: `plinko [seed] [balls] [wager]`, e.g. `RUST_LOG=debug plinko 7 200 1.50`

use std::error::Error;
use std::process::ExitCode;

use plinko::consts::*;
use plinko::{BoardConfig, Credits, Engine, Payout, PayoutLedger, Wallet};

/// Simulated frame time; two fixed steps per frame
const FRAME_DT: f32 = 1.0 / 30.0;
/// Frames between drop requests
const DROP_INTERVAL: u32 = 3;

/// Wallet plus a landing histogram
struct SessionLedger {
    wallet: Wallet,
    landings: Vec<u32>,
}

impl PayoutLedger for SessionLedger {
    fn on_payout(&mut self, payout: &Payout) {
        self.landings[payout.zone_index] += 1;
        self.wallet.on_payout(payout);
    }

    fn on_lost(&mut self, ball_id: u32, wager: Credits) {
        self.wallet.on_lost(ball_id, wager);
    }
}

struct Args {
    seed: u64,
    balls: u32,
    wager: Credits,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>().map_err(|e| format!("bad seed {s:?}: {e}"))?,
        None => 12345,
    };
    let balls = match args.next() {
        Some(s) => s.parse::<u32>().map_err(|e| format!("bad ball count {s:?}: {e}"))?,
        None => 100,
    };
    let wager = match args.next() {
        Some(s) => s.parse::<Credits>()?,
        None => Credits::from_units(1),
    };
    Ok(Args { seed, balls, wager })
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    log::info!(
        "Plinko (native) starting: seed {}, {} balls at {}",
        args.seed,
        args.balls,
        args.wager
    );

    let config = BoardConfig::default();
    let zone_count = config.zone_count();
    let mut engine = Engine::new(config, args.seed)?;
    let mut ledger = SessionLedger {
        wallet: Wallet::default(),
        landings: vec![0; zone_count],
    };

    let mut accumulator = 0.0;
    let mut dropped = 0;
    let mut frame = 0u32;
    loop {
        if dropped < args.balls && frame % DROP_INTERVAL == 0 {
            match ledger.wallet.place_bet(args.wager) {
                Ok(()) => {
                    engine.request_drop(args.wager)?;
                    dropped += 1;
                }
                Err(e) => {
                    log::warn!("Stopping drops: {}", e);
                    dropped = args.balls;
                }
            }
        }

        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            engine.tick(&mut ledger);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        let snapshot = engine.snapshot();
        if snapshot.zone_hits.iter().any(|&hit| hit) {
            log::trace!("Frame {}: {}", frame, snapshot.to_json()?);
        }

        frame += 1;
        if dropped >= args.balls && engine.is_idle() {
            break;
        }
    }

    let wallet = &ledger.wallet;
    println!(
        "{} balls over {} ticks ({:.1} s simulated)",
        wallet.payouts() + wallet.lost_balls(),
        engine.time_ticks(),
        engine.time_ticks() as f32 * SIM_DT
    );
    let peak = ledger.landings.iter().copied().max().unwrap_or(0).max(1);
    for (zone, count) in engine.board().zones().iter().zip(&ledger.landings) {
        let bar = "#".repeat((count * 40 / peak) as usize);
        println!("{:>6} {:>5} {}", zone.value.to_string(), count, bar);
    }
    if wallet.lost_balls() > 0 {
        println!("  lost {:>5}", wallet.lost_balls());
    }
    println!(
        "wagered {}, won {}, balance {}",
        wallet.wagered(),
        wallet.won(),
        wallet.balance()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
