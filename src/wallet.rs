//! Currency, multipliers, and payout ledgers
//!
//! Money never touches floating point: wagers are whole minor units (cents)
//! and multipliers are basis points, so `10 x 4.5` is exactly `45`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minor units per whole currency unit
pub const MINOR_PER_UNIT: u64 = 100;

/// Basis points per 1.0x
pub const MULTIPLIER_BASIS: u32 = 10_000;

/// Balance a fresh wallet starts with (1000.00)
pub const STARTING_BALANCE: Credits = Credits::from_units(1000);

/// An amount of currency in minor units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn from_units(units: u64) -> Self {
        Self(units * MINOR_PER_UNIT)
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: Credits) -> Option<Credits> {
        self.0.checked_sub(other.0).map(Credits)
    }

    pub fn saturating_add(self, other: Credits) -> Credits {
        Credits(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_PER_UNIT, self.0 % MINOR_PER_UNIT)
    }
}

impl FromStr for Credits {
    type Err = Error;

    /// Parse `"10"`, `"10.5"` or `"10.25"`. Signs, exponents and more than two
    /// decimals are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let invalid = || Error::InvalidWager(format!("{raw:?} is not a currency amount"));

        let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !digits(whole) || !digits(frac) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(Error::InvalidWager(format!(
                "{raw:?} has more than two decimal places"
            )));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|w| w.checked_add(frac))
            .map(Credits)
            .ok_or_else(invalid)
    }
}

/// A payout multiplier in basis points (`45_000` = 4.5x)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);

    pub const fn from_bp(bp: u32) -> Self {
        Self(bp)
    }

    pub const fn bp(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `wager * self`, truncated to whole minor units
    pub fn apply(self, wager: Credits) -> Credits {
        let product = wager.0 as u128 * self.0 as u128 / MULTIPLIER_BASIS as u128;
        Credits(product.min(u64::MAX as u128) as u64)
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MULTIPLIER_BASIS;
        let frac = self.0 % MULTIPLIER_BASIS;
        if frac == 0 {
            return write!(f, "{whole}x");
        }
        let digits = format!("{frac:04}");
        write!(f, "{whole}.{}x", digits.trim_end_matches('0'))
    }
}

/// Winnings for one scored ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub ball_id: u32,
    pub zone_index: usize,
    pub wager: Credits,
    pub multiplier: Multiplier,
    pub amount: Credits,
}

impl Payout {
    pub fn new(ball_id: u32, zone_index: usize, wager: Credits, multiplier: Multiplier) -> Self {
        Self {
            ball_id,
            zone_index,
            wager,
            multiplier,
            amount: multiplier.apply(wager),
        }
    }
}

/// Receives settlement events from the engine, in ball order within a tick.
pub trait PayoutLedger {
    /// Called exactly once for every ball that enters a zone
    fn on_payout(&mut self, payout: &Payout);

    /// Called once for a ball that left the board without entering a zone
    fn on_lost(&mut self, _ball_id: u32, _wager: Credits) {}
}

/// Recording ledger
impl PayoutLedger for Vec<Payout> {
    fn on_payout(&mut self, payout: &Payout) {
        self.push(*payout);
    }
}

/// Player balance with running totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    balance: Credits,
    wagered: Credits,
    won: Credits,
    payouts: u32,
    lost_balls: u32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(STARTING_BALANCE)
    }
}

impl Wallet {
    pub fn new(balance: Credits) -> Self {
        Self {
            balance,
            wagered: Credits::ZERO,
            won: Credits::ZERO,
            payouts: 0,
            lost_balls: 0,
        }
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn wagered(&self) -> Credits {
        self.wagered
    }

    pub fn won(&self) -> Credits {
        self.won
    }

    pub fn payouts(&self) -> u32 {
        self.payouts
    }

    pub fn lost_balls(&self) -> u32 {
        self.lost_balls
    }

    /// Debit a wager before the ball is dropped
    pub fn place_bet(&mut self, wager: Credits) -> Result<()> {
        if wager.is_zero() {
            return Err(Error::InvalidWager("wager must be positive".into()));
        }
        self.balance = self
            .balance
            .checked_sub(wager)
            .ok_or(Error::InsufficientBalance {
                wager,
                balance: self.balance,
            })?;
        self.wagered = self.wagered.saturating_add(wager);
        Ok(())
    }

    /// Winnings minus wagers, in minor units
    pub fn net(&self) -> i128 {
        self.won.minor() as i128 - self.wagered.minor() as i128
    }
}

impl PayoutLedger for Wallet {
    fn on_payout(&mut self, payout: &Payout) {
        self.balance = self.balance.saturating_add(payout.amount);
        self.won = self.won.saturating_add(payout.amount);
        self.payouts += 1;
        log::debug!(
            "Ball {} paid {} ({} x {}), balance {}",
            payout.ball_id,
            payout.amount,
            payout.wager,
            payout.multiplier,
            self.balance
        );
    }

    fn on_lost(&mut self, ball_id: u32, wager: Credits) {
        self.lost_balls += 1;
        log::debug!("Ball {} lost with wager {}", ball_id, wager);
    }
}
