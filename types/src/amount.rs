//! Coin amounts.
//!
//! Amounts are represented as fixed-point integers (atoms) to avoid
//! floating-point drift when summing outputs. The node reports output values
//! as floating-point coins; [`Amount::from_coins`] is the only lossy step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Number of atoms in one coin.
pub const ATOMS_PER_COIN: i64 = 100_000_000;

/// A coin amount in atoms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_atoms(atoms: i64) -> Self {
        Self(atoms)
    }

    /// Convert a floating-point coin value, rounding to the nearest atom.
    pub fn from_coins(coins: f64) -> Self {
        if !coins.is_finite() {
            return Self::ZERO;
        }
        Self((coins * ATOMS_PER_COIN as f64).round() as i64)
    }

    pub fn atoms(&self) -> i64 {
        self.0
    }

    pub fn to_coins(&self) -> f64 {
        self.0 as f64 / ATOMS_PER_COIN as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8} DCR", self.to_coins())
    }
}
