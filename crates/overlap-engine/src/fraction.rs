//! Exact rational arithmetic for slot widths.
//!
//! Column fractions must sum to exactly one across a cluster, so widths are
//! never represented as floating point. A [`Fraction`] is always stored in
//! lowest terms with a positive denominator; every operation reduces its
//! result by the greatest common divisor.

use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::{Add, Sub};

use serde::Serialize;

/// A reduced rational number `numer / denom` with `denom > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fraction {
    numer: i64,
    denom: i64,
}

impl Fraction {
    /// Zero (`0/1`).
    pub const ZERO: Fraction = Fraction { numer: 0, denom: 1 };

    /// One (`1/1`), the full track width.
    pub const ONE: Fraction = Fraction { numer: 1, denom: 1 };

    /// Create a fraction in lowest terms.
    ///
    /// The sign is carried by the numerator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero, like integer division by zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use overlap_engine::Fraction;
    ///
    /// let f = Fraction::new(6, -8);
    /// assert_eq!(f.numer(), -3);
    /// assert_eq!(f.denom(), 4);
    /// ```
    pub fn new(numer: i64, denom: i64) -> Self {
        assert!(denom != 0, "fraction denominator must be non-zero");
        reduce(numer as i128, denom as i128)
    }

    /// The whole number `n` as `n/1`.
    pub const fn from_integer(n: i64) -> Self {
        Fraction { numer: n, denom: 1 }
    }

    pub fn numer(&self) -> i64 {
        self.numer
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    /// Divide by a positive integer. Returns `None` when `divisor <= 0`.
    pub fn checked_div_int(self, divisor: i64) -> Option<Self> {
        if divisor <= 0 {
            return None;
        }
        Some(reduce(self.numer as i128, self.denom as i128 * divisor as i128))
    }

    /// Split into `parts` equal shares.
    pub fn div_count(self, parts: NonZeroUsize) -> Self {
        reduce(self.numer as i128, self.denom as i128 * parts.get() as i128)
    }

    /// Lossy conversion for presentation code.
    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Fraction::ZERO
    }
}

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Fraction) -> Fraction {
        let (a, b) = widen(self, rhs);
        reduce(a.0 * b.1 + b.0 * a.1, a.1 * b.1)
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Fraction) -> Fraction {
        let (a, b) = widen(self, rhs);
        reduce(a.0 * b.1 - b.0 * a.1, a.1 * b.1)
    }
}

impl std::iter::Sum for Fraction {
    fn sum<I: Iterator<Item = Fraction>>(iter: I) -> Fraction {
        iter.fold(Fraction::ZERO, |acc, f| acc + f)
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying preserves order.
        let (a, b) = widen(*self, *other);
        (a.0 * b.1).cmp(&(b.0 * a.1))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn widen(a: Fraction, b: Fraction) -> ((i128, i128), (i128, i128)) {
    (
        (a.numer as i128, a.denom as i128),
        (b.numer as i128, b.denom as i128),
    )
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a.max(1)
}

/// Reduce in 128-bit space, then narrow. Column counts are products of small
/// cluster sizes, so the reduced parts always fit in `i64`.
fn reduce(numer: i128, denom: i128) -> Fraction {
    let (numer, denom) = if denom < 0 { (-numer, -denom) } else { (numer, denom) };
    let g = gcd(numer, denom);
    Fraction {
        numer: (numer / g) as i64,
        denom: (denom / g) as i64,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
