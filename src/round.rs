//! The rounding policy shared by every format in this crate.
//!
//! Every quantizer eventually faces the same question: an exact value lies between two adjacent
//! representable values `lo ≤ exact ≤ hi`, which one do we pick? [`Rounding`] answers it, either
//! deterministically ([`Rounding::Nearest`]) or randomly ([`Rounding::Stochastic`]).
//!
//! The random source is always passed in explicitly. There is no global generator: a caller that
//! wants reproducible results seeds its own, and concurrent workers each own one.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use rand::Rng;

use crate::Error;

/// Rounding mode applied when a value falls between two representable values.
#[derive(Debug, Default, Clone, Copy)]
#[derive(PartialEq, Eq, Hash)]
pub enum Rounding {
  /// Round to the closer of the two candidates; exact ties go away from zero.
  #[default]
  Nearest,
  /// Round up with probability proportional to the distance from the lower candidate, so that
  /// the expected result equals the exact value.
  Stochastic,
}

impl Rounding {
  /// Whether `exact`, with `lo ≤ exact ≤ hi`, should be rounded **up** to `hi` (`true`) or
  /// **down** to `lo` (`false`).
  ///
  /// For [`Rounding::Stochastic`] a uniform `u` in `[0, 1)` is drawn from `rng`, and the result
  /// rounds down iff `u ≥ (exact - lo) / (hi - lo)`. For [`Rounding::Nearest`] `rng` is not
  /// touched.
  ///
  /// If `hi` is infinite (the upper neighbour overflows an `f64`) the result always rounds down.
  pub fn round_up<R: Rng + ?Sized>(self, exact: f64, lo: f64, hi: f64, rng: &mut R) -> bool {
    debug_assert!(lo <= exact && exact <= hi, "{exact} is not between {lo} and {hi}");
    match self {
      Rounding::Nearest => nearest_up(exact, lo, hi),
      Rounding::Stochastic => stochastic_up(exact, lo, hi, rng.random::<f64>()),
    }
  }

  /// Round `exact` to an integer multiple of `quantum` (which must be positive and finite).
  ///
  /// # Example
  ///
  /// ```
  /// # use posit_quant::Rounding;
  /// let mut rng = rand::rng();
  /// assert_eq!(Rounding::Nearest.round(0.3, 0.25, &mut rng), 0.25);
  /// assert_eq!(Rounding::Nearest.round(0.375, 0.25, &mut rng), 0.5);
  /// assert_eq!(Rounding::Nearest.round(-0.375, 0.25, &mut rng), -0.5);
  /// ```
  pub fn round<R: Rng + ?Sized>(self, exact: f64, quantum: f64, rng: &mut R) -> f64 {
    debug_assert!(quantum > 0. && quantum.is_finite());
    if !exact.is_finite() { return exact }
    let scaled = exact / quantum;
    let lo = scaled.floor();
    if lo == scaled { return exact }
    let hi = lo + 1.;
    let multiple = if self.round_up(scaled, lo, hi, rng) {hi} else {lo};
    multiple * quantum
  }

  /// The token this mode is parsed from.
  pub const fn as_str(self) -> &'static str {
    match self {
      Rounding::Nearest => "nearest",
      Rounding::Stochastic => "stochastic",
    }
  }
}

/// Nearest, ties away from zero.
///
/// `exact` is compared against the midpoint `(lo + hi) / 2` without ever rounding the midpoint:
/// `sum + error` is exactly `lo + hi` (Knuth's two-sum), and doubling `exact` is exact. Only if
/// `lo + hi` overflows do we fall back to comparing the (rounded) distances.
pub(crate) fn nearest_up(exact: f64, lo: f64, hi: f64) -> bool {
  let sum = lo + hi;
  let twice = 2. * exact;
  if !(sum.is_finite() && twice.is_finite()) {
    let below = exact - lo;
    let above = hi - exact;
    return if below != above { below > above } else { exact > 0. }
  }
  match twice.partial_cmp(&sum) {
    Some(Ordering::Greater) => true,
    Some(Ordering::Less) => false,
    _ => {
      let error = two_sum_error(lo, hi, sum);
      if error != 0. { error < 0. } else { exact > 0. }
    },
  }
}

/// The rounding error of `sum = a + b`, such that `sum + error == a + b` exactly.
fn two_sum_error(a: f64, b: f64, sum: f64) -> f64 {
  let b_virtual = sum - a;
  let a_virtual = sum - b_virtual;
  (a - a_virtual) + (b - b_virtual)
}

fn stochastic_up(exact: f64, lo: f64, hi: f64, u: f64) -> bool {
  // If `hi - lo` is 0 or infinite, `p` is NaN or 0, and every comparison rounds down.
  let p = (exact - lo) / (hi - lo);
  u < p
}

impl FromStr for Rounding {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "nearest" => Ok(Rounding::Nearest),
      "stochastic" => Ok(Rounding::Stochastic),
      _ => Err(Error::InvalidRounding(s.to_owned())),
    }
  }
}

impl fmt::Display for Rounding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
