use rand::Rng;

use crate::{Error, InvalidFormat, Rounding};

/// A number format given by an explicit table of representable magnitudes.
///
/// The table lists non-negative magnitudes in strictly ascending order; zero is always
/// representable, even if it is not listed, and negative values use the same table with their
/// sign preserved. Every value is divided by `scale` before the lookup and multiplied by it
/// afterwards.
#[derive(Debug, Clone)]
#[derive(PartialEq)]
pub struct LookupTable {
  entries: Vec<f32>,
  scale: f32,
  hints: Option<Vec<f32>>,
}

impl LookupTable {
  /// A table with the given `entries` and `scale`, rounding between neighbouring entries with the
  /// [`Rounding`] policy.
  pub fn new(entries: Vec<f32>, scale: f32) -> Result<Self, Error> {
    if !(scale.is_finite() && scale > 0.) {
      return Err(InvalidFormat::Scale.into())
    }
    let valid = !entries.is_empty()
      && entries.iter().all(|&t| t.is_finite() && t >= 0.)
      && entries.windows(2).all(|w| w[0] < w[1]);
    if !valid {
      return Err(InvalidFormat::LookupTable.into())
    }
    log::debug!("constructed lookup table with {} entries, scale {scale}", entries.len());
    Ok(Self { entries, scale, hints: None })
  }

  /// Replace nearest/stochastic rounding by explicit thresholds, one per entry: a magnitude
  /// `≥ hints[i]` maps at least to `entries[i]`, and a magnitude below `hints[0]` maps to zero.
  ///
  /// The hints must be finite and ascending. With hints, the rounding policy passed to
  /// [`Self::quantize`] is ignored.
  pub fn with_rounding_hints(self, hints: Vec<f32>) -> Result<Self, Error> {
    let valid = hints.len() == self.entries.len()
      && hints.iter().all(|h| h.is_finite())
      && hints.windows(2).all(|w| w[0] <= w[1]);
    if !valid {
      return Err(InvalidFormat::LookupTable.into())
    }
    Ok(Self { hints: Some(hints), ..self })
  }

  /// Round by geometric mean: the threshold between two entries is `sqrt(t[i-1] · t[i])`, and
  /// anything below `1e-4` maps to zero.
  pub fn with_geomean_hints(self) -> Result<Self, Error> {
    let hints = std::iter::once(1e-4)
      .chain(self.entries.windows(2).map(|w| (w[0] * w[1]).sqrt()))
      .collect();
    self.with_rounding_hints(hints)
  }

  pub fn entries(&self) -> &[f32] {
    &self.entries
  }

  pub fn scale(&self) -> f32 {
    self.scale
  }

  /// Quantize `x` to the closest entries of the table, saturating at the last entry. NaN is
  /// returned unchanged.
  ///
  /// ```
  /// # use posit_quant::{LookupTable, Rounding};
  /// let table = LookupTable::new(vec![0.5, 1.0, 4.0], 1.0)?;
  /// let mut rng = rand::rng();
  /// assert_eq!(table.quantize(0.2, Rounding::Nearest, &mut rng), 0.0);
  /// assert_eq!(table.quantize(-0.8, Rounding::Nearest, &mut rng), -1.0);
  /// assert_eq!(table.quantize(3.0, Rounding::Nearest, &mut rng), 4.0);
  /// assert_eq!(table.quantize(100.0, Rounding::Nearest, &mut rng), 4.0);
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn quantize<R: Rng + ?Sized>(&self, x: f32, rounding: Rounding, rng: &mut R) -> f32 {
    if x.is_nan() {
      return x
    }
    let magnitude = x.abs() / self.scale;
    let value = match &self.hints {
      Some(hints) => self.lookup_hinted(magnitude, hints),
      None => self.lookup(magnitude, rounding, rng),
    };
    (value * self.scale).copysign(x)
  }

  fn lookup<R: Rng + ?Sized>(&self, magnitude: f32, rounding: Rounding, rng: &mut R) -> f32 {
    // Index of the first entry > magnitude
    let i = self.entries.partition_point(|&t| t <= magnitude);
    let Some(&hi) = self.entries.get(i) else {
      return self.entries[self.entries.len() - 1]
    };
    let lo = if i == 0 { 0. } else { self.entries[i - 1] };
    if lo == magnitude {
      return lo
    }
    let up = rounding.round_up(magnitude as f64, lo as f64, hi as f64, rng);
    if up { hi } else { lo }
  }

  fn lookup_hinted(&self, magnitude: f32, hints: &[f32]) -> f32 {
    // Number of thresholds that are ≤ magnitude
    match hints.partition_point(|&h| h <= magnitude) {
      0 => 0.,
      i => self.entries[i - 1],
    }
  }

  /// Quantize every element of `data` in place.
  pub fn quantize_slice<R: Rng + ?Sized>(&self, data: &mut [f32], rounding: Rounding, rng: &mut R) {
    for x in data {
      *x = self.quantize(*x, rounding, rng);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use rand::SeedableRng;
  use rand::rngs::SmallRng;

  fn table() -> LookupTable {
    LookupTable::new(vec![0.25, 0.5, 1., 2., 4.], 1.).unwrap()
  }

  #[test]
  fn validation() {
    assert_eq!(LookupTable::new(vec![], 1.), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(LookupTable::new(vec![1., 1.], 1.), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(LookupTable::new(vec![2., 1.], 1.), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(LookupTable::new(vec![-1., 1.], 1.), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(LookupTable::new(vec![1., f32::NAN], 1.), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(LookupTable::new(vec![1.], 0.), Err(InvalidFormat::Scale.into()));
    assert!(LookupTable::new(vec![0., 1.], 2.).is_ok());
    assert_eq!(table().with_rounding_hints(vec![0.1]), Err(InvalidFormat::LookupTable.into()));
    assert_eq!(
      table().with_rounding_hints(vec![0.1, 0.3, 0.2, 1., 3.]),
      Err(InvalidFormat::LookupTable.into()),
    );
  }

  #[test]
  fn nearest() {
    let t = table();
    let mut rng = SmallRng::seed_from_u64(0);
    let mut q = |x| t.quantize(x, Rounding::Nearest, &mut rng);
    assert_eq!(q(0.), 0.);
    assert_eq!(q(0.1), 0.);
    assert_eq!(q(0.125), 0.25);
    assert_eq!(q(0.3), 0.25);
    assert_eq!(q(0.5), 0.5);
    assert_eq!(q(1.4), 1.);
    assert_eq!(q(1.6), 2.);
    assert_eq!(q(-1.6), -2.);
    assert_eq!(q(-0.1), 0.);
    assert_eq!(q(1e9), 4.);
    assert_eq!(q(f32::NEG_INFINITY), -4.);
    assert!(q(f32::NAN).is_nan());
  }

  #[test]
  fn scale() {
    let t = LookupTable::new(vec![1., 2., 3.], 0.5).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(t.quantize(0.6, Rounding::Nearest, &mut rng), 0.5);
    assert_eq!(t.quantize(-1.2, Rounding::Nearest, &mut rng), -1.);
    assert_eq!(t.quantize(10., Rounding::Nearest, &mut rng), 1.5);
  }

  #[test]
  fn stochastic() {
    let t = table();
    let mut rng = SmallRng::seed_from_u64(2);
    const TRIALS: usize = 50_000;
    let mut sum = 0.;
    for _ in 0 .. TRIALS {
      let x = t.quantize(1.25, Rounding::Stochastic, &mut rng);
      assert!(x == 1. || x == 2., "{x}");
      sum += x as f64;
    }
    let mean = sum / TRIALS as f64;
    assert!((mean - 1.25).abs() < 0.01, "{mean}");
  }

  #[test]
  fn rounding_hints() {
    let t = table().with_rounding_hints(vec![0.2, 0.3, 0.9, 1.9, 3.9]).unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut q = |x| t.quantize(x, Rounding::Stochastic, &mut rng);
    assert_eq!(q(0.19), 0.);
    assert_eq!(q(0.2), 0.25);
    assert_eq!(q(0.45), 0.5);
    assert_eq!(q(0.9), 1.);
    assert_eq!(q(-1.95), -2.);
    assert_eq!(q(1e9), 4.);
  }

  #[test]
  fn geomean_hints() {
    let t = LookupTable::new(vec![1., 4., 16.], 1.).unwrap().with_geomean_hints().unwrap();
    let mut rng = SmallRng::seed_from_u64(4);
    let mut q = |x| t.quantize(x, Rounding::Nearest, &mut rng);
    assert_eq!(q(5e-5), 0.);
    assert_eq!(q(1e-3), 1.);
    assert_eq!(q(1.9), 1.);
    assert_eq!(q(2.), 4.);
    assert_eq!(q(7.9), 4.);
    assert_eq!(q(8.), 16.);
  }
}
