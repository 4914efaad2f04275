use rand::Rng;

use crate::{Error, InvalidFormat, Rounding};

/// A two's complement fixed point format with word length `wl` (including the sign) and `fl`
/// fractional bits.
///
/// Representable values are the multiples of `2^-fl` in `[-2^(wl-fl-1), 2^(wl-fl-1) - 2^-fl]`.
/// Values outside the range are clamped, unless [`Self::with_clamp`] turns it off (in which case
/// only the effect on precision is simulated). A [symmetric](Self::with_symmetric) format discards
/// the most negative value.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub struct FixedPoint {
  wl: i32,
  fl: i32,
  clamp: bool,
  symmetric: bool,
}

impl FixedPoint {
  /// A fixed point format with `1 ≤ wl ≤ 32` and `-32 ≤ fl < wl`, clamping, not symmetric.
  pub fn new(wl: i32, fl: i32) -> Result<Self, Error> {
    if !(1 ..= 32).contains(&wl) || !(-32 .. wl).contains(&fl) {
      return Err(InvalidFormat::FixedPoint { wl, fl }.into())
    }
    let format = Self { wl, fl, clamp: true, symmetric: false };
    log::debug!("constructed {format:?}");
    Ok(format)
  }

  pub fn with_clamp(self, clamp: bool) -> Self {
    Self { clamp, ..self }
  }

  pub fn with_symmetric(self, symmetric: bool) -> Self {
    Self { symmetric, ..self }
  }

  pub const fn wl(&self) -> i32 {
    self.wl
  }

  pub const fn fl(&self) -> i32 {
    self.fl
  }

  /// The distance between adjacent representable values, `2^-fl`.
  pub fn quantum(&self) -> f64 {
    (-self.fl as f64).exp2()
  }

  /// The smallest and largest representable values, `(t_min, t_max)`.
  pub fn range(&self) -> (f64, f64) {
    let half = ((self.wl - self.fl - 1) as f64).exp2();
    let t_max = half - self.quantum();
    let t_min = if self.symmetric { -t_max } else { -half };
    (t_min, t_max)
  }

  /// Quantize `x` to this format.
  pub fn quantize<R: Rng + ?Sized>(&self, x: f32, rounding: Rounding, rng: &mut R) -> f32 {
    self.quantize_with_mask(x, rounding, rng).0
  }

  /// Quantize `x` to this format, and also report whether it had to be clamped.
  ///
  /// The flag is what a training loop uses to zero the gradient of clamped activations. It is
  /// always `false` if clamping is disabled.
  ///
  /// ```
  /// # use posit_quant::{FixedPoint, Rounding};
  /// let q = FixedPoint::new(4, 2)?;  // [-2, 1.75] in steps of 0.25
  /// let mut rng = rand::rng();
  /// assert_eq!(q.quantize_with_mask(0.3, Rounding::Nearest, &mut rng), (0.25, false));
  /// assert_eq!(q.quantize_with_mask(5.0, Rounding::Nearest, &mut rng), (1.75, true));
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn quantize_with_mask<R: Rng + ?Sized>(
    &self,
    x: f32,
    rounding: Rounding,
    rng: &mut R,
  ) -> (f32, bool) {
    let rounded = rounding.round(x as f64, self.quantum(), rng);
    if !self.clamp || rounded.is_nan() {
      return (rounded as f32, false)
    }
    let (t_min, t_max) = self.range();
    let clamped = rounded < t_min || rounded > t_max;
    (rounded.clamp(t_min, t_max) as f32, clamped)
  }

  /// Quantize every element of `data` in place.
  pub fn quantize_slice<R: Rng + ?Sized>(&self, data: &mut [f32], rounding: Rounding, rng: &mut R) {
    for x in data {
      *x = self.quantize(*x, rounding, rng);
    }
  }

  /// Quantize every element of `data` in place, and write to `mask` whether it was clamped.
  ///
  /// # Panics
  ///
  /// If `data` and `mask` have different lengths.
  pub fn quantize_slice_with_mask<R: Rng + ?Sized>(
    &self,
    data: &mut [f32],
    mask: &mut [bool],
    rounding: Rounding,
    rng: &mut R,
  ) {
    assert_eq!(data.len(), mask.len(), "data and mask lengths differ");
    for (x, clamped) in data.iter_mut().zip(mask) {
      (*x, *clamped) = self.quantize_with_mask(*x, rounding, rng);
    }
  }
}
