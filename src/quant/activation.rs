use crate::{Error, InvalidFormat, PositFormat};

/// Sigmoid and tanh evaluated directly on posit bit patterns.
///
/// For posits with no exponent bits, flipping the sign bit and shifting right by two places maps
/// the bits of `x` to (approximately) the bits of `sigmoid(x)`; this is the "fast sigmoid" of
/// Gustafson. Only formats with 0 exponent bits are accepted.
///
/// The scale of the format is not applied: the bit trick is defined for unscaled posits.
///
/// ```
/// # use posit_quant::{PositActivation, PositFormat};
/// let act = PositActivation::new(PositFormat::new(8, 0)?)?;
/// assert_eq!(act.sigmoid(0.0), 0.5);
/// assert_eq!(act.tanh(0.0), 0.0);
/// assert!(act.sigmoid(f32::NAN).is_nan());
/// # Ok::<(), posit_quant::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq)]
pub struct PositActivation {
  format: PositFormat,
}

impl PositActivation {
  /// Fails with [`InvalidFormat::ActivationExponentBits`] unless `format` has 0 exponent bits.
  pub fn new(format: PositFormat) -> Result<Self, Error> {
    if format.exponent_bits() != 0 {
      return Err(InvalidFormat::ActivationExponentBits(format.exponent_bits()).into())
    }
    let format = PositFormat::new(format.width(), 0)?;
    Ok(Self { format })
  }

  pub const fn format(&self) -> PositFormat {
    self.format
  }

  /// The posit approximation of `1 / (1 + e^-x)`. NaN (or anything that encodes to NaR) gives NaN.
  pub fn sigmoid(&self, x: f32) -> f32 {
    self.sigmoid_f64(x as f64) as f32
  }

  /// The posit approximation of `tanh(x)`, as `2 sigmoid(2x) - 1` re-encoded in the format. NaN
  /// gives NaN.
  pub fn tanh(&self, x: f32) -> f32 {
    let s = self.sigmoid_f64(2. * x as f64);
    if s.is_nan() {
      return f32::NAN
    }
    self.format.encode_nearest(2. * s - 1.).to_f64() as f32
  }

  fn sigmoid_f64(&self, x: f64) -> f64 {
    let p = self.format.encode_nearest(x);
    if p.is_nar() {
      return f64::NAN
    }
    // The shift is logical, on the `width`-bit pattern: the result is always a positive posit.
    let bits = (p.to_bits() ^ self.format.nar().to_bits()) >> 2;
    self.format.decode(bits)
  }

  /// Apply [`Self::sigmoid`] to every element of `data` in place.
  pub fn sigmoid_slice(&self, data: &mut [f32]) {
    for x in data {
      *x = self.sigmoid(*x);
    }
  }

  /// Apply [`Self::tanh`] to every element of `data` in place.
  pub fn tanh_slice(&self, data: &mut [f32]) {
    for x in data {
      *x = self.tanh(*x);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn activation(width: u32) -> PositActivation {
    PositActivation::new(PositFormat::new(width, 0).unwrap()).unwrap()
  }

  #[test]
  fn validation() {
    let p8 = PositFormat::new(8, 2).unwrap();
    assert_eq!(PositActivation::new(p8), Err(InvalidFormat::ActivationExponentBits(2).into()));
    let scaled = PositFormat::new(8, 0).unwrap().with_scale(0.5).unwrap();
    assert_eq!(PositActivation::new(scaled).map(|a| a.format().scale()), Ok(1.));
  }

  #[test]
  fn sigmoid_vectors() {
    let act = activation(8);
    assert_eq!(act.sigmoid(0.), 0.5);
    // 1 = 0b01000000 → 0b11000000 >> 2 = 0b00110000 = 0.75 (sigmoid(1) ≈ 0.731)
    assert_eq!(act.sigmoid(1.), 0.75);
    // -1 = 0b11000000 → 0b01000000 >> 2 = 0b00010000 = 0.25 (sigmoid(-1) ≈ 0.269)
    assert_eq!(act.sigmoid(-1.), 0.25);
    assert!(act.sigmoid(f32::NAN).is_nan());
    assert!(act.sigmoid(f32::INFINITY).is_nan());
  }

  #[test]
  fn sigmoid_approximates() {
    for width in [8, 16] {
      let act = activation(width);
      for i in -60 ..= 60 {
        let x = i as f32 / 10.;
        let exact = 1. / (1. + (-x).exp());
        let approx = act.sigmoid(x);
        assert!((approx - exact).abs() < 0.07, "sigmoid({x}) = {approx}, expected {exact}");
        assert!((0. ..= 1.).contains(&approx));
      }
    }
  }

  #[test]
  fn sigmoid_monotonic() {
    let act = activation(16);
    let mut prev = 0.;
    for i in -1000 ..= 1000 {
      let s = act.sigmoid(i as f32 / 50.);
      assert!(s >= prev, "sigmoid({}) = {s} < {prev}", i as f32 / 50.);
      prev = s;
    }
  }

  #[test]
  fn tanh_approximates() {
    for width in [8, 16] {
      let act = activation(width);
      assert_eq!(act.tanh(0.), 0.);
      for i in -30 ..= 30 {
        let x = i as f32 / 10.;
        let approx = act.tanh(x);
        assert!((approx - x.tanh()).abs() < 0.15, "tanh({x}) = {approx}, expected {}", x.tanh());
        assert!((-1. ..= 1.).contains(&approx));
      }
    }
    assert!(activation(8).tanh(f32::NAN).is_nan());
  }

  #[test]
  fn slices() {
    let act = activation(8);
    let mut data = [0., 1., -1.];
    act.sigmoid_slice(&mut data);
    assert_eq!(data, [0.5, 0.75, 0.25]);
    let mut data = [0., f32::NAN];
    act.tanh_slice(&mut data);
    assert_eq!(data[0], 0.);
    assert!(data[1].is_nan());
  }
}
