use rand::Rng;

use crate::{Error, InvalidFormat, Rounding};

/// An IEEE-like binary floating point format with `exp` exponent bits and `man` mantissa bits
/// (not counting the hidden bit), simulated inside an `f32`.
///
/// The exponent range is symmetric, `[1 - 2^(exp-1), 2^(exp-1) - 1]`, with no codes reserved for
/// infinities, and there are no subnormals. Values above the largest normal saturate. Values below
/// the smallest normal go to zero or to the smallest normal: with [`Rounding::Nearest`], only those
/// above half the smallest normal round up; with [`Rounding::Stochastic`], each rounds up with
/// probability proportional to its magnitude.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub struct FloatingPoint {
  exp: u32,
  man: u32,
}

const MANTISSA_BITS: u32 = f32::MANTISSA_DIGITS - 1;
const BIAS: i32 = f32::MAX_EXP - 1;
const SIGN: u32 = 1 << 31;

impl FloatingPoint {
  /// A format with `1 ≤ exp ≤ 8` exponent bits and `0 ≤ man ≤ 23` mantissa bits.
  pub fn new(exp: u32, man: u32) -> Result<Self, Error> {
    if !(1 ..= 8).contains(&exp) || man > MANTISSA_BITS {
      return Err(InvalidFormat::FloatingPoint { exp, man }.into())
    }
    let format = Self { exp, man };
    log::debug!("constructed {format:?}");
    Ok(format)
  }

  pub const fn exp(&self) -> u32 {
    self.exp
  }

  pub const fn man(&self) -> u32 {
    self.man
  }

  /// The smallest and largest biased (`f32`) exponents of a normal number in this format.
  const fn exponent_range(&self) -> (i32, i32) {
    let half = 1 << (self.exp - 1);
    let max = half - 1 + BIAS;
    let min = 1 - half + BIAS;
    // With 8 exponent bits the range would reach into the subnormals of `f32`.
    (if min < 1 { 1 } else { min }, max)
  }

  /// The largest finite value of this format.
  pub fn max_value(&self) -> f32 {
    let (_, max) = self.exponent_range();
    f32::from_bits(((max as u32) << MANTISSA_BITS) | self.mantissa_mask())
  }

  /// The smallest positive (normal) value of this format.
  pub fn min_positive_value(&self) -> f32 {
    let (min, _) = self.exponent_range();
    f32::from_bits((min as u32) << MANTISSA_BITS)
  }

  /// The mantissa bits of an `f32` that this format keeps.
  const fn mantissa_mask(&self) -> u32 {
    let dropped = MANTISSA_BITS - self.man;
    ((1 << MANTISSA_BITS) - 1) >> dropped << dropped
  }

  /// Quantize `x` to this format. NaN and infinities are returned unchanged.
  ///
  /// ```
  /// # use posit_quant::{FloatingPoint, Rounding};
  /// let e5m2 = FloatingPoint::new(5, 2)?;
  /// let mut rng = rand::rng();
  /// assert_eq!(e5m2.quantize(1.3, Rounding::Nearest, &mut rng), 1.25);
  /// assert_eq!(e5m2.quantize(1e6, Rounding::Nearest, &mut rng), 57344.0);
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn quantize<R: Rng + ?Sized>(&self, x: f32, rounding: Rounding, rng: &mut R) -> f32 {
    if !x.is_finite() {
      return x
    }
    let old = x.to_bits();
    let rounded = self.round_mantissa(old, rounding, rng);
    f32::from_bits(self.clip_exponent(old, rounded, rounding, rng))
  }

  /// Round the bits of an `f32` to `man` mantissa bits, by adding an offset to the dropped bits
  /// and then truncating them: half of the last kept place for nearest rounding, or uniformly
  /// random dropped bits for stochastic rounding. A carry out of the mantissa correctly bumps the
  /// exponent.
  fn round_mantissa<R: Rng + ?Sized>(&self, bits: u32, rounding: Rounding, rng: &mut R) -> u32 {
    let dropped = MANTISSA_BITS - self.man;
    if dropped == 0 {
      return bits
    }
    let mask = (1 << dropped) - 1;
    let offset = match rounding {
      Rounding::Nearest => 1 << (dropped - 1),
      Rounding::Stochastic => rng.random::<u32>() & mask,
    };
    bits.wrapping_add(offset) & !mask
  }

  /// Bring the exponent of `rounded` (rounded from `old`) into the range of the format.
  fn clip_exponent<R: Rng + ?Sized>(&self, old: u32, rounded: u32, rounding: Rounding, rng: &mut R) -> u32 {
    let sign = old & SIGN;
    let min_normal = self.min_positive_value();

    // Below the smallest normal the only candidates are 0 and `min_normal`.
    if rounding == Rounding::Stochastic {
      let exact = f32::from_bits(old & !SIGN);
      if exact < min_normal {
        let up = rounding.round_up(exact as f64, 0., min_normal as f64, rng);
        return if up { sign | min_normal.to_bits() } else { sign }
      }
    }

    let magnitude = rounded & !SIGN;
    if magnitude == 0 {
      return rounded
    }
    let exponent = (magnitude >> MANTISSA_BITS) as i32;
    let (min, max) = self.exponent_range();
    if exponent > max {
      log::trace!("{} overflows {self:?}, saturating", f32::from_bits(old));
      sign | self.max_value().to_bits()
    } else if exponent < min {
      // Above half the smallest normal rounds up to it, the rest flushes to 0.
      let half_min = (min_normal / 2.).to_bits();
      if magnitude > half_min {
        sign | min_normal.to_bits()
      } else {
        sign
      }
    } else {
      rounded
    }
  }

  /// Quantize every element of `data` in place.
  pub fn quantize_slice<R: Rng + ?Sized>(&self, data: &mut [f32], rounding: Rounding, rng: &mut R) {
    for x in data {
      *x = self.quantize(*x, rounding, rng);
    }
  }
}
