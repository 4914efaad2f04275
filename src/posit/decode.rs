use super::*;

use super::format::low_mask;

impl PositFormat {
  /// Decode the posit with bit pattern `bits` (only the lowest [`Self::width`] are looked at) into
  /// its value, times [`Self::scale`].
  ///
  /// Zero decodes to `0.0` and NaR to NaN. Values too big or too small for an `f64` (only possible
  /// with a large number of exponent bits) decode to `±inf` or `±0.0`.
  ///
  /// ```
  /// # use posit_quant::PositFormat;
  /// let p8 = PositFormat::new(8, 0)?;
  /// assert_eq!(p8.decode(0b01000000), 1.0);
  /// assert_eq!(p8.decode(0b00000001), 1.0 / 64.0);
  /// assert_eq!(p8.decode(0b01111111), 64.0);
  /// assert!(p8.decode(0b10000000).is_nan());
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn decode(&self, bits: u64) -> f64 {
    self.from_bits(bits).to_f64()
  }

  /// The value of a *positive* magnitude bit pattern, **without** the scale. Used by the encoder
  /// to evaluate rounding candidates.
  pub(crate) fn magnitude_value(&self, bits: u64) -> f64 {
    let posit = self.from_bits(bits);
    debug_assert!(!posit.is_special() && posit.to_signed() > 0);
    posit.decode_finite().value(self.exponent_bits)
  }
}

impl Posit {
  /// Decode `self` into its fields.
  pub fn decode(self) -> Decoded {
    if self.is_zero() {
      Decoded::Zero
    } else if self.is_nar() {
      Decoded::NaR
    } else {
      Decoded::Finite(self.decode_finite())
    }
  }

  /// The value of `self`, times the scale of its format. NaR is NaN.
  pub fn to_f64(self) -> f64 {
    match self.decode() {
      Decoded::Zero => 0.,
      Decoded::NaR => f64::NAN,
      Decoded::Finite(fields) => fields.value(self.format.exponent_bits) * self.format.scale,
    }
  }

  /// Decode a posit **which is not 0 or NaR** into its [`Fields`].
  pub(crate) fn decode_finite(self) -> Fields {
    debug_assert!(!self.is_special(), "{self:?} cannot be 0 or NaR");
    let n = self.format.width;
    let es = self.format.exponent_bits;

    // Posits are interpreted in two's complement: the fields are read from the absolute value.
    // After this, bit n-1 of `x` is 0, and bits n-2 .. 0 hold the regime, exponent and fraction.
    let negative = self.bits & self.format.sign_bit() != 0;
    let x = if negative { self.bits.wrapping_neg() & self.format.mask() } else { self.bits };

    // The regime is a run of identical bits starting at bit n-2, terminated by the opposite bit or
    // by the end of the posit.
    //
    // Example (n = 8):
    //   x      = 0b0_0001_xxx
    //   run    = 3 zeros, terminated by a 1
    //   regime = -3
    //
    // Example (n = 8):
    //   x      = 0b0_1111111
    //   run    = 7 ones, terminated by the end of the posit
    //   regime = 6
    let regime_bit = (x >> (n - 2)) & 1;
    let mut run = 0;
    while run < n - 1 && (x >> (n - 2 - run)) & 1 == regime_bit {
      run += 1;
    }
    let regime = if regime_bit == 1 { run as i32 - 1 } else { -(run as i32) };

    // What's left after the sign bit, the run, and the terminating bit (if there was room for one)
    // is the exponent and then the fraction.
    //
    // The exponent may be cut short, or missing entirely, if the regime is long enough. In that
    // case the bits that are missing are the *rightmost* bits of the exponent, and they are 0.
    let remaining = (n - 1).saturating_sub(run + 1);
    let exponent_present = es.min(remaining);
    let fraction_bits = remaining - exponent_present;
    let exponent = ((x >> fraction_bits) & low_mask(exponent_present)) << (es - exponent_present);
    let fraction = x & low_mask(fraction_bits);

    Fields { negative, regime, exponent, fraction, fraction_bits }
  }
}

impl Fields {
  /// The binary exponent of the value: `regime × 2^es + exponent`.
  pub fn binary_exponent(&self, exponent_bits: u32) -> i128 {
    ((self.regime as i128) << exponent_bits) + self.exponent as i128
  }

  /// The value represented by these fields in a format with `exponent_bits` exponent bits,
  /// without any scale applied.
  ///
  /// The result is exact if it fits an `f64` (i.e. at most 52 fraction bits and an exponent in
  /// the range of `f64`), and correctly rounded otherwise.
  pub fn value(&self, exponent_bits: u32) -> f64 {
    // The significand `1.fff…` as an integer `1fff…`. It has at most 62 bits, so the conversion
    // to `f64` is exact for posits up to 55 bits wide, and rounds otherwise.
    let significand = ((1 << self.fraction_bits) | self.fraction) as f64;
    let exp = self.binary_exponent(exponent_bits) - self.fraction_bits as i128;
    let magnitude = mul_pow2(significand, exp);
    if self.negative { -magnitude } else { magnitude }
  }
}

/// `2^exp` for an exponent in the normal range of `f64`, built directly from its bits.
const fn pow2(exp: i32) -> f64 {
  debug_assert!(f64::MIN_EXP - 1 <= exp && exp < f64::MAX_EXP);
  f64::from_bits(((exp + 1023) as u64) << (f64::MANTISSA_DIGITS - 1))
}

/// `x × 2^exp`, for `x ≥ 1`, with a single rounding.
///
/// Multiplying by a power of two is exact as long as the result stays in the normal range, so we
/// step towards the target exponent in normal-range chunks. Since `x ≥ 1`, only the last step can
/// leave the normal range and round.
pub(crate) fn mul_pow2(x: f64, exp: i128) -> f64 {
  debug_assert!(x >= 1.);
  // Past ±1200, any `x` below 2^64 overflows to inf or underflows to 0 anyway.
  let mut exp = exp.clamp(-1200, 1200) as i32;
  let mut x = x;
  while exp >= f64::MAX_EXP {
    x *= pow2(f64::MAX_EXP - 1);
    exp -= f64::MAX_EXP - 1;
  }
  while exp < f64::MIN_EXP - 1 {
    x *= pow2(f64::MIN_EXP - 1);
    exp -= f64::MIN_EXP - 1;
  }
  x * pow2(exp)
}
