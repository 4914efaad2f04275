use super::*;

use rand::Rng;

use super::format::low_mask;
use crate::Rounding;
use crate::round::nearest_up;

impl PositFormat {
  /// Encode `value` (divided by [`Self::scale`]) as a posit of this format, rounding with
  /// `rounding` if it is not exactly representable.
  ///
  /// The encoding rules are:
  ///
  ///   - `±0` encodes to 0, and NaN or `±inf` encode to NaR.
  ///   - Anything of magnitude larger than [`Self::max`] saturates to `±max`.
  ///   - Anything nonzero of magnitude smaller than [`Self::min_positive`] saturates to
  ///     `±min_positive`: a nonzero value never becomes 0.
  ///   - Anything else lies between two adjacent posits `lo ≤ |value| ≤ hi`, and `rounding` picks
  ///     one of them. For [`Rounding::Nearest`], ties go away from zero.
  ///
  /// `rng` is only used by [`Rounding::Stochastic`].
  ///
  /// ```
  /// # use posit_quant::{PositFormat, Rounding};
  /// let p8 = PositFormat::new(8, 0)?;
  /// let mut rng = rand::rng();
  /// assert_eq!(p8.encode(1.0, Rounding::Nearest, &mut rng).to_bits(), 0b01000000);
  /// assert_eq!(p8.encode(1e9, Rounding::Nearest, &mut rng).to_bits(), 0b01111111);
  /// assert_eq!(p8.encode(f64::NAN, Rounding::Nearest, &mut rng).to_bits(), 0b10000000);
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn encode<R: Rng + ?Sized>(&self, value: f64, rounding: Rounding, rng: &mut R) -> Posit {
    self.encode_with(value, |exact, lo, hi| rounding.round_up(exact, lo, hi, rng))
  }

  /// Shorthand for [`Self::encode`] with [`Rounding::Nearest`], which needs no random source.
  pub fn encode_nearest(&self, value: f64) -> Posit {
    self.encode_with(value, nearest_up)
  }

  /// Round `value` to the nearest value representable in this format (or a neighbouring one, for
  /// [`Rounding::Stochastic`]), i.e. encode and immediately decode it.
  pub fn quantize<R: Rng + ?Sized>(&self, value: f64, rounding: Rounding, rng: &mut R) -> f64 {
    self.encode(value, rounding, rng).to_f64()
  }

  /// The common part of all the encoders, with the rounding decision abstracted as `round_up`,
  /// called as `round_up(exact, lo, hi)` with `0 < lo < exact < hi`.
  fn encode_with(&self, value: f64, round_up: impl FnOnce(f64, f64, f64) -> bool) -> Posit {
    if value == 0. {
      return self.zero()
    }
    if !value.is_finite() {
      return self.nar()
    }

    // From here on we work with the magnitude and put the sign back at the end: posits are
    // symmetric under two's complement negation, so the fields of `x` and `-x` are the same.
    let negative = value < 0.;
    let magnitude = value.abs() / self.scale;

    let bits = if magnitude == f64::INFINITY {
      log::trace!("{value} overflows {self} after scaling, saturating");
      self.max().to_bits()
    } else if magnitude == 0. {
      log::trace!("{value} underflows {self} after scaling, saturating");
      self.min_positive().to_bits()
    } else {
      self.round_magnitude(magnitude, round_up)
    };

    let bits = if negative { bits.wrapping_neg() } else { bits };
    self.from_bits(bits)
  }

  /// The bits of the posit `magnitude` rounds to; `magnitude` is positive and finite.
  fn round_magnitude(&self, magnitude: f64, round_up: impl FnOnce(f64, f64, f64) -> bool) -> u64 {
    // First truncate: `lo` is the largest posit whose value is ≤ `magnitude`, or 0 if there is none.
    let lo = Fields::from_f64(magnitude, self.exponent_bits).pack_magnitude(self);

    if lo == 0 {
      log::trace!("{magnitude} is below the smallest positive {self}, saturating");
      return self.min_positive().to_bits()
    }
    if lo == self.max().to_bits() {
      if magnitude > self.magnitude_value(lo) {
        log::trace!("{magnitude} is above the largest {self}, saturating");
      }
      return lo
    }

    // Otherwise `magnitude` lies between two adjacent posits, `lo` and `lo + 1`. Since
    // `pack_magnitude` truncated, and the bit patterns of positive posits are in the same order as
    // their values, the next posit up is always `lo + 1`.
    let lo_value = self.magnitude_value(lo);
    if lo_value == magnitude {
      return lo
    }
    let hi = lo + 1;
    let hi_value = self.magnitude_value(hi);
    if round_up(magnitude, lo_value, hi_value) { hi } else { lo }
  }
}

impl Fields {
  /// The fields of a positive, finite, nonzero `f64`, for a posit format with `exponent_bits`
  /// exponent bits.
  ///
  /// The result has all 52 fraction bits of the `f64`; they are truncated to the width of a
  /// concrete format by [`Self::pack_magnitude`].
  pub(crate) fn from_f64(x: f64, exponent_bits: u32) -> Self {
    debug_assert!(x > 0. && x.is_finite(), "{x} is not positive and finite");
    const FRACTION_BITS: u32 = f64::MANTISSA_DIGITS - 1;
    const BIAS: i64 = f64::MAX_EXP as i64 - 1;

    let bits = x.to_bits();
    let biased = (bits >> FRACTION_BITS) as i64;
    let mantissa = bits & low_mask(FRACTION_BITS);

    // Subnormals have no hidden bit; shift the leading 1 of the mantissa into its place.
    let (exp, fraction) = if biased == 0 {
      let msb = u64::BITS - 1 - mantissa.leading_zeros();
      let exp = msb as i64 - (BIAS - 1 + FRACTION_BITS as i64);
      (exp, (mantissa << (FRACTION_BITS - msb)) & low_mask(FRACTION_BITS))
    } else {
      (biased - BIAS, mantissa)
    };

    // Split the binary exponent into the regime (high bits) and exponent (low `exponent_bits`
    // bits). The shift is arithmetic, i.e. it floors, so the exponent is always non-negative.
    let regime = exp >> exponent_bits;
    let exponent = (exp - (regime << exponent_bits)) as u64;
    Fields {
      negative: false,
      regime: regime as i32,
      exponent,
      fraction,
      fraction_bits: FRACTION_BITS,
    }
  }

  /// Pack the fields (ignoring the sign) into the bits of a positive posit of `format`,
  /// **truncating** any bits that do not fit. So the result is the largest posit whose value is
  /// ≤ the value of the fields, or 0 if the value is below [`PositFormat::min_positive`].
  ///
  /// The regime is clamped: a value above [`PositFormat::max`] packs to `max`.
  pub(crate) fn pack_magnitude(&self, format: &PositFormat) -> u64 {
    // Everything except the sign bit.
    let body = format.width - 1;

    // A run of `regime + 1` 1s terminated by a 0, or a run of `-regime` 0s terminated by a 1.
    let (run, regime_bits) = if self.regime >= 0 {
      let run = self.regime as u32 + 1;
      if run >= body {
        return format.max().to_bits()
      }
      (run, low_mask(run) << 1)
    } else {
      let run = self.regime.unsigned_abs();
      if run >= body {
        return 0
      }
      (run, 1)
    };

    let mut packer = Packer { acc: 0, len: 0, capacity: body };
    packer.push(regime_bits, run + 1);
    packer.push(self.exponent, format.exponent_bits);
    packer.push(self.fraction, self.fraction_bits);
    packer.finish()
  }
}

/// Accumulates bit fields from most to least significant into the low `capacity` bits of a `u64`,
/// dropping whatever does not fit.
struct Packer {
  acc: u64,
  len: u32,
  capacity: u32,
}

impl Packer {
  /// Append the low `bits` bits of `value`, or as many of their leftmost bits as still fit.
  fn push(&mut self, value: u64, bits: u32) {
    debug_assert!(bits <= u64::BITS && self.capacity < u64::BITS);
    let take = bits.min(self.capacity - self.len);
    if take == 0 {
      return
    }
    let top = (value >> (bits - take)) & low_mask(take);
    self.acc = (self.acc << take) | top;
    self.len += take;
  }

  /// The accumulated bits, padded with 0s on the right up to `capacity`.
  fn finish(self) -> u64 {
    self.acc << (self.capacity - self.len)
  }
}
