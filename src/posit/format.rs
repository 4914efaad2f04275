use super::*;

use core::cmp::Ordering;
use core::str::FromStr;

use crate::error::{Error, InvalidFormat};

impl PositFormat {
  /// The narrowest supported posit.
  pub const MIN_WIDTH: u32 = 2;

  /// The widest supported posit; posits are stored in a `u64`.
  pub const MAX_WIDTH: u32 = 64;

  /// A format with `width` total bits and `exponent_bits` exponent bits, and scale `1.0`.
  ///
  /// Fails with [`Error::InvalidFormat`] unless `2 ≤ width ≤ 64` and
  /// `exponent_bits ≤ width - 2`.
  pub fn new(width: u32, exponent_bits: u32) -> Result<Self, Error> {
    if !(Self::MIN_WIDTH ..= Self::MAX_WIDTH).contains(&width) {
      return Err(InvalidFormat::Width(width).into())
    }
    if exponent_bits > width - 2 {
      return Err(InvalidFormat::ExponentBits { width, exponent_bits }.into())
    }
    let format = Self { width, exponent_bits, scale: 1. };
    log::debug!("constructed {format}");
    Ok(format)
  }

  /// The same format with a different `scale`, which must be finite and strictly positive.
  pub fn with_scale(self, scale: f64) -> Result<Self, Error> {
    if !(scale.is_finite() && scale > 0.) {
      return Err(InvalidFormat::Scale.into())
    }
    Ok(Self { scale, ..self })
  }

  /// Total width n in bits.
  #[inline]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Width es of the exponent field in bits.
  #[inline]
  pub const fn exponent_bits(&self) -> u32 {
    self.exponent_bits
  }

  /// The scale factor applied after decoding.
  #[inline]
  pub const fn scale(&self) -> f64 {
    self.scale
  }

  /// `log2(useed) = 2^es`: how many binary orders of magnitude each regime step spans.
  #[inline]
  pub const fn useed_log2(&self) -> u64 {
    1 << self.exponent_bits
  }

  /// The largest binary exponent of a posit in this format; [`Self::max`] is `2^max_exp`
  /// (times the scale) and [`Self::min_positive`] is `2^-max_exp`.
  pub const fn max_exp(&self) -> i128 {
    ((self.width - 2) as i128) << self.exponent_bits
  }

  /// Mask of the significant `width` bits of a `u64`.
  #[inline]
  pub(crate) const fn mask(&self) -> u64 {
    low_mask(self.width)
  }

  /// The sign bit, which is also the bit pattern of NaR.
  #[inline]
  pub(crate) const fn sign_bit(&self) -> u64 {
    1 << (self.width - 1)
  }

  /// Construct a posit from its raw bit representation. Bits higher (more significant) than the
  /// lowest [`Self::width`] bits are ignored.
  #[inline]
  pub const fn from_bits(&self, bits: u64) -> Posit {
    Posit { bits: bits & self.mask(), format: *self }
  }

  /// Zero (`0`).
  //
  // Represented by the bit pattern `0b000...0`.
  pub const fn zero(&self) -> Posit {
    self.from_bits(0)
  }

  /// Not-a-real (`NaR`).
  //
  // Represented by the bit pattern `0b1000...0`.
  pub const fn nar(&self) -> Posit {
    self.from_bits(self.sign_bit())
  }

  /// One (`1`, times the scale).
  //
  // Represented by the bit pattern `0b0100...0`.
  pub const fn one(&self) -> Posit {
    self.from_bits(self.sign_bit() >> 1)
  }

  /// Minus one (`-1`, times the scale).
  //
  // Represented by the bit pattern `0b1100...0`.
  pub const fn minus_one(&self) -> Posit {
    self.from_bits(self.sign_bit() | self.sign_bit() >> 1)
  }

  /// Largest representable value, equal to `-min()`.
  //
  // Represented by the bit pattern `0b0111...1`.
  pub const fn max(&self) -> Posit {
    self.from_bits(self.sign_bit() - 1)
  }

  /// Smallest representable value, equal to `-max()`.
  ///
  /// Not to be confused with the smallest absolute value, i.e. [`Self::min_positive`]!
  //
  // Represented by the bit pattern `0b100...01`.
  pub const fn min(&self) -> Posit {
    self.from_bits(self.sign_bit() + 1)
  }

  /// Smallest *positive* value, equal to `-max_negative()`.
  //
  // Represented by the bit pattern `0b000...01`.
  pub const fn min_positive(&self) -> Posit {
    self.from_bits(1)
  }

  /// Largest *negative* value, equal to `-min_positive()`.
  //
  // Represented by the bit pattern `0b1111...1`.
  pub const fn max_negative(&self) -> Posit {
    self.from_bits(u64::MAX)
  }

  /// The value of [`Self::max`], as an `f64` (`+inf` if it overflows one).
  pub fn max_value(&self) -> f64 {
    self.max().to_f64()
  }

  /// The value of [`Self::min_positive`], as an `f64` (`0.0` if it underflows one).
  pub fn min_positive_value(&self) -> f64 {
    self.min_positive().to_f64()
  }
}

/// The lowest `bits` bits set.
#[inline]
pub(crate) const fn low_mask(bits: u32) -> u64 {
  if bits >= u64::BITS { u64::MAX } else { (1 << bits) - 1 }
}

impl FromStr for PositFormat {
  type Err = Error;

  /// Parse `"posit(n,es)"` or `"posit(n,es,scale)"`; whitespace around the numbers is ignored.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let args = s.trim()
      .strip_prefix("posit(")
      .and_then(|s| s.strip_suffix(')'))
      .ok_or(InvalidFormat::Syntax)?;
    let mut args = args.split(',').map(str::trim);
    let mut next_u32 = || -> Result<u32, Error> {
      args.next()
        .and_then(|arg| arg.parse().ok())
        .ok_or(InvalidFormat::Syntax.into())
    };
    let width = next_u32()?;
    let exponent_bits = next_u32()?;
    let scale = match args.next() {
      None => 1.,
      Some(arg) => arg.parse::<f64>().map_err(|_| InvalidFormat::Syntax)?,
    };
    if args.next().is_some() {
      return Err(InvalidFormat::Syntax.into())
    }
    Self::new(width, exponent_bits)?.with_scale(scale)
  }
}

impl Posit {
  /// The raw bits; only the lowest [`PositFormat::width`] may be set.
  #[inline]
  pub const fn to_bits(self) -> u64 {
    self.bits
  }

  /// The format this posit belongs to.
  #[inline]
  pub const fn format(self) -> PositFormat {
    self.format
  }

  #[inline]
  pub const fn is_zero(self) -> bool {
    self.bits == 0
  }

  #[inline]
  pub const fn is_nar(self) -> bool {
    self.bits == self.format.sign_bit()
  }

  /// Whether `self` is [0](PositFormat::zero) or [NaR](PositFormat::nar).
  #[inline]
  pub(crate) const fn is_special(self) -> bool {
    (self.bits << 1) & self.format.mask() == 0
  }

  /// The bits, sign-extended from `width` to 64 bits and read as two's complement.
  #[inline]
  pub(crate) const fn to_signed(self) -> i64 {
    let junk = u64::BITS - self.format.width;
    ((self.bits << junk) as i64) >> junk
  }

  /// The next posit up, in the order of the bit patterns. Wraps around: the next posit after
  /// [`max`](PositFormat::max) is NaR, and NaR stays NaR.
  pub fn next(self) -> Self {
    if self.is_nar() { return self }
    self.format.from_bits(self.bits.wrapping_add(1))
  }

  /// The next posit down, in the order of the bit patterns. Wraps around: the prior posit to
  /// [`min`](PositFormat::min) is NaR, and NaR stays NaR.
  pub fn prior(self) -> Self {
    if self.is_nar() { return self }
    self.format.from_bits(self.bits.wrapping_sub(1))
  }
}

impl core::ops::Neg for Posit {
  type Output = Self;

  /// Negation is exact: the two's complement of the bits. `-0 = 0`, `-NaR = NaR`.
  fn neg(self) -> Self::Output {
    self.format.from_bits(self.bits.wrapping_neg())
  }
}

impl PartialEq for Posit {
  fn eq(&self, other: &Self) -> bool {
    self.bits == other.bits && self.format == other.format
  }
}

impl PartialOrd for Posit {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    if self == other {
      Some(Ordering::Equal)
    } else if self.format != other.format || self.is_nar() || other.is_nar() {
      None
    } else {
      Some(self.to_signed().cmp(&other.to_signed()))
    }
  }
}
