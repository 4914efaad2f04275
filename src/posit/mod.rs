//! This module and its submodules contain the posit codec: a bit-exact mapping between IEEE
//! doubles and posits of any width up to 64 bits and any exponent width, chosen at runtime.
//!
//! Unlike a hardware posit unit, which is fixed to one format, a quantization study needs to sweep
//! many formats over the same data. So the format is a plain value, [`PositFormat`], validated
//! once, and every posit carries a copy of the format it belongs to.
//!
//! Some notation used in the comments:
//!
//!   - **Leftmost bits/msb**: most-significant bits.
//!   - **Rightmost bits/lsb**: least-significant bits.
//!   - **Bit 0, bit 1, .. bit n-1**: numbered least significant to most significant, starts at 0.
//!   - **n**, **es**: total width and exponent width of the format.
//!   - **useed**: `2^(2^es)`, the factor each step of the regime scales by.
//!
//! If you know nothing about posits, a good place to start is
//! <https://posithub.org/docs/Posits4.pdf>.

/// The layout of a posit: total `width` n, `exponent_bits` es, and a `scale` factor.
///
/// The scale multiplies every decoded value and divides every value before encoding, which lets a
/// format cover a shifted range (e.g. a posit(8, 0) with scale 2^-4 whose precision is centred on
/// 1/16 instead of on 1).
///
/// ```
/// # use posit_quant::PositFormat;
/// let p8 = PositFormat::new(8, 2)?;
/// let scaled = PositFormat::new(8, 0)?.with_scale(0.0625)?;
/// assert_eq!(p8.decode(0b01000000), 1.0);
/// assert_eq!(scaled.decode(0b01000000), 0.0625);
/// # Ok::<(), posit_quant::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq)]
pub struct PositFormat {
  width: u32,
  exponent_bits: u32,
  scale: f64,
}

/// A posit: the low [`width`](PositFormat::width) bits of a `u64`, plus the format that gives
/// them meaning.
///
/// Posits are compared in the posit order, which is the order of their bits read as a `width`-bit
/// two's complement integer. [NaR](PositFormat::nar) is unordered with respect to every other
/// posit, and posits of different formats are unordered with respect to each other.
#[derive(Clone, Copy)]
pub struct Posit {
  bits: u64,
  format: PositFormat,
}

/// A posit broken up into its fields: the tagged form the codec works with internally, before
/// collapsing it to raw bits.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub enum Decoded {
  /// The all-zeros bit pattern.
  Zero,
  /// Not-a-real, the `0b1000…` bit pattern.
  NaR,
  /// Any other bit pattern.
  Finite(Fields),
}

/// The fields of a finite, nonzero posit, interpreted after taking the two's complement absolute
/// value of the bits (so they are the same for `x` and `-x`).
///
/// The value represented is
///
/// ```text
///   (-1)^negative × useed^regime × 2^exponent × (1 + fraction / 2^fraction_bits)
/// ```
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub struct Fields {
  /// Whether the sign bit is set.
  pub negative: bool,
  /// The signed regime value `k`: `r - 1` for a run of `r` ones, `-r` for a run of `r` zeros.
  pub regime: i32,
  /// The exponent, always `es` bits wide. Exponent bits that did not fit are 0.
  pub exponent: u64,
  /// The fraction bits, without the hidden bit.
  pub fraction: u64,
  /// How many fraction bits there are; shrinks as the regime grows.
  pub fraction_bits: u32,
}

/// Format construction, validation, and special values
mod format;

/// Posit → value
mod decode;

/// Value → posit
mod encode;

/// Debug and display
mod fmt;

/// Exact rational oracle for tests
#[cfg(test)]
mod rational;

/// Test case generators
#[cfg(test)]
mod test;
