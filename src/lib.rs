//! This crate simulates low-precision number formats in software, for studying how neural network
//! training and inference behave when weights, activations, and gradients are stored in fewer
//! bits. Full-precision values go in, and come out rounded to the nearest (or a stochastically
//! chosen) value that the target format can represent.
//!
//! # Introduction
//!
//! The centrepiece is a bit-exact codec for [posits](https://posithub.org/docs/posit_standard-2.pdf)
//! of any width `2 ≤ n ≤ 64` and any exponent width `es ≤ n - 2`, chosen at runtime as a
//! [`PositFormat`]. Posits have a variable-length *regime* field, so the exponent and fraction
//! shrink as the magnitude moves away from 1; this gives them more precision near 1 and a wider
//! dynamic range than an IEEE float of the same width.
//!
//! Alongside posits, the [`Number`] enum covers the other formats commonly compared against them:
//!
//!   - [`FixedPoint`]: `wl` bit two's complement integers with `fl` fractional bits.
//!   - [`FloatingPoint`]: IEEE-like floats with a configurable exponent and mantissa width.
//!   - [`BlockFloatingPoint`]: blocks of fixed point mantissas sharing one exponent.
//!
//! plus [`LookupTable`] for arbitrary sets of magnitudes, and [`PositActivation`] for the posit
//! "fast sigmoid" bit trick.
//!
//! # Usage
//!
//! ```
//! use posit_quant::{PositFormat, Rounding};
//!
//! // Formats are validated once, up front.
//! let p8 = PositFormat::new(8, 1)?;
//!
//! // Encode with round to nearest, and decode back.
//! let bits = posit_quant::encode(3.3, &p8, Rounding::Nearest, &mut rand::rng());
//! assert_eq!(bits, 0b01011010);
//! assert_eq!(posit_quant::decode(bits, &p8), 3.25);
//!
//! // Special values, and saturation instead of overflow.
//! assert_eq!(p8.encode_nearest(f64::NAN), p8.nar());
//! assert_eq!(p8.encode_nearest(1e9), p8.max());
//! assert_eq!(p8.max().to_f64(), 4096.0);
//!
//! // Quantize a buffer of `f32`s in place.
//! let mut weights = [0.1f32, -2.7, 40.0];
//! posit_quant::Number::Posit(p8).quantize_slice(&mut weights, Rounding::Nearest, &mut rand::rng());
//! assert_eq!(weights, [0.1015625, -2.75, 40.0]);
//! # Ok::<(), posit_quant::Error>(())
//! ```
//!
//! # Rounding
//!
//! Every quantizer takes a [`Rounding`] policy. [`Rounding::Nearest`] is deterministic, with ties
//! away from zero for posits. [`Rounding::Stochastic`] rounds up with probability proportional to
//! the distance from the lower neighbour, so it is unbiased in expectation; it draws from the
//! [`rand::Rng`] the caller passes in, which keeps the codec free of global state and lets
//! concurrent workers each own a reproducibly seeded generator.
//!
//! # Logging
//!
//! Format construction logs at `debug` level, and saturation and underflow in the encoders log
//! at `trace` level, through the [`log`] facade. Nothing is logged unless the application installs
//! a logger.

mod error;
mod posit;
mod quant;
mod round;

pub use error::{Error, InvalidFormat};
pub use posit::{Decoded, Fields, Posit, PositFormat};
pub use quant::{BlockFloatingPoint, FixedPoint, FloatingPoint, LookupTable, Number, PositActivation};
pub use round::Rounding;

use rand::Rng;

/// Decode the low `format.width()` bits of `bits` into a real number, multiplied by the format's
/// scale. Higher bits are ignored. The NaR pattern decodes to NaN.
///
/// Shorthand for [`PositFormat::decode`].
pub fn decode(bits: u64, format: &PositFormat) -> f64 {
  format.decode(bits)
}

/// Encode `value` (divided by the format's scale) as the bits of a posit, rounded according to
/// `rounding`. NaN and infinities give the NaR pattern; finite values never overflow, they
/// saturate to the largest or smallest representable magnitude.
///
/// Shorthand for [`PositFormat::encode`] followed by [`Posit::to_bits`].
pub fn encode<R: Rng + ?Sized>(value: f64, format: &PositFormat, rounding: Rounding, rng: &mut R) -> u64 {
  format.encode(value, rounding, rng).to_bits()
}

#[cfg(test)]
const PROPTEST_CASES: u32 = if cfg!(debug_assertions) {0x1000} else {0x4_0000};
