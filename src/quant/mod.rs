//! Quantizers that simulate low precision number formats on `f32` data.
//!
//! Each format is a small validated configuration value with a `quantize` method for one element
//! and a `quantize_slice` method that rounds a buffer in place. [`Number`] selects one of them at
//! runtime, which is how a training loop configures the formats of its weights, activations and
//! gradients.
//!
//! All quantizers take the [`Rounding`] policy and the random source explicitly. The formats
//! themselves are immutable, so a worker pool can share one `Number` and quantize disjoint slices
//! concurrently, each worker with its own generator:
//!
//! ```
//! # use posit_quant::{Number, PositFormat, Rounding};
//! use rand::{SeedableRng, rngs::SmallRng};
//!
//! let number = Number::Posit(PositFormat::new(8, 1)?);
//! let mut data: Vec<f32> = (0 .. 1024).map(|i| i as f32 / 100.0).collect();
//! std::thread::scope(|s| {
//!   for (i, chunk) in data.chunks_mut(256).enumerate() {
//!     s.spawn(move || {
//!       let mut rng = SmallRng::seed_from_u64(i as u64);
//!       number.quantize_slice(chunk, Rounding::Stochastic, &mut rng);
//!     });
//!   }
//! });
//! # Ok::<(), posit_quant::Error>(())
//! ```

use core::fmt;

use rand::Rng;

use crate::{PositFormat, Rounding};

mod activation;
mod block;
mod fixed;
mod float;
mod table;

pub use activation::PositActivation;
pub use block::BlockFloatingPoint;
pub use fixed::FixedPoint;
pub use float::FloatingPoint;
pub use table::LookupTable;

/// A number format to quantize to.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq)]
pub enum Number {
  FixedPoint(FixedPoint),
  FloatingPoint(FloatingPoint),
  BlockFloatingPoint(BlockFloatingPoint),
  Posit(PositFormat),
}

impl Number {
  /// Quantize every element of `data` in place.
  ///
  /// Posits go through the `f64` codec, and the result is rounded back to `f32` (which is exact
  /// unless the posit has more significant bits than an `f32`, or a wider range). Finite inputs
  /// stay finite and nonzero inputs stay nonzero, as in the codec itself.
  pub fn quantize_slice<R: Rng + ?Sized>(&self, data: &mut [f32], rounding: Rounding, rng: &mut R) {
    match self {
      Number::FixedPoint(q) => q.quantize_slice(data, rounding, rng),
      Number::FloatingPoint(q) => q.quantize_slice(data, rounding, rng),
      Number::BlockFloatingPoint(q) => q.quantize_slice(data, rounding, rng),
      Number::Posit(format) => for x in data {
        *x = saturate_to_f32(format.quantize(*x as f64, rounding, rng));
      },
    }
  }
}

/// Narrow a posit value to `f32` the way the posit itself saturates: magnitudes beyond `f32::MAX`
/// give `±f32::MAX`, and nonzero magnitudes that would flush to 0 give the smallest subnormal.
fn saturate_to_f32(x: f64) -> f32 {
  let narrowed = x.clamp(-f32::MAX as f64, f32::MAX as f64) as f32;
  if narrowed == 0. && x != 0. {
    f32::from_bits(1).copysign(x as f32)
  } else {
    narrowed
  }
}

impl From<FixedPoint> for Number {
  fn from(q: FixedPoint) -> Self {
    Number::FixedPoint(q)
  }
}

impl From<FloatingPoint> for Number {
  fn from(q: FloatingPoint) -> Self {
    Number::FloatingPoint(q)
  }
}

impl From<BlockFloatingPoint> for Number {
  fn from(q: BlockFloatingPoint) -> Self {
    Number::BlockFloatingPoint(q)
  }
}

impl From<PositFormat> for Number {
  fn from(format: PositFormat) -> Self {
    Number::Posit(format)
  }
}

impl fmt::Display for Number {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Number::FixedPoint(q) => write!(f, "fixed({},{})", q.wl(), q.fl()),
      Number::FloatingPoint(q) => write!(f, "float({},{})", q.exp(), q.man()),
      Number::BlockFloatingPoint(q) => match q.block() {
        Some(block) => write!(f, "block({},{block})", q.wl()),
        None => write!(f, "block({})", q.wl()),
      },
      Number::Posit(format) => write!(f, "{format}"),
    }
  }
}
