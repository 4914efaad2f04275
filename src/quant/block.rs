use rand::Rng;

use crate::{Error, InvalidFormat, Rounding};

/// Block floating point: blocks of `wl`-bit two's complement mantissas sharing one exponent.
///
/// Each block gets the exponent of its largest magnitude, `shared = floor(log2(max |x|))`. Every
/// element is then a fixed point number with quantum `2^(shared - (wl - 2))`, clamped to
/// `[-2^(shared + 1), 2^(shared + 1) - quantum]`. So the largest element of a block keeps `wl - 1`
/// significant bits, and elements much smaller than it lose precision or flush to zero.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub struct BlockFloatingPoint {
  wl: u32,
  block: Option<usize>,
}

impl BlockFloatingPoint {
  /// A format with word length `2 ≤ wl ≤ 24`, and blocks of `block` consecutive elements, or a
  /// single block spanning the whole slice if `block` is `None`.
  pub fn new(wl: u32, block: Option<usize>) -> Result<Self, Error> {
    if !(2 ..= 24).contains(&wl) || block == Some(0) {
      return Err(InvalidFormat::BlockFloatingPoint { wl, block: block.unwrap_or(0) }.into())
    }
    let format = Self { wl, block };
    log::debug!("constructed {format:?}");
    Ok(format)
  }

  pub const fn wl(&self) -> u32 {
    self.wl
  }

  pub const fn block(&self) -> Option<usize> {
    self.block
  }

  /// Quantize `data` in place, block by block.
  ///
  /// ```
  /// # use posit_quant::{BlockFloatingPoint, Rounding};
  /// let bfp = BlockFloatingPoint::new(4, None)?;
  /// let mut data = [3.0, 0.3, -1.1, 0.1];
  /// // Shared exponent 1: quantum 2^(1 - 2) = 0.5
  /// bfp.quantize_slice(&mut data, Rounding::Nearest, &mut rand::rng());
  /// assert_eq!(data, [3.0, 0.5, -1.0, 0.0]);
  /// # Ok::<(), posit_quant::Error>(())
  /// ```
  pub fn quantize_slice<R: Rng + ?Sized>(&self, data: &mut [f32], rounding: Rounding, rng: &mut R) {
    match self.block {
      Some(len) => for block in data.chunks_mut(len) {
        self.quantize_block(block, rounding, rng)
      },
      None => self.quantize_block(data, rounding, rng),
    }
  }

  /// Quantize a single block in place. All-zero blocks and blocks with a NaN or infinity are
  /// left unchanged.
  pub fn quantize_block<R: Rng + ?Sized>(&self, block: &mut [f32], rounding: Rounding, rng: &mut R) {
    let Some(shared) = shared_exponent(block) else { return };
    let quantum = ((shared - (self.wl as i32 - 2)) as f64).exp2();
    let top = ((shared + 1) as f64).exp2();
    for x in block {
      let rounded = rounding.round(*x as f64, quantum, rng);
      *x = rounded.clamp(-top, top - quantum) as f32;
    }
  }
}

/// `floor(log2(max |x|))` over the block, or `None` if the block is empty, all zero, or not all
/// finite.
fn shared_exponent(block: &[f32]) -> Option<i32> {
  let mut max = 0f32;
  for &x in block {
    if !x.is_finite() {
      return None
    }
    max = max.max(x.abs());
  }
  if max == 0. {
    return None
  }
  // Read off the exponent of the `f64`: every `f32`, subnormals included, is normal as an `f64`.
  let bits = (max as f64).to_bits();
  let biased = (bits >> (f64::MANTISSA_DIGITS - 1)) as i32;
  Some(biased - (f64::MAX_EXP - 1))
}
