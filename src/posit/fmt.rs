use super::*;

use core::fmt;

impl fmt::Debug for Posit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let bits = self.bits;
    f.debug_tuple("Posit")
      .field(&format_args!("0b{bits:0w$b}", w=self.format.width as usize))
      .finish()
  }
}

/// Prints the value (times the scale), or `NaR`.
impl fmt::Display for Posit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_nar() {
      f.pad("NaR")
    } else {
      fmt::Display::fmt(&self.to_f64(), f)
    }
  }
}

/// Prints `posit(n,es)`, or `posit(n,es,scale)` if the scale is not 1; this is the same syntax
/// [`str::parse`] accepts.
impl fmt::Display for PositFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.scale == 1. {
      write!(f, "posit({},{})", self.width, self.exponent_bits)
    } else {
      write!(f, "posit({},{},{})", self.width, self.exponent_bits, self.scale)
    }
  }
}
