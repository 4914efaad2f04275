use core::fmt;

/// The error type for constructing formats and parsing rounding modes.
///
/// Both variants signal a programming error in the caller: they are raised once, when a format is
/// built or a rounding token is parsed, and never from the hot encode/decode paths. Saturation and
/// NaR are *not* errors; see [`PositFormat::encode`](crate::PositFormat::encode).
#[derive(Debug, Clone)]
#[derive(PartialEq, Eq)]
pub enum Error {
  /// A format parameter is outside its supported range.
  InvalidFormat(InvalidFormat),
  /// A rounding mode token is neither `"nearest"` nor `"stochastic"`.
  InvalidRounding(String),
}

/// Which format parameter was rejected, and why.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq)]
pub enum InvalidFormat {
  /// Posit width outside `[2, 64]`.
  Width(u32),
  /// Posit exponent bits outside `[0, width - 2]`.
  ExponentBits { width: u32, exponent_bits: u32 },
  /// Scale is zero, negative, or not finite.
  Scale,
  /// Activations need a posit format with 0 exponent bits.
  ActivationExponentBits(u32),
  /// Fixed point word length outside `[1, 32]` or fractional length outside `[-32, wl)`.
  FixedPoint { wl: i32, fl: i32 },
  /// Float exponent bits outside `[1, 8]` or mantissa bits outside `[0, 23]`.
  FloatingPoint { exp: u32, man: u32 },
  /// Block floating point word length outside `[2, 24]`, or a block length of 0.
  BlockFloatingPoint { wl: u32, block: usize },
  /// Lookup table empty, unsorted, negative, not finite, or hints of the wrong length.
  LookupTable,
  /// A string could not be parsed as a format.
  Syntax,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::InvalidFormat(reason) => write!(f, "invalid format: {reason}"),
      Error::InvalidRounding(token) =>
        write!(f, "invalid rounding mode {token:?}, expected \"nearest\" or \"stochastic\""),
    }
  }
}

impl fmt::Display for InvalidFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      InvalidFormat::Width(width) =>
        write!(f, "posit width {width} is outside [2, 64]"),
      InvalidFormat::ExponentBits { width, exponent_bits } =>
        write!(f, "{exponent_bits} exponent bits do not fit a {width}-bit posit (at most {})", width.saturating_sub(2)),
      InvalidFormat::Scale =>
        write!(f, "scale must be finite and strictly positive"),
      InvalidFormat::ActivationExponentBits(es) =>
        write!(f, "posit activations need 0 exponent bits, got {es}"),
      InvalidFormat::FixedPoint { wl, fl } =>
        write!(f, "fixed point with word length {wl} and fractional length {fl} is not supported"),
      InvalidFormat::FloatingPoint { exp, man } =>
        write!(f, "floating point with {exp} exponent bits and {man} mantissa bits is not supported"),
      InvalidFormat::BlockFloatingPoint { wl, block } =>
        write!(f, "block floating point with word length {wl} and block length {block} is not supported"),
      InvalidFormat::LookupTable =>
        write!(f, "lookup table entries must be non-empty, finite, non-negative and strictly ascending"),
      InvalidFormat::Syntax =>
        write!(f, "expected a format like \"posit(8,2)\" or \"posit(8,2,0.5)\""),
    }
  }
}

impl std::error::Error for Error {}

impl From<InvalidFormat> for Error {
  fn from(reason: InvalidFormat) -> Self {
    Error::InvalidFormat(reason)
  }
}
