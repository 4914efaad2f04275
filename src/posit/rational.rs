use super::*;

use malachite::rational::Rational;
use malachite::base::num::arithmetic::traits::{Abs, PowerOf2};

impl Posit {
  /// Convert a posit into a [Rational] value, or `None` if it is NaR.
  ///
  /// This is a **super-explicit** and **super-obvious** rendition of the algorithm for decoding a
  /// posit, bit by bit, since this is what we will check the real decoder and encoder against!
  pub(crate) fn to_rational(self) -> Option<Rational> {
    if self.is_nar() { return None }
    if self.is_zero() { return Some(Rational::from(0)) }

    let n = self.format.width as usize;
    let es = self.format.exponent_bits as usize;

    // Take the two's complement absolute value, and write out its bits, leftmost first, without
    // the sign bit.
    let negative = self.to_signed() < 0;
    let abs = self.to_signed().unsigned_abs();
    let bits: Vec<bool> = (0 .. n - 1).rev().map(|i| (abs >> i) & 1 == 1).collect();

    // The regime is the run of identical bits at the start, then comes a terminating bit of the
    // opposite value (unless the run reaches the end).
    let first = bits[0];
    let run = bits.iter().take_while(|&&b| b == first).count();
    let regime: i128 = if first { run as i128 - 1 } else { -(run as i128) };
    let rest = bits.get(run + 1 ..).unwrap_or(&[]);

    // The next `es` bits are the exponent; missing bits count as 0.
    let mut exponent: i128 = 0;
    for i in 0 .. es {
      exponent = 2 * exponent + rest.get(i).copied().unwrap_or(false) as i128;
    }

    // Whatever's left is the fraction, 1.ffff…
    let mut fraction = Rational::from(1);
    for (i, &bit) in rest.iter().skip(es).enumerate() {
      if bit {
        fraction += Rational::power_of_2(-(i as i64 + 1));
      }
    }

    let exp = regime * (1i128 << es) + exponent;
    let exp = i64::try_from(exp).expect("Exponent overflow in converting to rational");
    let value = Rational::power_of_2(exp) * fraction;
    Some(if negative { -value } else { value })
  }
}

/// Check whether the rational number `exact` should be encoded to `posit` with nearest rounding.
///
///   - Only 0 encodes to 0, and nothing finite encodes to NaR.
///   - Over- or under-flow: saturate to `±max` or `±min_positive`.
///   - Everything else: the closest posit by absolute **difference**; ties away from zero.
pub(crate) fn is_correct_rounded(exact: &Rational, posit: Posit) -> bool {
  let f = posit.format();
  let zero = Rational::from(0);
  let value = |p: Posit| p.to_rational().expect("Not NaR");

  if posit.is_zero() { return *exact == zero }
  if posit.is_nar() { return false }

  if *exact > zero {
    if *exact >= value(f.max()) { return posit == f.max() }
    if *exact <= value(f.min_positive()) { return posit == f.min_positive() }
  } else if *exact < zero {
    if *exact <= value(f.min()) { return posit == f.min() }
    if *exact >= value(f.max_negative()) { return posit == f.max_negative() }
  } else {
    return false
  }

  // `posit` represents exactly the number `curr`; `other` is the adjacent posit on the side of
  // `exact`, and `exact` has to lie strictly between the two.
  let curr = value(posit);
  if *exact == curr { return true }
  let other = if *exact < curr { posit.prior() } else { posit.next() };
  if other.is_nar() { return false }
  let other = value(other);
  let between = if *exact < curr { other < *exact } else { *exact < other };
  if !between { return false }

  let distance_curr = (&curr - exact).abs();
  let distance_other = (&other - exact).abs();
  distance_curr < distance_other
    || distance_curr == distance_other && (&curr).abs() > (&other).abs()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn format(width: u32, exponent_bits: u32) -> PositFormat {
    PositFormat::new(width, exponent_bits).unwrap()
  }

  /// Manually test all bit patterns for a 6-bit positive with 2-bit exponent (cf. Posit
  /// Arithmetic, John L. Gustafson, Chapter 2).
  #[test]
  fn exhaustive_posit_6_2() {
    let f = format(6, 2);

    assert_eq!(f.from_bits(0b000000).to_rational(), Some(Rational::from(0)));
    assert_eq!(f.from_bits(0b100000).to_rational(), None);

    for (bits, (num, den)) in [
      (0b000001, (1, 65536)),
      (0b000010, (1, 4096)),
      (0b000011, (1, 1024)),
      (0b000100, (1, 256)),
      (0b000101, (1, 128)),
      (0b000110, (1, 64)),
      (0b000111, (1, 32)),
      (0b001000, (2, 32)),
      (0b001001, (3, 32)),
      (0b001010, (4, 32)),
      (0b001011, (6, 32)),
      (0b001100, (8, 32)),
      (0b001101, (12, 32)),
      (0b001110, (16, 32)),
      (0b001111, (24, 32)),
      (0b010000, (1, 1)),
      (0b010001, (3, 2)),
      (0b010010, (2, 1)),
      (0b010011, (3, 1)),
      (0b010100, (4, 1)),
      (0b010101, (6, 1)),
      (0b010110, (8, 1)),
      (0b010111, (12, 1)),
      (0b011000, (16, 1)),
      (0b011001, (32, 1)),
      (0b011010, (64, 1)),
      (0b011011, (128, 1)),
      (0b011100, (256, 1)),
      (0b011101, (1024, 1)),
      (0b011110, (4096, 1)),
      (0b011111, (65536, 1)),
    ] {
      assert_eq!(f.from_bits(bits).to_rational(), Some(Rational::from_signeds(num, den)));
      assert_eq!(f.from_bits(bits.wrapping_neg()).to_rational(), Some(Rational::from_signeds(-num, den)));
    }
  }

  /// More manual examples.
  #[test]
  fn examples() {
    let f = format(6, 1);
    assert_eq!(f.from_bits(0b100001).to_rational(), Some(Rational::from(-256)));
    assert_eq!(f.from_bits(0b000001).to_rational(), Some(Rational::from_signeds(1, 256)));
    assert_eq!(f.from_bits(0b001101).to_rational(), Some(Rational::from_signeds(5, 8)));
    assert_eq!(f.from_bits(0b110010).to_rational(), Some(Rational::from_signeds(-3, 4)));

    let f = format(16, 2);
    assert_eq!(f.from_bits(0b0_01_00_10000001000).to_rational(), Some(Rational::from_signeds(3080, 1 << 15)));
    assert_eq!(f.from_bits(0b0_01_01_11011001000).to_rational(), Some(Rational::from_signeds(3784, 1 << 14)));
    assert_eq!(f.from_bits(0b0_11110_10_11001000).to_rational(), Some(Rational::from(456 << 6)));
    assert_eq!(f.from_bits(0b1_00001_10_00111000).to_rational(), Some(Rational::from(-456 << 5)));
    assert_eq!(f.from_bits(0b1_1110_10_100111000).to_rational(), Some(Rational::from_signeds(-712, 1 << 20)));
    assert_eq!(f.from_bits(0b0_11111111110_00_10).to_rational(), Some(Rational::from(3i64 << 35)));

    assert_eq!(f.max().to_rational(), Some(Rational::from(1i64 << 56)));
    assert_eq!(f.min().to_rational(), Some(Rational::from(-1i64 << 56)));
    assert_eq!(f.min_positive().to_rational(), Some(Rational::from_signeds(1, 1i64 << 56)));
    assert_eq!(f.one().to_rational(), Some(Rational::from(1)));
    assert_eq!(f.minus_one().to_rational(), Some(Rational::from(-1)));
  }

  #[test]
  fn correct_rounded() {
    let f = format(8, 0);
    let one = f.one();
    assert!(is_correct_rounded(&Rational::from(1), one));
    assert!(is_correct_rounded(&Rational::from_signeds(65, 64), one.next()));
    assert!(!is_correct_rounded(&Rational::from_signeds(65, 64), one));
    assert!(is_correct_rounded(&Rational::from_signeds(129, 128), one));
    assert!(is_correct_rounded(&Rational::from(1000), f.max()));
    assert!(is_correct_rounded(&Rational::from_signeds(-1, 1000), f.max_negative()));
    assert!(!is_correct_rounded(&Rational::from_signeds(1, 1000), f.zero()));
    assert!(is_correct_rounded(&Rational::from(0), f.zero()));
    assert!(!is_correct_rounded(&Rational::from(0), f.nar()));
  }
}
