use super::*;

use super::format::low_mask;

impl PositFormat {
  /// An iterator through all the posits of this format except 0 and NaR. Only sensible for
  /// narrow formats!
  pub(crate) fn cases_exhaustive(&self) -> impl Iterator<Item = Posit> + use<> {
    let format = *self;
    let abs = 1 ..= low_mask(self.width - 1);
    let pos = abs.clone().map(move |abs| format.from_bits(abs));
    let neg = abs.map(move |abs| format.from_bits(abs.wrapping_neg()));
    pos.chain(neg)
  }

  /// A [proptest Strategy](proptest::strategy::Strategy) that yields posits of this format except
  /// 0 and NaR.
  pub(crate) fn cases_proptest(&self) -> impl proptest::strategy::Strategy<Value = Posit> + use<> {
    use proptest::prelude::*;
    let format = *self;
    (
      any::<bool>(),
      (1 ..= low_mask(self.width - 1)),
    ).prop_map(move |(sign, abs)| {
      let bits = if sign {abs} else {abs.wrapping_neg()};
      format.from_bits(bits)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cases_exhaustive() {
    let f = PositFormat::new(4, 1).unwrap();
    assert_eq!(
      f.cases_exhaustive().map(Posit::to_bits).collect::<Vec<_>>().as_slice(),
      [
        0b0001,
        0b0010,
        0b0011,
        0b0100,
        0b0101,
        0b0110,
        0b0111,
        0b1111,
        0b1110,
        0b1101,
        0b1100,
        0b1011,
        0b1010,
        0b1001,
      ]
    )
  }

  #[test]
  fn cases_exhaustive_64() {
    let f = PositFormat::new(64, 2).unwrap();
    let mut cases = f.cases_exhaustive();
    assert_eq!(cases.next(), Some(f.min_positive()));
    assert_eq!(cases.next(), Some(f.min_positive().next()));
  }
}
