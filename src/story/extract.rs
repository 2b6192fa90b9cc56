use once_cell::sync::Lazy;
use regex::Regex;

/// Digits with an optional decimal part, optionally preceded by an exponent
/// marker. No sign, no thousands separators, no scientific notation.
const NUMERAL_PATTERN: &str = r"(\^|\*\*)?\s*([0-9]+(?:\.[0-9]+)?)";

static NUMERAL: Lazy<Regex> =
  Lazy::new(|| {
    Regex::new(NUMERAL_PATTERN).expect("numeral pattern is a valid regex")
  });

/// All numerals in `text`, in order of appearance.
///
/// A leading minus is not part of the number, so `-5` yields `5.0`.
/// Literals written as exponents (`x^2`, `x**3`) describe the shape of a
/// formula rather than data and are skipped.
pub fn extract(text: &str) -> Vec<f64> {
  NUMERAL
    .captures_iter(text)
    .filter(|caps| caps.get(1).is_none())
    .filter_map(|caps| caps.get(2))
    .filter_map(|m| m.as_str().parse::<f64>().ok())
    .collect()
}
