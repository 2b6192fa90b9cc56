use super::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// None of these contain a cue as a substring.
const FILLER: &[&str] = &[
  "sebuah", "taman", "meter", "tentukan", "ukuran", "agar", "maksimum", "the",
  "box", "with", "sides", "of", "length", "cm", "find", "best", "value",
  "garden", "berapa", "nilai",
];

fn random_case(word: &str, rng: &mut StdRng) -> String {
  word
    .chars()
    .map(|c| if rng.gen_bool(0.5) { c.to_ascii_uppercase() } else { c })
    .collect()
}

fn sentence_with(cues: &[&str], rng: &mut StdRng) -> String {
  let mut words: Vec<String> = (0..rng.gen_range(3..12))
    .map(|_| FILLER.choose(rng).unwrap().to_string())
    .collect();
  for cue in cues {
    let at = rng.gen_range(0..=words.len());
    words.insert(at, random_case(cue, rng));
  }
  words.join(" ")
}

#[test]
fn garden_problem_is_area() {
  assert_eq!(classify(GARDEN), Archetype::Area);
}

#[test]
fn each_cue_selects_its_archetype() {
  assert_eq!(classify("hitung luas tanah"), Archetype::Area);
  assert_eq!(classify("the area of a field"), Archetype::Area);
  assert_eq!(classify("keliling kolam"), Archetype::Perimeter);
  assert_eq!(classify("the perimeter of a pond"), Archetype::Perimeter);
  assert_eq!(classify("volume kotak"), Archetype::Volume);
  assert_eq!(classify("keuntungan toko"), Archetype::Profit);
  assert_eq!(classify("the profit of a shop"), Archetype::Profit);
  assert_eq!(classify("fungsi permintaan"), Archetype::Revenue);
  assert_eq!(classify("total revenue"), Archetype::Revenue);
}

#[test]
fn matching_ignores_case() {
  assert_eq!(classify("LUAS MAKSIMUM"), Archetype::Area);
  assert_eq!(classify("Volume Kotak"), Archetype::Volume);
}

#[test]
fn no_cue_is_unknown() {
  assert_eq!(classify("Hitung jarak antara dua kota"), Archetype::Unknown);
  assert_eq!(classify(""), Archetype::Unknown);
}

#[test]
fn cue_order_is_fixed() {
  let order: Vec<Archetype> = CUES.iter().map(|cue| cue.archetype).collect();
  assert_eq!(
    order,
    vec![
      Archetype::Area,
      Archetype::Perimeter,
      Archetype::Volume,
      Archetype::Profit,
      Archetype::Revenue,
    ]
  );
}

#[test]
fn area_wins_over_perimeter_anywhere_in_the_text() {
  let mut rng = StdRng::seed_from_u64(0x5eed);
  for _ in 0..200 {
    let text = sentence_with(&["luas", "keliling"], &mut rng);
    assert_eq!(classify(&text), Archetype::Area, "{text}");
  }
}

#[test]
fn earlier_rules_win_over_later_ones() {
  let mut rng = StdRng::seed_from_u64(42);
  for _ in 0..200 {
    let text = sentence_with(&["volume", "keuntungan", "permintaan"], &mut rng);
    assert_eq!(classify(&text), Archetype::Volume, "{text}");
    let text = sentence_with(&["permintaan", "profit"], &mut rng);
    assert_eq!(classify(&text), Archetype::Profit, "{text}");
  }
}

#[test]
fn filler_alone_is_unknown() {
  let mut rng = StdRng::seed_from_u64(7);
  for _ in 0..100 {
    let text = sentence_with(&[], &mut rng);
    assert_eq!(classify(&text), Archetype::Unknown, "{text}");
  }
}
