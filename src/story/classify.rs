use std::fmt;

use serde::Serialize;

/// Word-problem category recognised from keyword cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
  Area,
  Perimeter,
  Volume,
  Profit,
  Revenue,
  Unknown,
}

impl Archetype {
  /// How many leading numerals the archetype's template consumes.
  pub fn required_numbers(self) -> usize {
    match self {
      Archetype::Area | Archetype::Perimeter | Archetype::Volume => 1,
      Archetype::Profit | Archetype::Revenue => 2,
      Archetype::Unknown => 0,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Archetype::Area => "area",
      Archetype::Perimeter => "perimeter",
      Archetype::Volume => "volume",
      Archetype::Profit => "profit",
      Archetype::Revenue => "revenue",
      Archetype::Unknown => "unknown",
    }
  }
}

impl fmt::Display for Archetype {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A keyword rule: any cue present (case-insensitively) selects the archetype.
#[derive(Debug, Clone, Copy)]
pub struct Cue {
  pub keywords: &'static [&'static str],
  pub archetype: Archetype,
}

impl Cue {
  pub fn matches(&self, lowered: &str) -> bool {
    self.keywords.iter().any(|k| lowered.contains(k))
  }
}

/// Evaluated in order, first match wins. "luas ... keliling" is an area
/// problem, never a perimeter one.
pub const CUES: &[Cue] = &[
  Cue {
    keywords: &["luas", "area"],
    archetype: Archetype::Area,
  },
  Cue {
    keywords: &["keliling", "perimeter"],
    archetype: Archetype::Perimeter,
  },
  Cue {
    keywords: &["volume"],
    archetype: Archetype::Volume,
  },
  Cue {
    keywords: &["profit", "keuntungan"],
    archetype: Archetype::Profit,
  },
  Cue {
    keywords: &["revenue", "permintaan"],
    archetype: Archetype::Revenue,
  },
];

pub fn classify(text: &str) -> Archetype {
  let lowered = text.to_lowercase();
  CUES
    .iter()
    .find(|cue| cue.matches(&lowered))
    .map_or(Archetype::Unknown, |cue| cue.archetype)
}
