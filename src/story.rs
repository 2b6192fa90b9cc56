//! Free-text story-problem pipeline:
//! text -> (numerals, archetype) -> symbolic model -> optimum.

use serde::Serialize;
use tracing::{debug, warn};

use crate::StoryError;

pub mod classify;
pub mod extract;
pub mod model;
pub mod optimize;
pub mod present;

use classify::{classify, Archetype};
use extract::extract;
use optimize::{optimize, Solution};

/// Shorter (trimmed) texts are rejected before any analysis.
pub const MIN_PROBLEM_LENGTH: usize = 10;

/// Result of one solve action: either a solution or a typed failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  Solved(Solution),
  Failed { kind: String, message: String },
}

impl From<Result<Solution, StoryError>> for Outcome {
  fn from(result: Result<Solution, StoryError>) -> Self {
    match result {
      Ok(solution) => Outcome::Solved(solution),
      Err(e) => Outcome::Failed {
        kind: e.kind().to_string(),
        message: e.to_string(),
      },
    }
  }
}

/// Diagnostic echo plus outcome, handed to the presentation layer.
///
/// `archetype` is `None` only when the text was rejected as too short.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryReport {
  pub archetype: Option<Archetype>,
  pub numbers: Vec<f64>,
  pub outcome: Outcome,
}

impl StoryReport {
  pub fn solution(&self) -> Option<&Solution> {
    match &self.outcome {
      Outcome::Solved(solution) => Some(solution),
      Outcome::Failed { .. } => None,
    }
  }

  pub fn failure_kind(&self) -> Option<&str> {
    match &self.outcome {
      Outcome::Solved(_) => None,
      Outcome::Failed { kind, .. } => Some(kind),
    }
  }

  pub fn is_solved(&self) -> bool {
    self.solution().is_some()
  }
}

pub fn check_length(text: &str) -> Result<(), StoryError> {
  let length = text.trim().chars().count();
  if length < MIN_PROBLEM_LENGTH {
    return Err(StoryError::EmptyOrTooShortInput {
      length,
      minimum: MIN_PROBLEM_LENGTH,
    });
  }
  Ok(())
}

/// Run the whole pipeline, failing on the first error.
pub fn interpret(
  text: &str,
) -> Result<(Archetype, Vec<f64>, Solution), StoryError> {
  check_length(text)?;
  let archetype = classify(text);
  let numbers = extract(text);
  let solution =
    model::build(archetype, &numbers, text).and_then(|m| optimize(&m))?;
  Ok((archetype, numbers, solution))
}

/// Solve a word problem. Never fails: errors become [`Outcome::Failed`]
/// next to the detected archetype and numerals.
pub fn solve_story(text: &str) -> StoryReport {
  if let Err(e) = check_length(text) {
    warn!(error = %e, "story rejected");
    return StoryReport {
      archetype: None,
      numbers: Vec::new(),
      outcome: Outcome::from(Err::<Solution, _>(e)),
    };
  }

  let archetype = classify(text);
  let numbers = extract(text);
  debug!(%archetype, ?numbers, "story analysed");

  let result = model::build(archetype, &numbers, text).and_then(|model| {
    debug!(objective = %model.objective, "model built");
    optimize(&model)
  });
  if let Err(e) = &result {
    warn!(%archetype, kind = e.kind(), error = %e, "story not solved");
  }

  StoryReport {
    archetype: Some(archetype),
    numbers,
    outcome: result.into(),
  }
}
