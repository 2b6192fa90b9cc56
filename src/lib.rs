//! Single-variable calculus explorer and optimization story-problem solver.
//!
//! Free-text word problems go through [`story::solve_story`]: the text is
//! classified into an [`Archetype`], its numerals are extracted, a symbolic
//! model is built for the archetype and the model's critical point is found
//! from its derivative. [`forms`] offers the same solvers for typed inputs and
//! [`explore`] plots a function next to its derivative.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod explore;
pub mod forms;
pub mod functions;
pub mod story;
pub mod syntax;

pub use story::classify::Archetype;
pub use story::optimize::Solution;
pub use story::{solve_story, Outcome, StoryReport};
pub use syntax::{parse_expression, Expr};

#[derive(Parser)]
#[grammar = "calculus.pest"]
pub struct CalculusParser;

/// Errors raised while parsing, transforming or evaluating expressions.
#[derive(Error, Debug)]
pub enum ExprError {
  #[error("Parse error: {0}")]
  ParseError(#[from] Box<pest::error::Error<Rule>>),
  #[error("Empty input")]
  EmptyInput,
  #[error("Unknown function: {0}")]
  UnknownFunction(String),
  #[error("Evaluation error: {0}")]
  EvaluationError(String),
  #[error("Invalid plot range: {0}")]
  InvalidRange(String),
  #[error("Plot rendering failed: {0}")]
  Render(String),
}

/// Failures of the story-problem pipeline and the form solvers.
///
/// None of these are fatal: the pipeline turns them into a
/// [`Outcome::Failed`] carrying [`StoryError::kind`] and the message.
#[derive(Error, Debug)]
pub enum StoryError {
  #[error(
    "The problem text is too short ({length} characters, \
     at least {minimum} are needed)"
  )]
  EmptyOrTooShortInput { length: usize, minimum: usize },
  #[error(
    "A {archetype} problem needs at least {required} numbers, \
     but {found} were found"
  )]
  InsufficientData {
    archetype: Archetype,
    required: usize,
    found: usize,
  },
  #[error(
    "The {archetype} problem is ambiguous: \
     expected a phrase such as \"{expected}\""
  )]
  AmbiguousArchetype {
    archetype: Archetype,
    expected: &'static str,
  },
  #[error("Unsupported problem: {0}")]
  UnsupportedProblem(String),
  #[error("The derivative has no admissible real root")]
  NoCriticalPoint,
  #[error("The critical point is not a real number: {0}")]
  NonRealResult(String),
  #[error("Cannot solve {equation} = 0: {reason}")]
  UnsolvableEquation { equation: String, reason: String },
  #[error(transparent)]
  Expression(#[from] ExprError),
}

impl StoryError {
  /// Stable tag used when a failure is serialized.
  pub fn kind(&self) -> &'static str {
    match self {
      StoryError::EmptyOrTooShortInput { .. } => "empty_or_too_short_input",
      StoryError::InsufficientData { .. } => "insufficient_data",
      StoryError::AmbiguousArchetype { .. } => "ambiguous_archetype",
      StoryError::UnsupportedProblem(_) => "unsupported_problem",
      StoryError::NoCriticalPoint => "no_critical_point",
      StoryError::NonRealResult(_) => "non_real_result",
      StoryError::UnsolvableEquation { .. } => "unsolvable_equation",
      StoryError::Expression(_) => "expression",
    }
  }
}

impl CalculusParser {
  pub fn parse_program(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  CalculusParser::parse_program(input)
}
