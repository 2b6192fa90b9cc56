use crate::functions::calculus::{simplify, solve_linear};
use crate::story::classify::Archetype;
use crate::syntax::{substitute_variable, Expr};
use crate::StoryError;

/// The optimization variable of every template.
pub const VARIABLE: &str = "x";

/// Phrases that narrow an area problem to the fixed-perimeter rectangle.
const FIXED_PERIMETER_CUES: &[&str] = &["keliling", "perimeter"];
/// Phrases that narrow a volume problem to the open-top box.
const OPEN_BOX_CUES: &[&str] =
  &["tanpa tutup", "without a lid", "open top", "open-top"];

/// A dependent quantity expressed in the optimization variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Auxiliary {
  pub name: String,
  pub expr: Expr,
}

/// Single-variable objective plus the relations evaluated alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicModel {
  pub variable: String,
  /// Symbol of the objective, e.g. `A` or `V`.
  pub objective_name: String,
  /// What the objective measures, e.g. `area`.
  pub quantity: String,
  pub objective: Expr,
  pub auxiliaries: Vec<Auxiliary>,
}

impl SymbolicModel {
  fn new(objective_name: &str, quantity: &str, objective: Expr) -> Self {
    SymbolicModel {
      variable: VARIABLE.to_string(),
      objective_name: objective_name.to_string(),
      quantity: quantity.to_string(),
      objective: simplify(objective),
      auxiliaries: Vec::new(),
    }
  }

  fn with_auxiliary(mut self, name: &str, expr: Expr) -> Self {
    self.auxiliaries.push(Auxiliary {
      name: name.to_string(),
      expr: simplify(expr),
    });
    self
  }
}

fn x() -> Expr {
  Expr::var(VARIABLE)
}

fn num(value: f64) -> Expr {
  Expr::Number(value)
}

fn require_phrase(
  text: &str,
  archetype: Archetype,
  cues: &'static [&'static str],
) -> Result<(), StoryError> {
  let lowered = text.to_lowercase();
  if cues.iter().any(|cue| lowered.contains(cue)) {
    Ok(())
  } else {
    Err(StoryError::AmbiguousArchetype {
      archetype,
      expected: cues[0],
    })
  }
}

fn require_numbers(
  archetype: Archetype,
  numbers: &[f64],
) -> Result<(), StoryError> {
  let required = archetype.required_numbers();
  if numbers.len() < required {
    return Err(StoryError::InsufficientData {
      archetype,
      required,
      found: numbers.len(),
    });
  }
  Ok(())
}

/// Build the objective for a classified story problem.
///
/// `numbers` are consumed positionally; `text` is consulted for the phrase
/// that picks the concrete template of an area or volume problem.
pub fn build(
  archetype: Archetype,
  numbers: &[f64],
  text: &str,
) -> Result<SymbolicModel, StoryError> {
  match archetype {
    Archetype::Unknown => Err(StoryError::UnsupportedProblem(
      "no area, perimeter, volume, profit or revenue keyword was found".into(),
    )),
    Archetype::Perimeter => Err(StoryError::UnsupportedProblem(
      "perimeter problems have no model template".into(),
    )),
    Archetype::Area => {
      require_phrase(text, archetype, FIXED_PERIMETER_CUES)?;
      require_numbers(archetype, numbers)?;
      Ok(area_with_fixed_perimeter(numbers[0]))
    }
    Archetype::Volume => {
      require_phrase(text, archetype, OPEN_BOX_CUES)?;
      require_numbers(archetype, numbers)?;
      open_box(numbers[0])
    }
    Archetype::Profit => {
      require_numbers(archetype, numbers)?;
      Ok(quadratic_profit(numbers[0], numbers[1]))
    }
    Archetype::Revenue => {
      require_numbers(archetype, numbers)?;
      Ok(linear_demand_revenue(numbers[0], numbers[1]))
    }
  }
}

/// Rectangle with perimeter `P = 2x + 2y`: `y = P/2 - x`, `A(x) = x*y`.
pub fn area_with_fixed_perimeter(perimeter: f64) -> SymbolicModel {
  let y = num(perimeter) / num(2.0) - x();
  SymbolicModel::new("A", "area", x() * y.clone()).with_auxiliary("y", y)
}

/// Open-top box with a square base of side `x` and height `h` made from
/// `total_area` of material: `x^2 + 4*x*h = total_area`, `V(x) = x^2*h(x)`.
pub fn open_box(total_area: f64) -> Result<SymbolicModel, StoryError> {
  let material = x().pow(num(2.0)) + num(4.0) * x() * Expr::var("h");
  let h = solve_linear(&material, &num(total_area), "h")?;
  let volume = substitute_variable(
    &(x().pow(num(2.0)) * Expr::var("h")),
    "h",
    &h,
  );
  Ok(SymbolicModel::new("V", "volume", volume).with_auxiliary("h", h))
}

/// `P(x) = a*x - b*x^2`.
pub fn quadratic_profit(a: f64, b: f64) -> SymbolicModel {
  let profit = num(a) * x() - num(b) * x().pow(num(2.0));
  SymbolicModel::new("P", "profit", profit)
}

/// Price `p(x) = a - b*x`, revenue `R(x) = x*p(x)`.
pub fn linear_demand_revenue(a: f64, b: f64) -> SymbolicModel {
  let price = num(a) - num(b) * x();
  SymbolicModel::new("R", "revenue", x() * price.clone())
    .with_auxiliary("p", price)
}

/// Squares of side `x` cut from the corners of a `length x width` sheet and
/// the sides folded up, so the box is `x` tall:
/// `V(x) = x(length - 2x)(width - 2x)`.
pub fn cut_corner_box(length: f64, width: f64) -> SymbolicModel {
  let volume =
    x() * (num(length) - num(2.0) * x()) * (num(width) - num(2.0) * x());
  SymbolicModel::new("V", "volume", volume)
}

/// `P(x) = R(x) - C(x)` for user-supplied revenue and cost functions.
pub fn revenue_minus_cost(
  revenue: Expr,
  cost: Expr,
) -> Result<SymbolicModel, StoryError> {
  for expr in [&revenue, &cost] {
    if let Some(name) = expr
      .free_variables()
      .into_iter()
      .find(|name| name != VARIABLE)
    {
      return Err(StoryError::UnsupportedProblem(format!(
        "{expr} depends on {name}; only {VARIABLE} is allowed"
      )));
    }
  }
  Ok(
    SymbolicModel::new("P", "profit", revenue.clone() - cost.clone())
      .with_auxiliary("R", revenue)
      .with_auxiliary("C", cost),
  )
}
