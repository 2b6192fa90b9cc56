//! Solvers for typed form inputs. These skip the text classifier and feed
//! the values straight into a model template.

use tracing::debug;

use crate::story::model::{self, SymbolicModel};
use crate::story::optimize::{optimize, Solution};
use crate::syntax::parse_expression;
use crate::StoryError;

pub const DEFAULT_PERIMETER: f64 = 20.0;
pub const DEFAULT_SHEET: (f64, f64) = (20.0, 10.0);
pub const DEFAULT_REVENUE: &str = "100*x - 0.5*x**2";
pub const DEFAULT_COST: &str = "20*x + 100";

fn solve(model: SymbolicModel) -> Result<Solution, StoryError> {
  debug!(objective = %model.objective, "form model");
  optimize(&model)
}

/// Largest rectangle for a given perimeter.
pub fn solve_area(perimeter: f64) -> Result<Solution, StoryError> {
  solve(model::area_with_fixed_perimeter(perimeter))
}

/// Optimal corner cut for an open box folded from a sheet.
pub fn solve_box(length: f64, width: f64) -> Result<Solution, StoryError> {
  solve(model::cut_corner_box(length, width))
}

/// Optimal production for `P(x) = R(x) - C(x)`.
pub fn solve_profit(revenue: &str, cost: &str) -> Result<Solution, StoryError> {
  let revenue = parse_expression(revenue)?;
  let cost = parse_expression(cost)?;
  solve(model::revenue_minus_cost(revenue, cost)?)
}
