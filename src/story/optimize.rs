use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::functions::calculus::{derivative, evaluate_at};
use crate::functions::polynomial::{solve_zero, Root};
use crate::story::model::SymbolicModel;
use crate::StoryError;

/// Second-derivative verdict at the chosen critical point.
///
/// Reported only; it never changes which root is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalKind {
  Maximum,
  Minimum,
  Inconclusive,
}

/// The solved optimum of a [`SymbolicModel`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
  pub variable: String,
  pub optimization_variable_value: f64,
  pub objective_name: String,
  pub quantity: String,
  pub objective_value: f64,
  pub auxiliary_values: BTreeMap<String, f64>,
  pub objective: String,
  pub derivative: String,
  pub critical_point: CriticalKind,
}

fn require_finite(name: &str, value: f64) -> Result<f64, StoryError> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(StoryError::NonRealResult(format!("{name} = {value}")))
  }
}

/// Real roots at or below zero fall outside the positive domain of the
/// optimization variable; complex roots are kept so they can be reported.
fn admissible(root: &Root) -> bool {
  !(root.is_real() && root.re <= 0.0)
}

/// Solve `d objective / dx = 0` and evaluate the model at the first
/// admissible root in solver order.
///
/// The first root is taken as-is; the second derivative only labels it.
pub fn optimize(model: &SymbolicModel) -> Result<Solution, StoryError> {
  let var = model.variable.as_str();
  let first = derivative(&model.objective, var);
  debug!(objective = %model.objective, derivative = %first, "differentiated");

  let roots =
    solve_zero(&first, var).map_err(|e| StoryError::UnsolvableEquation {
      equation: first.to_string(),
      reason: e.to_string(),
    })?;
  debug!(?roots, "critical point candidates");

  let root = roots
    .iter()
    .find(|r| admissible(r))
    .ok_or(StoryError::NoCriticalPoint)?;
  if !root.is_real() {
    return Err(StoryError::NonRealResult(format!("{var} = {root}")));
  }
  let x = root.re;

  let objective_value = require_finite(
    &model.objective_name,
    evaluate_at(&model.objective, var, x)?,
  )?;
  let mut auxiliary_values = BTreeMap::new();
  for aux in &model.auxiliaries {
    let value = require_finite(&aux.name, evaluate_at(&aux.expr, var, x)?)?;
    auxiliary_values.insert(aux.name.clone(), value);
  }

  let second = derivative(&first, var);
  let critical_point = match evaluate_at(&second, var, x) {
    Ok(curvature) if curvature < 0.0 => CriticalKind::Maximum,
    Ok(curvature) if curvature > 0.0 => CriticalKind::Minimum,
    _ => CriticalKind::Inconclusive,
  };

  Ok(Solution {
    variable: var.to_string(),
    optimization_variable_value: x,
    objective_name: model.objective_name.clone(),
    quantity: model.quantity.clone(),
    objective_value,
    auxiliary_values,
    objective: model.objective.to_string(),
    derivative: first.to_string(),
    critical_point,
  })
}
