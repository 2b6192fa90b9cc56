//! Function and derivative explorer: `f(x)`, `f'(x)` and a plot of both.

use tracing::debug;

use crate::functions::calculus::{derivative, evaluate_at};
use crate::functions::plot::{generate_svg, y_bounds, PlotOptions, Series};
use crate::syntax::{parse_expression, Expr};
use crate::ExprError;

pub const DEFAULT_X_MIN: f64 = -10.0;
pub const DEFAULT_X_MAX: f64 = 10.0;
pub const DEFAULT_RESOLUTION: usize = 400;
pub const VARIABLE: &str = "x";

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
  pub x_min: f64,
  pub x_max: f64,
  pub resolution: usize,
}

impl Default for PlotSettings {
  fn default() -> Self {
    Self {
      x_min: DEFAULT_X_MIN,
      x_max: DEFAULT_X_MAX,
      resolution: DEFAULT_RESOLUTION,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Exploration {
  pub function: Expr,
  pub derivative: Expr,
  pub function_points: Vec<(f64, f64)>,
  pub derivative_points: Vec<(f64, f64)>,
  pub svg: String,
}

/// `resolution` evenly spaced points covering `[x_min, x_max]`.
pub fn linspace(x_min: f64, x_max: f64, resolution: usize) -> Vec<f64> {
  let step = (x_max - x_min) / (resolution - 1) as f64;
  (0..resolution)
    .map(|i| if i + 1 == resolution { x_max } else { x_min + step * i as f64 })
    .collect()
}

/// Non-finite values are kept as NaN so the plot breaks the curve there.
fn sample(expr: &Expr, xs: &[f64]) -> Result<Vec<(f64, f64)>, ExprError> {
  xs.iter()
    .map(|&x| {
      let y = evaluate_at(expr, VARIABLE, x)?;
      Ok((x, if y.is_finite() { y } else { f64::NAN }))
    })
    .collect()
}

fn validate(settings: &PlotSettings) -> Result<(), ExprError> {
  if !(settings.x_min.is_finite() && settings.x_max.is_finite()) {
    return Err(ExprError::InvalidRange("bounds must be finite".into()));
  }
  if settings.x_min >= settings.x_max {
    return Err(ExprError::InvalidRange(format!(
      "x minimum {} must be below x maximum {}",
      settings.x_min, settings.x_max
    )));
  }
  if settings.resolution < 2 {
    return Err(ExprError::InvalidRange(format!(
      "resolution {} is below 2",
      settings.resolution
    )));
  }
  Ok(())
}

/// Parse `source`, differentiate it and plot both curves.
pub fn explore(
  source: &str,
  settings: &PlotSettings,
) -> Result<Exploration, ExprError> {
  validate(settings)?;
  let function = parse_expression(source)?;
  if let Some(name) = function
    .free_variables()
    .into_iter()
    .find(|name| name != VARIABLE)
  {
    return Err(ExprError::EvaluationError(format!(
      "{function} depends on {name}; only {VARIABLE} may vary"
    )));
  }
  let derivative = derivative(&function, VARIABLE);
  debug!(%function, %derivative, "exploring");

  let xs = linspace(settings.x_min, settings.x_max, settings.resolution);
  let function_points = sample(&function, &xs)?;
  let derivative_points = sample(&derivative, &xs)?;

  let series = [
    Series {
      label: "f(x)".to_string(),
      points: function_points.clone(),
    },
    Series {
      label: "f'(x)".to_string(),
      points: derivative_points.clone(),
    },
  ];
  let y_range = y_bounds(&series).ok_or_else(|| {
    ExprError::EvaluationError(format!(
      "{function} has no finite value on the range"
    ))
  })?;
  let svg = generate_svg(
    &series,
    (settings.x_min, settings.x_max),
    y_range,
    &PlotOptions {
      title: Some(format!("f(x) = {function}")),
      ..Default::default()
    },
  )?;

  Ok(Exploration {
    function,
    derivative,
    function_points,
    derivative_points,
    svg,
  })
}
