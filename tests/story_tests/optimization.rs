use super::*;

fn custom(objective: &str) -> SymbolicModel {
  SymbolicModel {
    variable: "x".to_string(),
    objective_name: "f".to_string(),
    quantity: "value".to_string(),
    objective: parse_expression(objective).unwrap(),
    auxiliaries: Vec::new(),
  }
}

#[test]
fn square_maximizes_the_area() {
  let solution = solved(model::area_with_fixed_perimeter(40.0));
  assert_close(solution.optimization_variable_value, 10.0);
  assert_close(solution.auxiliary_values["y"], 10.0);
  assert_close(solution.objective_value, 100.0);
  assert_eq!(solution.critical_point, CriticalKind::Maximum);
}

#[test]
fn area_scales_with_the_perimeter() {
  for perimeter in [4.0, 20.0, 37.5, 1000.0] {
    let solution = solved(model::area_with_fixed_perimeter(perimeter));
    let side = perimeter / 4.0;
    assert_close(solution.optimization_variable_value, side);
    assert_close(solution.objective_value, side * side);
  }
}

#[test]
fn quadratic_profit_vertex() {
  let solution = solved(model::quadratic_profit(50.0, 2.0));
  assert_close(solution.optimization_variable_value, 12.5);
  assert_close(solution.objective_value, 312.5);
  assert_eq!(solution.critical_point, CriticalKind::Maximum);
}

#[test]
fn revenue_and_price() {
  let solution = solved(model::linear_demand_revenue(100.0, 2.0));
  assert_close(solution.optimization_variable_value, 25.0);
  assert_close(solution.objective_value, 1250.0);
  assert_close(solution.auxiliary_values["p"], 50.0);
}

#[test]
fn open_box_satisfies_the_material_constraint() {
  let solution = solved(model::open_box(600.0).unwrap());
  let x = solution.optimization_variable_value;
  let h = solution.auxiliary_values["h"];
  assert!(x > 0.0 && h > 0.0);
  assert_close(x, 200f64.sqrt());
  assert_close(x * x + 4.0 * x * h, 600.0);
  assert_close(solution.objective_value, x * x * h);
  assert_eq!(solution.critical_point, CriticalKind::Maximum);
}

#[test]
fn open_box_with_a_large_sheet() {
  let area = 1e12;
  let solution = solved(model::open_box(area).unwrap());
  let x = solution.optimization_variable_value;
  assert_close(x, (area / 3.0).sqrt());
  assert_close(x * x + 4.0 * x * solution.auxiliary_values["h"], area);
  assert_eq!(solution.critical_point, CriticalKind::Maximum);
}

#[test]
fn profit_coefficients_of_very_different_size() {
  let solution = solved(model::quadratic_profit(2e13, 2.0));
  assert_close(solution.optimization_variable_value, 5e12);
  let solution = solved(model::quadratic_profit(5000.0, 1e-10));
  assert_close(solution.optimization_variable_value, 2.5e13);
  assert_eq!(solution.critical_point, CriticalKind::Maximum);
}

#[test]
fn flat_peak_of_a_quartic() {
  // slope -4(x - 2)^3 has a triple root
  let solution = solved(custom("-(x - 2)^4 + 10"));
  assert_close(solution.optimization_variable_value, 2.0);
  assert_close(solution.objective_value, 10.0);
}

#[test]
fn flat_peak_of_a_sextic() {
  let solution = solved(custom("-(x - 3)^6"));
  assert_close(solution.optimization_variable_value, 3.0);
  assert_close(solution.objective_value, 0.0);
}

#[test]
fn minimum_is_reported_as_such() {
  let solution = solved(custom("x^2 - 4*x"));
  assert_close(solution.optimization_variable_value, 2.0);
  assert_close(solution.objective_value, -4.0);
  assert_eq!(solution.critical_point, CriticalKind::Minimum);
}

#[test]
fn derivative_is_recorded() {
  let solution = solved(model::quadratic_profit(50.0, 2.0));
  assert_eq!(solution.objective, "50*x - 2*x^2");
  let slope = parse_expression(&solution.derivative).unwrap();
  assert_close(evaluate_at(&slope, "x", 12.5).unwrap(), 0.0);
}

#[test]
fn constant_slope_has_no_critical_point() {
  let err = optimize(&model::quadratic_profit(50.0, 0.0)).unwrap_err();
  assert!(matches!(err, StoryError::NoCriticalPoint));
}

#[test]
fn only_negative_roots_is_no_critical_point() {
  let err = optimize(&custom("x^2 + 4*x")).unwrap_err();
  assert_eq!(err.kind(), "no_critical_point");
}

#[test]
fn complex_roots_are_non_real() {
  let err = optimize(&custom("x^3 + x")).unwrap_err();
  assert!(matches!(err, StoryError::NonRealResult(_)));
}

#[test]
fn transcendental_derivative_is_unsolvable() {
  let err = optimize(&custom("sin(x)")).unwrap_err();
  assert_eq!(err.kind(), "unsolvable_equation");
}

#[test]
fn oversized_power_is_unsolvable() {
  let err = optimize(&custom("x^1000000")).unwrap_err();
  assert_eq!(err.kind(), "unsolvable_equation");
}
