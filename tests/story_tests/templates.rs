use super::*;

fn at(model: &SymbolicModel, x: f64) -> f64 {
  evaluate_at(&model.objective, "x", x).unwrap()
}

#[test]
fn area_with_fixed_perimeter() {
  let model = model::build(Archetype::Area, &[40.0], GARDEN).unwrap();
  assert_eq!(model.objective_name, "A");
  assert_eq!(model.quantity, "area");
  assert_close(at(&model, 10.0), 100.0);
  assert_close(at(&model, 4.0), 64.0);
  assert_eq!(model.auxiliaries.len(), 1);
  assert_eq!(model.auxiliaries[0].name, "y");
  let side = evaluate_at(&model.auxiliaries[0].expr, "x", 4.0).unwrap();
  assert_close(side, 16.0);
}

#[test]
fn open_box_eliminates_the_height() {
  let text = "Kotak tanpa tutup dari 600 cm persegi karton, volume maksimum?";
  let model = model::build(Archetype::Volume, &[600.0], text).unwrap();
  assert_eq!(model.objective_name, "V");
  assert!(!model.objective.contains_var("h"));
  assert_eq!(model.auxiliaries[0].name, "h");
  assert_eq!(model.auxiliaries[0].expr.to_string(), "(600 - x^2)/(4*x)");
  // x = 10: h = 12.5, V = 100 * 12.5
  assert_close(at(&model, 10.0), 1250.0);
}

#[test]
fn english_open_box_phrase() {
  let text = "An open-top box uses 600 square cm; maximize its volume";
  assert!(model::build(Archetype::Volume, &[600.0], text).is_ok());
}

#[test]
fn quadratic_profit() {
  let model =
    model::build(Archetype::Profit, &[50.0, 2.0], "keuntungan").unwrap();
  assert_eq!(model.objective.to_string(), "50*x - 2*x^2");
  assert_close(at(&model, 10.0), 300.0);
}

#[test]
fn linear_demand_revenue() {
  let model =
    model::build(Archetype::Revenue, &[100.0, 2.0], "permintaan").unwrap();
  assert_close(at(&model, 10.0), 800.0);
  assert_eq!(model.auxiliaries[0].name, "p");
}

#[test]
fn extra_numbers_are_ignored() {
  let model =
    model::build(Archetype::Profit, &[50.0, 2.0, 99.0], "profit").unwrap();
  assert_eq!(model.objective.to_string(), "50*x - 2*x^2");
}

#[test]
fn area_without_perimeter_phrase_is_ambiguous() {
  let err =
    model::build(Archetype::Area, &[40.0], "luas tanah 40").unwrap_err();
  assert!(matches!(
    err,
    StoryError::AmbiguousArchetype {
      archetype: Archetype::Area,
      ..
    }
  ));
  assert_eq!(err.kind(), "ambiguous_archetype");
}

#[test]
fn volume_without_open_box_phrase_is_ambiguous() {
  let err = model::build(Archetype::Volume, &[600.0], "volume kotak 600")
    .unwrap_err();
  assert!(matches!(
    err,
    StoryError::AmbiguousArchetype {
      archetype: Archetype::Volume,
      ..
    }
  ));
}

#[test]
fn too_few_numbers() {
  let err = model::build(Archetype::Profit, &[50.0], "keuntungan").unwrap_err();
  match err {
    StoryError::InsufficientData {
      archetype,
      required,
      found,
    } => {
      assert_eq!(archetype, Archetype::Profit);
      assert_eq!(required, 2);
      assert_eq!(found, 1);
    }
    other => panic!("expected InsufficientData, got {other:?}"),
  }
  assert!(matches!(
    model::build(Archetype::Area, &[], GARDEN),
    Err(StoryError::InsufficientData { found: 0, .. })
  ));
}

#[test]
fn phrase_is_checked_before_numbers() {
  assert!(matches!(
    model::build(Archetype::Area, &[], "luas tanah"),
    Err(StoryError::AmbiguousArchetype { .. })
  ));
}

#[test]
fn unknown_and_perimeter_are_unsupported() {
  for archetype in [Archetype::Unknown, Archetype::Perimeter] {
    let err = model::build(archetype, &[40.0, 2.0], "keliling 40").unwrap_err();
    assert_eq!(err.kind(), "unsupported_problem");
  }
}

#[test]
fn revenue_minus_cost_rejects_other_variables() {
  let revenue = parse_expression("100*x").unwrap();
  let cost = parse_expression("20*y").unwrap();
  assert!(matches!(
    model::revenue_minus_cost(revenue, cost),
    Err(StoryError::UnsupportedProblem(_))
  ));
}
