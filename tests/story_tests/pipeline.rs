use super::*;

#[test]
fn garden_end_to_end() {
  let report = solve_story(GARDEN);
  assert_eq!(report.archetype, Some(Archetype::Area));
  assert_eq!(report.numbers, vec![40.0]);
  let solution = report.solution().unwrap();
  assert_close(solution.optimization_variable_value, 10.0);
  assert_close(solution.auxiliary_values["y"], 10.0);
  assert_close(solution.objective_value, 100.0);
}

#[test]
fn interpret_returns_the_same_answer() {
  let (archetype, numbers, solution) = interpret(GARDEN).unwrap();
  assert_eq!(archetype, Archetype::Area);
  assert_eq!(numbers, vec![40.0]);
  assert_close(solution.objective_value, 100.0);
}

#[test]
fn open_box_story() {
  let report = solve_story(
    "Kotak tanpa tutup dengan alas persegi dibuat dari 600 cm persegi karton. \
     Tentukan volume maksimum kotak.",
  );
  assert_eq!(report.archetype, Some(Archetype::Volume));
  assert_eq!(report.numbers, vec![600.0]);
  let solution = report.solution().unwrap();
  assert_close(solution.optimization_variable_value, 200f64.sqrt());
}

#[test]
fn profit_story() {
  let report =
    solve_story("Keuntungan P(x) = 50x - 2x^2. Berapa keuntungan maksimum?");
  assert_eq!(report.archetype, Some(Archetype::Profit));
  assert_eq!(report.numbers, vec![50.0, 2.0]);
  assert_close(report.solution().unwrap().optimization_variable_value, 12.5);
}

#[test]
fn rupiah_sized_profit_story() {
  let report = solve_story(
    "Keuntungan P(x) = 20000000000000x - 2x^2. Berapa keuntungan maksimum?",
  );
  assert_eq!(report.numbers, vec![2e13, 2.0]);
  let solution = report.solution().unwrap();
  assert_close(solution.optimization_variable_value, 5e12);
  assert_close(solution.objective_value, 5e25);
}

#[test]
fn revenue_story() {
  let report = solve_story(
    "Fungsi permintaan p = 100 - 2x. Tentukan pendapatan maksimum.",
  );
  assert_eq!(report.archetype, Some(Archetype::Revenue));
  let solution = report.solution().unwrap();
  assert_close(solution.optimization_variable_value, 25.0);
  assert_close(solution.objective_value, 1250.0);
}

#[test]
fn short_text_is_rejected_before_classification() {
  let report = solve_story("  luas 4  ");
  assert_eq!(report.archetype, None);
  assert!(report.numbers.is_empty());
  assert_eq!(report.failure_kind(), Some("empty_or_too_short_input"));
  assert_eq!(solve_story("").failure_kind(), Some("empty_or_too_short_input"));
  assert!(interpret("luas").is_err());
}

#[test]
fn length_threshold_counts_trimmed_characters() {
  let text = "a".repeat(MIN_PROBLEM_LENGTH);
  assert_eq!(solve_story(&text).failure_kind(), Some("unsupported_problem"));
  let text = format!("  {}  ", "a".repeat(MIN_PROBLEM_LENGTH - 1));
  assert_eq!(
    solve_story(&text).failure_kind(),
    Some("empty_or_too_short_input")
  );
}

#[test]
fn failures_keep_the_diagnostic_echo() {
  let report = solve_story("Tentukan keuntungan maksimum jika harga 50");
  assert_eq!(report.archetype, Some(Archetype::Profit));
  assert_eq!(report.numbers, vec![50.0]);
  assert_eq!(report.failure_kind(), Some("insufficient_data"));
  assert!(!report.is_solved());
}

#[test]
fn unknown_problem() {
  let report = solve_story("Hitung jarak antara dua kota itu");
  assert_eq!(report.archetype, Some(Archetype::Unknown));
  assert_eq!(report.failure_kind(), Some("unsupported_problem"));
}

#[test]
fn rendered_report() {
  let text = render(&solve_story(GARDEN));
  assert!(
    text.starts_with("Detected problem type: area\nNumbers found: [40.0]\n")
  );
  assert!(text.contains("A(x) = x*(20 - x)"));
  assert!(text.contains("x optimal = 10.00, y optimal = 10.00"));
  assert!(text.ends_with("Maximum area = 100.00"));
}

#[test]
fn rendered_failure() {
  let text = render(&solve_story("luas tanah 40 meter persegi"));
  assert!(text.starts_with("Detected problem type: area\n"));
  assert!(text.contains("Error: "));
  assert!(text.contains("keliling"));
}

#[test]
fn report_serializes_to_json() {
  let value = serde_json::to_value(solve_story(GARDEN)).unwrap();
  assert_eq!(value["archetype"], "area");
  assert_eq!(value["numbers"][0], 40.0);
  assert_eq!(value["outcome"]["status"], "solved");
  assert_eq!(value["outcome"]["critical_point"], "maximum");
  assert_eq!(value["outcome"]["auxiliary_values"]["y"], 10.0);

  let value = serde_json::to_value(solve_story("a")).unwrap();
  assert!(value["archetype"].is_null());
  assert_eq!(value["outcome"]["status"], "failed");
  assert_eq!(value["outcome"]["kind"], "empty_or_too_short_input");
}

#[test]
fn outcome_from_result() {
  let outcome = Outcome::from(Err::<Solution, _>(StoryError::NoCriticalPoint));
  assert_eq!(
    outcome,
    Outcome::Failed {
      kind: "no_critical_point".to_string(),
      message: StoryError::NoCriticalPoint.to_string(),
    }
  );
}
