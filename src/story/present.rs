use crate::story::optimize::{CriticalKind, Solution};
use crate::story::{Outcome, StoryReport};

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Human-readable lines for a solved model, values to two decimals.
pub fn render_solution(solution: &Solution) -> String {
  let mut optima = vec![format!(
    "{} optimal = {:.2}",
    solution.variable, solution.optimization_variable_value
  )];
  for (name, value) in &solution.auxiliary_values {
    optima.push(format!("{name} optimal = {value:.2}"));
  }
  let heading = match solution.critical_point {
    CriticalKind::Maximum => format!("Maximum {}", solution.quantity),
    CriticalKind::Minimum => format!("Minimum {}", solution.quantity),
    CriticalKind::Inconclusive => {
      format!("{} at the critical point", capitalize(&solution.quantity))
    }
  };
  format!(
    "{}(x) = {}\n{}'(x) = {}\n{}\n{} = {:.2}",
    solution.objective_name,
    solution.objective,
    solution.objective_name,
    solution.derivative,
    optima.join(", "),
    heading,
    solution.objective_value
  )
}

/// Diagnostic echo first, then the result or the failure message.
pub fn render(report: &StoryReport) -> String {
  let mut out = String::new();
  if let Some(archetype) = report.archetype {
    let numbers: Vec<String> =
      report.numbers.iter().map(|n| format!("{n:?}")).collect();
    out.push_str(&format!(
      "Detected problem type: {archetype}\nNumbers found: [{}]\n",
      numbers.join(", ")
    ));
  }
  match &report.outcome {
    Outcome::Solved(solution) => out.push_str(&render_solution(solution)),
    Outcome::Failed { message, .. } => {
      out.push_str(&format!("Error: {message}"))
    }
  }
  out
}
