use std::path::PathBuf;

use anyhow::Context;
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use kalkulus::explore::{self, PlotSettings};
use kalkulus::forms;
use kalkulus::story::present::{render, render_solution};
use kalkulus::{solve_story, Outcome, Solution, StoryError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Print results as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Solve an optimization word problem written in plain text
  Solve {
    /// The problem text, e.g. "Sebuah taman ... keliling 40 meter ..."
    text: String,
  },
  /// Maximize the area of a rectangle with a fixed perimeter
  Area {
    #[arg(long, default_value_t = forms::DEFAULT_PERIMETER)]
    perimeter: f64,
  },
  /// Maximize the volume of an open box folded from a rectangular sheet
  #[command(name = "box")]
  OpenBox {
    #[arg(long, default_value_t = forms::DEFAULT_SHEET.0)]
    length: f64,
    #[arg(long, default_value_t = forms::DEFAULT_SHEET.1)]
    width: f64,
  },
  /// Maximize profit P(x) = R(x) - C(x)
  Profit {
    /// Revenue R(x)
    #[arg(long, default_value = forms::DEFAULT_REVENUE)]
    revenue: String,
    /// Cost C(x)
    #[arg(long, default_value = forms::DEFAULT_COST)]
    cost: String,
  },
  /// Plot f(x) together with its derivative
  Plot {
    /// The function f(x)
    #[arg(default_value = "x**2")]
    expression: String,
    #[arg(
      long,
      default_value_t = explore::DEFAULT_X_MIN,
      allow_hyphen_values = true
    )]
    x_min: f64,
    #[arg(
      long,
      default_value_t = explore::DEFAULT_X_MAX,
      allow_hyphen_values = true
    )]
    x_max: f64,
    /// Number of sample points
    #[arg(
      long,
      default_value_t = explore::DEFAULT_RESOLUTION,
      value_parser = clap::value_parser!(u16).range(100..=1000).map(usize::from)
    )]
    resolution: usize,
    /// Write the SVG here instead of printing it
    #[arg(long)]
    output: Option<PathBuf>,
  },
}

fn init_tracing() {
  let filter = EnvFilter::try_from_env("KALKULUS_LOG")
    .unwrap_or_else(|_| EnvFilter::new("kalkulus=warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

/// Print a form solver result; returns whether it succeeded.
fn print_form(
  result: Result<Solution, StoryError>,
  json: bool,
) -> anyhow::Result<bool> {
  if json {
    let outcome = Outcome::from(result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    return Ok(matches!(outcome, Outcome::Solved(_)));
  }
  match result {
    Ok(solution) => {
      println!("{}", render_solution(&solution));
      Ok(true)
    }
    Err(e) => {
      eprintln!("Error: {e}");
      Ok(false)
    }
  }
}

fn main() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let succeeded = match cli.command {
    Commands::Solve { text } => {
      let report = solve_story(&text);
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        println!("{}", render(&report));
      }
      report.is_solved()
    }
    Commands::Area { perimeter } => {
      print_form(forms::solve_area(perimeter), cli.json)?
    }
    Commands::OpenBox { length, width } => {
      print_form(forms::solve_box(length, width), cli.json)?
    }
    Commands::Profit { revenue, cost } => {
      print_form(forms::solve_profit(&revenue, &cost), cli.json)?
    }
    Commands::Plot {
      expression,
      x_min,
      x_max,
      resolution,
      output,
    } => {
      let settings = PlotSettings {
        x_min,
        x_max,
        resolution,
      };
      let exploration = explore::explore(&expression, &settings)?;
      if let Some(path) = &output {
        std::fs::write(path, &exploration.svg)
          .with_context(|| format!("writing {}", path.display()))?;
      }
      if cli.json {
        let value = serde_json::json!({
          "function": exploration.function.to_string(),
          "derivative": exploration.derivative.to_string(),
          "svg": output.is_none().then_some(&exploration.svg),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
      } else {
        println!("f(x) = {}", exploration.function);
        println!("f'(x) = {}", exploration.derivative);
        match &output {
          Some(path) => println!("Plot written to {}", path.display()),
          None => println!("{}", exploration.svg),
        }
      }
      true
    }
  };

  if !succeeded {
    std::process::exit(1);
  }
  Ok(())
}
