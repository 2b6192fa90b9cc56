use plotters::prelude::*;

use crate::ExprError;

pub const DEFAULT_WIDTH: u32 = 480;
pub const DEFAULT_HEIGHT: u32 = 300;
/// Plotters snaps to integer pixels; drawing this many times larger and
/// shrinking through the viewBox keeps curves smooth.
const SUPERSAMPLE: u32 = 10;
const FONT_SIZE: f64 = 11.0;
const TITLE_SIZE: f64 = 13.0;

/// Series colors in drawing order: f in blue, f' in orange.
pub const PLOT_COLORS: [(u8, u8, u8); 4] = [
  (0x5E, 0x81, 0xB5),
  (0xE0, 0x93, 0x2C),
  (0x8F, 0xB0, 0x32),
  (0xD9, 0x51, 0x19),
];

/// One labelled curve.
#[derive(Debug, Clone)]
pub struct Series {
  pub label: String,
  pub points: Vec<(f64, f64)>,
}

/// Display size of the SVG and an optional title above the chart.
#[derive(Debug, Clone)]
pub struct PlotOptions {
  pub width: u32,
  pub height: u32,
  pub title: Option<String>,
}

impl Default for PlotOptions {
  fn default() -> Self {
    PlotOptions {
      width: DEFAULT_WIDTH,
      height: DEFAULT_HEIGHT,
      title: None,
    }
  }
}

impl PlotOptions {
  fn title(&self) -> Option<&str> {
    self.title.as_deref().filter(|t| !t.is_empty())
  }
}

/// A chart axis with a round major step, five minor ticks per major one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
  pub min: f64,
  pub max: f64,
  pub step: f64,
}

impl Axis {
  pub fn new(min: f64, max: f64) -> Self {
    Axis {
      min,
      max,
      step: nice_step(max - min, 5),
    }
  }

  fn tick_count(&self) -> usize {
    ((self.max - self.min) / (self.step / 5.0)).round() as usize + 1
  }

  /// Only major ticks are labelled.
  fn label(&self, v: f64) -> String {
    let k = v / self.step;
    if self.step == 0.0 || (k - k.round()).abs() < 1e-9 {
      format_tick(v)
    } else {
      String::new()
    }
  }

  fn contains_zero(&self) -> bool {
    self.min < 0.0 && self.max > 0.0
  }
}

fn render_error<E: std::fmt::Display>(e: E) -> ExprError {
  ExprError::Render(e.to_string())
}

/// Maximal runs of finite samples with at least two points each.
///
/// NaN and infinite values break the curve.
pub fn finite_runs(points: &[(f64, f64)]) -> Vec<&[(f64, f64)]> {
  points
    .split(|p| !p.1.is_finite())
    .filter(|run| run.len() > 1)
    .collect()
}

/// Vertical extent of all finite samples, padded by 5%.
///
/// `None` when no sample is finite. A flat curve gets a unit band around it.
pub fn y_bounds(series: &[Series]) -> Option<(f64, f64)> {
  let (lo, hi) = series
    .iter()
    .flat_map(|s| s.points.iter().map(|p| p.1))
    .filter(|y| y.is_finite())
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
      (lo.min(y), hi.max(y))
    });
  if lo > hi {
    return None;
  }
  if hi - lo < f64::EPSILON * hi.abs().max(1.0) {
    return Some((lo - 1.0, hi + 1.0));
  }
  let pad = (hi - lo) * 0.05;
  Some((lo - pad, hi + pad))
}

/// Round step (1, 2 or 5 times a power of ten) giving about `labels` ticks.
pub fn nice_step(span: f64, labels: usize) -> f64 {
  let raw = span / labels as f64;
  let magnitude = 10_f64.powi(raw.abs().log10().floor() as i32);
  let mantissa = match raw / magnitude {
    m if m <= 1.0 => 1.0,
    m if m <= 2.0 => 2.0,
    m if m <= 5.0 => 5.0,
    _ => 10.0,
  };
  mantissa * magnitude
}

/// Whole numbers print without a fraction, the rest with one decimal.
pub fn format_tick(v: f64) -> String {
  let rounded = v.round();
  if (v - rounded).abs() < 1e-9 {
    // avoid "-0"
    format!("{}", rounded as i64)
  } else {
    format!("{v:.1}")
  }
}

/// Render line series to an SVG document.
pub fn generate_svg(
  series: &[Series],
  x_range: (f64, f64),
  y_range: (f64, f64),
  opts: &PlotOptions,
) -> Result<String, ExprError> {
  let x_axis = Axis::new(x_range.0, x_range.1);
  let y_axis = Axis::new(y_range.0, y_range.1);
  let canvas = (opts.width * SUPERSAMPLE, opts.height * SUPERSAMPLE);
  let top_margin = SUPERSAMPLE * if opts.title().is_some() { 25 } else { 12 };

  let mut svg = String::new();
  {
    let area = SVGBackend::with_string(&mut svg, canvas).into_drawing_area();
    area.fill(&WHITE).map_err(render_error)?;

    let axis_color = RGBColor(0x66, 0x66, 0x66);
    let guide_color = RGBColor(0xCC, 0xCC, 0xCC);

    let mut chart = ChartBuilder::on(&area)
      .margin_top(top_margin)
      .margin_right(10 * SUPERSAMPLE)
      .margin_bottom(10 * SUPERSAMPLE)
      .margin_left(10 * SUPERSAMPLE)
      .x_label_area_size(25 * SUPERSAMPLE)
      .y_label_area_size(45 * SUPERSAMPLE)
      .build_cartesian_2d(x_axis.min..x_axis.max, y_axis.min..y_axis.max)
      .map_err(render_error)?;

    let tick_size = 4 * SUPERSAMPLE as i32;
    chart
      .configure_mesh()
      .disable_mesh()
      .x_labels(x_axis.tick_count())
      .y_labels(y_axis.tick_count())
      .x_label_formatter(&|v: &f64| x_axis.label(*v))
      .y_label_formatter(&|v: &f64| y_axis.label(*v))
      .axis_style(axis_color.stroke_width(SUPERSAMPLE))
      .label_style(
        ("sans-serif", SUPERSAMPLE as f64 * FONT_SIZE)
          .into_font()
          .color(&axis_color),
      )
      .set_tick_mark_size(LabelAreaPosition::Left, tick_size)
      .set_tick_mark_size(LabelAreaPosition::Bottom, tick_size)
      .draw()
      .map_err(render_error)?;

    // x = 0 and y = 0 guides, when inside the chart
    let mut guides = Vec::new();
    if y_axis.contains_zero() {
      guides.push(vec![(x_axis.min, 0.0), (x_axis.max, 0.0)]);
    }
    if x_axis.contains_zero() {
      guides.push(vec![(0.0, y_axis.min), (0.0, y_axis.max)]);
    }
    chart
      .draw_series(
        guides.into_iter().map(|line| {
          PathElement::new(line, guide_color.stroke_width(SUPERSAMPLE))
        }),
      )
      .map_err(render_error)?;

    for (curve, &(r, g, b)) in series.iter().zip(PLOT_COLORS.iter().cycle()) {
      let style = RGBColor(r, g, b).stroke_width(SUPERSAMPLE * 3 / 2);
      chart
        .draw_series(
          finite_runs(&curve.points)
            .into_iter()
            .map(|run| PathElement::new(run.to_vec(), style)),
        )
        .map_err(render_error)?;
    }

    area.present().map_err(render_error)?;
  }

  scale_to_display(&mut svg, opts, canvas);
  if let Some(end) = svg.rfind("</svg>") {
    svg.insert_str(end, &overlay(series, opts, canvas.0, top_margin));
  }
  Ok(svg)
}

/// Legend entries in the top-right corner and the centred title.
fn overlay(
  series: &[Series],
  opts: &PlotOptions,
  canvas_width: u32,
  top_margin: u32,
) -> String {
  let scale = SUPERSAMPLE as f64;
  let font_size = scale * FONT_SIZE;
  let right = canvas_width as f64 - 14.0 * scale;
  let mut out = String::new();
  for (idx, (curve, &(r, g, b))) in series
    .iter()
    .zip(PLOT_COLORS.iter().cycle())
    .enumerate()
    .filter(|(_, (curve, _))| !curve.label.is_empty())
  {
    let y = 12.0 * scale + font_size * 1.2 * (idx + 1) as f64;
    out.push_str(&format!(
      "<text x=\"{right:.1}\" y=\"{y:.1}\" text-anchor=\"end\" \
       font-family=\"sans-serif\" font-size=\"{font_size:.0}\" \
       fill=\"#{r:02X}{g:02X}{b:02X}\">{}</text>\n",
      escape_text(&curve.label)
    ));
  }
  if let Some(title) = opts.title() {
    let cx = canvas_width as f64 / 2.0;
    let y = top_margin as f64 * 0.6;
    out.push_str(&format!(
      "<text x=\"{cx:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" \
       font-family=\"sans-serif\" font-size=\"{:.0}\" \
       fill=\"#333\">{}</text>\n",
      scale * TITLE_SIZE,
      escape_text(title)
    ));
  }
  out
}

/// Swap the supersampled size in the opening tag for the display size,
/// keeping the drawing coordinates through the viewBox.
fn scale_to_display(svg: &mut String, opts: &PlotOptions, canvas: (u32, u32)) {
  let Some(tag_end) = svg.find('>') else {
    return;
  };
  let header = format!(
    "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" \
     preserveAspectRatio=\"xMidYMid meet\" \
     xmlns=\"http://www.w3.org/2000/svg\"",
    opts.width, opts.height, canvas.0, canvas.1
  );
  svg.replace_range(..tag_end, &header);
}

fn escape_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(c),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn runs_break_at_non_finite_samples() {
    let points = [
      (0.0, 1.0),
      (1.0, 2.0),
      (2.0, f64::NAN),
      (3.0, 4.0),
      (4.0, f64::INFINITY),
      (5.0, 6.0),
      (6.0, 7.0),
    ];
    let runs = finite_runs(&points);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0], &[(0.0, 1.0), (1.0, 2.0)]);
    assert_eq!(runs[1], &[(5.0, 6.0), (6.0, 7.0)]);
  }

  #[test]
  fn steps_are_round() {
    assert_eq!(nice_step(20.0, 5), 5.0);
    assert_eq!(nice_step(1.0, 5), 0.2);
    assert_eq!(nice_step(700.0, 5), 200.0);
  }

  #[test]
  fn tick_labels() {
    assert_eq!(format_tick(4.0), "4");
    assert_eq!(format_tick(-0.0), "0");
    assert_eq!(format_tick(2.5), "2.5");
    let axis = Axis::new(-10.0, 10.0);
    assert_eq!(axis.label(5.0), "5");
    assert_eq!(axis.label(1.0), "");
  }

  #[test]
  fn flat_curve_gets_a_band() {
    let series = [Series {
      label: String::new(),
      points: vec![(0.0, 3.0), (1.0, 3.0)],
    }];
    assert_eq!(y_bounds(&series), Some((2.0, 4.0)));
  }

  #[test]
  fn nothing_finite_has_no_bounds() {
    let series = [Series {
      label: String::new(),
      points: vec![(0.0, f64::NAN)],
    }];
    assert_eq!(y_bounds(&series), None);
  }

  #[test]
  fn labels_are_escaped() {
    assert_eq!(escape_text("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
  }
}
