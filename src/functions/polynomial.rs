use std::fmt;

use serde::Serialize;

use crate::functions::calculus::evaluate_constant;
use crate::syntax::{BinaryOperator, Expr};
use crate::ExprError;

/// A sum is zero when it is this small relative to the magnitudes of the
/// terms that produced it, i.e. within the round-off of the cancellation.
const CANCELLATION: f64 = 64.0 * f64::EPSILON;
/// A root is real when its imaginary part is this small relative to its size.
const IMAG_TOLERANCE: f64 = 1e-9;
const MAX_ITERATIONS: usize = 500;
/// Largest integer power expanded into polynomial coefficients.
const MAX_EXPONENT: u64 = 64;
/// Durand–Kerner leaves the copies of a repeated root on a small circle
/// around it; roots this close, relative to their size, are examined
/// together.
const CLUSTER_RADIUS: f64 = 1e-2;
/// Residual, in units of round-off, accepted at a merged repeated root.
const RESIDUAL_ULPS: f64 = 1e4;

/// Dense polynomial in one variable, coefficients in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
  coeffs: Vec<f64>,
}

impl Polynomial {
  /// Trailing zero coefficients are dropped; every other one is kept as
  /// given, however small.
  pub fn new(mut coeffs: Vec<f64>) -> Self {
    while coeffs.last() == Some(&0.0) {
      coeffs.pop();
    }
    Polynomial { coeffs }
  }

  pub fn constant(c: f64) -> Self {
    Polynomial::new(vec![c])
  }

  /// The monomial `x`.
  pub fn identity() -> Self {
    Polynomial::new(vec![0.0, 1.0])
  }

  pub fn coefficients(&self) -> &[f64] {
    &self.coeffs
  }

  pub fn is_zero(&self) -> bool {
    self.coeffs.is_empty()
  }

  /// `None` for the zero polynomial.
  pub fn degree(&self) -> Option<usize> {
    self.coeffs.len().checked_sub(1)
  }

  fn coeff(&self, i: usize) -> f64 {
    self.coeffs.get(i).copied().unwrap_or(0.0)
  }

  /// Number of leading zero coefficients, i.e. the multiplicity of the root 0.
  fn lowest_order(&self) -> usize {
    self.coeffs.iter().take_while(|c| **c == 0.0).count()
  }

  /// Divide by `x^k`; the caller guarantees `k <= lowest_order()`.
  fn shift_down(&self, k: usize) -> Self {
    Polynomial::new(self.coeffs[k..].to_vec())
  }

  pub fn add(&self, other: &Self) -> Self {
    let len = self.coeffs.len().max(other.coeffs.len());
    let coeffs = (0..len)
      .map(|i| {
        let (a, b) = (self.coeff(i), other.coeff(i));
        cancelled(a + b, a.abs() + b.abs())
      })
      .collect();
    Polynomial::new(coeffs)
  }

  pub fn scale(&self, factor: f64) -> Self {
    Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
  }

  pub fn mul(&self, other: &Self) -> Self {
    if self.is_zero() || other.is_zero() {
      return Polynomial::new(vec![]);
    }
    let len = self.coeffs.len() + other.coeffs.len() - 1;
    let mut sums = vec![0.0; len];
    let mut magnitudes = vec![0.0; len];
    for (i, a) in self.coeffs.iter().enumerate() {
      for (j, b) in other.coeffs.iter().enumerate() {
        sums[i + j] += a * b;
        magnitudes[i + j] += (a * b).abs();
      }
    }
    Polynomial::new(
      sums
        .into_iter()
        .zip(magnitudes)
        .map(|(sum, magnitude)| cancelled(sum, magnitude))
        .collect(),
    )
  }

  pub fn powi(&self, n: u32) -> Self {
    (0..n).fold(Polynomial::constant(1.0), |acc, _| acc.mul(self))
  }

  /// Horner evaluation.
  pub fn eval(&self, x: f64) -> f64 {
    self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
  }

  fn eval_complex(&self, z: Complex) -> Complex {
    self
      .coeffs
      .iter()
      .rev()
      .fold(Complex::ZERO, |acc, c| acc * z + Complex::real(*c))
  }

  fn derivative(&self) -> Self {
    Polynomial::new(
      self
        .coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect(),
    )
  }

  fn nth_derivative(&self, n: usize) -> Self {
    (0..n).fold(self.clone(), |p, _| p.derivative())
  }
}

fn cancelled(sum: f64, magnitude: f64) -> f64 {
  if sum.abs() <= CANCELLATION * magnitude {
    0.0
  } else {
    sum
  }
}

/// Quotient of two polynomials, `numerator / denominator`.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalFunction {
  pub numerator: Polynomial,
  pub denominator: Polynomial,
}

impl RationalFunction {
  fn polynomial(p: Polynomial) -> Self {
    RationalFunction {
      numerator: p,
      denominator: Polynomial::constant(1.0),
    }
  }

  /// Cancel the common `x^k` factor of numerator and denominator.
  fn reduced(numerator: Polynomial, denominator: Polynomial) -> Self {
    if numerator.is_zero() {
      return RationalFunction::polynomial(numerator);
    }
    let k = numerator.lowest_order().min(denominator.lowest_order());
    RationalFunction {
      numerator: numerator.shift_down(k),
      denominator: denominator.shift_down(k),
    }
  }

  fn add(&self, other: &Self) -> Self {
    RationalFunction::reduced(
      self
        .numerator
        .mul(&other.denominator)
        .add(&other.numerator.mul(&self.denominator)),
      self.denominator.mul(&other.denominator),
    )
  }

  fn neg(&self) -> Self {
    RationalFunction {
      numerator: self.numerator.scale(-1.0),
      denominator: self.denominator.clone(),
    }
  }

  fn mul(&self, other: &Self) -> Self {
    RationalFunction::reduced(
      self.numerator.mul(&other.numerator),
      self.denominator.mul(&other.denominator),
    )
  }

  fn recip(&self) -> Result<Self, ExprError> {
    if self.numerator.is_zero() {
      return Err(ExprError::EvaluationError("Division by zero".into()));
    }
    Ok(RationalFunction {
      numerator: self.denominator.clone(),
      denominator: self.numerator.clone(),
    })
  }

  fn powi(&self, n: i64) -> Result<Self, ExprError> {
    let magnitude = n.unsigned_abs();
    if magnitude > MAX_EXPONENT {
      return Err(ExprError::EvaluationError(format!(
        "Exponent {n} is too large to expand"
      )));
    }
    let magnitude = magnitude as u32;
    let raised = RationalFunction::reduced(
      self.numerator.powi(magnitude),
      self.denominator.powi(magnitude),
    );
    if n < 0 {
      raised.recip()
    } else {
      Ok(raised)
    }
  }

  /// Convert an expression in `var` into a quotient of polynomials.
  ///
  /// Fails for anything that is not built from `+ - * /` and integer powers
  /// of `var`, e.g. `sin(x)`, `x^0.5` or a second free variable.
  pub fn from_expr(expr: &Expr, var: &str) -> Result<Self, ExprError> {
    if !expr.contains_var(var) {
      return Ok(RationalFunction::polynomial(Polynomial::constant(
        evaluate_constant(expr)?,
      )));
    }
    match expr {
      Expr::Identifier(_) => {
        Ok(RationalFunction::polynomial(Polynomial::identity()))
      }
      Expr::Negate(inner) => Ok(RationalFunction::from_expr(inner, var)?.neg()),
      Expr::BinaryOp { op, left, right } => {
        let a = RationalFunction::from_expr(left, var)?;
        match op {
          BinaryOperator::Plus => {
            Ok(a.add(&RationalFunction::from_expr(right, var)?))
          }
          BinaryOperator::Minus => {
            Ok(a.add(&RationalFunction::from_expr(right, var)?.neg()))
          }
          BinaryOperator::Times => {
            Ok(a.mul(&RationalFunction::from_expr(right, var)?))
          }
          BinaryOperator::Divide => {
            Ok(a.mul(&RationalFunction::from_expr(right, var)?.recip()?))
          }
          BinaryOperator::Power => {
            if right.contains_var(var) {
              return Err(ExprError::EvaluationError(format!(
                "Variable exponent in {expr}"
              )));
            }
            let n = evaluate_constant(right)?;
            if n.fract() != 0.0 || !n.is_finite() {
              return Err(ExprError::EvaluationError(format!(
                "Non-integer exponent in {expr}"
              )));
            }
            a.powi(n as i64)
          }
        }
      }
      _ => Err(ExprError::EvaluationError(format!(
        "{expr} is not a rational function of {var}"
      ))),
    }
  }
}

/// A root of a polynomial, possibly complex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Root {
  pub re: f64,
  pub im: f64,
}

impl Root {
  pub fn real(re: f64) -> Self {
    Root { re, im: 0.0 }
  }

  pub fn is_real(&self) -> bool {
    self.im.abs() <= IMAG_TOLERANCE * (1.0 + self.re.abs())
  }
}

impl fmt::Display for Root {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_real() {
      write!(f, "{}", self.re)
    } else if self.im < 0.0 {
      write!(f, "{} - {}i", self.re, -self.im)
    } else {
      write!(f, "{} + {}i", self.re, self.im)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
  re: f64,
  im: f64,
}

impl Complex {
  const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

  fn real(re: f64) -> Self {
    Complex { re, im: 0.0 }
  }

  fn norm(self) -> f64 {
    self.re.hypot(self.im)
  }
}

impl std::ops::Add for Complex {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Complex {
      re: self.re + rhs.re,
      im: self.im + rhs.im,
    }
  }
}

impl std::ops::Sub for Complex {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    Complex {
      re: self.re - rhs.re,
      im: self.im - rhs.im,
    }
  }
}

impl std::ops::Mul for Complex {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    Complex {
      re: self.re * rhs.re - self.im * rhs.im,
      im: self.re * rhs.im + self.im * rhs.re,
    }
  }
}

impl std::ops::Div for Complex {
  type Output = Self;

  fn div(self, rhs: Self) -> Self {
    let d = rhs.re * rhs.re + rhs.im * rhs.im;
    Complex {
      re: (self.re * rhs.re + self.im * rhs.im) / d,
      im: (self.im * rhs.re - self.re * rhs.im) / d,
    }
  }
}

/// All roots of `p`, real roots ascending first, then complex roots ordered
/// by real part with the negative imaginary part first.
///
/// Constant polynomials (including zero) have no isolated roots.
pub fn find_roots(p: &Polynomial) -> Vec<Root> {
  if p.degree().unwrap_or(0) == 0 {
    return Vec::new();
  }
  let zeros = p.lowest_order();
  let q = p.shift_down(zeros);
  let mut roots = vec![Root::real(0.0); zeros];
  let c = q.coefficients();
  match q.degree() {
    Some(1) => roots.push(Root::real(-c[0] / c[1])),
    Some(2) => roots.extend(quadratic_roots(c[2], c[1], c[0])),
    Some(_) => roots.extend(durand_kerner(&q)),
    None => {}
  }
  sort_roots(&mut roots);
  roots
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<Root> {
  let disc = b * b - 4.0 * a * c;
  if disc.abs() <= CANCELLATION * (b * b + (4.0 * a * c).abs()) {
    let r = -b / (2.0 * a);
    return vec![Root::real(r), Root::real(r)];
  }
  if disc > 0.0 {
    // q avoids cancellation between -b and sqrt(disc)
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    vec![Root::real(q / a), Root::real(c / q)]
  } else {
    let re = -b / (2.0 * a);
    let im = ((-disc).sqrt() / (2.0 * a)).abs();
    vec![Root { re, im: -im }, Root { re, im }]
  }
}

/// Weierstrass (Durand–Kerner) iteration for all roots at once.
fn durand_kerner(p: &Polynomial) -> Vec<Root> {
  let coeffs = p.coefficients();
  let n = coeffs.len() - 1;
  let lead = coeffs[n];
  let monic = p.scale(1.0 / lead);
  let seed = Complex { re: 0.4, im: 0.9 };
  let mut z: Vec<Complex> = Vec::with_capacity(n);
  let mut current = Complex::real(1.0);
  for _ in 0..n {
    z.push(current);
    current = current * seed;
  }

  for _ in 0..MAX_ITERATIONS {
    let mut largest_step = 0.0_f64;
    for i in 0..n {
      let mut denom = Complex::real(1.0);
      for j in 0..n {
        if i != j {
          denom = denom * (z[i] - z[j]);
        }
      }
      let step = monic.eval_complex(z[i]) / denom;
      z[i] = z[i] - step;
      largest_step = largest_step.max(step.norm());
    }
    if largest_step < 1e-14 {
      break;
    }
  }

  settle(p, &z)
}

/// Turn iterates into roots: clusters around a repeated real root become
/// that root with its multiplicity, other near-real iterates are polished.
fn settle(p: &Polynomial, z: &[Complex]) -> Vec<Root> {
  let dp = p.derivative();
  let mut roots = Vec::with_capacity(z.len());
  let mut taken = vec![false; z.len()];
  for i in 0..z.len() {
    if taken[i] {
      continue;
    }
    let radius = CLUSTER_RADIUS * (1.0 + z[i].norm());
    let members: Vec<usize> = (i..z.len())
      .filter(|&j| !taken[j] && (z[j] - z[i]).norm() <= radius)
      .collect();
    if members.len() > 1 {
      let cluster: Vec<Complex> = members.iter().map(|&j| z[j]).collect();
      if let Some(x) = repeated_real_root(p, &cluster) {
        for &j in &members {
          taken[j] = true;
        }
        roots.extend(std::iter::repeat(Root::real(x)).take(members.len()));
        continue;
      }
    }
    taken[i] = true;
    let root = Root {
      re: z[i].re,
      im: z[i].im,
    };
    if root.is_real() {
      roots.push(Root::real(polish_real(p, &dp, z[i].re)));
    } else {
      roots.push(root);
    }
  }
  roots
}

/// The real root of multiplicity `cluster.len()` the iterates surround, if
/// there is one.
///
/// Such a root is a simple root of the `(m - 1)`-th derivative, so Newton
/// converges there from the cluster's centre; `p` must then vanish within
/// round-off, which rules out distinct roots that merely lie close.
fn repeated_real_root(p: &Polynomial, cluster: &[Complex]) -> Option<f64> {
  let m = cluster.len();
  let sum = cluster.iter().fold(Complex::ZERO, |acc, z| acc + *z);
  let (re, im) = (sum.re / m as f64, sum.im / m as f64);
  if im.abs() > CLUSTER_RADIUS * (1.0 + re.abs()) {
    return None;
  }
  let lower = p.nth_derivative(m - 1);
  let x = polish_real(&lower, &lower.derivative(), re);
  let magnitude = p
    .coefficients()
    .iter()
    .rev()
    .fold(0.0, |acc, c| acc * x.abs() + c.abs());
  (x.is_finite()
    && p.eval(x).abs() <= RESIDUAL_ULPS * f64::EPSILON * magnitude)
    .then_some(x)
}

/// A few Newton steps on the real axis.
fn polish_real(p: &Polynomial, dp: &Polynomial, mut x: f64) -> f64 {
  for _ in 0..16 {
    let slope = dp.eval(x);
    if slope == 0.0 {
      break;
    }
    let step = p.eval(x) / slope;
    x -= step;
    if step.abs() <= f64::EPSILON * x.abs().max(1.0) {
      break;
    }
  }
  x
}

fn sort_roots(roots: &mut [Root]) {
  roots.sort_by(|a, b| {
    b.is_real()
      .cmp(&a.is_real())
      .then(a.re.total_cmp(&b.re))
      .then(a.im.total_cmp(&b.im))
  });
}

/// Roots of `expr = 0` with respect to `var`.
///
/// The expression is brought to the form `N(x)/D(x)`; roots of `N` at which
/// `D` vanishes are dropped.
pub fn solve_zero(expr: &Expr, var: &str) -> Result<Vec<Root>, ExprError> {
  let rational = RationalFunction::from_expr(expr, var)?;
  let denominator = &rational.denominator;
  let scale = denominator
    .coefficients()
    .iter()
    .fold(0.0_f64, |m, c| m.max(c.abs()));
  Ok(
    find_roots(&rational.numerator)
      .into_iter()
      .filter(|r| {
        denominator.eval_complex(Complex { re: r.re, im: r.im }).norm()
          > scale * 1e-9
      })
      .collect(),
  )
}
