use std::fmt;

use pest::iterators::Pair;

use crate::{CalculusParser, ExprError, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Power,
}

/// Elementary functions understood by the parser and the calculus routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
  Sin,
  Cos,
  Tan,
  Exp,
  Ln,
  Sqrt,
  Abs,
}

impl Function {
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "sin" => Some(Function::Sin),
      "cos" => Some(Function::Cos),
      "tan" => Some(Function::Tan),
      "exp" => Some(Function::Exp),
      "ln" | "log" => Some(Function::Ln),
      "sqrt" => Some(Function::Sqrt),
      "abs" => Some(Function::Abs),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Function::Sin => "sin",
      Function::Cos => "cos",
      Function::Tan => "tan",
      Function::Exp => "exp",
      Function::Ln => "ln",
      Function::Sqrt => "sqrt",
      Function::Abs => "abs",
    }
  }

  pub fn apply(self, x: f64) -> f64 {
    match self {
      Function::Sin => x.sin(),
      Function::Cos => x.cos(),
      Function::Tan => x.tan(),
      Function::Exp => x.exp(),
      Function::Ln => x.ln(),
      Function::Sqrt => x.sqrt(),
      Function::Abs => x.abs(),
    }
  }
}

/// Single-variable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Number(f64),
  Identifier(String),
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Negate(Box<Expr>),
  FunctionCall {
    func: Function,
    arg: Box<Expr>,
  },
}

impl Expr {
  pub fn var(name: &str) -> Self {
    Expr::Identifier(name.to_string())
  }

  pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
    Expr::BinaryOp {
      op,
      left: Box::new(left),
      right: Box::new(right),
    }
  }

  pub fn pow(self, exponent: Expr) -> Self {
    Expr::binary(BinaryOperator::Power, self, exponent)
  }

  pub fn call(func: Function, arg: Expr) -> Self {
    Expr::FunctionCall {
      func,
      arg: Box::new(arg),
    }
  }

  pub fn is_number(&self, value: f64) -> bool {
    matches!(self, Expr::Number(n) if *n == value)
  }

  /// True if `var` occurs anywhere in the expression.
  pub fn contains_var(&self, var: &str) -> bool {
    match self {
      Expr::Number(_) => false,
      Expr::Identifier(name) => name == var,
      Expr::BinaryOp { left, right, .. } => {
        left.contains_var(var) || right.contains_var(var)
      }
      Expr::Negate(inner) => inner.contains_var(var),
      Expr::FunctionCall { arg, .. } => arg.contains_var(var),
    }
  }

  /// Identifiers other than the named constants `pi` and `e`, sorted.
  pub fn free_variables(&self) -> Vec<String> {
    fn collect(expr: &Expr, out: &mut Vec<String>) {
      match expr {
        Expr::Number(_) => {}
        Expr::Identifier(name) => {
          if !is_constant_name(name) && !out.contains(name) {
            out.push(name.clone());
          }
        }
        Expr::BinaryOp { left, right, .. } => {
          collect(left, out);
          collect(right, out);
        }
        Expr::Negate(inner) => collect(inner, out),
        Expr::FunctionCall { arg, .. } => collect(arg, out),
      }
    }
    let mut out = Vec::new();
    collect(self, &mut out);
    out.sort();
    out
  }
}

pub(crate) fn is_constant_name(name: &str) -> bool {
  matches!(name, "pi" | "e")
}

impl std::ops::Add for Expr {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Expr::binary(BinaryOperator::Plus, self, rhs)
  }
}

impl std::ops::Sub for Expr {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    Expr::binary(BinaryOperator::Minus, self, rhs)
  }
}

impl std::ops::Mul for Expr {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    Expr::binary(BinaryOperator::Times, self, rhs)
  }
}

impl std::ops::Div for Expr {
  type Output = Self;

  fn div(self, rhs: Self) -> Self {
    Expr::binary(BinaryOperator::Divide, self, rhs)
  }
}

impl std::ops::Neg for Expr {
  type Output = Self;

  fn neg(self) -> Self {
    Expr::Negate(Box::new(self))
  }
}

impl From<f64> for Expr {
  fn from(value: f64) -> Self {
    Expr::Number(value)
  }
}

/// Replace every occurrence of `var` with `value`.
pub fn substitute_variable(expr: &Expr, var: &str, value: &Expr) -> Expr {
  match expr {
    Expr::Identifier(name) if name == var => value.clone(),
    Expr::BinaryOp { op, left, right } => Expr::BinaryOp {
      op: *op,
      left: Box::new(substitute_variable(left, var, value)),
      right: Box::new(substitute_variable(right, var, value)),
    },
    Expr::Negate(inner) => {
      Expr::Negate(Box::new(substitute_variable(inner, var, value)))
    }
    Expr::FunctionCall { func, arg } => Expr::FunctionCall {
      func: *func,
      arg: Box::new(substitute_variable(arg, var, value)),
    },
    other => other.clone(),
  }
}

/// Parse a single expression such as `100*x - 0.5*x**2`.
pub fn parse_expression(input: &str) -> Result<Expr, ExprError> {
  if input.trim().is_empty() {
    return Err(ExprError::EmptyInput);
  }
  let mut pairs = CalculusParser::parse_program(input)?;
  let program = pairs
    .next()
    .ok_or_else(|| ExprError::EvaluationError("Missing program".into()))?;
  let expression = program
    .into_inner()
    .find(|p| p.as_rule() == Rule::Expression)
    .ok_or_else(|| ExprError::EvaluationError("Missing expression".into()))?;
  pair_to_expr(expression)
}

fn next_operand(
  pair: Option<Pair<Rule>>,
  context: &str,
) -> Result<Expr, ExprError> {
  match pair {
    Some(p) => pair_to_expr(p),
    None => Err(ExprError::EvaluationError(format!(
      "Missing operand in {context}"
    ))),
  }
}

fn pair_to_expr(pair: Pair<Rule>) -> Result<Expr, ExprError> {
  match pair.as_rule() {
    Rule::Expression => {
      let mut inner = pair.into_inner();
      let mut acc = next_operand(inner.next(), "sum")?;
      while let Some(op) = inner.next() {
        let rhs = next_operand(inner.next(), "sum")?;
        acc = match op.as_rule() {
          Rule::Plus => acc + rhs,
          _ => acc - rhs,
        };
      }
      Ok(acc)
    }
    Rule::Term => {
      let mut inner = pair.into_inner();
      let mut acc = next_operand(inner.next(), "product")?;
      while let Some(next) = inner.next() {
        acc = match next.as_rule() {
          Rule::Times => acc * next_operand(inner.next(), "product")?,
          Rule::Divide => acc / next_operand(inner.next(), "quotient")?,
          // implicit multiplication
          _ => acc * pair_to_expr(next)?,
        };
      }
      Ok(acc)
    }
    Rule::Signed => {
      let mut negations = 0;
      let mut operand = None;
      for p in pair.into_inner() {
        if p.as_rule() == Rule::Negate {
          negations += 1;
        } else {
          operand = Some(pair_to_expr(p)?);
        }
      }
      let mut expr = operand.ok_or_else(|| {
        ExprError::EvaluationError("Missing operand after '-'".into())
      })?;
      for _ in 0..negations {
        expr = -expr;
      }
      Ok(expr)
    }
    Rule::Power => {
      let mut inner = pair.into_inner();
      let base = next_operand(inner.next(), "power")?;
      match inner.next() {
        Some(exponent) => Ok(base.pow(pair_to_expr(exponent)?)),
        None => Ok(base),
      }
    }
    Rule::FunctionCall => {
      let mut inner = pair.into_inner();
      let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
      let func = Function::from_name(&name.to_lowercase())
        .ok_or(ExprError::UnknownFunction(name))?;
      let arg = next_operand(inner.next(), "function call")?;
      Ok(Expr::call(func, arg))
    }
    Rule::Identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
    Rule::Number => {
      pair.as_str().parse::<f64>().map(Expr::Number).map_err(|_| {
        ExprError::EvaluationError(format!("Invalid number {}", pair.as_str()))
      })
    }
    other => Err(ExprError::EvaluationError(format!(
      "Cannot convert {other:?} to an expression"
    ))),
  }
}

/// Format a float without a trailing ".0" for whole numbers.
pub fn format_number(n: f64) -> String {
  if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    format!("{n}")
  }
}

fn precedence(expr: &Expr) -> u8 {
  match expr {
    Expr::BinaryOp { op, .. } => match op {
      BinaryOperator::Plus | BinaryOperator::Minus => 1,
      BinaryOperator::Times | BinaryOperator::Divide => 2,
      BinaryOperator::Power => 4,
    },
    Expr::Negate(_) => 3,
    Expr::Number(n) if *n < 0.0 => 3,
    _ => 5,
  }
}

fn wrap(expr: &Expr, parens: bool) -> String {
  if parens {
    format!("({expr})")
  } else {
    expr.to_string()
  }
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Number(n) => write!(f, "{}", format_number(*n)),
      Expr::Identifier(name) => write!(f, "{name}"),
      Expr::Negate(inner) => {
        write!(f, "-{}", wrap(inner, precedence(inner) < 3))
      }
      Expr::FunctionCall { func, arg } => write!(f, "{}({arg})", func.name()),
      Expr::BinaryOp { op, left, right } => {
        let lp = precedence(left);
        let rp = precedence(right);
        match op {
          BinaryOperator::Plus => match right.as_ref() {
            Expr::Number(n) if *n < 0.0 => {
              write!(f, "{} - {}", left, format_number(-n))
            }
            _ => write!(f, "{} + {}", left, right),
          },
          BinaryOperator::Minus => {
            write!(f, "{} - {}", left, wrap(right, rp <= 1))
          }
          BinaryOperator::Times => {
            write!(f, "{}*{}", wrap(left, lp < 2), wrap(right, rp <= 3))
          }
          BinaryOperator::Divide => {
            write!(f, "{}/{}", wrap(left, lp < 2), wrap(right, rp <= 3))
          }
          BinaryOperator::Power => {
            write!(f, "{}^{}", wrap(left, lp <= 4), wrap(right, rp < 5))
          }
        }
      }
    }
  }
}
