use crate::syntax::{substitute_variable, BinaryOperator, Expr, Function};
use crate::ExprError;

/// Check if this expression is a constant (doesn't contain the variable)
fn is_constant_wrt(expr: &Expr, var: &str) -> bool {
  !expr.contains_var(var)
}

/// Differentiate a symbolic expression with respect to a variable.
///
/// The result is not simplified; use [`derivative`] for the simplified form.
pub fn differentiate(expr: &Expr, var: &str) -> Expr {
  match expr {
    Expr::Number(_) => Expr::Number(0.0),
    Expr::Identifier(name) => {
      if name == var {
        Expr::Number(1.0)
      } else {
        Expr::Number(0.0)
      }
    }
    Expr::Negate(inner) => -differentiate(inner, var),
    Expr::BinaryOp { op, left, right } => {
      let a = left.as_ref().clone();
      let b = right.as_ref().clone();
      match op {
        BinaryOperator::Plus => {
          differentiate(left, var) + differentiate(right, var)
        }
        BinaryOperator::Minus => {
          differentiate(left, var) - differentiate(right, var)
        }
        BinaryOperator::Times => {
          // Product rule: (a*b)' = a'*b + a*b'
          differentiate(left, var) * b + a * differentiate(right, var)
        }
        BinaryOperator::Divide => {
          if is_constant_wrt(right, var) {
            differentiate(left, var) / b
          } else {
            // Quotient rule: (a/b)' = (a'*b - a*b') / b^2
            let da = differentiate(left, var);
            let db = differentiate(right, var);
            (da * b.clone() - a * db) / b.pow(Expr::Number(2.0))
          }
        }
        BinaryOperator::Power => differentiate_power(&a, &b, var),
      }
    }
    Expr::FunctionCall { func, arg } => {
      let u = arg.as_ref().clone();
      let du = differentiate(arg, var);
      let outer = match func {
        Function::Sin => Expr::call(Function::Cos, u),
        Function::Cos => -Expr::call(Function::Sin, u),
        Function::Tan => {
          Expr::Number(1.0)
            / Expr::call(Function::Cos, u).pow(Expr::Number(2.0))
        }
        Function::Exp => Expr::call(Function::Exp, u),
        Function::Ln => Expr::Number(1.0) / u,
        Function::Sqrt => {
          Expr::Number(1.0)
            / (Expr::Number(2.0) * Expr::call(Function::Sqrt, u))
        }
        Function::Abs => u.clone() / Expr::call(Function::Abs, u),
      };
      outer * du
    }
  }
}

fn differentiate_power(base: &Expr, exp: &Expr, var: &str) -> Expr {
  if is_constant_wrt(exp, var) {
    // d/dx[f(x)^n] = n * f(x)^(n-1) * f'(x)
    let reduced = exp.clone() - Expr::Number(1.0);
    exp.clone() * base.clone().pow(reduced) * differentiate(base, var)
  } else if is_constant_wrt(base, var) {
    // d/dx[a^g(x)] = a^g(x) * ln(a) * g'(x)
    base.clone().pow(exp.clone())
      * Expr::call(Function::Ln, base.clone())
      * differentiate(exp, var)
  } else {
    // f^g = exp(g*ln f), so (f^g)' = f^g * (g'*ln f + g*f'/f)
    base.clone().pow(exp.clone())
      * (differentiate(exp, var) * Expr::call(Function::Ln, base.clone())
        + exp.clone() * differentiate(base, var) / base.clone())
  }
}

/// Differentiate and simplify.
pub fn derivative(expr: &Expr, var: &str) -> Expr {
  simplify(differentiate(expr, var))
}

/// Simplify a symbolic expression: fold constants and drop neutral elements.
pub fn simplify(expr: Expr) -> Expr {
  match expr {
    Expr::Number(_) | Expr::Identifier(_) => expr,
    Expr::Negate(inner) => match simplify(*inner) {
      Expr::Number(n) => Expr::Number(-n),
      Expr::Negate(x) => *x,
      // -(a - b) = b - a
      Expr::BinaryOp {
        op: BinaryOperator::Minus,
        left,
        right,
      } => Expr::BinaryOp {
        op: BinaryOperator::Minus,
        left: right,
        right: left,
      },
      other => -other,
    },
    Expr::FunctionCall { func, arg } => Expr::call(func, simplify(*arg)),
    Expr::BinaryOp { op, left, right } => {
      simplify_binary(op, simplify(*left), simplify(*right))
    }
  }
}

fn fold_constants(op: BinaryOperator, a: f64, b: f64) -> Option<f64> {
  let value = match op {
    BinaryOperator::Plus => a + b,
    BinaryOperator::Minus => a - b,
    BinaryOperator::Times => a * b,
    BinaryOperator::Divide => a / b,
    BinaryOperator::Power => a.powf(b),
  };
  value.is_finite().then_some(value)
}

fn simplify_binary(op: BinaryOperator, a: Expr, b: Expr) -> Expr {
  if let (Expr::Number(x), Expr::Number(y)) = (&a, &b) {
    if let Some(v) = fold_constants(op, *x, *y) {
      return Expr::Number(v);
    }
  }
  match op {
    BinaryOperator::Plus => {
      if a.is_number(0.0) {
        return b;
      }
      if b.is_number(0.0) {
        return a;
      }
      match b {
        Expr::Negate(inner) => {
          simplify_binary(BinaryOperator::Minus, a, *inner)
        }
        other => a + other,
      }
    }
    BinaryOperator::Minus => {
      if b.is_number(0.0) {
        return a;
      }
      if a.is_number(0.0) {
        return simplify(-b);
      }
      if a == b {
        return Expr::Number(0.0);
      }
      match b {
        Expr::Negate(inner) => simplify_binary(BinaryOperator::Plus, a, *inner),
        other => a - other,
      }
    }
    BinaryOperator::Times => {
      if a.is_number(0.0) || b.is_number(0.0) {
        return Expr::Number(0.0);
      }
      if a.is_number(1.0) {
        return b;
      }
      if b.is_number(1.0) {
        return a;
      }
      if a.is_number(-1.0) {
        return simplify(-b);
      }
      if b.is_number(-1.0) {
        return simplify(-a);
      }
      // Coefficients go first: x*3 -> 3*x
      if let Expr::Number(_) = b {
        if !matches!(a, Expr::Number(_)) {
          return simplify_binary(BinaryOperator::Times, b, a);
        }
      }
      // 2*(3*x) -> 6*x
      if let (
        Expr::Number(x),
        Expr::BinaryOp {
          op: BinaryOperator::Times,
          left,
          right,
        },
      ) = (&a, &b)
      {
        if let Expr::Number(y) = left.as_ref() {
          return simplify_binary(
            BinaryOperator::Times,
            Expr::Number(x * y),
            right.as_ref().clone(),
          );
        }
      }
      a * b
    }
    BinaryOperator::Divide => {
      if a.is_number(0.0) && !b.is_number(0.0) {
        return Expr::Number(0.0);
      }
      if b.is_number(1.0) {
        return a;
      }
      a / b
    }
    BinaryOperator::Power => {
      if b.is_number(0.0) {
        return Expr::Number(1.0);
      }
      if b.is_number(1.0) {
        return a;
      }
      if a.is_number(1.0) {
        return Expr::Number(1.0);
      }
      if let (true, Expr::Number(n)) = (a.is_number(0.0), &b) {
        if *n > 0.0 {
          return Expr::Number(0.0);
        }
      }
      a.pow(b)
    }
  }
}

/// Evaluate an expression numerically with `var` bound to `value`.
///
/// The result may be NaN or infinite (e.g. `ln(-1)`, `1/0`); callers decide
/// whether that is acceptable.
pub fn evaluate_at(
  expr: &Expr,
  var: &str,
  value: f64,
) -> Result<f64, ExprError> {
  match expr {
    Expr::Number(n) => Ok(*n),
    Expr::Identifier(name) if name == var => Ok(value),
    Expr::Identifier(name) => match name.as_str() {
      "pi" => Ok(std::f64::consts::PI),
      "e" => Ok(std::f64::consts::E),
      _ => Err(ExprError::EvaluationError(format!(
        "Free variable {name} has no value"
      ))),
    },
    Expr::Negate(inner) => Ok(-evaluate_at(inner, var, value)?),
    Expr::FunctionCall { func, arg } => {
      Ok(func.apply(evaluate_at(arg, var, value)?))
    }
    Expr::BinaryOp { op, left, right } => {
      let a = evaluate_at(left, var, value)?;
      let b = evaluate_at(right, var, value)?;
      Ok(match op {
        BinaryOperator::Plus => a + b,
        BinaryOperator::Minus => a - b,
        BinaryOperator::Times => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Power => a.powf(b),
      })
    }
  }
}

/// Evaluate an expression that must not depend on any variable.
pub fn evaluate_constant(expr: &Expr) -> Result<f64, ExprError> {
  if let Some(name) = expr.free_variables().into_iter().next() {
    return Err(ExprError::EvaluationError(format!(
      "Expected a constant, found variable {name}"
    )));
  }
  // no variable is bound, so the placeholder name never matches
  evaluate_at(expr, "", 0.0)
}

/// Solve `lhs = rhs` for an unknown that occurs linearly.
///
/// `a*u + b = 0` gives `u = -b/a`, where `a` is the derivative with respect to
/// `u` and `b` the remainder at `u = 0`.
pub fn solve_linear(
  lhs: &Expr,
  rhs: &Expr,
  unknown: &str,
) -> Result<Expr, ExprError> {
  let standard = simplify(lhs.clone() - rhs.clone());
  if !standard.contains_var(unknown) {
    return Err(ExprError::EvaluationError(format!(
      "{lhs} = {rhs} does not contain {unknown}"
    )));
  }
  let coefficient = derivative(&standard, unknown);
  if coefficient.contains_var(unknown) || coefficient.is_number(0.0) {
    return Err(ExprError::EvaluationError(format!(
      "{lhs} = {rhs} is not linear in {unknown}"
    )));
  }
  let rest =
    simplify(substitute_variable(&standard, unknown, &Expr::Number(0.0)));
  Ok(simplify(-rest / coefficient))
}

