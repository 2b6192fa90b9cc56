// Symbolic and numeric building blocks, organized by category
pub mod calculus;
pub mod plot;
pub mod polynomial;

pub use calculus::*;
pub use polynomial::{
  find_roots, solve_zero, Polynomial, RationalFunction, Root,
};
