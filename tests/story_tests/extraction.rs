use super::*;

#[test]
fn single_integer() {
  assert_eq!(extract("keliling 40 m"), vec![40.0]);
}

#[test]
fn numbers_keep_their_order() {
  assert_eq!(extract("30 lalu 10 lalu 20"), vec![30.0, 10.0, 20.0]);
}

#[test]
fn decimals() {
  assert_eq!(extract("harga 12.5 dan 0.75"), vec![12.5, 0.75]);
}

#[test]
fn sign_is_not_part_of_the_numeral() {
  assert_eq!(extract("suhu -5 derajat"), vec![5.0]);
}

#[test]
fn exponents_are_skipped() {
  assert_eq!(extract("a=50x - 2x^2"), vec![50.0, 2.0]);
  assert_eq!(extract("x**3 + 4"), vec![4.0]);
  assert_eq!(extract("x ^ 2 + 7x"), vec![7.0]);
}

#[test]
fn no_digits() {
  assert!(extract("tidak ada angka di sini").is_empty());
}

#[test]
fn garden_problem() {
  assert_eq!(extract(GARDEN), vec![40.0]);
}
