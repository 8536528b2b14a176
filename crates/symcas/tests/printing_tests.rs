//! Default text form of expressions.

use symcas::prelude::*;

#[test]
fn arithmetic_forms() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    assert_eq!((&x + &y - Ex::from(3)).to_string(), "x+y-3");
    assert_eq!((Ex::from(2) * &x * &y).to_string(), "2*x*y");
    assert_eq!((-&x * &y).to_string(), "-x*y");
    assert_eq!(x.pow(3).to_string(), "x^3");
    assert_eq!((&x * (&x + &y)).to_string(), "x*(x+y)");
    assert_eq!((&x + &y).pow(2).to_string(), "(x+y)^2");
}

#[test]
fn negative_and_fractional_exponents_get_parens() {
    let x = Ex::symbol("x");
    assert_eq!(x.pow(-1).to_string(), "x^(-1)");
    assert_eq!(x.pow(Ex::num(Number::half())).to_string(), "x^(1/2)");
}

#[test]
fn function_list_tuple_matrix_forms() {
    let x = Ex::symbol("x");
    let s = Ex::func("sin", vec![x.clone()]).unwrap();
    assert_eq!(s.to_string(), "sin(x)");
    assert_eq!(
        Ex::list(vec![x.clone(), s.clone(), Ex::from(1)]).to_string(),
        "[x,sin(x),1]"
    );
    assert_eq!(Ex::tuple(vec![x.clone(), Ex::from(2)]).to_string(), "(x,2)");
    let m = Ex::matrix(2, 2, vec![Ex::one(), x.clone(), Ex::zero(), Ex::from(-2)]).unwrap();
    assert_eq!(m.to_string(), "[[1,x],[0,-2]]");
}

#[test]
fn relational_forms() {
    let x = Ex::symbol("x");
    assert_eq!(x.equals(2).to_string(), "x==2");
    assert_eq!(x.less(2).to_string(), "x<2");
    assert_eq!(x.greater_eq(Ex::zero()).to_string(), "x>=0");
}

#[test]
fn numeric_forms() {
    assert_eq!(Ex::num(Number::from((7, 2))).to_string(), "7/2");
    assert_eq!(Ex::from(2.5).to_string(), "2.5");
    assert_eq!(Ex::num(Number::imaginary_unit()).to_string(), "I");
    assert_eq!(Ex::pi().to_string(), "Pi");
}

#[test]
fn series_form_carries_the_order_term() {
    let x = Ex::symbol("x");
    let s = Ex::func("sin", vec![x.clone()])
        .unwrap()
        .series(&x, &Ex::zero(), 6)
        .unwrap();
    let text = s.to_string();
    assert!(text.starts_with('x'), "got {text}");
    assert!(text.contains("Order(x^6)"), "got {text}");
}

#[test]
fn display_round_trips_structure_deterministically() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let a = (&x + &y) * (&y + &x);
    let b = (&y + &x).pow(2);
    // same canonical node, same text
    assert_eq!(a.to_string(), b.to_string());
}
