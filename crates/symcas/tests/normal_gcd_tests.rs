//! Rational normalization, GCD and square-free end-to-end checks.

use symcas::prelude::*;
use symcas::{content, primpart, quo, rem};

#[test]
fn sqrfree_recovers_the_factored_form() {
    let x = Ex::symbol("x");
    // (1+x) * (2+x)^2 * (3+x)^3 * (4+x)^4
    let e = (Ex::from(1) + &x)
        * (Ex::from(2) + &x).pow(2)
        * (Ex::from(3) + &x).pow(3)
        * (Ex::from(4) + &x).pow(4);
    let expanded = e.expand().unwrap();
    assert_eq!(expanded.degree(&x).unwrap(), 10);
    let s = sqrfree(&expanded, &x).unwrap();
    assert_eq!(s, e);
}

#[test]
fn gcd_divides_and_cofactors_are_coprime() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let g0 = (&x + &y).pow(2) * (&x - Ex::from(1));
    let a = (&g0 * (&y + Ex::from(2))).expand().unwrap();
    let b = (&g0 * (&x + Ex::from(3))).expand().unwrap();
    let g = gcd(&a, &b).unwrap();

    let qa = divide(&a, &g).unwrap().expect("gcd divides a");
    let qb = divide(&b, &g).unwrap().expect("gcd divides b");
    assert!(gcd(&qa, &qb).unwrap().is_one());
    // and the gcd is the common factor up to sign/content
    assert!(divide(&g, &g0.expand().unwrap()).unwrap().is_some());
}

#[test]
fn normal_is_idempotent_on_mixed_expressions() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let sin_x = Ex::func("sin", vec![x.clone()]).unwrap();
    let cases = vec![
        (x.pow(2) - Ex::from(1)) / (&x + Ex::from(1)),
        x.pow(-1) + y.pow(-1) + (&x * &y).pow(-1),
        &sin_x / (&sin_x * &x + &sin_x * &y),
        (&x / &y + &y / &x) / (&x + &y),
    ];
    for e in cases {
        let once = normal(&e).unwrap();
        let twice = normal(&once).unwrap();
        assert_eq!(once, twice, "normal not idempotent on {e}");
    }
}

#[test]
fn normal_cancels_hidden_common_factors() {
    let x = Ex::symbol("x");
    // (x^2 + 2x + 1)/(x^2 - 1) -> (x + 1)/(x - 1)
    let e = (x.pow(2) + Ex::from(2) * &x + Ex::from(1)) / (x.pow(2) - Ex::from(1));
    let n = normal(&e).unwrap();
    assert_eq!(n, (&x + Ex::from(1)) * (&x - Ex::from(1)).pow(-1));
}

#[test]
fn normal_handles_opaque_functions() {
    let x = Ex::symbol("x");
    let s = Ex::func("sin", vec![x.clone()]).unwrap();
    // sin(x)/(sin(x)*x) -> 1/x
    let e = &s / (&s * &x);
    assert_eq!(normal(&e).unwrap(), x.pow(-1));
}

#[test]
fn quotient_remainder_identity() {
    let x = Ex::symbol("x");
    let a = x.pow(4) + Ex::from(3) * x.pow(2) + &x + Ex::from(7);
    let b = x.pow(2) + Ex::from(2) * &x + Ex::from(1);
    let q = quo(&a, &b, &x).unwrap();
    let r = rem(&a, &b, &x).unwrap();
    let back = (&b * &q + &r).expand().unwrap();
    assert_eq!(back, a.expand().unwrap());
    assert!(r.degree(&x).unwrap() < b.degree(&x).unwrap());
}

#[test]
fn content_primpart_factorization() {
    let x = Ex::symbol("x");
    let e = Ex::from(6) * x.pow(2) + Ex::from(9) * &x;
    let c = content(&e, &x).unwrap();
    let p = primpart(&e, &x).unwrap();
    assert_eq!(c, Ex::from(3));
    assert_eq!(p, (Ex::from(2) * x.pow(2) + Ex::from(3) * &x).expand().unwrap());
    assert_eq!((c * p).expand().unwrap(), e.expand().unwrap());
}
