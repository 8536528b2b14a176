//! Symbolic differentiation.
//!
//! Linear over sums, arity-n product rule over products, the general
//! power rule with a logarithmic correction for symbolic exponents,
//! and the chain rule through registered function derivatives. A
//! function without a registered derivative yields the inert
//! `Derivative(f(args), x)` placeholder so the expression stays
//! well-formed.

use sym_num::Number;

use crate::depth::descend;
use crate::error::{KernelError, Result};
use crate::func::{builtin, with_diff_hook};
use crate::node::Kind;
use crate::seq;
use crate::Ex;

impl Ex {
    /// First derivative with respect to the symbol `s`.
    pub fn diff(&self, s: &Ex) -> Result<Ex> {
        self.diff_nth(s, 1)
    }

    /// `n`-th derivative with respect to the symbol `s`.
    pub fn diff_nth(&self, s: &Ex, n: u32) -> Result<Ex> {
        if s.as_symbol().is_none() {
            return Err(KernelError::InvalidArgument(
                "differentiation variable must be a symbol".into(),
            ));
        }
        let mut cur = self.clone();
        for _ in 0..n {
            cur = diff_impl(&cur, s, 0)?;
        }
        Ok(cur)
    }
}

fn diff_impl(e: &Ex, s: &Ex, depth: usize) -> Result<Ex> {
    let depth = descend(depth, "diff")?;
    match e.kind() {
        Kind::Num(_) | Kind::Const(_) => Ok(Ex::zero()),
        Kind::Sym(_) => Ok(if e == s { Ex::one() } else { Ex::zero() }),
        Kind::Add(seq_) => {
            let mut pairs = Vec::with_capacity(seq_.pairs().len());
            for p in seq_.pairs() {
                pairs.push(seq::Pair::new(diff_impl(p.rest(), s, depth)?, p.coeff().clone()));
            }
            Ok(seq::add_from_pairs(pairs, Number::zero()))
        }
        Kind::Mul(seq_) => {
            // d(c * prod r_i^e_i) = c * sum_i e_i r_i^(e_i - 1) dr_i prod_{j!=i} r_j^e_j
            let pairs = seq_.pairs();
            let mut terms = Vec::new();
            for (i, p) in pairs.iter().enumerate() {
                let dr = diff_impl(p.rest(), s, depth)?;
                if dr.is_zero() {
                    continue;
                }
                let mut factors = Vec::with_capacity(pairs.len() + 2);
                factors.push(Ex::num(seq_.overall().clone()));
                factors.push(Ex::num(p.coeff().clone()));
                factors.push(crate::power::power_of_pair(
                    p.rest(),
                    &p.coeff().sub(&Number::one()),
                ));
                factors.push(dr);
                for (j, q) in pairs.iter().enumerate() {
                    if j != i {
                        factors.push(crate::power::power_of_pair(q.rest(), q.coeff()));
                    }
                }
                terms.push(Ex::mul_vec(factors));
            }
            Ok(Ex::add_vec(terms))
        }
        Kind::Pow(p) => {
            let (b, x) = (p.base(), p.exponent());
            let db = diff_impl(b, s, depth)?;
            let dx = diff_impl(x, s, depth)?;
            let mut terms = Vec::new();
            if !db.is_zero() {
                // x * b^(x-1) * db
                let down = b.try_pow(&(x - Ex::one()))?;
                terms.push(Ex::mul_vec(vec![x.clone(), down, db]));
            }
            if !dx.is_zero() {
                // b^x * log(b) * dx
                terms.push(Ex::mul_vec(vec![
                    e.clone(),
                    builtin("log", vec![b.clone()]),
                    dx,
                ]));
            }
            Ok(Ex::add_vec(terms))
        }
        Kind::Func(f) => {
            let args = f.args();
            let mut terms = Vec::new();
            for (i, arg) in args.iter().enumerate() {
                let da = diff_impl(arg, s, depth)?;
                if da.is_zero() {
                    continue;
                }
                match with_diff_hook(f.serial(), |hook| hook(args, i))? {
                    Some(outer) => terms.push(outer? * da),
                    // No registered derivative: keep the expression
                    // well-formed with an inert placeholder.
                    None => {
                        return Ok(builtin("Derivative", vec![e.clone(), s.clone()]));
                    }
                }
            }
            Ok(Ex::add_vec(terms))
        }
        Kind::NcMul(v) => {
            // Order-preserving product rule.
            let mut terms = Vec::new();
            for i in 0..v.len() {
                let da = diff_impl(&v[i], s, depth)?;
                if da.is_zero() {
                    continue;
                }
                let mut factors = v.clone();
                factors[i] = da;
                terms.push(Ex::nc_mul_vec(factors));
            }
            Ok(Ex::add_vec(terms))
        }
        Kind::Series(sd) => sd.diff(s),
        Kind::List(_) | Kind::Tuple(_) | Kind::Matrix(_) | Kind::Rel(_) | Kind::Fail => {
            Err(KernelError::Domain(
                "cannot differentiate a non-scalar expression".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_rules() {
        let x = Ex::symbol("x");
        // d/dx (x^3 + 2x + 7) = 3x^2 + 2
        let e = x.pow(3) + Ex::from(2) * &x + Ex::from(7);
        assert_eq!(e.diff(&x).unwrap(), Ex::from(3) * x.pow(2) + Ex::from(2));
    }

    #[test]
    fn product_rule() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        // d/dx (x*y) = y
        assert_eq!((&x * &y).diff(&x).unwrap(), y);
        // d/dx (x^2 * y) = 2*x*y
        assert_eq!(
            (x.pow(2) * &y).diff(&x).unwrap(),
            Ex::from(2) * &x * &y
        );
    }

    #[test]
    fn chain_rule_through_functions() {
        let x = Ex::symbol("x");
        let e = Ex::func("sin", vec![x.pow(2)]).unwrap();
        let expected = Ex::from(2) * &x * Ex::func("cos", vec![x.pow(2)]).unwrap();
        assert_eq!(e.diff(&x).unwrap(), expected);
    }

    #[test]
    fn symbolic_exponent_brings_in_log() {
        let x = Ex::symbol("x");
        let a = Ex::symbol("a");
        // d/dx a^x = a^x * log(a)
        let e = a.pow(x.clone());
        let expected = a.pow(x.clone()) * Ex::func("log", vec![a.clone()]).unwrap();
        assert_eq!(e.diff(&x).unwrap(), expected);
    }

    #[test]
    fn unregistered_derivative_stays_inert() {
        let x = Ex::symbol("x");
        let e = Ex::func("abs", vec![x.clone()]).unwrap();
        let d = e.diff(&x).unwrap();
        let Kind::Func(f) = d.kind() else {
            panic!("expected placeholder")
        };
        assert_eq!(f.name(), "Derivative");
    }

    #[test]
    fn nth_derivatives() {
        let x = Ex::symbol("x");
        let e = x.pow(4);
        assert_eq!(e.diff_nth(&x, 2).unwrap(), Ex::from(12) * x.pow(2));
        assert_eq!(e.diff_nth(&x, 5).unwrap(), Ex::zero());
    }

    #[test]
    fn non_scalars_are_rejected() {
        let x = Ex::symbol("x");
        let l = Ex::list(vec![x.clone()]);
        assert!(matches!(l.diff(&x), Err(KernelError::Domain(_))));
    }
}
