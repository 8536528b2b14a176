//! Canonicalizing pair sequences: the shared engine behind sums and
//! products.
//!
//! A sum stores pairs `(rest, coeff)` meaning `coeff * rest` plus an
//! additive overall coefficient; a product stores pairs meaning
//! `rest ^ coeff` plus a multiplicative one. Handling a flat list of
//! coefficiented terms is much faster than a list of nested products
//! or powers, and makes structural equality independent of
//! bracketing.
//!
//! Canonicalization runs once, at construction: split each operand
//! into a pair, flatten same-kind nestings, sort by the total order on
//! the `rest` components, merge pairs with equal `rest`, drop
//! annihilated pairs, absorb numeric terms into the overall
//! coefficient, and collapse singletons back to plain terms.

use std::cmp::Ordering;

use sym_num::Number;

use crate::node::{flags, Kind};
use crate::power;
use crate::Ex;

/// One `(rest, coeff)` pair of a sum or product.
#[derive(Clone, Debug)]
pub struct Pair {
    rest: Ex,
    coeff: Number,
}

impl Pair {
    pub(crate) fn new(rest: Ex, coeff: Number) -> Self {
        Self { rest, coeff }
    }

    #[inline]
    pub fn rest(&self) -> &Ex {
        &self.rest
    }

    #[inline]
    pub fn coeff(&self) -> &Number {
        &self.coeff
    }
}

/// The canonical pair sequence of a sum or product node.
#[derive(Clone, Debug)]
pub struct PairSeq {
    pairs: Vec<Pair>,
    overall: Number,
}

impl PairSeq {
    #[inline]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Additive identity for sums, multiplicative for products, unless
    /// numeric terms were folded in.
    #[inline]
    pub fn overall(&self) -> &Number {
        &self.overall
    }
}

/// Recombine a sum pair to the term it stands for: `coeff * rest`.
pub(crate) fn add_pair_to_ex(p: &Pair) -> Ex {
    if p.coeff.is_one() {
        p.rest.clone()
    } else {
        mul_from_ops(vec![Ex::num(p.coeff.clone()), p.rest.clone()])
    }
}

/// Recombine a product pair to the factor it stands for: `rest ^ coeff`.
pub(crate) fn mul_pair_to_ex(p: &Pair) -> Ex {
    if p.coeff.is_one() {
        p.rest.clone()
    } else {
        // Canonical product pairs never re-trigger the fallible power
        // cases (a zero base folds into the overall coefficient first).
        power::power_of_pair(&p.rest, &p.coeff)
    }
}

/// Canonical sum of operands.
pub(crate) fn add_from_ops(ops: Vec<Ex>) -> Ex {
    let pairs = ops.into_iter().map(|e| Pair::new(e, Number::one())).collect();
    add_from_pairs(pairs, Number::zero())
}

/// Canonical sum from pre-split pairs and an overall coefficient.
pub(crate) fn add_from_pairs(pairs: Vec<Pair>, overall: Number) -> Ex {
    let mut out: Vec<Pair> = Vec::with_capacity(pairs.len());
    let mut overall = overall;
    let mut work = pairs;
    work.reverse();
    while let Some(Pair { rest, coeff }) = work.pop() {
        match rest.kind() {
            // Numeric term: coeff * n joins the overall coefficient.
            Kind::Num(n) => {
                overall = overall.add(&n.mul(&coeff));
            }
            // Nested sum: splice, distributing the outer coefficient.
            Kind::Add(inner) => {
                overall = overall.add(&inner.overall().mul(&coeff));
                for p in inner.pairs() {
                    work.push(Pair::new(p.rest.clone(), p.coeff.mul(&coeff)));
                }
            }
            // Product: pull its numeric coefficient up into the pair,
            // so `2*x` and `x` combine as (x,2) and (x,1).
            Kind::Mul(inner) => {
                if inner.overall().is_one() {
                    out.push(Pair::new(rest.clone(), coeff));
                } else {
                    let c = inner.overall().mul(&coeff);
                    let stripped =
                        mul_from_pairs(inner.pairs().to_vec(), Number::one());
                    // A stripped product can collapse to any kind;
                    // requeue it for re-splitting.
                    work.push(Pair::new(stripped, c));
                }
            }
            _ => out.push(Pair::new(rest, coeff)),
        }
    }

    sort_pairs(&mut out);
    combine_like(&mut out, |a, b| a.add(b));
    out.retain(|p| !p.coeff.is_zero());

    finish(out, overall, SeqPersona::Add)
}

/// Canonical product of operands.
pub(crate) fn mul_from_ops(ops: Vec<Ex>) -> Ex {
    let pairs = ops.into_iter().map(|e| Pair::new(e, Number::one())).collect();
    mul_from_pairs(pairs, Number::one())
}

/// Canonical product from pre-split pairs and an overall coefficient.
///
/// Combining like pairs can itself produce pairs that want another
/// round of splitting (two square roots of a product merging to the
/// product, an exponent sum turning integral), so the pipeline runs
/// to a fixed point.
pub(crate) fn mul_from_pairs(pairs: Vec<Pair>, overall: Number) -> Ex {
    let mut work = pairs;
    let mut overall = overall;
    loop {
        let (out, rest_overall) = mul_pipeline(work, overall);
        overall = rest_overall;
        if overall.is_zero() {
            return Ex::zero();
        }
        let needs_another_round = out.iter().any(|p| match p.rest.kind() {
            Kind::Num(_) => false,
            Kind::Mul(_) => p.coeff.is_integer(),
            Kind::Pow(pw) => {
                p.coeff.is_integer() && matches!(pw.exponent().kind(), Kind::Num(_))
            }
            _ => false,
        });
        if !needs_another_round {
            return finish(out, overall, SeqPersona::Mul);
        }
        work = out;
    }
}

fn mul_pipeline(pairs: Vec<Pair>, overall: Number) -> (Vec<Pair>, Number) {
    let mut out: Vec<Pair> = Vec::with_capacity(pairs.len());
    let mut overall = overall;
    let mut work = pairs;
    work.reverse();
    while let Some(Pair { rest, coeff }) = work.pop() {
        match rest.kind() {
            // Numeric factor: exact powers fold into the overall
            // coefficient; inexact ones (2^(1/2)) stay as pairs.
            Kind::Num(n) => match n.pow(&coeff) {
                Ok(Some(v)) => overall = overall.mul(&v),
                _ => out.push(Pair::new(rest.clone(), coeff)),
            },
            // Nested product: splice. Exponents multiply through only
            // for integer outer exponents; the power constructor never
            // produces the non-integer case here.
            Kind::Mul(inner) if coeff.is_integer() => {
                match inner.overall().pow(&coeff) {
                    Ok(Some(v)) => overall = overall.mul(&v),
                    _ => {
                        out.push(Pair::new(Ex::num(inner.overall().clone()), coeff.clone()))
                    }
                }
                for p in inner.pairs() {
                    work.push(Pair::new(p.rest.clone(), p.coeff.mul(&coeff)));
                }
            }
            // Power with numeric exponent: split to (base, exponent).
            // Only sound when the outer exponent is an integer
            // ((b^k)^c = b^(k*c) needs integer c); operand splits have
            // coefficient 1 and always qualify.
            Kind::Pow(p) if coeff.is_integer() => {
                if let Kind::Num(e) = p.exponent().kind() {
                    work.push(Pair::new(p.base().clone(), e.mul(&coeff)));
                } else {
                    out.push(Pair::new(rest.clone(), coeff));
                }
            }
            _ => out.push(Pair::new(rest, coeff)),
        }
    }

    sort_pairs(&mut out);
    combine_like(&mut out, |a, b| a.add(b));

    // Post-combine: exponents that became zero drop out, numeric bases
    // whose exponent became exact fold into the overall coefficient.
    let mut folded = Number::one();
    out.retain(|p| {
        if p.coeff.is_zero() {
            return false;
        }
        if let Kind::Num(n) = p.rest.kind() {
            if let Ok(Some(v)) = n.pow(&p.coeff) {
                folded = folded.mul(&v);
                return false;
            }
        }
        true
    });
    overall = overall.mul(&folded);

    (out, overall)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SeqPersona {
    Add,
    Mul,
}

fn sort_pairs(pairs: &mut [Pair]) {
    pairs.sort_by(|a, b| a.rest.compare(&b.rest));
}

/// Merge runs of pairs with equal `rest` by combining coefficients.
fn combine_like(pairs: &mut Vec<Pair>, combine: impl Fn(&Number, &Number) -> Number) {
    let mut i = 0;
    while i + 1 < pairs.len() {
        if pairs[i].rest.compare(&pairs[i + 1].rest) == Ordering::Equal {
            pairs[i].coeff = combine(&pairs[i].coeff, &pairs[i + 1].coeff);
            pairs.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

fn finish(pairs: Vec<Pair>, overall: Number, persona: SeqPersona) -> Ex {
    let identity = match persona {
        SeqPersona::Add => overall.is_zero(),
        SeqPersona::Mul => overall.is_one(),
    };
    match (pairs.len(), identity) {
        (0, _) => Ex::num(overall),
        (1, true) => {
            let p = &pairs[0];
            match persona {
                SeqPersona::Add => add_pair_to_ex(p),
                SeqPersona::Mul => mul_pair_to_ex(p),
            }
        }
        _ => {
            let seq = PairSeq { pairs, overall };
            let kind = match persona {
                SeqPersona::Add => Kind::Add(seq),
                SeqPersona::Mul => Kind::Mul(seq),
            };
            Ex::new_node(kind, flags::EVALUATED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_flattens_and_commutes() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let z = Ex::symbol("z");
        let a = (&x + &y) + &z;
        let b = &x + (&z + &y);
        assert_eq!(a, b);
        assert_eq!(a.nops(), 3);
    }

    #[test]
    fn like_terms_combine() {
        let x = Ex::symbol("x");
        let e = &x + &x + &x;
        assert_eq!(e, Ex::from(3) * &x);
        let zero = &x - &x;
        assert!(zero.is_zero());
    }

    #[test]
    fn identities_collapse() {
        let x = Ex::symbol("x");
        assert_eq!(&x + Ex::zero(), x);
        assert_eq!(&x * Ex::one(), x);
        assert!((&x * Ex::zero()).is_zero());
    }

    #[test]
    fn products_merge_exponents() {
        let x = Ex::symbol("x");
        assert_eq!(&x * &x, x.pow(2));
        assert_eq!(x.pow(2) * x.pow(3), x.pow(5));
        assert!((&x * x.pow(-1)).is_one());
    }

    #[test]
    fn numeric_factors_fold() {
        let x = Ex::symbol("x");
        let e = Ex::from(2) * &x * Ex::from(3);
        assert_eq!(e, Ex::from(6) * &x);
        // 2^(1/2) * 2^(1/2) = 2
        let r = Ex::from(2).pow(Ex::num(sym_num::Number::half()));
        assert_eq!(&r * &r, Ex::from(2));
    }

    #[test]
    fn merged_roots_resplice() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let half = Ex::num(sym_num::Number::half());
        // (x*y)^(1/2) squared must flatten back to x*y
        let r = (&x * &y).pow(half);
        let e = &r * &r;
        assert_eq!(e, &x * &y);
    }

    #[test]
    fn coefficients_attach_to_terms() {
        let x = Ex::symbol("x");
        let e = Ex::from(2) * &x + Ex::from(3) * &x;
        assert_eq!(e, Ex::from(5) * &x);
    }

    #[test]
    fn numeric_only_sum_is_a_number() {
        let e = Ex::from(2) + Ex::from(3);
        assert_eq!(e, Ex::from(5));
        assert!(e.as_number().is_some());
    }
}
