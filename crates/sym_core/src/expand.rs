//! Expansion: distribute products over sums and expand integer powers
//! of sums multinomially.

use num_bigint::BigInt;
use num_traits::One;
use tracing::trace;

use sym_num::Number;

use crate::depth::descend;
use crate::error::Result;
use crate::func::fcall_serial;
use crate::node::Kind;
use crate::seq;
use crate::Ex;

impl Ex {
    /// Fully distributed form. Idempotent; the result carries the
    /// expanded flag so re-expansion is free.
    pub fn expand(&self) -> Result<Ex> {
        expand_impl(self, 0)
    }
}

fn expand_impl(e: &Ex, depth: usize) -> Result<Ex> {
    if e.is_expanded() {
        return Ok(e.clone());
    }
    let depth = descend(depth, "expand")?;
    let out = match e.kind() {
        Kind::Num(_) | Kind::Sym(_) | Kind::Const(_) | Kind::Fail => e.clone(),
        Kind::Add(s) => {
            let mut pairs = Vec::with_capacity(s.pairs().len());
            for p in s.pairs() {
                pairs.push(seq::Pair::new(expand_impl(p.rest(), depth)?, p.coeff().clone()));
            }
            seq::add_from_pairs(pairs, s.overall().clone())
        }
        Kind::Mul(_) => {
            let mut factors = Vec::new();
            for f in e.children() {
                factors.push(expand_impl(&f, depth)?);
            }
            distribute(factors)
        }
        Kind::Pow(p) => {
            let base = expand_impl(p.base(), depth)?;
            let exp = expand_impl(p.exponent(), depth)?;
            let sum_power = match (base.kind(), exp.kind()) {
                (Kind::Add(_), Kind::Num(n)) if n.is_nonneg_int() => n.to_i64(),
                _ => None,
            };
            match sum_power {
                Some(n) => {
                    let summands = base.children();
                    expand_sum_power(&summands, n as u64)
                }
                None => base.try_pow(&exp)?,
            }
        }
        Kind::NcMul(v) => {
            let ops: Result<Vec<Ex>> = v.iter().map(|f| expand_impl(f, depth)).collect();
            Ex::nc_mul_vec(ops?)
        }
        Kind::Func(f) => {
            let args: Result<Vec<Ex>> = f.args().iter().map(|a| expand_impl(a, depth)).collect();
            fcall_serial(f.serial(), args?)?
        }
        Kind::List(v) => {
            let elems: Result<Vec<Ex>> = v.iter().map(|x| expand_impl(x, depth)).collect();
            Ex::list(elems?)
        }
        Kind::Tuple(v) => {
            let elems: Result<Vec<Ex>> = v.iter().map(|x| expand_impl(x, depth)).collect();
            Ex::tuple(elems?)
        }
        Kind::Matrix(m) => Ex::from_matrix(m.map(|x| expand_impl(x, depth))?),
        Kind::Rel(r) => Ex::relational(
            expand_impl(r.lhs(), depth)?,
            expand_impl(r.rhs(), depth)?,
            r.op(),
        ),
        Kind::Series(s) => s.map_coeffs(|c| expand_impl(c, depth))?,
    };
    out.mark_expanded();
    Ok(out)
}

/// Multiply expanded factors, distributing over every sum among them.
fn distribute(factors: Vec<Ex>) -> Ex {
    trace!(factors = factors.len(), "distributing product over sums");
    let mut terms: Vec<Ex> = vec![Ex::one()];
    for f in factors {
        if let Kind::Add(_) = f.kind() {
            let summands = f.children();
            let mut next = Vec::with_capacity(terms.len() * summands.len());
            for t in &terms {
                for s in &summands {
                    next.push(t * s);
                }
            }
            terms = next;
        } else {
            for t in &mut terms {
                *t = &*t * &f;
            }
        }
    }
    Ex::add_vec(terms)
}

/// `(t_0 + ... + t_m)^n` by the multinomial theorem, realized as a
/// binomial recursion over the summand list.
fn expand_sum_power(summands: &[Ex], n: u64) -> Ex {
    if n == 0 {
        return Ex::one();
    }
    if summands.len() == 1 {
        return summands[0].pow(Ex::num(Number::from(BigInt::from(n))));
    }
    let first = &summands[0];
    let rest = &summands[1..];
    let mut terms = Vec::new();
    let mut binom = BigInt::one();
    for k in 0..=n {
        // binom = C(n, k), updated incrementally.
        let tail = expand_sum_power(rest, n - k);
        let prefix = if k == 0 {
            Ex::num(Number::from(binom.clone()))
        } else {
            Ex::mul_vec(vec![
                Ex::num(Number::from(binom.clone())),
                first.pow(Ex::num(Number::from(BigInt::from(k)))),
            ])
        };
        if let Kind::Add(_) = tail.kind() {
            for s in tail.children() {
                terms.push(&prefix * &s);
            }
        } else {
            terms.push(&prefix * &tail);
        }
        if k < n {
            binom = binom * BigInt::from(n - k) / BigInt::from(k + 1);
        }
    }
    Ex::add_vec(terms)
}
