//! `eval` and `evalf`: re-canonicalization and numeric evaluation.
//!
//! Constructors canonicalize eagerly, so a freshly built tree is
//! already evaluated at depth 1; `eval` re-runs children through their
//! constructors (after substitutions or archive reads this is a
//! no-op) and `evalf` pushes every exact quantity to a float at the
//! requested precision.

use sym_num::default_digits;

use crate::depth::MAX_RECURSION;
use crate::error::{KernelError, Result};
use crate::func::fcall_serial;
use crate::node::{flags, Kind};
use crate::seq;
use crate::Ex;

impl Ex {
    /// Full re-evaluation (unbounded level).
    pub fn eval(&self) -> Result<Ex> {
        self.eval_level(0)
    }

    /// Evaluation to the given level: level 1 touches only this node
    /// (a no-op when the evaluated flag is already set), level 0 means
    /// no bound. The level decreases on recursion; reaching
    /// `-MAX_RECURSION` raises the recursion-limit failure.
    pub fn eval_level(&self, level: i32) -> Result<Ex> {
        if level == 1 && self.0.has_flag(flags::EVALUATED) {
            return Ok(self.clone());
        }
        if level <= -(MAX_RECURSION as i32) {
            return Err(KernelError::RecursionLimit("eval"));
        }
        let down = level - 1;
        let out = match self.kind() {
            Kind::Num(_) | Kind::Sym(_) | Kind::Const(_) | Kind::Fail => self.clone(),
            Kind::Add(s) => {
                let mut pairs = Vec::with_capacity(s.pairs().len());
                for p in s.pairs() {
                    pairs.push(seq::Pair::new(p.rest().eval_level(down)?, p.coeff().clone()));
                }
                seq::add_from_pairs(pairs, s.overall().clone())
            }
            Kind::Mul(s) => {
                let mut pairs = Vec::with_capacity(s.pairs().len());
                for p in s.pairs() {
                    pairs.push(seq::Pair::new(p.rest().eval_level(down)?, p.coeff().clone()));
                }
                seq::mul_from_pairs(pairs, s.overall().clone())
            }
            Kind::Pow(p) => p
                .base()
                .eval_level(down)?
                .try_pow(&p.exponent().eval_level(down)?)?,
            Kind::NcMul(v) => {
                let ops = eval_all(v, down)?;
                Ex::nc_mul_vec(ops)
            }
            Kind::Func(f) => fcall_serial(f.serial(), eval_all(f.args(), down)?)?,
            Kind::List(v) => Ex::list(eval_all(v, down)?),
            Kind::Tuple(v) => Ex::tuple(eval_all(v, down)?),
            Kind::Matrix(m) => Ex::from_matrix(m.map(|e| e.eval_level(down))?),
            Kind::Rel(r) => Ex::relational(
                r.lhs().eval_level(down)?,
                r.rhs().eval_level(down)?,
                r.op(),
            ),
            Kind::Series(s) => s.map_coeffs(|c| c.eval_level(down))?,
        };
        Ok(out)
    }

    /// Numeric evaluation at the default precision.
    pub fn evalf(&self) -> Result<Ex> {
        self.evalf_prec(default_digits())
    }

    /// Numeric evaluation at an explicit decimal precision.
    pub fn evalf_prec(&self, prec: u32) -> Result<Ex> {
        evalf_impl(self, prec, 0)
    }
}

fn eval_all(v: &[Ex], level: i32) -> Result<Vec<Ex>> {
    v.iter().map(|e| e.eval_level(level)).collect()
}

fn evalf_impl(e: &Ex, prec: u32, depth: usize) -> Result<Ex> {
    let depth = crate::depth::descend(depth, "evalf")?;
    let out = match e.kind() {
        Kind::Num(n) => Ex::num(n.to_float(Some(prec))),
        Kind::Const(c) => Ex::num(c.evalf(prec)),
        Kind::Sym(_) | Kind::Fail => e.clone(),
        Kind::Add(_) => Ex::add_vec(evalf_all(&e.children(), prec, depth)?),
        Kind::Mul(_) => Ex::mul_vec(evalf_all(&e.children(), prec, depth)?),
        Kind::Pow(p) => evalf_impl(p.base(), prec, depth)?
            .try_pow(&evalf_impl(p.exponent(), prec, depth)?)?,
        Kind::NcMul(v) => Ex::nc_mul_vec(evalf_all(v, prec, depth)?),
        Kind::Func(f) => fcall_serial(f.serial(), evalf_all(f.args(), prec, depth)?)?,
        Kind::List(v) => Ex::list(evalf_all(v, prec, depth)?),
        Kind::Tuple(v) => Ex::tuple(evalf_all(v, prec, depth)?),
        Kind::Matrix(m) => Ex::from_matrix(m.map(|x| evalf_impl(x, prec, depth))?),
        Kind::Rel(r) => Ex::relational(
            evalf_impl(r.lhs(), prec, depth)?,
            evalf_impl(r.rhs(), prec, depth)?,
            r.op(),
        ),
        Kind::Series(s) => s.map_coeffs(|c| evalf_impl(c, prec, depth))?,
    };
    Ok(out)
}

fn evalf_all(v: &[Ex], prec: u32, depth: usize) -> Result<Vec<Ex>> {
    v.iter().map(|e| evalf_impl(e, prec, depth)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_level_one_is_a_noop() {
        let x = Ex::symbol("x");
        let e = &x + Ex::from(1);
        let same = e.eval_level(1).unwrap();
        assert!(e.ptr_eq(&same));
    }

    #[test]
    fn eval_is_idempotent() {
        let x = Ex::symbol("x");
        let e = (&x + Ex::from(1)).pow(2) * &x;
        assert_eq!(e.eval().unwrap(), e);
    }

    #[test]
    fn evalf_floats_the_tree() {
        let x = Ex::symbol("x");
        let e = &x * Ex::num(sym_num::Number::half()) + Ex::from(1);
        let f = e.evalf().unwrap();
        // 0.5*x + 1.0
        let s = f.to_string();
        assert!(s.contains("0.5"), "got {s}");
    }

    #[test]
    fn evalf_evaluates_constants_and_functions() {
        let e = Ex::func("cos", vec![Ex::pi()]).unwrap();
        let f = e.evalf().unwrap();
        let v = f.as_number().unwrap().to_f64().unwrap();
        assert!((v + 1.0).abs() < 1e-12);
    }
}
