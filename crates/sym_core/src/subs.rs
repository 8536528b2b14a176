//! Simultaneous structural substitution.
//!
//! Matching is purely structural: the whole node is compared against
//! every pattern first, then the walk descends and rebuilds changed
//! composites through their canonicalizing constructors, so the
//! result is canonical again.

use crate::depth::descend;
use crate::error::{KernelError, Result};
use crate::func::fcall_serial;
use crate::node::Kind;
use crate::seq;
use crate::Ex;

impl Ex {
    /// Replace every occurrence of `from` by `to`.
    pub fn subs(&self, from: &Ex, to: &Ex) -> Result<Ex> {
        self.subs_list(std::slice::from_ref(from), std::slice::from_ref(to))
    }

    /// Simultaneous substitution: all patterns are matched against the
    /// original expression, never against already-substituted parts.
    pub fn subs_list(&self, froms: &[Ex], tos: &[Ex]) -> Result<Ex> {
        if froms.len() != tos.len() {
            return Err(KernelError::InvalidArgument(format!(
                "substitution lists of mismatched lengths: {} vs {}",
                froms.len(),
                tos.len()
            )));
        }
        subs_impl(self, froms, tos, 0)
    }
}

fn subs_impl(e: &Ex, froms: &[Ex], tos: &[Ex], depth: usize) -> Result<Ex> {
    for (f, t) in froms.iter().zip(tos) {
        if e == f {
            return Ok(t.clone());
        }
    }
    let depth = descend(depth, "subs")?;
    let out = match e.kind() {
        Kind::Num(_) | Kind::Sym(_) | Kind::Const(_) | Kind::Fail => e.clone(),
        Kind::Add(s) => {
            let mut pairs = Vec::with_capacity(s.pairs().len());
            let mut changed = false;
            for p in s.pairs() {
                let rest = subs_impl(p.rest(), froms, tos, depth)?;
                changed |= !rest.ptr_eq(p.rest());
                pairs.push(seq::Pair::new(rest, p.coeff().clone()));
            }
            if !changed {
                return Ok(e.clone());
            }
            seq::add_from_pairs(pairs, s.overall().clone())
        }
        Kind::Mul(s) => {
            let mut pairs = Vec::with_capacity(s.pairs().len());
            let mut changed = false;
            for p in s.pairs() {
                let rest = subs_impl(p.rest(), froms, tos, depth)?;
                changed |= !rest.ptr_eq(p.rest());
                pairs.push(seq::Pair::new(rest, p.coeff().clone()));
            }
            if !changed {
                return Ok(e.clone());
            }
            seq::mul_from_pairs(pairs, s.overall().clone())
        }
        Kind::Pow(p) => {
            let base = subs_impl(p.base(), froms, tos, depth)?;
            let exp = subs_impl(p.exponent(), froms, tos, depth)?;
            if base.ptr_eq(p.base()) && exp.ptr_eq(p.exponent()) {
                return Ok(e.clone());
            }
            base.try_pow(&exp)?
        }
        Kind::NcMul(v) => Ex::nc_mul_vec(subs_all(v, froms, tos, depth)?),
        Kind::Func(f) => fcall_serial(f.serial(), subs_all(f.args(), froms, tos, depth)?)?,
        Kind::List(v) => Ex::list(subs_all(v, froms, tos, depth)?),
        Kind::Tuple(v) => Ex::tuple(subs_all(v, froms, tos, depth)?),
        Kind::Matrix(m) => Ex::from_matrix(m.map(|x| subs_impl(x, froms, tos, depth))?),
        Kind::Rel(r) => Ex::relational(
            subs_impl(r.lhs(), froms, tos, depth)?,
            subs_impl(r.rhs(), froms, tos, depth)?,
            r.op(),
        ),
        Kind::Series(s) => s.map_coeffs(|c| subs_impl(c, froms, tos, depth))?,
    };
    Ok(out)
}

fn subs_all(v: &[Ex], froms: &[Ex], tos: &[Ex], depth: usize) -> Result<Vec<Ex>> {
    v.iter().map(|x| subs_impl(x, froms, tos, depth)).collect()
}
