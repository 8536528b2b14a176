//! Polynomial layer over the expression kernel.
//!
//! Free functions over [`Ex`]: Euclidean and pseudo division, exact
//! multivariate division, contents and primitive parts, polynomial GCD
//! (heuristic with subresultant fallback), rational-function
//! normalization, and square-free decomposition.

mod division;
mod gcd;
mod normal;
mod sqrfree;

pub use division::{divide, prem, quo, rem};
pub use gcd::{content, gcd, integer_content, lcm, primpart, unit};
pub use normal::{denom, normal, numer};
pub use sqrfree::sqrfree;

use std::collections::BTreeSet;

use thiserror::Error;

use sym_core::{Ex, KernelError, Kind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("polynomial operation on non-polynomial argument: {0}")]
    NotPolynomial(String),

    #[error("division by the zero polynomial")]
    DivisionByZero,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sym_num::NumericError> for PolyError {
    fn from(e: sym_num::NumericError) -> Self {
        PolyError::Kernel(KernelError::Arithmetic(e))
    }
}

pub type Result<T> = std::result::Result<T, PolyError>;

/// All distinct symbols of an expression, in canonical order.
pub fn symbols(e: &Ex) -> Vec<Ex> {
    fn walk(e: &Ex, out: &mut BTreeSet<Ex>) {
        if matches!(e.kind(), Kind::Sym(_)) {
            out.insert(e.clone());
            return;
        }
        for c in e.children() {
            walk(&c, out);
        }
    }
    let mut set = BTreeSet::new();
    walk(e, &mut set);
    set.into_iter().collect()
}

/// First symbol the two expressions share, if any.
pub(crate) fn shared_symbol(a: &Ex, b: &Ex) -> Option<Ex> {
    let sa = symbols(a);
    let sb: BTreeSet<Ex> = symbols(b).into_iter().collect();
    sa.into_iter().find(|s| sb.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_collection_dedups_and_orders() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = &x * &y + x.pow(2) + Ex::func("sin", vec![y.clone()]).unwrap();
        assert_eq!(symbols(&e), vec![x, y]);
    }
}
