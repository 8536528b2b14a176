//! Non-commutative products.
//!
//! The algebra has both kinds of product; this one keeps factor order.
//! Commutative factors (everything except matrices and other
//! non-commutative products) are pulled out into an enclosing
//! commutative product, so `2 * A * B` becomes `2 * ncmul(A, B)`.

use crate::node::{flags, Kind};
use crate::Ex;

fn is_commutative(e: &Ex) -> bool {
    !matches!(e.kind(), Kind::Matrix(_) | Kind::NcMul(_))
}

/// Canonicalizing non-commutative product constructor.
pub(crate) fn nc_mul(ops: Vec<Ex>) -> Ex {
    let mut commutative: Vec<Ex> = Vec::new();
    let mut ordered: Vec<Ex> = Vec::new();
    let mut work = ops;
    work.reverse();
    while let Some(op) = work.pop() {
        match op.kind() {
            // Flatten nested non-commutative products in place.
            Kind::NcMul(inner) => {
                for f in inner.iter().rev() {
                    work.push(f.clone());
                }
            }
            _ if is_commutative(&op) => {
                if op.is_zero() {
                    return Ex::zero();
                }
                commutative.push(op);
            }
            _ => ordered.push(op),
        }
    }

    let core = match ordered.len() {
        0 => Ex::one(),
        1 => ordered.remove(0),
        _ => Ex::new_node(Kind::NcMul(ordered), flags::EVALUATED),
    };
    if commutative.is_empty() {
        core
    } else {
        commutative.push(core);
        Ex::mul_vec(commutative)
    }
}
