//! Powers and their canonicalizing constructor.

use sym_num::NumericError;

use crate::error::Result;
use crate::node::{flags, Kind};
use crate::Ex;

/// A `base ^ exponent` node. Both children are already canonical.
#[derive(Clone, Debug)]
pub struct Power {
    base: Ex,
    exp: Ex,
}

impl Power {
    #[inline]
    pub fn base(&self) -> &Ex {
        &self.base
    }

    #[inline]
    pub fn exponent(&self) -> &Ex {
        &self.exp
    }
}

/// Canonicalizing power constructor.
///
/// Local rules applied at construction time:
/// - `x^0 -> 1` (including `0^0 -> 1`), `x^1 -> x`
/// - `num^num` evaluated exactly where an exact value exists
///   (`4^(1/2) -> 2`), left symbolic otherwise (`2^(1/2)`)
/// - `0^negative` raises the arithmetic error
/// - `(b^k)^e -> b^(k*e)` for integer `e` and numeric `k`
/// - `(a*b)^e` distributes over the factors for integer `e`
pub(crate) fn power(base: &Ex, exp: &Ex) -> Result<Ex> {
    if let Kind::Num(e) = exp.kind() {
        if e.is_zero() {
            return Ok(Ex::one());
        }
        if e.is_one() {
            return Ok(base.clone());
        }
        if let Kind::Num(b) = base.kind() {
            if b.is_zero() && e.is_negative() {
                return Err(NumericError::DivisionByZero.into());
            }
            if let Some(v) = b.pow(e)? {
                return Ok(Ex::num(v));
            }
        }
        if e.is_integer() {
            if let Kind::Pow(p) = base.kind() {
                if let Kind::Num(k) = p.exponent().kind() {
                    return power(p.base(), &Ex::num(k.mul(e)));
                }
            }
            if matches!(base.kind(), Kind::Mul(_)) {
                let mut ops = Vec::new();
                for f in base.children() {
                    ops.push(power(&f, exp)?);
                }
                return Ok(Ex::mul_vec(ops));
            }
        }
    }
    Ok(Ex::new_node(
        Kind::Pow(Power {
            base: base.clone(),
            exp: exp.clone(),
        }),
        flags::EVALUATED,
    ))
}

/// Recombination of a canonical product pair `(base, coeff)`.
///
/// Canonical pairs never carry a zero base with a negative exponent,
/// so this cannot hit the arithmetic error; if an invariant is ever
/// violated upstream we still return a well-formed (raw) power node
/// rather than tearing down the caller.
pub(crate) fn power_of_pair(base: &Ex, coeff: &sym_num::Number) -> Ex {
    match power(base, &Ex::num(coeff.clone())) {
        Ok(e) => e,
        Err(_) => Ex::new_node(
            Kind::Pow(Power {
                base: base.clone(),
                exp: Ex::num(coeff.clone()),
            }),
            flags::EVALUATED,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use sym_num::Number;

    #[test]
    fn trivial_exponents() {
        let x = Ex::symbol("x");
        assert!(x.pow(0).is_one());
        assert_eq!(x.pow(1), x);
        assert!(Ex::from(0).pow(0).is_one());
    }

    #[test]
    fn numeric_powers_evaluate() {
        assert_eq!(Ex::from(2).pow(10), Ex::from(1024));
        assert_eq!(Ex::from(4).pow(Ex::num(Number::half())), Ex::from(2));
        // No exact value: stays a power node.
        let r = Ex::from(2).pow(Ex::num(Number::half()));
        assert!(matches!(r.kind(), Kind::Pow(_)));
    }

    #[test]
    fn zero_to_negative_is_an_error() {
        let err = Ex::from(0).try_pow(&Ex::from(-1)).unwrap_err();
        assert!(matches!(err, KernelError::Arithmetic(_)));
    }

    #[test]
    fn nested_integer_powers_combine() {
        let x = Ex::symbol("x");
        assert_eq!(x.pow(2).pow(3), x.pow(6));
        // (x^2)^(1/2) must NOT collapse to x.
        let h = x.pow(2).pow(Ex::num(Number::half()));
        assert_ne!(h, x);
    }

    #[test]
    fn products_distribute_under_integer_exponents() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = (Ex::from(2) * &x * &y).pow(3);
        assert_eq!(e, Ex::from(8) * x.pow(3) * y.pow(3));
    }
}
