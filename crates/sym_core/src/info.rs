//! Boolean attribute queries on expressions.

use crate::node::Kind;
use crate::Ex;

/// Attribute flags for [`Ex::info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Info {
    /// Any number.
    Numeric,
    /// An exact integer.
    Integer,
    /// An exact rational (integers included).
    Rational,
    /// A real-valued number (floats included, complexes excluded).
    Real,
    /// A positive real number.
    Positive,
    /// A negative real number.
    Negative,
    /// A non-negative exact integer.
    NonNegInt,
    /// A positive exact integer.
    PosInt,
    /// A symbol.
    Symbol,
    /// A polynomial over symbols, constants and exact numbers.
    Polynomial,
    /// A relational node.
    Relation,
    /// A list node.
    List,
}

impl Ex {
    /// Query a boolean attribute. Total: never fails, never guesses —
    /// a property that cannot be decided structurally is `false`.
    pub fn info(&self, which: Info) -> bool {
        let num = self.as_number();
        match which {
            Info::Numeric => num.is_some(),
            Info::Integer => num.is_some_and(|n| n.is_integer()),
            Info::Rational => num.is_some_and(|n| n.is_rational()),
            Info::Real => num.is_some_and(|n| n.is_real()),
            Info::Positive => num.is_some_and(|n| n.is_positive()),
            Info::Negative => num.is_some_and(|n| n.is_negative()),
            Info::NonNegInt => num.is_some_and(|n| n.is_nonneg_int()),
            Info::PosInt => num.is_some_and(|n| n.is_pos_int()),
            Info::Symbol => matches!(self.kind(), Kind::Sym(_)),
            Info::Polynomial => is_polynomial(self),
            Info::Relation => matches!(self.kind(), Kind::Rel(_)),
            Info::List => matches!(self.kind(), Kind::List(_)),
        }
    }
}

fn is_polynomial(e: &Ex) -> bool {
    match e.kind() {
        Kind::Num(n) => n.is_exact(),
        Kind::Sym(_) | Kind::Const(_) => true,
        Kind::Add(_) | Kind::Mul(_) => e.children().iter().all(is_polynomial),
        Kind::Pow(p) => {
            is_polynomial(p.base())
                && p.exponent()
                    .as_number()
                    .is_some_and(|n| n.is_nonneg_int())
        }
        _ => false,
    }
}
