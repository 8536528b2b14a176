//! Named transcendental constants.
//!
//! A constant is a name plus a numeric evaluator; the symbolic layer
//! treats it as an opaque leaf and `evalf` asks the evaluator for a
//! float at the requested precision.

use sym_num::{Float, Number};

/// The identity of a built-in constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstantKind {
    Pi,
    EulerGamma,
    Catalan,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constant {
    kind: ConstantKind,
}

impl Constant {
    pub fn new(kind: ConstantKind) -> Self {
        Self { kind }
    }

    #[inline]
    pub fn kind(&self) -> ConstantKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            ConstantKind::Pi => "Pi",
            ConstantKind::EulerGamma => "EulerGamma",
            ConstantKind::Catalan => "Catalan",
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Pi" => ConstantKind::Pi,
            "EulerGamma" => ConstantKind::EulerGamma,
            "Catalan" => ConstantKind::Catalan,
            _ => return None,
        };
        Some(Self::new(kind))
    }

    /// Numeric value at the given decimal precision.
    pub fn evalf(&self, prec: u32) -> Number {
        let value = match self.kind {
            ConstantKind::Pi => std::f64::consts::PI,
            ConstantKind::EulerGamma => 0.577_215_664_901_532_9,
            ConstantKind::Catalan => 0.915_965_594_177_219,
        };
        Number::Float(Float::with_prec(value, prec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in [
            ConstantKind::Pi,
            ConstantKind::EulerGamma,
            ConstantKind::Catalan,
        ] {
            let c = Constant::new(kind);
            assert_eq!(Constant::by_name(c.name()), Some(c));
        }
        assert_eq!(Constant::by_name("nope"), None);
    }

    #[test]
    fn pi_evaluates_near_pi() {
        let v = Constant::new(ConstantKind::Pi).evalf(17);
        assert!((v.to_f64().unwrap() - std::f64::consts::PI).abs() < 1e-15);
    }
}
