//! The expression handle.
//!
//! [`Ex`] is a value-semantic smart handle over a shared, immutable
//! node. Cloning bumps a reference count; all algebraic operators are
//! total functions from handles to handles and every composite they
//! build goes through a canonicalizing constructor, so no operator
//! ever returns an unsimplified tree.

use std::cmp::Ordering;
use std::rc::Rc;

use sym_num::Number;

use crate::constant::{Constant, ConstantKind};
use crate::error::{KernelError, Result};
use crate::node::{flags, Kind, Node};
use crate::ordering::compare;
use crate::relational::{RelOp, Relational};
use crate::seq;
use crate::symbol::Symbol;

/// Reference-counted handle to an expression node.
///
/// `Ex` is `!Send` by design: the kernel is single-threaded and the
/// refcount is non-atomic.
#[derive(Clone)]
pub struct Ex(pub(crate) Rc<Node>);

impl Ex {
    // --- construction ---------------------------------------------------

    pub(crate) fn new_node(kind: Kind, initial_flags: u8) -> Ex {
        Ex(Rc::new(Node::new(kind, initial_flags)))
    }

    /// Wrap a number. Always flagged evaluated.
    pub fn num(n: Number) -> Ex {
        Ex::new_node(Kind::Num(n), flags::EVALUATED | flags::EXPANDED)
    }

    /// A fresh symbol with a new serial.
    pub fn symbol(name: &str) -> Ex {
        Ex::new_node(
            Kind::Sym(Symbol::new(name)),
            flags::EVALUATED | flags::EXPANDED,
        )
    }

    /// Wrap an existing [`Symbol`] value, preserving its serial.
    pub fn from_symbol(s: Symbol) -> Ex {
        Ex::new_node(Kind::Sym(s), flags::EVALUATED | flags::EXPANDED)
    }

    pub fn constant(kind: ConstantKind) -> Ex {
        Ex::new_node(
            Kind::Const(Constant::new(kind)),
            flags::EVALUATED | flags::EXPANDED,
        )
    }

    pub fn pi() -> Ex {
        Ex::constant(ConstantKind::Pi)
    }

    pub fn euler_gamma() -> Ex {
        Ex::constant(ConstantKind::EulerGamma)
    }

    pub fn catalan() -> Ex {
        Ex::constant(ConstantKind::Catalan)
    }

    pub fn zero() -> Ex {
        ZERO.with(Clone::clone)
    }

    pub fn one() -> Ex {
        ONE.with(Clone::clone)
    }

    pub fn minus_one() -> Ex {
        MINUS_ONE.with(Clone::clone)
    }

    /// Sum of arbitrarily many operands.
    pub fn add_vec(ops: Vec<Ex>) -> Ex {
        seq::add_from_ops(ops)
    }

    /// Product of arbitrarily many operands.
    pub fn mul_vec(ops: Vec<Ex>) -> Ex {
        seq::mul_from_ops(ops)
    }

    /// Power with full canonicalization.
    ///
    /// The only failure is raising exact zero to a negative power.
    pub fn try_pow(&self, exp: &Ex) -> Result<Ex> {
        crate::power::power(self, exp)
    }

    /// Power. See [`Ex::try_pow`] for the checked form.
    ///
    /// # Panics
    /// Panics when raising exact zero to a negative power, like the
    /// standard library's integer division does on zero.
    pub fn pow(&self, exp: impl Into<Ex>) -> Ex {
        match self.try_pow(&exp.into()) {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        }
    }

    /// Division. The only failure is an exact zero divisor.
    pub fn try_div(&self, rhs: &Ex) -> Result<Ex> {
        let inv = rhs.try_pow(&Ex::minus_one())?;
        Ok(Ex::mul_vec(vec![self.clone(), inv]))
    }

    /// Non-commutative product.
    pub fn nc_mul_vec(ops: Vec<Ex>) -> Ex {
        crate::ncmul::nc_mul(ops)
    }

    pub fn nc_mul(&self, rhs: &Ex) -> Ex {
        crate::ncmul::nc_mul(vec![self.clone(), rhs.clone()])
    }

    /// Ordered list (structurally mutable through the handle).
    pub fn list(elems: Vec<Ex>) -> Ex {
        Ex::new_node(Kind::List(elems), flags::EVALUATED)
    }

    /// Ordered tuple (immutable).
    pub fn tuple(elems: Vec<Ex>) -> Ex {
        Ex::new_node(Kind::Tuple(elems), flags::EVALUATED)
    }

    /// Relational node; folds neither side beyond their own canonical
    /// forms.
    pub fn relational(lhs: Ex, rhs: Ex, op: RelOp) -> Ex {
        Ex::new_node(Kind::Rel(Relational::new(lhs, rhs, op)), flags::EVALUATED)
    }

    /// Inert failure marker.
    pub fn fail() -> Ex {
        Ex::new_node(Kind::Fail, flags::EVALUATED)
    }

    // --- structural queries ---------------------------------------------

    #[inline]
    pub fn kind(&self) -> &Kind {
        self.0.kind()
    }

    /// Pointer identity: same shared node.
    #[inline]
    pub fn ptr_eq(&self, other: &Ex) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The canonical node address, for identity-keyed tables.
    #[inline]
    pub fn node_ptr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }

    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.0.hash_value()
    }

    /// Total order over all expressions: kind rank first, then a
    /// kind-specific comparison. Drives canonical sorting and equality.
    #[inline]
    pub fn compare(&self, other: &Ex) -> Ordering {
        compare(self, other)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.kind(), Kind::Num(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self.kind(), Kind::Num(n) if n.is_one())
    }

    pub fn is_minus_one(&self) -> bool {
        matches!(self.kind(), Kind::Num(n) if n.is_minus_one())
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self.kind() {
            Kind::Num(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.kind() {
            Kind::Sym(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&crate::matrix::Matrix> {
        match self.kind() {
            Kind::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Number of children.
    pub fn nops(&self) -> usize {
        match self.kind() {
            Kind::Num(_) | Kind::Sym(_) | Kind::Const(_) | Kind::Fail => 0,
            Kind::Add(s) => s.pairs().len() + usize::from(!s.overall().is_zero()),
            Kind::Mul(s) => s.pairs().len() + usize::from(!s.overall().is_one()),
            Kind::NcMul(v) | Kind::List(v) | Kind::Tuple(v) => v.len(),
            Kind::Pow(_) | Kind::Rel(_) => 2,
            Kind::Func(f) => f.args().len(),
            Kind::Matrix(m) => m.rows() * m.cols(),
            Kind::Series(s) => s.terms().len(),
        }
    }

    /// The `i`-th child, rebuilt to a handle. Sum/product children are
    /// the recombined terms, with the overall coefficient last.
    pub fn op(&self, i: usize) -> Result<Ex> {
        self.children().into_iter().nth(i).ok_or(KernelError::Range {
            what: "op",
            index: i,
        })
    }

    /// All children as handles, in `op` order.
    pub fn children(&self) -> Vec<Ex> {
        match self.kind() {
            Kind::Num(_) | Kind::Sym(_) | Kind::Const(_) | Kind::Fail => Vec::new(),
            Kind::Add(s) => {
                let mut v: Vec<Ex> = s.pairs().iter().map(seq::add_pair_to_ex).collect();
                if !s.overall().is_zero() {
                    v.push(Ex::num(s.overall().clone()));
                }
                v
            }
            Kind::Mul(s) => {
                let mut v: Vec<Ex> = s.pairs().iter().map(seq::mul_pair_to_ex).collect();
                if !s.overall().is_one() {
                    v.push(Ex::num(s.overall().clone()));
                }
                v
            }
            Kind::NcMul(v) | Kind::List(v) | Kind::Tuple(v) => v.clone(),
            Kind::Pow(p) => vec![p.base().clone(), p.exponent().clone()],
            Kind::Rel(r) => vec![r.lhs().clone(), r.rhs().clone()],
            Kind::Func(f) => f.args().to_vec(),
            Kind::Matrix(m) => m.elems().to_vec(),
            Kind::Series(s) => s.terms().iter().map(|(c, _)| c.clone()).collect(),
        }
    }

    /// Does `sub` occur anywhere in this tree (by structural equality)?
    pub fn has(&self, sub: &Ex) -> bool {
        if self == sub {
            return true;
        }
        self.children().iter().any(|c| c.has(sub))
    }

    /// Append to a list through the handle; copy-on-write when shared.
    pub fn list_append(&mut self, elem: Ex) -> Result<()> {
        let node = Rc::make_mut(&mut self.0);
        match node.kind_mut() {
            Kind::List(v) => {
                v.push(elem);
                Ok(())
            }
            _ => Err(KernelError::Domain(
                "append requires a list".into(),
            )),
        }
    }

    pub(crate) fn is_expanded(&self) -> bool {
        self.0.has_flag(flags::EXPANDED)
    }

    pub(crate) fn mark_expanded(&self) {
        self.0.set_flag(flags::EXPANDED);
    }
}

thread_local! {
    static ZERO: Ex = Ex::num(Number::zero());
    static ONE: Ex = Ex::num(Number::one());
    static MINUS_ONE: Ex = Ex::num(Number::minus_one());
}

impl std::fmt::Debug for Ex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ex({self})")
    }
}

impl PartialEq for Ex {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Ex {}

impl PartialOrd for Ex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Ex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl std::hash::Hash for Ex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl From<i64> for Ex {
    fn from(v: i64) -> Ex {
        Ex::num(Number::from(v))
    }
}

impl From<i32> for Ex {
    fn from(v: i32) -> Ex {
        Ex::num(Number::from(v))
    }
}

impl From<f64> for Ex {
    fn from(v: f64) -> Ex {
        Ex::num(Number::from(v))
    }
}

impl From<Number> for Ex {
    fn from(v: Number) -> Ex {
        Ex::num(v)
    }
}

impl From<&Ex> for Ex {
    fn from(v: &Ex) -> Ex {
        v.clone()
    }
}

// --- operators ----------------------------------------------------------

macro_rules! binary_op {
    ($trait:ident, $method:ident, |$a:ident, $b:ident| $body:expr) => {
        impl std::ops::$trait<&Ex> for &Ex {
            type Output = Ex;
            fn $method(self, rhs: &Ex) -> Ex {
                let ($a, $b) = (self, rhs);
                $body
            }
        }

        impl std::ops::$trait<Ex> for Ex {
            type Output = Ex;
            fn $method(self, rhs: Ex) -> Ex {
                std::ops::$trait::$method(&self, &rhs)
            }
        }

        impl std::ops::$trait<&Ex> for Ex {
            type Output = Ex;
            fn $method(self, rhs: &Ex) -> Ex {
                std::ops::$trait::$method(&self, rhs)
            }
        }

        impl std::ops::$trait<Ex> for &Ex {
            type Output = Ex;
            fn $method(self, rhs: Ex) -> Ex {
                std::ops::$trait::$method(self, &rhs)
            }
        }

        impl std::ops::$trait<i64> for &Ex {
            type Output = Ex;
            fn $method(self, rhs: i64) -> Ex {
                std::ops::$trait::$method(self, &Ex::from(rhs))
            }
        }

        impl std::ops::$trait<i64> for Ex {
            type Output = Ex;
            fn $method(self, rhs: i64) -> Ex {
                std::ops::$trait::$method(&self, &Ex::from(rhs))
            }
        }
    };
}

binary_op!(Add, add, |a, b| Ex::add_vec(vec![a.clone(), b.clone()]));
binary_op!(Mul, mul, |a, b| Ex::mul_vec(vec![a.clone(), b.clone()]));
binary_op!(Sub, sub, |a, b| Ex::add_vec(vec![
    a.clone(),
    Ex::mul_vec(vec![Ex::minus_one(), b.clone()])
]));

// Division panics on an exact zero divisor, the way machine integer
// division does. `try_div` is the checked form.
binary_op!(Div, div, |a, b| match a.try_div(b) {
    Ok(e) => e,
    Err(err) => panic!("{err}"),
});

impl std::ops::Neg for &Ex {
    type Output = Ex;
    fn neg(self) -> Ex {
        Ex::mul_vec(vec![Ex::minus_one(), self.clone()])
    }
}

impl std::ops::Neg for Ex {
    type Output = Ex;
    fn neg(self) -> Ex {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_share_storage() {
        let a = Ex::zero();
        let b = Ex::zero();
        assert!(a.ptr_eq(&b));
        assert!(Ex::one().is_one());
        assert!(Ex::minus_one().is_minus_one());
    }

    #[test]
    fn op_and_nops() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = Ex::from(2) * &x + &y + Ex::from(7);
        assert_eq!(e.nops(), 3);
        // overall coefficient is the last child
        assert_eq!(e.op(2).unwrap(), Ex::from(7));
        assert!(matches!(e.op(3), Err(KernelError::Range { .. })));
        assert_eq!(x.nops(), 0);
    }

    #[test]
    fn has_finds_subtrees() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = (x.pow(2) + &y) * Ex::func("sin", vec![x.clone()]).unwrap();
        assert!(e.has(&x));
        assert!(e.has(&x.pow(2)));
        assert!(e.has(&Ex::func("sin", vec![x.clone()]).unwrap()));
        assert!(!e.has(&Ex::symbol("x")));
    }

    #[test]
    fn list_append_copies_on_write() {
        let x = Ex::symbol("x");
        let mut a = Ex::list(vec![x.clone()]);
        let shared = a.clone();
        a.list_append(Ex::from(2)).unwrap();
        assert_eq!(a.nops(), 2);
        // the shared handle still sees the original list
        assert_eq!(shared.nops(), 1);
        assert!(a.list_append(Ex::from(3)).is_ok());
        assert!(Ex::from(1).clone().list_append(Ex::from(2)).is_err());
    }

    #[test]
    fn division_builds_inverse_powers() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = &x / &y;
        assert_eq!(e, &x * y.pow(-1));
        assert!(x.try_div(&Ex::zero()).is_err());
    }
}
