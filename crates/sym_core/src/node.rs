//! The shared expression node.
//!
//! A [`Node`] is the envelope every kind of algebraic term lives in:
//! the tagged payload plus the cached hash and status flags. Nodes are
//! immutable once their hash has been observed; handles share them by
//! reference count.

use std::cell::Cell;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use sym_num::Number;

use crate::constant::Constant;
use crate::func::FuncCall;
use crate::matrix::Matrix;
use crate::power::Power;
use crate::relational::Relational;
use crate::seq::PairSeq;
use crate::series::SeriesData;
use crate::symbol::Symbol;
use crate::Ex;

/// Status bits. `EVALUATED` marks the construction-time
/// canonicalization as done; `EXPANDED` marks a fully distributed
/// tree; `HASHED` guards the hash cache.
pub(crate) mod flags {
    pub const EVALUATED: u8 = 1 << 0;
    pub const EXPANDED: u8 = 1 << 1;
    pub const HASHED: u8 = 1 << 2;
}

/// The payload of a node: one variant per algebraic kind.
#[derive(Clone, Debug)]
pub enum Kind {
    /// Exact or inexact number (integer, rational, Gaussian rational,
    /// float).
    Num(Number),
    Sym(Symbol),
    Const(Constant),
    /// Sum: pairs `(rest, coeff)` meaning `coeff * rest`, plus an
    /// additive overall coefficient.
    Add(PairSeq),
    /// Product: pairs `(rest, coeff)` meaning `rest ^ coeff`, plus a
    /// multiplicative overall coefficient.
    Mul(PairSeq),
    /// Non-commutative product; factor order is meaningful.
    NcMul(Vec<Ex>),
    Pow(Power),
    Func(FuncCall),
    List(Vec<Ex>),
    Tuple(Vec<Ex>),
    Matrix(Matrix),
    Rel(Relational),
    Series(SeriesData),
    /// Inert failure marker.
    Fail,
}

impl Kind {
    /// Fixed rank driving the total order across kinds.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Kind::Num(_) => 0,
            Kind::Const(_) => 1,
            Kind::Sym(_) => 2,
            Kind::Pow(_) => 3,
            Kind::Mul(_) => 4,
            Kind::Add(_) => 5,
            Kind::NcMul(_) => 6,
            Kind::Func(_) => 7,
            Kind::Series(_) => 8,
            Kind::Rel(_) => 9,
            Kind::List(_) => 10,
            Kind::Tuple(_) => 11,
            Kind::Matrix(_) => 12,
            Kind::Fail => 13,
        }
    }
}

#[derive(Clone)]
pub struct Node {
    flags: Cell<u8>,
    hash: Cell<u64>,
    kind: Kind,
}

impl Node {
    pub(crate) fn new(kind: Kind, initial_flags: u8) -> Self {
        Self {
            flags: Cell::new(initial_flags),
            hash: Cell::new(0),
            kind,
        }
    }

    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self) -> &mut Kind {
        // Exclusive access: the caller is mutating an unshared node
        // (copy-on-write), so the cached hash is stale.
        self.flags
            .set(self.flags.get() & !(flags::HASHED | flags::EXPANDED));
        &mut self.kind
    }

    #[inline]
    pub(crate) fn has_flag(&self, f: u8) -> bool {
        self.flags.get() & f != 0
    }

    #[inline]
    pub(crate) fn set_flag(&self, f: u8) {
        self.flags.set(self.flags.get() | f);
    }

    /// The structural hash, computed on first use and cached.
    pub fn hash_value(&self) -> u64 {
        if self.has_flag(flags::HASHED) {
            return self.hash.get();
        }
        let h = compute_hash(&self.kind);
        self.hash.set(h);
        self.set_flag(flags::HASHED);
        h
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("kind", &self.kind).finish()
    }
}

/// Structural hash over kind tag and canonical contents.
///
/// Sum/product pairs fold with a commutative accumulator; everything
/// else hashes children in order. The hasher is `FxHasher`, which is
/// deterministic across runs, so serials aside the hash is stable.
fn compute_hash(kind: &Kind) -> u64 {
    let mut h = FxHasher::default();
    h.write_u8(kind.rank());
    match kind {
        Kind::Num(n) => n.hash(&mut h),
        Kind::Sym(s) => h.write_u64(s.serial()),
        Kind::Const(c) => c.hash(&mut h),
        Kind::Add(seq) | Kind::Mul(seq) => {
            seq.overall().hash(&mut h);
            let mut acc: u64 = 0;
            for p in seq.pairs() {
                let mut ph = FxHasher::default();
                ph.write_u64(p.rest().hash_value());
                p.coeff().hash(&mut ph);
                acc = acc.wrapping_add(ph.finish().rotate_left(7));
            }
            h.write_u64(acc);
        }
        Kind::NcMul(v) | Kind::List(v) | Kind::Tuple(v) => {
            for e in v {
                h.write_u64(e.hash_value());
            }
        }
        Kind::Pow(p) => {
            h.write_u64(p.base().hash_value());
            h.write_u64(p.exponent().hash_value());
        }
        Kind::Func(f) => {
            h.write_u64(f.serial() as u64);
            for a in f.args() {
                h.write_u64(a.hash_value());
            }
        }
        Kind::Matrix(m) => {
            h.write_u64(m.rows() as u64);
            h.write_u64(m.cols() as u64);
            for e in m.elems() {
                h.write_u64(e.hash_value());
            }
        }
        Kind::Rel(r) => {
            h.write_u8(r.op() as u8);
            h.write_u64(r.lhs().hash_value());
            h.write_u64(r.rhs().hash_value());
        }
        Kind::Series(s) => {
            h.write_u64(s.var().hash_value());
            h.write_u64(s.point().hash_value());
            for (c, p) in s.terms() {
                h.write_u64(c.hash_value());
                h.write_i64(*p);
            }
            if let Some(o) = s.order() {
                h.write_i64(o);
            }
        }
        Kind::Fail => {}
    }
    h.finish()
}
