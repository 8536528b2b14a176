//! Expression kernel for the symbolic-algebra library.
//!
//! The universe is a directed acyclic graph of immutable, shared
//! nodes. [`Ex`] is the value-semantic handle every operation goes
//! through; composites are built by canonicalizing constructors, so a
//! sum or product is flat, sorted and combined the moment it exists.
//! The rewrite pipeline (`eval`, `evalf`, `expand`, `subs`, `diff`,
//! `series`) lives on the handle; polynomial normalization and
//! persistence build on top in their own crates.
//!
//! ```
//! use sym_core::Ex;
//!
//! let x = Ex::symbol("x");
//! let y = Ex::symbol("y");
//! let e = (&x + &y).pow(2).expand().unwrap();
//! assert_eq!(e, x.pow(2) + Ex::from(2) * &x * &y + y.pow(2));
//! ```

mod collect;
mod constant;
mod depth;
mod diff;
mod error;
mod eval;
mod ex;
mod expand;
mod func;
mod info;
mod matrix;
mod ncmul;
mod node;
mod ordering;
mod power;
mod printer;
mod relational;
mod seq;
mod series;
mod subs;
mod symbol;

pub use constant::{Constant, ConstantKind};
pub use depth::MAX_RECURSION;
pub use error::{KernelError, Result};
pub use ex::Ex;
pub use func::{
    fcall, fcall_serial, function_name, lookup_function, register_function, FuncCall, FuncDef,
};
pub use info::Info;
pub use matrix::Matrix;
pub use node::{Kind, Node};
pub use power::Power;
pub use relational::{RelOp, Relational};
pub use seq::{Pair, PairSeq};
pub use series::SeriesData;
pub use symbol::Symbol;
