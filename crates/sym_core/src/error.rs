//! Kernel error taxonomy.
//!
//! Every failure surfaces synchronously through these variants; the
//! kernel never swallows an error and never leaves a partial handle
//! behind. Predicates and structural queries that cannot fail return
//! plain values.

use thiserror::Error;

use sym_num::NumericError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Division by exact zero, negative real roots, exponent overflow.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] NumericError),

    /// An operation applied outside its domain (e.g. differentiating a
    /// relational, polynomial division by a non-polynomial).
    #[error("domain error: {0}")]
    Domain(String),

    /// Index out of bounds for `op`, matrix access or table lookup.
    #[error("index {index} out of range for {what}")]
    Range { what: &'static str, index: usize },

    /// Mismatched substitution lists, wrong function arity, malformed
    /// construction input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A recursive algorithm exceeded the depth bound.
    #[error("recursion limit exceeded in {0}")]
    RecursionLimit(&'static str),

    /// A function name with no registry entry.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
