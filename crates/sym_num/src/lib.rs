//! Exact numeric backend for the symbolic kernel.
//!
//! A [`Number`] is one of four tagged variants: arbitrary-precision
//! integer, reduced rational, Gaussian rational (complex with exact
//! rational parts), or machine float with a carried decimal precision.
//! Construction normalizes: a rational with denominator 1 becomes an
//! integer, a complex with zero imaginary part collapses to its real
//! part. All closed ring operations are total; division and inversion
//! are the only fallible operations and report [`NumericError`].

mod float;
mod number;
mod parse;
mod precision;

pub use float::Float;
pub use number::{int_nth_root, Number};
pub use parse::ParseNumberError;
pub use precision::{default_digits, set_default_digits, DEFAULT_DIGITS};

use thiserror::Error;

/// Failures raised by the numeric layer. Predicates never fail; only
/// the partial field operations do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer root of negative number in real context")]
    NegativeRoot,

    #[error("exponent {0} does not fit the machine word")]
    ExponentOverflow(String),
}
