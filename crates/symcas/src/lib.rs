//! Facade over the symbolic-algebra kernel crates.
//!
//! Re-exports the expression kernel, the numeric backend, the
//! polynomial layer, matrix algorithms and the archive under one
//! roof. Most programs only need the [`prelude`].
//!
//! ```
//! use symcas::prelude::*;
//!
//! let x = Ex::symbol("x");
//! let e = (x.pow(2) - 1) / (&x - 1);
//! assert_eq!(normal(&e).unwrap(), &x + 1);
//! ```

pub use sym_archive::{Archive, ArchiveError, ARCHIVE_AGE, ARCHIVE_VERSION};
pub use sym_core::{
    fcall, function_name, lookup_function, register_function, Constant, ConstantKind, Ex, FuncDef,
    Info, KernelError, Kind, Matrix, RelOp, SeriesData, Symbol, MAX_RECURSION,
};
pub use sym_matrix::{charpoly, determinant, inverse, solve, trace, DetAlgo, MatrixError};
pub use sym_num::{
    default_digits, set_default_digits, Float, Number, NumericError, DEFAULT_DIGITS,
};
pub use sym_poly::{
    content, denom, divide, gcd, integer_content, lcm, normal, numer, prem, primpart, quo, rem,
    sqrfree, unit, PolyError,
};

pub mod prelude {
    pub use crate::{
        determinant, divide, gcd, inverse, normal, solve, sqrfree, Archive, DetAlgo, Ex, Info,
        Matrix, Number, RelOp,
    };
}
