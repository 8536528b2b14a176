//! Determinant, inverse and linear solving over the expression field.
//!
//! Entries are arbitrary symbolic expressions; pivoting decisions use
//! rational normalization to recognize zero, and every division step
//! runs through `normal` so intermediate entries stay canonical
//! quotients instead of nested fractions.

use thiserror::Error;
use tracing::debug;

use sym_core::{Ex, KernelError, Matrix};
use sym_poly::{normal, PolyError};

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Poly(#[from] PolyError),

    #[error("matrix is not square ({0}x{1})")]
    NotSquare(usize, usize),

    #[error("matrix is singular")]
    Singular,

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

/// Determinant algorithm selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetAlgo {
    /// Choose by sparsity: Laplace for sparse matrices, the
    /// permutation sum for tiny dense symbolic ones, elimination
    /// otherwise.
    Auto,
    /// Gaussian elimination with `normal` at each division step.
    Elimination,
    /// Recursive cofactor expansion along the first row.
    Laplace,
    /// The Leibniz sum over all permutations.
    PermutationSum,
}

fn require_square(m: &Matrix) -> Result<usize> {
    if m.rows() != m.cols() {
        return Err(MatrixError::NotSquare(m.rows(), m.cols()));
    }
    Ok(m.rows())
}

/// Determinant of a square matrix.
pub fn determinant(m: &Matrix, algo: DetAlgo) -> Result<Ex> {
    let n = require_square(m)?;
    let algo = match algo {
        DetAlgo::Auto => pick_algorithm(m),
        other => other,
    };
    debug!(?algo, n, "computing determinant");
    match algo {
        DetAlgo::Laplace => det_laplace(m),
        DetAlgo::PermutationSum => det_permutation(m),
        _ => det_elimination(m),
    }
}

/// Sparsity heuristic: cofactor expansion profits from zeros, the
/// permutation sum only ever pays off for tiny dense symbolic
/// matrices, elimination wins everywhere else.
fn pick_algorithm(m: &Matrix) -> DetAlgo {
    let total = m.elems().len();
    let zeros = m.elems().iter().filter(|e| e.is_zero()).count();
    let symbolic = m.elems().iter().any(|e| e.as_number().is_none());
    if zeros * 5 >= total * 2 {
        DetAlgo::Laplace
    } else if symbolic && m.rows() <= 3 {
        DetAlgo::PermutationSum
    } else {
        DetAlgo::Elimination
    }
}

fn det_elimination(m: &Matrix) -> Result<Ex> {
    let n = m.rows();
    let mut a = m.clone();
    let mut sign = false;
    let mut pivots = Vec::with_capacity(n);
    for col in 0..n {
        let Some(pivot_row) = find_pivot(&a, col, col)? else {
            return Ok(Ex::zero());
        };
        if pivot_row != col {
            a = swap_rows(&a, col, pivot_row)?;
            sign = !sign;
        }
        let pivot = a.get(col, col)?.clone();
        pivots.push(pivot.clone());
        for r in col + 1..n {
            let head = a.get(r, col)?.clone();
            if head.is_zero() {
                continue;
            }
            let factor = normal(&head.try_div(&pivot)?)?;
            for c in col..n {
                let updated = a.get(r, c)? - &factor * a.get(col, c)?;
                a.set(r, c, normal(&updated)?)?;
            }
        }
    }
    let mut det = Ex::mul_vec(pivots);
    if sign {
        det = -det;
    }
    Ok(normal(&det)?)
}

fn det_laplace(m: &Matrix) -> Result<Ex> {
    let n = m.rows();
    if n == 1 {
        return Ok(m.get(0, 0)?.clone());
    }
    let mut terms = Vec::new();
    for c in 0..n {
        let e = m.get(0, c)?;
        if e.is_zero() {
            continue;
        }
        let sub = det_laplace(&minor(m, 0, c)?)?;
        let term = e * sub;
        terms.push(if c % 2 == 0 { term } else { -term });
    }
    Ok(Ex::add_vec(terms))
}

fn det_permutation(m: &Matrix) -> Result<Ex> {
    let n = m.rows();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut terms = Vec::new();
    permutation_sum(m, &mut perm, 0, false, &mut terms)?;
    Ok(Ex::add_vec(terms))
}

fn permutation_sum(
    m: &Matrix,
    perm: &mut Vec<usize>,
    k: usize,
    odd: bool,
    terms: &mut Vec<Ex>,
) -> Result<()> {
    let n = perm.len();
    if k == n {
        let mut factors = Vec::with_capacity(n);
        for (r, &c) in perm.iter().enumerate() {
            factors.push(m.get(r, c)?.clone());
        }
        let term = Ex::mul_vec(factors);
        terms.push(if odd { -term } else { term });
        return Ok(());
    }
    for i in k..n {
        perm.swap(k, i);
        permutation_sum(m, perm, k + 1, odd ^ (i != k), terms)?;
        perm.swap(k, i);
    }
    Ok(())
}

/// The minor with row `r` and column `c` removed.
fn minor(m: &Matrix, r: usize, c: usize) -> Result<Matrix> {
    let mut elems = Vec::with_capacity((m.rows() - 1) * (m.cols() - 1));
    for i in 0..m.rows() {
        if i == r {
            continue;
        }
        for j in 0..m.cols() {
            if j == c {
                continue;
            }
            elems.push(m.get(i, j)?.clone());
        }
    }
    Ok(Matrix::new(m.rows() - 1, m.cols() - 1, elems)?)
}

/// First row at or below `from` whose entry in `col` is nonzero after
/// normalization.
fn find_pivot(a: &Matrix, col: usize, from: usize) -> Result<Option<usize>> {
    for r in from..a.rows() {
        let e = a.get(r, col)?;
        if e.is_zero() {
            continue;
        }
        if !normal(e)?.is_zero() {
            return Ok(Some(r));
        }
    }
    Ok(None)
}

fn swap_rows(a: &Matrix, r1: usize, r2: usize) -> Result<Matrix> {
    let mut out = a.clone();
    for c in 0..a.cols() {
        out.set(r1, c, a.get(r2, c)?.clone())?;
        out.set(r2, c, a.get(r1, c)?.clone())?;
    }
    Ok(out)
}

/// Solve `A * X = B` by Gaussian elimination with back-substitution.
/// `A` must be square and nonsingular.
pub fn solve(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = require_square(a)?;
    if b.rows() != n {
        return Err(MatrixError::DimensionMismatch(format!(
            "solve: {}x{} system with {}x{} right-hand side",
            n,
            n,
            b.rows(),
            b.cols()
        )));
    }
    let mut aug = a.clone();
    let mut rhs = b.clone();
    // Forward elimination.
    for col in 0..n {
        let Some(pivot_row) = find_pivot(&aug, col, col)? else {
            return Err(MatrixError::Singular);
        };
        if pivot_row != col {
            aug = swap_rows(&aug, col, pivot_row)?;
            rhs = swap_rows(&rhs, col, pivot_row)?;
        }
        let pivot = aug.get(col, col)?.clone();
        for r in col + 1..n {
            let head = aug.get(r, col)?.clone();
            if head.is_zero() {
                continue;
            }
            let factor = normal(&head.try_div(&pivot)?)?;
            for c in col..n {
                let updated = aug.get(r, c)? - &factor * aug.get(col, c)?;
                aug.set(r, c, normal(&updated)?)?;
            }
            for c in 0..rhs.cols() {
                let updated = rhs.get(r, c)? - &factor * rhs.get(col, c)?;
                rhs.set(r, c, normal(&updated)?)?;
            }
        }
    }
    // Back-substitution.
    let mut x = Matrix::zeros(n, rhs.cols())?;
    for col in 0..rhs.cols() {
        for r in (0..n).rev() {
            let mut acc = rhs.get(r, col)?.clone();
            for k in r + 1..n {
                acc = acc - aug.get(r, k)? * x.get(k, col)?;
            }
            let value = normal(&acc.try_div(aug.get(r, r)?)?)?;
            x.set(r, col, value)?;
        }
    }
    Ok(x)
}

/// Matrix inverse via solving against the identity.
pub fn inverse(m: &Matrix) -> Result<Matrix> {
    let n = require_square(m)?;
    solve(m, &Matrix::identity(n)?)
}

/// Trace of a square matrix.
pub fn trace(m: &Matrix) -> Result<Ex> {
    let n = require_square(m)?;
    let mut diag = Vec::with_capacity(n);
    for i in 0..n {
        diag.push(m.get(i, i)?.clone());
    }
    Ok(Ex::add_vec(diag))
}

/// Characteristic polynomial `det(M - lambda*I)` in the symbol
/// `lambda`, expanded.
pub fn charpoly(m: &Matrix, lambda: &Ex) -> Result<Ex> {
    let n = require_square(m)?;
    let mut shifted = m.clone();
    for i in 0..n {
        let e = shifted.get(i, i)? - lambda;
        shifted.set(i, i, e)?;
    }
    // Cofactor expansion keeps the result polynomial in lambda.
    let det = determinant(&shifted, DetAlgo::Laplace)?;
    Ok(det.expand()?)
}
