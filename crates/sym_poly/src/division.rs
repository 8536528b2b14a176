//! Polynomial division: Euclidean quotient/remainder in Q[x],
//! pseudo-remainder in Z[x], and exact multivariate division.

use sym_core::{Ex, Info};

use crate::{symbols, PolyError, Result};

fn check_poly(e: &Ex, what: &str) -> Result<()> {
    if !e.info(Info::Polynomial) {
        return Err(PolyError::NotPolynomial(format!("{what}: {e}")));
    }
    Ok(())
}

/// Quotient `q` of `a / b` in Q[x], such that `a = b*q + r` with
/// `deg r < deg b`.
pub fn quo(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex> {
    Ok(quo_rem(a, b, x)?.0)
}

/// Remainder `r` of `a / b` in Q[x].
pub fn rem(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex> {
    Ok(quo_rem(a, b, x)?.1)
}

fn quo_rem(a: &Ex, b: &Ex, x: &Ex) -> Result<(Ex, Ex)> {
    if b.is_zero() {
        return Err(PolyError::DivisionByZero);
    }
    check_poly(a, "quo/rem dividend")?;
    check_poly(b, "quo/rem divisor")?;
    // Leading-coefficient extraction needs the distributed form.
    let b = &b.expand()?;
    let bdeg = b.degree(x)?;
    let blc = b.lcoeff(x)?;
    let mut r = a.expand()?;
    let mut q = Ex::zero();
    let mut guard = r.degree(x)? - bdeg + 1;
    while !r.is_zero() && r.degree(x)? >= bdeg {
        if guard < 0 {
            return Err(PolyError::Internal(format!(
                "division of {a} by {b} does not terminate"
            )));
        }
        guard -= 1;
        let rdeg = r.degree(x)?;
        let c = r.lcoeff(x)?.try_div(&blc)?;
        let term = c * x.pow(rdeg - bdeg);
        q = q + &term;
        r = (r - term * b).expand()?;
    }
    Ok((q, r))
}

/// Pseudo-remainder of `a` and `b` in Z[x]:
/// `lc(b)^(deg a - deg b + 1) * a = b*q + prem(a, b)`.
pub fn prem(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex> {
    if b.is_zero() {
        return Err(PolyError::DivisionByZero);
    }
    check_poly(a, "prem dividend")?;
    check_poly(b, "prem divisor")?;
    let b = &b.expand()?;
    let bdeg = b.degree(x)?;
    let blc = b.lcoeff(x)?;
    let mut r = a.expand()?;
    let mut rdeg = r.degree(x)?;
    let delta = rdeg - bdeg + 1;
    let mut n: i64 = 0;
    while !r.is_zero() && rdeg >= bdeg {
        let rlc = r.lcoeff(x)?;
        let term = rlc * x.pow(rdeg - bdeg) * b;
        r = (&blc * r - term).expand()?;
        n += 1;
        if r.is_zero() {
            break;
        }
        rdeg = r.degree(x)?;
    }
    // Scale to the canonical pseudo-remainder power.
    if delta > n {
        r = (blc.pow(delta - n) * r).expand()?;
    }
    Ok(r)
}

/// Exact multivariate division: `Some(q)` with `a == b*q`, or `None`
/// when `b` does not divide `a`.
pub fn divide(a: &Ex, b: &Ex) -> Result<Option<Ex>> {
    if b.is_zero() {
        return Err(PolyError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(Some(Ex::zero()));
    }
    // Numeric divisor: exact scalar division.
    if let Some(n) = b.as_number() {
        let inv = Ex::num(n.inv()?);
        return Ok(Some((a * inv).expand()?));
    }
    let Some(x) = symbols(b).into_iter().next() else {
        // Non-numeric but symbol-free divisor (a constant like Pi):
        // divide exactly by it.
        return Ok(Some((a * b.try_pow(&Ex::minus_one())?).expand()?));
    };
    let b = &b.expand()?;
    let bdeg = b.degree(&x)?;
    let blc = b.lcoeff(&x)?;
    let mut r = a.expand()?;
    let mut q = Ex::zero();
    while !r.is_zero() {
        let rdeg = r.degree(&x)?;
        if rdeg < bdeg {
            return Ok(None);
        }
        let rlc = r.lcoeff(&x)?;
        let Some(c) = divide(&rlc, &blc)? else {
            return Ok(None);
        };
        let term = c * x.pow(rdeg - bdeg);
        q = q + &term;
        r = (r - term * b).expand()?;
    }
    Ok(Some(q))
}

/// Exact division that is known to succeed; failure is an internal
/// invariant violation of the calling algorithm.
pub(crate) fn ediv(a: &Ex, b: &Ex) -> Result<Ex> {
    divide(a, b)?.ok_or_else(|| {
        PolyError::Internal(format!("expected {b} to divide {a} exactly"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_division_in_qx() {
        let x = Ex::symbol("x");
        // (x^3 - 1) = (x - 1)(x^2 + x + 1)
        let a = x.pow(3) - Ex::from(1);
        let b = &x - Ex::from(1);
        assert_eq!(quo(&a, &b, &x).unwrap(), x.pow(2) + &x + Ex::from(1));
        assert!(rem(&a, &b, &x).unwrap().is_zero());
        // Remainder theorem: rem(x^2 + 1, x - 2) = 5
        let r = rem(&(x.pow(2) + Ex::from(1)), &(&x - Ex::from(2)), &x).unwrap();
        assert_eq!(r, Ex::from(5));
    }

    #[test]
    fn rational_leading_coefficients() {
        let x = Ex::symbol("x");
        // (2x^2 + x) / (3x) : q = 2/3 x + 1/3
        let a = Ex::from(2) * x.pow(2) + &x;
        let b = Ex::from(3) * &x;
        let q = quo(&a, &b, &x).unwrap();
        assert_eq!(
            q,
            Ex::num(sym_num::Number::from((2, 3))) * &x
                + Ex::num(sym_num::Number::from((1, 3)))
        );
    }

    #[test]
    fn division_by_zero_polynomial() {
        let x = Ex::symbol("x");
        assert!(matches!(
            quo(&x, &Ex::zero(), &x),
            Err(PolyError::DivisionByZero)
        ));
        assert!(matches!(
            divide(&x, &Ex::zero()),
            Err(PolyError::DivisionByZero)
        ));
    }

    #[test]
    fn pseudo_remainder_stays_in_zx() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        // prem of (y*x^2 + 1) by (2x + y) in Z[x]
        let a = &y * x.pow(2) + Ex::from(1);
        let b = Ex::from(2) * &x + &y;
        let r = prem(&a, &b, &x).unwrap();
        // 4*(y*x^2+1) - (2x+y)*(2yx - y^2) = y^3 + 4
        assert_eq!(r, y.pow(3) + Ex::from(4));
    }

    #[test]
    fn exact_division_multivariate() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let f = (&x + &y) * (&x - &y);
        let a = f.expand().unwrap();
        let q = divide(&a, &(&x + &y)).unwrap().unwrap();
        assert_eq!(q, &x - &y);
        assert_eq!(divide(&a, &(&x + Ex::from(1))).unwrap(), None);
    }
}
