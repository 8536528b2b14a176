//! Square-free decomposition (Yun's algorithm).

use sym_core::{Ex, Info};

use crate::division::ediv;
use crate::gcd::gcd;
use crate::{PolyError, Result};

/// Square-free decomposition of a polynomial in `x`: a product of
/// powers of pairwise coprime square-free factors equal to `a`.
pub fn sqrfree(a: &Ex, x: &Ex) -> Result<Ex> {
    if !a.info(Info::Polynomial) {
        return Err(PolyError::NotPolynomial(format!("sqrfree argument: {a}")));
    }
    let a = a.expand()?;
    if a.as_number().is_some() || a.degree(x)? < 1 {
        return Ok(a);
    }
    let da = a.diff(x)?;
    let g = gcd(&a, &da)?;
    if g.is_one() {
        return Ok(a);
    }

    // Yun: peel one multiplicity per round.
    let mut w = ediv(&a, &g)?;
    let y = ediv(&da, &g)?;
    let mut z = (y - w.diff(x)?).expand()?;
    let mut factors: Vec<Ex> = Vec::new();
    let mut i: i64 = 1;
    while !z.is_zero() {
        let h = gcd(&w, &z)?;
        if !h.is_one() {
            factors.push(h.pow(i));
        }
        w = ediv(&w, &h)?;
        let y = ediv(&z, &h)?;
        z = (y - w.diff(x)?).expand()?;
        i += 1;
    }
    if !w.is_one() {
        factors.push(w.pow(i));
    }
    let product = Ex::mul_vec(factors);

    // The factors are primitive; any numeric content of the input
    // reappears as a scalar ratio.
    let c = ediv(&a, &product.expand()?)?;
    Ok(if c.is_one() { product } else { c * product })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_multiplicities() {
        let x = Ex::symbol("x");
        let e = (&x + Ex::from(1)) * (&x + Ex::from(2)).pow(2);
        let s = sqrfree(&e.expand().unwrap(), &x).unwrap();
        assert_eq!(s, e);
    }

    #[test]
    fn square_free_input_passes_through() {
        let x = Ex::symbol("x");
        let e = (x.pow(2) + &x + Ex::from(1)).expand().unwrap();
        assert_eq!(sqrfree(&e, &x).unwrap(), e);
    }

    #[test]
    fn numeric_content_is_preserved() {
        let x = Ex::symbol("x");
        // 2*(x+1)^2
        let e = Ex::from(2) * (&x + Ex::from(1)).pow(2);
        let s = sqrfree(&e.expand().unwrap(), &x).unwrap();
        assert_eq!(s.expand().unwrap(), e.expand().unwrap());
    }

    #[test]
    fn rejects_non_polynomials() {
        let x = Ex::symbol("x");
        let e = Ex::func("sin", vec![x.clone()]).unwrap();
        assert!(matches!(
            sqrfree(&e, &x),
            Err(PolyError::NotPolynomial(_))
        ));
    }
}
