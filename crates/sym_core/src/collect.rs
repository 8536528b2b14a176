//! Degrees and coefficients with respect to one symbol.
//!
//! These walk the canonical structure directly and are meaningful on
//! expanded (or at least collected) input, which is also what the
//! polynomial layer feeds them.

use crate::error::{KernelError, Result};
use crate::node::Kind;
use crate::Ex;

fn check_symbol(s: &Ex) -> Result<()> {
    if s.as_symbol().is_none() {
        return Err(KernelError::InvalidArgument(
            "expected a symbol".into(),
        ));
    }
    Ok(())
}

impl Ex {
    /// Highest power of `s`.
    pub fn degree(&self, s: &Ex) -> Result<i64> {
        check_symbol(s)?;
        Ok(degree_impl(self, s, true))
    }

    /// Lowest power of `s`.
    pub fn ldegree(&self, s: &Ex) -> Result<i64> {
        check_symbol(s)?;
        Ok(degree_impl(self, s, false))
    }

    /// Coefficient of `s^n`.
    pub fn coeff(&self, s: &Ex, n: i64) -> Result<Ex> {
        check_symbol(s)?;
        Ok(coeff_impl(self, s, n))
    }

    /// Leading coefficient: `coeff(s, degree(s))`.
    pub fn lcoeff(&self, s: &Ex) -> Result<Ex> {
        self.coeff(s, self.degree(s)?)
    }

    /// Trailing coefficient: `coeff(s, ldegree(s))`.
    pub fn tcoeff(&self, s: &Ex) -> Result<Ex> {
        self.coeff(s, self.ldegree(s)?)
    }

    /// Regroup as a polynomial in `s`:
    /// `sum_n coeff(s, n) * s^n` over the occurring degrees.
    pub fn collect(&self, s: &Ex) -> Result<Ex> {
        check_symbol(s)?;
        let lo = degree_impl(self, s, false);
        let hi = degree_impl(self, s, true);
        let mut terms = Vec::new();
        for n in lo..=hi {
            let c = coeff_impl(self, s, n);
            if !c.is_zero() {
                terms.push(c * s.pow(n));
            }
        }
        Ok(Ex::add_vec(terms))
    }
}

fn degree_impl(e: &Ex, s: &Ex, highest: bool) -> i64 {
    if e == s {
        return 1;
    }
    match e.kind() {
        Kind::Add(_) => {
            let mut best = None::<i64>;
            for c in e.children() {
                let d = degree_impl(&c, s, highest);
                best = Some(match best {
                    None => d,
                    Some(b) if highest => b.max(d),
                    Some(b) => b.min(d),
                });
            }
            best.unwrap_or(0)
        }
        Kind::Mul(_) => e
            .children()
            .iter()
            .map(|c| degree_impl(c, s, highest))
            .sum(),
        Kind::Pow(p) => match p.exponent().as_number().and_then(|n| n.to_i64()) {
            Some(k) => k * degree_impl(p.base(), s, highest),
            None => 0,
        },
        _ => 0,
    }
}

fn coeff_impl(e: &Ex, s: &Ex, n: i64) -> Ex {
    if e == s {
        return if n == 1 { Ex::one() } else { Ex::zero() };
    }
    if !e.has(s) {
        return if n == 0 { e.clone() } else { Ex::zero() };
    }
    match e.kind() {
        Kind::Add(_) => {
            let terms = e
                .children()
                .iter()
                .map(|c| coeff_impl(c, s, n))
                .filter(|c| !c.is_zero())
                .collect();
            Ex::add_vec(terms)
        }
        Kind::Mul(_) => {
            let mut free = Vec::new();
            let mut dep = Vec::new();
            for c in e.children() {
                if c.has(s) {
                    dep.push(c);
                } else {
                    free.push(c);
                }
            }
            // A single dependent factor can be projected; several
            // cannot without expansion.
            if dep.len() == 1 {
                let c = coeff_impl(&dep[0], s, n);
                if c.is_zero() {
                    return Ex::zero();
                }
                free.push(c);
                Ex::mul_vec(free)
            } else {
                Ex::zero()
            }
        }
        Kind::Pow(p) => {
            if p.base() == s {
                match p.exponent().as_number().and_then(|k| k.to_i64()) {
                    Some(k) if k == n => Ex::one(),
                    _ => Ex::zero(),
                }
            } else {
                Ex::zero()
            }
        }
        _ => Ex::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_of_a_polynomial() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = x.pow(3) * &y + &x * Ex::from(2) + Ex::from(5);
        assert_eq!(e.degree(&x).unwrap(), 3);
        assert_eq!(e.ldegree(&x).unwrap(), 0);
        assert_eq!(e.degree(&y).unwrap(), 1);
        // Laurent part counts negatively.
        let l = x.pow(-2) + &x;
        assert_eq!(l.ldegree(&x).unwrap(), -2);
        assert_eq!(l.degree(&x).unwrap(), 1);
    }

    #[test]
    fn coefficients_of_a_polynomial() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = x.pow(3) * &y + &x * Ex::from(2) + Ex::from(5);
        assert_eq!(e.coeff(&x, 3).unwrap(), y);
        assert_eq!(e.coeff(&x, 1).unwrap(), Ex::from(2));
        assert_eq!(e.coeff(&x, 0).unwrap(), Ex::from(5));
        assert_eq!(e.coeff(&x, 2).unwrap(), Ex::zero());
        assert_eq!(e.lcoeff(&x).unwrap(), y);
        assert_eq!(e.tcoeff(&x).unwrap(), Ex::from(5));
    }

    #[test]
    fn collect_regroups() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = (&x * &y + &x + Ex::from(1) + &y * &x).expand().unwrap();
        let c = e.collect(&x).unwrap();
        // (2y + 1)*x + 1
        assert_eq!(
            c,
            (Ex::from(2) * &y + Ex::from(1)) * &x + Ex::from(1)
        );
    }

    #[test]
    fn only_symbols_are_accepted() {
        let x = Ex::symbol("x");
        let e = x.pow(2);
        assert!(e.degree(&Ex::from(2)).is_err());
    }
}
