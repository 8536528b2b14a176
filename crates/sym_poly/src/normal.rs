//! Rational-function normalization.
//!
//! `normal` turns an arbitrary expression into a canonical quotient
//! `num/den` of expanded, coprime polynomials. Subexpressions that are
//! not rational over the symbols — functions, symbolic powers, series
//! — are treated as opaque generators: each distinct one is replaced
//! by a fresh symbol for the duration of the call and substituted
//! back at the end.

use tracing::debug;

use sym_core::{Ex, Kind, Symbol};

use crate::division::ediv;
use crate::gcd::{gcd, unit};
use crate::{symbols, Result};

/// Canonical `num/den` form of `e`.
pub fn normal(e: &Ex) -> Result<Ex> {
    let mut repl = Replacements::default();
    let (num, den) = normal_parts(e, &mut repl)?;
    let out = num.try_div(&den)?;
    repl.restore(&out)
}

/// Numerator of the normal form.
pub fn numer(e: &Ex) -> Result<Ex> {
    let mut repl = Replacements::default();
    let (num, _) = normal_parts(e, &mut repl)?;
    repl.restore(&num)
}

/// Denominator of the normal form.
pub fn denom(e: &Ex) -> Result<Ex> {
    let mut repl = Replacements::default();
    let (_, den) = normal_parts(e, &mut repl)?;
    repl.restore(&den)
}

/// Per-call map from generator symbols to the opaque subexpressions
/// they stand for.
#[derive(Default)]
struct Replacements {
    syms: Vec<Ex>,
    origs: Vec<Ex>,
}

impl Replacements {
    /// Generator symbol for `orig`, reusing an existing one when the
    /// same subexpression occurs twice.
    fn generator(&mut self, orig: &Ex) -> Ex {
        for (s, o) in self.syms.iter().zip(&self.origs) {
            if o == orig {
                return s.clone();
            }
        }
        let s = Ex::from_symbol(Symbol::anonymous());
        self.syms.push(s.clone());
        self.origs.push(orig.clone());
        s
    }

    fn restore(&self, e: &Ex) -> Result<Ex> {
        if self.syms.is_empty() {
            return Ok(e.clone());
        }
        Ok(e.subs_list(&self.syms, &self.origs)?)
    }
}

/// `(num, den)` with both expanded and coprime.
fn normal_parts(e: &Ex, repl: &mut Replacements) -> Result<(Ex, Ex)> {
    match e.kind() {
        Kind::Num(n) => Ok((Ex::num(n.numer()), Ex::num(n.denom()))),
        Kind::Sym(_) | Kind::Const(_) => Ok((e.clone(), Ex::one())),
        Kind::Add(_) => {
            // Common-denominator assembly over the children.
            let mut num = Ex::zero();
            let mut den = Ex::one();
            for c in e.children() {
                let (nc, dc) = normal_parts(&c, repl)?;
                num = (num * &dc + nc * &den).expand()?;
                den = (den * dc).expand()?;
            }
            reduce(num, den)
        }
        Kind::Mul(_) => {
            let mut num = Ex::one();
            let mut den = Ex::one();
            for c in e.children() {
                let (nc, dc) = normal_parts(&c, repl)?;
                num = (num * nc).expand()?;
                den = (den * dc).expand()?;
            }
            reduce(num, den)
        }
        Kind::Pow(p) => {
            let exp_int = p.exponent().as_number().and_then(|n| n.to_i64());
            match exp_int {
                Some(k) => {
                    let (nb, db) = normal_parts(p.base(), repl)?;
                    let (num, den) = if k >= 0 {
                        (nb.pow(k).expand()?, db.pow(k).expand()?)
                    } else {
                        (db.pow(-k).expand()?, nb.pow(-k).expand()?)
                    };
                    reduce(num, den)
                }
                // Transcendental or symbolic power: opaque generator.
                None => Ok((repl.generator(e), Ex::one())),
            }
        }
        _ => Ok((repl.generator(e), Ex::one())),
    }
}

/// Reduce `num/den` to lowest terms with a positive-unit denominator.
fn reduce(num: Ex, den: Ex) -> Result<(Ex, Ex)> {
    if num.is_zero() {
        return Ok((num, Ex::one()));
    }
    if let Some(n) = den.as_number() {
        // Scalar denominator folds into the numerator.
        let num = (num * Ex::num(n.inv()?)).expand()?;
        return Ok((num, Ex::one()));
    }
    let g = gcd(&num, &den)?;
    let (mut num, mut den) = if g.is_one() {
        (num, den)
    } else {
        debug!(%g, "normal: cancelling common polynomial factor");
        (ediv(&num, &g)?, ediv(&den, &g)?)
    };
    if let Some(n) = den.as_number() {
        num = (num * Ex::num(n.inv()?)).expand()?;
        return Ok((num, Ex::one()));
    }
    // Unit-normalize the denominator.
    if let Some(x) = symbols(&den).into_iter().next() {
        if unit(&den, &x)?.is_minus_one() {
            num = (num * Ex::minus_one()).expand()?;
            den = (den * Ex::minus_one()).expand()?;
        }
    }
    Ok((num, den))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_num::Number;

    #[test]
    fn cancels_common_factors() {
        let x = Ex::symbol("x");
        // (x^2 - 1)/(x + 1) -> x - 1
        let e = (x.pow(2) - Ex::from(1)) / (&x + Ex::from(1));
        assert_eq!(normal(&e).unwrap(), &x - Ex::from(1));
    }

    #[test]
    fn common_denominator_assembly() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        // 1/x + 1/y = (x + y)/(x*y)
        let e = x.pow(-1) + y.pow(-1);
        let n = normal(&e).unwrap();
        assert_eq!(n, (&x + &y) * (&x * &y).pow(-1));
        assert_eq!(numer(&e).unwrap(), &x + &y);
        assert_eq!(denom(&e).unwrap(), &x * &y);
    }

    #[test]
    fn normal_is_idempotent() {
        let x = Ex::symbol("x");
        let e = (x.pow(2) + Ex::from(2) * &x + Ex::from(1)) / (x.pow(2) - Ex::from(1));
        let once = normal(&e).unwrap();
        assert_eq!(normal(&once).unwrap(), once);
        // (x+1)/(x-1)
        assert_eq!(once, (&x + Ex::from(1)) * (&x - Ex::from(1)).pow(-1));
    }

    #[test]
    fn opaque_generators_for_functions() {
        let x = Ex::symbol("x");
        let s = Ex::func("sin", vec![x.clone()]).unwrap();
        // sin(x)^2/sin(x) -> sin(x)
        let e = s.pow(2) / &s;
        assert_eq!(normal(&e).unwrap(), s);
    }

    #[test]
    fn rational_coefficients_clear() {
        let x = Ex::symbol("x");
        // x/2 + x/3 = 5/6 x ; normal multiplies through: (5*x)/6
        let e = &x * Ex::num(Number::from((1, 2))) + &x * Ex::num(Number::from((1, 3)));
        let n = normal(&e).unwrap();
        assert_eq!(n, Ex::num(Number::from((5, 6))) * &x);
    }

    #[test]
    fn denominator_sign_is_normalized() {
        let x = Ex::symbol("x");
        // 1/(1 - x) -> -1/(x - 1): denominator gets a positive lead
        let e = (Ex::from(1) - &x).pow(-1);
        let n = normal(&e).unwrap();
        assert_eq!(n, -((&x - Ex::from(1)).pow(-1)));
    }
}
