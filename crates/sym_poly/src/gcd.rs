//! Polynomial GCD over Z[X].
//!
//! The driver strips integer contents, tries the evaluation-based
//! heuristic GCD (bounded retries), and falls back to the
//! subresultant polynomial remainder sequence. Results are primitive
//! and unit-normalized: the leading coefficient of the main variable
//! is positive.

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One, Signed};
use tracing::{debug, trace};

use sym_core::{Ex, Info, Kind};
use sym_num::Number;

use crate::division::{divide, ediv};
use crate::{shared_symbol, symbols, PolyError, Result};

/// GCD of all numeric coefficients (a rational for rational input).
pub fn integer_content(e: &Ex) -> Number {
    match e.kind() {
        Kind::Num(n) => n.abs(),
        Kind::Add(s) => {
            let mut g = s.overall().abs();
            for p in s.pairs() {
                g = g.gcd(p.coeff());
                if g.is_one() {
                    break;
                }
            }
            g
        }
        Kind::Mul(s) => s.overall().abs(),
        _ => Number::one(),
    }
}

/// Content of `e` as a polynomial in `x`: the GCD of its coefficients.
pub fn content(e: &Ex, x: &Ex) -> Result<Ex> {
    if e.is_zero() {
        return Ok(Ex::zero());
    }
    let e = e.expand()?;
    if let Some(n) = e.as_number() {
        return Ok(Ex::num(n.abs()));
    }
    let lo = e.ldegree(x)?;
    let hi = e.degree(x)?;
    let mut c = Ex::zero();
    for i in lo..=hi {
        let ci = e.coeff(x, i)?;
        if ci.is_zero() {
            continue;
        }
        c = gcd(&c, &ci)?;
        if c.is_one() {
            break;
        }
    }
    Ok(c)
}

/// Unit (sign) of `e` viewed as a polynomial in `x`: `1` or `-1`.
pub fn unit(e: &Ex, x: &Ex) -> Result<Ex> {
    let mut lc = e.expand()?.lcoeff(x)?;
    loop {
        if let Some(n) = lc.as_number() {
            return Ok(if n.is_negative() {
                Ex::minus_one()
            } else {
                Ex::one()
            });
        }
        match symbols(&lc).into_iter().next() {
            Some(y) => lc = lc.lcoeff(&y)?,
            None => return Ok(Ex::one()),
        }
    }
}

/// Primitive part: `e` divided by its unit and content in `x`.
pub fn primpart(e: &Ex, x: &Ex) -> Result<Ex> {
    if e.is_zero() {
        return Ok(Ex::zero());
    }
    let c = content(e, x)?;
    let u = unit(e, x)?;
    ediv(&e.expand()?, &(c * u).expand()?)
}

/// Polynomial GCD in Z[X] (rational coefficients handled through the
/// integer content). The result is content-free and unit-normal.
pub fn gcd(a: &Ex, b: &Ex) -> Result<Ex> {
    if a.is_zero() {
        return unit_normal(&b.expand()?);
    }
    if b.is_zero() {
        return unit_normal(&a.expand()?);
    }
    if let (Some(na), Some(nb)) = (a.as_number(), b.as_number()) {
        return Ok(Ex::num(na.gcd(nb)));
    }
    for (e, what) in [(a, "first"), (b, "second")] {
        if !e.info(Info::Polynomial) {
            return Err(PolyError::NotPolynomial(format!("gcd {what} argument: {e}")));
        }
    }
    let a = a.expand()?;
    let b = b.expand()?;
    if a == b {
        return unit_normal(&a);
    }
    let Some(x) = shared_symbol(&a, &b) else {
        // Disjoint variable sets: only the numeric content survives.
        return Ok(Ex::num(integer_content(&a).gcd(&integer_content(&b))));
    };

    let ca = integer_content(&a);
    let cb = integer_content(&b);
    let g_num = ca.gcd(&cb);
    let ap = (a * Ex::num(ca.inv()?)).expand()?;
    let bp = (b * Ex::num(cb.inv()?)).expand()?;

    let mut vars = symbols(&ap);
    for s in symbols(&bp) {
        if !vars.contains(&s) {
            vars.push(s);
        }
    }
    // Main variable first.
    vars.retain(|s| *s != x);
    vars.insert(0, x.clone());

    let g_poly = match heur_gcd(&ap, &bp, &vars)? {
        Some(g) => g,
        None => {
            debug!(a = %ap, b = %bp, "heuristic gcd failed, using subresultant PRS");
            sr_gcd(&ap, &bp, &vars[0])?
        }
    };
    let g_poly = unit_normal(&g_poly)?;
    Ok((Ex::num(g_num) * g_poly).expand()?)
}

/// LCM built on the GCD: `a*b / gcd(a, b)`.
pub fn lcm(a: &Ex, b: &Ex) -> Result<Ex> {
    if a.is_zero() || b.is_zero() {
        return Ok(Ex::zero());
    }
    let g = gcd(a, b)?;
    ediv(&(a * b).expand()?, &g)
}

/// Flip the sign so that the leading coefficient of the first symbol
/// (recursively) is positive.
fn unit_normal(e: &Ex) -> Result<Ex> {
    let u = match symbols(e).into_iter().next() {
        Some(x) => unit(e, &x)?,
        None => match e.as_number() {
            Some(n) if n.is_negative() => Ex::minus_one(),
            _ => Ex::one(),
        },
    };
    Ok(if u.is_minus_one() {
        (-e).expand()?
    } else {
        e.clone()
    })
}

// --- heuristic gcd ------------------------------------------------------

const HEUR_TRIES: usize = 6;

/// Evaluation-based GCD: evaluate at a large integer, take the numeric
/// (or recursively lower-dimensional) GCD, and lift the digits back in
/// base `xi`. The candidate is verified by exact division, so a failed
/// reconstruction is harmless.
fn heur_gcd(a: &Ex, b: &Ex, vars: &[Ex]) -> Result<Option<Ex>> {
    let Some((x, rest)) = vars.split_first() else {
        let (Some(na), Some(nb)) = (a.as_number(), b.as_number()) else {
            return Ok(None);
        };
        return Ok(Some(Ex::num(na.gcd(nb))));
    };
    let bound = a.degree(x)?.min(b.degree(x)?) + 1;
    let mut xi = BigInt::from(2) * max_abs_coeff(a).min(max_abs_coeff(b)) + BigInt::from(2);
    for attempt in 0..HEUR_TRIES {
        trace!(%xi, attempt, "heuristic gcd evaluation");
        let point = Ex::num(Number::Integer(xi.clone()));
        let av = a.subs(x, &point)?;
        let bv = b.subs(x, &point)?;
        let gv = if rest.is_empty() {
            match (av.as_number(), bv.as_number()) {
                (Some(na), Some(nb)) => Ex::num(na.gcd(nb)),
                _ => return Ok(None),
            }
        } else {
            match heur_gcd(&av.expand()?, &bv.expand()?, rest)? {
                Some(g) => g,
                None => return Ok(None),
            }
        };
        if let Some(mut g) = interpolate(&gv, &xi, x, bound)? {
            let c = integer_content(&g);
            if !c.is_zero() && !c.is_one() {
                g = (g * Ex::num(c.inv()?)).expand()?;
            }
            if divide(a, &g)?.is_some() && divide(b, &g)?.is_some() {
                return Ok(Some(g));
            }
        }
        // Grow the evaluation point; any sufficiently large value
        // works, the exact-division check rejects bad lifts.
        xi = xi * BigInt::from(5) / BigInt::from(2) + BigInt::from(1);
    }
    Ok(None)
}

/// Reassemble a polynomial in `x` from its base-`xi` evaluation.
fn interpolate(gamma: &Ex, xi: &BigInt, x: &Ex, max_terms: i64) -> Result<Option<Ex>> {
    let inv_xi = Ex::num(Number::Integer(xi.clone())).try_pow(&Ex::minus_one())?;
    let mut g = Ex::zero();
    let mut rest = gamma.clone();
    let mut i: i64 = 0;
    while !rest.is_zero() {
        if i > max_terms {
            return Ok(None);
        }
        let gi = smod_coeffs(&rest, xi);
        if !gi.is_zero() {
            g = g + &gi * x.pow(i);
        }
        rest = ((rest - gi) * &inv_xi).expand()?;
        i += 1;
    }
    Ok(Some(g.expand()?))
}

/// Symmetric remainder of every numeric coefficient modulo `xi`.
fn smod_coeffs(e: &Ex, xi: &BigInt) -> Ex {
    match e.kind() {
        Kind::Num(n) => Ex::num(smod_num(n, xi)),
        Kind::Add(_) => Ex::add_vec(e.children().iter().map(|c| smod_coeffs(c, xi)).collect()),
        Kind::Mul(_) => Ex::mul_vec(
            e.children()
                .iter()
                .map(|c| match c.as_number() {
                    Some(n) => Ex::num(smod_num(n, xi)),
                    None => c.clone(),
                })
                .collect(),
        ),
        _ => e.clone(),
    }
}

fn smod_num(n: &Number, xi: &BigInt) -> Number {
    let Some(i) = n.as_integer() else {
        return n.clone();
    };
    let mut m = i.mod_floor(xi);
    if &m * 2 > *xi {
        m -= xi;
    }
    Number::Integer(m)
}

/// Largest absolute numeric coefficient, as an integer bound.
fn max_abs_coeff(e: &Ex) -> BigInt {
    fn as_int_bound(n: &Number) -> BigInt {
        match n.abs() {
            Number::Integer(i) => i,
            Number::Rational(r) => r.numer().abs(),
            _ => BigInt::one(),
        }
    }
    match e.kind() {
        Kind::Num(n) => as_int_bound(n),
        Kind::Add(s) => {
            let mut m = as_int_bound(s.overall());
            for p in s.pairs() {
                m = m.max(as_int_bound(p.coeff()));
            }
            m
        }
        Kind::Mul(s) => as_int_bound(s.overall()),
        _ => BigInt::one(),
    }
}

// --- subresultant PRS ---------------------------------------------------

/// Subresultant polynomial remainder sequence in the main variable,
/// with contents handled recursively over the remaining variables.
fn sr_gcd(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex> {
    let (mut p, mut q) = if a.degree(x)? >= b.degree(x)? {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    };
    let cp = content(&p, x)?;
    let cq = content(&q, x)?;
    let c = gcd(&cp, &cq)?;
    p = ediv(&p, &cp)?;
    q = ediv(&q, &cq)?;

    let mut delta = p.degree(x)? - q.degree(x)?;
    let mut psi = Ex::minus_one();
    let mut beta = if (delta + 1) % 2 == 0 {
        Ex::one()
    } else {
        Ex::minus_one()
    };
    loop {
        let r = crate::division::prem(&p, &q, x)?;
        if r.is_zero() {
            break;
        }
        let neg_lc = (-q.lcoeff(x)?).expand()?;
        p = q;
        q = ediv(&r, &beta)?;
        psi = match delta {
            0 => psi,
            1 => neg_lc.clone(),
            _ => ediv(&pow_expand(&neg_lc, delta)?, &pow_expand(&psi, delta - 1)?)?,
        };
        delta = p.degree(x)? - q.degree(x)?;
        beta = (&neg_lc * pow_expand(&psi, delta)?).expand()?;
    }
    // The last nonzero remainder, freed of its content in x.
    let g = ediv(&q, &content(&q, x)?)?;
    Ok((c * g).expand()?)
}

fn pow_expand(e: &Ex, k: i64) -> Result<Ex> {
    Ok(e.pow(k).expand()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_gcds() {
        assert_eq!(gcd(&Ex::from(12), &Ex::from(18)).unwrap(), Ex::from(6));
        assert_eq!(gcd(&Ex::from(7), &Ex::from(11)).unwrap(), Ex::from(1));
    }

    #[test]
    fn univariate_gcd() {
        let x = Ex::symbol("x");
        // gcd(x^2 - 1, x^2 - 2x + 1) = x - 1
        let a = x.pow(2) - Ex::from(1);
        let b = x.pow(2) - Ex::from(2) * &x + Ex::from(1);
        assert_eq!(gcd(&a, &b).unwrap(), &x - Ex::from(1));
    }

    #[test]
    fn gcd_with_content() {
        let x = Ex::symbol("x");
        let a = Ex::from(4) * &x + Ex::from(4);
        let b = Ex::from(6) * x.pow(2) - Ex::from(6);
        // gcd = 2(x + 1)
        assert_eq!(gcd(&a, &b).unwrap(), Ex::from(2) * &x + Ex::from(2));
    }

    #[test]
    fn multivariate_gcd() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let common = &x + &y;
        let a = (&common * (&x - &y)).expand().unwrap();
        let b = (&common * (&x + Ex::from(1))).expand().unwrap();
        assert_eq!(gcd(&a, &b).unwrap(), common);
    }

    #[test]
    fn cofactors_become_coprime() {
        let x = Ex::symbol("x");
        let a = ((&x + Ex::from(1)).pow(2) * (&x + Ex::from(2)))
            .expand()
            .unwrap();
        let b = ((&x + Ex::from(1)) * (&x + Ex::from(3))).expand().unwrap();
        let g = gcd(&a, &b).unwrap();
        assert_eq!(g, &x + Ex::from(1));
        let qa = divide(&a, &g).unwrap().expect("g divides a");
        let qb = divide(&b, &g).unwrap().expect("g divides b");
        assert!(gcd(&qa, &qb).unwrap().is_one());
    }

    #[test]
    fn unit_normalization() {
        let x = Ex::symbol("x");
        // gcd(-x - 1, x^2 + 2x + 1): positive leading coefficient
        let a = -(&x) - Ex::from(1);
        let b = x.pow(2) + Ex::from(2) * &x + Ex::from(1);
        assert_eq!(gcd(&a, &b).unwrap(), &x + Ex::from(1));
    }

    #[test]
    fn contents_and_primitive_parts() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = Ex::from(2) * &y * &x + Ex::from(4) * y.pow(2);
        // content in x is 2y, primitive part x + 2y
        assert_eq!(content(&e, &x).unwrap(), Ex::from(2) * &y);
        assert_eq!(
            primpart(&e, &x).unwrap(),
            (&x + Ex::from(2) * &y).expand().unwrap()
        );
        assert_eq!(integer_content(&e.expand().unwrap()), Number::from(2));
    }

    #[test]
    fn lcm_of_polynomials() {
        let x = Ex::symbol("x");
        let a = (&x + Ex::from(1)) * (&x + Ex::from(2));
        let b = (&x + Ex::from(2)) * (&x + Ex::from(3));
        let l = lcm(&a.expand().unwrap(), &b.expand().unwrap()).unwrap();
        let expected = ((&x + Ex::from(1)) * (&x + Ex::from(2)) * (&x + Ex::from(3)))
            .expand()
            .unwrap();
        assert_eq!(l, expected);
    }
}
