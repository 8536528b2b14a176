//! The tagged numeric value.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_complex::Complex;
use num_integer::{Integer as IntegerOps, Roots};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::float::Float;
use crate::precision::default_digits;
use crate::NumericError;

/// Exact or inexact number over the Gaussian rationals.
///
/// Invariants kept by every constructor and operation:
/// - `Rational` is never integer-valued (reduces to `Integer`),
/// - `Complex` never has a zero imaginary part (collapses to the real
///   variants),
/// - floats are contagious: an operation with a float operand yields a
///   float (except against a complex, where the float is promoted to
///   its exact rational value, every double being one).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Number {
    Integer(BigInt),
    Rational(BigRational),
    Complex(Box<Complex<BigRational>>),
    Float(Float),
}

impl Number {
    pub fn zero() -> Self {
        Number::Integer(BigInt::zero())
    }

    pub fn one() -> Self {
        Number::Integer(BigInt::one())
    }

    pub fn minus_one() -> Self {
        Number::Integer(-BigInt::one())
    }

    pub fn two() -> Self {
        Number::Integer(BigInt::from(2))
    }

    pub fn three() -> Self {
        Number::Integer(BigInt::from(3))
    }

    pub fn half() -> Self {
        Number::Rational(BigRational::new(BigInt::one(), BigInt::from(2)))
    }

    pub fn minus_half() -> Self {
        Number::Rational(BigRational::new(-BigInt::one(), BigInt::from(2)))
    }

    /// Exact rational `num/den`.
    pub fn rational(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Result<Self, NumericError> {
        let den: BigInt = den.into();
        if den.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Self::from_rational(BigRational::new(num.into(), den)))
    }

    /// Gaussian rational `re + im*I`.
    pub fn complex(re: BigRational, im: BigRational) -> Self {
        Self::from_complex(Complex::new(re, im))
    }

    /// The imaginary unit.
    pub fn imaginary_unit() -> Self {
        Self::complex(BigRational::zero(), BigRational::one())
    }

    /// A float at the current default precision.
    pub fn float(value: f64) -> Self {
        Number::Float(Float::new(value))
    }

    pub(crate) fn from_rational(r: BigRational) -> Self {
        if r.is_integer() {
            Number::Integer(r.to_integer())
        } else {
            Number::Rational(r)
        }
    }

    pub(crate) fn from_complex(c: Complex<BigRational>) -> Self {
        if c.im.is_zero() {
            Self::from_rational(c.re)
        } else {
            Number::Complex(Box::new(c))
        }
    }

    // --- predicates -----------------------------------------------------

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => i.is_zero(),
            Number::Rational(_) | Number::Complex(_) => false,
            Number::Float(f) => f.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Number::Integer(i) if i.is_one())
    }

    pub fn is_minus_one(&self) -> bool {
        match self {
            Number::Integer(i) => (-i).is_one(),
            _ => false,
        }
    }

    /// Exact integer?
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Exact rational (integers included)?
    pub fn is_rational(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::Rational(_))
    }

    /// Real-valued (floats included, complexes excluded)?
    pub fn is_real(&self) -> bool {
        !matches!(self, Number::Complex(_))
    }

    pub fn is_exact(&self) -> bool {
        !matches!(self, Number::Float(_))
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Number::Integer(i) => i.is_positive(),
            Number::Rational(r) => r.is_positive(),
            Number::Float(f) => f.value() > 0.0,
            Number::Complex(_) => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Integer(i) => i.is_negative(),
            Number::Rational(r) => r.is_negative(),
            Number::Float(f) => f.value() < 0.0,
            Number::Complex(_) => false,
        }
    }

    pub fn is_pos_int(&self) -> bool {
        matches!(self, Number::Integer(i) if i.is_positive())
    }

    pub fn is_nonneg_int(&self) -> bool {
        matches!(self, Number::Integer(i) if !i.is_negative())
    }

    pub fn is_even(&self) -> bool {
        matches!(self, Number::Integer(i) if i.is_even())
    }

    pub fn is_odd(&self) -> bool {
        matches!(self, Number::Integer(i) if i.is_odd())
    }

    // --- conversions ----------------------------------------------------

    /// The value as an exact rational, if it is one.
    pub fn as_rational(&self) -> Option<BigRational> {
        match self {
            Number::Integer(i) => Some(BigRational::from_integer(i.clone())),
            Number::Rational(r) => Some(r.clone()),
            _ => None,
        }
    }

    /// The value as an exact integer, if it is one.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Number::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|i| i.to_i64())
    }

    /// Approximate real value. `None` for complexes.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Integer(i) => i.to_f64(),
            Number::Rational(r) => r.to_f64(),
            Number::Float(f) => Some(f.value()),
            Number::Complex(_) => None,
        }
    }

    /// Every operand as a Gaussian rational. Floats are promoted to
    /// their exact rational value (every finite double is one).
    fn to_complex_exact(&self) -> Complex<BigRational> {
        match self {
            Number::Integer(i) => Complex::new(BigRational::from_integer(i.clone()), BigRational::zero()),
            Number::Rational(r) => Complex::new(r.clone(), BigRational::zero()),
            Number::Complex(c) => (**c).clone(),
            Number::Float(f) => Complex::new(
                BigRational::from_float(f.value()).unwrap_or_else(BigRational::zero),
                BigRational::zero(),
            ),
        }
    }

    /// Convert to a float at the given precision. Exact rationals lose
    /// exactness; Gaussian rationals stay exact (the model has no
    /// complex float).
    pub fn to_float(&self, prec: Option<u32>) -> Number {
        let prec = prec.unwrap_or_else(default_digits);
        match self {
            Number::Integer(i) => Number::Float(Float::with_prec(i.to_f64().unwrap_or(0.0), prec)),
            Number::Rational(r) => Number::Float(Float::with_prec(r.to_f64().unwrap_or(0.0), prec)),
            Number::Float(f) => Number::Float(Float::with_prec(f.value(), prec)),
            Number::Complex(_) => self.clone(),
        }
    }

    /// Numerator of the value over a common denominator.
    pub fn numer(&self) -> Number {
        match self {
            Number::Integer(_) | Number::Float(_) => self.clone(),
            Number::Rational(r) => Number::Integer(r.numer().clone()),
            Number::Complex(c) => {
                let den = c.re.denom().lcm(c.im.denom());
                let re = (&c.re * &den).to_integer();
                let im = (&c.im * &den).to_integer();
                Self::from_complex(Complex::new(
                    BigRational::from_integer(re),
                    BigRational::from_integer(im),
                ))
            }
        }
    }

    /// Denominator of the value (1 for integers and floats).
    pub fn denom(&self) -> Number {
        match self {
            Number::Integer(_) | Number::Float(_) => Number::one(),
            Number::Rational(r) => Number::Integer(r.denom().clone()),
            Number::Complex(c) => Number::Integer(c.re.denom().lcm(c.im.denom())),
        }
    }

    // --- arithmetic -----------------------------------------------------

    fn binary(
        &self,
        rhs: &Number,
        exact: impl Fn(&BigRational, &BigRational) -> BigRational,
        complex: impl Fn(&Complex<BigRational>, &Complex<BigRational>) -> Complex<BigRational>,
        float: impl Fn(f64, f64) -> f64,
    ) -> Number {
        match (self, rhs) {
            (Number::Complex(_), _) | (_, Number::Complex(_)) => {
                Self::from_complex(complex(&self.to_complex_exact(), &rhs.to_complex_exact()))
            }
            (Number::Float(a), Number::Float(b)) => {
                Number::Float(a.combine(*b, float(a.value(), b.value())))
            }
            (Number::Float(a), b) => {
                Number::Float(a.map(float(a.value(), b.to_f64().unwrap_or(0.0))))
            }
            (a, Number::Float(b)) => {
                Number::Float(b.map(float(a.to_f64().unwrap_or(0.0), b.value())))
            }
            (a, b) => {
                let (ar, br) = (a.as_rational(), b.as_rational());
                match (ar, br) {
                    (Some(ar), Some(br)) => Self::from_rational(exact(&ar, &br)),
                    // All non-complex, non-float operands are rational.
                    _ => unreachable!("exact real operands"),
                }
            }
        }
    }

    pub fn add(&self, rhs: &Number) -> Number {
        self.binary(rhs, |a, b| a + b, |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Number) -> Number {
        self.binary(rhs, |a, b| a - b, |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Number) -> Number {
        self.binary(rhs, |a, b| a * b, |a, b| a * b, |a, b| a * b)
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Integer(i) => Number::Integer(-i),
            Number::Rational(r) => Number::Rational(-r),
            Number::Complex(c) => Number::Complex(Box::new(-(**c).clone())),
            Number::Float(f) => Number::Float(f.map(-f.value())),
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Integer(i) => Number::Integer(i.abs()),
            Number::Rational(r) => Number::Rational(r.abs()),
            Number::Float(f) => Number::Float(f.map(f.value().abs())),
            // |a+bi| is generally irrational; callers keep it symbolic.
            Number::Complex(_) => self.clone(),
        }
    }

    /// Division. The only zero divisor accepted is none at all.
    pub fn try_div(&self, rhs: &Number) -> Result<Number, NumericError> {
        if rhs.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(self.binary(rhs, |a, b| a / b, |a, b| a / b, |a, b| a / b))
    }

    /// Multiplicative inverse.
    pub fn inv(&self) -> Result<Number, NumericError> {
        Number::one().try_div(self)
    }

    /// Exact power with an integer exponent.
    pub fn pow_int(&self, exp: &BigInt) -> Result<Number, NumericError> {
        if exp.is_zero() {
            return Ok(Number::one());
        }
        let mag = exp
            .abs()
            .to_u32()
            .ok_or_else(|| NumericError::ExponentOverflow(exp.to_string()))?;
        let pos = match self {
            Number::Integer(i) => Number::Integer(i.pow(mag)),
            Number::Rational(r) => Self::from_rational(BigRational::new_raw(
                r.numer().pow(mag),
                r.denom().pow(mag),
            )),
            Number::Float(f) => {
                let e = i32::try_from(mag)
                    .map_err(|_| NumericError::ExponentOverflow(exp.to_string()))?;
                Number::Float(f.map(f.value().powi(e)))
            }
            Number::Complex(c) => {
                // Square-and-multiply over the Gaussian rationals.
                let mut acc = Complex::new(BigRational::one(), BigRational::zero());
                let mut base = (**c).clone();
                let mut e = mag;
                while e > 0 {
                    if e & 1 == 1 {
                        acc = acc * base.clone();
                    }
                    base = base.clone() * base;
                    e >>= 1;
                }
                Self::from_complex(acc)
            }
        };
        if exp.is_negative() {
            pos.inv()
        } else {
            Ok(pos)
        }
    }

    /// Exact evaluation of `self ^ exp` where both are numeric.
    ///
    /// `Ok(None)` means the power has no exact (or float) value in this
    /// model and should stay symbolic, e.g. `2^(1/2)` or `(-1)^(1/2)`.
    pub fn pow(&self, exp: &Number) -> Result<Option<Number>, NumericError> {
        match exp {
            Number::Integer(e) => {
                if self.is_zero() && e.is_negative() {
                    return Err(NumericError::DivisionByZero);
                }
                self.pow_int(e).map(Some)
            }
            Number::Float(e) => {
                let base = match self.to_f64() {
                    Some(b) => b,
                    None => return Ok(None),
                };
                let v = base.powf(e.value());
                if v.is_finite() {
                    Ok(Some(Number::Float(e.map(v))))
                } else {
                    Ok(None)
                }
            }
            Number::Rational(e) => {
                if let Number::Float(b) = self {
                    let v = b.value().powf(e.to_f64().unwrap_or(0.0));
                    return Ok(if v.is_finite() {
                        Some(Number::Float(b.map(v)))
                    } else {
                        None
                    });
                }
                if self.is_zero() {
                    return if e.is_negative() {
                        Err(NumericError::DivisionByZero)
                    } else {
                        Ok(Some(Number::zero()))
                    };
                }
                // b^(p/q): exact only when b has an exact q-th root.
                let (p, q) = (e.numer().clone(), e.denom().clone());
                let q32 = match q.to_u32() {
                    Some(q) => q,
                    None => return Ok(None),
                };
                let base = match self.as_rational() {
                    Some(b) => b,
                    None => return Ok(None),
                };
                // Square roots of negatives are exact on the imaginary
                // axis: (-4)^(1/2) = 2*I.
                if base.is_negative() && q32 == 2 {
                    let root = match (int_nth_root(&-base.numer(), 2), int_nth_root(base.denom(), 2))
                    {
                        (Some(n), Some(d)) => BigRational::new(n, d),
                        _ => return Ok(None),
                    };
                    return Self::from_complex(Complex::new(BigRational::zero(), root))
                        .pow_int(&p)
                        .map(Some);
                }
                let root_num = match int_nth_root(base.numer(), q32) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let root_den = match int_nth_root(base.denom(), q32) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                Self::from_rational(BigRational::new(root_num, root_den))
                    .pow_int(&p)
                    .map(Some)
            }
            Number::Complex(_) => Ok(None),
        }
    }

    /// GCD in the rational sense: `gcd(na, nb) / lcm(da, db)` for exact
    /// rationals, 1 otherwise. Used for integer contents.
    pub fn gcd(&self, rhs: &Number) -> Number {
        match (self.as_rational(), rhs.as_rational()) {
            (Some(a), Some(b)) => {
                if a.is_zero() {
                    return rhs.abs();
                }
                if b.is_zero() {
                    return self.abs();
                }
                let num = a.numer().gcd(b.numer());
                let den = a.denom().lcm(b.denom());
                Self::from_rational(BigRational::new(num, den))
            }
            _ => Number::one(),
        }
    }

    pub fn lcm(&self, rhs: &Number) -> Number {
        match (self.as_integer(), rhs.as_integer()) {
            (Some(a), Some(b)) => Number::Integer(a.lcm(b)),
            _ => self.mul(rhs),
        }
    }

    // --- ordering -------------------------------------------------------

    /// Total order suitable for canonical sorting: reals by value with
    /// exact-before-float as a tie break, complexes after all reals,
    /// ordered lexicographically by (re, im).
    pub fn cmp_values(&self, rhs: &Number) -> Ordering {
        use Number::*;
        match (self, rhs) {
            (Complex(a), Complex(b)) => a.re.cmp(&b.re).then_with(|| a.im.cmp(&b.im)),
            (Complex(_), _) => Ordering::Greater,
            (_, Complex(_)) => Ordering::Less,
            (Float(a), Float(b)) => a.cmp(b),
            (Float(a), b) => a
                .value()
                .total_cmp(&b.to_f64().unwrap_or(0.0))
                .then(Ordering::Greater),
            (a, Float(b)) => a
                .to_f64()
                .unwrap_or(0.0)
                .total_cmp(&b.value())
                .then(Ordering::Less),
            (a, b) => match (a.as_rational(), b.as_rational()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => unreachable!("exact real operands"),
            },
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::zero()
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<u32> for Number {
    fn from(v: u32) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Number {
    fn from(v: BigInt) -> Self {
        Number::Integer(v)
    }
}

impl From<BigRational> for Number {
    fn from(v: BigRational) -> Self {
        Number::from_rational(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::float(v)
    }
}

impl From<(i64, i64)> for Number {
    fn from((n, d): (i64, i64)) -> Self {
        Number::from_rational(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Rational(r) => write!(f, "{r}"),
            Number::Float(x) => write!(f, "{x}"),
            Number::Complex(c) => {
                if !c.re.is_zero() {
                    write!(f, "{}", c.re)?;
                    if c.im.is_positive() {
                        write!(f, "+")?;
                    }
                }
                if c.im.is_one() {
                    write!(f, "I")
                } else if (-&c.im).is_one() {
                    write!(f, "-I")
                } else {
                    write!(f, "{}*I", c.im)
                }
            }
        }
    }
}

/// Exact integer `k`-th root: `Some(r)` iff `r^k == n` exactly.
///
/// Negative `n` admits a root only for odd `k`.
pub fn int_nth_root(n: &BigInt, k: u32) -> Option<BigInt> {
    if k == 0 {
        return None;
    }
    if n.is_negative() {
        if k % 2 == 0 {
            return None;
        }
        return int_nth_root(&-n, k).map(|r| -r);
    }
    let r = n.nth_root(k);
    if r.pow(k) == *n {
        Some(r)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Number {
        Number::from((n, d))
    }

    #[test]
    fn rational_normalizes_to_integer() {
        assert_eq!(q(4, 2), Number::from(2));
        assert!(q(4, 2).is_integer());
        assert!(q(3, 2).is_rational());
        assert!(!q(3, 2).is_integer());
    }

    #[test]
    fn complex_collapses_when_real() {
        let c = Number::complex(BigRational::from_integer(3.into()), BigRational::zero());
        assert_eq!(c, Number::from(3));
        let i = Number::imaginary_unit();
        assert!(!i.is_real());
        // I * I = -1
        assert_eq!(i.mul(&i), Number::minus_one());
    }

    #[test]
    fn float_is_contagious() {
        let x = Number::from(2).add(&Number::float(0.5));
        assert!(matches!(x, Number::Float(_)));
        assert_eq!(x.to_f64(), Some(2.5));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(
            Number::one().try_div(&Number::zero()),
            Err(NumericError::DivisionByZero)
        );
        assert_eq!(
            Number::zero().pow(&Number::minus_one()),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn exact_powers() {
        assert_eq!(
            Number::from(2).pow(&Number::from(10)).unwrap(),
            Some(Number::from(1024))
        );
        assert_eq!(
            Number::from(2).pow(&Number::from(-2)).unwrap(),
            Some(q(1, 4))
        );
        // 4^(1/2) has an exact root, 2^(1/2) does not.
        assert_eq!(Number::from(4).pow(&q(1, 2)).unwrap(), Some(Number::from(2)));
        assert_eq!(Number::from(2).pow(&q(1, 2)).unwrap(), None);
        assert_eq!(Number::from(8).pow(&q(2, 3)).unwrap(), Some(Number::from(4)));
        assert_eq!(Number::from(-8).pow(&q(1, 3)).unwrap(), Some(Number::from(-2)));
        // Negative square roots land on the imaginary axis.
        assert_eq!(
            Number::from(-4).pow(&q(1, 2)).unwrap(),
            Some(Number::complex(
                BigRational::zero(),
                BigRational::from_integer(2.into())
            ))
        );
        assert_eq!(Number::from(-2).pow(&q(1, 2)).unwrap(), None);
    }

    #[test]
    fn gcd_of_rationals() {
        assert_eq!(Number::from(12).gcd(&Number::from(18)), Number::from(6));
        assert_eq!(q(1, 2).gcd(&q(1, 3)), q(1, 6));
        assert_eq!(Number::zero().gcd(&Number::from(-5)), Number::from(5));
    }

    #[test]
    fn value_order_is_total() {
        assert_eq!(Number::from(1).cmp_values(&Number::from(2)), Ordering::Less);
        assert_eq!(q(3, 2).cmp_values(&Number::from(1)), Ordering::Greater);
        // Exact sorts before the float of the same value.
        assert_eq!(
            Number::from(2).cmp_values(&Number::float(2.0)),
            Ordering::Less
        );
        // Complexes after all reals.
        assert_eq!(
            Number::float(1e300).cmp_values(&Number::imaginary_unit()),
            Ordering::Less
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(Number::from(-3).to_string(), "-3");
        assert_eq!(q(3, 2).to_string(), "3/2");
        assert_eq!(Number::float(2.0).to_string(), "2.0");
        assert_eq!(Number::imaginary_unit().to_string(), "I");
        let z = Number::complex(
            BigRational::from_integer(1.into()),
            BigRational::from_integer((-2).into()),
        );
        assert_eq!(z.to_string(), "1-2*I");
    }

    #[test]
    fn numer_denom_complex() {
        let z = Number::complex(
            BigRational::new(1.into(), 2.into()),
            BigRational::new(1.into(), 3.into()),
        );
        assert_eq!(z.denom(), Number::from(6));
        let n = z.numer();
        assert_eq!(
            n,
            Number::complex(
                BigRational::from_integer(3.into()),
                BigRational::from_integer(2.into())
            )
        );
    }
}
