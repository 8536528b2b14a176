//! Textual parsing of real numeric values.
//!
//! The archive stores real numbers in their display form; this module
//! reads them back. Gaussian rationals are persisted as their two real
//! parts and never round-trip through here.

use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use thiserror::Error;

use crate::{Float, Number};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse `{0}` as a number")]
pub struct ParseNumberError(pub String);

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseNumberError(s.to_string());
        if let Some((num, den)) = s.split_once('/') {
            let num = BigInt::from_str(num).map_err(|_| bad())?;
            let den = BigInt::from_str(den).map_err(|_| bad())?;
            if den == BigInt::from(0) {
                return Err(bad());
            }
            return Ok(Number::from_rational(BigRational::new(num, den)));
        }
        if s.contains(['.', 'e', 'E']) {
            let v = f64::from_str(s).map_err(|_| bad())?;
            return Ok(Number::Float(Float::new(v)));
        }
        BigInt::from_str(s)
            .map(Number::Integer)
            .map_err(|_| bad())
    }
}
