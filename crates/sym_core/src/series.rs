//! Truncated power series.
//!
//! A series node holds the expansion variable, the expansion point, a
//! sparse ascending list of `(coefficient, power)` pairs whose
//! coefficients are free of the variable, and an optional truncation
//! order standing for `O((x-point)^order)`. `order == None` marks an
//! exact (polynomial) series.
//!
//! Sums expand term-wise, products by Cauchy convolution, integer
//! powers by binary exponentiation with series inversion for negative
//! exponents; everything else falls back to Taylor expansion by
//! repeated differentiation.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use tracing::debug;

use sym_num::{Number, NumericError};

use crate::depth::descend;
use crate::error::{KernelError, Result};
use crate::func::builtin;
use crate::node::{flags, Kind};
use crate::Ex;

/// Payload of a series node.
#[derive(Clone, Debug)]
pub struct SeriesData {
    var: Ex,
    point: Ex,
    terms: Vec<(Ex, i64)>,
    order: Option<i64>,
}

impl SeriesData {
    /// Assemble a series from parts, validating the variable and the
    /// term ordering. Used by deserialization.
    pub fn new(var: Ex, point: Ex, terms: Vec<(Ex, i64)>, order: Option<i64>) -> Result<Self> {
        if var.as_symbol().is_none() {
            return Err(KernelError::InvalidArgument(
                "series variable must be a symbol".into(),
            ));
        }
        if terms.windows(2).any(|w| w[0].1 >= w[1].1) {
            return Err(KernelError::InvalidArgument(
                "series powers must be strictly ascending".into(),
            ));
        }
        Ok(Self {
            var,
            point,
            terms,
            order,
        })
    }

    #[inline]
    pub fn var(&self) -> &Ex {
        &self.var
    }

    #[inline]
    pub fn point(&self) -> &Ex {
        &self.point
    }

    #[inline]
    pub fn terms(&self) -> &[(Ex, i64)] {
        &self.terms
    }

    #[inline]
    pub fn order(&self) -> Option<i64> {
        self.order
    }

    fn ldegree(&self) -> i64 {
        self.terms
            .first()
            .map(|(_, p)| *p)
            .or(self.order)
            .unwrap_or(0)
    }

    /// `var - point`, the local variable of the expansion.
    fn local_var(&self) -> Ex {
        if self.point.is_zero() {
            self.var.clone()
        } else {
            &self.var - &self.point
        }
    }

    /// Convert back to an ordinary expression, with an `Order` term
    /// for truncated series.
    pub fn to_ex(&self) -> Ex {
        let x = self.local_var();
        let mut parts: Vec<Ex> = self
            .terms
            .iter()
            .map(|(c, p)| c * x.pow(*p))
            .collect();
        if let Some(o) = self.order {
            parts.push(builtin("Order", vec![x.pow(o)]));
        }
        Ex::add_vec(parts)
    }

    /// Rebuild with every coefficient mapped through `f`.
    pub(crate) fn map_coeffs(&self, mut f: impl FnMut(&Ex) -> Result<Ex>) -> Result<Ex> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (c, p) in &self.terms {
            let c = f(c)?;
            if !c.is_zero() {
                terms.push((c, *p));
            }
        }
        Ok(Ex::new_node(
            Kind::Series(SeriesData {
                var: self.var.clone(),
                point: self.point.clone(),
                terms,
                order: self.order,
            }),
            flags::EVALUATED,
        ))
    }

    /// Term-wise derivative.
    pub(crate) fn diff(&self, s: &Ex) -> Result<Ex> {
        if *s != self.var {
            return self.map_coeffs(|c| c.diff(s));
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for (c, p) in &self.terms {
            if *p == 0 {
                continue;
            }
            terms.push((c * Ex::from(*p), p - 1));
        }
        Ok(Ex::new_node(
            Kind::Series(SeriesData {
                var: self.var.clone(),
                point: self.point.clone(),
                terms,
                order: self.order.map(|o| o - 1),
            }),
            flags::EVALUATED,
        ))
    }
}

impl Ex {
    /// Wrap assembled series data into a node.
    pub fn from_series(sd: SeriesData) -> Ex {
        Ex::new_node(Kind::Series(sd), flags::EVALUATED)
    }

    /// Power-series expansion around `point`, truncated at
    /// `O((var - point)^order)`.
    pub fn series(&self, var: &Ex, point: &Ex, order: i64) -> Result<Ex> {
        if var.as_symbol().is_none() {
            return Err(KernelError::InvalidArgument(
                "series variable must be a symbol".into(),
            ));
        }
        let ctx = Ctx {
            var,
            point,
            order,
        };
        let sd = truncate(series_impl(self, &ctx, 0)?, order);
        Ok(Ex::new_node(Kind::Series(sd), flags::EVALUATED))
    }

    /// Unwrap a series node back to the ordinary expression form;
    /// identity on everything else.
    pub fn series_to_ex(&self) -> Ex {
        match self.kind() {
            Kind::Series(s) => s.to_ex(),
            _ => self.clone(),
        }
    }
}

struct Ctx<'a> {
    var: &'a Ex,
    point: &'a Ex,
    order: i64,
}

fn series_impl(e: &Ex, ctx: &Ctx<'_>, depth: usize) -> Result<SeriesData> {
    let depth = descend(depth, "series")?;
    if !e.has(ctx.var) {
        let terms = if e.is_zero() {
            Vec::new()
        } else {
            vec![(e.clone(), 0)]
        };
        return Ok(SeriesData {
            var: ctx.var.clone(),
            point: ctx.point.clone(),
            terms,
            order: None,
        });
    }
    if e == ctx.var {
        // x = point + (x - point)
        let mut terms = Vec::new();
        if !ctx.point.is_zero() {
            terms.push((ctx.point.clone(), 0));
        }
        terms.push((Ex::one(), 1));
        return Ok(SeriesData {
            var: ctx.var.clone(),
            point: ctx.point.clone(),
            terms,
            order: None,
        });
    }
    match e.kind() {
        Kind::Add(_) => {
            let mut acc = zero_series(ctx);
            for c in e.children() {
                let s = series_impl(&c, ctx, depth)?;
                acc = add_series(&acc, &s);
            }
            Ok(acc)
        }
        Kind::Mul(_) => {
            let mut acc = const_series(ctx, Ex::one());
            for c in e.children() {
                let s = series_impl(&c, ctx, depth)?;
                acc = mul_series(&acc, &s, ctx);
            }
            Ok(acc)
        }
        Kind::Pow(p) => {
            let n = match p.exponent().kind() {
                Kind::Num(k) if k.is_integer() => k.to_i64(),
                _ => None,
            };
            match n {
                Some(n) => {
                    let base = series_impl(p.base(), ctx, depth)?;
                    let base = if n < 0 { invert_series(&base, ctx)? } else { base };
                    Ok(pow_series(&base, n.unsigned_abs(), ctx))
                }
                None => taylor(e, ctx),
            }
        }
        Kind::Series(s) => {
            if s.var() == ctx.var && s.point() == ctx.point {
                Ok(truncate(s.clone(), ctx.order))
            } else {
                Err(KernelError::Domain(
                    "cannot re-expand a series in another variable or point".into(),
                ))
            }
        }
        Kind::Func(_) => taylor(e, ctx),
        _ => Err(KernelError::Domain(
            "expression kind has no power-series expansion".into(),
        )),
    }
}

fn zero_series(ctx: &Ctx<'_>) -> SeriesData {
    SeriesData {
        var: ctx.var.clone(),
        point: ctx.point.clone(),
        terms: Vec::new(),
        order: None,
    }
}

fn const_series(ctx: &Ctx<'_>, c: Ex) -> SeriesData {
    let terms = if c.is_zero() { Vec::new() } else { vec![(c, 0)] };
    SeriesData {
        var: ctx.var.clone(),
        point: ctx.point.clone(),
        terms,
        order: None,
    }
}

fn min_order(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

fn add_series(a: &SeriesData, b: &SeriesData) -> SeriesData {
    let order = min_order(a.order, b.order);
    let mut map: BTreeMap<i64, Vec<Ex>> = BTreeMap::new();
    for (c, p) in a.terms.iter().chain(&b.terms) {
        if order.is_some_and(|o| *p >= o) {
            continue;
        }
        map.entry(*p).or_default().push(c.clone());
    }
    let terms = map
        .into_iter()
        .filter_map(|(p, cs)| {
            let c = Ex::add_vec(cs);
            (!c.is_zero()).then_some((c, p))
        })
        .collect();
    SeriesData {
        var: a.var.clone(),
        point: a.point.clone(),
        terms,
        order,
    }
}

fn mul_series(a: &SeriesData, b: &SeriesData, ctx: &Ctx<'_>) -> SeriesData {
    // An exact zero annihilates; a truncated empty series keeps its
    // uncertainty.
    if (a.terms.is_empty() && a.order.is_none()) || (b.terms.is_empty() && b.order.is_none()) {
        return zero_series(ctx);
    }
    let order = min_order(
        a.order.map(|o| o + b.ldegree()),
        b.order.map(|o| o + a.ldegree()),
    );
    let mut map: BTreeMap<i64, Vec<Ex>> = BTreeMap::new();
    for (ca, pa) in &a.terms {
        for (cb, pb) in &b.terms {
            let p = pa + pb;
            if order.is_some_and(|o| p >= o) {
                continue;
            }
            map.entry(p).or_default().push(ca * cb);
        }
    }
    let terms = map
        .into_iter()
        .filter_map(|(p, cs)| {
            let c = Ex::add_vec(cs);
            (!c.is_zero()).then_some((c, p))
        })
        .collect();
    SeriesData {
        var: a.var.clone(),
        point: a.point.clone(),
        terms,
        order,
    }
}

fn pow_series(base: &SeriesData, n: u64, ctx: &Ctx<'_>) -> SeriesData {
    let mut acc = const_series(ctx, Ex::one());
    let mut sq = base.clone();
    let mut n = n;
    while n > 0 {
        if n & 1 == 1 {
            acc = mul_series(&acc, &sq, ctx);
        }
        n >>= 1;
        if n > 0 {
            sq = mul_series(&sq, &sq, ctx);
        }
    }
    acc
}

/// Multiplicative inverse of a series with a known leading term.
fn invert_series(s: &SeriesData, ctx: &Ctx<'_>) -> Result<SeriesData> {
    let Some((lead, p0)) = s.terms.first().cloned() else {
        return if s.order.is_none() {
            Err(KernelError::Arithmetic(NumericError::DivisionByZero))
        } else {
            Err(KernelError::Domain(
                "cannot invert a series with no known terms".into(),
            ))
        };
    };
    // Result runs over powers -p0 + j; stop at the weakest bound.
    let order = min_order(s.order.map(|o| o - 2 * p0), Some(ctx.order));
    let len = order.map(|o| o + p0).unwrap_or(ctx.order + p0);
    if len <= 0 {
        return Ok(SeriesData {
            var: s.var.clone(),
            point: s.point.clone(),
            terms: Vec::new(),
            order,
        });
    }
    // Relative coefficients a_j = coeff of power p0 + j.
    let a = |j: i64| -> Ex {
        s.terms
            .iter()
            .find(|(_, p)| *p == p0 + j)
            .map(|(c, _)| c.clone())
            .unwrap_or_else(Ex::zero)
    };
    let inv_lead = Ex::one().try_div(&lead)?;
    let mut b: Vec<Ex> = vec![inv_lead.clone()];
    for j in 1..len {
        let mut sum = Vec::new();
        for i in 1..=j {
            let ai = a(i);
            if ai.is_zero() {
                continue;
            }
            sum.push(ai * b[(j - i) as usize].clone());
        }
        let correction = Ex::add_vec(sum);
        b.push(-(inv_lead.clone() * correction));
    }
    let terms = b
        .into_iter()
        .enumerate()
        .filter_map(|(j, c)| (!c.is_zero()).then_some((c, -p0 + j as i64)))
        .collect();
    Ok(SeriesData {
        var: s.var.clone(),
        point: s.point.clone(),
        terms,
        order,
    })
}

/// Taylor expansion by repeated differentiation; the default for
/// functions and non-integer powers.
fn taylor(e: &Ex, ctx: &Ctx<'_>) -> Result<SeriesData> {
    debug!(order = ctx.order, "Taylor fallback for {e}");
    let mut terms = Vec::new();
    let mut d = e.clone();
    let mut factorial = BigInt::one();
    for k in 0..ctx.order.max(0) {
        if k > 0 {
            d = d.diff(ctx.var)?;
            factorial *= k;
        }
        let c = d.subs(ctx.var, ctx.point)?;
        if !c.is_zero() {
            let c = c * Ex::num(Number::from(BigRational::new(
                BigInt::one(),
                factorial.clone(),
            )));
            terms.push((c, k));
        }
    }
    Ok(SeriesData {
        var: ctx.var.clone(),
        point: ctx.point.clone(),
        terms,
        order: Some(ctx.order),
    })
}

fn truncate(mut s: SeriesData, order: i64) -> SeriesData {
    // Exact series that fit the request stay exact.
    if s.order.is_none() && s.terms.iter().all(|(_, p)| *p < order) {
        return s;
    }
    let target = min_order(s.order, Some(order));
    if let Some(o) = target {
        s.terms.retain(|(_, p)| *p < o);
    }
    s.order = target;
    s
}
