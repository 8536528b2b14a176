//! Per-kind archiving hooks and name-dispatched reconstruction.
//!
//! Every node serializes to a `class` string plus the properties its
//! kind needs to be rebuilt; reconstruction goes through the ordinary
//! canonicalizing constructors, so an unarchived tree is canonical by
//! construction.

use std::str::FromStr;

use sym_core::{Ex, Kind, RelOp, SeriesData};
use sym_num::Number;

use crate::{Archive, ArchiveError, Property, Result};

/// Property payload type, stored in the low 3 bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PropType {
    Bool = 0,
    Unsigned = 1,
    String = 2,
    Node = 3,
}

impl PropType {
    pub(crate) fn from_bits(v: u32) -> Option<Self> {
        Some(match v {
            0 => PropType::Bool,
            1 => PropType::Unsigned,
            2 => PropType::String,
            3 => PropType::Node,
            _ => return None,
        })
    }
}

/// Builder for one node's property bag.
struct Props<'a> {
    ar: &'a mut Archive,
    out: Vec<Property>,
}

impl<'a> Props<'a> {
    fn add_unsigned(&mut self, name: &str, value: u32) {
        let name = self.ar.atomize(name);
        self.out.push(Property {
            name,
            ty: PropType::Unsigned,
            value,
        });
    }

    fn add_string(&mut self, name: &str, value: &str) {
        let name = self.ar.atomize(name);
        let value = self.ar.atomize(value);
        self.out.push(Property {
            name,
            ty: PropType::String,
            value,
        });
    }

    fn add_ex(&mut self, name: &str, value: &Ex) -> Result<()> {
        let id = self.ar.add_node(value)?;
        let name = self.ar.atomize(name);
        self.out.push(Property {
            name,
            ty: PropType::Node,
            value: id,
        });
        Ok(())
    }
}

pub(crate) fn archive_props(ar: &mut Archive, e: &Ex) -> Result<Vec<Property>> {
    let mut p = Props { ar, out: Vec::new() };
    match e.kind() {
        Kind::Num(n) => {
            p.add_string("class", "numeric");
            match n {
                Number::Complex(c) => {
                    p.add_string("re", &c.re.to_string());
                    p.add_string("im", &c.im.to_string());
                }
                _ => p.add_string("value", &n.to_string()),
            }
        }
        Kind::Sym(s) => {
            p.add_string("class", "symbol");
            p.add_string("name", s.name());
            let serial = u32::try_from(s.serial()).map_err(|_| {
                ArchiveError::Malformed(format!("symbol serial {} too large", s.serial()))
            })?;
            p.add_unsigned("serial", serial);
        }
        Kind::Const(c) => {
            p.add_string("class", "constant");
            p.add_string("name", c.name());
        }
        Kind::Add(seq) | Kind::Mul(seq) => {
            let class = if matches!(e.kind(), Kind::Add(_)) {
                "add"
            } else {
                "mul"
            };
            p.add_string("class", class);
            for pair in seq.pairs() {
                p.add_ex("rest", pair.rest())?;
                p.add_ex("coeff", &Ex::num(pair.coeff().clone()))?;
            }
            p.add_ex("overall_coeff", &Ex::num(seq.overall().clone()))?;
        }
        Kind::NcMul(v) => {
            p.add_string("class", "ncmul");
            for f in v {
                p.add_ex("factor", f)?;
            }
        }
        Kind::Pow(pw) => {
            p.add_string("class", "power");
            p.add_ex("basis", pw.base())?;
            p.add_ex("exponent", pw.exponent())?;
        }
        Kind::Func(f) => {
            p.add_string("class", "function");
            p.add_string("name", &f.name());
            for a in f.args() {
                p.add_ex("arg", a)?;
            }
        }
        Kind::List(v) | Kind::Tuple(v) => {
            let class = if matches!(e.kind(), Kind::List(_)) {
                "list"
            } else {
                "tuple"
            };
            p.add_string("class", class);
            for x in v {
                p.add_ex("elem", x)?;
            }
        }
        Kind::Matrix(m) => {
            p.add_string("class", "matrix");
            p.add_unsigned("rows", m.rows() as u32);
            p.add_unsigned("cols", m.cols() as u32);
            for x in m.elems() {
                p.add_ex("elem", x)?;
            }
        }
        Kind::Rel(r) => {
            p.add_string("class", "relational");
            p.add_unsigned("op", r.op() as u32);
            p.add_ex("lhs", r.lhs())?;
            p.add_ex("rhs", r.rhs())?;
        }
        Kind::Series(s) => {
            p.add_string("class", "series");
            p.add_ex("var", s.var())?;
            p.add_ex("point", s.point())?;
            for (c, pw) in s.terms() {
                p.add_ex("coeff", c)?;
                p.add_ex("power", &Ex::from(*pw))?;
            }
            if let Some(o) = s.order() {
                p.add_ex("order", &Ex::from(o))?;
            }
        }
        Kind::Fail => {
            p.add_string("class", "fail");
        }
    }
    Ok(p.out)
}

// --- reconstruction -----------------------------------------------------

fn find_string(ar: &Archive, props: &[Property], name: &str) -> Result<Option<String>> {
    for p in props {
        if p.ty == PropType::String && ar.unatomize(p.name)? == name {
            return Ok(Some(ar.unatomize(p.value)?.to_string()));
        }
    }
    Ok(None)
}

fn find_unsigned(ar: &Archive, props: &[Property], name: &str) -> Result<Option<u32>> {
    for p in props {
        if p.ty == PropType::Unsigned && ar.unatomize(p.name)? == name {
            return Ok(Some(p.value));
        }
    }
    Ok(None)
}

fn node_list(
    ar: &Archive,
    props: &[Property],
    name: &str,
    sym_table: &[Ex],
) -> Result<Vec<Ex>> {
    let mut out = Vec::new();
    for p in props {
        if p.ty == PropType::Node && ar.unatomize(p.name)? == name {
            out.push(ar.unarchive_node(p.value, sym_table)?);
        }
    }
    Ok(out)
}

fn require<T>(v: Option<T>, what: &str) -> Result<T> {
    v.ok_or_else(|| ArchiveError::Malformed(format!("missing property `{what}`")))
}

fn parse_number(s: &str) -> Result<Number> {
    Number::from_str(s).map_err(|e| ArchiveError::Malformed(e.to_string()))
}

pub(crate) fn unarchive_props(
    ar: &Archive,
    props: &[Property],
    sym_table: &[Ex],
) -> Result<Ex> {
    let class = require(find_string(ar, props, "class")?, "class")?;
    match class.as_str() {
        "numeric" => {
            if let Some(re) = find_string(ar, props, "re")? {
                let im = require(find_string(ar, props, "im")?, "im")?;
                let re = rational_part(&re)?;
                let im = rational_part(&im)?;
                Ok(Ex::num(Number::complex(re, im)))
            } else {
                let value = require(find_string(ar, props, "value")?, "value")?;
                Ok(Ex::num(parse_number(&value)?))
            }
        }
        "symbol" => {
            let name = require(find_string(ar, props, "name")?, "name")?;
            for s in sym_table {
                if s.as_symbol().is_some_and(|sym| sym.name() == name) {
                    return Ok(s.clone());
                }
            }
            Ok(Ex::symbol(&name))
        }
        "constant" => {
            let name = require(find_string(ar, props, "name")?, "name")?;
            let c = sym_core::Constant::by_name(&name)
                .ok_or_else(|| ArchiveError::Malformed(format!("unknown constant `{name}`")))?;
            Ok(Ex::constant(c.kind()))
        }
        "add" | "mul" => {
            let rests = node_list(ar, props, "rest", sym_table)?;
            let coeffs = node_list(ar, props, "coeff", sym_table)?;
            if rests.len() != coeffs.len() {
                return Err(ArchiveError::Malformed(
                    "pair sequence with mismatched rests and coeffs".into(),
                ));
            }
            let overall = require(
                node_list(ar, props, "overall_coeff", sym_table)?.into_iter().next(),
                "overall_coeff",
            )?;
            let mut ops = Vec::with_capacity(rests.len() + 1);
            for (rest, coeff) in rests.into_iter().zip(coeffs) {
                ops.push(if class == "add" {
                    coeff * rest
                } else {
                    rest.try_pow(&coeff)?
                });
            }
            ops.push(overall);
            Ok(if class == "add" {
                Ex::add_vec(ops)
            } else {
                Ex::mul_vec(ops)
            })
        }
        "ncmul" => Ok(Ex::nc_mul_vec(node_list(ar, props, "factor", sym_table)?)),
        "power" => {
            let basis = require(
                node_list(ar, props, "basis", sym_table)?.into_iter().next(),
                "basis",
            )?;
            let exponent = require(
                node_list(ar, props, "exponent", sym_table)?.into_iter().next(),
                "exponent",
            )?;
            Ok(basis.try_pow(&exponent)?)
        }
        "function" => {
            let name = require(find_string(ar, props, "name")?, "name")?;
            let args = node_list(ar, props, "arg", sym_table)?;
            Ok(sym_core::fcall(&name, args)?)
        }
        "list" => Ok(Ex::list(node_list(ar, props, "elem", sym_table)?)),
        "tuple" => Ok(Ex::tuple(node_list(ar, props, "elem", sym_table)?)),
        "matrix" => {
            let rows = require(find_unsigned(ar, props, "rows")?, "rows")? as usize;
            let cols = require(find_unsigned(ar, props, "cols")?, "cols")? as usize;
            let elems = node_list(ar, props, "elem", sym_table)?;
            Ok(Ex::matrix(rows, cols, elems)?)
        }
        "relational" => {
            let op = require(find_unsigned(ar, props, "op")?, "op")?;
            let op = u8::try_from(op)
                .ok()
                .and_then(RelOp::from_u8)
                .ok_or_else(|| ArchiveError::Malformed(format!("relational op {op}")))?;
            let lhs = require(
                node_list(ar, props, "lhs", sym_table)?.into_iter().next(),
                "lhs",
            )?;
            let rhs = require(
                node_list(ar, props, "rhs", sym_table)?.into_iter().next(),
                "rhs",
            )?;
            Ok(Ex::relational(lhs, rhs, op))
        }
        "series" => {
            let var = require(
                node_list(ar, props, "var", sym_table)?.into_iter().next(),
                "var",
            )?;
            let point = require(
                node_list(ar, props, "point", sym_table)?.into_iter().next(),
                "point",
            )?;
            let coeffs = node_list(ar, props, "coeff", sym_table)?;
            let powers = node_list(ar, props, "power", sym_table)?;
            if coeffs.len() != powers.len() {
                return Err(ArchiveError::Malformed(
                    "series with mismatched coeffs and powers".into(),
                ));
            }
            let mut terms = Vec::with_capacity(coeffs.len());
            for (c, pw) in coeffs.into_iter().zip(powers) {
                terms.push((c, int_value(&pw)?));
            }
            let order = match node_list(ar, props, "order", sym_table)?.into_iter().next() {
                Some(o) => Some(int_value(&o)?),
                None => None,
            };
            Ok(Ex::from_series(SeriesData::new(var, point, terms, order)?))
        }
        "fail" => Ok(Ex::fail()),
        other => Err(ArchiveError::UnknownClass(other.to_string())),
    }
}

fn rational_part(s: &str) -> Result<num_rational::BigRational> {
    parse_number(s)?
        .as_rational()
        .ok_or_else(|| ArchiveError::Malformed(format!("`{s}` is not a rational part")))
}

fn int_value(e: &Ex) -> Result<i64> {
    e.as_number()
        .and_then(Number::to_i64)
        .ok_or_else(|| ArchiveError::Malformed(format!("`{e}` is not a small integer")))
}
