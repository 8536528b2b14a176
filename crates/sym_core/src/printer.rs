//! The default text form.
//!
//! Sums print as `a+b-c` with unary minus folded into coefficients,
//! products as `a*b*c` with the numeric coefficient leading, powers as
//! `a^b`. A child is parenthesized iff its precedence is less than or
//! equal to the surrounding precedence.

use std::fmt;

use sym_num::Number;

use crate::node::Kind;
use crate::seq::PairSeq;
use crate::Ex;

const PREC_REL: u8 = 5;
const PREC_ADD: u8 = 10;
const PREC_MUL: u8 = 20;
const PREC_POW: u8 = 30;
const PREC_ATOM: u8 = 40;

fn num_precedence(n: &Number) -> u8 {
    match n {
        Number::Integer(_) | Number::Float(_) => {
            if n.is_negative() {
                PREC_ADD
            } else {
                PREC_ATOM
            }
        }
        Number::Rational(_) => {
            if n.is_negative() {
                PREC_ADD
            } else {
                PREC_MUL
            }
        }
        Number::Complex(c) => {
            use num_traits::Zero;
            if !c.re.is_zero() {
                PREC_ADD
            } else {
                PREC_MUL
            }
        }
    }
}

fn precedence(e: &Ex) -> u8 {
    match e.kind() {
        Kind::Num(n) => num_precedence(n),
        Kind::Add(_) | Kind::Series(_) => PREC_ADD,
        Kind::Mul(_) | Kind::NcMul(_) => PREC_MUL,
        Kind::Pow(_) => PREC_POW,
        Kind::Rel(_) => PREC_REL,
        _ => PREC_ATOM,
    }
}

impl fmt::Display for Ex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ex(f, self, 0)
    }
}

fn write_ex(f: &mut fmt::Formatter<'_>, e: &Ex, upper: u8) -> fmt::Result {
    if precedence(e) <= upper {
        write!(f, "(")?;
        write_inner(f, e)?;
        write!(f, ")")
    } else {
        write_inner(f, e)
    }
}

fn write_inner(f: &mut fmt::Formatter<'_>, e: &Ex) -> fmt::Result {
    match e.kind() {
        Kind::Num(n) => write!(f, "{n}"),
        Kind::Sym(s) => write!(f, "{}", s.name()),
        Kind::Const(c) => write!(f, "{}", c.name()),
        Kind::Fail => write!(f, "FAIL"),
        Kind::Add(seq) => write_sum(f, seq),
        Kind::Mul(seq) => write_product(f, seq),
        Kind::NcMul(v) => {
            for (i, x) in v.iter().enumerate() {
                if i > 0 {
                    write!(f, "*")?;
                }
                write_ex(f, x, PREC_MUL)?;
            }
            Ok(())
        }
        Kind::Pow(p) => {
            write_ex(f, p.base(), PREC_POW)?;
            write!(f, "^")?;
            write_ex(f, p.exponent(), PREC_POW)
        }
        Kind::Func(fc) => {
            write!(f, "{}(", fc.name())?;
            for (i, a) in fc.args().iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write_ex(f, a, 0)?;
            }
            write!(f, ")")
        }
        Kind::List(v) => write_seq(f, v, "[", "]"),
        Kind::Tuple(v) => write_seq(f, v, "(", ")"),
        Kind::Matrix(m) => {
            write!(f, "[")?;
            for r in 0..m.rows() {
                if r > 0 {
                    write!(f, ",")?;
                }
                let row = &m.elems()[r * m.cols()..(r + 1) * m.cols()];
                write_seq(f, row, "[", "]")?;
            }
            write!(f, "]")
        }
        Kind::Rel(r) => {
            write_ex(f, r.lhs(), PREC_REL)?;
            write!(f, "{}", r.op().as_str())?;
            write_ex(f, r.rhs(), PREC_REL)
        }
        Kind::Series(s) => write_ex(f, &s.to_ex(), 0),
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, elems: &[Ex], open: &str, close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, x) in elems.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write_ex(f, x, 0)?;
    }
    write!(f, "{close}")
}

fn write_sum(f: &mut fmt::Formatter<'_>, seq: &PairSeq) -> fmt::Result {
    for (i, p) in seq.pairs().iter().enumerate() {
        let c = p.coeff();
        if !c.is_real() {
            // Complex coefficients carry their own inner signs.
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "({c})*")?;
            write_ex(f, p.rest(), PREC_MUL)?;
            continue;
        }
        if c.is_negative() {
            write!(f, "-")?;
        } else if i > 0 {
            write!(f, "+")?;
        }
        let mag = c.abs();
        if mag.is_one() {
            write_ex(f, p.rest(), PREC_ADD)?;
        } else {
            write!(f, "{mag}*")?;
            write_ex(f, p.rest(), PREC_MUL)?;
        }
    }
    let o = seq.overall();
    if !o.is_zero() {
        if !o.is_real() {
            write!(f, "+({o})")?;
        } else if o.is_negative() {
            write!(f, "-{}", o.abs())?;
        } else {
            write!(f, "+{o}")?;
        }
    }
    Ok(())
}

fn write_product(f: &mut fmt::Formatter<'_>, seq: &PairSeq) -> fmt::Result {
    let o = seq.overall();
    if o.is_minus_one() {
        write!(f, "-")?;
    } else if !o.is_one() {
        if o.is_real() {
            write!(f, "{o}*")?;
        } else {
            write!(f, "({o})*")?;
        }
    }
    for (i, p) in seq.pairs().iter().enumerate() {
        if i > 0 {
            write!(f, "*")?;
        }
        if p.coeff().is_one() {
            write_ex(f, p.rest(), PREC_MUL)?;
        } else {
            write_ex(f, p.rest(), PREC_POW)?;
            write!(f, "^")?;
            write_ex(f, &Ex::num(p.coeff().clone()), PREC_POW)?;
        }
    }
    Ok(())
}

impl Ex {
    /// Indented structural dump for diagnostics.
    pub fn tree_string(&self) -> String {
        let mut out = String::new();
        tree_fmt(self, 0, &mut out);
        out
    }
}

fn tree_fmt(e: &Ex, indent: usize, out: &mut String) {
    use std::fmt::Write;
    let pad = "  ".repeat(indent);
    let label = match e.kind() {
        Kind::Num(n) => format!("num {n}"),
        Kind::Sym(s) => format!("symbol {} (serial {})", s.name(), s.serial()),
        Kind::Const(c) => format!("constant {}", c.name()),
        Kind::Add(s) => format!("add, overall {}", s.overall()),
        Kind::Mul(s) => format!("mul, overall {}", s.overall()),
        Kind::NcMul(_) => "ncmul".into(),
        Kind::Pow(_) => "power".into(),
        Kind::Func(fc) => format!("function {}", fc.name()),
        Kind::List(_) => "list".into(),
        Kind::Tuple(_) => "tuple".into(),
        Kind::Matrix(m) => format!("matrix {}x{}", m.rows(), m.cols()),
        Kind::Rel(r) => format!("relational {}", r.op().as_str()),
        Kind::Series(s) => format!(
            "series in {} about {}",
            s.var(),
            s.point()
        ),
        Kind::Fail => "fail".into(),
    };
    let _ = writeln!(out, "{pad}{label}, hash=0x{:016x}", e.hash_value());
    for c in e.children() {
        tree_fmt(&c, indent + 1, out);
    }
}
