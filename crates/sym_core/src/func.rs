//! The named-function registry and function-application nodes.
//!
//! A function node carries only a serial into the process-wide
//! registry plus its argument list. The registry maps each serial to a
//! record of optional callbacks: a symbolic simplifier, a numeric
//! evaluator, and a derivative. It is populated with the built-in
//! functions on first use and is append-only afterwards.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use sym_num::Number;

use crate::error::{KernelError, Result};
use crate::node::{flags, Kind};
use crate::Ex;

/// A function application: registry serial + ordered arguments.
#[derive(Clone, Debug)]
pub struct FuncCall {
    serial: usize,
    args: SmallVec<[Ex; 2]>,
}

impl FuncCall {
    #[inline]
    pub fn serial(&self) -> usize {
        self.serial
    }

    #[inline]
    pub fn args(&self) -> &[Ex] {
        &self.args
    }

    /// The registered name of this function.
    pub fn name(&self) -> String {
        with_registry(|r| {
            r.defs
                .get(self.serial)
                .map(|d| d.name.to_string())
                .unwrap_or_else(|| format!("function#{}", self.serial))
        })
    }
}

/// Symbolic simplifier: `Some(e)` rewrites the application to `e`.
pub type EvalHook = fn(&[Ex]) -> Option<Ex>;
/// Numeric evaluator over real float arguments.
pub type EvalfHook = fn(&[f64]) -> f64;
/// Derivative of the function body with respect to argument `i`
/// (the chain-rule factor is applied by the caller).
pub type DiffHook = fn(&[Ex], usize) -> Result<Ex>;

/// One registry record.
pub struct FuncDef {
    pub name: &'static str,
    pub arity: usize,
    pub eval: Option<EvalHook>,
    pub evalf: Option<EvalfHook>,
    pub diff: Option<DiffHook>,
}

struct Registry {
    defs: Vec<FuncDef>,
    by_name: FxHashMap<&'static str, usize>,
}

impl Registry {
    fn register(&mut self, def: FuncDef) -> usize {
        let serial = self.defs.len();
        self.by_name.insert(def.name, serial);
        self.defs.push(def);
        serial
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry {
        defs: Vec::new(),
        by_name: FxHashMap::default(),
    });
}

fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    REGISTRY.with(|cell| {
        if cell.borrow().defs.is_empty() {
            register_builtins(&mut cell.borrow_mut());
        }
        f(&cell.borrow())
    })
}

/// Register a new function; returns its serial. Append-only.
pub fn register_function(def: FuncDef) -> usize {
    REGISTRY.with(|cell| {
        if cell.borrow().defs.is_empty() {
            register_builtins(&mut cell.borrow_mut());
        }
        cell.borrow_mut().register(def)
    })
}

/// Serial of a registered function name.
pub fn lookup_function(name: &str) -> Option<usize> {
    with_registry(|r| r.by_name.get(name).copied())
}

/// Name of a registered serial.
pub fn function_name(serial: usize) -> Result<String> {
    with_registry(|r| {
        r.defs
            .get(serial)
            .map(|d| d.name.to_string())
            .ok_or(KernelError::Range {
                what: "function registry",
                index: serial,
            })
    })
}

/// Run `f` over the registered derivative hook of `serial`, if any.
pub(crate) fn with_diff_hook<R>(
    serial: usize,
    f: impl FnOnce(DiffHook) -> R,
) -> Result<Option<R>> {
    let hook = with_registry(|r| {
        r.defs
            .get(serial)
            .map(|d| d.diff)
            .ok_or(KernelError::Range {
                what: "function registry",
                index: serial,
            })
    })?;
    Ok(hook.map(f))
}

/// Build a function application by name.
///
/// Applies the registered symbolic simplifier, then eager float
/// evaluation when every argument is an inexact real. Arity mismatch
/// is `invalid_argument`; unknown names are `UnknownFunction`.
pub fn fcall(name: &str, args: Vec<Ex>) -> Result<Ex> {
    let serial =
        lookup_function(name).ok_or_else(|| KernelError::UnknownFunction(name.to_string()))?;
    fcall_serial(serial, args)
}

/// Build a function application by registry serial.
pub fn fcall_serial(serial: usize, args: Vec<Ex>) -> Result<Ex> {
    let (arity, eval, evalf, name) = with_registry(|r| {
        r.defs
            .get(serial)
            .map(|d| (d.arity, d.eval, d.evalf, d.name))
            .ok_or(KernelError::Range {
                what: "function registry",
                index: serial,
            })
    })?;
    if args.len() != arity {
        return Err(KernelError::InvalidArgument(format!(
            "{name} expects {arity} argument(s), got {}",
            args.len()
        )));
    }
    if let Some(hook) = eval {
        if let Some(e) = hook(&args) {
            return Ok(e);
        }
    }
    if let Some(hook) = evalf {
        if let Some(vals) = float_args(&args) {
            let prec = args
                .iter()
                .filter_map(|a| match a.kind() {
                    Kind::Num(Number::Float(f)) => Some(f.prec()),
                    _ => None,
                })
                .max();
            return Ok(Ex::num(Number::float(hook(&vals)).to_float(prec)));
        }
    }
    Ok(Ex::new_node(
        Kind::Func(FuncCall {
            serial,
            args: args.into(),
        }),
        flags::EVALUATED,
    ))
}

/// All arguments as floats, provided every one is an inexact real.
fn float_args(args: &[Ex]) -> Option<Vec<f64>> {
    args.iter()
        .map(|a| match a.kind() {
            Kind::Num(n @ Number::Float(_)) => n.to_f64(),
            _ => None,
        })
        .collect()
}

/// Convenience constructor for a known built-in. Falls back to an
/// inert failure node if the registry was somehow corrupted.
pub(crate) fn builtin(name: &'static str, args: Vec<Ex>) -> Ex {
    match fcall(name, args) {
        Ok(e) => e,
        Err(_) => Ex::fail(),
    }
}

impl Ex {
    /// Function application by name, e.g. `Ex::func("sin", vec![x])`.
    pub fn func(name: &str, args: Vec<Ex>) -> Result<Ex> {
        fcall(name, args)
    }
}

// --- built-ins ----------------------------------------------------------

/// Is `e` an application of the named built-in? Returns its argument.
fn match_unary(e: &Ex, name: &str) -> Option<Ex> {
    if let Kind::Func(f) = e.kind() {
        if f.args.len() == 1 && lookup_function(name) == Some(f.serial) {
            return Some(f.args[0].clone());
        }
    }
    None
}

fn num_arg(args: &[Ex], i: usize) -> Option<&Number> {
    args.get(i).and_then(|a| a.as_number())
}

fn register_builtins(r: &mut Registry) {
    fn inv(e: &Ex) -> Result<Ex> {
        e.try_pow(&Ex::minus_one())
    }

    r.register(FuncDef {
        name: "sin",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].sin()),
        diff: Some(|args, _| Ok(builtin("cos", vec![args[0].clone()]))),
    });
    r.register(FuncDef {
        name: "cos",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::one())),
        evalf: Some(|v| v[0].cos()),
        diff: Some(|args, _| Ok(-builtin("sin", vec![args[0].clone()]))),
    });
    r.register(FuncDef {
        name: "tan",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].tan()),
        // tan' = 1 + tan^2
        diff: Some(|args, _| {
            let t = builtin("tan", vec![args[0].clone()]);
            Ok(Ex::one() + t.pow(2))
        }),
    });
    r.register(FuncDef {
        name: "exp",
        arity: 1,
        eval: Some(|args| {
            if num_arg(args, 0).is_some_and(|n| n.is_zero()) {
                return Some(Ex::one());
            }
            match_unary(&args[0], "log")
        }),
        evalf: Some(|v| v[0].exp()),
        diff: Some(|args, _| Ok(builtin("exp", vec![args[0].clone()]))),
    });
    r.register(FuncDef {
        name: "log",
        arity: 1,
        eval: Some(|args| {
            if args[0].is_one() {
                return Some(Ex::zero());
            }
            match_unary(&args[0], "exp")
        }),
        evalf: Some(|v| v[0].ln()),
        diff: Some(|args, _| inv(&args[0])),
    });
    r.register(FuncDef {
        name: "abs",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_real()).map(|n| Ex::num(n.abs()))),
        evalf: Some(|v| v[0].abs()),
        diff: None,
    });
    r.register(FuncDef {
        name: "asin",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].asin()),
        // asin' = (1 - x^2)^(-1/2)
        diff: Some(|args, _| {
            (Ex::one() - args[0].pow(2)).try_pow(&Ex::num(Number::minus_half()))
        }),
    });
    r.register(FuncDef {
        name: "acos",
        arity: 1,
        eval: None,
        evalf: Some(|v| v[0].acos()),
        diff: Some(|args, _| {
            Ok(-((Ex::one() - args[0].pow(2)).try_pow(&Ex::num(Number::minus_half()))?))
        }),
    });
    r.register(FuncDef {
        name: "atan",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].atan()),
        diff: Some(|args, _| inv(&(Ex::one() + args[0].pow(2)))),
    });
    r.register(FuncDef {
        name: "sinh",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].sinh()),
        diff: Some(|args, _| Ok(builtin("cosh", vec![args[0].clone()]))),
    });
    r.register(FuncDef {
        name: "cosh",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::one())),
        evalf: Some(|v| v[0].cosh()),
        diff: Some(|args, _| Ok(builtin("sinh", vec![args[0].clone()]))),
    });
    r.register(FuncDef {
        name: "tanh",
        arity: 1,
        eval: Some(|args| num_arg(args, 0).filter(|n| n.is_zero()).map(|_| Ex::zero())),
        evalf: Some(|v| v[0].tanh()),
        // tanh' = 1 - tanh^2
        diff: Some(|args, _| {
            let t = builtin("tanh", vec![args[0].clone()]);
            Ok(Ex::one() - t.pow(2))
        }),
    });
    // Truncation-order marker of power series.
    r.register(FuncDef {
        name: "Order",
        arity: 1,
        eval: Some(|args| args[0].is_zero().then(Ex::zero)),
        evalf: None,
        diff: None,
    });
    // Inert placeholder for derivatives with no registered rule.
    r.register(FuncDef {
        name: "Derivative",
        arity: 2,
        eval: None,
        evalf: None,
        diff: None,
    });
}
