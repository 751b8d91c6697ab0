use crate::utils::ast::{parenthesize_operand, BinOp};
use crate::utils::pprint::*;
use crate::utils::smap::SFold;

use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Builtin {
    Min, Max, FloorDiv
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::FloorDiv => "floord",
        }
    }

    pub fn macro_definition(&self) -> &'static str {
        match self {
            Builtin::Min => "#define min(x,y)    ((x) < (y) ? (x) : (y))",
            Builtin::Max => "#define max(x,y)    ((x) > (y) ? (x) : (y))",
            Builtin::FloorDiv => {
                "#define floord(n,d) (((n)<0) ? -((-(n)+(d)-1)/(d)) : (n)/(d))"
            },
        }
    }
}

// A quasi-affine expression over the symbolic parameters and the iterators of the schedule, as
// produced by the scheduler for loop bounds, guards, grid sizes and array extents.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int {v: i64},
    Id {id: String},
    Neg {arg: Box<Expr>},
    BinOp {lhs: Box<Expr>, op: BinOp, rhs: Box<Expr>},
    Call {func: Builtin, args: Vec<Expr>},
    Select {cond: Box<Expr>, thn: Box<Expr>, els: Box<Expr>},
}

impl Expr {
    pub fn int(v: i64) -> Expr {
        Expr::Int {v}
    }

    pub fn id(s: &str) -> Expr {
        Expr::Id {id: s.to_string()}
    }

    pub fn neg(arg: Expr) -> Expr {
        Expr::Neg {arg: Box::new(arg)}
    }

    pub fn binop(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Expr::BinOp {lhs: Box::new(lhs), op, rhs: Box::new(rhs)}
    }

    pub fn call(func: Builtin, args: Vec<Expr>) -> Expr {
        Expr::Call {func, args}
    }

    pub fn select(cond: Expr, thn: Expr, els: Expr) -> Expr {
        Expr::Select {cond: Box::new(cond), thn: Box::new(thn), els: Box::new(els)}
    }

    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Expr::Int {v} => Some(*v),
            _ => None
        }
    }

    // Evaluates the expression if it does not depend on any parameter or iterator. Division and
    // remainder follow C semantics; a division by zero makes the expression non-constant.
    pub fn eval_const(&self) -> Option<i64> {
        match self {
            Expr::Int {v} => Some(*v),
            Expr::Id {..} => None,
            Expr::Neg {arg} => arg.eval_const()?.checked_neg(),
            Expr::BinOp {lhs, op, rhs} => {
                let l = lhs.eval_const()?;
                let r = rhs.eval_const()?;
                eval_binop(l, op, r)
            },
            Expr::Call {func, args} => {
                let vals = args.iter()
                    .map(|e| e.eval_const())
                    .collect::<Option<Vec<i64>>>()?;
                match func {
                    Builtin::Min => vals.into_iter().min(),
                    Builtin::Max => vals.into_iter().max(),
                    Builtin::FloorDiv => match &vals[..] {
                        [n, d] => floor_div(*n, *d),
                        _ => None
                    },
                }
            },
            Expr::Select {cond, thn, els} => {
                if cond.eval_const()? != 0 {
                    thn.eval_const()
                } else {
                    els.eval_const()
                }
            },
        }
    }

    pub fn used_builtins(&self) -> BTreeSet<Builtin> {
        collect_builtins(BTreeSet::new(), self)
    }
}

fn floor_div(n: i64, d: i64) -> Option<i64> {
    let q = n.checked_div_euclid(d)?;
    if d < 0 && n.rem_euclid(d) != 0 {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn eval_binop(l: i64, op: &BinOp, r: i64) -> Option<i64> {
    let b = |v: bool| Some(if v { 1 } else { 0 });
    match op {
        BinOp::Add => l.checked_add(r),
        BinOp::Sub => l.checked_sub(r),
        BinOp::Mul => l.checked_mul(r),
        BinOp::Div => l.checked_div(r),
        BinOp::Rem => l.checked_rem(r),
        BinOp::Eq => b(l == r),
        BinOp::Neq => b(l != r),
        BinOp::Leq => b(l <= r),
        BinOp::Geq => b(l >= r),
        BinOp::Lt => b(l < r),
        BinOp::Gt => b(l > r),
        BinOp::And => b(l != 0 && r != 0),
        BinOp::Or => b(l != 0 || r != 0),
    }
}

pub fn collect_builtins(mut acc: BTreeSet<Builtin>, e: &Expr) -> BTreeSet<Builtin> {
    if let Expr::Call {func, ..} = e {
        acc.insert(*func);
    }
    e.sfold(acc, collect_builtins)
}

impl SFold<Expr> for Expr {
    fn sfold_result<A, E>(
        &self,
        acc: Result<A, E>,
        f: impl Fn(A, &Expr) -> Result<A, E>
    ) -> Result<A, E> {
        match self {
            Expr::Int {..} | Expr::Id {..} => acc,
            Expr::Neg {arg} => f(acc?, arg),
            Expr::BinOp {lhs, rhs, ..} => f(f(acc?, lhs)?, rhs),
            Expr::Call {args, ..} => args.sfold_result(acc, f),
            Expr::Select {cond, thn, els} => f(f(f(acc?, cond)?, thn)?, els),
        }
    }
}

fn try_get_binop(e: &Expr) -> Option<BinOp> {
    match e {
        Expr::BinOp {op, ..} => Some(*op),
        _ => None
    }
}

impl PrettyPrint for Expr {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        match self {
            Expr::Int {v} => (env, v.to_string()),
            Expr::Id {id} => (env, id.clone()),
            Expr::Neg {arg} => {
                let (env, s) = arg.pprint(env);
                match arg.as_ref() {
                    Expr::BinOp {..} | Expr::Neg {..} => (env, format!("-({s})")),
                    Expr::Int {v} if *v < 0 => (env, format!("-({s})")),
                    _ => (env, format!("-{s}"))
                }
            },
            Expr::BinOp {lhs, op, rhs} => {
                let (env, lhs_str) = lhs.pprint(env);
                let (env, rhs_str) = rhs.pprint(env);
                let lhs_str = parenthesize_operand(try_get_binop(lhs), op, false, lhs_str);
                let rhs_str = parenthesize_operand(try_get_binop(rhs), op, true, rhs_str);
                (env, format!("{lhs_str} {0} {rhs_str}", op.as_str()))
            },
            Expr::Call {func, args} => {
                let (env, strs) = args.iter()
                    .fold((env, vec![]), |(env, mut strs), a| {
                        let (env, s) = a.pprint(env);
                        strs.push(s);
                        (env, strs)
                    });
                // Binary builtins are nested to the left when given more than two arguments.
                let s = strs.into_iter()
                    .reduce(|l, r| format!("{0}({l}, {r})", func.name()))
                    .unwrap_or_default();
                (env, s)
            },
            Expr::Select {cond, thn, els} => {
                let (env, cond) = cond.pprint(env);
                let (env, thn) = thn.pprint(env);
                let (env, els) = els.pprint(env);
                (env, format!("({cond} ? {thn} : {els})"))
            },
        }
    }
}
