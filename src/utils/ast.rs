use lazy_static::lazy_static;
use strum_macros::EnumIter;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
pub enum ElemSize {
    I8, I16, I32, I64, U8, U16, U32, U64, F32, F64
}

impl ElemSize {
    pub fn c_name(&self) -> &'static str {
        match self {
            ElemSize::I8 => "char",
            ElemSize::I16 => "short",
            ElemSize::I32 => "int",
            ElemSize::I64 => "long",
            ElemSize::U8 => "unsigned char",
            ElemSize::U16 => "unsigned short",
            ElemSize::U32 => "unsigned int",
            ElemSize::U64 => "unsigned long",
            ElemSize::F32 => "float",
            ElemSize::F64 => "double",
        }
    }
}

lazy_static! {
    static ref TYPEMAP: BTreeMap<&'static str, ElemSize> = vec![
        ("char", ElemSize::I8),
        ("short", ElemSize::I16),
        ("int", ElemSize::I32),
        ("long", ElemSize::I64),
        ("unsigned char", ElemSize::U8),
        ("unsigned short", ElemSize::U16),
        ("unsigned int", ElemSize::U32),
        ("unsigned", ElemSize::U32),
        ("unsigned long", ElemSize::U64),
        ("float", ElemSize::F32),
        ("double", ElemSize::F64),
    ].into_iter().collect::<_>();
}

// The element type of an array as spelled in the original C program. Builtin scalar types are
// recognized so that the double-precision extension can be detected; anything else (structs,
// typedefs) is kept by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElemType {
    Scalar {sz: ElemSize},
    Named {id: String},
}

impl ElemType {
    pub fn from_c_name(s: &str) -> ElemType {
        let s = s.split_whitespace().collect::<Vec<&str>>().join(" ");
        match TYPEMAP.get(s.as_str()) {
            Some(sz) => ElemType::Scalar {sz: *sz},
            None => ElemType::Named {id: s}
        }
    }

    pub fn is_double(&self) -> bool {
        match self {
            ElemType::Scalar {sz: ElemSize::F64} => true,
            _ => false
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElemType::Scalar {sz} => write!(f, "{0}", sz.c_name()),
            ElemType::Named {id} => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BinOp {
    Add, Sub, Mul, Div, Rem,
    Eq, Neq, Leq, Geq, Lt, Gt,
    And, Or
}

impl BinOp {
    fn prec_idx(&self) -> usize {
        match self {
            BinOp::Or => 2,
            BinOp::And => 3,
            BinOp::Eq | BinOp::Neq => 7,
            BinOp::Leq | BinOp::Geq | BinOp::Lt | BinOp::Gt => 8,
            BinOp::Add | BinOp::Sub => 11,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 12,
        }
    }

    pub fn precedence(l: &BinOp, r: &BinOp) -> Ordering {
        l.prec_idx().cmp(&r.prec_idx())
    }

    // Holds if 'a op (b inner c)' equals '(a op b) inner c' in C integer arithmetic. Any other
    // right operand of equal precedence keeps its parentheses.
    pub fn associates_with(&self, inner: &BinOp) -> bool {
        match (self, inner) {
            (BinOp::Add, BinOp::Add) | (BinOp::Mul, BinOp::Mul) => true,
            (BinOp::And, BinOp::And) | (BinOp::Or, BinOp::Or) => true,
            _ => false
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Leq => "<=",
            BinOp::Geq => ">=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

// Decides whether an operand printed as 's' needs parentheses when it appears on the given side of
// the outer operator.
pub fn parenthesize_operand(
    inner_op: Option<BinOp>,
    outer_op: &BinOp,
    is_rhs: bool,
    s: String
) -> String {
    match inner_op {
        Some(inner_op) => {
            let regroups = is_rhs && !outer_op.associates_with(&inner_op);
            match BinOp::precedence(&inner_op, outer_op) {
                Ordering::Less => format!("({s})"),
                Ordering::Equal if regroups => format!("({s})"),
                _ => s
            }
        },
        None => s
    }
}
