use crate::opencl::ast::*;
use crate::poly;
use crate::utils::ast::*;

pub fn scalar(sz: ElemSize) -> Type {
    Type::Elem {ty: ElemType::Scalar {sz}}
}

pub fn named(id: &str) -> Type {
    Type::Named {id: id.to_string()}
}

pub fn pointer(ty: Type, mem: MemSpace) -> Type {
    Type::Pointer {ty: Box::new(ty), mem}
}

pub fn param(ty: Type, id: &str) -> Param {
    Param {ty, id: id.to_string()}
}

pub fn var(s: &str) -> Expr {
    Expr::Var {id: s.to_string()}
}

pub fn int(v: i64) -> Expr {
    Expr::Int {v}
}

pub fn address_of(e: Expr) -> Expr {
    Expr::AddressOf {e: Box::new(e)}
}

pub fn call(id: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {id: id.to_string(), args}
}

pub fn poly_id(s: &str) -> poly::Expr {
    poly::Expr::id(s)
}

pub fn poly_int(v: i64) -> poly::Expr {
    poly::Expr::int(v)
}
