use crate::poly;
use crate::utils::ast::ElemType;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MemSpace {
    Host, Global, Local, Private
}

#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Void,
    Int,
    Elem {ty: ElemType},
    // A type name taken verbatim from the configuration, such as the iterator type.
    Named {id: String},
    Pointer {ty: Box<Type>, mem: MemSpace},

    // OpenCL-specific types
    SizeT,
    ClMem,
    ClKernel,
    ClInt,
    ClDeviceId,
    ClContext,
    ClProgram,
    ClCommandQueue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Var {id: String},
    Int {v: i64},
    Str {v: String},
    // A symbolic expression of the schedule, such as a loop bound or a grid size.
    Poly {e: poly::Expr},
    AddressOf {e: Box<Expr>},
    VoidPtr {e: Box<Expr>},
    SizeOf {ty: Type},
    Call {id: String, args: Vec<Expr>},
    ArrayAccess {target: String, idx: Vec<poly::Expr>},

    // OpenCL-specific nodes
    ByteSize {extents: Vec<poly::Expr>, elem_ty: Type},
    MemFlags {flags: Vec<&'static str>},
    WorkItems {grid: poly::Expr, block: i64},
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Decl {ty: Type, id: String},
    Definition {ty: Type, defs: Vec<(String, Expr)>},
    ArrayDef {ty: Type, id: String, len: usize, elems: Vec<Expr>},
    Assign {dst: Expr, expr: Expr},
    For {
        var_ty: Type,
        var: String,
        init: poly::Expr,
        cond: poly::Expr,
        incr: poly::Expr,
        body: Vec<Stmt>
    },
    If {cond: poly::Expr, thn: Vec<Stmt>, els: Vec<Stmt>},
    Scope {body: Vec<Stmt>},
    Verbatim {text: String},
    Blank,

    // OpenCL-specific statements
    CheckReturn {e: Expr},
    StagingDecl {mem: MemSpace, elem_ty: Type, id: String, dims: Vec<i64>},
    Barrier,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Top {
    Include {header: String},
    PlatformInclude {apple: String, other: String},
    Define {text: String},
    Pragma {text: String},
    TypeDef {definition: String},
    FunDecl {ret_ty: Type, id: String, params: Vec<Param>},
    FunDef {is_kernel: bool, ret_ty: Type, id: String, params: Vec<Param>, body: Vec<Stmt>},
    Scope {body: Vec<Stmt>},
    Blank,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ast {
    pub tops: Vec<Top>
}

// The target ASTs of the three generated artifacts.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub host: Ast,
    pub kernel: Ast,
    pub header: Ast,
}
