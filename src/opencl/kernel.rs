use super::args::{self, KernelArg};
use super::ast::*;
use super::CodegenEnv;
use crate::polycl_model_error;
use crate::poly::{self, Builtin};
use crate::prog::ArrayInfo;
use crate::tree::*;
use crate::utils::ast::BinOp;
use crate::utils::err::*;
use crate::utils::info::Origin;
use crate::utils::pprint::PrettyPrint;
use crate::utils::smap::SFold;

use tracing::debug;

use std::collections::BTreeSet;

fn id_bindings(prefix: &str, fun: &str, n: usize) -> Vec<(String, Expr)> {
    (0..n)
        .map(|i| {
            let call = Expr::Call {id: fun.to_string(), args: vec![Expr::Int {v: i as i64}]};
            (format!("{prefix}{i}"), call)
        })
        .collect()
}

// Binds the work-group and work-item indices to the names used by the kernel body. A declaration
// is omitted entirely if the corresponding dimensionality is zero.
fn print_kernel_iterators(env: &CodegenEnv, kernel: &Kernel) -> Vec<Stmt> {
    let mut stmts = vec![];
    if !kernel.grid_size.is_empty() {
        let defs = id_bindings("b", "get_group_id", kernel.grid_size.len());
        stmts.push(Stmt::Definition {ty: env.iterator_type(), defs});
    }
    if !kernel.block_size.is_empty() {
        let defs = id_bindings("t", "get_local_id", kernel.block_size.len());
        stmts.push(Stmt::Definition {ty: env.iterator_type(), defs});
    }
    stmts
}

fn lookup_backing_array<'a>(
    env: &CodegenEnv<'a>,
    kernel: &Kernel,
    var: &KernelVar
) -> CompileResult<&'a ArrayInfo> {
    match env.prog.lookup_array(&var.array) {
        Some(a) => Ok(a),
        None => {
            let i = Origin::staging_var(kernel.id, &var.name);
            polycl_model_error!(i, "unknown backing array {0}", var.array)
        }
    }
}

fn declare_staging_var(
    env: &CodegenEnv,
    kernel: &Kernel,
    var: &KernelVar
) -> CompileResult<Stmt> {
    let array = lookup_backing_array(env, kernel, var)?;
    let dims = var.size.iter()
        .map(|e| match e.eval_const() {
            Some(v) => Ok(v),
            None => {
                let i = Origin::staging_var(kernel.id, &var.name);
                polycl_model_error!(i, "extent {0} is not a literal", e.pprint_default())
            }
        })
        .collect::<CompileResult<Vec<i64>>>()?;
    let mem = match var.kind {
        VarKind::Local => MemSpace::Local,
        VarKind::Private => MemSpace::Private,
    };
    Ok(Stmt::StagingDecl {
        mem, elem_ty: Type::Elem {ty: array.elem_type.clone()}, id: var.name.clone(), dims
    })
}

// Device arrays are always linearized, so a multi-dimensional access is flattened in row-major
// order using the extents of the array.
fn linearize_index(array: &ArrayInfo, idx: &[poly::Expr]) -> poly::Expr {
    let mut it = idx.iter().cloned().zip(array.extents.iter().cloned());
    match it.next() {
        Some((first, _)) => {
            it.fold(first, |acc, (i, extent)| {
                let scaled = poly::Expr::binop(acc, BinOp::Mul, extent);
                poly::Expr::binop(scaled, BinOp::Add, i)
            })
        },
        None => poly::Expr::int(0)
    }
}

fn global_access(array: &ArrayInfo, idx: &[poly::Expr]) -> Expr {
    if array.read_only_scalar {
        Expr::Var {id: array.name.clone()}
    } else {
        let idx = linearize_index(array, idx);
        Expr::ArrayAccess {target: array.name.clone(), idx: vec![idx]}
    }
}

fn from_copy(
    env: &CodegenEnv,
    kernel: &Kernel,
    var_id: &str,
    array_id: &str,
    dir: &CopyDirection,
    local_index: &Vec<poly::Expr>,
    global_index: &Vec<poly::Expr>
) -> CompileResult<Stmt> {
    let i = Origin::Kernel {id: kernel.id};
    let var = match kernel.lookup_var(var_id) {
        Some(v) => v,
        None => return polycl_model_error!(i, "copy refers to undeclared staging variable {var_id}")
    };
    let array = match env.prog.lookup_array(array_id) {
        Some(a) => a,
        None => return polycl_model_error!(i, "copy refers to unknown array {array_id}")
    };
    if local_index.len() != var.size.len() {
        let i = Origin::staging_var(kernel.id, var_id);
        return polycl_model_error!(
            i, "copy uses {0} indices for a {1}-dimensional variable",
            local_index.len(), var.size.len()
        );
    }
    if global_index.len() != array.dims() {
        let i = Origin::array(array_id);
        return polycl_model_error!(
            i, "copy uses {0} indices for a {1}-dimensional array",
            global_index.len(), array.dims()
        );
    }
    let local = Expr::ArrayAccess {target: var.name.clone(), idx: local_index.clone()};
    let global = global_access(array, global_index);
    let (dst, expr) = match dir {
        CopyDirection::Read => (local, global),
        CopyDirection::Write => (global, local),
    };
    Ok(Stmt::Assign {dst, expr})
}

fn from_kernel_node(
    env: &CodegenEnv,
    kernel: &Kernel,
    mut acc: Vec<Stmt>,
    node: &Node
) -> CompileResult<Vec<Stmt>> {
    match node {
        Node::For {iter, init, cond, inc, body} => {
            let body = from_kernel_nodes(env, kernel, body)?;
            acc.push(Stmt::For {
                var_ty: env.iterator_type(),
                var: iter.clone(),
                init: init.clone(),
                cond: cond.clone(),
                incr: inc.clone(),
                body
            });
        },
        Node::If {cond, thn, els} => {
            let thn = from_kernel_nodes(env, kernel, thn)?;
            let els = from_kernel_nodes(env, kernel, els)?;
            acc.push(Stmt::If {cond: cond.clone(), thn, els});
        },
        Node::Block {body} => {
            return body.iter().try_fold(acc, |acc, n| from_kernel_node(env, kernel, acc, n));
        },
        Node::User {leaf} => match leaf {
            Leaf::Statement {text, ..} => acc.push(Stmt::Verbatim {text: text.clone()}),
            Leaf::Copy {var, array, dir, local_index, global_index} => {
                acc.push(from_copy(env, kernel, var, array, dir, local_index, global_index)?);
            },
            Leaf::Sync => acc.push(Stmt::Barrier),
            Leaf::Launch {kernel: inner} => {
                let i = Origin::Kernel {id: kernel.id};
                return polycl_model_error!(i, "kernel body launches kernel {0}", inner.id);
            },
        },
    };
    Ok(acc)
}

fn from_kernel_nodes(
    env: &CodegenEnv,
    kernel: &Kernel,
    nodes: &Vec<Node>
) -> CompileResult<Vec<Stmt>> {
    nodes.iter().try_fold(vec![], |acc, n| from_kernel_node(env, kernel, acc, n))
}

pub fn from_kernel(
    env: &CodegenEnv,
    kernel: &Kernel,
    args: &[KernelArg]
) -> CompileResult<Top> {
    let mut body = print_kernel_iterators(env, kernel);
    for var in kernel.vars.iter() {
        body.push(declare_staging_var(env, kernel, var)?);
    }
    body.push(Stmt::Blank);
    body.extend(from_kernel_node(env, kernel, vec![], &kernel.body)?);
    Ok(Top::FunDef {
        is_kernel: true,
        ret_ty: Type::Void,
        id: kernel.name(),
        params: args::signature(args),
        body
    })
}

// Collects the builtins used by the extents of the arrays copied by the kernel, as these extents
// are printed in the linearized global indices.
fn copied_extent_builtins(
    env: &CodegenEnv,
    acc: BTreeSet<Builtin>,
    node: &Node
) -> BTreeSet<Builtin> {
    match node {
        Node::User {leaf: Leaf::Copy {array, ..}} => match env.prog.lookup_array(array) {
            Some(a) => a.extents.iter().fold(acc, poly::expr::collect_builtins),
            None => acc
        },
        _ => <Node as SFold<Node>>::sfold(node, acc, |acc, n| copied_extent_builtins(env, acc, n))
    }
}

// Translates the kernel and appends its definition to the kernel module, preceded by the helper
// macros it needs. The OpenCL builtins are used for the minimum and maximum.
pub fn emit_kernel(
    env: &mut CodegenEnv,
    kernel: &Kernel,
    args: &[KernelArg]
) -> CompileResult<()> {
    let def = from_kernel(env, kernel, args)?;
    let builtins = used_builtins(BTreeSet::new(), &kernel.body);
    let builtins = copied_extent_builtins(env, builtins, &kernel.body);
    if builtins.contains(&Builtin::FloorDiv) {
        env.require_kernel_macro(Builtin::FloorDiv);
    }
    debug!(kernel = %kernel.name(), "emitted kernel definition");
    env.add_kernel(def);
    Ok(())
}
