use super::args;
use super::ast::*;
use super::geometry;
use super::kernel;
use super::memory;
use super::CodegenEnv;
use crate::polycl_model_error;
use crate::poly::{self, Builtin};
use crate::tree::*;
use crate::utils::err::*;
use crate::utils::info::Origin;
use crate::utils::pprint::PrettyPrint;

use itertools::Itertools;
use tracing::debug;

use std::collections::BTreeSet;

const CHECK_RETURN_MACRO: &'static str = "\
#define openclCheckReturn(ret) \\
  if (ret != CL_SUCCESS) {\\
    fprintf(stderr, \"OpenCL error: %s\\n\", opencl_error_string(ret)); \\
    fflush(stderr); \\
    assert(ret == CL_SUCCESS);\\
  }";

fn var(id: &str) -> Expr {
    Expr::Var {id: id.to_string()}
}

fn call(id: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {id: id.to_string(), args}
}

fn check(id: &str, args: Vec<Expr>) -> Stmt {
    Stmt::CheckReturn {e: call(id, args)}
}

fn err_ref() -> Expr {
    Expr::AddressOf {e: Box::new(var("err"))}
}

fn from_launch(env: &mut CodegenEnv, k: &Kernel) -> CompileResult<Vec<Stmt>> {
    let args = args::kernel_args(env, k)?;
    let geom = geometry::resolve(&k.grid_size, &k.block_size);
    let name = k.name();

    let mut body = vec![
        Stmt::ArrayDef {
            ty: Type::SizeT,
            id: "global_work_size".to_string(),
            len: geom.work_dim,
            elems: geom.global
        },
        Stmt::ArrayDef {
            ty: Type::SizeT,
            id: "block_size".to_string(),
            len: geom.work_dim,
            elems: geom.local.iter().map(|v| Expr::Int {v: *v}).collect()
        },
        Stmt::Definition {
            ty: Type::ClKernel,
            defs: vec![(name.clone(), call("clCreateKernel", vec![
                var("program"), Expr::Str {v: name.clone()}, err_ref()
            ]))]
        },
        Stmt::CheckReturn {e: var("err")},
    ];
    body.extend(args::bind_args(&name, &args));
    body.push(check("clEnqueueNDRangeKernel", vec![
        var("queue"), var(&name), Expr::Int {v: geom.work_dim as i64}, var("NULL"),
        var("global_work_size"), var("block_size"), Expr::Int {v: 0}, var("NULL"), var("NULL")
    ]));
    body.push(check("clFinish", vec![var("queue")]));
    body.push(check("clReleaseKernel", vec![var(&name)]));

    let call_args = args::call_args(&args).iter().map(|e| e.pprint_default()).join(", ");
    debug!(kernel = %name, args = %call_args, work_dim = geom.work_dim, "launching kernel");

    kernel::emit_kernel(env, k, &args)?;
    Ok(vec![Stmt::Scope {body}])
}

fn from_host_node(
    env: &mut CodegenEnv,
    mut acc: Vec<Stmt>,
    node: &Node
) -> CompileResult<Vec<Stmt>> {
    match node {
        Node::For {iter, init, cond, inc, body} => {
            let body = from_host_nodes(env, body)?;
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
            let thn = from_host_nodes(env, thn)?;
            let els = from_host_nodes(env, els)?;
            acc.push(Stmt::If {cond: cond.clone(), thn, els});
        },
        Node::Block {body} => {
            for n in body.iter() {
                acc = from_host_node(env, acc, n)?;
            }
        },
        Node::User {leaf} => match leaf {
            Leaf::Statement {text, ..} => acc.push(Stmt::Verbatim {text: text.clone()}),
            Leaf::Copy {var, ..} => {
                return polycl_model_error!(Origin::Program,
                    "copy of staging variable {var} outside of a kernel");
            },
            Leaf::Sync => {
                return polycl_model_error!(Origin::Program, "barrier outside of a kernel");
            },
            Leaf::Launch {kernel} => acc.extend(from_launch(env, kernel)?),
        },
    };
    Ok(acc)
}

fn from_host_nodes(env: &mut CodegenEnv, nodes: &Vec<Node>) -> CompileResult<Vec<Stmt>> {
    let mut acc = vec![];
    for n in nodes.iter() {
        acc = from_host_node(env, acc, n)?;
    }
    Ok(acc)
}

fn setup_device(env: &CodegenEnv) -> Vec<Stmt> {
    let decl = |ty, id: &str| Stmt::Decl {ty, id: id.to_string()};
    let use_gpu = if env.opts.use_gpu { 1 } else { 0 };
    let options = env.opts.compiler_options.clone().unwrap_or_default();
    vec![
        decl(Type::ClDeviceId, "device"),
        decl(Type::ClContext, "context"),
        decl(Type::ClProgram, "program"),
        decl(Type::ClCommandQueue, "queue"),
        decl(Type::ClInt, "err"),
        Stmt::Assign {
            dst: var("device"),
            expr: call("opencl_create_device", vec![Expr::Int {v: use_gpu}])
        },
        Stmt::Assign {
            dst: var("context"),
            expr: call("clCreateContext", vec![
                var("NULL"), Expr::Int {v: 1}, Expr::AddressOf {e: Box::new(var("device"))},
                var("NULL"), var("NULL"), err_ref()
            ])
        },
        Stmt::CheckReturn {e: var("err")},
        Stmt::Assign {
            dst: var("queue"),
            expr: call("clCreateCommandQueue", vec![
                var("context"), var("device"), Expr::Int {v: 0}, err_ref()
            ])
        },
        Stmt::CheckReturn {e: var("err")},
        Stmt::Assign {
            dst: var("program"),
            expr: call("opencl_build_program", vec![
                var("context"), var("device"),
                Expr::Str {v: env.kernel_path.clone()}, Expr::Str {v: options}
            ])
        },
    ]
}

fn release_cl_objects() -> Vec<Stmt> {
    vec![
        check("clReleaseCommandQueue", vec![var("queue")]),
        check("clReleaseProgram", vec![var("program")]),
        check("clReleaseContext", vec![var("context")]),
    ]
}

// The builtins used by the host code, which includes the array extents used in byte sizes and
// guards besides the expressions of the tree.
fn host_builtins(env: &CodegenEnv, tree: &Node) -> BTreeSet<Builtin> {
    let acc = used_builtins(BTreeSet::new(), tree);
    env.prog.arrays.iter()
        .flat_map(|a| a.extents.iter())
        .fold(acc, poly::expr::collect_builtins)
}

fn host_macros(builtins: BTreeSet<Builtin>) -> Vec<Top> {
    // The maximum is always needed by the allocation of device buffers.
    let mut tops = vec![
        Top::Define {text: CHECK_RETURN_MACRO.to_string()},
        Top::Blank,
        Top::Define {text: Builtin::Max.macro_definition().to_string()},
    ];
    for b in builtins.into_iter().filter(|b| *b != Builtin::Max) {
        tops.push(Top::Define {text: b.macro_definition().to_string()});
    }
    tops
}

fn host_params(env: &CodegenEnv) -> Vec<Param> {
    let params = env.prog.params.iter()
        .map(|p| Param {ty: Type::Int, id: p.clone()});
    let arrays = env.prog.arrays.iter()
        .map(|a| {
            let elem_ty = Type::Elem {ty: a.elem_type.clone()};
            let ty = if a.read_only_scalar {
                elem_ty
            } else {
                Type::Pointer {ty: Box::new(elem_ty), mem: MemSpace::Host}
            };
            Param {ty, id: a.name.clone()}
        });
    params.chain(arrays).collect()
}

pub fn from_schedule(
    env: &mut CodegenEnv,
    tree: &Node,
    header_name: &str
) -> CompileResult<Ast> {
    // Translate the tree first, so that an inconsistent model is reported before any part of the
    // host code is assembled.
    let launches = from_host_node(env, vec![], tree)?;

    let mut body = memory::declare_device_arrays(env);
    body.extend(setup_device(env));
    body.push(Stmt::Blank);
    body.extend(memory::allocate_device_arrays(env));
    body.push(Stmt::Blank);
    body.extend(launches);
    body.push(Stmt::Blank);
    body.extend(memory::copy_arrays_from_device(env));
    body.push(Stmt::Blank);
    body.extend(memory::release_device_arrays(env));
    body.extend(release_cl_objects());

    let mut tops = vec![
        Top::Include {header: "<assert.h>".to_string()},
        Top::Include {header: "<stdio.h>".to_string()},
        Top::Include {header: format!("\"{header_name}\"")},
        Top::Blank,
    ];
    tops.extend(host_macros(host_builtins(env, tree)));
    let code = match &env.opts.host_function {
        Some(id) => Top::FunDef {
            is_kernel: false,
            ret_ty: Type::Void,
            id: id.clone(),
            params: host_params(env),
            body
        },
        None => Top::Scope {body},
    };
    tops.push(code);
    Ok(Ast {tops})
}

pub fn kernel_header() -> Ast {
    let ptr = |id: &str| Type::Pointer {
        ty: Box::new(Type::Named {id: id.to_string()}),
        mem: MemSpace::Host
    };
    let param = |ty, id: &str| Param {ty, id: id.to_string()};
    Ast {tops: vec![
        Top::PlatformInclude {
            apple: "<OpenCL/opencl.h>".to_string(),
            other: "<CL/opencl.h>".to_string()
        },
        Top::Blank,
        Top::FunDecl {
            ret_ty: Type::ClDeviceId,
            id: "opencl_create_device".to_string(),
            params: vec![param(Type::Int, "use_gpu")]
        },
        Top::FunDecl {
            ret_ty: Type::ClProgram,
            id: "opencl_build_program".to_string(),
            params: vec![
                param(Type::ClContext, "ctx"),
                param(Type::ClDeviceId, "dev"),
                param(ptr("const char"), "filename"),
                param(ptr("const char"), "opencl_options"),
            ]
        },
        Top::FunDecl {
            ret_ty: ptr("const char"),
            id: "opencl_error_string".to_string(),
            params: vec![param(Type::ClInt, "error")]
        },
    ]}
}
