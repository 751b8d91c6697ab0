use super::ast::*;
use crate::utils::pprint::*;

use itertools::Itertools;

impl PrettyPrint for MemSpace {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        let s = match self {
            MemSpace::Host => "",
            MemSpace::Global => "__global ",
            MemSpace::Local => "__local ",
            MemSpace::Private => "__private ",
        };
        (env, s.to_string())
    }
}

impl PrettyPrint for Type {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        let s = match self {
            Type::Void => "void".to_string(),
            Type::Int => "int".to_string(),
            Type::Elem {ty} => ty.to_string(),
            Type::Named {id} => id.clone(),
            Type::Pointer {ty, mem} => {
                let (_, mem) = mem.pprint(env.clone());
                let (_, ty) = ty.pprint(env.clone());
                format!("{mem}{ty} *")
            },
            Type::SizeT => "size_t".to_string(),
            Type::ClMem => "cl_mem".to_string(),
            Type::ClKernel => "cl_kernel".to_string(),
            Type::ClInt => "cl_int".to_string(),
            Type::ClDeviceId => "cl_device_id".to_string(),
            Type::ClContext => "cl_context".to_string(),
            Type::ClProgram => "cl_program".to_string(),
            Type::ClCommandQueue => "cl_command_queue".to_string(),
        };
        (env, s)
    }
}

// Prints the declaration of an identifier of the given type, attaching the pointer declarator to
// the identifier as is conventional in C.
fn print_declarator(env: PrettyPrintEnv, ty: &Type, id: &str) -> (PrettyPrintEnv, String) {
    match ty {
        Type::Pointer {ty, mem} => {
            let (env, mem) = mem.pprint(env);
            let (env, ty) = ty.pprint(env);
            (env, format!("{mem}{ty} *{id}"))
        },
        _ => {
            let (env, ty) = ty.pprint(env);
            (env, format!("{ty} {id}"))
        }
    }
}

impl PrettyPrint for Expr {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        match self {
            Expr::Var {id} => (env, id.clone()),
            Expr::Int {v} => (env, v.to_string()),
            Expr::Str {v} => (env, format!("\"{v}\"")),
            Expr::Poly {e} => e.pprint(env),
            Expr::AddressOf {e} => {
                let (env, e) = e.pprint(env);
                (env, format!("&{e}"))
            },
            Expr::VoidPtr {e} => {
                let (env, e) = e.pprint(env);
                (env, format!("(void *) {e}"))
            },
            Expr::SizeOf {ty} => {
                let (env, ty) = ty.pprint(env);
                (env, format!("sizeof({ty})"))
            },
            Expr::Call {id, args} => {
                let (env, args) = pprint_iter(args.iter(), env, ", ");
                (env, format!("{id}({args})"))
            },
            Expr::ArrayAccess {target, idx} => {
                let (env, idx) = idx.iter()
                    .fold((env, String::new()), |(env, acc), i| {
                        let (env, i) = i.pprint(env);
                        (env, format!("{acc}[{i}]"))
                    });
                (env, format!("{target}{idx}"))
            },
            Expr::ByteSize {extents, elem_ty} => {
                let (env, extents) = extents.iter()
                    .fold((env, String::new()), |(env, acc), e| {
                        let (env, e) = e.pprint(env);
                        (env, format!("{acc}({e}) * "))
                    });
                let (env, ty) = elem_ty.pprint(env);
                (env, format!("{extents}sizeof({ty})"))
            },
            Expr::MemFlags {flags} => (env, flags.iter().join(" | ")),
            Expr::WorkItems {grid, block} => {
                let (env, grid) = grid.pprint(env);
                (env, format!("({grid}) * {block}"))
            },
        }
    }
}

fn print_body(
    env: PrettyPrintEnv,
    body: &Vec<Stmt>,
    indent: &str
) -> (PrettyPrintEnv, String) {
    if body.is_empty() {
        (env, format!("{{\n{indent}}}"))
    } else {
        let env = env.incr_indent();
        let (env, body) = pprint_iter(body.iter(), env, "\n");
        let env = env.decr_indent();
        (env, format!("{{\n{body}\n{indent}}}"))
    }
}

impl PrettyPrint for Stmt {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        let indent = env.print_indent();
        match self {
            Stmt::Decl {ty, id} => {
                let (env, decl) = print_declarator(env, ty, id);
                (env, format!("{indent}{decl};"))
            },
            Stmt::Definition {ty, defs} => {
                let (env, ty) = ty.pprint(env);
                let (env, defs) = defs.iter()
                    .fold((env, vec![]), |(env, mut acc), (id, e)| {
                        let (env, e) = e.pprint(env);
                        acc.push(format!("{id} = {e}"));
                        (env, acc)
                    });
                (env, format!("{indent}{ty} {0};", defs.into_iter().join(", ")))
            },
            Stmt::ArrayDef {ty, id, len, elems} => {
                let (env, ty) = ty.pprint(env);
                let (env, elems) = pprint_iter(elems.iter(), env, ", ");
                (env, format!("{indent}{ty} {id}[{len}] = {{{elems}}};"))
            },
            Stmt::Assign {dst, expr} => {
                let (env, dst) = dst.pprint(env);
                let (env, expr) = expr.pprint(env);
                (env, format!("{indent}{dst} = {expr};"))
            },
            Stmt::For {var_ty, var, init, cond, incr, body} => {
                let (env, var_ty) = var_ty.pprint(env);
                let (env, init) = init.pprint(env);
                let (env, cond) = cond.pprint(env);
                let (env, incr) = incr.pprint(env);
                let (env, body) = print_body(env, body, &indent);
                let s = format!(
                    "{0}for ({1} {2} = {3}; {4}; {2} += {5}) {6}",
                    indent, var_ty, var, init, cond, incr, body
                );
                (env, s)
            },
            Stmt::If {cond, thn, els} => {
                let (env, cond) = cond.pprint(env);
                let (env, thn) = print_body(env, thn, &indent);
                if els.is_empty() {
                    (env, format!("{indent}if ({cond}) {thn}"))
                } else {
                    let (env, els) = print_body(env, els, &indent);
                    (env, format!("{indent}if ({cond}) {thn} else {els}"))
                }
            },
            Stmt::Scope {body} => {
                let (env, body) = print_body(env, body, &indent);
                (env, format!("{indent}{body}"))
            },
            Stmt::Verbatim {text} => {
                let s = text.lines()
                    .map(|l| format!("{indent}{l}"))
                    .join("\n");
                (env, s)
            },
            Stmt::Blank => (env, String::new()),
            Stmt::CheckReturn {e} => {
                let (env, e) = e.pprint(env);
                (env, format!("{indent}openclCheckReturn({e});"))
            },
            Stmt::StagingDecl {mem, elem_ty, id, dims} => {
                let (env, mem) = mem.pprint(env);
                let (env, ty) = elem_ty.pprint(env);
                let dims = dims.iter().map(|d| format!("[{d}]")).join("");
                (env, format!("{indent}{mem}{ty} {id}{dims};"))
            },
            Stmt::Barrier => {
                (env, format!("{indent}barrier(CLK_LOCAL_MEM_FENCE | CLK_GLOBAL_MEM_FENCE);"))
            },
        }
    }
}

impl PrettyPrint for Param {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        print_declarator(env, &self.ty, &self.id)
    }
}

impl PrettyPrint for Top {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        match self {
            Top::Include {header} => (env, format!("#include {header}")),
            Top::PlatformInclude {apple, other} => {
                let s = format!(
                    "#if defined(__APPLE__)\n#include {apple}\n#else\n#include {other}\n#endif"
                );
                (env, s)
            },
            Top::Define {text} => (env, text.clone()),
            Top::Pragma {text} => (env, format!("#pragma {text}")),
            Top::TypeDef {definition} => (env, format!("{definition};")),
            Top::FunDecl {ret_ty, id, params} => {
                let (env, decl) = print_declarator(env, ret_ty, id);
                let (env, params) = pprint_iter(params.iter(), env, ", ");
                (env, format!("{decl}({params});"))
            },
            Top::FunDef {is_kernel, ret_ty, id, params, body} => {
                let (env, decl) = print_declarator(env, ret_ty, id);
                let (env, params) = pprint_iter(params.iter(), env, ", ");
                let (env, body) = print_body(env, body, "");
                let kernel_attr = if *is_kernel { "__kernel " } else { "" };
                (env, format!("{kernel_attr}{decl}({params})\n{body}"))
            },
            Top::Scope {body} => print_body(env, body, ""),
            Top::Blank => (env, String::new()),
        }
    }
}

impl PrettyPrint for Ast {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        pprint_iter(self.tops.iter(), env, "\n")
    }
}
