use super::ast::*;
use super::CodegenEnv;
use crate::poly::Set;
use crate::prog::ArrayInfo;

use tracing::debug;

fn call(id: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {id: id.to_string(), args}
}

fn var(id: &str) -> Expr {
    Expr::Var {id: id.to_string()}
}

pub fn byte_size(array: &ArrayInfo) -> Expr {
    Expr::ByteSize {
        extents: array.extents.clone(),
        elem_ty: Type::Elem {ty: array.elem_type.clone()}
    }
}

// The host-side data of an array as passed to the OpenCL API. Scalars of the host code are
// referenced by address, unless the host code is wrapped in a function where they are passed as
// pointers.
fn host_ref(env: &CodegenEnv, array: &ArrayInfo) -> Expr {
    if array.is_scalar() && env.opts.host_function.is_none() {
        Expr::AddressOf {e: Box::new(var(&array.name))}
    } else {
        var(&array.name)
    }
}

fn intersects(env: &CodegenEnv, array: &ArrayInfo, s: &Set) -> bool {
    let u = Set::universe(array.space.clone());
    !env.algebra.is_empty(&env.algebra.intersect(&u, s))
}

pub fn needs_initial_copy(env: &CodegenEnv, array: &ArrayInfo) -> bool {
    intersects(env, array, &env.prog.copy_in.extract_set(&array.space))
}

pub fn needs_copy_back(env: &CodegenEnv, array: &ArrayInfo) -> bool {
    intersects(env, array, &env.prog.copy_out.extract_set(&array.space))
}

fn device_arrays<'a>(env: &CodegenEnv<'a>) -> Vec<&'a ArrayInfo> {
    env.prog.arrays.iter()
        .filter(|a| a.has_device_buffer())
        .collect()
}

pub fn declare_device_arrays(env: &CodegenEnv) -> Vec<Stmt> {
    device_arrays(env).into_iter()
        .map(|a| Stmt::Decl {ty: Type::ClMem, id: a.device_name()})
        .collect()
}

fn allocate(env: &CodegenEnv, array: &ArrayInfo, initial_copy: bool) -> Stmt {
    let mut flags = vec!["CL_MEM_READ_WRITE"];
    if initial_copy {
        flags.push("CL_MEM_COPY_HOST_PTR");
    }
    // The size of the array may be zero, so we allocate at least one element to avoid a failure
    // in the allocation of an empty buffer.
    let size = if env.algebra.is_universe(&array.positive_size_guard()) {
        byte_size(array)
    } else {
        let elem_sz = Expr::SizeOf {ty: Type::Elem {ty: array.elem_type.clone()}};
        call("max", vec![elem_sz, byte_size(array)])
    };
    let host = if initial_copy { host_ref(env, array) } else { var("NULL") };
    let create = call("clCreateBuffer", vec![
        var("context"),
        Expr::MemFlags {flags},
        size,
        host,
        Expr::AddressOf {e: Box::new(var("err"))}
    ]);
    Stmt::Scope {body: vec![
        Stmt::Assign {dst: var(&array.device_name()), expr: create},
        Stmt::CheckReturn {e: var("err")},
    ]}
}

pub fn allocate_device_arrays(env: &CodegenEnv) -> Vec<Stmt> {
    device_arrays(env).into_iter()
        .map(|a| {
            let initial_copy = needs_initial_copy(env, a);
            debug!(array = %a.name, initial_copy, "allocating device buffer");
            allocate(env, a, initial_copy)
        })
        .collect()
}

fn copy_from_device(env: &CodegenEnv, array: &ArrayInfo) -> Stmt {
    let read = call("clEnqueueReadBuffer", vec![
        var("queue"),
        var(&array.device_name()),
        var("CL_TRUE"),
        Expr::Int {v: 0},
        byte_size(array),
        host_ref(env, array),
        Expr::Int {v: 0},
        var("NULL"),
        var("NULL"),
    ]);
    Stmt::CheckReturn {e: read}
}

// Copies back every array written by the program. The copy is guarded by the condition that all
// extents of the array are positive, unless the context already implies it.
pub fn copy_arrays_from_device(env: &CodegenEnv) -> Vec<Stmt> {
    device_arrays(env).into_iter()
        .filter(|a| needs_copy_back(env, a))
        .map(|a| {
            let stmt = copy_from_device(env, a);
            let guard = env.algebra.gist(&a.positive_size_guard(), &env.prog.context);
            if env.algebra.is_universe(&guard) {
                stmt
            } else {
                Stmt::If {cond: guard.to_condition(), thn: vec![stmt], els: vec![]}
            }
        })
        .collect()
}

pub fn release_device_arrays(env: &CodegenEnv) -> Vec<Stmt> {
    device_arrays(env).into_iter()
        .map(|a| {
            let release = call("clReleaseMemObject", vec![var(&a.device_name())]);
            Stmt::Scope {body: vec![Stmt::CheckReturn {e: release}]}
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::option::CompileOptions;
    use crate::poly::{self, PlainSets, Space, UnionSet};
    use crate::prog::Program;
    use crate::utils::ast::BinOp;
    use crate::utils::pprint::*;

    fn params() -> Vec<String> {
        vec!["N".to_string()]
    }

    fn n() -> poly::Expr {
        poly::Expr::id("N")
    }

    fn n_positive() -> poly::Expr {
        poly::Expr::binop(n(), BinOp::Geq, poly::Expr::int(1))
    }

    fn array(name: &str, extents: Vec<poly::Expr>) -> ArrayInfo {
        ArrayInfo::new(name, "float", extents, params())
    }

    fn footprint_of(arrays: &[&ArrayInfo]) -> UnionSet {
        arrays.iter()
            .fold(UnionSet::new(params()), |u, a| u.add_set(Set::universe(a.space.clone())))
    }

    fn program() -> Program {
        let a = array("A", vec![n(), n()]);
        let b = array("B", vec![poly::Expr::int(16)]);
        let x = array("x", vec![]);
        let alpha = array("alpha", vec![]).with_read_only_scalar(true);
        Program::new(params())
            .with_copy_in(footprint_of(&[&a, &x]))
            .with_copy_out(footprint_of(&[&a, &x]))
            .add_array(a)
            .add_array(b)
            .add_array(x)
            .add_array(alpha)
    }

    fn print(stmts: Vec<Stmt>) -> String {
        stmts.pprint_default()
    }

    #[test]
    fn declare_skips_read_only_scalars() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        assert_eq!(print(declare_device_arrays(&env)), "cl_mem dev_A;\ncl_mem dev_B;\ncl_mem dev_x;");
    }

    #[test]
    fn allocate_with_initial_copy_and_clamp() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let s = allocate(&env, &prog.arrays[0], true).pprint_default();
        let expected = "\
{
  dev_A = clCreateBuffer(context, CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR, max(sizeof(float), (N) * (N) * sizeof(float)), A, &err);
  openclCheckReturn(err);
}";
        assert_eq!(s, expected);
    }

    #[test]
    fn allocate_literal_size_without_copy() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let stmts = allocate_device_arrays(&env);
        let expected = "\
{
  dev_B = clCreateBuffer(context, CL_MEM_READ_WRITE, (16) * sizeof(float), NULL, &err);
  openclCheckReturn(err);
}";
        assert_eq!(stmts[1].pprint_default(), expected);
    }

    #[test]
    fn allocate_scalar_by_address() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let stmts = allocate_device_arrays(&env);
        assert_eq!(stmts.len(), 3);
        assert!(stmts[2].pprint_default().contains("sizeof(float), &x, &err);"));
    }

    #[test]
    fn scalar_passed_as_pointer_in_host_function() {
        let prog = program();
        let opts = CompileOptions::default().host_function("run");
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let stmts = allocate_device_arrays(&env);
        assert!(stmts[2].pprint_default().contains("sizeof(float), x, &err);"));
    }

    #[test]
    fn copy_back_guarded_by_positive_size() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let expected = "\
if (N >= 1) {
  openclCheckReturn(clEnqueueReadBuffer(queue, dev_A, CL_TRUE, 0, (N) * (N) * sizeof(float), A, 0, NULL, NULL));
}
openclCheckReturn(clEnqueueReadBuffer(queue, dev_x, CL_TRUE, 0, sizeof(float), &x, 0, NULL, NULL));";
        assert_eq!(print(copy_arrays_from_device(&env)), expected);
    }

    #[test]
    fn copy_back_guard_removed_by_context() {
        let context = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        let prog = program().with_context(context);
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let stmts = copy_arrays_from_device(&env);
        assert!(matches!(stmts[0], Stmt::CheckReturn {..}));
    }

    #[test]
    fn context_does_not_remove_allocation_clamp() {
        let context = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        let prog = program().with_context(context);
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let s = allocate(&env, &prog.arrays[0], false).pprint_default();
        assert!(s.contains("max(sizeof(float), (N) * (N) * sizeof(float))"));
    }

    #[test]
    fn array_outside_copy_sets() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        assert!(!needs_initial_copy(&env, &prog.arrays[1]));
        assert!(!needs_copy_back(&env, &prog.arrays[1]));
    }

    #[test]
    fn release_each_buffer_in_block() {
        let prog = program();
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let stmts = release_device_arrays(&env);
        assert_eq!(stmts.len(), 3);
        assert_eq!(
            stmts[0].pprint_default(),
            "{\n  openclCheckReturn(clReleaseMemObject(dev_A));\n}"
        );
    }

    #[test]
    fn copy_back_of_zero_extent_array() {
        let z = array("Z", vec![poly::Expr::int(0)]);
        let prog = Program::new(params())
            .with_copy_out(footprint_of(&[&z]))
            .add_array(z);
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        let alloc = allocate(&env, &prog.arrays[0], false).pprint_default();
        assert!(alloc.contains("max(sizeof(float), (0) * sizeof(float))"));
        let expected = "\
if (0) {
  openclCheckReturn(clEnqueueReadBuffer(queue, dev_Z, CL_TRUE, 0, (0) * sizeof(float), Z, 0, NULL, NULL));
}";
        assert_eq!(print(copy_arrays_from_device(&env)), expected);
    }
}
