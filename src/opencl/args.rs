use super::ast::*;
use super::CodegenEnv;
use crate::polycl_model_error;
use crate::poly::Set;
use crate::tree::Kernel;
use crate::utils::err::*;
use crate::utils::info::Origin;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArgKind {
    Buffer, ReadOnlyScalar, Param, Iterator
}

#[derive(Clone, Debug, PartialEq)]
pub struct KernelArg {
    pub kind: ArgKind,
    pub name: String,
    pub ty: Type,
}

impl KernelArg {
    pub fn param(&self) -> Param {
        let ty = match self.kind {
            ArgKind::Buffer => Type::Pointer {ty: Box::new(self.ty.clone()), mem: MemSpace::Global},
            _ => self.ty.clone()
        };
        Param {ty, id: self.name.clone()}
    }

    pub fn call_arg(&self) -> Expr {
        match self.kind {
            ArgKind::Buffer => Expr::Var {id: format!("dev_{0}", self.name)},
            _ => Expr::Var {id: self.name.clone()}
        }
    }

    pub fn bind(&self, kernel_name: &str, idx: usize) -> Stmt {
        let (sz, ptr) = match self.kind {
            ArgKind::Buffer => {
                let ptr = Expr::AddressOf {e: Box::new(self.call_arg())};
                (Type::ClMem, Expr::VoidPtr {e: Box::new(ptr)})
            },
            _ => (self.ty.clone(), Expr::AddressOf {e: Box::new(self.call_arg())})
        };
        let e = Expr::Call {
            id: "clSetKernelArg".to_string(),
            args: vec![
                Expr::Var {id: kernel_name.to_string()},
                Expr::Int {v: idx as i64},
                Expr::SizeOf {ty: sz},
                ptr
            ]
        };
        Stmt::CheckReturn {e}
    }
}

fn ensure_footprint_in_catalogue(env: &CodegenEnv, kernel: &Kernel) -> CompileResult<()> {
    for s in kernel.footprint.sets() {
        if env.prog.lookup_array_by_space(s.get_space()).is_none() {
            let i = Origin::Kernel {id: kernel.id};
            return polycl_model_error!(i, "footprint refers to unknown space {0}", s.get_space());
        }
    }
    Ok(())
}

// Computes the arguments of a kernel in the order shared by its signature, the host-side
// argument bindings and the call-argument list: the arrays accessed by the kernel in catalogue
// order, then the parameters of the footprint and finally the host iterators live at the launch.
pub fn kernel_args(env: &CodegenEnv, kernel: &Kernel) -> CompileResult<Vec<KernelArg>> {
    ensure_footprint_in_catalogue(env, kernel)?;
    let arrays = env.prog.arrays.iter()
        .filter(|a| {
            let accessed = kernel.footprint.extract_set(&a.space);
            let s = env.algebra.intersect(&Set::universe(a.space.clone()), &accessed);
            !env.algebra.is_empty(&s)
        })
        .map(|a| {
            let kind = if a.read_only_scalar { ArgKind::ReadOnlyScalar } else { ArgKind::Buffer };
            KernelArg {kind, name: a.name.clone(), ty: Type::Elem {ty: a.elem_type.clone()}}
        });
    let params = kernel.footprint.get_params().iter()
        .map(|p| KernelArg {kind: ArgKind::Param, name: p.clone(), ty: Type::Int});
    let iters = kernel.space.dims.iter()
        .map(|d| KernelArg {kind: ArgKind::Iterator, name: d.clone(), ty: env.iterator_type()});
    Ok(arrays.chain(params).chain(iters).collect())
}

pub fn signature(args: &[KernelArg]) -> Vec<Param> {
    args.iter().map(|a| a.param()).collect()
}

pub fn bind_args(kernel_name: &str, args: &[KernelArg]) -> Vec<Stmt> {
    args.iter()
        .enumerate()
        .map(|(idx, a)| a.bind(kernel_name, idx))
        .collect()
}

pub fn call_args(args: &[KernelArg]) -> Vec<Expr> {
    args.iter().map(|a| a.call_arg()).collect()
}
