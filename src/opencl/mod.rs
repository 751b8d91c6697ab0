pub mod ast;
mod args;
mod geometry;
mod host;
mod kernel;
mod memory;
mod pprint;

#[cfg(test)]
pub mod ast_builder;

use ast::*;
use crate::option::CompileOptions;
use crate::poly::{Builtin, SetAlgebra};
use crate::prog::Program;
use crate::tree::Node;
use crate::utils::err::*;

use std::collections::BTreeSet;

// The state of one generation run, shared by the host and kernel emitters. The kernel definitions
// are accumulated here as the host traversal reaches each launch.
pub struct CodegenEnv<'a> {
    pub prog: &'a Program,
    pub algebra: &'a dyn SetAlgebra,
    pub opts: &'a CompileOptions,
    pub kernel_path: String,
    kernel_macros: BTreeSet<Builtin>,
    kernels: Vec<Top>,
}

impl<'a> CodegenEnv<'a> {
    pub fn new(
        prog: &'a Program,
        algebra: &'a dyn SetAlgebra,
        opts: &'a CompileOptions,
        kernel_path: &str
    ) -> Self {
        CodegenEnv {
            prog, algebra, opts,
            kernel_path: kernel_path.to_string(),
            kernel_macros: BTreeSet::new(),
            kernels: vec![],
        }
    }

    fn iterator_type(&self) -> Type {
        Type::Named {id: self.opts.iterator_type.clone()}
    }

    // Adds the definition of a helper macro to the kernel module, unless an earlier kernel already
    // needed it.
    fn require_kernel_macro(&mut self, b: Builtin) {
        if self.kernel_macros.insert(b) {
            self.kernels.push(Top::Define {text: b.macro_definition().to_string()});
        }
    }

    fn add_kernel(&mut self, def: Top) {
        if self.kernels.iter().any(|t| matches!(t, Top::FunDef {..})) {
            self.kernels.push(Top::Blank);
        }
        self.kernels.push(def);
    }

    fn kernel_module(self) -> Ast {
        let mut tops = vec![];
        if self.prog.uses_double() {
            tops.push(Top::Pragma {text: "OPENCL EXTENSION cl_khr_fp64 : enable".to_string()});
            tops.push(Top::Blank);
        }
        if !self.prog.types.is_empty() {
            for t in self.prog.types.iter() {
                tops.push(Top::TypeDef {definition: t.definition.clone()});
            }
            tops.push(Top::Blank);
        }
        tops.extend(self.kernels);
        Ast {tops}
    }
}

pub fn codegen(mut env: CodegenEnv, tree: &Node, header_name: &str) -> CompileResult<Artifacts> {
    // Translate the host tree. Every kernel reached by the traversal is added to the environment
    // as a side-effect.
    let host = host::from_schedule(&mut env, tree, header_name)?;
    let kernel = env.kernel_module();
    let header = host::kernel_header();
    Ok(Artifacts {host, kernel, header})
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::poly::PlainSets;

    #[test]
    fn kernel_macro_emitted_once() {
        let prog = Program::new(vec![]);
        let opts = CompileOptions::default();
        let mut env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        env.require_kernel_macro(Builtin::FloorDiv);
        env.require_kernel_macro(Builtin::FloorDiv);
        assert_eq!(env.kernel_module().tops.len(), 1);
    }

    #[test]
    fn empty_kernel_module() {
        let prog = Program::new(vec![]);
        let opts = CompileOptions::default();
        let env = CodegenEnv::new(&prog, &PlainSets, &opts, "k.cl");
        assert_eq!(env.kernel_module(), Ast::default());
    }
}
