pub mod artifact;
pub mod opencl;
pub mod option;
pub mod poly;
pub mod prog;
pub mod tree;
pub mod utils;

pub use crate::artifact::{OutputNames, Rendered};
pub use crate::option::CompileOptions;
pub use crate::utils::err::{CompileError, CompileResult};

use crate::opencl::ast::Ast;
use crate::poly::{PlainSets, SetAlgebra};
use crate::prog::Program;
use crate::tree::Node;
use crate::utils::debug::DebugEnv;
use crate::utils::pprint::{PrettyPrint, PrettyPrintEnv, DEFAULT_INDENT};

use tracing::debug;

const KERNEL_INDENT: usize = 4;

fn render(ast: &Ast, indent: usize) -> String {
    let (_, s) = ast.pprint(PrettyPrintEnv::with_indent_increment(indent));
    format!("{s}\n")
}

pub fn render_opencl_with_algebra(
    prog: &Program,
    tree: &Node,
    opts: &CompileOptions,
    names: &OutputNames,
    algebra: &dyn SetAlgebra
) -> CompileResult<Rendered> {
    let debug_env = DebugEnv::new(opts);

    // Generate the target ASTs of all three files before rendering any of them, such that an
    // inconsistency in the program model is detected before producing any text.
    let env = opencl::CodegenEnv::new(prog, algebra, opts, &names.kernel_path());
    let artifacts = opencl::codegen(env, tree, &names.header_name())?;

    let host = render(&artifacts.host, DEFAULT_INDENT);
    debug!(artifact = "host", bytes = host.len(), "rendered artifact");
    debug_env.print("OpenCL host code", &host);

    let kernel = render(&artifacts.kernel, KERNEL_INDENT);
    debug!(artifact = "kernel", bytes = kernel.len(), "rendered artifact");
    debug_env.print("OpenCL kernel module", &kernel);

    let header = render(&artifacts.header, DEFAULT_INDENT);
    debug!(artifact = "header", bytes = header.len(), "rendered artifact");
    debug_env.print("OpenCL kernel header", &header);

    Ok(Rendered {host, kernel, header})
}

pub fn render_opencl(
    prog: &Program,
    tree: &Node,
    opts: &CompileOptions,
    names: &OutputNames
) -> CompileResult<Rendered> {
    render_opencl_with_algebra(prog, tree, opts, names, &PlainSets)
}

pub fn generate_opencl_with_algebra(
    prog: &Program,
    tree: &Node,
    opts: &CompileOptions,
    input: &str,
    output: Option<&str>,
    algebra: &dyn SetAlgebra
) -> CompileResult<OutputNames> {
    let names = OutputNames::derive(input, output)?;
    let rendered = render_opencl_with_algebra(prog, tree, opts, &names, algebra)?;
    names.write(&rendered)?;
    Ok(names)
}

pub fn generate_opencl(
    prog: &Program,
    tree: &Node,
    opts: &CompileOptions,
    input: &str,
    output: Option<&str>
) -> CompileResult<OutputNames> {
    generate_opencl_with_algebra(prog, tree, opts, input, output, &PlainSets)
}
