use crate::poly::*;
use crate::poly::expr::collect_builtins;
use crate::utils::smap::SFold;

use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CopyDirection {
    // From global memory into the staging variable.
    Read,
    // From the staging variable back into global memory.
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VarKind {
    Local, Private
}

// A staging variable of a kernel, holding a tile of the backing array in work-group local or
// work-item private memory.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelVar {
    pub name: String,
    pub array: String,
    pub kind: VarKind,
    pub size: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    pub id: usize,

    // The parts of each array accessed by the kernel, in the space of the respective array.
    pub footprint: UnionSet,

    // The host iteration space in which the kernel is launched. Its dimensions are the host loop
    // iterators live at the launch site.
    pub space: Space,

    pub grid_size: Vec<Expr>,
    pub block_size: Vec<i64>,
    pub vars: Vec<KernelVar>,
    pub body: Box<Node>,
}

impl Kernel {
    pub fn name(&self) -> String {
        format!("kernel{0}", self.id)
    }

    pub fn lookup_var<'a>(&'a self, name: &str) -> Option<&'a KernelVar> {
        self.vars.iter().find(|v| v.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    // A statement of the original program, already rendered as text.
    Statement {name: String, text: String},
    Copy {
        var: String,
        array: String,
        dir: CopyDirection,
        local_index: Vec<Expr>,
        global_index: Vec<Expr>,
    },
    Sync,
    Launch {kernel: Box<Kernel>},
}

// The scheduled AST. A 'For' node iterates 'iter' starting from 'init' while 'cond' holds,
// incrementing by 'inc'.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    For {iter: String, init: Expr, cond: Expr, inc: Expr, body: Vec<Node>},
    If {cond: Expr, thn: Vec<Node>, els: Vec<Node>},
    Block {body: Vec<Node>},
    User {leaf: Leaf},
}

impl SFold<Node> for Node {
    fn sfold_result<A, E>(
        &self,
        acc: Result<A, E>,
        f: impl Fn(A, &Node) -> Result<A, E>
    ) -> Result<A, E> {
        match self {
            Node::For {body, ..} => body.sfold_result(acc, f),
            Node::If {thn, els, ..} => els.sfold_result(thn.sfold_result(acc, &f), &f),
            Node::Block {body} => body.sfold_result(acc, f),
            Node::User {..} => acc,
        }
    }
}

impl SFold<Expr> for Node {
    fn sfold_result<A, E>(
        &self,
        acc: Result<A, E>,
        f: impl Fn(A, &Expr) -> Result<A, E>
    ) -> Result<A, E> {
        match self {
            Node::For {init, cond, inc, ..} => f(f(f(acc?, init)?, cond)?, inc),
            Node::If {cond, ..} => f(acc?, cond),
            Node::Block {..} => acc,
            Node::User {leaf: Leaf::Copy {local_index, global_index, ..}} => {
                global_index.sfold_result(local_index.sfold_result(acc, &f), &f)
            },
            Node::User {leaf: Leaf::Launch {kernel}} => kernel.grid_size.sfold_result(acc, f),
            Node::User {..} => acc,
        }
    }
}

// Collects the builtin functions used by the expressions of a tree. Kernel bodies are not entered,
// as they are emitted into a separate module.
pub fn used_builtins(acc: BTreeSet<Builtin>, node: &Node) -> BTreeSet<Builtin> {
    let acc = <Node as SFold<Expr>>::sfold(node, acc, collect_builtins);
    <Node as SFold<Node>>::sfold(node, acc, used_builtins)
}
