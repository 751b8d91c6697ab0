pub mod expr;
pub mod set;

pub use expr::{Builtin, Expr};
pub use set::{PlainSets, Set, SetAlgebra, Space, UnionSet};
