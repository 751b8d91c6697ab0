use super::expr::Expr;
use crate::utils::ast::BinOp;
use crate::utils::pprint::*;

use std::fmt;

// Identifies the space a set lives in. Array spaces are named by the array, kernel iteration
// spaces by their schedule tuple, and the parameter space has no tuple name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Space {
    pub tuple: Option<String>,
    pub params: Vec<String>,
    pub dims: Vec<String>,
}

impl Space {
    pub fn params(params: Vec<String>) -> Space {
        Space {tuple: None, params, dims: vec![]}
    }

    pub fn named(tuple: &str, params: Vec<String>, dims: Vec<String>) -> Space {
        Space {tuple: Some(tuple.to_string()), params, dims}
    }

    pub fn tuple_name<'a>(&'a self) -> Option<&'a str> {
        self.tuple.as_deref()
    }

    // Two spaces are compatible when they share a tuple name. Parameters are aligned by name, so
    // they do not take part in the comparison.
    pub fn is_compatible(&self, other: &Space) -> bool {
        self.tuple == other.tuple && self.dims.len() == other.dims.len()
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params = self.params.join(", ");
        let dims = self.dims.join(", ");
        match &self.tuple {
            Some(t) => write!(f, "[{params}] -> {t}[{dims}]"),
            None => write!(f, "[{params}]"),
        }
    }
}

// A set represented as a union of conjunctions of constraints, where every constraint is a boolean
// expression over the parameters and dimensions of its space. A set without pieces is empty, and a
// piece without constraints is the universe.
#[derive(Clone, Debug, PartialEq)]
pub struct Set {
    space: Space,
    pieces: Vec<Vec<Expr>>,
}

impl Set {
    pub fn universe(space: Space) -> Set {
        Set {space, pieces: vec![vec![]]}
    }

    pub fn empty(space: Space) -> Set {
        Set {space, pieces: vec![]}
    }

    pub fn from_constraints(space: Space, constraints: Vec<Expr>) -> Set {
        Set {space, pieces: vec![constraints]}
    }

    pub fn from_pieces(space: Space, pieces: Vec<Vec<Expr>>) -> Set {
        Set {space, pieces}
    }

    pub fn union(mut self, other: Set) -> Set {
        self.pieces.extend(other.pieces);
        self
    }

    pub fn get_space<'a>(&'a self) -> &'a Space {
        &self.space
    }

    pub fn pieces<'a>(&'a self) -> &'a Vec<Vec<Expr>> {
        &self.pieces
    }

    // The set as a C condition: the disjunction of the conjunctions of each piece.
    pub fn to_condition(&self) -> Expr {
        let conj = |cs: &Vec<Expr>| {
            cs.iter()
                .cloned()
                .reduce(|l, r| Expr::binop(l, BinOp::And, r))
                .unwrap_or(Expr::int(1))
        };
        self.pieces.iter()
            .map(conj)
            .reduce(|l, r| Expr::binop(l, BinOp::Or, r))
            .unwrap_or(Expr::int(0))
    }
}

impl PrettyPrint for Set {
    fn pprint(&self, env: PrettyPrintEnv) -> (PrettyPrintEnv, String) {
        self.to_condition().pprint(env)
    }
}

// A union of sets living in distinct spaces, such as the footprint of a kernel across all arrays
// it accesses.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionSet {
    params: Vec<String>,
    sets: Vec<Set>,
}

impl UnionSet {
    pub fn new(params: Vec<String>) -> UnionSet {
        UnionSet {params, sets: vec![]}
    }

    pub fn add_set(mut self, set: Set) -> UnionSet {
        self.sets.push(set);
        self
    }

    pub fn get_params<'a>(&'a self) -> &'a Vec<String> {
        &self.params
    }

    pub fn sets<'a>(&'a self) -> &'a Vec<Set> {
        &self.sets
    }

    // Collects the parts of the union set living in the given space. The result is empty if no
    // part lives in that space.
    pub fn extract_set(&self, space: &Space) -> Set {
        self.sets.iter()
            .filter(|s| s.get_space().is_compatible(space))
            .fold(Set::empty(space.clone()), |acc, s| acc.union(s.clone()))
    }
}

// The operations the code generator needs from a set library. Results may be conservative: an
// implementation may fail to prove a set empty or universal, in which case the generator emits the
// more general code.
pub trait SetAlgebra {
    fn is_empty(&self, set: &Set) -> bool;

    fn is_universe(&self, set: &Set) -> bool;

    fn intersect(&self, lhs: &Set, rhs: &Set) -> Set;

    // Simplifies a set under the assumption that the context holds.
    fn gist(&self, set: &Set, context: &Set) -> Set;
}

// A purely syntactic implementation of the set operations. Constraints are decided only when they
// fold to constants, and gist only removes constraints that appear verbatim in every piece of the
// context.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainSets;

enum Truth {
    True, False, Unknown
}

fn constraint_truth(c: &Expr) -> Truth {
    match c.eval_const() {
        Some(0) => Truth::False,
        Some(_) => Truth::True,
        None => Truth::Unknown
    }
}

fn is_plainly_false(piece: &Vec<Expr>) -> bool {
    piece.iter().any(|c| matches!(constraint_truth(c), Truth::False))
}

fn simplify_piece(piece: Vec<Expr>) -> Option<Vec<Expr>> {
    if is_plainly_false(&piece) {
        None
    } else {
        let piece = piece.into_iter()
            .filter(|c| !matches!(constraint_truth(c), Truth::True))
            .collect::<Vec<Expr>>();
        Some(piece)
    }
}

impl SetAlgebra for PlainSets {
    fn is_empty(&self, set: &Set) -> bool {
        set.pieces.iter().all(is_plainly_false)
    }

    fn is_universe(&self, set: &Set) -> bool {
        set.pieces.iter()
            .any(|p| p.iter().all(|c| matches!(constraint_truth(c), Truth::True)))
    }

    fn intersect(&self, lhs: &Set, rhs: &Set) -> Set {
        if !lhs.space.is_compatible(&rhs.space) {
            return Set::empty(lhs.space.clone());
        }
        let pieces = lhs.pieces.iter()
            .flat_map(|l| {
                rhs.pieces.iter().filter_map(move |r| {
                    simplify_piece(l.iter().chain(r.iter()).cloned().collect())
                })
            })
            .collect::<Vec<Vec<Expr>>>();
        Set::from_pieces(lhs.space.clone(), pieces)
    }

    fn gist(&self, set: &Set, context: &Set) -> Set {
        let implied = |c: &Expr| {
            !context.pieces.is_empty() && context.pieces.iter().all(|p| p.contains(c))
        };
        let pieces = set.pieces.iter()
            .filter_map(|p| {
                let p = p.iter()
                    .filter(|c| !implied(*c))
                    .cloned()
                    .collect::<Vec<Expr>>();
                simplify_piece(p)
            })
            .collect::<Vec<Vec<Expr>>>();
        Set::from_pieces(set.space.clone(), pieces)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Vec<String> {
        vec!["N".to_string()]
    }

    fn array_space(id: &str) -> Space {
        Space::named(id, params(), vec!["i0".to_string()])
    }

    fn n_positive() -> Expr {
        Expr::binop(Expr::id("N"), BinOp::Geq, Expr::int(1))
    }

    #[test]
    fn empty_set_is_empty() {
        assert!(PlainSets.is_empty(&Set::empty(array_space("A"))));
    }

    #[test]
    fn universe_is_not_empty() {
        let s = Set::universe(array_space("A"));
        assert!(!PlainSets.is_empty(&s));
        assert!(PlainSets.is_universe(&s));
    }

    #[test]
    fn symbolic_constraint_is_neither_empty_nor_universe() {
        let s = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        assert!(!PlainSets.is_empty(&s));
        assert!(!PlainSets.is_universe(&s));
    }

    #[test]
    fn constant_false_constraint_is_empty() {
        let s = Set::from_constraints(Space::params(params()), vec![Expr::int(0)]);
        assert!(PlainSets.is_empty(&s));
    }

    #[test]
    fn intersect_distinct_spaces_is_empty() {
        let a = Set::universe(array_space("A"));
        let b = Set::universe(array_space("B"));
        assert!(PlainSets.is_empty(&PlainSets.intersect(&a, &b)));
    }

    #[test]
    fn intersect_combines_constraints() {
        let a = Set::universe(array_space("A"));
        let b = Set::from_constraints(array_space("A"), vec![n_positive()]);
        let s = PlainSets.intersect(&a, &b);
        assert_eq!(s.pieces(), &vec![vec![n_positive()]]);
    }

    #[test]
    fn gist_removes_context_constraints() {
        let ctx = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        let s = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        assert!(PlainSets.is_universe(&PlainSets.gist(&s, &ctx)));
    }

    #[test]
    fn gist_keeps_unrelated_constraints() {
        let ctx = Set::universe(Space::params(params()));
        let s = Set::from_constraints(Space::params(params()), vec![n_positive()]);
        assert!(!PlainSets.is_universe(&PlainSets.gist(&s, &ctx)));
    }

    #[test]
    fn extract_set_by_tuple() {
        let u = UnionSet::new(params())
            .add_set(Set::universe(array_space("A")))
            .add_set(Set::universe(array_space("B")));
        assert!(!PlainSets.is_empty(&u.extract_set(&array_space("A"))));
        assert!(PlainSets.is_empty(&u.extract_set(&array_space("C"))));
    }

    #[test]
    fn print_condition() {
        let m_positive = Expr::binop(Expr::id("M"), BinOp::Geq, Expr::int(1));
        let s = Set::from_constraints(Space::params(params()), vec![n_positive(), m_positive]);
        assert_eq!(s.pprint_default(), "N >= 1 && M >= 1");
    }

    #[test]
    fn print_space() {
        assert_eq!(array_space("A").to_string(), "[N] -> A[i0]");
    }
}
