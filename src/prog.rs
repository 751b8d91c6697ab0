use crate::poly::*;
use crate::utils::ast::{BinOp, ElemType};

// Describes an array of the original program as seen by the code generator. The extents are the
// symbolic sizes of each dimension, outermost first. A 0-dimensional array is a scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayInfo {
    pub name: String,
    pub elem_type: ElemType,
    pub extents: Vec<Expr>,
    pub read_only_scalar: bool,
    pub space: Space,
}

impl ArrayInfo {
    pub fn new(name: &str, elem_type: &str, extents: Vec<Expr>, params: Vec<String>) -> Self {
        let dims = (0..extents.len())
            .map(|i| format!("i{i}"))
            .collect::<Vec<String>>();
        ArrayInfo {
            name: name.to_string(),
            elem_type: ElemType::from_c_name(elem_type),
            extents,
            read_only_scalar: false,
            space: Space::named(name, params, dims),
        }
    }

    // Marks a scalar that is never written inside any kernel. Such arrays are passed to kernels by
    // value instead of through a device buffer.
    pub fn with_read_only_scalar(mut self, v: bool) -> Self {
        self.read_only_scalar = v && self.is_scalar();
        self
    }

    pub fn dims(&self) -> usize {
        self.extents.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.extents.is_empty()
    }

    pub fn has_device_buffer(&self) -> bool {
        !self.read_only_scalar
    }

    pub fn device_name(&self) -> String {
        format!("dev_{0}", self.name)
    }

    // The condition under which every extent of the array is strictly positive, stated in the
    // parameter space of the array.
    pub fn positive_size_guard(&self) -> Set {
        let space = Space::params(self.space.params.clone());
        let constraints = self.extents.iter()
            .filter_map(|e| match e.as_literal() {
                Some(v) if v > 0 => None,
                Some(_) => Some(Expr::int(0)),
                None => Some(Expr::binop(e.clone(), BinOp::Geq, Expr::int(1))),
            })
            .fold(vec![], |mut acc, c| {
                if !acc.contains(&c) {
                    acc.push(c);
                }
                acc
            });
        Set::from_constraints(space, constraints)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub definition: String,
}

impl TypeDef {
    pub fn new(name: &str, definition: &str) -> Self {
        TypeDef {name: name.to_string(), definition: definition.to_string()}
    }

    pub fn uses_double(&self) -> bool {
        self.definition.contains("double")
    }
}

// The program model: the array catalogue together with the user-defined types, the global
// copy-in and copy-out footprints and the context constraining the parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub params: Vec<String>,
    pub arrays: Vec<ArrayInfo>,
    pub types: Vec<TypeDef>,
    pub copy_in: UnionSet,
    pub copy_out: UnionSet,
    pub context: Set,
}

impl Program {
    pub fn new(params: Vec<String>) -> Self {
        Program {
            arrays: vec![],
            types: vec![],
            copy_in: UnionSet::new(params.clone()),
            copy_out: UnionSet::new(params.clone()),
            context: Set::universe(Space::params(params.clone())),
            params,
        }
    }

    pub fn add_array(mut self, array: ArrayInfo) -> Self {
        self.arrays.push(array);
        self
    }

    pub fn add_type(mut self, ty: TypeDef) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_copy_in(mut self, s: UnionSet) -> Self {
        self.copy_in = s;
        self
    }

    pub fn with_copy_out(mut self, s: UnionSet) -> Self {
        self.copy_out = s;
        self
    }

    pub fn with_context(mut self, s: Set) -> Self {
        self.context = s;
        self
    }

    pub fn lookup_array<'a>(&'a self, name: &str) -> Option<&'a ArrayInfo> {
        self.arrays.iter().find(|a| a.name == name)
    }

    pub fn lookup_array_by_space<'a>(&'a self, space: &Space) -> Option<&'a ArrayInfo> {
        self.arrays.iter().find(|a| a.space.is_compatible(space))
    }

    // Whether the kernel module needs the double-precision extension.
    pub fn uses_double(&self) -> bool {
        self.arrays.iter().any(|a| a.elem_type.is_double()) ||
            self.types.iter().any(|t| t.uses_double())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::pprint::PrettyPrint;

    fn params() -> Vec<String> {
        vec!["N".to_string()]
    }

    #[test]
    fn array_space_dims_follow_extents() {
        let a = ArrayInfo::new("A", "float", vec![Expr::id("N"), Expr::int(4)], params());
        assert_eq!(a.space.dims, vec!["i0".to_string(), "i1".to_string()]);
        assert_eq!(a.space.tuple_name(), Some("A"));
    }

    #[test]
    fn read_only_requires_scalar() {
        let a = ArrayInfo::new("A", "float", vec![Expr::id("N")], params())
            .with_read_only_scalar(true);
        assert!(!a.read_only_scalar);
        let s = ArrayInfo::new("alpha", "float", vec![], params())
            .with_read_only_scalar(true);
        assert!(s.read_only_scalar);
        assert!(!s.has_device_buffer());
    }

    #[test]
    fn literal_extents_give_universe_guard() {
        let a = ArrayInfo::new("A", "int", vec![Expr::int(16), Expr::int(4)], params());
        assert!(PlainSets.is_universe(&a.positive_size_guard()));
    }

    #[test]
    fn symbolic_extent_guard() {
        let a = ArrayInfo::new("A", "int", vec![Expr::id("N"), Expr::int(4)], params());
        let guard = a.positive_size_guard();
        assert!(!PlainSets.is_universe(&guard));
        assert_eq!(guard.pprint_default(), "N >= 1");
    }

    #[test]
    fn repeated_extent_guarded_once() {
        let a = ArrayInfo::new("A", "int", vec![Expr::id("N"), Expr::id("N")], params());
        assert_eq!(a.positive_size_guard().pprint_default(), "N >= 1");
    }

    #[test]
    fn zero_extent_guard_is_empty() {
        let a = ArrayInfo::new("A", "int", vec![Expr::int(0)], params());
        assert!(PlainSets.is_empty(&a.positive_size_guard()));
    }

    #[test]
    fn scalar_guard_is_universe() {
        let a = ArrayInfo::new("x", "double", vec![], params());
        assert!(PlainSets.is_universe(&a.positive_size_guard()));
    }

    #[test]
    fn double_detection() {
        let p = Program::new(params())
            .add_array(ArrayInfo::new("A", "float", vec![Expr::id("N")], params()));
        assert!(!p.uses_double());
        let p = p.add_type(TypeDef::new("pair", "struct pair { double x; int y; }"));
        assert!(p.uses_double());
    }

    #[test]
    fn lookup_by_space() {
        let a = ArrayInfo::new("A", "float", vec![Expr::id("N")], params());
        let p = Program::new(params()).add_array(a.clone());
        assert_eq!(p.lookup_array_by_space(&a.space), Some(&a));
        let other = Space::named("B", params(), vec!["i0".to_string()]);
        assert_eq!(p.lookup_array_by_space(&other), None);
    }
}
