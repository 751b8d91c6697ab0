use super::ast::*;
use crate::poly;

use std::cmp;

// The work sizes passed to clEnqueueNDRangeKernel. The global sizes count work-items, not
// work-groups, so the grid sizes of the schedule are scaled by the block sizes where both are
// defined.
#[derive(Clone, Debug, PartialEq)]
pub struct LaunchGeometry {
    pub global: Vec<Expr>,
    pub local: Vec<i64>,
    pub work_dim: usize,
}

fn work_items_in_dim(grid: &[poly::Expr], block: &[i64], i: usize) -> Expr {
    match (grid.get(i), block.get(i)) {
        (Some(g), Some(b)) => Expr::WorkItems {grid: g.clone(), block: *b},
        (None, Some(b)) => Expr::Int {v: *b},
        (Some(g), None) => Expr::Poly {e: g.clone()},
        (None, None) => Expr::Int {v: 1},
    }
}

pub fn resolve(grid: &[poly::Expr], block: &[i64]) -> LaunchGeometry {
    let global = if grid.is_empty() || block.is_empty() {
        vec![Expr::Int {v: 1}]
    } else {
        (0..cmp::max(grid.len(), block.len()))
            .map(|i| work_items_in_dim(grid, block, i))
            .collect::<Vec<Expr>>()
    };
    let local = if block.is_empty() { vec![1] } else { block.to_vec() };
    let work_dim = cmp::max(1, block.len());
    LaunchGeometry {global, local, work_dim}
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opencl::ast_builder::*;
    use crate::utils::ast::BinOp;
    use crate::utils::pprint::*;

    use itertools::Itertools;
    use proptest::prelude::*;

    fn print_global(g: &LaunchGeometry) -> String {
        g.global.iter().map(|e| e.pprint_default()).join(", ")
    }

    fn div(l: poly::Expr, r: i64) -> poly::Expr {
        poly::Expr::binop(l, BinOp::Div, poly_int(r))
    }

    #[test]
    fn more_grid_than_block_dims() {
        let grid = vec![div(poly_id("N"), 32), div(poly_id("N"), 16)];
        let g = resolve(&grid, &[32]);
        assert_eq!(print_global(&g), "(N / 32) * 32, N / 16");
        assert_eq!(g.local, vec![32]);
        assert_eq!(g.work_dim, 1);
    }

    #[test]
    fn more_block_than_grid_dims() {
        let g = resolve(&[poly_id("G")], &[16, 8]);
        assert_eq!(print_global(&g), "(G) * 16, 8");
        assert_eq!(g.local, vec![16, 8]);
        assert_eq!(g.work_dim, 2);
    }

    #[test]
    fn no_block_dims() {
        let g = resolve(&[poly_id("G")], &[]);
        assert_eq!(print_global(&g), "1");
        assert_eq!(g.local, vec![1]);
        assert_eq!(g.work_dim, 1);
    }

    #[test]
    fn no_grid_dims() {
        let g = resolve(&[], &[32, 4]);
        assert_eq!(print_global(&g), "1");
        assert_eq!(g.local, vec![32, 4]);
        assert_eq!(g.work_dim, 2);
    }

    fn grid_sizes(n: usize) -> Vec<poly::Expr> {
        (0..n).map(|i| poly_id(&format!("g{i}"))).collect()
    }

    proptest! {
        #[test]
        fn global_vector_length(g in 0usize..4, b in 0usize..4) {
            let block = (0..b).map(|i| 2 << i).collect::<Vec<i64>>();
            let geom = resolve(&grid_sizes(g), &block);
            let expected = if g == 0 || b == 0 { 1 } else { cmp::max(g, b) };
            prop_assert_eq!(geom.global.len(), expected);
            prop_assert_eq!(geom.work_dim, cmp::max(1, b));
            prop_assert_eq!(geom.local.len(), cmp::max(1, b));
        }

        #[test]
        fn global_entries_by_dimension(g in 1usize..4, b in 1usize..4) {
            let block = (0..b).map(|i| 2 << i).collect::<Vec<i64>>();
            let grid = grid_sizes(g);
            let geom = resolve(&grid, &block);
            for (i, e) in geom.global.iter().enumerate() {
                let expected = if i < cmp::min(g, b) {
                    Expr::WorkItems {grid: grid[i].clone(), block: block[i]}
                } else if i >= g {
                    Expr::Int {v: block[i]}
                } else {
                    Expr::Poly {e: grid[i].clone()}
                };
                prop_assert_eq!(e, &expected);
            }
        }
    }
}
