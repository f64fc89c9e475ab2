//! Dirichlet boundary conditions on the layout edges.

use std::sync::Arc;

use hfd_core::{Real, Size};
use hfd_math::Array;

use super::mesher::FdmMesherComposite;

/// Which edge of a dimension a boundary condition pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    /// The first node of the dimension.
    Lower,
    /// The last node of the dimension.
    Upper,
}

/// Pins every node on one edge plane of the grid to a fixed value, e.g. the
/// rebate on a knock-out barrier.
#[derive(Debug, Clone)]
pub struct FdmDirichletBoundary {
    indices: Vec<Size>,
    value: Real,
}

/// The boundary conditions applied during one solve.
pub type BoundarySet = Vec<FdmDirichletBoundary>;

impl FdmDirichletBoundary {
    /// Pin the `side` edge of `direction` to `value`.
    pub fn new(
        mesher: &Arc<FdmMesherComposite>,
        value: Real,
        direction: Size,
        side: BoundarySide,
    ) -> Self {
        let layout = mesher.layout();
        let edge = match side {
            BoundarySide::Lower => 0,
            BoundarySide::Upper => layout.dim_size(direction) - 1,
        };
        let indices = (0..layout.size())
            .filter(|&i| layout.coordinate(i, direction) == edge)
            .collect();
        Self { indices, value }
    }

    /// Overwrite the pinned nodes.
    pub fn apply(&self, a: &mut Array) {
        for &i in &self.indices {
            a[i] = self.value;
        }
    }
}

/// Apply every condition of a set.
pub fn apply_boundary_set(bc: &BoundarySet, a: &mut Array) {
    for b in bc {
        b.apply(a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::mesher::Mesher1d;

    #[test]
    fn pins_the_requested_edge_plane() {
        let mx = Mesher1d::uniform(0.0, 1.0, 4).unwrap();
        let mv = Mesher1d::uniform(0.0, 1.0, 5).unwrap();
        let mesher = Arc::new(FdmMesherComposite::new(vec![Arc::new(mx), Arc::new(mv)]));
        let bc = FdmDirichletBoundary::new(&mesher, 7.0, 0, BoundarySide::Upper);
        let mut a = Array::zeros(20);
        bc.apply(&mut a);
        let layout = mesher.layout();
        for i in 0..20 {
            let expected = if layout.coordinate(i, 0) == 3 { 7.0 } else { 0.0 };
            assert_eq!(a[i], expected);
        }
    }
}
