use crate::basis::{Basis, FunctionSpace};
use crate::element::{ElementKind, Entity};
use serde::{Deserialize, Serialize};

/// Element-wise discontinuous degrees of freedom, all attached to the element interior.
///
/// Since nothing is shared between elements, every element receives its own degrees of freedom.
/// A basis of degree `d` carries one node per monomial of total degree at most `d` on simplices
/// and wedges, and `(d + 1)^3` nodes on hexahedra, ordered lexicographically by `z`, `y`, `x`.
/// Every node carries `components` degrees of freedom, stored node by node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2 {
    degree: usize,
    components: usize,
}

impl L2 {
    /// Piecewise constants with the given number of components.
    pub fn new(components: usize) -> Self {
        Self::with_degree(0, components)
    }

    pub fn with_degree(degree: usize, components: usize) -> Self {
        Self { degree, components }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of nodes in the interior of an element of the given kind.
    pub fn element_nodes(&self, kind: ElementKind) -> usize {
        let n = self.degree + 1;
        match kind {
            ElementKind::Tet => n * (n + 1) * (n + 2) / 6,
            ElementKind::Hex => n * n * n,
            ElementKind::Wedge => n * n * (n + 1) / 2,
            ElementKind::Pyramid => n * (n + 1) * (2 * n + 1) / 6,
        }
    }
}

impl Basis for L2 {
    fn space(&self) -> FunctionSpace {
        FunctionSpace::L2 {
            degree: self.degree,
            components: self.components,
        }
    }

    fn entity_ndof(&self, kind: ElementKind, entity: Entity) -> usize {
        match entity {
            Entity::Volume => self.components * self.element_nodes(kind),
            _ => 0,
        }
    }
}
