use crate::basis::lagrange::oriented_face_node;
use crate::basis::{Basis, FunctionSpace};
use crate::element::{ElementKind, Entity};
use crate::orientation::Orientation;
use serde::{Deserialize, Serialize};

/// H(div) conforming placement of Raviart-Thomas normal flux moments.
///
/// A basis of degree `p` carries `p (p + 1) / 2` flux moments on every triangle and `p^2` on every
/// quadrilateral face, laid out like the interior face nodes of a Lagrange basis of degree `p + 2`
/// and `p + 1` respectively. The remaining moments live in the element interior. On a hexahedron
/// they are ordered by normal direction `d`, then by interior lattice plane `l = 1..p`, then by
/// the cell indices `(u, v)` along the two remaining axes, at `d (p - 1) p^2 + (l - 1) + (p - 1) (u + p v)`.
///
/// All face moments change sign on an element that traverses the face ring in the opposite
/// direction of the owning element.
///
/// Pyramids are only supported for the lowest degree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaviartThomas {
    degree: usize,
}

impl Default for RaviartThomas {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RaviartThomas {
    /// Panics if `degree` is zero.
    pub fn new(degree: usize) -> Self {
        assert!(degree >= 1, "Raviart-Thomas degree must be at least 1.");
        Self { degree }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    fn face_lattice_degree(&self, kind: ElementKind, face: usize) -> usize {
        if kind.face(face).len() == 3 {
            self.degree + 2
        } else {
            self.degree + 1
        }
    }
}

impl Basis for RaviartThomas {
    fn space(&self) -> FunctionSpace {
        FunctionSpace::HDiv { degree: self.degree }
    }

    fn entity_ndof(&self, kind: ElementKind, entity: Entity) -> usize {
        let p = self.degree;
        match entity {
            Entity::Face(face) if kind.face(face).len() == 3 => p * (p + 1) / 2,
            Entity::Face(_) => p * p,
            Entity::Volume => match kind {
                ElementKind::Tet => (p - 1) * p * (p + 1) / 2,
                ElementKind::Hex => 3 * (p - 1) * p * p,
                ElementKind::Wedge => (p - 1) * p * (3 * p + 1) / 2,
                ElementKind::Pyramid => {
                    assert_eq!(p, 1, "Raviart-Thomas on pyramids is only supported for degree 1.");
                    0
                }
            },
            _ => 0,
        }
    }

    fn entity_dof_position(&self, kind: ElementKind, entity: Entity, orientation: Orientation, k: usize) -> usize {
        match entity {
            Entity::Face(face) => {
                let lattice_degree = self.face_lattice_degree(kind, face);
                oriented_face_node(kind.face(face).len(), lattice_degree, orientation, k)
            }
            _ => k,
        }
    }

    fn entity_dof_sign(&self, _kind: ElementKind, _entity: Entity, orientation: Orientation, _k: usize) -> i32 {
        if orientation.flips_sign() {
            -1
        } else {
            1
        }
    }
}

/// Lowest-order H(curl) conforming placement: one tangential circulation per edge.
///
/// The circulation changes sign on an element that traverses the edge in the opposite
/// direction of the owning element.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nedelec;

impl Basis for Nedelec {
    fn space(&self) -> FunctionSpace {
        FunctionSpace::HCurl { degree: 1 }
    }

    fn entity_ndof(&self, _kind: ElementKind, entity: Entity) -> usize {
        match entity {
            Entity::Edge(_) => 1,
            _ => 0,
        }
    }

    fn entity_dof_sign(&self, _kind: ElementKind, _entity: Entity, orientation: Orientation, _k: usize) -> i32 {
        if orientation.flips_sign() {
            -1
        } else {
            1
        }
    }
}
