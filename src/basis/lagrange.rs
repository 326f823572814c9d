use crate::basis::{Basis, FunctionSpace};
use crate::element::{ElementKind, Entity};
use crate::orientation::Orientation;
use serde::{Deserialize, Serialize};

/// Placement of continuous Lagrange nodes of a given polynomial degree.
///
/// Every node carries `components` degrees of freedom, stored node by node. Nodes on an edge are
/// ordered from the first to the second vertex of the edge. Nodes on a face are points of a
/// lattice spanned by the face ring: on a quadrilateral `r0 + i/p (r1 - r0) + j/p (r3 - r0)`
/// ordered by `j` then `i`, and on a triangle `r0 + i/p (r1 - r0) + j/p (r2 - r0)` ordered the
/// same way. Interior nodes of a hexahedron are ordered lexicographically by `z`, `y`, `x`.
///
/// All signs are positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagrangeH1 {
    degree: usize,
    components: usize,
}

impl LagrangeH1 {
    /// Panics if `degree` or `components` is zero.
    pub fn new(degree: usize, components: usize) -> Self {
        assert!(degree >= 1, "Lagrange degree must be at least 1.");
        assert!(components >= 1, "Number of components must be at least 1.");
        Self { degree, components }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of nodes on the given entity.
    pub fn entity_nodes(&self, kind: ElementKind, entity: Entity) -> usize {
        // Interior nodes per edge
        let m = self.degree - 1;
        match entity {
            Entity::Vertex(_) => 1,
            Entity::Edge(_) => m,
            Entity::Face(face) => {
                if kind.face(face).len() == 3 {
                    m * m.saturating_sub(1) / 2
                } else {
                    m * m
                }
            }
            Entity::Volume => match kind {
                ElementKind::Tet => m * m.saturating_sub(1) * m.saturating_sub(2) / 6,
                ElementKind::Hex => m * m * m,
                ElementKind::Wedge => m * m * m.saturating_sub(1) / 2,
                ElementKind::Pyramid => m * m.saturating_sub(1) * (2 * m).saturating_sub(1) / 6,
            },
        }
    }

    fn oriented_node(&self, kind: ElementKind, entity: Entity, orientation: Orientation, node: usize) -> usize {
        let m = self.degree - 1;
        match (entity, orientation) {
            (_, Orientation::Aligned) | (Entity::Vertex(_), _) | (Entity::Volume, _) => node,
            (Entity::Edge(_), Orientation::Edge { reversed: true }) => m - 1 - node,
            (Entity::Face(face), Orientation::Face { .. }) => {
                oriented_face_node(kind.face(face).len(), self.degree, orientation, node)
            }
            _ => node,
        }
    }
}

/// Position of an interior face lattice node of the given lattice degree when the face is seen
/// with the given orientation relative to its owner.
///
/// Nodes are numbered as the face nodes of [`LagrangeH1`] of degree `lattice_degree`.
pub(super) fn oriented_face_node(
    num_face_vertices: usize,
    lattice_degree: usize,
    orientation: Orientation,
    node: usize,
) -> usize {
    let p = lattice_degree;
    let m = p - 1;
    match orientation {
        Orientation::Face { .. } if num_face_vertices == 3 => {
            let (i, j) = triangle_lattice_coords(p, node);
            let owner_weights = [p - i - j, i, j];
            let mut weights = [0; 3];
            for (k, &w) in owner_weights.iter().enumerate() {
                weights[orientation.map_vertex(k, 3)] = w;
            }
            triangle_lattice_index(p, weights[1], weights[2])
        }
        Orientation::Face { .. } => {
            const CORNERS: [[isize; 2]; 4] = [[0, 0], [1, 0], [1, 1], [0, 1]];
            let (i, j) = ((node % m + 1) as isize, (node / m + 1) as isize);
            let c0 = CORNERS[orientation.map_vertex(0, 4)];
            let c1 = CORNERS[orientation.map_vertex(1, 4)];
            let c3 = CORNERS[orientation.map_vertex(3, 4)];
            let p = p as isize;
            let x = p * c0[0] + i * (c1[0] - c0[0]) + j * (c3[0] - c0[0]);
            let y = p * c0[1] + i * (c1[1] - c0[1]) + j * (c3[1] - c0[1]);
            (y as usize - 1) * m + (x as usize - 1)
        }
        _ => node,
    }
}

/// Lattice coordinates `(i, j)` of an interior triangle node of degree `p`, ordered by `j` then `i`.
fn triangle_lattice_coords(p: usize, node: usize) -> (usize, usize) {
    let mut remaining = node;
    for j in 1..p {
        let row_len = p - 1 - j;
        if remaining < row_len {
            return (remaining + 1, j);
        }
        remaining -= row_len;
    }
    panic!("Triangle node index {node} out of bounds for degree {p}.")
}

fn triangle_lattice_index(p: usize, i: usize, j: usize) -> usize {
    (1..j).map(|row| p - 1 - row).sum::<usize>() + i - 1
}

impl Basis for LagrangeH1 {
    fn space(&self) -> FunctionSpace {
        FunctionSpace::H1 {
            degree: self.degree,
            components: self.components,
        }
    }

    fn entity_ndof(&self, kind: ElementKind, entity: Entity) -> usize {
        self.components * self.entity_nodes(kind, entity)
    }

    fn entity_dof_position(&self, kind: ElementKind, entity: Entity, orientation: Orientation, k: usize) -> usize {
        let c = self.components;
        c * self.oriented_node(kind, entity, orientation, k / c) + k % c
    }
}
