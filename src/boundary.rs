//! Collection of the degrees of freedom attached to a marked part of the mesh boundary.
use crate::basis::BasisSet;
use crate::connectivity::MeshConnectivity3d;
use crate::element::Entity;
use crate::mesh::ElementMesh;
use femesh_sparse::{BsrError, BsrMatrix};
use log::debug;
use nalgebra::{ClosedAdd, Scalar};
use num::{One, Zero};

/// The set of global degrees of freedom attached to a marked set of vertices and to the edges
/// and faces spanned by them, typically used to impose Dirichlet boundary conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCondition {
    dof: Vec<usize>,
}

impl BoundaryCondition {
    /// Collects the degrees of freedom of the selected bases on the given vertices and on every
    /// edge and face whose vertices are all among them.
    ///
    /// Every entity contributes its degrees of freedom once, even when shared by several
    /// elements. The result is in the order of discovery.
    ///
    /// # Panics
    ///
    /// Panics if `basis_select` does not have one entry per basis in the set.
    pub fn new(
        connectivity: &MeshConnectivity3d,
        mesh: &ElementMesh,
        basis_set: &BasisSet,
        basis_select: &[bool],
        vertices: &[usize],
    ) -> Self {
        assert_eq!(
            basis_select.len(),
            basis_set.len(),
            "Basis selection must have one entry per basis."
        );

        let mut labels = connectivity.labels_from_vertices(vertices);
        let mut dof = Vec::new();

        for element in 0..connectivity.num_elements() {
            let kind = connectivity.element_kind(element);
            let element_dof = mesh.element_dof(element);

            let mut collect = |entity: Entity| {
                for (basis_index, basis) in basis_set.iter().enumerate() {
                    if !basis_select[basis_index] {
                        continue;
                    }
                    let begin = basis_set.basis_offset(kind, basis_index) + basis.entity_offset(kind, entity);
                    let end = begin + basis.entity_ndof(kind, entity);
                    dof.extend_from_slice(&element_dof[begin..end]);
                }
            };

            for (local_face, &face) in connectivity.element_faces(element).iter().enumerate() {
                if labels.faces[face] {
                    collect(Entity::Face(local_face));
                    labels.faces[face] = false;
                }
            }
            for (local_edge, &edge) in connectivity.element_edges(element).iter().enumerate() {
                if labels.edges[edge] {
                    collect(Entity::Edge(local_edge));
                    labels.edges[edge] = false;
                }
            }
            for (local_vertex, &vertex) in connectivity.element_vertices(element).iter().enumerate() {
                if labels.vertices[vertex] {
                    collect(Entity::Vertex(local_vertex));
                    labels.vertices[vertex] = false;
                }
            }
        }

        debug!("Collected {} boundary degrees of freedom", dof.len());
        Self { dof }
    }

    pub fn dof(&self) -> &[usize] {
        &self.dof
    }

    pub fn len(&self) -> usize {
        self.dof.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dof.is_empty()
    }

    /// Sets the constrained entries of a global vector to the given value.
    ///
    /// # Panics
    ///
    /// Panics if a constrained degree of freedom is out of bounds for `x`.
    pub fn set_values<T: Clone>(&self, x: &mut [T], value: T) {
        for &i in &self.dof {
            x[i] = value.clone();
        }
    }

    /// Replaces the constrained rows of the matrix by rows of the identity matrix.
    pub fn zero_rows_of<T, const M: usize, const N: usize>(&self, matrix: &mut BsrMatrix<T, M, N>) -> Result<(), BsrError>
    where
        T: Scalar + Zero + One + ClosedAdd,
    {
        matrix.zero_rows(&self.dof)
    }
}
