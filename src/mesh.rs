//! Global numbering of degrees of freedom on mixed-element meshes.
use crate::basis::{Basis, BasisSet};
use crate::connectivity::MeshConnectivity3d;
use crate::element::{ElementKind, Entity};
use crate::error::DofError;
use crate::orientation::Orientation;
use crate::projection::Projection;
use femesh_sparse::BsrMatrix;
use fenris_nested_vec::NestedVec;
use log::debug;
use nalgebra::Scalar;
use nalgebra_sparse::pattern::SparsityPattern;
use num::Zero;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;

/// Orders the elements by a breadth-first traversal over shared faces, starting at element 0.
///
/// # Errors
///
/// Returns [`DofError::DisconnectedMesh`] if some element cannot be reached from element 0.
pub fn breadth_first_order(connectivity: &MeshConnectivity3d) -> Result<Vec<usize>, DofError> {
    let num_elements = connectivity.num_elements();
    let mut order = Vec::with_capacity(num_elements);
    if num_elements == 0 {
        return Ok(order);
    }

    let mut visited = vec![false; num_elements];
    let mut queue = VecDeque::new();
    visited[0] = true;
    queue.push_back(0);

    while let Some(element) = queue.pop_front() {
        order.push(element);
        for neighbor in connectivity.face_adjacent_elements(element) {
            if !visited[neighbor] {
                visited[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }

    match visited.iter().position(|v| !v) {
        Some(element) => Err(DofError::DisconnectedMesh { element }),
        None => Ok(order),
    }
}

/// Per-element global degrees of freedom and their signs.
///
/// Every mesh entity (vertex, edge, face) carrying degrees of freedom is owned by exactly one of
/// the elements containing it. The owner allocates a contiguous block of global indices for the
/// entity, and every other element containing the entity refers to the same indices, permuted
/// and sign-flipped according to how it sees the entity relative to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMesh {
    kinds: Vec<ElementKind>,
    dof: NestedVec<usize>,
    signs: NestedVec<i32>,
    num_dof: usize,
}

impl ElementMesh {
    /// Numbers the degrees of freedom of all bases in the set.
    ///
    /// Bases are numbered one after another. For each basis, elements are visited in reverse
    /// breadth-first order, and within an element the volume is numbered first, followed by
    /// faces, edges and vertices. Entities not yet owned are claimed by the visiting element.
    ///
    /// # Errors
    ///
    /// Returns [`DofError::DisconnectedMesh`] if the elements are not all connected through
    /// shared faces.
    pub fn new(connectivity: &MeshConnectivity3d, basis_set: &BasisSet) -> Result<Self, DofError> {
        let order = breadth_first_order(connectivity)?;

        let kinds: Vec<_> = (0..connectivity.num_elements())
            .map(|element| connectivity.element_kind(element))
            .collect();
        let mut dof = NestedVec::new();
        let mut signs = NestedVec::new();
        for &kind in &kinds {
            let n = basis_set.element_ndof(kind);
            dof.push(&vec![0; n]);
            signs.push(&vec![1; n]);
        }

        let mut mesh = Self {
            kinds,
            dof,
            signs,
            num_dof: 0,
        };

        let mut buffer = Vec::new();
        for (basis_index, basis) in basis_set.iter().enumerate() {
            let mut face_owners = vec![None; connectivity.num_faces()];
            let mut edge_owners = vec![None; connectivity.num_edges()];
            let mut vertex_owners = vec![None; connectivity.num_vertices()];

            for &element in order.iter().rev() {
                let kind = mesh.kinds[element];
                let range = mesh.basis_range(basis_set, basis_index, element);
                mesh.allocate(basis, element, Entity::Volume, range.clone(), &mut buffer);

                for (local_face, &face) in connectivity.element_faces(element).iter().enumerate() {
                    let entity = Entity::Face(local_face);
                    if basis.entity_ndof(kind, entity) == 0 {
                        continue;
                    }
                    match face_owners[face] {
                        Some(owner) if owner != element => {
                            let owner_face = connectivity
                                .local_face_index(owner, face)
                                .expect("Internal error: owner must contain the face");
                            let reference = connectivity.element_face_vertices(owner, owner_face);
                            let local = connectivity.element_face_vertices(element, local_face);
                            let orientation = Orientation::face(reference.as_slice(), local.as_slice())
                                .expect("Internal error: shared faces must have identical vertex rings");
                            let owner_range = mesh.basis_range(basis_set, basis_index, owner);
                            let owner_entity = (owner, Entity::Face(owner_face), owner_range);
                            mesh.copy_from_owner(basis, owner_entity, element, entity, range.clone(), orientation, &mut buffer);
                        }
                        _ => {
                            face_owners[face] = Some(element);
                            mesh.allocate(basis, element, entity, range.clone(), &mut buffer);
                        }
                    }
                }

                for (local_edge, &edge) in connectivity.element_edges(element).iter().enumerate() {
                    let entity = Entity::Edge(local_edge);
                    if basis.entity_ndof(kind, entity) == 0 {
                        continue;
                    }
                    match edge_owners[edge] {
                        Some(owner) if owner != element => {
                            let owner_edge = connectivity
                                .local_edge_index(owner, edge)
                                .expect("Internal error: owner must contain the edge");
                            let reference = connectivity.element_edge_vertices(owner, owner_edge);
                            let local = connectivity.element_edge_vertices(element, local_edge);
                            let orientation = Orientation::edge(reference, local)
                                .expect("Internal error: shared edges must have identical endpoints");
                            let owner_range = mesh.basis_range(basis_set, basis_index, owner);
                            let owner_entity = (owner, Entity::Edge(owner_edge), owner_range);
                            mesh.copy_from_owner(basis, owner_entity, element, entity, range.clone(), orientation, &mut buffer);
                        }
                        _ => {
                            edge_owners[edge] = Some(element);
                            mesh.allocate(basis, element, entity, range.clone(), &mut buffer);
                        }
                    }
                }

                for (local_vertex, &vertex) in connectivity.element_vertices(element).iter().enumerate() {
                    let entity = Entity::Vertex(local_vertex);
                    if basis.entity_ndof(kind, entity) == 0 {
                        continue;
                    }
                    match vertex_owners[vertex] {
                        Some(owner) if owner != element => {
                            let owner_vertex = connectivity
                                .element_vertices(owner)
                                .iter()
                                .position(|v| *v == vertex)
                                .expect("Internal error: owner must contain the vertex");
                            let owner_range = mesh.basis_range(basis_set, basis_index, owner);
                            let owner_entity = (owner, Entity::Vertex(owner_vertex), owner_range);
                            mesh.copy_from_owner(
                                basis,
                                owner_entity,
                                element,
                                entity,
                                range.clone(),
                                Orientation::Aligned,
                                &mut buffer,
                            );
                        }
                        _ => {
                            vertex_owners[vertex] = Some(element);
                            mesh.allocate(basis, element, entity, range.clone(), &mut buffer);
                        }
                    }
                }
            }
        }

        debug!(
            "Numbered {} degrees of freedom for {} bases on {} elements",
            mesh.num_dof,
            basis_set.len(),
            mesh.num_elements()
        );
        Ok(mesh)
    }

    /// Derives a mesh of sub-elements by subdividing every element of a mesh.
    ///
    /// The degrees of freedom and signs of each sub-element are gathered from its parent
    /// element through the projection. No new degrees of freedom are created, so the result
    /// has the same number of degrees of freedom as the parent mesh.
    ///
    /// # Errors
    ///
    /// Fails if the projection does not support the kind of an element, or if the number of
    /// degrees of freedom of an element differs from what the projection expects.
    pub fn from_projection(mesh: &ElementMesh, projection: &dyn Projection) -> Result<Self, DofError> {
        let mut kinds = Vec::new();
        let mut dof = NestedVec::new();
        let mut signs = NestedVec::new();

        let mut index = Vec::new();
        let mut local_signs = Vec::new();
        for element in 0..mesh.num_elements() {
            let kind = mesh.kinds[element];
            let num_subelements = projection
                .num_subelements(kind)
                .ok_or(DofError::UnsupportedProjection { element, kind })?;
            let parent_dof = mesh.element_dof(element);
            let parent_signs = mesh.element_signs(element);
            let expected = projection.parent_ndof(kind);
            if parent_dof.len() != expected {
                return Err(DofError::ProjectionMismatch {
                    element,
                    expected,
                    actual: parent_dof.len(),
                });
            }

            let n = projection.subelement_ndof(kind);
            index.resize(n, 0);
            local_signs.resize(n, 1);
            for subelement in 0..num_subelements {
                projection.subelement_index(kind, subelement, &mut index);
                projection.subelement_signs(kind, subelement, &mut local_signs);
                let mut subelement_dof = dof.begin_array();
                let mut subelement_signs = signs.begin_array();
                for (&i, &s) in index.iter().zip(&local_signs) {
                    subelement_dof.push_single(parent_dof[i]);
                    subelement_signs.push_single(s * parent_signs[i]);
                }
                kinds.push(projection.subelement_kind(kind));
            }
        }

        debug!(
            "Projected {} elements onto {} sub-elements",
            mesh.num_elements(),
            kinds.len()
        );
        Ok(Self {
            kinds,
            dof,
            signs,
            num_dof: mesh.num_dof,
        })
    }

    /// Range of the basis within the element-local layout of the element.
    fn basis_range(&self, basis_set: &BasisSet, basis: usize, element: usize) -> Range<usize> {
        let kind = self.kinds[element];
        let begin = basis_set.basis_offset(kind, basis);
        begin..begin + basis_set.basis(basis).element_ndof(kind)
    }

    fn element_arrays_mut(&mut self, element: usize) -> (&mut [usize], &mut [i32]) {
        let dof = self
            .dof
            .get_mut(element)
            .expect("Internal error: element index out of bounds");
        let signs = self
            .signs
            .get_mut(element)
            .expect("Internal error: element index out of bounds");
        (dof, signs)
    }

    fn allocate(
        &mut self,
        basis: &dyn Basis,
        element: usize,
        entity: Entity,
        range: Range<usize>,
        buffer: &mut Vec<usize>,
    ) {
        let kind = self.kinds[element];
        let n = basis.entity_ndof(kind, entity);
        buffer.clear();
        buffer.extend(self.num_dof..self.num_dof + n);
        self.num_dof += n;

        let (dof, signs) = self.element_arrays_mut(element);
        basis.set_entity_dof(kind, entity, Orientation::Aligned, buffer, &mut dof[range.clone()]);
        basis.set_entity_signs(kind, entity, Orientation::Aligned, &mut signs[range]);
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_from_owner(
        &mut self,
        basis: &dyn Basis,
        (owner, owner_entity, owner_range): (usize, Entity, Range<usize>),
        element: usize,
        entity: Entity,
        range: Range<usize>,
        orientation: Orientation,
        buffer: &mut Vec<usize>,
    ) {
        let owner_kind = self.kinds[owner];
        buffer.clear();
        buffer.resize(basis.entity_ndof(owner_kind, owner_entity), 0);
        basis.get_entity_dof(
            owner_kind,
            owner_entity,
            Orientation::Aligned,
            &self.element_dof(owner)[owner_range],
            buffer,
        );

        let kind = self.kinds[element];
        let (dof, signs) = self.element_arrays_mut(element);
        basis.set_entity_dof(kind, entity, orientation, buffer, &mut dof[range.clone()]);
        basis.set_entity_signs(kind, entity, orientation, &mut signs[range]);
    }

    pub fn num_elements(&self) -> usize {
        self.kinds.len()
    }

    /// Total number of global degrees of freedom.
    pub fn num_dof(&self) -> usize {
        self.num_dof
    }

    pub fn element_kind(&self, element: usize) -> ElementKind {
        self.kinds[element]
    }

    /// Global degrees of freedom of the element in its element-local layout.
    ///
    /// Panics if the element index is out of bounds.
    pub fn element_dof(&self, element: usize) -> &[usize] {
        self.dof.get(element).expect("Element index out of bounds")
    }

    /// Signs (`1` or `-1`) of the element's degrees of freedom, parallel to
    /// [`element_dof`](Self::element_dof).
    pub fn element_signs(&self, element: usize) -> &[i32] {
        self.signs.get(element).expect("Element index out of bounds")
    }

    /// Global index of the element-local degree of freedom.
    pub fn global_dof(&self, element: usize, local: usize) -> usize {
        self.element_dof(element)[local]
    }

    pub fn global_dof_sign(&self, element: usize, local: usize) -> i32 {
        self.element_signs(element)[local]
    }

    /// Sparsity pattern of a square block matrix with `block_size x block_size` blocks.
    ///
    /// Degree of freedom `i` belongs to block row `i / block_size`. Two block rows are coupled
    /// when some element has degrees of freedom in both of them.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn block_pattern(&self, block_size: usize) -> SparsityPattern {
        assert!(block_size > 0, "Block size must be positive.");

        // Collecting into a BTreeSet stores each block exactly once and yields the entries
        // in row-major order
        let mut block_entries = BTreeSet::new();
        let mut block_rows = Vec::new();
        for element in 0..self.num_elements() {
            block_rows.clear();
            block_rows.extend(self.element_dof(element).iter().map(|dof| dof / block_size));
            block_rows.sort_unstable();
            block_rows.dedup();

            for &i in &block_rows {
                for &j in &block_rows {
                    block_entries.insert((i, j));
                }
            }
        }

        let num_block_rows = (self.num_dof + block_size - 1) / block_size;
        let mut offsets = Vec::with_capacity(num_block_rows + 1);
        let mut column_indices = Vec::with_capacity(block_entries.len());

        offsets.push(0);
        for (i, j) in block_entries {
            while i + 1 > offsets.len() {
                // Consecutive empty rows require pushing several offsets
                offsets.push(column_indices.len());
            }
            column_indices.push(j);
        }

        while offsets.len() < (num_block_rows + 1) {
            offsets.push(column_indices.len());
        }

        SparsityPattern::try_from_offsets_and_indices(num_block_rows, num_block_rows, offsets, column_indices)
            .expect("Internal error: block pattern must be valid")
    }

    /// Creates a zero-valued block sparse matrix over all degrees of freedom with the
    /// sparsity given by [`block_pattern`](Self::block_pattern).
    pub fn create_block_matrix<T, const M: usize>(&self) -> BsrMatrix<T, M, M>
    where
        T: Scalar + Zero,
    {
        let pattern = self.block_pattern(M);
        debug!(
            "Created block pattern with {} block rows and {} blocks of size {M}",
            pattern.major_dim(),
            pattern.nnz()
        );
        BsrMatrix::from_sparsity_pattern(&pattern)
    }
}
