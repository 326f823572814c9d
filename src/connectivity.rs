//! Topological connectivity of unstructured meshes with mixed element shapes.
//!
//! [`MeshConnectivity3d`] takes the raw element-to-vertex arrays of a mesh consisting of
//! tetrahedra, hexahedra, wedges and pyramids and derives global numberings of the faces and
//! edges shared between elements, along with the adjacency relations needed to traverse the mesh.
//! The construction is purely combinatorial: entities are identified by vertex indices only.
use crate::element::ElementKind;
use crate::error::MeshError;
use fenris_nested_vec::NestedVec;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The vertices of a triangular or quadrilateral face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceVertices {
    num_vertices: usize,
    vertices: [usize; 4],
}

impl FaceVertices {
    /// Panics if the slice does not have length 3 or 4.
    pub fn from_slice(vertices: &[usize]) -> Self {
        assert!(
            vertices.len() == 3 || vertices.len() == 4,
            "Faces must have either 3 or 4 vertices."
        );
        let mut result = Self {
            num_vertices: vertices.len(),
            vertices: [0; 4],
        };
        result.vertices[..vertices.len()].copy_from_slice(vertices);
        result
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.vertices[..self.num_vertices]
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn is_triangle(&self) -> bool {
        self.num_vertices == 3
    }

    /// Returns the canonical representative of the vertex ring.
    ///
    /// The ring is rotated to start at its smallest vertex and traversed in the direction that
    /// makes the second vertex the smaller of the two neighbors. Two rings consisting of the same
    /// vertices in the same cyclic order, up to reflection, have identical canonical forms.
    pub fn canonical(&self) -> Self {
        let v = self.as_slice();
        let n = v.len();
        let start = v.iter().position_min().unwrap_or(0);
        let forward = v[(start + 1) % n] < v[(start + n - 1) % n];

        let mut result = *self;
        for k in 0..n {
            let i = if forward { (start + k) % n } else { (start + n - k) % n };
            result.vertices[k] = v[i];
        }
        result
    }
}

/// The one or two elements sharing a face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceElements {
    /// The element that discovered the face.
    pub first: usize,
    /// The other element sharing the face, if any.
    pub second: Option<usize>,
}

impl FaceElements {
    /// A face is on the boundary exactly when it has no second element.
    pub fn is_boundary(&self) -> bool {
        self.second.is_none()
    }

    /// The element on the opposite side of the face from `element`.
    pub fn other(&self, element: usize) -> Option<usize> {
        if self.first == element {
            self.second
        } else if self.second == Some(element) {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Marks for vertices, edges and faces derived from a subset of vertices.
///
/// An edge is marked when both of its endpoints are marked, and a face is marked when all
/// of its vertices are marked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityLabels {
    pub vertices: Vec<bool>,
    pub edges: Vec<bool>,
    pub faces: Vec<bool>,
}

/// Connectivity of a mesh of tetrahedra, hexahedra, wedges and pyramids.
///
/// Elements are numbered by concatenating the tetrahedra, hexahedra, wedges and pyramids in that
/// order. Global face indices number all triangular faces first, followed by all quadrilateral
/// faces. Edges are undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshConnectivity3d {
    num_vertices: usize,
    kinds: Vec<ElementKind>,
    vertices: NestedVec<usize>,
    vertex_element_offsets: Vec<usize>,
    vertex_elements: Vec<usize>,
    faces: NestedVec<usize>,
    edges: NestedVec<usize>,
    face_elements: Vec<FaceElements>,
    num_triangle_faces: usize,
    num_edges: usize,
}

impl MeshConnectivity3d {
    /// Builds the connectivity from flat element-to-vertex arrays, one per element shape.
    ///
    /// Each array holds the vertices of its elements back to back, in the local vertex order
    /// of the shape.
    ///
    /// # Errors
    ///
    /// Fails if an array length is not a multiple of the vertex count of its shape, if a vertex
    /// index is not smaller than `num_vertices`, or if a face is shared by more than two elements.
    pub fn new(
        num_vertices: usize,
        tets: &[usize],
        hexes: &[usize],
        wedges: &[usize],
        pyramids: &[usize],
    ) -> Result<Self, MeshError> {
        let arrays = [
            (ElementKind::Tet, tets),
            (ElementKind::Hex, hexes),
            (ElementKind::Wedge, wedges),
            (ElementKind::Pyramid, pyramids),
        ];

        let mut kinds = Vec::new();
        let mut vertices = NestedVec::new();
        for (kind, array) in arrays {
            let n = kind.num_vertices();
            if array.len() % n != 0 {
                return Err(MeshError::InvalidElementArray { kind, len: array.len() });
            }
            for element_vertices in array.chunks_exact(n) {
                if let Some(&vertex) = element_vertices.iter().find(|&&v| v >= num_vertices) {
                    return Err(MeshError::VertexOutOfBounds {
                        element: kinds.len(),
                        vertex,
                        num_vertices,
                    });
                }
                kinds.push(kind);
                vertices.push(element_vertices);
            }
        }

        let (vertex_element_offsets, vertex_elements) = compute_vertex_elements(num_vertices, &vertices);

        let mut connectivity = Self {
            num_vertices,
            kinds,
            vertices,
            vertex_element_offsets,
            vertex_elements,
            faces: NestedVec::new(),
            edges: NestedVec::new(),
            face_elements: Vec::new(),
            num_triangle_faces: 0,
            num_edges: 0,
        };
        connectivity.number_faces()?;
        connectivity.number_edges();

        debug!(
            "Built connectivity: {} elements, {} vertices, {} faces ({} triangles, {} quads), {} edges",
            connectivity.num_elements(),
            connectivity.num_vertices(),
            connectivity.num_faces(),
            connectivity.num_triangle_faces(),
            connectivity.num_quad_faces(),
            connectivity.num_edges()
        );
        Ok(connectivity)
    }

    fn number_faces(&mut self) -> Result<(), MeshError> {
        let mut labels: Vec<Vec<Option<usize>>> = self
            .kinds
            .iter()
            .map(|kind| vec![None; kind.num_faces()])
            .collect();
        let mut triangles = Vec::new();
        let mut quads = Vec::new();

        for element in 0..self.num_elements() {
            for local_face in 0..self.kinds[element].num_faces() {
                if labels[element][local_face].is_some() {
                    continue;
                }

                // Any element sharing the face must be adjacent to each of its vertices,
                // so it suffices to search the elements around a single vertex
                let key = self.element_global_face_vertices(element, local_face);
                let mut neighbor = None;
                for &other in self.vertex_elements(key.as_slice()[0]) {
                    if other == element {
                        continue;
                    }
                    for other_face in 0..self.kinds[other].num_faces() {
                        if self.element_global_face_vertices(other, other_face) != key {
                            continue;
                        }
                        if labels[other][other_face].is_some() || neighbor.is_some() {
                            return Err(MeshError::NonManifoldFace { vertices: key });
                        }
                        neighbor = Some((other, other_face));
                    }
                }

                let face_elements = FaceElements {
                    first: element,
                    second: neighbor.map(|(other, _)| other),
                };
                let list = if key.is_triangle() { &mut triangles } else { &mut quads };
                let label = list.len();
                list.push(face_elements);
                labels[element][local_face] = Some(label);
                if let Some((other, other_face)) = neighbor {
                    labels[other][other_face] = Some(label);
                }
            }
        }

        // Quad labels are offset by the number of triangles only now that the count is known
        let num_triangles = triangles.len();
        let mut faces = NestedVec::new();
        for (element_labels, kind) in labels.iter().zip(&self.kinds) {
            let mut element_faces = faces.begin_array();
            for (local_face, label) in element_labels.iter().enumerate() {
                let label = label.expect("Internal error: every face must have been labeled");
                if kind.face(local_face).len() == 3 {
                    element_faces.push_single(label);
                } else {
                    element_faces.push_single(num_triangles + label);
                }
            }
        }

        triangles.extend(quads);
        self.faces = faces;
        self.face_elements = triangles;
        self.num_triangle_faces = num_triangles;
        Ok(())
    }

    fn number_edges(&mut self) {
        let mut labels: Vec<Vec<Option<usize>>> = self
            .kinds
            .iter()
            .map(|kind| vec![None; kind.num_edges()])
            .collect();
        let mut num_edges = 0;

        for element in 0..self.num_elements() {
            for local_edge in 0..self.kinds[element].num_edges() {
                if labels[element][local_edge].is_some() {
                    continue;
                }
                let label = num_edges;
                num_edges += 1;
                labels[element][local_edge] = Some(label);

                let [a, b] = self.element_edge_vertices(element, local_edge);
                for &other in self.vertex_elements(a) {
                    if other == element {
                        continue;
                    }
                    for other_edge in 0..self.kinds[other].num_edges() {
                        let [c, d] = self.element_edge_vertices(other, other_edge);
                        if (c, d) == (a, b) || (c, d) == (b, a) {
                            labels[other][other_edge].get_or_insert(label);
                        }
                    }
                }
            }
        }

        let mut edges = NestedVec::new();
        for element_labels in &labels {
            let mut element_edges = edges.begin_array();
            for label in element_labels {
                element_edges.push_single(label.expect("Internal error: every edge must have been labeled"));
            }
        }
        self.edges = edges;
        self.num_edges = num_edges;
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_elements(&self) -> usize {
        self.kinds.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_elements.len()
    }

    pub fn num_triangle_faces(&self) -> usize {
        self.num_triangle_faces
    }

    pub fn num_quad_faces(&self) -> usize {
        self.num_faces() - self.num_triangle_faces
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Panics if the element index is out of bounds.
    pub fn element_kind(&self, element: usize) -> ElementKind {
        self.kinds[element]
    }

    /// The range of element indices occupied by elements of the given kind.
    pub fn elements_of_kind(&self, kind: ElementKind) -> Range<usize> {
        let begin = self.kinds.partition_point(|k| *k < kind);
        let end = self.kinds.partition_point(|k| *k <= kind);
        begin..end
    }

    /// The global vertex indices of the element in local order.
    ///
    /// Panics if the element index is out of bounds.
    pub fn element_vertices(&self, element: usize) -> &[usize] {
        self.vertices.get(element).expect("Element index out of bounds")
    }

    /// The global face indices of the element, indexed by local face.
    pub fn element_faces(&self, element: usize) -> &[usize] {
        self.faces.get(element).expect("Element index out of bounds")
    }

    /// The global edge indices of the element, indexed by local edge.
    pub fn element_edges(&self, element: usize) -> &[usize] {
        self.edges.get(element).expect("Element index out of bounds")
    }

    /// The elements having the given vertex as one of their vertices, in ascending order.
    pub fn vertex_elements(&self, vertex: usize) -> &[usize] {
        &self.vertex_elements[self.vertex_element_offsets[vertex]..self.vertex_element_offsets[vertex + 1]]
    }

    /// Global vertices of a local face in the local winding of the element.
    pub fn element_face_vertices(&self, element: usize, local_face: usize) -> FaceVertices {
        let element_vertices = self.element_vertices(element);
        let ring = self.kinds[element].face(local_face);
        let mut vertices = [0; 4];
        for (v, &local) in vertices.iter_mut().zip(ring) {
            *v = element_vertices[local];
        }
        FaceVertices::from_slice(&vertices[..ring.len()])
    }

    /// Global vertices of a local face in canonical order.
    ///
    /// The result does not depend on which of the elements sharing the face computes it.
    pub fn element_global_face_vertices(&self, element: usize, local_face: usize) -> FaceVertices {
        self.element_face_vertices(element, local_face).canonical()
    }

    /// Global vertices of a local edge in the local direction of the element.
    pub fn element_edge_vertices(&self, element: usize, local_edge: usize) -> [usize; 2] {
        let element_vertices = self.element_vertices(element);
        let [a, b] = self.kinds[element].edge(local_edge);
        [element_vertices[a], element_vertices[b]]
    }

    /// The elements sharing the given global face.
    pub fn face_elements(&self, face: usize) -> FaceElements {
        self.face_elements[face]
    }

    /// The local index of a global face within an element, if the element has the face.
    pub fn local_face_index(&self, element: usize, face: usize) -> Option<usize> {
        self.element_faces(element).iter().position(|f| *f == face)
    }

    /// The local index of a global edge within an element, if the element has the edge.
    pub fn local_edge_index(&self, element: usize, edge: usize) -> Option<usize> {
        self.element_edges(element).iter().position(|e| *e == edge)
    }

    /// Canonical vertices of a global face.
    pub fn face_vertices(&self, face: usize) -> FaceVertices {
        let first = self.face_elements[face].first;
        let local_face = self
            .local_face_index(first, face)
            .expect("Internal error: the first element of a face must contain it");
        self.element_global_face_vertices(first, local_face)
    }

    /// Elements sharing a face with the given element.
    pub fn face_adjacent_elements(&self, element: usize) -> impl '_ + Iterator<Item = usize> {
        self.element_faces(element)
            .iter()
            .filter_map(move |&face| self.face_elements[face].other(element))
    }

    /// Global indices of all faces that belong to exactly one element.
    pub fn boundary_faces(&self) -> Vec<usize> {
        (0..self.num_faces())
            .filter(|&face| self.face_elements[face].is_boundary())
            .collect()
    }

    /// Sorted global indices of all vertices lying on a boundary face.
    pub fn boundary_vertices(&self) -> Vec<usize> {
        let mut vertices: Vec<_> = self
            .boundary_faces()
            .into_iter()
            .flat_map(|face| self.face_vertices(face).as_slice().to_vec())
            .collect();
        vertices.sort_unstable();
        vertices.dedup();
        vertices
    }

    /// Marks the given vertices and every edge and face whose vertices are all marked.
    ///
    /// Vertex indices outside the mesh are ignored.
    pub fn labels_from_vertices(&self, vertices: &[usize]) -> EntityLabels {
        let mut labels = EntityLabels {
            vertices: vec![false; self.num_vertices()],
            edges: vec![false; self.num_edges()],
            faces: vec![false; self.num_faces()],
        };

        let mut num_ignored = 0;
        for &vertex in vertices {
            match labels.vertices.get_mut(vertex) {
                Some(label) => *label = true,
                None => num_ignored += 1,
            }
        }
        if num_ignored > 0 {
            warn!("Ignored {num_ignored} vertex indices outside the mesh when labeling entities");
        }

        for element in 0..self.num_elements() {
            for (local_edge, &edge) in self.element_edges(element).iter().enumerate() {
                let [a, b] = self.element_edge_vertices(element, local_edge);
                if labels.vertices[a] && labels.vertices[b] {
                    labels.edges[edge] = true;
                }
            }
            for (local_face, &face) in self.element_faces(element).iter().enumerate() {
                let face_vertices = self.element_face_vertices(element, local_face);
                if face_vertices.as_slice().iter().all(|&v| labels.vertices[v]) {
                    labels.faces[face] = true;
                }
            }
        }

        labels
    }
}

/// Computes vertex-to-element adjacency in compressed row form by a counting pass followed
/// by a scatter pass.
fn compute_vertex_elements(num_vertices: usize, element_vertices: &NestedVec<usize>) -> (Vec<usize>, Vec<usize>) {
    let mut offsets = vec![0; num_vertices + 1];
    for &v in element_vertices.iter().flatten() {
        offsets[v + 1] += 1;
    }
    for v in 0..num_vertices {
        offsets[v + 1] += offsets[v];
    }

    let mut cursors = offsets[..num_vertices].to_vec();
    let mut elements = vec![0; offsets[num_vertices]];
    for (element, vertices) in element_vertices.iter().enumerate() {
        for &v in vertices {
            elements[cursors[v]] = element;
            cursors[v] += 1;
        }
    }
    (offsets, elements)
}
