//! The catalog of supported element shapes and their local topology.
//!
//! Vertices follow the Gmsh ordering conventions. Faces are wound so that their normals point
//! out of the element, and triangular faces are always listed before quadrilateral faces.
use serde::{Deserialize, Serialize};

/// The shape of a three-dimensional element.
///
/// Elements of a mixed mesh are numbered by concatenating the ranges of each kind in the order
/// given by [`ElementKind::ALL`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Tet,
    Hex,
    Wedge,
    Pyramid,
}

/// A topological entity of an element, identified by its element-local index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    Vertex(usize),
    Edge(usize),
    Face(usize),
    Volume,
}

static TET_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [0, 2], [0, 3], [2, 3], [1, 3]];
static TET_FACES: [&[usize]; 4] = [&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]];

static HEX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [0, 3],
    [0, 4],
    [1, 2],
    [1, 5],
    [2, 3],
    [2, 6],
    [3, 7],
    [4, 5],
    [4, 7],
    [5, 6],
    [6, 7],
];
static HEX_FACES: [&[usize]; 6] = [
    &[3, 2, 1, 0],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[4, 7, 3, 0],
    &[5, 6, 7, 4],
];

static WEDGE_EDGES: [[usize; 2]; 9] = [
    [0, 1],
    [0, 2],
    [0, 3],
    [1, 2],
    [1, 4],
    [2, 5],
    [3, 4],
    [3, 5],
    [4, 5],
];
static WEDGE_FACES: [&[usize]; 5] = [&[0, 2, 1], &[3, 4, 5], &[0, 1, 4, 3], &[1, 2, 5, 4], &[0, 3, 5, 2]];

static PYRAMID_EDGES: [[usize; 2]; 8] = [[0, 1], [0, 3], [0, 4], [1, 2], [1, 4], [2, 3], [2, 4], [3, 4]];
static PYRAMID_FACES: [&[usize]; 5] = [&[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4], &[0, 3, 2, 1]];

/// Reference coordinates of the hexahedron vertices on the unit cube.
pub static HEX_REFERENCE_VERTICES: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [ElementKind::Tet, ElementKind::Hex, ElementKind::Wedge, ElementKind::Pyramid];

    pub fn num_vertices(self) -> usize {
        match self {
            Self::Tet => 4,
            Self::Hex => 8,
            Self::Wedge => 6,
            Self::Pyramid => 5,
        }
    }

    pub fn num_edges(self) -> usize {
        self.edges().len()
    }

    pub fn num_faces(self) -> usize {
        self.faces().len()
    }

    /// Local vertex pairs of the edges of the element.
    pub fn edges(self) -> &'static [[usize; 2]] {
        match self {
            Self::Tet => &TET_EDGES,
            Self::Hex => &HEX_EDGES,
            Self::Wedge => &WEDGE_EDGES,
            Self::Pyramid => &PYRAMID_EDGES,
        }
    }

    /// Local vertex rings of the faces of the element.
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            Self::Tet => &TET_FACES,
            Self::Hex => &HEX_FACES,
            Self::Wedge => &WEDGE_FACES,
            Self::Pyramid => &PYRAMID_FACES,
        }
    }

    /// Local vertex ring of the given face.
    ///
    /// Panics if the face index is out of bounds.
    pub fn face(self, local_face: usize) -> &'static [usize] {
        self.faces()[local_face]
    }

    /// Local vertex pair of the given edge.
    ///
    /// Panics if the edge index is out of bounds.
    pub fn edge(self, local_edge: usize) -> [usize; 2] {
        self.edges()[local_edge]
    }

    /// Iterates over all entities of the element in canonical order: vertices, edges, faces and
    /// finally the volume.
    ///
    /// This is the order in which element-local degrees of freedom are laid out.
    pub fn entities(self) -> impl Iterator<Item = Entity> {
        let vertices = (0..self.num_vertices()).map(Entity::Vertex);
        let edges = (0..self.num_edges()).map(Entity::Edge);
        let faces = (0..self.num_faces()).map(Entity::Face);
        vertices.chain(edges).chain(faces).chain(std::iter::once(Entity::Volume))
    }
}
