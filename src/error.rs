//! Error types for mesh construction and degree-of-freedom numbering.
use crate::connectivity::FaceVertices;
use crate::element::ElementKind;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors encountered while building mesh connectivity from raw element arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MeshError {
    /// The length of a flat element array is not a multiple of the vertex count of its shape.
    InvalidElementArray { kind: ElementKind, len: usize },
    /// An element references a vertex outside `[0, num_vertices)`.
    VertexOutOfBounds {
        element: usize,
        vertex: usize,
        num_vertices: usize,
    },
    /// A face is shared by more than two elements.
    NonManifoldFace { vertices: FaceVertices },
}

impl Display for MeshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElementArray { kind, len } => write!(
                f,
                "Array of {kind:?} elements has length {len}, which is not a multiple of {}",
                kind.num_vertices()
            ),
            Self::VertexOutOfBounds {
                element,
                vertex,
                num_vertices,
            } => write!(
                f,
                "Element {element} references vertex {vertex}, but the mesh only has {num_vertices} vertices"
            ),
            Self::NonManifoldFace { vertices } => write!(
                f,
                "Face with vertices {:?} is shared by more than two elements",
                vertices.as_slice()
            ),
        }
    }
}

impl Error for MeshError {}

/// Errors encountered while numbering degrees of freedom.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DofError {
    /// The given element cannot be reached from element 0 through shared faces.
    DisconnectedMesh { element: usize },
    /// The projection does not know how to subdivide elements of this kind.
    UnsupportedProjection { element: usize, kind: ElementKind },
    /// The number of degrees of freedom of an element does not match what the projection expects.
    ProjectionMismatch {
        element: usize,
        expected: usize,
        actual: usize,
    },
    /// The basis at the given position of a basis set has no sub-element counterpart in the projection.
    UnsupportedBasis { basis: usize },
}

impl Display for DofError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisconnectedMesh { element } => write!(
                f,
                "Mesh is not face-connected: element {element} is not reachable from element 0"
            ),
            Self::UnsupportedProjection { element, kind } => {
                write!(f, "Element {element} of kind {kind:?} is not supported by the projection")
            }
            Self::ProjectionMismatch {
                element,
                expected,
                actual,
            } => write!(
                f,
                "Element {element} has {actual} degrees of freedom, but the projection expects {expected}"
            ),
            Self::UnsupportedBasis { basis } => write!(f, "Basis {basis} cannot be projected onto sub-elements"),
        }
    }
}

impl Error for DofError {}
