//! Relative orientation of an edge or face as seen from two different elements.
use serde::{Deserialize, Serialize};

/// Describes how the local vertex order of a shared entity in one element relates to the
/// *reference* order in which the owning element sees the same entity.
///
/// For a face ring of `n` vertices, the reference vertex at ring position `k` sits at position
/// `(rotation + k) % n` in the local ring, or at `(rotation + n - k) % n` if the local ring
/// runs in the opposite direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// The local order coincides with the reference order.
    Aligned,
    Edge { reversed: bool },
    Face { rotation: usize, reflected: bool },
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Aligned
    }
}

impl Orientation {
    /// Orientation of the local edge `local` relative to the edge `reference`.
    ///
    /// Returns `None` if the two vertex pairs do not describe the same edge.
    pub fn edge(reference: [usize; 2], local: [usize; 2]) -> Option<Self> {
        if local == reference {
            Some(Self::Edge { reversed: false })
        } else if local == [reference[1], reference[0]] {
            Some(Self::Edge { reversed: true })
        } else {
            None
        }
    }

    /// Orientation of the local face ring `local` relative to the face ring `reference`.
    ///
    /// Returns `None` if the rings have different lengths or do not consist of the same
    /// vertices in cyclic order (up to reflection).
    pub fn face(reference: &[usize], local: &[usize]) -> Option<Self> {
        let n = reference.len();
        if n < 3 || local.len() != n {
            return None;
        }

        let rotation = local.iter().position(|v| *v == reference[0])?;
        let reflected = local[(rotation + 1) % n] != reference[1];
        let orientation = Self::Face { rotation, reflected };

        let consistent = (0..n).all(|k| local[orientation.map_vertex(k, n)] == reference[k]);
        consistent.then_some(orientation)
    }

    /// Maps the reference position `k` of a vertex on an entity with `n` vertices to its
    /// position in the local order.
    pub fn map_vertex(&self, k: usize, n: usize) -> usize {
        match *self {
            Self::Aligned => k,
            Self::Edge { reversed } => {
                if reversed {
                    n - 1 - k
                } else {
                    k
                }
            }
            Self::Face { rotation, reflected } => {
                if reflected {
                    (rotation + n - k) % n
                } else {
                    (rotation + k) % n
                }
            }
        }
    }

    /// Whether the local order traverses the entity in the opposite direction of the reference.
    pub fn flips_sign(&self) -> bool {
        match *self {
            Self::Aligned => false,
            Self::Edge { reversed } => reversed,
            Self::Face { reflected, .. } => reflected,
        }
    }
}
