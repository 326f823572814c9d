//! Topology and degree-of-freedom numbering for unstructured finite element meshes with mixed
//! tetrahedral, hexahedral, wedge and pyramid elements.
//!
//! The typical pipeline builds a [`MeshConnectivity3d`](connectivity::MeshConnectivity3d) from raw
//! element arrays, numbers the degrees of freedom of a [`BasisSet`](basis::BasisSet) with
//! [`ElementMesh`](mesh::ElementMesh), and creates a block sparse matrix from the resulting
//! numbering.
pub mod basis;
pub mod boundary;
pub mod connectivity;
pub mod element;
pub mod error;
pub mod mesh;
pub mod orientation;
pub mod procedural;
pub mod projection;

pub mod sparse {
    pub use femesh_sparse::*;
}

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
