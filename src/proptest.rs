//! Strategies for generating mesh connectivity in property-based tests.
use crate::connectivity::MeshConnectivity3d;
use crate::element::ElementKind;
use crate::procedural::{create_box_connectivity, create_mixed_box_connectivity};
use ::proptest::prelude::*;
use ::proptest::sample::Index;
use itertools::Itertools;

/// All relabelings of the local vertices of an element that correspond to proper rotations,
/// i.e. that map every face ring onto a face ring with the same winding.
///
/// A relabeling `perm` replaces the local vertex `v` by the old local vertex `perm[v]`.
pub fn element_rotations(kind: ElementKind) -> Vec<Vec<usize>> {
    let n = kind.num_vertices();
    let is_face_ring = |ring: &[usize]| {
        kind.faces().iter().any(|face| {
            face.len() == ring.len() && (0..ring.len()).any(|r| (0..ring.len()).all(|k| face[(r + k) % ring.len()] == ring[k]))
        })
    };

    (0..n)
        .permutations(n)
        .filter(|perm| {
            kind.faces().iter().all(|face| {
                let mapped: Vec<_> = face.iter().map(|&v| perm[v]).collect();
                is_face_ring(&mapped)
            })
        })
        .collect()
}

/// Generates box dimensions with between 1 and `max_cells_per_dim` cells along each axis.
pub fn box_cells_strategy(max_cells_per_dim: usize) -> impl Strategy<Value = [usize; 3]> {
    ::proptest::array::uniform3(1..=max_cells_per_dim.max(1))
}

pub fn element_kind_strategy() -> impl Strategy<Value = ElementKind> {
    prop_oneof![
        Just(ElementKind::Tet),
        Just(ElementKind::Hex),
        Just(ElementKind::Wedge),
        Just(ElementKind::Pyramid)
    ]
}

/// Generates box meshes of any single element kind, or checkerboards of hexahedra and pyramids.
pub fn box_connectivity_strategy(max_cells_per_dim: usize) -> impl Strategy<Value = MeshConnectivity3d> {
    let single_kind = (box_cells_strategy(max_cells_per_dim), element_kind_strategy())
        .prop_map(|(cells, kind)| create_box_connectivity(cells, kind));
    let mixed = box_cells_strategy(max_cells_per_dim).prop_map(create_mixed_box_connectivity);
    prop_oneof![single_kind, mixed]
}

/// Replaces the local vertex order of every element by a randomly chosen rotation of the element.
///
/// The resulting mesh has the same vertices, faces and edges, but shared entities are seen in
/// many different relative orientations.
pub fn rotate_elements_strategy(connectivity: MeshConnectivity3d) -> impl Strategy<Value = MeshConnectivity3d> {
    let num_elements = connectivity.num_elements();
    let rotations = ElementKind::ALL.map(element_rotations);
    ::proptest::collection::vec(any::<Index>(), num_elements).prop_map(move |choices| {
        let mut arrays: [Vec<usize>; 4] = Default::default();
        for (element, choice) in choices.iter().enumerate() {
            let kind = connectivity.element_kind(element);
            let position = ElementKind::ALL
                .iter()
                .position(|k| *k == kind)
                .expect("Every kind is in the list of all kinds");
            let perm = choice.get(&rotations[position]);
            let vertices = connectivity.element_vertices(element);
            arrays[position].extend(perm.iter().map(|&v| vertices[v]));
        }
        let [tets, hexes, wedges, pyramids] = &arrays;
        MeshConnectivity3d::new(connectivity.num_vertices(), tets, hexes, wedges, pyramids)
            .expect("Rotating elements must preserve validity of the mesh")
    })
}
