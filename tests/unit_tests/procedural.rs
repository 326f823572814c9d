use femesh::element::ElementKind;
use femesh::procedural::{create_box_connectivity, create_mixed_box_connectivity};
use femesh::proptest::{box_cells_strategy, element_kind_strategy};
use proptest::prelude::*;

#[test]
fn single_hex() {
    let conn = create_box_connectivity([1, 1, 1], ElementKind::Hex);
    assert_eq!(conn.num_elements(), 1);
    assert_eq!(conn.num_vertices(), 8);
    assert_eq!(conn.element_vertices(0), &[0, 1, 3, 2, 4, 5, 7, 6]);
    assert_eq!(conn.num_faces(), 6);
    assert_eq!(conn.num_edges(), 12);
}

#[test]
fn single_cube_split_into_tets() {
    let conn = create_box_connectivity([1, 1, 1], ElementKind::Tet);
    assert_eq!(conn.num_elements(), 6);
    assert_eq!(conn.num_vertices(), 8);
    // 12 cube edges, 6 face diagonals and the main diagonal
    assert_eq!(conn.num_edges(), 19);
    assert_eq!(conn.boundary_faces().len(), 12);
    assert_eq!(conn.num_faces(), 18);
}

#[test]
fn single_cube_split_into_wedges() {
    let conn = create_box_connectivity([1, 1, 1], ElementKind::Wedge);
    assert_eq!(conn.num_elements(), 2);
    assert_eq!(conn.num_triangle_faces(), 4);
    assert_eq!(conn.num_quad_faces(), 5);
    // 12 cube edges and the diagonals of the top and bottom faces
    assert_eq!(conn.num_edges(), 14);
}

#[test]
fn single_cube_split_into_pyramids() {
    let conn = create_box_connectivity([1, 1, 1], ElementKind::Pyramid);
    assert_eq!(conn.num_elements(), 6);
    assert_eq!(conn.num_vertices(), 9);
    for element in 0..6 {
        assert_eq!(conn.element_vertices(element)[4], 8);
    }
    assert_eq!(conn.num_edges(), 20);
    assert_eq!(conn.boundary_faces().len(), 6);
}

#[test]
fn mixed_box_alternates_hexes_and_pyramids() {
    let conn = create_mixed_box_connectivity([2, 2, 2]);
    // Four cells of each kind
    assert_eq!(conn.elements_of_kind(ElementKind::Hex).len(), 4);
    assert_eq!(conn.elements_of_kind(ElementKind::Pyramid).len(), 24);
    assert_eq!(conn.num_vertices(), 27 + 4);
}

proptest! {
    #[test]
    fn box_meshes_have_expected_sizes(cells in box_cells_strategy(3), kind in element_kind_strategy()) {
        let conn = create_box_connectivity(cells, kind);
        let [nx, ny, nz] = cells;
        let num_cells = nx * ny * nz;
        let num_grid_vertices = (nx + 1) * (ny + 1) * (nz + 1);

        let (elements_per_cell, extra_vertices) = match kind {
            ElementKind::Hex => (1, 0),
            ElementKind::Tet => (6, 0),
            ElementKind::Wedge => (2, 0),
            ElementKind::Pyramid => (6, num_cells),
        };
        prop_assert_eq!(conn.num_elements(), elements_per_cell * num_cells);
        prop_assert_eq!(conn.num_vertices(), num_grid_vertices + extra_vertices);
        prop_assert_eq!(conn.elements_of_kind(kind), 0..conn.num_elements());
    }
}
