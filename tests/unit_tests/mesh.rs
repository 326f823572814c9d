use std::collections::HashMap;

use femesh::basis::{Basis, BasisSet, LagrangeH1, Nedelec, RaviartThomas, L2};
use femesh::connectivity::MeshConnectivity3d;
use femesh::element::{ElementKind, Entity};
use femesh::error::DofError;
use femesh::mesh::{breadth_first_order, ElementMesh};
use femesh::orientation::Orientation;
use femesh::procedural::{create_box_connectivity, create_mixed_box_connectivity};
use femesh::proptest::{box_cells_strategy, rotate_elements_strategy};
use proptest::prelude::*;
use util::{sorted, sorted_unique};

use super::connectivity::one_element_of_each_kind;

fn two_tets() -> MeshConnectivity3d {
    MeshConnectivity3d::new(5, &[0, 1, 2, 3, 0, 2, 1, 4], &[], &[], &[]).unwrap()
}

fn single_basis(basis: impl 'static + Basis) -> BasisSet {
    BasisSet::new().with_basis(basis)
}

#[test]
fn breadth_first_order_of_two_tets() {
    assert_eq!(breadth_first_order(&two_tets()).unwrap(), vec![0, 1]);
}

#[test]
fn numbering_across_element_kinds() {
    let conn = one_element_of_each_kind();
    assert_eq!(breadth_first_order(&conn).unwrap(), vec![0, 3, 1, 2]);

    let basis_set = BasisSet::new()
        .with_basis(LagrangeH1::new(3, 2))
        .with_basis(RaviartThomas::new(1))
        .with_basis(Nedelec);
    let mesh = ElementMesh::new(&conn, &basis_set).unwrap();

    // 112 cubic nodes with two components, 17 faces and 24 edges
    assert_eq!(mesh.num_dof(), 224 + 17 + 24);
    let all_dof = (0..4).flat_map(|element| mesh.element_dof(element).iter().copied());
    assert_eq!(sorted_unique(all_dof), (0..mesh.num_dof()).collect::<Vec<_>>());

    let entity_dof = |element: usize, entity: Entity| {
        let kind = conn.element_kind(element);
        let mut dof = Vec::new();
        for (index, basis) in basis_set.iter().enumerate() {
            let offset = basis_set.basis_offset(kind, index) + basis.entity_offset(kind, entity);
            dof.extend_from_slice(&mesh.element_dof(element)[offset..offset + basis.entity_ndof(kind, entity)]);
        }
        sorted(dof)
    };

    let mut face_dof = HashMap::new();
    let mut edge_dof = HashMap::new();
    let mut vertex_dof = HashMap::new();
    for element in 0..4 {
        for (local, &face) in conn.element_faces(element).iter().enumerate() {
            let dof = entity_dof(element, Entity::Face(local));
            assert_eq!(face_dof.entry(face).or_insert_with(|| dof.clone()), &dof);
        }
        for (local, &edge) in conn.element_edges(element).iter().enumerate() {
            let dof = entity_dof(element, Entity::Edge(local));
            assert_eq!(edge_dof.entry(edge).or_insert_with(|| dof.clone()), &dof);
        }
        for (local, &vertex) in conn.element_vertices(element).iter().enumerate() {
            let dof = entity_dof(element, Entity::Vertex(local));
            assert_eq!(vertex_dof.entry(vertex).or_insert_with(|| dof.clone()), &dof);
        }
        assert!(mesh.element_signs(element).iter().all(|&s| s == 1 || s == -1));
    }
    assert_eq!(face_dof.len(), 17);
    assert_eq!(edge_dof.len(), 24);
    assert_eq!(vertex_dof.len(), 12);

    // One cubic node on each triangle and four on each quadrilateral
    assert_eq!(face_dof[&0].len(), 2 + 1);
    assert_eq!(face_dof[&11].len(), 8 + 1);
    assert_eq!(face_dof[&14].len(), 8 + 1);
}

#[test]
fn linear_lagrange_on_two_tets() {
    let conn = two_tets();
    let mesh = ElementMesh::new(&conn, &single_basis(LagrangeH1::new(1, 1))).unwrap();

    assert_eq!(mesh.num_elements(), 2);
    assert_eq!(mesh.num_dof(), 5);
    // Elements are numbered in reverse breadth-first order, so element 1 claims its vertices first
    assert_eq!(mesh.element_dof(1), &[0, 1, 2, 3]);
    assert_eq!(mesh.element_dof(0), &[0, 2, 1, 4]);
    assert_eq!(mesh.element_signs(0), &[1, 1, 1, 1]);
    assert_eq!(mesh.global_dof(0, 3), 4);
    assert_eq!(mesh.global_dof_sign(1, 2), 1);
    assert_eq!(mesh.element_kind(1), ElementKind::Tet);
}

#[test]
fn quadratic_lagrange_on_two_tets() {
    let conn = two_tets();
    let mesh = ElementMesh::new(&conn, &single_basis(LagrangeH1::new(2, 1))).unwrap();

    // Five vertices and nine edges
    assert_eq!(mesh.num_dof(), 14);
    assert_eq!(mesh.element_dof(0).len(), 10);
    assert_eq!(sorted_unique(mesh.element_dof(0).iter().chain(mesh.element_dof(1)).copied()).len(), 14);

    // The three edges of the shared face carry the same degrees of freedom in both elements
    let edge_dof = |element: usize, edge: usize| {
        let local = conn.local_edge_index(element, edge).unwrap();
        mesh.element_dof(element)[4 + local]
    };
    for edge in [0, 1, 2] {
        assert_eq!(edge_dof(0, edge), edge_dof(1, edge));
    }
}

#[test]
fn raviart_thomas_on_two_tets() {
    let conn = two_tets();
    let mesh = ElementMesh::new(&conn, &single_basis(RaviartThomas::new(1))).unwrap();

    assert_eq!(mesh.num_dof(), 7);
    assert_eq!(mesh.element_dof(1), &[0, 1, 2, 3]);
    assert_eq!(mesh.element_dof(0), &[0, 4, 5, 6]);
    // The shared face is wound in opposite directions by the two elements
    assert_eq!(mesh.element_signs(1), &[1, 1, 1, 1]);
    assert_eq!(mesh.element_signs(0), &[-1, 1, 1, 1]);
}

#[test]
fn nedelec_on_two_tets() {
    let conn = two_tets();
    let mesh = ElementMesh::new(&conn, &single_basis(Nedelec)).unwrap();

    assert_eq!(mesh.num_dof(), 9);
    assert_eq!(mesh.element_dof(1), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(mesh.element_dof(0), &[2, 1, 0, 6, 7, 8]);
    assert_eq!(mesh.element_signs(1), &[1, 1, 1, 1, 1, 1]);
    assert_eq!(mesh.element_signs(0), &[1, -1, 1, 1, 1, 1]);
}

#[test]
fn bases_are_numbered_one_after_another() {
    let conn = two_tets();
    let basis_set = BasisSet::new()
        .with_basis(LagrangeH1::new(1, 1))
        .with_basis(RaviartThomas::new(1));
    let mesh = ElementMesh::new(&conn, &basis_set).unwrap();

    assert_eq!(mesh.num_dof(), 12);
    assert_eq!(mesh.element_dof(1), &[0, 1, 2, 3, 5, 6, 7, 8]);
    assert_eq!(mesh.element_dof(0), &[0, 2, 1, 4, 5, 9, 10, 11]);
    assert_eq!(mesh.element_signs(0), &[1, 1, 1, 1, -1, 1, 1, 1]);
}

#[test]
fn vector_lagrange_and_l2_on_hex_box() {
    let conn = create_box_connectivity([2, 2, 2], ElementKind::Hex);
    let basis_set = BasisSet::new()
        .with_basis(LagrangeH1::new(1, 3))
        .with_basis(L2::new(1));
    let mesh = ElementMesh::new(&conn, &basis_set).unwrap();

    assert_eq!(mesh.num_dof(), 27 * 3 + 8);
    for element in 0..8 {
        let dof = mesh.element_dof(element);
        assert_eq!(dof.len(), 25);
        // Components of a node are consecutive
        for node in 0..8 {
            assert_eq!(dof[3 * node + 1], dof[3 * node] + 1);
            assert_eq!(dof[3 * node + 2], dof[3 * node] + 2);
        }
        assert!(dof[24] >= 81);
    }
}

#[test]
fn disconnected_mesh_is_rejected() {
    let conn = MeshConnectivity3d::new(8, &[0, 1, 2, 3, 4, 5, 6, 7], &[], &[], &[]).unwrap();
    let result = ElementMesh::new(&conn, &single_basis(LagrangeH1::new(1, 1)));
    assert_eq!(result, Err(DofError::DisconnectedMesh { element: 1 }));
    assert_eq!(breadth_first_order(&conn), Err(DofError::DisconnectedMesh { element: 1 }));
}

#[test]
fn empty_mesh_has_no_dof() {
    let conn = MeshConnectivity3d::new(0, &[], &[], &[], &[]).unwrap();
    let mesh = ElementMesh::new(&conn, &single_basis(LagrangeH1::new(2, 1))).unwrap();
    assert_eq!(mesh.num_elements(), 0);
    assert_eq!(mesh.num_dof(), 0);
    assert_eq!(mesh.block_pattern(3).nnz(), 0);
}

/// Vertex coordinates of a box mesh in units of half a cell.
///
/// Vertices past the grid are cell centers, located at the mean of the cell corners they are
/// connected to.
fn vertex_coordinates(cells: [usize; 3], conn: &MeshConnectivity3d) -> Vec<[i64; 3]> {
    let [nx, ny, nz] = cells;
    let num_grid_vertices = (nx + 1) * (ny + 1) * (nz + 1);
    let mut coords: Vec<[i64; 3]> = (0..num_grid_vertices)
        .map(|v| {
            let (i, j, k) = (v % (nx + 1), (v / (nx + 1)) % (ny + 1), v / ((nx + 1) * (ny + 1)));
            [2 * i as i64, 2 * j as i64, 2 * k as i64]
        })
        .collect();

    for center in num_grid_vertices..conn.num_vertices() {
        let corners = sorted_unique(
            conn.vertex_elements(center)
                .iter()
                .flat_map(|&element| conn.element_vertices(element).to_vec())
                .filter(|&v| v != center),
        );
        assert_eq!(corners.len(), 8);
        let sum = corners
            .iter()
            .fold([0; 3], |acc, &v| [0usize, 1, 2].map(|d| acc[d] + coords[v][d]));
        coords.push(sum.map(|x| x / 8));
    }
    coords
}

/// Positions, in units of `1 / (2p)` cells, of the Lagrange nodes on an entity of an element.
fn entity_node_positions(
    conn: &MeshConnectivity3d,
    coords: &[[i64; 3]],
    element: usize,
    entity: Entity,
    p: usize,
) -> Vec<[i64; 3]> {
    let p = p as i64;
    let vertices = conn.element_vertices(element);
    let kind = conn.element_kind(element);
    let x = |local_vertex: usize| coords[vertices[local_vertex]];
    let combine = |terms: &[(i64, [i64; 3])]| {
        [0usize, 1, 2].map(|d| terms.iter().map(|(w, point)| w * point[d]).sum::<i64>())
    };

    match entity {
        Entity::Vertex(v) => vec![combine(&[(p, x(v))])],
        Entity::Edge(e) => {
            let [a, b] = kind.edge(e);
            (1..p).map(|t| combine(&[(p - t, x(a)), (t, x(b))])).collect()
        }
        Entity::Face(f) => {
            let ring = kind.face(f);
            let mut positions = Vec::new();
            if ring.len() == 3 {
                for j in 1..p {
                    for i in 1..p - j {
                        positions.push(combine(&[(p - i - j, x(ring[0])), (i, x(ring[1])), (j, x(ring[2]))]));
                    }
                }
            } else {
                for j in 1..p {
                    for i in 1..p {
                        positions.push(combine(&[(p - i - j, x(ring[0])), (i, x(ring[1])), (j, x(ring[3]))]));
                    }
                }
            }
            positions
        }
        Entity::Volume => Vec::new(),
    }
}

fn rotated_box_strategy() -> impl Strategy<Value = ([usize; 3], MeshConnectivity3d)> {
    (box_cells_strategy(2), 0usize..5).prop_flat_map(|(cells, kind_index)| {
        let conn = match ElementKind::ALL.get(kind_index) {
            Some(&kind) => create_box_connectivity(cells, kind),
            None => create_mixed_box_connectivity(cells),
        };
        (Just(cells), rotate_elements_strategy(conn))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lagrange_dof_are_identified_by_node_positions(
        (cells, conn) in rotated_box_strategy(),
        degree in 1usize..=4,
    ) {
        let basis = LagrangeH1::new(degree, 1);
        let mesh = ElementMesh::new(&conn, &single_basis(basis)).unwrap();
        let coords = vertex_coordinates(cells, &conn);

        let mut position_of_dof = HashMap::new();
        let mut dof_at_position = HashMap::new();
        let mut interior_owner = HashMap::new();
        for element in 0..conn.num_elements() {
            let kind = conn.element_kind(element);
            let element_dof = mesh.element_dof(element);
            prop_assert!(mesh.element_signs(element).iter().all(|&s| s == 1));

            for entity in kind.entities() {
                let offset = basis.entity_offset(kind, entity);
                let ndof = basis.entity_ndof(kind, entity);
                let dof = &element_dof[offset..offset + ndof];
                if entity == Entity::Volume {
                    for &d in dof {
                        prop_assert_eq!(*interior_owner.entry(d).or_insert(element), element);
                    }
                    continue;
                }

                let positions = entity_node_positions(&conn, &coords, element, entity, degree);
                prop_assert_eq!(positions.len(), ndof);
                for (&d, position) in dof.iter().zip(positions) {
                    prop_assert_eq!(*position_of_dof.entry(d).or_insert(position), position);
                    prop_assert_eq!(*dof_at_position.entry(position).or_insert(d), d);
                }
            }
        }

        for d in interior_owner.keys() {
            prop_assert!(!position_of_dof.contains_key(d));
        }
        let all_dof = sorted_unique((0..conn.num_elements()).flat_map(|e| mesh.element_dof(e).to_vec()));
        prop_assert_eq!(all_dof, (0..mesh.num_dof()).collect::<Vec<_>>());
    }

    #[test]
    fn nedelec_signs_follow_a_global_edge_direction((_, conn) in rotated_box_strategy()) {
        let mesh = ElementMesh::new(&conn, &single_basis(Nedelec)).unwrap();
        prop_assert_eq!(mesh.num_dof(), conn.num_edges());

        let mut directions = HashMap::new();
        for element in 0..conn.num_elements() {
            for local_edge in 0..conn.element_kind(element).num_edges() {
                let [a, b] = conn.element_edge_vertices(element, local_edge);
                let direction = if mesh.element_signs(element)[local_edge] == 1 { [a, b] } else { [b, a] };
                let d = mesh.element_dof(element)[local_edge];
                prop_assert_eq!(*directions.entry(d).or_insert(direction), direction);
            }
        }
    }

    #[test]
    fn raviart_thomas_signs_follow_a_global_face_normal((_, conn) in rotated_box_strategy()) {
        let mesh = ElementMesh::new(&conn, &single_basis(RaviartThomas::new(1))).unwrap();
        prop_assert_eq!(mesh.num_dof(), conn.num_faces());

        let mut normals = HashMap::new();
        for element in 0..conn.num_elements() {
            for (local_face, &face) in conn.element_faces(element).iter().enumerate() {
                let canonical = conn.face_vertices(face);
                let local = conn.element_face_vertices(element, local_face);
                let orientation = Orientation::face(canonical.as_slice(), local.as_slice()).unwrap();
                // +1 if the signed flux points along the normal of the canonical ring
                let flip = if orientation.flips_sign() { -1 } else { 1 };
                let normal = flip * mesh.element_signs(element)[local_face];
                let d = mesh.element_dof(element)[local_face];
                prop_assert_eq!(*normals.entry(d).or_insert(normal), normal);
            }
        }
    }
}
