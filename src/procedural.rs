//! Basic procedural mesh generation routines.
//!
//! The generated meshes subdivide a box of `nx x ny x nz` unit cells. Grid vertex `(i, j, k)`
//! has index `i + (nx + 1) * (j + (ny + 1) * k)`. Generators that need additional vertices
//! append them after the grid vertices.
use crate::connectivity::MeshConnectivity3d;
use crate::element::{ElementKind, HEX_REFERENCE_VERTICES};

/// Splits a cube into six tetrahedra around its diagonal from vertex 0 to vertex 6.
///
/// All cubes are split the same way, so the resulting tetrahedra are conforming across cells.
const CUBE_TETS: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
    [0, 5, 1, 6],
];

/// Splits a cube into two wedges along the diagonal from vertex 0 to vertex 2 of the bottom face.
const CUBE_WEDGES: [[usize; 6]; 2] = [[0, 1, 2, 4, 5, 6], [0, 2, 3, 4, 6, 7]];

struct BoxGrid {
    cells: [usize; 3],
}

impl BoxGrid {
    fn num_grid_vertices(&self) -> usize {
        let [nx, ny, nz] = self.cells;
        (nx + 1) * (ny + 1) * (nz + 1)
    }

    /// Global vertices of the cell in hexahedron vertex order.
    fn cell_vertices(&self, [i, j, k]: [usize; 3]) -> [usize; 8] {
        let [nx, ny, _] = self.cells;
        HEX_REFERENCE_VERTICES.map(|[x, y, z]| (i + x) + (nx + 1) * ((j + y) + (ny + 1) * (k + z)))
    }

    fn cells(&self) -> impl Iterator<Item = [usize; 3]> {
        let [nx, ny, nz] = self.cells;
        (0..nz).flat_map(move |k| (0..ny).flat_map(move |j| (0..nx).map(move |i| [i, j, k])))
    }
}

/// Appends six pyramids with a common apex at `center`, one on each face of the cube.
fn push_cube_pyramids(pyramids: &mut Vec<usize>, cube: &[usize; 8], center: usize) {
    // Hexahedron faces are wound outwards, while a pyramid base is wound inwards
    for ring in ElementKind::Hex.faces() {
        pyramids.extend(ring.iter().rev().map(|&v| cube[v]));
        pyramids.push(center);
    }
}

/// Creates the connectivity of a box of unit cells, where each cell is filled with elements of
/// the given kind.
///
/// Cells are split into a single hexahedron, six tetrahedra, two wedges or six pyramids
/// sharing a vertex at the center of the cell.
pub fn create_box_connectivity(cells: [usize; 3], kind: ElementKind) -> MeshConnectivity3d {
    let grid = BoxGrid { cells };
    let mut num_vertices = grid.num_grid_vertices();
    let mut elements = Vec::new();

    for cell in grid.cells() {
        let cube = grid.cell_vertices(cell);
        match kind {
            ElementKind::Hex => elements.extend_from_slice(&cube),
            ElementKind::Tet => {
                for tet in CUBE_TETS {
                    elements.extend(tet.iter().map(|&v| cube[v]));
                }
            }
            ElementKind::Wedge => {
                for wedge in CUBE_WEDGES {
                    elements.extend(wedge.iter().map(|&v| cube[v]));
                }
            }
            ElementKind::Pyramid => {
                push_cube_pyramids(&mut elements, &cube, num_vertices);
                num_vertices += 1;
            }
        }
    }

    let empty: &[usize] = &[];
    let (tets, hexes, wedges, pyramids) = match kind {
        ElementKind::Tet => (&elements[..], empty, empty, empty),
        ElementKind::Hex => (empty, &elements[..], empty, empty),
        ElementKind::Wedge => (empty, empty, &elements[..], empty),
        ElementKind::Pyramid => (empty, empty, empty, &elements[..]),
    };
    MeshConnectivity3d::new(num_vertices, tets, hexes, wedges, pyramids)
        .expect("Internal error: procedurally generated meshes must be valid")
}

/// Creates the connectivity of a box of unit cells alternating between hexahedra and clusters
/// of six pyramids in a checkerboard pattern.
///
/// Cell `(i, j, k)` is a hexahedron if `i + j + k` is even.
pub fn create_mixed_box_connectivity(cells: [usize; 3]) -> MeshConnectivity3d {
    let grid = BoxGrid { cells };
    let mut num_vertices = grid.num_grid_vertices();
    let mut hexes = Vec::new();
    let mut pyramids = Vec::new();

    for cell in grid.cells() {
        let cube = grid.cell_vertices(cell);
        if cell.iter().sum::<usize>() % 2 == 0 {
            hexes.extend_from_slice(&cube);
        } else {
            push_cube_pyramids(&mut pyramids, &cube, num_vertices);
            num_vertices += 1;
        }
    }

    MeshConnectivity3d::new(num_vertices, &[], &hexes, &[], &pyramids)
        .expect("Internal error: procedurally generated meshes must be valid")
}
