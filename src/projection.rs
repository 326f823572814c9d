//! Subdivision of high-order elements into low-order sub-elements.
//!
//! A [`Projection`] describes how the degrees of freedom of a parent element are distributed
//! among a fixed set of sub-elements. It is used by [`ElementMesh::from_projection`] to derive a
//! low-order mesh sharing the global numbering of a high-order mesh, for example to build a
//! low-order preconditioner.
//!
//! [`ElementMesh::from_projection`]: crate::mesh::ElementMesh::from_projection
use crate::basis::{BasisSet, FunctionSpace, LagrangeH1, RaviartThomas, L2};
use crate::element::{ElementKind, Entity, HEX_REFERENCE_VERTICES};
use crate::error::DofError;

pub trait Projection {
    /// Number of sub-elements of a parent of the given kind, or `None` if the kind is not supported.
    fn num_subelements(&self, kind: ElementKind) -> Option<usize>;

    fn subelement_kind(&self, kind: ElementKind) -> ElementKind;

    /// Number of degrees of freedom of a parent element of the given kind.
    fn parent_ndof(&self, kind: ElementKind) -> usize;

    /// Number of degrees of freedom of each sub-element.
    fn subelement_ndof(&self, kind: ElementKind) -> usize;

    /// Fills `index` with the parent-local index of every sub-element-local degree of freedom.
    fn subelement_index(&self, kind: ElementKind, subelement: usize, index: &mut [usize]);

    /// Fills `signs` with the sign of every sub-element-local degree of freedom relative to
    /// the corresponding parent degree of freedom.
    fn subelement_signs(&self, _kind: ElementKind, _subelement: usize, signs: &mut [i32]) {
        signs.fill(1);
    }
}

/// Layout of one basis of a [`HexProjection`] on the sub-elements.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubelementLayout {
    /// Trilinear Lagrange nodes at the corners of the lattice cell.
    Nodal { components: usize },
    /// One lowest-order flux per face of the lattice cell.
    Flux {
        face_offsets: [usize; 6],
        volume_offset: usize,
    },
    /// One node per lattice cell.
    Cellwise { components: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectedBasis {
    layout: SubelementLayout,
    parent_offset: usize,
    subelement_offset: usize,
}

/// Normal axis and side (0 for the lower, 1 for the upper coordinate) of each hexahedron face.
const HEX_FACE_AXES: [(usize, usize); 6] = [(2, 0), (1, 0), (0, 1), (1, 1), (0, 0), (2, 1)];

/// Splits a hexahedron of degree `p` into `p^3` hexahedra, one per cell of its node lattice.
///
/// Sub-element `n` covers the lattice cell `(n % p, (n / p) % p, n / p^2)`. Every basis of the
/// parent basis set is mapped by its function space:
///
/// - a [`LagrangeH1`] basis of degree `p` becomes trilinear on every sub-element,
/// - a [`RaviartThomas`] basis of degree `p` becomes the lowest-order flux basis, with the
///   sub-faces on the parent boundary taking the parent face moments and the interior sub-faces
///   taking the parent interior moments,
/// - an [`L2`] basis of degree `p - 1` becomes piecewise constant, one node per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexProjection {
    degree: usize,
    bases: Vec<ProjectedBasis>,
    parent_ndof: usize,
    subelement_ndof: usize,
    /// Parent-local node of each lattice point `(a, b, c)`, stored at `a + (p + 1) * (b + (p + 1) * c)`.
    lattice_nodes: Vec<usize>,
}

impl HexProjection {
    /// Fails with [`DofError::UnsupportedBasis`] if a basis of the set has no sub-element
    /// counterpart at the given degree. H(curl) bases are never supported.
    ///
    /// Panics if `degree` is zero.
    pub fn new(degree: usize, basis_set: &BasisSet) -> Result<Self, DofError> {
        assert!(degree >= 1, "Projection degree must be at least 1.");
        let kind = ElementKind::Hex;
        let mut bases = Vec::with_capacity(basis_set.len());
        let mut parent_offset = 0;
        let mut subelement_offset = 0;
        for (index, basis) in basis_set.iter().enumerate() {
            let layout = match basis.space() {
                FunctionSpace::H1 { degree: d, components } if d == degree => SubelementLayout::Nodal { components },
                FunctionSpace::HDiv { degree: d } if d == degree => SubelementLayout::Flux {
                    face_offsets: [0, 1, 2, 3, 4, 5].map(|f| basis.entity_offset(kind, Entity::Face(f))),
                    volume_offset: basis.entity_offset(kind, Entity::Volume),
                },
                FunctionSpace::L2 { degree: d, components } if d + 1 == degree => {
                    SubelementLayout::Cellwise { components }
                }
                _ => return Err(DofError::UnsupportedBasis { basis: index }),
            };
            let ndof = match layout {
                SubelementLayout::Nodal { components } => 8 * components,
                SubelementLayout::Flux { .. } => 6,
                SubelementLayout::Cellwise { components } => components,
            };
            bases.push(ProjectedBasis {
                layout,
                parent_offset,
                subelement_offset,
            });
            parent_offset += basis.element_ndof(kind);
            subelement_offset += ndof;
        }

        Ok(Self {
            degree,
            bases,
            parent_ndof: parent_offset,
            subelement_ndof: subelement_offset,
            lattice_nodes: lattice_nodes(degree),
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Parent-local Lagrange node at the lattice point `(a, b, c)`, `0 <= a, b, c <= p`.
    pub fn lattice_node(&self, [a, b, c]: [usize; 3]) -> usize {
        let n = self.degree + 1;
        self.lattice_nodes[a + n * (b + n * c)]
    }

    /// The basis set of the sub-elements.
    pub fn subelement_basis_set(&self) -> BasisSet {
        let mut basis_set = BasisSet::new();
        for basis in &self.bases {
            match basis.layout {
                SubelementLayout::Nodal { components } => basis_set.push(LagrangeH1::new(1, components)),
                SubelementLayout::Flux { .. } => basis_set.push(RaviartThomas::new(1)),
                SubelementLayout::Cellwise { components } => basis_set.push(L2::new(components)),
            }
        }
        basis_set
    }

    /// Basis-local index and sign of the parent flux moment on face `f` of the given cell.
    fn flux_moment(&self, cell: [usize; 3], f: usize, face_offsets: &[usize; 6], volume_offset: usize) -> (usize, i32) {
        let p = self.degree;
        let (axis, side) = HEX_FACE_AXES[f];
        let plane = cell[axis] + side;
        if plane == 0 || plane == p {
            // The sub-face lies on parent face f, whose moments form a p x p lattice spanned by the ring
            let ring = ElementKind::Hex.face(f);
            let corner = |v: usize| HEX_REFERENCE_VERTICES[v].map(|x| x as isize);
            let (u0, u1, u3) = (corner(ring[0]), corner(ring[1]), corner(ring[3]));
            let center = cell.map(|x| 2 * x as isize + 1);
            let scaled_origin = u0.map(|x| 2 * p as isize * x);
            let coordinate = |u: [isize; 3]| {
                let dot: isize = (0..3)
                    .map(|d| (u[d] - u0[d]) * (center[d] - scaled_origin[d]))
                    .sum();
                ((dot - 1) / 2) as usize
            };
            let (s, t) = (coordinate(u1), coordinate(u3));
            (face_offsets[f] + s + p * t, 1)
        } else {
            let [u, v] = match axis {
                0 => [cell[1], cell[2]],
                1 => [cell[0], cell[2]],
                _ => [cell[0], cell[1]],
            };
            let index = volume_offset + axis * (p - 1) * p * p + (plane - 1) + (p - 1) * (u + p * v);
            // Interior moments point along the positive axis
            let sign = if side == 1 { 1 } else { -1 };
            (index, sign)
        }
    }

    fn cell(&self, subelement: usize) -> [usize; 3] {
        let p = self.degree;
        [subelement % p, (subelement / p) % p, subelement / (p * p)]
    }
}

fn lattice_nodes(degree: usize) -> Vec<usize> {
    let p = degree;
    let m = p - 1;
    let n = p + 1;
    let lattice_index = |[a, b, c]: [isize; 3]| a as usize + n * (b as usize + n * c as usize);
    let corner = |v: usize| HEX_REFERENCE_VERTICES[v].map(|x| x as isize);
    let p = p as isize;

    let mut lattice_nodes = vec![0; n * n * n];
    let mut node = 0;
    for v in 0..8 {
        lattice_nodes[lattice_index(corner(v).map(|x| p * x))] = node;
        node += 1;
    }
    for &[v0, v1] in ElementKind::Hex.edges() {
        let (u0, u1) = (corner(v0), corner(v1));
        for t in 1..p {
            let point = [0usize, 1, 2].map(|d| p * u0[d] + t * (u1[d] - u0[d]));
            lattice_nodes[lattice_index(point)] = node;
            node += 1;
        }
    }
    for ring in ElementKind::Hex.faces() {
        let (u0, u1, u3) = (corner(ring[0]), corner(ring[1]), corner(ring[3]));
        for j in 1..p {
            for i in 1..p {
                let point = [0usize, 1, 2].map(|d| p * u0[d] + i * (u1[d] - u0[d]) + j * (u3[d] - u0[d]));
                lattice_nodes[lattice_index(point)] = node;
                node += 1;
            }
        }
    }
    for c in 1..p {
        for b in 1..p {
            for a in 1..p {
                lattice_nodes[lattice_index([a, b, c])] = node;
                node += 1;
            }
        }
    }
    debug_assert_eq!(node, n * n * n);
    debug_assert_eq!(node, 8 + 12 * m + 6 * m * m + m * m * m);
    lattice_nodes
}

impl Projection for HexProjection {
    fn num_subelements(&self, kind: ElementKind) -> Option<usize> {
        let p = self.degree;
        (kind == ElementKind::Hex).then_some(p * p * p)
    }

    fn subelement_kind(&self, _kind: ElementKind) -> ElementKind {
        ElementKind::Hex
    }

    fn parent_ndof(&self, _kind: ElementKind) -> usize {
        self.parent_ndof
    }

    fn subelement_ndof(&self, _kind: ElementKind) -> usize {
        self.subelement_ndof
    }

    fn subelement_index(&self, _kind: ElementKind, subelement: usize, index: &mut [usize]) {
        let p = self.degree;
        let cell = self.cell(subelement);
        for basis in &self.bases {
            let (parent, sub) = (basis.parent_offset, basis.subelement_offset);
            match &basis.layout {
                SubelementLayout::Nodal { components: c } => {
                    let c = *c;
                    for (v, corner) in HEX_REFERENCE_VERTICES.iter().enumerate() {
                        let point = [0usize, 1, 2].map(|d| cell[d] + corner[d]);
                        let node = self.lattice_node(point);
                        for q in 0..c {
                            index[sub + c * v + q] = parent + c * node + q;
                        }
                    }
                }
                SubelementLayout::Flux {
                    face_offsets,
                    volume_offset,
                } => {
                    for f in 0..6 {
                        let (moment, _) = self.flux_moment(cell, f, face_offsets, *volume_offset);
                        index[sub + f] = parent + moment;
                    }
                }
                SubelementLayout::Cellwise { components: c } => {
                    let [i, j, k] = cell;
                    for q in 0..*c {
                        index[sub + q] = parent + q + c * (i + p * (j + p * k));
                    }
                }
            }
        }
    }

    fn subelement_signs(&self, _kind: ElementKind, subelement: usize, signs: &mut [i32]) {
        let cell = self.cell(subelement);
        signs.fill(1);
        for basis in &self.bases {
            if let SubelementLayout::Flux {
                face_offsets,
                volume_offset,
            } = &basis.layout
            {
                for f in 0..6 {
                    let (_, sign) = self.flux_moment(cell, f, face_offsets, *volume_offset);
                    signs[basis.subelement_offset + f] = sign;
                }
            }
        }
    }
}
