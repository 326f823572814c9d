//! Placement of element-local degrees of freedom on topological entities.
//!
//! The numbering code does not know anything about the shape functions of a basis. It only needs
//! to know how many degrees of freedom a basis attaches to each entity of an element, and how
//! those degrees of freedom are permuted and sign-flipped when an element sees a shared entity
//! in a different orientation than the element that owns it. This is captured by [`Basis`].
//!
//! Within an element, the degrees of freedom of a single basis are laid out entity by entity in
//! the canonical order given by [`ElementKind::entities`]. A [`BasisSet`] concatenates the layouts
//! of several bases.
use crate::element::{ElementKind, Entity};
use crate::orientation::Orientation;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

mod discontinuous;
mod lagrange;
mod vector;

pub use discontinuous::L2;
pub use lagrange::LagrangeH1;
pub use vector::{Nedelec, RaviartThomas};

/// Function space spanned by a basis, with the parameters that determine its layout.
///
/// Degrees follow the usual conventions: the lowest-order Raviart-Thomas and Nedelec spaces have
/// degree 1 and piecewise constants have degree 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionSpace {
    H1 { degree: usize, components: usize },
    HDiv { degree: usize },
    HCurl { degree: usize },
    L2 { degree: usize, components: usize },
}

/// Describes where a basis places its degrees of freedom on the entities of an element.
pub trait Basis: Debug {
    fn space(&self) -> FunctionSpace;

    /// Number of degrees of freedom attached to the given entity of an element of the given kind.
    fn entity_ndof(&self, kind: ElementKind, entity: Entity) -> usize;

    /// Position within the entity's block of element-local degrees of freedom at which the
    /// `k`-th degree of freedom of the owning element lands, when the entity is seen with the
    /// given orientation relative to the owner.
    fn entity_dof_position(&self, _kind: ElementKind, _entity: Entity, _orientation: Orientation, k: usize) -> usize {
        k
    }

    /// Sign of the `k`-th degree of freedom of the owning element when the entity is seen with
    /// the given orientation relative to the owner.
    fn entity_dof_sign(&self, _kind: ElementKind, _entity: Entity, _orientation: Orientation, _k: usize) -> i32 {
        1
    }

    fn element_ndof(&self, kind: ElementKind) -> usize {
        kind.entities()
            .map(|entity| self.entity_ndof(kind, entity))
            .sum()
    }

    /// Offset of the entity's block within the element-local layout of this basis.
    fn entity_offset(&self, kind: ElementKind, entity: Entity) -> usize {
        kind.entities()
            .take_while(|e| *e != entity)
            .map(|e| self.entity_ndof(kind, e))
            .sum()
    }

    /// Writes the global degrees of freedom of an entity, given in the owner's order, into
    /// the element-local array of this basis.
    fn set_entity_dof(
        &self,
        kind: ElementKind,
        entity: Entity,
        orientation: Orientation,
        entity_dof: &[usize],
        element_dof: &mut [usize],
    ) {
        debug_assert_eq!(entity_dof.len(), self.entity_ndof(kind, entity));
        let offset = self.entity_offset(kind, entity);
        for (k, &dof) in entity_dof.iter().enumerate() {
            element_dof[offset + self.entity_dof_position(kind, entity, orientation, k)] = dof;
        }
    }

    /// Reads the global degrees of freedom of an entity from the element-local array of this
    /// basis, in the owner's order. Inverse of [`set_entity_dof`](Self::set_entity_dof).
    fn get_entity_dof(
        &self,
        kind: ElementKind,
        entity: Entity,
        orientation: Orientation,
        element_dof: &[usize],
        entity_dof: &mut [usize],
    ) {
        debug_assert_eq!(entity_dof.len(), self.entity_ndof(kind, entity));
        let offset = self.entity_offset(kind, entity);
        for (k, dof) in entity_dof.iter_mut().enumerate() {
            *dof = element_dof[offset + self.entity_dof_position(kind, entity, orientation, k)];
        }
    }

    /// Writes the signs of the entity's degrees of freedom into the element-local sign array of
    /// this basis.
    fn set_entity_signs(&self, kind: ElementKind, entity: Entity, orientation: Orientation, element_signs: &mut [i32]) {
        let offset = self.entity_offset(kind, entity);
        for k in 0..self.entity_ndof(kind, entity) {
            let position = self.entity_dof_position(kind, entity, orientation, k);
            element_signs[offset + position] = self.entity_dof_sign(kind, entity, orientation, k);
        }
    }
}

/// An ordered collection of bases whose element-local layouts are concatenated.
#[derive(Debug, Default)]
pub struct BasisSet {
    bases: Vec<Box<dyn Basis>>,
}

impl BasisSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a basis, returning the extended set.
    pub fn with_basis(mut self, basis: impl 'static + Basis) -> Self {
        self.push(basis);
        self
    }

    pub fn push(&mut self, basis: impl 'static + Basis) {
        self.bases.push(Box::new(basis));
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Panics if the index is out of bounds.
    pub fn basis(&self, index: usize) -> &dyn Basis {
        self.bases[index].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Basis> {
        self.bases.iter().map(|basis| basis.as_ref())
    }

    /// Total number of degrees of freedom of an element of the given kind over all bases.
    pub fn element_ndof(&self, kind: ElementKind) -> usize {
        self.iter().map(|basis| basis.element_ndof(kind)).sum()
    }

    /// Offset of the given basis within the element-local layout of the whole set.
    pub fn basis_offset(&self, kind: ElementKind, basis: usize) -> usize {
        self.bases[..basis]
            .iter()
            .map(|b| b.element_ndof(kind))
            .sum()
    }
}
