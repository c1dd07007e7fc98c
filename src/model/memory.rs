//! In-memory building model.
//!
//! Useful for embedding the checker behind another parser and for tests:
//! elements, property sets, meshes and placements are registered directly.

use super::{type_matches, Element, ModelQuery, PropertySets, PropertyValue};
use crate::error::GeometryError;
use crate::geometry::Point3;
use std::cell::Cell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryModel {
    elements: Vec<Element>,
    property_sets: HashMap<u64, PropertySets>,
    meshes: HashMap<u64, Vec<f64>>,
    placements: HashMap<u64, Point3>,
    containers: HashMap<u64, u64>,
    mesh_queries: Cell<usize>,
}

impl InMemoryModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an element and returns its id.
    pub fn insert(&mut self, element: Element) -> u64 {
        let id = element.id;
        self.elements.retain(|e| e.id != id);
        self.elements.push(element);
        id
    }

    pub fn set_property(&mut self, id: u64, set: &str, key: &str, value: impl Into<PropertyValue>) {
        self.property_sets
            .entry(id)
            .or_default()
            .entry(set.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn set_mesh(&mut self, id: u64, vertices: Vec<f64>) {
        self.meshes.insert(id, vertices);
    }

    /// Registers an axis-aligned box mesh (its eight corners).
    pub fn set_box(&mut self, id: u64, min: [f64; 3], max: [f64; 3]) {
        let mut vertices = Vec::with_capacity(24);
        for x in [min[0], max[0]] {
            for y in [min[1], max[1]] {
                for z in [min[2], max[2]] {
                    vertices.extend_from_slice(&[x, y, z]);
                }
            }
        }
        self.meshes.insert(id, vertices);
    }

    pub fn set_placement(&mut self, id: u64, origin: Point3) {
        self.placements.insert(id, origin);
    }

    pub fn set_container(&mut self, id: u64, container_id: u64) {
        self.containers.insert(id, container_id);
    }

    /// Number of mesh lookups served so far.
    #[must_use]
    pub fn mesh_queries(&self) -> usize {
        self.mesh_queries.get()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

impl ModelQuery for InMemoryModel {
    fn elements_of_type(&self, ifc_type: &str) -> Vec<Element> {
        let mut found: Vec<Element> = self
            .elements
            .iter()
            .filter(|e| type_matches(ifc_type, &e.ifc_type))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }

    fn property_sets(&self, element: &Element) -> PropertySets {
        self.property_sets.get(&element.id).cloned().unwrap_or_default()
    }

    fn raw_mesh_vertices(&self, element: &Element) -> Result<Vec<f64>, GeometryError> {
        self.mesh_queries.set(self.mesh_queries.get() + 1);
        self.meshes
            .get(&element.id)
            .cloned()
            .ok_or(GeometryError::NoRepresentation { id: element.id })
    }

    fn placement(&self, element: &Element) -> Result<Option<Point3>, GeometryError> {
        Ok(self.placements.get(&element.id).copied())
    }

    fn container_of(&self, element: &Element) -> Option<Element> {
        let container_id = self.containers.get(&element.id)?;
        self.elements.iter().find(|e| e.id == *container_id).cloned()
    }
}
