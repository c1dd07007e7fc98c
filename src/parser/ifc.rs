//! STEP-backed building model.
//!
//! Reads an IFC file into a [`StepFile`] once and answers [`ModelQuery`]
//! lookups from relationship indexes built at load time. Geometry is
//! reconstructed from the simple representation items the checker needs
//! (extrusions, boxes, triangulated and faceted solids) and reported in
//! metres.

use crate::error::{GeometryError, ParseError};
use crate::geometry::Point3;
use crate::model::{type_matches, Element, ModelQuery, PropertySet, PropertySets, PropertyValue};
use crate::parser::step::{StepEntity, StepFile, StepValue};
use nalgebra::{Matrix4, Point3 as Vertex, Vector3};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Entities whose LongName sits at index 7.
const SPATIAL_ELEMENTS: &[&str] = &["IFCSITE", "IFCBUILDING", "IFCBUILDINGSTOREY", "IFCSPACE"];

/// Guards against cyclic placement and mapped-item references.
const MAX_NESTING: usize = 32;

/// Segments used to approximate circular profiles.
const CIRCLE_SEGMENTS: usize = 16;

/// Parses an IFC file into a queryable model.
///
/// Supports both IFC2x3 and IFC4 schemas.
///
/// # Errors
///
/// Returns [`ParseError::FileRead`] if the file cannot be read.
/// Returns [`ParseError::InvalidStep`] if the file has no DATA section.
///
/// # Example
///
/// ```no_run
/// use ifc_compliance::model::ModelQuery;
/// use ifc_compliance::parser::parse_ifc_file;
///
/// let model = parse_ifc_file("model.ifc")?;
/// println!("{}: {} doors", model.schema(), model.elements_of_type("IfcDoor").len());
/// # Ok::<(), ifc_compliance::error::ParseError>(())
/// ```
pub fn parse_ifc_file<P: AsRef<Path>>(path: P) -> Result<IfcModel, ParseError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    IfcModel::parse(&content)
}

#[derive(Debug)]
pub struct IfcModel {
    step: StepFile,
    unit_scale: f64,
    /// Element → containing spatial element.
    containers: HashMap<u64, u64>,
    /// Object → property set and quantity set ids, in relationship order.
    definitions: HashMap<u64, Vec<u64>>,
    /// Occurrence → type object.
    type_objects: HashMap<u64, u64>,
}

impl IfcModel {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let step = StepFile::parse(content)?;
        let unit_scale = length_unit_scale(&step);
        let containers = spatial_containers(&step);
        let definitions = property_definitions(&step);
        let type_objects = type_assignments(&step);

        debug!(
            schema = %step.schema,
            entities = step.entities.len(),
            unit_scale,
            "parsed IFC model"
        );

        Ok(Self {
            step,
            unit_scale,
            containers,
            definitions,
            type_objects,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.step.schema
    }

    /// Number of entity instances in the DATA section.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.step.entities.len()
    }

    /// Metres per model length unit.
    #[must_use]
    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    fn is_ifc4(&self) -> bool {
        self.step.schema.to_ascii_uppercase().starts_with("IFC4")
    }

    fn entity(&self, id: u64) -> Option<&StepEntity> {
        self.step.get_entity(id)
    }

    fn element(&self, entity: &StepEntity) -> Element {
        let mut element = Element::new(entity.id, &entity.entity_type);
        element.global_id = entity.get_str(0).unwrap_or_default().to_string();
        element.name = entity.get_str(2).map(str::to_string);

        let ty = entity.entity_type.as_str();
        if SPATIAL_ELEMENTS.contains(&ty) {
            element.long_name = entity.get_str(7).map(str::to_string);
        }

        let predefined_index = match ty {
            "IFCSPACE" if self.is_ifc4() => Some(9),
            "IFCDOOR" | "IFCDOORSTANDARDCASE" if self.is_ifc4() => Some(10),
            "IFCWALL" | "IFCWALLSTANDARDCASE" if self.is_ifc4() => Some(8),
            // ShapeType in IFC2x3, PredefinedType in IFC4
            "IFCSTAIR" => Some(8),
            _ => None,
        };
        element.predefined_type = predefined_index
            .and_then(|i| entity.get_enum(i))
            .map(str::to_string);

        if matches!(ty, "IFCDOOR" | "IFCDOORSTANDARDCASE") {
            element.overall_height = entity.get_f64(8);
            element.overall_width = entity.get_f64(9);
        }

        element
    }

    /// Property and quantity sets defined directly on `id`.
    fn own_sets(&self, id: u64) -> PropertySets {
        self.definitions
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|def| self.entity(*def))
            .filter_map(|def| self.read_definition(def))
            .collect()
    }

    fn read_definition(&self, definition: &StepEntity) -> Option<(String, PropertySet)> {
        let name = definition.get_str(2)?.to_string();
        let set = match definition.entity_type.as_str() {
            // HasProperties at index 4
            "IFCPROPERTYSET" => self.read_values(definition.get_refs(4), 2),
            // Quantities at index 5, each value at index 3
            "IFCELEMENTQUANTITY" => self.read_values(definition.get_refs(5), 3),
            _ => return None,
        };
        Some((name, set))
    }

    fn read_values(&self, ids: Vec<u64>, value_index: usize) -> PropertySet {
        ids.into_iter()
            .filter_map(|id| self.entity(id))
            .filter_map(|prop| {
                let name = prop.get_str(0)?.to_string();
                let value = property_value(prop.get(value_index)?)?;
                Some((name, value))
            })
            .collect()
    }

    /// Items of the product's Body representation, or of every
    /// representation when there is no Body.
    fn shape_items(&self, product: &StepEntity) -> Vec<&StepEntity> {
        // Representation at index 6, ProductDefinitionShape.Representations at 2
        let Some(shape) = product.get_ref(6).and_then(|id| self.entity(id)) else {
            return Vec::new();
        };
        let representations: Vec<&StepEntity> = shape
            .get_refs(2)
            .into_iter()
            .filter_map(|id| self.entity(id))
            .collect();

        let is_body = |rep: &&StepEntity| rep.get_str(1) == Some("Body");
        let chosen: Vec<&StepEntity> = if representations.iter().any(is_body) {
            representations.into_iter().filter(is_body).collect()
        } else {
            representations
        };

        chosen
            .iter()
            .flat_map(|rep| rep.get_refs(3))
            .filter_map(|id| self.entity(id))
            .collect()
    }

    /// Vertices of one representation item in its own coordinate system.
    fn item_vertices(&self, item: &StepEntity, depth: usize) -> Option<Vec<Vertex<f64>>> {
        if depth > MAX_NESTING {
            return None;
        }
        match item.entity_type.as_str() {
            "IFCEXTRUDEDAREASOLID" => self.extruded_solid(item),
            "IFCBOUNDINGBOX" => self.bounding_box_item(item),
            "IFCTRIANGULATEDFACESET" => {
                let points = self.entity(item.get_ref(0)?)?;
                Some(coordinate_list(points.get_list(0)?))
            }
            "IFCFACETEDBREP" => self.faceted_brep(item),
            "IFCPOLYLINE" => Some(
                item.get_refs(0)
                    .into_iter()
                    .filter_map(|id| self.cartesian_point(id))
                    .collect(),
            ),
            // FirstOperand at index 1: the solid being clipped
            "IFCBOOLEANCLIPPINGRESULT" | "IFCBOOLEANRESULT" => {
                let first = self.entity(item.get_ref(1)?)?;
                self.item_vertices(first, depth + 1)
            }
            "IFCMAPPEDITEM" => self.mapped_item(item, depth),
            _ => None,
        }
    }

    fn extruded_solid(&self, solid: &StepEntity) -> Option<Vec<Vertex<f64>>> {
        let profile = self.entity(solid.get_ref(0)?)?;
        let outline = self.profile_outline(profile)?;
        let position = solid
            .get_ref(1)
            .and_then(|id| self.axis_placement(id))
            .unwrap_or_else(Matrix4::identity);
        let direction = solid
            .get_ref(2)
            .and_then(|id| self.direction(id))
            .and_then(|d| d.try_normalize(f64::EPSILON))
            .unwrap_or_else(Vector3::z);
        let offset = direction * solid.get_f64(3)?;

        let mut vertices = Vec::with_capacity(outline.len() * 2);
        for (x, y) in outline {
            let base = Vertex::new(x, y, 0.0);
            vertices.push(position.transform_point(&base));
            vertices.push(position.transform_point(&(base + offset)));
        }
        Some(vertices)
    }

    /// Closed 2-D outline of a profile definition, in profile coordinates.
    fn profile_outline(&self, profile: &StepEntity) -> Option<Vec<(f64, f64)>> {
        match profile.entity_type.as_str() {
            "IFCRECTANGLEPROFILEDEF" => {
                let (hx, hy) = (profile.get_f64(3)? / 2.0, profile.get_f64(4)? / 2.0);
                let corners = [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)];
                Some(self.place_2d(profile.get_ref(2), &corners))
            }
            "IFCCIRCLEPROFILEDEF" => {
                let radius = profile.get_f64(3)?;
                let points: Vec<(f64, f64)> = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                        (radius * angle.cos(), radius * angle.sin())
                    })
                    .collect();
                Some(self.place_2d(profile.get_ref(2), &points))
            }
            "IFCARBITRARYCLOSEDPROFILEDEF" => {
                let curve = self.entity(profile.get_ref(2)?)?;
                self.curve_points(curve)
            }
            _ => None,
        }
    }

    fn curve_points(&self, curve: &StepEntity) -> Option<Vec<(f64, f64)>> {
        match curve.entity_type.as_str() {
            "IFCPOLYLINE" => Some(
                curve
                    .get_refs(0)
                    .into_iter()
                    .filter_map(|id| self.cartesian_point(id))
                    .map(|p| (p.x, p.y))
                    .collect(),
            ),
            "IFCINDEXEDPOLYCURVE" => {
                let list = self.entity(curve.get_ref(0)?)?;
                Some(
                    coordinate_list(list.get_list(0)?)
                        .into_iter()
                        .map(|p| (p.x, p.y))
                        .collect(),
                )
            }
            _ => None,
        }
    }

    /// Applies an optional IfcAxis2Placement2D to profile points.
    fn place_2d(&self, placement: Option<u64>, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let placement = placement.and_then(|id| self.entity(id));
        let origin = placement
            .and_then(|p| p.get_ref(0))
            .and_then(|id| self.cartesian_point(id))
            .unwrap_or_else(Vertex::origin);
        let (dx, dy) = placement
            .and_then(|p| p.get_ref(1))
            .and_then(|id| self.direction(id))
            .and_then(|d| Vector3::new(d.x, d.y, 0.0).try_normalize(f64::EPSILON))
            .map_or((1.0, 0.0), |d| (d.x, d.y));

        points
            .iter()
            .map(|(x, y)| (origin.x + x * dx - y * dy, origin.y + x * dy + y * dx))
            .collect()
    }

    fn bounding_box_item(&self, item: &StepEntity) -> Option<Vec<Vertex<f64>>> {
        let corner = self.cartesian_point(item.get_ref(0)?)?;
        let (dx, dy, dz) = (item.get_f64(1)?, item.get_f64(2)?, item.get_f64(3)?);
        let mut vertices = Vec::with_capacity(8);
        for x in [0.0, dx] {
            for y in [0.0, dy] {
                for z in [0.0, dz] {
                    vertices.push(corner + Vector3::new(x, y, z));
                }
            }
        }
        Some(vertices)
    }

    /// Outer shell → faces → bounds → poly loops.
    fn faceted_brep(&self, brep: &StepEntity) -> Option<Vec<Vertex<f64>>> {
        let shell = self.entity(brep.get_ref(0)?)?;
        let vertices: Vec<Vertex<f64>> = shell
            .get_refs(0)
            .into_iter()
            .filter_map(|face| self.entity(face))
            .flat_map(|face| face.get_refs(0))
            .filter_map(|bound| self.entity(bound))
            .filter_map(|bound| bound.get_ref(0))
            .filter_map(|poly_loop| self.entity(poly_loop))
            .flat_map(|poly_loop| poly_loop.get_refs(0))
            .filter_map(|point| self.cartesian_point(point))
            .collect();
        Some(vertices)
    }

    /// MappingSource (IfcRepresentationMap) placed by MappingTarget.
    fn mapped_item(&self, item: &StepEntity, depth: usize) -> Option<Vec<Vertex<f64>>> {
        let source = self.entity(item.get_ref(0)?)?;
        let origin = source
            .get_ref(0)
            .and_then(|id| self.axis_placement(id))
            .unwrap_or_else(Matrix4::identity);
        let target = item
            .get_ref(1)
            .and_then(|id| self.entity(id))
            .and_then(|op| self.transformation_operator(op))
            .unwrap_or_else(Matrix4::identity);
        let transform = target * origin;

        let representation = self.entity(source.get_ref(1)?)?;
        let vertices: Vec<Vertex<f64>> = representation
            .get_refs(3)
            .into_iter()
            .filter_map(|id| self.entity(id))
            .filter_map(|nested| self.item_vertices(nested, depth + 1))
            .flatten()
            .map(|v| transform.transform_point(&v))
            .collect();
        Some(vertices)
    }

    /// IfcCartesianTransformationOperator3D: LocalOrigin at 2, Scale at 3.
    fn transformation_operator(&self, op: &StepEntity) -> Option<Matrix4<f64>> {
        let origin = self.cartesian_point(op.get_ref(2)?)?;
        let scale = op.get_f64(3).unwrap_or(1.0);
        let mut matrix = Matrix4::new_scaling(scale);
        matrix[(0, 3)] = origin.x;
        matrix[(1, 3)] = origin.y;
        matrix[(2, 3)] = origin.z;
        Some(matrix)
    }

    fn cartesian_point(&self, id: u64) -> Option<Vertex<f64>> {
        let point = self.entity(id)?;
        if !point.is_a("IFCCARTESIANPOINT") {
            return None;
        }
        let coords: Vec<f64> = point.get_list(0)?.iter().filter_map(StepValue::as_f64).collect();
        Some(Vertex::new(
            *coords.first()?,
            coords.get(1).copied().unwrap_or(0.0),
            coords.get(2).copied().unwrap_or(0.0),
        ))
    }

    fn direction(&self, id: u64) -> Option<Vector3<f64>> {
        let direction = self.entity(id)?;
        let ratios: Vec<f64> = direction
            .get_list(0)?
            .iter()
            .filter_map(StepValue::as_f64)
            .collect();
        Some(Vector3::new(
            *ratios.first()?,
            ratios.get(1).copied().unwrap_or(0.0),
            ratios.get(2).copied().unwrap_or(0.0),
        ))
    }

    /// IfcAxis2Placement3D (or 2D) as a rigid transform.
    fn axis_placement(&self, id: u64) -> Option<Matrix4<f64>> {
        let placement = self.entity(id)?;
        let location = self.cartesian_point(placement.get_ref(0)?)?;
        if placement.is_a("IFCAXIS2PLACEMENT2D") {
            let (dx, dy) = placement
                .get_ref(1)
                .and_then(|d| self.direction(d))
                .and_then(|d| Vector3::new(d.x, d.y, 0.0).try_normalize(f64::EPSILON))
                .map_or((1.0, 0.0), |d| (d.x, d.y));
            return Some(Matrix4::new(
                dx, -dy, 0.0, location.x, dy, dx, 0.0, location.y, 0.0, 0.0, 1.0, location.z, 0.0,
                0.0, 0.0, 1.0,
            ));
        }

        let axis = placement
            .get_ref(1)
            .and_then(|d| self.direction(d))
            .and_then(|d| d.try_normalize(f64::EPSILON))
            .unwrap_or_else(Vector3::z);
        let ref_direction = placement
            .get_ref(2)
            .and_then(|d| self.direction(d))
            .unwrap_or_else(Vector3::x);

        let z = axis;
        let (x, y) = match z.cross(&ref_direction).try_normalize(f64::EPSILON) {
            Some(y) => (y.cross(&z), y),
            None => (Vector3::x(), Vector3::y()),
        };

        Some(Matrix4::new(
            x.x, y.x, z.x, location.x, x.y, y.y, z.y, location.y, x.z, y.z, z.z, location.z, 0.0,
            0.0, 0.0, 1.0,
        ))
    }

    /// World transform of an IfcLocalPlacement chain, in model units.
    fn placement_matrix(&self, element_id: u64, placement_id: u64) -> Result<Matrix4<f64>, GeometryError> {
        let malformed = |message: String| GeometryError::Malformed {
            id: element_id,
            message,
        };

        let mut matrix = Matrix4::identity();
        let mut next = Some(placement_id);
        let mut depth = 0;
        while let Some(id) = next {
            depth += 1;
            if depth > MAX_NESTING {
                return Err(malformed("placement chain too deep".to_string()));
            }
            let placement = self
                .entity(id)
                .ok_or_else(|| malformed(format!("missing placement #{id}")))?;
            if !placement.is_a("IFCLOCALPLACEMENT") {
                return Err(malformed(format!(
                    "unsupported placement {}",
                    placement.entity_type
                )));
            }
            let relative = placement
                .get_ref(1)
                .and_then(|axis| self.axis_placement(axis))
                .ok_or_else(|| malformed(format!("placement #{id} has no relative placement")))?;
            matrix = relative * matrix;
            next = placement.get_ref(0);
        }
        Ok(matrix)
    }

    fn object_placement(&self, entity: &StepEntity) -> Result<Option<Matrix4<f64>>, GeometryError> {
        // ObjectPlacement at index 5
        entity
            .get_ref(5)
            .map(|placement| self.placement_matrix(entity.id, placement))
            .transpose()
    }
}

impl ModelQuery for IfcModel {
    fn elements_of_type(&self, ifc_type: &str) -> Vec<Element> {
        self.step
            .entities
            .values()
            .filter(|entity| type_matches(ifc_type, &entity.entity_type))
            .map(|entity| self.element(entity))
            .collect()
    }

    /// Type object sets first, overridden by the occurrence's own sets.
    fn property_sets(&self, element: &Element) -> PropertySets {
        let mut sets = self
            .type_objects
            .get(&element.id)
            .and_then(|type_id| self.entity(*type_id))
            .map(|type_object| {
                // HasPropertySets at index 5
                type_object
                    .get_refs(5)
                    .into_iter()
                    .filter_map(|id| self.entity(id))
                    .filter_map(|def| self.read_definition(def))
                    .collect::<PropertySets>()
            })
            .unwrap_or_default();

        for (name, set) in self.own_sets(element.id) {
            sets.entry(name).or_default().extend(set);
        }
        sets
    }

    fn raw_mesh_vertices(&self, element: &Element) -> Result<Vec<f64>, GeometryError> {
        let id = element.id;
        let entity = self
            .entity(id)
            .ok_or(GeometryError::NoRepresentation { id })?;

        let items = self.shape_items(entity);
        if items.is_empty() {
            return Err(GeometryError::NoRepresentation { id });
        }

        let local: Vec<Vertex<f64>> = items
            .iter()
            .filter_map(|item| self.item_vertices(item, 0))
            .flatten()
            .collect();
        if local.is_empty() {
            return Err(GeometryError::NoVertices { id });
        }

        let placement = self.object_placement(entity)?.unwrap_or_else(Matrix4::identity);
        let scale = self.unit_scale;
        Ok(local
            .iter()
            .flat_map(|v| {
                let p = placement.transform_point(v);
                [p.x * scale, p.y * scale, p.z * scale]
            })
            .collect())
    }

    fn placement(&self, element: &Element) -> Result<Option<Point3>, GeometryError> {
        let Some(entity) = self.entity(element.id) else {
            return Ok(None);
        };
        let scale = self.unit_scale;
        Ok(self.object_placement(entity)?.map(|m| {
            let origin = m.transform_point(&Vertex::origin());
            Point3::new(origin.x * scale, origin.y * scale, origin.z * scale)
        }))
    }

    fn container_of(&self, element: &Element) -> Option<Element> {
        let container = self.containers.get(&element.id)?;
        self.entity(*container).map(|entity| self.element(entity))
    }
}

fn property_value(value: &StepValue) -> Option<PropertyValue> {
    match value {
        StepValue::String(s) => Some(PropertyValue::Text(s.clone())),
        StepValue::Real(f) => Some(PropertyValue::Real(*f)),
        StepValue::Integer(i) => Some(PropertyValue::Integer(*i)),
        StepValue::Boolean(b) => Some(PropertyValue::Boolean(*b)),
        StepValue::Enum(e) => Some(PropertyValue::Text(e.clone())),
        StepValue::Reference(_) | StepValue::List(_) | StepValue::Null | StepValue::Derived => None,
    }
}

/// `((x, y[, z]), ...)` coordinate lists of IfcCartesianPointList2D/3D.
fn coordinate_list(list: &[StepValue]) -> Vec<Vertex<f64>> {
    list.iter()
        .filter_map(StepValue::as_list)
        .filter_map(|coords| {
            let x = coords.first()?.as_f64()?;
            let y = coords.get(1).and_then(StepValue::as_f64).unwrap_or(0.0);
            let z = coords.get(2).and_then(StepValue::as_f64).unwrap_or(0.0);
            Some(Vertex::new(x, y, z))
        })
        .collect()
}

/// Metres per length unit of the project (1.0 when undeclared).
fn length_unit_scale(step: &StepFile) -> f64 {
    step.get_entities_by_type("IFCPROJECT")
        .first()
        // UnitsInContext at index 8, IfcUnitAssignment.Units at 0
        .and_then(|project| project.get_ref(8))
        .and_then(|id| step.get_entity(id))
        .and_then(|assignment| {
            assignment
                .get_refs(0)
                .into_iter()
                .filter_map(|id| step.get_entity(id))
                .find_map(|unit| unit_scale_of(step, unit, 0))
        })
        .unwrap_or(1.0)
}

fn unit_scale_of(step: &StepFile, unit: &StepEntity, depth: usize) -> Option<f64> {
    if depth > MAX_NESTING || unit.get_enum(1)? != "LENGTHUNIT" {
        return None;
    }
    match unit.entity_type.as_str() {
        // IFCSIUNIT(*, UnitType, Prefix, Name)
        "IFCSIUNIT" => {
            if unit.get_enum(3)? != "METRE" {
                return None;
            }
            let prefix = match unit.get_enum(2) {
                Some("KILO") => 1e3,
                Some("HECTO") => 1e2,
                Some("DECA") => 1e1,
                Some("DECI") => 1e-1,
                Some("CENTI") => 1e-2,
                Some("MILLI") => 1e-3,
                Some("MICRO") => 1e-6,
                Some("NANO") => 1e-9,
                _ => 1.0,
            };
            Some(prefix)
        }
        // IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
        "IFCCONVERSIONBASEDUNIT" => {
            let factor = step.get_entity(unit.get_ref(3)?)?;
            let value = factor.get_f64(0)?;
            let base = factor
                .get_ref(1)
                .and_then(|id| step.get_entity(id))
                .and_then(|base| unit_scale_of(step, base, depth + 1))
                .unwrap_or(1.0);
            Some(value * base)
        }
        _ => None,
    }
}

/// Element → spatial container. Direct containment wins over aggregation.
fn spatial_containers(step: &StepFile) -> HashMap<u64, u64> {
    let mut containers = HashMap::new();

    // RelatedElements at index 4, RelatingStructure at index 5
    for rel in step.get_entities_by_type("IFCRELCONTAINEDINSPATIALSTRUCTURE") {
        if let Some(structure) = rel.get_ref(5) {
            for element in rel.get_refs(4) {
                containers.insert(element, structure);
            }
        }
    }

    // RelatingObject at index 4, RelatedObjects at index 5
    for rel in step.get_entities_by_type("IFCRELAGGREGATES") {
        if let Some(whole) = rel.get_ref(4) {
            for part in rel.get_refs(5) {
                containers.entry(part).or_insert(whole);
            }
        }
    }

    containers
}

fn property_definitions(step: &StepFile) -> HashMap<u64, Vec<u64>> {
    let mut definitions: HashMap<u64, Vec<u64>> = HashMap::new();

    // RelatedObjects at index 4, RelatingPropertyDefinition at index 5
    for rel in step.get_entities_by_type("IFCRELDEFINESBYPROPERTIES") {
        if let Some(definition) = rel.get_ref(5) {
            for object in rel.get_refs(4) {
                definitions.entry(object).or_default().push(definition);
            }
        }
    }

    definitions
}

fn type_assignments(step: &StepFile) -> HashMap<u64, u64> {
    let mut types = HashMap::new();

    // RelatedObjects at index 4, RelatingType at index 5
    for rel in step.get_entities_by_type("IFCRELDEFINESBYTYPE") {
        if let Some(type_object) = rel.get_ref(5) {
            for object in rel.get_refs(4) {
                types.insert(object, type_object);
            }
        }
    }

    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',$,'Tower',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCAXIS2PLACEMENT3D(#10,$,$);
#12=IFCLOCALPLACEMENT($,#11);
#13=IFCCARTESIANPOINT((1000.,2000.,0.));
#14=IFCAXIS2PLACEMENT3D(#13,$,$);
#15=IFCLOCALPLACEMENT(#12,#14);
#20=IFCBUILDING('0020',$,'Block A',$,$,#12,$,'Main block',.ELEMENT.,$,$,$);
#21=IFCBUILDINGSTOREY('0021',$,'Level 1',$,$,#12,$,$,.ELEMENT.,0.);
#22=IFCRELAGGREGATES('0022',$,$,$,#20,(#21));
#30=IFCSPACE('0030',$,'C1',$,$,#15,#33,'Main Corridor',.ELEMENT.,.INTERNAL.,$);
#31=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4000.,900.);
#32=IFCEXTRUDEDAREASOLID(#31,#11,#36,3000.);
#36=IFCDIRECTION((0.,0.,1.));
#37=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#32));
#33=IFCPRODUCTDEFINITIONSHAPE($,$,(#37));
#40=IFCDOOR('0040',$,'Main Entrance',$,$,#15,$,$,2100.,800.,.DOOR.,$,$);
#41=IFCRELCONTAINEDINSPATIALSTRUCTURE('0041',$,$,$,(#30,#40),#21);
#50=IFCPROPERTYSET('0050',$,'Pset_DoorCommon',$,(#51,#52));
#51=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#52=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('FD30'),$);
#53=IFCRELDEFINESBYPROPERTIES('0053',$,$,$,(#40),#50);
#60=IFCDOORTYPE('0060',$,'Single',$,$,(#61),$,$,$,.DOOR.,.SINGLE_SWING_LEFT.,$,$);
#61=IFCPROPERTYSET('0061',$,'Pset_DoorCommon',$,(#62,#63));
#62=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('none'),$);
#63=IFCPROPERTYSINGLEVALUE('HandicapAccessible',$,IFCBOOLEAN(.F.),$);
#64=IFCRELDEFINESBYTYPE('0064',$,$,$,(#40),#60);
#70=IFCELEMENTQUANTITY('0070',$,'Qto_SpaceBaseQuantities',$,$,(#71));
#71=IFCQUANTITYAREA('NetFloorArea',$,$,3.6,$);
#72=IFCRELDEFINESBYPROPERTIES('0072',$,$,$,(#30),#70);
ENDSEC;
END-ISO-10303-21;
";

    fn model() -> IfcModel {
        IfcModel::parse(MODEL).unwrap()
    }

    #[test]
    fn reads_header_and_units() {
        let model = model();
        assert_eq!(model.schema(), "IFC4");
        assert!((model.unit_scale() - 0.001).abs() < 1e-12);
        assert!(model.element_count() > 30);
    }

    #[test]
    fn builds_elements_with_positional_attributes() {
        let model = model();
        let spaces = model.elements_of_type("IfcSpace");
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].name.as_deref(), Some("C1"));
        assert_eq!(spaces[0].long_name.as_deref(), Some("Main Corridor"));
        assert_eq!(spaces[0].predefined_type.as_deref(), Some("INTERNAL"));

        let door = &model.elements_of_type("IfcDoor")[0];
        assert_eq!(door.global_id, "0040");
        assert_eq!(door.overall_width, Some(800.0));
        assert_eq!(door.overall_height, Some(2100.0));
        assert_eq!(door.predefined_type.as_deref(), Some("DOOR"));
    }

    #[test]
    fn resolves_containers_through_containment_and_aggregation() {
        let model = model();
        let door = &model.elements_of_type("IfcDoor")[0];
        let storey = model.container_of(door).unwrap();
        assert_eq!(storey.name.as_deref(), Some("Level 1"));
        let building = model.container_of(&storey).unwrap();
        assert_eq!(building.long_name.as_deref(), Some("Main block"));
        assert!(model.container_of(&building).is_none());
    }

    #[test]
    fn occurrence_properties_override_type_properties() {
        let model = model();
        let door = &model.elements_of_type("IfcDoor")[0];
        let psets = model.property_sets(door);
        let common = &psets["Pset_DoorCommon"];
        assert_eq!(common["IsExternal"], PropertyValue::Boolean(true));
        assert_eq!(common["FireRating"], PropertyValue::Text("FD30".to_string()));
        assert_eq!(common["HandicapAccessible"], PropertyValue::Boolean(false));

        let space = &model.elements_of_type("IfcSpace")[0];
        assert_eq!(
            model.property_sets(space)["Qto_SpaceBaseQuantities"]["NetFloorArea"],
            PropertyValue::Real(3.6)
        );
    }

    #[test]
    fn extrusion_mesh_is_placed_and_scaled_to_metres() {
        let model = model();
        let space = &model.elements_of_type("IfcSpace")[0];
        let vertices = model.raw_mesh_vertices(space).unwrap();
        assert_eq!(vertices.len(), 8 * 3);

        let xs: Vec<f64> = vertices.iter().step_by(3).copied().collect();
        let ys: Vec<f64> = vertices.iter().skip(1).step_by(3).copied().collect();
        let zs: Vec<f64> = vertices.iter().skip(2).step_by(3).copied().collect();
        let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
        let max = |v: &[f64]| v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((min(&xs) - -1.0).abs() < 1e-9);
        assert!((max(&xs) - 3.0).abs() < 1e-9);
        assert!((min(&ys) - 1.55).abs() < 1e-9);
        assert!((max(&ys) - 2.45).abs() < 1e-9);
        assert!((max(&zs) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn placement_origin_and_missing_geometry() {
        let model = model();
        let door = &model.elements_of_type("IfcDoor")[0];
        let origin = model.placement(door).unwrap().unwrap();
        assert!((origin.x - 1.0).abs() < 1e-9);
        assert!((origin.y - 2.0).abs() < 1e-9);

        assert_eq!(
            model.raw_mesh_vertices(door),
            Err(GeometryError::NoRepresentation { id: 40 })
        );
    }

    #[test]
    fn conversion_based_units() {
        let content = "DATA;
#1=IFCPROJECT('p',$,$,$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#5,#3));
#3=IFCCONVERSIONBASEDUNIT(#4,.LENGTHUNIT.,'FOOT',#6);
#4=IFCDIMENSIONALEXPONENTS(1,0,0,0,0,0,0);
#5=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);
#6=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#7);
#7=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);
ENDSEC;";
        let model = IfcModel::parse(content).unwrap();
        assert!((model.unit_scale() - 0.3048).abs() < 1e-12);
    }
}
