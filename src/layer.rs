//! Spatial polygon layers.
//!
//! A layer is an ordered list of geographic units (areas, districts, ...).
//! Value arrays are matched to units by position.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// A closed ring of `[x, y]` vertices; the closing vertex may be omitted
pub type Ring = Vec<[f64; 2]>;

/// One polygon with optional holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Ring,
    #[serde(default)]
    pub holes: Vec<Ring>,
}

impl Polygon {
    /// Polygon without holes
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Exterior followed by holes
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

/// A geographic unit made of one or more polygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoUnit {
    pub id: String,
    pub polygons: Vec<Polygon>,
}

/// Axis-aligned bounds of a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// An ordered collection of geographic units
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialLayer {
    pub units: Vec<GeoUnit>,
}

impl SpatialLayer {
    /// Create a layer, rejecting units without any vertices
    pub fn new(units: Vec<GeoUnit>) -> Result<Self> {
        for unit in &units {
            let has_vertices = unit.polygons.iter().any(|p| p.exterior.len() >= 3);
            if !has_vertices {
                return Err(MapError::invalid_parameter(
                    "layer",
                    format!("unit '{}' has no polygon with at least 3 vertices", unit.id),
                ));
            }
        }
        Ok(Self { units })
    }

    /// Regular lattice of unit squares, `rows x cols` units in row-major order
    /// starting from the top-left square. Unit ids are `r{row}c{col}`.
    pub fn grid(rows: usize, cols: usize) -> Self {
        let mut units = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let top = (rows - r) as f64;
            for c in 0..cols {
                let left = c as f64;
                units.push(GeoUnit {
                    id: format!("r{}c{}", r, c),
                    polygons: vec![Polygon::new(vec![
                        [left, top - 1.0],
                        [left + 1.0, top - 1.0],
                        [left + 1.0, top],
                        [left, top],
                    ])],
                });
            }
        }
        Self { units }
    }

    /// Number of geographic units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Bounds over every vertex, `None` for an empty layer
    pub fn bounds(&self) -> Option<Bounds> {
        let mut vertices = self
            .units
            .iter()
            .flat_map(|u| u.polygons.iter())
            .flat_map(|p| p.rings())
            .flat_map(|r| r.iter());

        let first = vertices.next()?;
        let init = Bounds {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        Some(vertices.fold(init, |b, v| Bounds {
            min_x: b.min_x.min(v[0]),
            min_y: b.min_y.min(v[1]),
            max_x: b.max_x.max(v[0]),
            max_y: b.max_y.max(v[1]),
        }))
    }
}
