//! Layer, table and graph fixtures.

use diseasemap::assess::AdjacencyGraph;
use diseasemap::layer::{GeoUnit, Polygon, SpatialLayer};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Two districts: a square with a lake, and a two-island district
pub fn lake_and_islands() -> SpatialLayer {
    let lake_district = GeoUnit {
        id: "lake".to_string(),
        polygons: vec![Polygon {
            exterior: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            holes: vec![vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]]],
        }],
    };
    let islands = GeoUnit {
        id: "islands".to_string(),
        polygons: vec![
            Polygon::new(vec![[5.0, 0.0], [7.0, 0.0], [7.0, 2.0], [5.0, 2.0]]),
            Polygon::new(vec![[5.0, 3.0], [7.0, 3.0], [6.0, 4.0]]),
        ],
    };
    SpatialLayer::new(vec![lake_district, islands]).expect("fixture layer is valid")
}

/// Standardized ratios for 9 units over 3 periods, one period per column
pub fn smr_table() -> Array2<f64> {
    Array2::from_shape_vec(
        (9, 3),
        vec![
            0.6, 0.7, 1.9, //
            0.8, 0.9, 2.3, //
            0.9, 1.0, 2.8, //
            1.0, 1.2, 3.1, //
            1.1, 1.3, 3.6, //
            1.2, 1.5, 4.0, //
            1.4, 1.6, 4.4, //
            1.7, 1.9, 5.2, //
            2.1, 2.4, 6.0, //
        ],
    )
    .expect("fixture table shape")
}

/// Write the rook adjacency of a `rows x cols` lattice into `dir`
pub fn write_lattice_graph(dir: &Path, rows: usize, cols: usize) -> PathBuf {
    let path = dir.join(format!("lattice_{}x{}.graph", rows, cols));
    AdjacencyGraph::lattice(rows, cols)
        .write(&path)
        .expect("graph file written");
    path
}
