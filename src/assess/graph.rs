//! Neighbour graph files for spatially structured random effects.
//!
//! The layout is whitespace separated: the node count, then one record per
//! node giving its 1-based id, its neighbour count and the neighbour ids.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{MapError, Result};

/// Undirected neighbour graph, stored with 0-based node indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyGraph {
    neighbours: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    /// Build from 0-based neighbour lists. Every edge must appear in both
    /// directions.
    pub fn from_neighbours(neighbours: Vec<Vec<usize>>) -> Result<Self> {
        let n = neighbours.len();
        for (node, list) in neighbours.iter().enumerate() {
            for &other in list {
                if other >= n {
                    return Err(graph_error(format!(
                        "node {} lists neighbour {} outside 1..={}",
                        node + 1,
                        other + 1,
                        n
                    )));
                }
                if other == node {
                    return Err(graph_error(format!("node {} lists itself", node + 1)));
                }
                if !neighbours[other].contains(&node) {
                    return Err(graph_error(format!(
                        "edge {}-{} is not symmetric",
                        node + 1,
                        other + 1
                    )));
                }
            }
        }
        Ok(Self { neighbours })
    }

    /// Rook adjacency of a `rows x cols` lattice, row-major
    pub fn lattice(rows: usize, cols: usize) -> Self {
        let mut neighbours = vec![Vec::new(); rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                let node = r * cols + c;
                if r > 0 {
                    neighbours[node].push(node - cols);
                }
                if c > 0 {
                    neighbours[node].push(node - 1);
                }
                if c + 1 < cols {
                    neighbours[node].push(node + 1);
                }
                if r + 1 < rows {
                    neighbours[node].push(node + cols);
                }
            }
        }
        Self { neighbours }
    }

    /// Read a graph file
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            graph_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        let graph = Self::parse(&text)?;
        debug!(
            path = %path.display(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Adjacency graph loaded"
        );
        Ok(graph)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut tokens = words.iter().copied();
        let n = next_number(&mut tokens, "node count")?;
        // Each record holds at least an id and a count
        if n > tokens.len() / 2 {
            return Err(graph_error(format!(
                "{} nodes declared but only {} tokens follow",
                n,
                tokens.len()
            )));
        }

        let mut neighbours: Vec<Option<Vec<usize>>> = vec![None; n];
        for _ in 0..n {
            let id = next_number(&mut tokens, "node id")?;
            if id == 0 || id > n {
                return Err(graph_error(format!("node id {} outside 1..={}", id, n)));
            }
            if neighbours[id - 1].is_some() {
                return Err(graph_error(format!("node {} listed twice", id)));
            }
            let count = next_number(&mut tokens, "neighbour count")?;
            if count > tokens.len() {
                return Err(graph_error(format!(
                    "node {} lists {} neighbours but only {} tokens follow",
                    id,
                    count,
                    tokens.len()
                )));
            }
            let mut list = Vec::with_capacity(count);
            for _ in 0..count {
                let other = next_number(&mut tokens, "neighbour id")?;
                if other == 0 || other > n {
                    return Err(graph_error(format!(
                        "node {} lists neighbour {} outside 1..={}",
                        id, other, n
                    )));
                }
                list.push(other - 1);
            }
            neighbours[id - 1] = Some(list);
        }

        if let Some(extra) = tokens.next() {
            return Err(graph_error(format!("unexpected trailing token '{}'", extra)));
        }

        // Every id 1..=n was read exactly once, so all slots are filled
        Self::from_neighbours(neighbours.into_iter().flatten().collect())
    }

    /// Write the graph in the same layout `read` accepts
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_graph_string())?;
        Ok(())
    }

    pub fn to_graph_string(&self) -> String {
        let mut out = format!("{}\n", self.len());
        for (node, list) in self.neighbours.iter().enumerate() {
            let _ = write!(out, "{} {}", node + 1, list.len());
            for other in list {
                let _ = write!(out, " {}", other + 1);
            }
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// 0-based neighbours of a 0-based node
    pub fn neighbours(&self, node: usize) -> &[usize] {
        self.neighbours.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.neighbours.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Nodes with no neighbours
    pub fn islands(&self) -> Vec<usize> {
        self.neighbours
            .iter()
            .enumerate()
            .filter(|(_, list)| list.is_empty())
            .map(|(node, _)| node)
            .collect()
    }
}

fn next_number<'a>(tokens: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<usize> {
    let token = tokens
        .next()
        .ok_or_else(|| graph_error(format!("file ends before {}", what)))?;
    token
        .parse()
        .map_err(|_| graph_error(format!("{} '{}' is not a non-negative integer", what, token)))
}

fn graph_error(message: String) -> MapError {
    MapError::Graph { message }
}
