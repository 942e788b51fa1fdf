//! Boundary to the area-proportional partitioner.
//!
//! The hierarchy is flattened into a [`WeightedNode`] tree whose internal
//! weights are sums of their children. A [`Partitioner`] returns a polygon
//! per node it managed to place; nodes may be missing from the result.

pub mod squarify;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hierarchy::{Member, Root};

pub use squarify::Squarified;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn to_polygon(self) -> Polygon {
        Polygon::new(vec![
            [self.x, self.y],
            [self.x + self.w, self.y],
            [self.x + self.w, self.y + self.h],
            [self.x, self.y + self.h],
        ])
    }
}

/// Simple polygon as an ordered vertex ring (not closed explicitly).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for i in 0..n {
            let [x0, y0] = self.vertices[i];
            let [x1, y1] = self.vertices[(i + 1) % n];
            acc += x0 * y1 - x1 * y0;
        }
        acc / 2.0
    }

    /// Shoelace area, orientation-independent.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid; vertex mean for degenerate rings.
    pub fn centroid(&self) -> [f64; 2] {
        let n = self.vertices.len();
        if n == 0 {
            return [0.0, 0.0];
        }
        let a = self.signed_area();
        if a.abs() < 1e-12 {
            let (sx, sy) = self
                .vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), &[x, y]| (sx + x, sy + y));
            return [sx / n as f64, sy / n as f64];
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for i in 0..n {
            let [x0, y0] = self.vertices[i];
            let [x1, y1] = self.vertices[(i + 1) % n];
            let cross = x0 * y1 - x1 * y0;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
        [cx / (6.0 * a), cy / (6.0 * a)]
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let [xi, yi] = self.vertices[i];
            let [xj, yj] = self.vertices[j];
            if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        if self.vertices.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &[x, y] in &self.vertices {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

// ── Weighted tree ─────────────────────────────────────────────────────────────

/// Child-index path from the root; the root itself is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut p = self.0.clone();
        p.push(index);
        Self(p)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedNode {
    pub path: NodePath,
    pub label: String,
    pub weight: f64,
    pub children: Vec<WeightedNode>,
}

impl WeightedNode {
    fn leaf(path: NodePath, label: impl Into<String>, weight: f64) -> Self {
        Self { path, label: label.into(), weight, children: Vec::new() }
    }

    fn branch(path: NodePath, label: impl Into<String>, children: Vec<WeightedNode>) -> Self {
        let weight = children.iter().map(|c| c.weight).sum();
        Self { path, label: label.into(), weight, children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flatten the hierarchy, summing leaf values up the tree.
pub fn weighted_tree(root: &Root) -> WeightedNode {
    let root_path = NodePath::root();
    let continents = root
        .continents
        .iter()
        .enumerate()
        .map(|(ci, group)| {
            let group_path = root_path.child(ci);
            let members = group
                .members
                .iter()
                .enumerate()
                .map(|(mi, member)| {
                    let path = group_path.child(mi);
                    match member {
                        Member::Country(c) if !c.is_leaf() => {
                            let slices = c
                                .sectors
                                .iter()
                                .enumerate()
                                .map(|(si, s)| WeightedNode::leaf(path.child(si), s.sector.name(), s.value))
                                .collect();
                            WeightedNode::branch(path, &c.name, slices)
                        }
                        _ => WeightedNode::leaf(path, member.label(), member.weight()),
                    }
                })
                .collect();
            WeightedNode::branch(group_path, &group.name, members)
        })
        .collect();
    WeightedNode::branch(root_path, &root.label, continents)
}

// ── Partitioner contract ──────────────────────────────────────────────────────

/// Polygons keyed by node path. Absent keys are nodes the solver could not place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub polygons: BTreeMap<NodePath, Polygon>,
}

impl Partition {
    pub fn get(&self, path: &NodePath) -> Option<&Polygon> {
        self.polygons.get(path)
    }

    pub fn insert(&mut self, path: NodePath, polygon: Polygon) {
        self.polygons.insert(path, polygon);
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Area-proportional layout solver.
pub trait Partitioner {
    /// Assign polygons inside `bounds`, sibling areas proportional to weight.
    fn partition(&self, tree: &WeightedNode, bounds: &Polygon) -> Partition;
}
