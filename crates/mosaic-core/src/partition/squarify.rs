//! Squarified treemap (Bruls, Huizing & van Wijk 2000).
//!
//! A closed-form stand-in for the iterative polygon solver: every node gets a
//! rectangle whose area is exactly proportional to its weight. Nodes with
//! non-positive weight are left unplaced.

use serde::{Deserialize, Serialize};

use super::{NodePath, Partition, Partitioner, Polygon, Rect, WeightedNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Squarified {
    /// Inset applied to each internal node before laying out its children.
    pub padding: f64,
}

impl Partitioner for Squarified {
    fn partition(&self, tree: &WeightedNode, bounds: &Polygon) -> Partition {
        let mut out = Partition::default();
        let rect = bounds.bounds();
        if tree.weight > 0.0 && rect.area() > 0.0 {
            self.place(tree, rect, &mut out);
        }
        out
    }
}

impl Squarified {
    fn place(&self, node: &WeightedNode, rect: Rect, out: &mut Partition) {
        out.insert(node.path.clone(), rect.to_polygon());
        if node.is_leaf() {
            return;
        }

        let inner = inset(rect, if node.path.depth() == 0 { 0.0 } else { self.padding });
        let mut items: Vec<(&WeightedNode, f64)> = node
            .children
            .iter()
            .filter(|c| c.weight.is_finite() && c.weight > 0.0)
            .map(|c| (c, c.weight))
            .collect();
        let total: f64 = items.iter().map(|&(_, w)| w).sum();
        if total <= 0.0 || inner.area() <= 0.0 {
            return;
        }

        items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.path.cmp(&b.0.path)));
        let scale = inner.area() / total;
        let areas: Vec<f64> = items.iter().map(|&(_, w)| w * scale).collect();

        for ((child, _), r) in items.iter().zip(squarify(&areas, inner)) {
            self.place(child, r, out);
        }
    }
}

fn inset(r: Rect, pad: f64) -> Rect {
    let pad = pad.min(r.w / 2.0).min(r.h / 2.0).max(0.0);
    Rect::new(r.x + pad, r.y + pad, r.w - 2.0 * pad, r.h - 2.0 * pad)
}

/// Worst aspect ratio of a row laid along a side of length `side`.
fn worst_ratio(min: f64, max: f64, sum: f64, side: f64) -> f64 {
    let s2 = sum * sum;
    let w2 = side * side;
    (w2 * max / s2).max(s2 / (w2 * min))
}

/// Lay `areas` (descending, already scaled to `rect`) into rectangles.
fn squarify(areas: &[f64], mut rect: Rect) -> Vec<Rect> {
    let mut out = Vec::with_capacity(areas.len());
    let mut start = 0usize;

    while start < areas.len() {
        let side = rect.w.min(rect.h);
        if side <= 1e-12 {
            break;
        }

        let mut end = start + 1;
        let (mut min, mut max, mut sum) = (areas[start], areas[start], areas[start]);
        while end < areas.len() {
            let a = areas[end];
            let current = worst_ratio(min, max, sum, side);
            let next = worst_ratio(min.min(a), max.max(a), sum + a, side);
            if next > current {
                break;
            }
            min = min.min(a);
            max = max.max(a);
            sum += a;
            end += 1;
        }

        rect = layout_row(&areas[start..end], sum, rect, &mut out);
        start = end;
    }
    out
}

/// Place one row along the shorter side and return the remaining rectangle.
fn layout_row(row: &[f64], sum: f64, rect: Rect, out: &mut Vec<Rect>) -> Rect {
    if rect.w >= rect.h {
        // Vertical strip on the left.
        let strip_w = sum / rect.h;
        let mut y = rect.y;
        for &a in row {
            let h = a / strip_w;
            out.push(Rect::new(rect.x, y, strip_w, h));
            y += h;
        }
        Rect::new(rect.x + strip_w, rect.y, (rect.w - strip_w).max(0.0), rect.h)
    } else {
        // Horizontal strip on top.
        let strip_h = sum / rect.w;
        let mut x = rect.x;
        for &a in row {
            let w = a / strip_h;
            out.push(Rect::new(x, rect.y, w, strip_h));
            x += w;
        }
        Rect::new(rect.x, rect.y + strip_h, rect.w, (rect.h - strip_h).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn leaf(path: Vec<usize>, weight: f64) -> WeightedNode {
        WeightedNode { path: NodePath(path), label: String::new(), weight, children: Vec::new() }
    }

    fn flat_tree(weights: &[f64]) -> WeightedNode {
        let children: Vec<WeightedNode> =
            weights.iter().enumerate().map(|(i, &w)| leaf(vec![i], w)).collect();
        WeightedNode {
            path: NodePath::root(),
            label: "World".into(),
            weight: weights.iter().sum(),
            children,
        }
    }

    #[test]
    fn leaf_areas_are_proportional_to_weight() {
        let tree = flat_tree(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]);
        let bounds = Rect::new(0.0, 0.0, 600.0, 400.0).to_polygon();
        let part = Squarified::default().partition(&tree, &bounds);

        let total_area = 600.0 * 400.0;
        for child in &tree.children {
            let poly = part.get(&child.path).unwrap();
            assert_relative_eq!(poly.area(), total_area * child.weight / tree.weight, max_relative = 1e-9);
        }
    }

    #[test]
    fn rectangles_stay_inside_bounds() {
        let tree = flat_tree(&[5.0, 1.0, 1.0, 1.0, 0.5]);
        let bounds = Rect::new(10.0, 20.0, 300.0, 100.0);
        let part = Squarified::default().partition(&tree, &bounds.to_polygon());
        for poly in part.polygons.values() {
            let b = poly.bounds();
            assert!(b.x >= bounds.x - 1e-9 && b.y >= bounds.y - 1e-9);
            assert!(b.x + b.w <= bounds.x + bounds.w + 1e-9);
            assert!(b.y + b.h <= bounds.y + bounds.h + 1e-9);
        }
    }

    #[test]
    fn zero_weight_nodes_are_unplaced() {
        let tree = flat_tree(&[3.0, 0.0, 1.0]);
        let part = Squarified::default().partition(&tree, &Rect::new(0.0, 0.0, 10.0, 10.0).to_polygon());
        assert!(part.get(&NodePath(vec![1])).is_none());
        assert!(part.get(&NodePath(vec![0])).is_some());
    }

    #[test]
    fn padding_insets_children_of_internal_nodes() {
        let group = WeightedNode {
            path: NodePath(vec![0]),
            label: "Asia".into(),
            weight: 4.0,
            children: vec![leaf(vec![0, 0], 3.0), leaf(vec![0, 1], 1.0)],
        };
        let tree = WeightedNode {
            path: NodePath::root(),
            label: "World".into(),
            weight: 4.0,
            children: vec![group],
        };
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0).to_polygon();
        let part = Squarified { padding: 5.0 }.partition(&tree, &bounds);

        // The root is not inset, so the only continent fills the bounds.
        assert_relative_eq!(part.get(&NodePath(vec![0])).unwrap().area(), 200.0 * 100.0);
        let inner_area = 190.0 * 90.0;
        let mut sum = 0.0;
        for path in [vec![0, 0], vec![0, 1]] {
            let b = part.get(&NodePath(path)).unwrap().bounds();
            assert!(b.x >= 5.0 - 1e-9 && b.y >= 5.0 - 1e-9);
            assert!(b.x + b.w <= 195.0 + 1e-9 && b.y + b.h <= 95.0 + 1e-9);
            sum += b.area();
        }
        assert_relative_eq!(sum, inner_area, max_relative = 1e-9);
    }

    #[test]
    fn empty_tree_yields_empty_partition() {
        let tree = flat_tree(&[]);
        let part = Squarified::default().partition(&tree, &Rect::new(0.0, 0.0, 10.0, 10.0).to_polygon());
        assert!(part.is_empty());
    }
}
