//! Scene composition: hierarchy + partition → styled, labelled shapes.
//!
//! Every country leaf, sector slice and remainder that received a polygon
//! becomes one [`Shape`]. Nodes without a polygon are skipped and counted.

use serde::{Deserialize, Serialize};

use crate::config::MosaicConfig;
use crate::encode::{continent_color, inflation_color, sector_color, Rgb, TextLabel};
use crate::hierarchy::{Indicators, Member, Root};
use crate::partition::{NodePath, Partition, Polygon};

/// Border widths in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub leaf_width: f64,
    pub outline_width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { leaf_width: 1.5, outline_width: 3.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Country,
    Sector,
    Remainder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub path: NodePath,
    pub kind: ShapeKind,
    pub label: String,
    pub continent: String,
    pub value: f64,
    pub polygon: Polygon,
    pub fill: Rgb,
    pub fill_opacity: f64,
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub labels: Vec<TextLabel>,
}

/// Unfilled boundary drawn around a continent group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub path: NodePath,
    pub continent: String,
    pub polygon: Polygon,
    pub stroke: Rgb,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub outlines: Vec<Outline>,
    /// Leaves the partitioner returned no polygon for.
    pub missing: usize,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

struct ShapeSpec<'a> {
    path: NodePath,
    kind: ShapeKind,
    label: &'a str,
    continent: &'a str,
    value: f64,
    fill: Rgb,
    indicators: Indicators,
}

fn shape(spec: ShapeSpec<'_>, polygon: &Polygon, cfg: &MosaicConfig) -> Shape {
    let area = polygon.area();
    Shape {
        labels: cfg.labels.plan(area, polygon.centroid(), spec.label, spec.value),
        path: spec.path,
        kind: spec.kind,
        label: spec.label.to_string(),
        continent: spec.continent.to_string(),
        value: spec.value,
        polygon: polygon.clone(),
        fill: spec.fill,
        fill_opacity: cfg.opacity.opacity(spec.indicators.unemployment),
        stroke: inflation_color(spec.indicators.inflation),
        stroke_width: cfg.stroke.leaf_width,
    }
}

/// Resolve fill, opacity, border and labels for every placed leaf.
#[tracing::instrument(skip_all, fields(placed = partition.len()))]
pub fn compose_scene(root: &Root, partition: &Partition, cfg: &MosaicConfig) -> Scene {
    let mut scene = Scene::default();
    let root_path = NodePath::root();

    for (ci, group) in root.continents.iter().enumerate() {
        let group_path = root_path.child(ci);
        let color = continent_color(&group.name);
        if let Some(poly) = partition.get(&group_path) {
            scene.outlines.push(Outline {
                path: group_path.clone(),
                continent: group.name.clone(),
                polygon: poly.clone(),
                stroke: color,
                stroke_width: cfg.stroke.outline_width,
            });
        }

        for (mi, member) in group.members.iter().enumerate() {
            let path = group_path.child(mi);
            let indicators = member.indicators();

            let specs: Vec<ShapeSpec<'_>> = match member {
                Member::Country(c) if !c.is_leaf() => c
                    .sectors
                    .iter()
                    .enumerate()
                    .map(|(si, s)| ShapeSpec {
                        path: path.child(si),
                        kind: ShapeKind::Sector,
                        label: s.sector.name(),
                        continent: &c.continent,
                        value: s.value,
                        fill: sector_color(s.sector),
                        indicators,
                    })
                    .collect(),
                Member::Country(c) => vec![ShapeSpec {
                    path,
                    kind: ShapeKind::Country,
                    label: &c.name,
                    continent: &c.continent,
                    value: c.gdp,
                    fill: color,
                    indicators,
                }],
                Member::Remainder(r) => vec![ShapeSpec {
                    path,
                    kind: ShapeKind::Remainder,
                    label: &r.label,
                    continent: &r.continent,
                    value: r.gdp,
                    fill: color,
                    indicators,
                }],
            };

            for spec in specs {
                match partition.get(&spec.path) {
                    Some(poly) => scene.shapes.push(shape(spec, poly, cfg)),
                    None => scene.missing += 1,
                }
            }
        }
    }

    if scene.missing > 0 {
        tracing::debug!(missing = scene.missing, "leaves without polygons omitted");
    }
    scene
}
