// Attribute-driven colouring and sizing of nodes and edges

use crate::error::{JaalError, Result};
use crate::model::{
    AttrValue, Bounds, DEFAULT_COLOR, DEFAULT_EDGE_SIZE, DEFAULT_NODE_SIZE, ElementKind, GraphData, Record,
    ScalingBounds,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Width of the visual range numeric attributes are scaled onto.
pub const SIZE_SCALE: f64 = 20.0;

/// Attributes with more distinct values than this are not offered for colouring.
pub const COLOR_UNIQUE_LIMIT: usize = 20;

/// Attribute value to colour, in first-seen value order.
pub type ColorMapping = IndexMap<AttrValue, String>;

/// `n` colours with evenly spaced hues at half saturation and value.
pub fn distinct_colors(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| hsv_to_hex(i as f64 / n as f64, 0.5, 0.5))
        .collect()
}

fn hsv_to_hex(h: f64, s: f64, v: f64) -> String {
    let (r, g, b) = hsv_to_rgb(h, s, v);
    let channel = |x: f64| (x * 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn attribute_values<R: Record>(records: &[R], attribute: &str) -> Result<Vec<AttrValue>> {
    records
        .iter()
        .map(|r| {
            r.attribute(attribute)
                .ok_or_else(|| JaalError::UnknownAttribute(attribute.to_string()))
        })
        .collect()
}

fn build_mapping(values: &[AttrValue]) -> ColorMapping {
    let unique: IndexSet<&AttrValue> = values.iter().collect();
    let colors = distinct_colors(unique.len());
    unique.into_iter().cloned().zip(colors).collect()
}

/// Recolours every node of `full` by `attribute`, or back to the default
/// colour when `attribute` is `None`. Nothing changes on failure.
pub fn color_nodes(full: &mut GraphData, attribute: Option<&str>) -> Result<ColorMapping> {
    let Some(attribute) = attribute else {
        for node in &mut full.nodes {
            node.color = DEFAULT_COLOR.to_string();
        }
        return Ok(ColorMapping::new());
    };

    let values = attribute_values(&full.nodes, attribute)?;
    let mapping = build_mapping(&values);
    for (node, value) in full.nodes.iter_mut().zip(&values) {
        if let Some(color) = mapping.get(value) {
            node.color = color.clone();
        }
    }
    debug!("Coloured nodes by '{}' ({} values)", attribute, mapping.len());
    Ok(mapping)
}

/// Edge counterpart of [`color_nodes`]; writes the nested edge colour.
pub fn color_edges(full: &mut GraphData, attribute: Option<&str>) -> Result<ColorMapping> {
    let Some(attribute) = attribute else {
        for edge in &mut full.edges {
            edge.color.color = DEFAULT_COLOR.to_string();
        }
        return Ok(ColorMapping::new());
    };

    let values = attribute_values(&full.edges, attribute)?;
    let mapping = build_mapping(&values);
    for (edge, value) in full.edges.iter_mut().zip(&values) {
        if let Some(color) = mapping.get(value) {
            edge.color.color = color.clone();
        }
    }
    debug!("Coloured edges by '{}' ({} values)", attribute, mapping.len());
    Ok(mapping)
}

/// Scaled offset of a raw value; anything non-numeric scales to 0.
fn scaled(value: Option<AttrValue>, scale: impl Fn(f64) -> f64) -> f64 {
    value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .map(scale)
        .unwrap_or(0.0)
}

/// Adds the scaled value of `attribute` to every node size, or resets sizes
/// to the default when `attribute` is `None`.
pub fn size_nodes(full: &mut GraphData, scaling: &ScalingBounds, attribute: Option<&str>) -> Result<()> {
    let Some(attribute) = attribute else {
        for node in &mut full.nodes {
            node.size = DEFAULT_NODE_SIZE;
        }
        return Ok(());
    };

    let bounds = scaling
        .get(ElementKind::Node, attribute)
        .ok_or_else(|| JaalError::UnknownAttribute(attribute.to_string()))?;
    for node in &mut full.nodes {
        node.size += scaled(node.attribute(attribute), |v| bounds.scale(v, SIZE_SCALE));
    }
    debug!("Sized nodes by '{}'", attribute);
    Ok(())
}

/// Sets every edge width to the scaled value of `attribute`, or resets
/// widths to the default when `attribute` is `None`.
pub fn size_edges(full: &mut GraphData, scaling: &ScalingBounds, attribute: Option<&str>) -> Result<()> {
    let Some(attribute) = attribute else {
        for edge in &mut full.edges {
            edge.width = DEFAULT_EDGE_SIZE;
        }
        return Ok(());
    };

    let bounds = scaling
        .get(ElementKind::Edge, attribute)
        .ok_or_else(|| JaalError::UnknownAttribute(attribute.to_string()))?;
    for edge in &mut full.edges {
        edge.width = scaled(edge.attribute(attribute), |v| bounds.scale(v, SIZE_SCALE));
    }
    debug!("Sized edges by '{}'", attribute);
    Ok(())
}

/// The elements of `full` whose ids are present in `shown`, in `full` order.
/// Used to carry fresh visual attributes into the filtered view.
pub fn reproject(full: &GraphData, shown: &GraphData) -> GraphData {
    let node_ids = shown.node_ids();
    let edge_ids = shown.edge_ids();
    GraphData {
        nodes: full
            .nodes
            .iter()
            .filter(|n| node_ids.contains(n.id.as_str()))
            .cloned()
            .collect(),
        edges: full
            .edges
            .iter()
            .filter(|e| edge_ids.contains(e.id.as_str()))
            .cloned()
            .collect(),
    }
}

/// Attribute names offered by the colour and size dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOptions {
    pub node_color: Vec<String>,
    pub edge_color: Vec<String>,
    pub node_size: Vec<String>,
    pub edge_size: Vec<String>,
}

fn categorical<'a>(attribute_maps: impl Iterator<Item = &'a IndexMap<String, AttrValue>>) -> Vec<String> {
    let mut values: IndexMap<&str, IndexSet<&AttrValue>> = IndexMap::new();
    for attributes in attribute_maps {
        for (name, value) in attributes {
            values.entry(name.as_str()).or_default().insert(value);
        }
    }
    let mut names: Vec<String> = values
        .into_iter()
        .filter(|(_, unique)| unique.len() <= COLOR_UNIQUE_LIMIT)
        .map(|(name, _)| name.to_string())
        .collect();
    names.sort();
    names
}

fn numeric(bounds: &IndexMap<String, Bounds>) -> Vec<String> {
    let mut names: Vec<String> = bounds.keys().cloned().collect();
    names.sort();
    names
}

impl ControlOptions {
    pub fn from_data(full: &GraphData, scaling: &ScalingBounds) -> Self {
        Self {
            node_color: categorical(full.nodes.iter().map(|n| &n.attributes)),
            edge_color: categorical(full.edges.iter().map(|e| &e.attributes)),
            node_size: numeric(&scaling.node),
            edge_size: numeric(&scaling.edge),
        }
    }
}
