// Tests for colouring, sizing and control options

use jaal_core::error::JaalError;
use jaal_core::model::{
    AttrValue, Bounds, DEFAULT_COLOR, DEFAULT_EDGE_SIZE, DEFAULT_NODE_SIZE, Edge, GraphData, Node,
    ScalingBounds,
};
use jaal_core::style::{
    COLOR_UNIQUE_LIMIT, ControlOptions, color_edges, color_nodes, distinct_colors, reproject, size_edges,
    size_nodes,
};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::HashSet;

fn teams() -> GraphData {
    GraphData::new(
        vec![
            Node::new("a").with_attribute("team", "core").with_attribute("score", 0.0),
            Node::new("b").with_attribute("team", "infra").with_attribute("score", 10.0),
            Node::new("c").with_attribute("team", "core").with_attribute("score", 20.0),
        ],
        vec![
            Edge::new("0", "a", "b").with_attribute("weight", 2.0),
            Edge::new("1", "b", "c").with_attribute("weight", 4.0),
        ],
    )
}

fn convert(items: &[(&str, f64, f64)]) -> IndexMap<String, Bounds> {
    items
        .iter()
        .map(|(name, min, max)| (name.to_string(), Bounds { min: *min, max: *max }))
        .collect()
}

fn bounds(node: &[(&str, f64, f64)], edge: &[(&str, f64, f64)]) -> ScalingBounds {
    ScalingBounds {
        node: convert(node),
        edge: convert(edge),
    }
}

// ============================================================================
// Colour Generator Tests
// ============================================================================

#[test]
fn test_distinct_colors_are_distinct_hex() {
    let colors = distinct_colors(COLOR_UNIQUE_LIMIT);
    let unique: HashSet<&String> = colors.iter().collect();
    assert_eq!(unique.len(), COLOR_UNIQUE_LIMIT);
    for color in &colors {
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_distinct_colors_empty() {
    assert!(distinct_colors(0).is_empty());
}

// ============================================================================
// Colouring Tests
// ============================================================================

#[test]
fn test_color_nodes_by_attribute() {
    let mut graph = teams();
    let mapping = color_nodes(&mut graph, Some("team")).unwrap();

    assert_eq!(mapping.len(), 2);
    let keys: Vec<&AttrValue> = mapping.keys().collect();
    assert_eq!(keys, vec![&AttrValue::from("core"), &AttrValue::from("infra")]);
    assert_eq!(graph.nodes[0].color, graph.nodes[2].color);
    assert_ne!(graph.nodes[0].color, graph.nodes[1].color);
    assert_eq!(graph.nodes[1].color, mapping[&AttrValue::from("infra")]);
}

#[test]
fn test_color_edges_writes_nested_color() {
    let mut graph = teams();
    let mapping = color_edges(&mut graph, Some("weight")).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(graph.edges[0].color.color, mapping[&AttrValue::Number(2.0)]);
}

#[test]
fn test_color_reset_restores_default() {
    let mut graph = teams();
    color_nodes(&mut graph, Some("team")).unwrap();
    color_edges(&mut graph, Some("weight")).unwrap();

    assert!(color_nodes(&mut graph, None).unwrap().is_empty());
    assert!(color_edges(&mut graph, None).unwrap().is_empty());
    assert!(graph.nodes.iter().all(|n| n.color == DEFAULT_COLOR));
    assert!(graph.edges.iter().all(|e| e.color.color == DEFAULT_COLOR));
}

#[test]
fn test_color_unknown_attribute_leaves_graph_untouched() {
    let mut graph = teams();
    let before = graph.clone();
    let result = color_nodes(&mut graph, Some("missing"));
    assert!(matches!(result, Err(JaalError::UnknownAttribute(name)) if name == "missing"));
    assert_eq!(graph, before);
}

#[test]
fn test_color_by_builtin_field() {
    let mut graph = teams();
    let mapping = color_nodes(&mut graph, Some("id")).unwrap();
    assert_eq!(mapping.len(), 3);
}

// ============================================================================
// Sizing Tests
// ============================================================================

#[test]
fn test_size_nodes_linear_offsets() {
    let mut graph = teams();
    let scaling = bounds(&[("score", 0.0, 20.0)], &[]);
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();

    let sizes: Vec<f64> = graph.nodes.iter().map(|n| n.size).collect();
    assert_eq!(
        sizes,
        vec![DEFAULT_NODE_SIZE, DEFAULT_NODE_SIZE + 10.0, DEFAULT_NODE_SIZE + 20.0]
    );
}

#[test]
fn test_size_nodes_is_additive() {
    let mut graph = teams();
    let scaling = bounds(&[("score", 0.0, 20.0)], &[]);
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();
    assert_eq!(graph.nodes[2].size, DEFAULT_NODE_SIZE + 40.0);
}

#[test]
fn test_size_edges_overwrites_width() {
    let mut graph = teams();
    let scaling = bounds(&[], &[("weight", 2.0, 4.0)]);
    size_edges(&mut graph, &scaling, Some("weight")).unwrap();
    size_edges(&mut graph, &scaling, Some("weight")).unwrap();
    assert_eq!(graph.edges[0].width, 0.0);
    assert_eq!(graph.edges[1].width, 20.0);
}

#[test]
fn test_size_degenerate_bounds_gives_zero_offset() {
    let mut graph = teams();
    let scaling = bounds(&[("score", 5.0, 5.0)], &[]);
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();
    assert!(graph.nodes.iter().all(|n| n.size == DEFAULT_NODE_SIZE));
}

#[test]
fn test_size_null_value_gives_zero_offset() {
    let mut graph = GraphData::new(
        vec![
            Node::new("a").with_attribute("score", AttrValue::Null),
            Node::new("b").with_attribute("score", 20.0),
        ],
        vec![],
    );
    let scaling = bounds(&[("score", 0.0, 20.0)], &[]);
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();
    assert_eq!(graph.nodes[0].size, DEFAULT_NODE_SIZE);
    assert_eq!(graph.nodes[1].size, DEFAULT_NODE_SIZE + 20.0);
}

#[test]
fn test_size_reset_restores_defaults() {
    let mut graph = teams();
    let scaling = bounds(&[("score", 0.0, 20.0)], &[("weight", 2.0, 4.0)]);
    size_nodes(&mut graph, &scaling, Some("score")).unwrap();
    size_edges(&mut graph, &scaling, Some("weight")).unwrap();

    size_nodes(&mut graph, &scaling, None).unwrap();
    size_edges(&mut graph, &scaling, None).unwrap();
    assert!(graph.nodes.iter().all(|n| n.size == DEFAULT_NODE_SIZE));
    assert!(graph.edges.iter().all(|e| e.width == DEFAULT_EDGE_SIZE));
}

#[test]
fn test_size_without_bounds_is_unknown_attribute() {
    let mut graph = teams();
    let result = size_nodes(&mut graph, &ScalingBounds::default(), Some("team"));
    assert!(matches!(result, Err(JaalError::UnknownAttribute(_))));
}

// ============================================================================
// Reprojection and Option Tests
// ============================================================================

#[test]
fn test_reproject_carries_new_styles() {
    let mut full = teams();
    let shown = GraphData::new(vec![full.nodes[2].clone()], vec![full.edges[1].clone()]);
    color_nodes(&mut full, Some("team")).unwrap();

    let view = reproject(&full, &shown);
    assert_eq!(view.nodes.len(), 1);
    assert_eq!(view.nodes[0].id, "c");
    assert_eq!(view.nodes[0].color, full.nodes[2].color);
    assert_eq!(view.edges.len(), 1);
}

#[test]
fn test_control_options() {
    let mut graph = teams();
    for (i, node) in graph.nodes.iter_mut().enumerate() {
        node.attributes.insert("uid".into(), AttrValue::Number(i as f64));
    }
    let many: Vec<Node> = (0..=COLOR_UNIQUE_LIMIT)
        .map(|i| {
            Node::new(format!("x{}", i))
                .with_attribute("team", "core")
                .with_attribute("score", 1.0)
                .with_attribute("uid", (100 + i) as f64)
        })
        .collect();
    graph.nodes.extend(many);

    let scaling = bounds(&[("score", 0.0, 20.0), ("uid", 0.0, 120.0)], &[("weight", 2.0, 4.0)]);
    let options = ControlOptions::from_data(&graph, &scaling);

    assert_eq!(options.node_color, vec!["score", "team"]);
    assert_eq!(options.edge_color, vec!["weight"]);
    assert_eq!(options.node_size, vec!["score", "uid"]);
    assert_eq!(options.edge_size, vec!["weight"]);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_coloring_is_total_function_of_value(values in prop::collection::vec(0u8..6, 1..30)) {
        let nodes = values
            .iter()
            .enumerate()
            .map(|(i, v)| Node::new(i.to_string()).with_attribute("group", *v as f64))
            .collect();
        let mut graph = GraphData::new(nodes, vec![]);
        let mapping = color_nodes(&mut graph, Some("group")).unwrap();

        let distinct: HashSet<u8> = values.iter().copied().collect();
        prop_assert_eq!(mapping.len(), distinct.len());
        let colors: HashSet<&String> = mapping.values().collect();
        prop_assert_eq!(colors.len(), distinct.len());

        for (i, a) in values.iter().enumerate() {
            for (j, b) in values.iter().enumerate() {
                let same = graph.nodes[i].color == graph.nodes[j].color;
                prop_assert_eq!(same, a == b);
            }
        }
    }

    #[test]
    fn prop_scaled_size_stays_in_range(min in -100.0f64..100.0, span in 0.0f64..100.0, t in 0.0f64..=1.0) {
        let max = min + span;
        let value = min + span * t;
        let mut graph = GraphData::new(
            vec![Node::new("a").with_attribute("v", value)],
            vec![Edge::new("0", "a", "a").with_attribute("v", value)],
        );
        let scaling = bounds(&[("v", min, max)], &[("v", min, max)]);
        size_nodes(&mut graph, &scaling, Some("v")).unwrap();
        size_edges(&mut graph, &scaling, Some("v")).unwrap();
        let offset = graph.nodes[0].size - DEFAULT_NODE_SIZE;
        prop_assert!((-1e-9..=20.0 + 1e-9).contains(&offset));
        prop_assert!((-1e-9..=20.0 + 1e-9).contains(&graph.edges[0].width));
    }
}
