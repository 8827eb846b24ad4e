// Legend and snapshot reports

use crate::model::{Bounds, GraphData};
use crate::style::{ColorMapping, ControlOptions};
use colored::Colorize;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub value: String,
    pub color: String,
}

/// Value→colour pairs currently applied to nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub nodes: Vec<LegendEntry>,
    pub edges: Vec<LegendEntry>,
}

fn entries(mapping: &ColorMapping) -> Vec<LegendEntry> {
    mapping
        .iter()
        .map(|(value, color)| LegendEntry {
            value: value.to_string(),
            color: color.clone(),
        })
        .collect()
}

impl Legend {
    pub fn from_mappings(nodes: &ColorMapping, edges: &ColorMapping) -> Self {
        Self {
            nodes: entries(nodes),
            edges: entries(edges),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn swatch(color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => "■".truecolor(r, g, b).to_string(),
        None => "■".to_string(),
    }
}

fn legend_section(report: &mut String, title: &str, entries: &[LegendEntry]) {
    report.push_str(&format!("{}\n", format!("{} legends", title).bold()));
    if entries.is_empty() {
        report.push_str(&format!("  no {} colored!\n", title.to_lowercase()));
        return;
    }
    for entry in entries {
        report.push_str(&format!(
            "  {} {}  {}\n",
            swatch(&entry.color),
            entry.value,
            entry.color.dimmed()
        ));
    }
}

pub fn render_legend(legend: &Legend) -> String {
    let mut report = String::new();
    legend_section(&mut report, "Node", &legend.nodes);
    legend_section(&mut report, "Edge", &legend.edges);
    report
}

/// Serializable view of one dashboard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub nodes: Vec<crate::model::Node>,
    pub edges: Vec<crate::model::Edge>,
    pub legend: Legend,
}

impl SnapshotReport {
    pub fn new(snapshot: &GraphData, legend: &Legend) -> Self {
        Self {
            nodes: snapshot.nodes.clone(),
            edges: snapshot.edges.clone(),
            legend: legend.clone(),
        }
    }
}

pub fn generate_json_report(snapshot: &GraphData, legend: &Legend) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SnapshotReport::new(snapshot, legend))
}

pub fn generate_text_report(snapshot: &GraphData, legend: &Legend) -> String {
    let mut report = String::new();
    let hidden = snapshot.nodes.len() - snapshot.visible_node_count();

    report.push_str(&format!("{}\n", "Snapshot".bold()));
    report.push_str(&format!(
        "  Nodes: {} ({} visible, {} hidden)\n",
        snapshot.nodes.len(),
        snapshot.visible_node_count(),
        hidden
    ));
    report.push_str(&format!("  Edges: {}\n\n", snapshot.edges.len()));

    report.push_str(&format!("{}\n", "Nodes".bold()));
    for node in &snapshot.nodes {
        let marker = if node.hidden { "·" } else { "●" };
        report.push_str(&format!(
            "  {} {} {}  size={} color={}\n",
            marker,
            node.id,
            format!("({})", node.label).dimmed(),
            node.size,
            node.color
        ));
    }
    report.push('\n');

    report.push_str(&format!("{}\n", "Edges".bold()));
    for edge in &snapshot.edges {
        report.push_str(&format!(
            "  {} {} -> {}  width={} color={}\n",
            edge.id, edge.from, edge.to, edge.width, edge.color.color
        ));
    }
    report.push('\n');

    report.push_str(&render_legend(legend));
    report
}

/// Overview of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_attributes: Vec<String>,
    pub edge_attributes: Vec<String>,
    pub node_bounds: IndexMap<String, Bounds>,
    pub edge_bounds: IndexMap<String, Bounds>,
    pub options: ControlOptions,
}

pub fn generate_summary_report(summary: &DatasetSummary) -> String {
    let mut report = String::new();
    report.push_str(&format!("{}\n", "Dataset".bold()));
    report.push_str(&format!("  Nodes: {}\n", summary.total_nodes));
    report.push_str(&format!("  Edges: {}\n\n", summary.total_edges));

    let list = |names: &[String]| {
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    };

    report.push_str(&format!("{}\n", "Attributes".bold()));
    report.push_str(&format!("  node: {}\n", list(&summary.node_attributes)));
    report.push_str(&format!("  edge: {}\n\n", list(&summary.edge_attributes)));

    report.push_str(&format!("{}\n", "Scaling bounds".bold()));
    for (kind, bounds) in [("node", &summary.node_bounds), ("edge", &summary.edge_bounds)] {
        for (name, b) in bounds {
            report.push_str(&format!("  {}.{}: {} .. {}\n", kind, name, b.min, b.max));
        }
    }
    report.push('\n');

    report.push_str(&format!("{}\n", "Control options".bold()));
    report.push_str(&format!("  color nodes: {}\n", list(&summary.options.node_color)));
    report.push_str(&format!("  color edges: {}\n", list(&summary.options.edge_color)));
    report.push_str(&format!("  size nodes:  {}\n", list(&summary.options.node_size)));
    report.push_str(&format!("  size edges:  {}\n", list(&summary.options.edge_size)));
    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
