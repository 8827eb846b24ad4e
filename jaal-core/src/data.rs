// Tabular loading: CSV edge/node tables into the graph data model

use crate::error::{JaalError, Result};
use crate::model::{AttrValue, Bounds, Edge, GraphData, Node, ScalingBounds};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const NODE_TABLE: &str = "node";
const EDGE_TABLE: &str = "edge";

/// Node-table columns that would shadow a visual field; dropped on load.
const NODE_SHADOWED: [&str; 3] = ["size", "color", "hidden"];
/// Edge-table columns that would shadow a visual field; dropped on load.
const EDGE_SHADOWED: [&str; 2] = ["width", "color"];

/// Raw rows of a CSV table with a header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cells(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(column).map(String::as_str).unwrap_or(""))
    }

    fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Bool,
    Text,
}

impl ColumnKind {
    /// A column is numeric or boolean only when every non-empty cell agrees.
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let mut numeric = true;
        let mut boolean = true;
        for cell in cells.filter(|c| !c.is_empty()) {
            seen = true;
            numeric &= cell.parse::<f64>().is_ok();
            boolean &= parse_bool(cell).is_some();
        }
        match (seen, numeric, boolean) {
            (false, _, _) => ColumnKind::Text,
            (true, true, _) => ColumnKind::Number,
            (true, _, true) => ColumnKind::Bool,
            _ => ColumnKind::Text,
        }
    }

    pub fn convert(&self, cell: &str) -> AttrValue {
        if cell.is_empty() {
            return AttrValue::Null;
        }
        match self {
            ColumnKind::Number => cell
                .parse::<f64>()
                .map(AttrValue::Number)
                .unwrap_or(AttrValue::Null),
            ColumnKind::Bool => parse_bool(cell)
                .map(AttrValue::Bool)
                .unwrap_or(AttrValue::Null),
            ColumnKind::Text => AttrValue::Text(cell.to_string()),
        }
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// The loaded graph together with the scaling bounds of its numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub graph: GraphData,
    pub scaling: ScalingBounds,
}

/// Attribute columns of a table: everything except the consumed ones.
struct AttributeColumns {
    columns: Vec<(usize, String, ColumnKind)>,
}

impl AttributeColumns {
    fn new(table: &Table, table_name: &str, consumed: &[&str], shadowed: &[&str]) -> Self {
        let mut columns = Vec::new();
        for (idx, header) in table.headers.iter().enumerate() {
            if consumed.contains(&header.as_str()) {
                continue;
            }
            if shadowed.contains(&header.as_str()) {
                warn!(
                    "Ignoring {} column '{}': it collides with a visual attribute",
                    table_name, header
                );
                continue;
            }
            columns.push((idx, header.clone(), ColumnKind::infer(table.cells(idx))));
        }
        Self { columns }
    }

    fn values(&self, table: &Table, row: usize) -> IndexMap<String, AttrValue> {
        self.columns
            .iter()
            .map(|(idx, name, kind)| (name.clone(), kind.convert(table.cell(row, *idx))))
            .collect()
    }

    fn bounds(&self, table: &Table) -> IndexMap<String, Bounds> {
        let mut bounds = IndexMap::new();
        for (idx, name, kind) in &self.columns {
            if *kind != ColumnKind::Number {
                continue;
            }
            let values = table.cells(*idx).filter_map(|c| c.parse::<f64>().ok());
            if let Some(b) = Bounds::from_values(values) {
                bounds.insert(name.clone(), b);
            }
        }
        bounds
    }
}

fn require_column(table: &Table, table_name: &'static str, column: &'static str) -> Result<usize> {
    table.column(column).ok_or(JaalError::MissingColumn {
        table: table_name,
        column,
    })
}

fn load_edges(table: &Table) -> Result<(Vec<Edge>, IndexMap<String, Bounds>)> {
    let from_col = require_column(table, EDGE_TABLE, "from")?;
    let to_col = require_column(table, EDGE_TABLE, "to")?;
    let id_col = table.column("id");
    let attributes = AttributeColumns::new(table, EDGE_TABLE, &["id", "from", "to"], &EDGE_SHADOWED);

    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let id = match id_col {
            Some(col) => table.cell(row, col).to_string(),
            None => row.to_string(),
        };
        if !seen.insert(id.clone()) {
            return Err(JaalError::DuplicateId {
                kind: EDGE_TABLE,
                id,
            });
        }
        let mut edge = Edge::new(id, table.cell(row, from_col), table.cell(row, to_col));
        edge.attributes = attributes.values(table, row);
        edges.push(edge);
    }

    Ok((edges, attributes.bounds(table)))
}

fn load_nodes(table: &Table) -> Result<(Vec<Node>, IndexMap<String, Bounds>)> {
    let id_col = require_column(table, NODE_TABLE, "id")?;
    let label_col = table.column("label");
    let title_col = table.column("title");
    let attributes =
        AttributeColumns::new(table, NODE_TABLE, &["id", "label", "title"], &NODE_SHADOWED);

    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let id = table.cell(row, id_col).to_string();
        if !seen.insert(id.clone()) {
            return Err(JaalError::DuplicateId {
                kind: NODE_TABLE,
                id,
            });
        }
        let mut node = Node::new(id);
        if let Some(col) = label_col {
            node.label = table.cell(row, col).to_string();
        }
        node.title = match title_col {
            Some(col) => table.cell(row, col).to_string(),
            None => node.label.clone(),
        };
        node.attributes = attributes.values(table, row);
        nodes.push(node);
    }

    Ok((nodes, attributes.bounds(table)))
}

/// Nodes implied by the edge endpoints, in first-seen order.
fn nodes_from_edges(edges: &[Edge]) -> Vec<Node> {
    let ids: IndexSet<&str> = edges
        .iter()
        .flat_map(|e| [e.from.as_str(), e.to.as_str()])
        .collect();
    ids.into_iter().map(Node::new).collect()
}

/// Builds the full dataset from an edge table and an optional node table,
/// assigning default visual attributes and computing scaling bounds.
pub fn load_dataset(edge_table: &Table, node_table: Option<&Table>) -> Result<Dataset> {
    let (edges, edge_bounds) = load_edges(edge_table)?;

    let (nodes, node_bounds) = match node_table {
        Some(table) => {
            let (nodes, bounds) = load_nodes(table)?;
            let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
            for edge in &edges {
                if !known.contains(edge.from.as_str()) || !known.contains(edge.to.as_str()) {
                    warn!(
                        "Edge {} references a node missing from the node table ({} -> {})",
                        edge.id, edge.from, edge.to
                    );
                }
            }
            (nodes, bounds)
        }
        None => (nodes_from_edges(&edges), IndexMap::new()),
    };

    info!("Loaded {} nodes and {} edges", nodes.len(), edges.len());

    Ok(Dataset {
        graph: GraphData::new(nodes, edges),
        scaling: ScalingBounds {
            node: node_bounds,
            edge: edge_bounds,
        },
    })
}

/// Reads the CSV files and builds the dataset.
pub fn load_dataset_from_paths(edges: &Path, nodes: Option<&Path>) -> Result<Dataset> {
    let edge_table = Table::from_path(edges)?;
    let node_table = nodes.map(Table::from_path).transpose()?;
    load_dataset(&edge_table, node_table.as_ref())
}
