//! Dashboard state and control-event dispatch.
//!
//! The browser shell reports which control changed last together with the
//! values of every control and the snapshot it is currently showing.
//! [`Dashboard::dispatch`] routes that event to exactly one transform and
//! hands back the snapshot to draw and the colour legend.

use crate::data::Dataset;
use crate::error::{JaalError, Result};
use crate::filter::{self, RelatedOptions};
use crate::model::{GraphData, ScalingBounds};
use crate::report::{DatasetSummary, Legend};
use crate::style::{self, ColorMapping, ControlOptions};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Sentinel dropdown value meaning "no colouring" / "no sizing".
pub const NONE_SELECTION: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    SearchGraph,
    FilterNodes,
    FilterEdges,
    AddRelatedEntities,
    IncludeRelatedOrg,
    IncludeRelatedWf,
    IncludeRelatedTables,
    ColorNodes,
    ColorEdges,
    SizeNodes,
    SizeEdges,
}

impl ControlId {
    /// Every control, in dispatch precedence order.
    pub const ALL: [ControlId; 11] = [
        ControlId::SearchGraph,
        ControlId::FilterNodes,
        ControlId::AddRelatedEntities,
        ControlId::IncludeRelatedOrg,
        ControlId::IncludeRelatedWf,
        ControlId::IncludeRelatedTables,
        ControlId::FilterEdges,
        ControlId::ColorNodes,
        ControlId::ColorEdges,
        ControlId::SizeNodes,
        ControlId::SizeEdges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::SearchGraph => "search_graph",
            ControlId::FilterNodes => "filter_nodes",
            ControlId::FilterEdges => "filter_edges",
            ControlId::AddRelatedEntities => "add_related_entities",
            ControlId::IncludeRelatedOrg => "include_related_org",
            ControlId::IncludeRelatedWf => "include_related_wf",
            ControlId::IncludeRelatedTables => "include_related_tables",
            ControlId::ColorNodes => "color_nodes",
            ControlId::ColorEdges => "color_edges",
            ControlId::SizeNodes => "size_nodes",
            ControlId::SizeEdges => "size_edges",
        }
    }

    /// Accepts a bare control name or a property id such as `search_graph.value`.
    pub fn from_str(s: &str) -> Option<Self> {
        let name = s.split('.').next().unwrap_or(s).trim();
        ControlId::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(
            self,
            ControlId::AddRelatedEntities
                | ControlId::IncludeRelatedOrg
                | ControlId::IncludeRelatedWf
                | ControlId::IncludeRelatedTables
        )
    }

    fn route(&self) -> Route {
        match self {
            ControlId::SearchGraph => Route::Search,
            ControlId::FilterNodes
            | ControlId::AddRelatedEntities
            | ControlId::IncludeRelatedOrg
            | ControlId::IncludeRelatedWf
            | ControlId::IncludeRelatedTables => Route::FilterNodes,
            ControlId::FilterEdges => Route::FilterEdges,
            ControlId::ColorNodes => Route::ColorNodes,
            ControlId::ColorEdges => Route::ColorEdges,
            ControlId::SizeNodes => Route::SizeNodes,
            ControlId::SizeEdges => Route::SizeEdges,
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Search,
    FilterNodes,
    FilterEdges,
    ColorNodes,
    ColorEdges,
    SizeNodes,
    SizeEdges,
}

/// Reads a dropdown value; the sentinel and blank mean no selection.
pub fn parse_selection(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == NONE_SELECTION {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_checkbox(control: ControlId, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "checked" => Ok(true),
        "false" | "0" | "no" | "off" | "unchecked" => Ok(false),
        _ => Err(JaalError::InvalidControlValue {
            control: control.as_str(),
            value: value.to_string(),
        }),
    }
}

/// Current value of every control. The default is the dashboard's initial
/// state: empty texts, every related category included, nothing selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub search_text: String,
    pub filter_nodes: String,
    pub filter_edges: String,
    pub related: RelatedOptions,
    pub color_nodes: Option<String>,
    pub color_edges: Option<String>,
    pub size_nodes: Option<String>,
    pub size_edges: Option<String>,
}

impl Controls {
    /// Stores a raw control value as the UI would report it.
    pub fn set(&mut self, control: ControlId, value: &str) -> Result<()> {
        match control {
            ControlId::SearchGraph => self.search_text = value.to_string(),
            ControlId::FilterNodes => self.filter_nodes = value.to_string(),
            ControlId::FilterEdges => self.filter_edges = value.to_string(),
            ControlId::AddRelatedEntities => {
                self.related.add_related_entities = parse_checkbox(control, value)?
            }
            ControlId::IncludeRelatedOrg => self.related.include_org = parse_checkbox(control, value)?,
            ControlId::IncludeRelatedWf => self.related.include_wf = parse_checkbox(control, value)?,
            ControlId::IncludeRelatedTables => {
                self.related.include_tables = parse_checkbox(control, value)?
            }
            ControlId::ColorNodes => self.color_nodes = parse_selection(value),
            ControlId::ColorEdges => self.color_edges = parse_selection(value),
            ControlId::SizeNodes => self.size_nodes = parse_selection(value),
            ControlId::SizeEdges => self.size_edges = parse_selection(value),
        }
        Ok(())
    }
}

/// One user interaction: a control and the value it changed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub control: ControlId,
    pub value: String,
}

impl ControlEvent {
    pub fn new(control: ControlId, value: impl Into<String>) -> Self {
        Self {
            control,
            value: value.into(),
        }
    }
}

/// What the shell should draw after an event.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub snapshot: GraphData,
    pub legend: Legend,
    /// A recovered failure. Failed transforms revert the snapshot to the
    /// full dataset; a rejected control value leaves it as displayed.
    pub failure: Option<JaalError>,
}

/// Full dataset, filtered view and colour mappings of one dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    full: GraphData,
    filtered: GraphData,
    scaling: ScalingBounds,
    node_colors: ColorMapping,
    edge_colors: ColorMapping,
    related: RelatedOptions,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            filtered: dataset.graph.clone(),
            full: dataset.graph,
            scaling: dataset.scaling,
            node_colors: ColorMapping::new(),
            edge_colors: ColorMapping::new(),
            related: RelatedOptions::default(),
        }
    }

    pub fn full(&self) -> &GraphData {
        &self.full
    }

    pub fn filtered(&self) -> &GraphData {
        &self.filtered
    }

    pub fn scaling(&self) -> &ScalingBounds {
        &self.scaling
    }

    pub fn related_options(&self) -> RelatedOptions {
        self.related
    }

    pub fn node_colors(&self) -> &ColorMapping {
        &self.node_colors
    }

    pub fn edge_colors(&self) -> &ColorMapping {
        &self.edge_colors
    }

    pub fn legend(&self) -> Legend {
        Legend::from_mappings(&self.node_colors, &self.edge_colors)
    }

    pub fn control_options(&self) -> ControlOptions {
        ControlOptions::from_data(&self.full, &self.scaling)
    }

    pub fn summary(&self) -> DatasetSummary {
        let node_attributes: IndexSet<String> = self
            .full
            .nodes
            .iter()
            .flat_map(|n| n.attributes.keys().cloned())
            .collect();
        let edge_attributes: IndexSet<String> = self
            .full
            .edges
            .iter()
            .flat_map(|e| e.attributes.keys().cloned())
            .collect();

        DatasetSummary {
            total_nodes: self.full.nodes.len(),
            total_edges: self.full.edges.len(),
            node_attributes: node_attributes.into_iter().collect(),
            edge_attributes: edge_attributes.into_iter().collect(),
            node_bounds: self.scaling.node.clone(),
            edge_bounds: self.scaling.edge.clone(),
            options: self.control_options(),
        }
    }

    /// Handles one control event. `trigger` is `None` on first load.
    pub fn dispatch(
        &mut self,
        trigger: Option<ControlId>,
        controls: &Controls,
        displayed: GraphData,
    ) -> DispatchOutcome {
        let Some(trigger) = trigger else {
            debug!("No trigger, serving the full dataset");
            return DispatchOutcome {
                snapshot: self.full.clone(),
                legend: Legend::default(),
                failure: None,
            };
        };

        debug!("Dispatching {}", trigger);
        let result = match trigger.route() {
            Route::Search => Ok(filter::search_graph(displayed, &controls.search_text)),
            Route::FilterNodes => self.apply_node_filter(&controls.filter_nodes, controls.related),
            Route::FilterEdges => self.apply_edge_filter(&controls.filter_edges),
            Route::ColorNodes => self.apply_node_colors(controls.color_nodes.as_deref()),
            Route::ColorEdges => self.apply_edge_colors(controls.color_edges.as_deref()),
            Route::SizeNodes => self.apply_node_sizes(controls.size_nodes.as_deref()),
            Route::SizeEdges => self.apply_edge_sizes(controls.size_edges.as_deref()),
        };

        let (snapshot, failure) = match result {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                warn!("{} failed, reverting to the full dataset: {}", trigger, e);
                self.filtered = self.full.clone();
                (self.full.clone(), Some(e))
            }
        };

        DispatchOutcome {
            snapshot,
            legend: self.legend(),
            failure,
        }
    }

    /// Applies `event` to `controls` and dispatches it. An unparseable
    /// checkbox value is reported without touching the dashboard.
    pub fn handle_event(
        &mut self,
        controls: &mut Controls,
        event: &ControlEvent,
        displayed: GraphData,
    ) -> DispatchOutcome {
        if let Err(e) = controls.set(event.control, &event.value) {
            warn!("Ignoring event: {}", e);
            return DispatchOutcome {
                snapshot: displayed,
                legend: self.legend(),
                failure: Some(e),
            };
        }
        self.dispatch(Some(event.control), controls, displayed)
    }

    fn apply_node_filter(&mut self, query: &str, related: RelatedOptions) -> Result<GraphData> {
        self.related = related;
        self.filtered = filter::filter_nodes(&self.full, query, &related)?;
        Ok(self.filtered.clone())
    }

    fn apply_edge_filter(&mut self, query: &str) -> Result<GraphData> {
        self.filtered = filter::filter_edges(&self.full, &self.filtered, query)?;
        Ok(self.filtered.clone())
    }

    fn reproject(&mut self) -> GraphData {
        self.filtered = style::reproject(&self.full, &self.filtered);
        self.filtered.clone()
    }

    fn apply_node_colors(&mut self, attribute: Option<&str>) -> Result<GraphData> {
        self.node_colors = style::color_nodes(&mut self.full, attribute)?;
        Ok(self.reproject())
    }

    fn apply_edge_colors(&mut self, attribute: Option<&str>) -> Result<GraphData> {
        self.edge_colors = style::color_edges(&mut self.full, attribute)?;
        Ok(self.reproject())
    }

    fn apply_node_sizes(&mut self, attribute: Option<&str>) -> Result<GraphData> {
        style::size_nodes(&mut self.full, &self.scaling, attribute)?;
        Ok(self.reproject())
    }

    fn apply_edge_sizes(&mut self, attribute: Option<&str>) -> Result<GraphData> {
        style::size_edges(&mut self.full, &self.scaling, attribute)?;
        Ok(self.reproject())
    }
}
