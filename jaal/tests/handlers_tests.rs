use jaal::commands::command_argument_builder;
use jaal::handlers::*;
use jaal_core::dispatch::{ControlEvent, ControlId};
use jaal_core::report::ReportFormat;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn sample_files() -> (NamedTempFile, NamedTempFile) {
    let edges = csv_file(&["from,to,weight", "ann,bob,1", "bob,core_team_org,3", "dan,eve,5"]);
    let nodes = csv_file(&[
        "id,label,team,age",
        "ann,Ann,core,31",
        "bob,Bob,infra,45",
        "core_team_org,Core Team,org,",
        "dan,Dan,core,28",
        "eve,Eve,infra,39",
    ]);
    (edges, nodes)
}

// ============================================================================
// Command Definition Tests
// ============================================================================

#[test]
fn test_command_definition_is_valid() {
    command_argument_builder().debug_assert();
}

#[test]
fn test_explore_requires_edges() {
    let result = command_argument_builder().try_get_matches_from(["jaal", "explore"]);
    assert!(result.is_err());
}

#[test]
fn test_explore_rejects_unknown_format() {
    let result = command_argument_builder()
        .try_get_matches_from(["jaal", "explore", "-e", "edges.csv", "-f", "html"]);
    assert!(result.is_err());
}

#[test]
fn test_banner_skipped_for_json_on_stdout() {
    let banner = |args: &[&str]| show_banner(&command_argument_builder().try_get_matches_from(args).unwrap());

    assert!(banner(&["jaal", "summary", "-e", "edges.csv"]));
    assert!(banner(&["jaal", "explore", "-e", "edges.csv"]));
    assert!(!banner(&["jaal", "-q", "explore", "-e", "edges.csv"]));
    assert!(!banner(&["jaal", "explore", "-e", "edges.csv", "-f", "json"]));
    assert!(!banner(&["jaal", "replay", "-e", "edges.csv", "-s", "run.txt", "-f", "json"]));
    assert!(banner(&["jaal", "explore", "-e", "edges.csv", "-f", "json", "-o", "out.json"]));
}

// ============================================================================
// Event Parsing Tests
// ============================================================================

#[test]
fn test_parse_event_line() {
    let event = parse_event_line("filter_nodes = team == 'core'").unwrap();
    assert_eq!(
        event,
        Some(ControlEvent::new(ControlId::FilterNodes, "team == 'core'"))
    );
}

#[test]
fn test_parse_event_line_property_id() {
    let event = parse_event_line("color_nodes.value=None").unwrap();
    assert_eq!(event, Some(ControlEvent::new(ControlId::ColorNodes, "None")));
}

#[test]
fn test_parse_event_line_skips_comments_and_blanks() {
    assert_eq!(parse_event_line("   ").unwrap(), None);
    assert_eq!(parse_event_line("# size_nodes=age").unwrap(), None);
}

#[test]
fn test_parse_event_line_errors() {
    assert!(parse_event_line("search_graph").is_err());
    assert!(parse_event_line("zoom=3").is_err());
}

#[test]
fn test_load_events_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let script = csv_file(&[
        "# start with the core team",
        "filter_nodes=team == 'core'",
        "",
        "include_related_org=false",
        "color_nodes=team",
    ]);

    let events = load_events_from_file(script.path())?;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].control, ControlId::FilterNodes);
    assert_eq!(events[1], ControlEvent::new(ControlId::IncludeRelatedOrg, "false"));
    assert_eq!(events[2].value, "team");

    Ok(())
}

#[test]
fn test_load_events_from_file_empty() {
    let script = csv_file(&["", "# nothing here"]);
    let result = load_events_from_file(script.path());
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No control events found"));
}

#[test]
fn test_load_events_from_file_reports_line() {
    let script = csv_file(&["search_graph=a", "bogus"]);
    let err = load_events_from_file(script.path()).unwrap_err();
    assert!(err.contains(":2:"));
}

#[test]
fn test_load_events_from_file_nonexistent() {
    let result = load_events_from_file(Path::new("/nonexistent/script.txt"));
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to read script file"));
}

// ============================================================================
// Explore Option Tests
// ============================================================================

#[test]
fn test_explore_events_order() {
    let matches = command_argument_builder()
        .try_get_matches_from([
            "jaal",
            "explore",
            "-e",
            "edges.csv",
            "--search",
            "an",
            "--size-edges",
            "weight",
            "--filter-nodes",
            "age > 30",
            "--exclude-org",
            "--color-nodes",
            "team",
        ])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    let controls: Vec<ControlId> = explore_events(sub).into_iter().map(|e| e.control).collect();

    assert_eq!(
        controls,
        vec![
            ControlId::IncludeRelatedOrg,
            ControlId::FilterNodes,
            ControlId::ColorNodes,
            ControlId::SizeEdges,
            ControlId::SearchGraph,
        ]
    );
}

#[test]
fn test_explore_events_none() {
    let matches = command_argument_builder()
        .try_get_matches_from(["jaal", "explore", "-e", "edges.csv"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    assert!(explore_events(sub).is_empty());
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_load_dashboard() {
    let (edges, nodes) = sample_files();
    let dashboard = load_dashboard(edges.path(), Some(nodes.path())).unwrap();
    assert_eq!(dashboard.full().nodes.len(), 5);
    assert_eq!(dashboard.full().edges.len(), 3);
}

#[test]
fn test_load_dashboard_missing_file() {
    let err = load_dashboard(Path::new("/nonexistent/edges.csv"), None).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load /nonexistent/edges.csv"));
}

#[test]
fn test_run_events_applies_in_order() {
    let (edges, nodes) = sample_files();
    let mut dashboard = load_dashboard(edges.path(), Some(nodes.path())).unwrap();
    let events = vec![
        ControlEvent::new(ControlId::IncludeRelatedOrg, "false"),
        ControlEvent::new(ControlId::FilterNodes, "label == 'Ann'"),
        ControlEvent::new(ControlId::ColorNodes, "team"),
    ];

    let result = run_events(&mut dashboard, &events);
    assert!(result.failures.is_empty());
    let ids: Vec<&str> = result.snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["ann", "bob"]);
    assert_eq!(result.legend.nodes.len(), 3);
}

#[test]
fn test_run_events_collects_failures() {
    let (edges, nodes) = sample_files();
    let mut dashboard = load_dashboard(edges.path(), Some(nodes.path())).unwrap();
    let events = vec![
        ControlEvent::new(ControlId::FilterNodes, "age >"),
        ControlEvent::new(ControlId::AddRelatedEntities, "perhaps"),
    ];

    let result = run_events(&mut dashboard, &events);
    assert_eq!(result.failures.len(), 2);
    assert!(result.failures[0].starts_with("filter_nodes=age >"));
    assert_eq!(result.snapshot.nodes.len(), 5);
}

#[test]
fn test_render_output_json() {
    let (edges, nodes) = sample_files();
    let mut dashboard = load_dashboard(edges.path(), Some(nodes.path())).unwrap();
    let result = run_events(&mut dashboard, &[ControlEvent::new(ControlId::SearchGraph, "e")]);

    let json = render_output(&result.snapshot, &result.legend, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(value["nodes"][0]["hidden"], true);
    assert_eq!(value["nodes"][2]["hidden"], false);
}

#[test]
fn test_render_output_text() {
    let (edges, _) = sample_files();
    let mut dashboard = load_dashboard(edges.path(), None).unwrap();
    let result = run_events(&mut dashboard, &[]);
    let text = render_output(&result.snapshot, &result.legend, ReportFormat::Text).unwrap();
    assert!(text.contains("Nodes: 5 (5 visible, 0 hidden)"));
    assert!(text.contains("no node colored!"));
}

// ============================================================================
// Path Tests
// ============================================================================

#[test]
fn test_expand_path_plain() {
    assert_eq!(
        expand_path(Path::new("/tmp/edges.csv")),
        PathBuf::from("/tmp/edges.csv")
    );
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path(Path::new("~/edges.csv"));
    if let Ok(home) = std::env::var("HOME") {
        assert_eq!(expanded, Path::new(&home).join("edges.csv"));
    }
    assert!(expanded.ends_with("edges.csv"));
}
