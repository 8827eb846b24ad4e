use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use jaal_core::data::load_dataset_from_paths;
use jaal_core::dispatch::{ControlEvent, ControlId, Controls, Dashboard};
use jaal_core::model::GraphData;
use jaal_core::report::{
    Legend, ReportFormat, generate_json_report, generate_summary_report, generate_text_report,
    save_report,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Load the edge (and optional node) table into a fresh dashboard
pub fn load_dashboard(edges: &Path, nodes: Option<&Path>) -> anyhow::Result<Dashboard> {
    let edges = expand_path(edges);
    let nodes = nodes.map(expand_path);
    let dataset = load_dataset_from_paths(&edges, nodes.as_deref()).with_context(|| match &nodes {
        Some(nodes) => format!(
            "Failed to load {} and {}",
            edges.display(),
            nodes.display()
        ),
        None => format!("Failed to load {}", edges.display()),
    })?;
    Ok(Dashboard::new(dataset))
}

/// Parse one script line as a `control=value` event.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_event_line(line: &str) -> Result<Option<ControlEvent>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, value) = line
        .split_once('=')
        .ok_or_else(|| format!("Expected 'control=value', got '{}'", line))?;
    let control =
        ControlId::from_str(name).ok_or_else(|| format!("Unknown control '{}'", name.trim()))?;

    Ok(Some(ControlEvent::new(control, value.trim())))
}

/// Load and parse control events from a script file
pub fn load_events_from_file(path: &Path) -> Result<Vec<ControlEvent>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read script file {}: {}", path.display(), e))?;

    let mut events = Vec::new();
    for (number, line) in content.lines().enumerate() {
        match parse_event_line(line) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => return Err(format!("{}:{}: {}", path.display(), number + 1, e)),
        }
    }

    if events.is_empty() {
        return Err(format!("No control events found in {}", path.display()));
    }

    Ok(events)
}

/// Turn the `explore` options into control events.
///
/// Filters and styling fire in dispatch precedence order. Search goes last:
/// it only flags the displayed snapshot, which every other event rebuilds.
pub fn explore_events(args: &ArgMatches) -> Vec<ControlEvent> {
    let mut events = Vec::new();
    let text = |id: &str| args.get_one::<String>(id).cloned();

    // checkbox changes land before the filter so it runs with the final flags
    let checkboxes = [
        ("no-related", ControlId::AddRelatedEntities),
        ("exclude-org", ControlId::IncludeRelatedOrg),
        ("exclude-wf", ControlId::IncludeRelatedWf),
        ("exclude-tables", ControlId::IncludeRelatedTables),
    ];
    for (flag, control) in checkboxes {
        if args.get_flag(flag) {
            events.push(ControlEvent::new(control, "false"));
        }
    }

    let selections = [
        ("filter-nodes", ControlId::FilterNodes),
        ("filter-edges", ControlId::FilterEdges),
        ("color-nodes", ControlId::ColorNodes),
        ("color-edges", ControlId::ColorEdges),
        ("size-nodes", ControlId::SizeNodes),
        ("size-edges", ControlId::SizeEdges),
        ("search", ControlId::SearchGraph),
    ];
    for (id, control) in selections {
        if let Some(value) = text(id) {
            events.push(ControlEvent::new(control, value));
        }
    }

    events
}

/// State after a sequence of control events
#[derive(Debug)]
pub struct SessionResult {
    pub snapshot: GraphData,
    pub legend: Legend,
    pub failures: Vec<String>,
}

/// Drive a dashboard through `events`, starting from its first-load state
pub fn run_events(dashboard: &mut Dashboard, events: &[ControlEvent]) -> SessionResult {
    let mut controls = Controls::default();
    let initial = dashboard.dispatch(None, &controls, GraphData::default());
    let mut snapshot = initial.snapshot;
    let mut legend = initial.legend;
    let mut failures = Vec::new();

    for event in events {
        debug!("Event {}={}", event.control, event.value);
        let outcome = dashboard.handle_event(&mut controls, event, snapshot);
        if let Some(e) = outcome.failure {
            failures.push(format!("{}={}: {}", event.control, event.value, e));
        }
        snapshot = outcome.snapshot;
        legend = outcome.legend;
    }

    SessionResult {
        snapshot,
        legend,
        failures,
    }
}

pub fn render_output(snapshot: &GraphData, legend: &Legend, format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(snapshot, legend)),
        ReportFormat::Json => {
            generate_json_report(snapshot, legend).context("Failed to serialize snapshot report")
        }
    }
}

/// Whether the banner may go to stdout: not with `--quiet`, and not when a
/// JSON report is written there.
pub fn show_banner(matches: &ArgMatches) -> bool {
    if matches.get_flag("quiet") {
        return false;
    }
    match matches.subcommand() {
        Some(("explore" | "replay", sub)) => {
            let json = report_format(sub).is_ok_and(|f| f == ReportFormat::Json);
            !(json && sub.get_one::<PathBuf>("output").is_none())
        }
        _ => true,
    }
}

fn write_output(content: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let path = expand_path(path);
            save_report(content, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn report_format(args: &ArgMatches) -> anyhow::Result<ReportFormat> {
    let name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    ReportFormat::from_str(name).ok_or_else(|| anyhow!("Unsupported report format '{}'", name))
}

fn required_path<'a>(args: &'a ArgMatches, id: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(id)
        .ok_or_else(|| anyhow!("Missing required argument --{}", id))
}

fn print_failures(failures: &[String]) {
    for failure in failures {
        eprintln!("{} {}", "⚠".yellow().bold(), failure);
    }
}

fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
}

fn run_summary(args: &ArgMatches) -> anyhow::Result<()> {
    let edges = required_path(args, "edges")?;
    let nodes = args.get_one::<PathBuf>("nodes");
    let dashboard = load_dashboard(edges, nodes.map(PathBuf::as_path))?;
    print!("{}", generate_summary_report(&dashboard.summary()));
    Ok(())
}

fn run_session(args: &ArgMatches, events: Vec<ControlEvent>) -> anyhow::Result<()> {
    let format = report_format(args)?;
    let edges = required_path(args, "edges")?;
    let nodes = args.get_one::<PathBuf>("nodes");
    let mut dashboard = load_dashboard(edges, nodes.map(PathBuf::as_path))?;

    if events.is_empty() {
        warn!("No controls given, showing the full dataset");
    }
    let result = run_events(&mut dashboard, &events);
    print_failures(&result.failures);

    let content = render_output(&result.snapshot, &result.legend, format)?;
    write_output(&content, args.get_one::<PathBuf>("output"))
}

fn run_replay(args: &ArgMatches) -> anyhow::Result<()> {
    let script = expand_path(required_path(args, "script")?);
    let events = load_events_from_file(&script).map_err(|e| anyhow!(e))?;
    info!("Replaying {} events from {}", events.len(), script.display());
    run_session(args, events)
}

pub fn handle_summary(sub_matches: &ArgMatches) {
    init_tracing();
    exit_on_error(run_summary(sub_matches));
}

pub fn handle_explore(sub_matches: &ArgMatches) {
    init_tracing();
    let events = explore_events(sub_matches);
    exit_on_error(run_session(sub_matches, events));
}

pub fn handle_replay(sub_matches: &ArgMatches) {
    init_tracing();
    exit_on_error(run_replay(sub_matches));
}
