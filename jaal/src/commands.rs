use clap::{arg, command, value_parser};
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn edges_arg() -> clap::Arg {
    arg!(-e --"edges" <PATH>)
        .required(true)
        .help("CSV edge table with 'from' and 'to' columns")
        .value_parser(value_parser!(PathBuf))
}

fn nodes_arg() -> clap::Arg {
    arg!(-n --"nodes" <PATH>)
        .required(false)
        .help("Optional CSV node table with an 'id' column")
        .value_parser(value_parser!(PathBuf))
}

fn format_arg() -> clap::Arg {
    arg!(-f --"format" <FORMAT>)
        .required(false)
        .help("Report format: text, json")
        .value_parser(["text", "json"])
        .default_value("text")
}

fn output_arg() -> clap::Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("Save report to file (default: display to screen)")
        .value_parser(value_parser!(PathBuf))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("jaal")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("jaal")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("summary")
                .about("Summarizes a dataset: counts, attributes, scaling bounds and control options")
                .arg(edges_arg())
                .arg(nodes_arg()),
        )
        .subcommand(
            command!("explore")
                .about(
                    "Applies search, filters and styling to a dataset, one control event per \
                option, in dashboard order.",
                )
                .arg(edges_arg())
                .arg(nodes_arg())
                .arg(
                    arg!(-s --"search" <TEXT>)
                        .required(false)
                        .help("Hide nodes whose label does not contain TEXT"),
                )
                .arg(
                    arg!(--"filter-nodes" <QUERY>)
                        .required(false)
                        .help("Keep nodes matching QUERY, e.g. \"team == 'core' and age > 30\""),
                )
                .arg(
                    arg!(--"filter-edges" <QUERY>)
                        .required(false)
                        .help("Keep edges matching QUERY"),
                )
                .arg(
                    arg!(--"no-related")
                        .required(false)
                        .help("Do not add entities related to the filtered nodes")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"exclude-org")
                        .required(false)
                        .help("Skip related organisations (ids containing 'org')")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"exclude-wf")
                        .required(false)
                        .help("Skip related workflows (ids containing 'wf')")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"exclude-tables")
                        .required(false)
                        .help("Skip related tables (ids containing 'table')")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"color-nodes" <ATTRIBUTE>)
                        .required(false)
                        .help("Colour nodes by ATTRIBUTE ('None' resets)"),
                )
                .arg(
                    arg!(--"color-edges" <ATTRIBUTE>)
                        .required(false)
                        .help("Colour edges by ATTRIBUTE ('None' resets)"),
                )
                .arg(
                    arg!(--"size-nodes" <ATTRIBUTE>)
                        .required(false)
                        .help("Grow nodes by the scaled numeric ATTRIBUTE ('None' resets)"),
                )
                .arg(
                    arg!(--"size-edges" <ATTRIBUTE>)
                        .required(false)
                        .help("Set edge widths from the scaled numeric ATTRIBUTE ('None' resets)"),
                )
                .arg(format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            command!("replay")
                .about("Replays a script of control events against a dataset")
                .arg(edges_arg())
                .arg(nodes_arg())
                .arg(
                    arg!(-s --"script" <PATH>)
                        .required(true)
                        .help("Event script: one 'control=value' per line, '#' starts a comment")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(format_arg())
                .arg(output_arg()),
        )
}
