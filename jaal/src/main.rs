use jaal::commands::command_argument_builder;
use jaal::handlers::{handle_explore, handle_replay, handle_summary, show_banner};
use jaal_core::print_banner;

fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    if show_banner(&chosen_command) {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("summary", primary_command)) => handle_summary(primary_command),
        Some(("explore", primary_command)) => handle_explore(primary_command),
        Some(("replay", primary_command)) => handle_replay(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
