// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub mod commands;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    SessionResult, expand_path, explore_events, load_dashboard, load_events_from_file, parse_event_line,
    render_output, run_events, show_banner,
};
