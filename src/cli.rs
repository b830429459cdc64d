//! CLI domain: parse, route, output, and presentation only.
//! No sync logic; the route builds a daemon and presentation renders its events.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use presentation::{
    format_event_json, format_event_text, format_summary_text, ConsoleFormat, ConsoleSink,
};
pub use route::{apply_cli_overrides, RunContext};
