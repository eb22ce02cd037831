//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the explorer tree.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, LinkCommands, OutputFormat};
pub use presentation::{
    format_contexts_json, format_contexts_text, format_link, format_tree_json, format_tree_text,
};
pub use route::RunContext;
