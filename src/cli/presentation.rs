//! CLI presentation: formatters for contexts, tree snapshots and links.

use crate::context::{Context, Session};
use crate::error::ExplorerError;
use crate::status;
use crate::tree::{Collapsible, RenderedNode};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Serialize)]
struct ContextRow<'a> {
    name: &'a str,
    config_file: String,
    active: bool,
}

fn context_rows<'a>(contexts: &'a [Context], session: &Session) -> Vec<ContextRow<'a>> {
    contexts
        .iter()
        .map(|c| ContextRow {
            name: c.name(),
            config_file: c.config_file().display().to_string(),
            active: session.is_active(c),
        })
        .collect()
}

pub fn format_contexts_text(contexts: &[Context], session: &Session) -> String {
    if contexts.is_empty() {
        return "No contexts found.".to_string();
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "Context", "cdsrc"]);
    for row in context_rows(contexts, session) {
        let marker = if row.active { "*" } else { "" };
        table.add_row(vec![marker.to_string(), row.name.to_string(), row.config_file]);
    }
    table.to_string()
}

pub fn format_contexts_json(
    contexts: &[Context],
    session: &Session,
) -> Result<String, ExplorerError> {
    let out = serde_json::json!({ "contexts": context_rows(contexts, session) });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Indented text rendering; `color` paints status glyphs.
pub fn format_tree_text(roots: &[RenderedNode], color: bool) -> String {
    let mut lines = Vec::new();
    for root in roots {
        push_node(&mut lines, root, 0, color);
    }
    if lines.is_empty() {
        return "No contexts found.".to_string();
    }
    lines.join("\n")
}

fn push_node(lines: &mut Vec<String>, node: &RenderedNode, depth: usize, color: bool) {
    let indent = "  ".repeat(depth);
    let marker = match node.item.collapsible {
        Collapsible::Collapsed if node.children.is_empty() && node.error.is_none() => "▸ ",
        Collapsible::Collapsed => "▾ ",
        Collapsible::None => "  ",
    };
    let mut label = if color {
        paint_glyph(&node.item.label)
    } else {
        node.item.label.clone()
    };
    if node.item.active {
        label.push_str(" (active)");
    }
    lines.push(format!("{}{}{}", indent, marker, label));
    if let Some(error) = &node.error {
        let line = format!("! {}", error);
        let line = if color {
            line.red().to_string()
        } else {
            line
        };
        lines.push(format!("{}    {}", indent, line));
    }
    for child in &node.children {
        push_node(lines, child, depth + 1, color);
    }
}

fn paint_glyph(label: &str) -> String {
    let Some((head, rest)) = label.split_once(' ') else {
        return label.to_string();
    };
    let painted = match head {
        status::OK => head.green().to_string(),
        status::FAILED => head.red().to_string(),
        status::IN_PROGRESS => head.yellow().to_string(),
        _ => return label.to_string(),
    };
    format!("{} {}", painted, rest)
}

pub fn format_tree_json(roots: &[RenderedNode]) -> Result<String, ExplorerError> {
    Ok(serde_json::to_string_pretty(roots)?)
}

pub fn format_link(url: Option<String>) -> String {
    url.unwrap_or_else(|| "No link for this node.".to_string())
}
