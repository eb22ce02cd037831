//! Status Mapping
//!
//! Translates the status strings reported by the CDS API into the single
//! display glyph shown in front of runs, nodes, stages, jobs and steps.

/// Glyph for statuses still in flight.
pub const IN_PROGRESS: &str = "↻";
/// Glyph for statuses that ended without failing.
pub const OK: &str = "✓";
/// Glyph for failed or interrupted statuses.
pub const FAILED: &str = "✗";

/// Look up the glyph for a status. Unknown statuses have no glyph.
pub fn status_glyph(status: &str) -> Option<&'static str> {
    match status {
        "Pending" | "Waiting" | "Building" => Some(IN_PROGRESS),
        "Success" | "Disabled" | "Never Built" | "Unknown" | "Skipped" => Some(OK),
        "Fail" | "Stopped" | "Stopping" => Some(FAILED),
        _ => None,
    }
}

/// Prefix `text` with the glyph for `status`, or return it unchanged.
pub fn decorate(status: &str, text: &str) -> String {
    match status_glyph(status) {
        Some(glyph) => format!("{} {}", glyph, text),
        None => text.to_string(),
    }
}

/// Like [`decorate`] for an optional status.
pub fn decorate_opt(status: Option<&str>, text: &str) -> String {
    match status {
        Some(status) => decorate(status, text),
        None => text.to_string(),
    }
}
