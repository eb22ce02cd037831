//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ClientError, ExplorerError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ExplorerError) -> String {
    match e {
        ExplorerError::Client(ClientError::Spawn { binary, .. }) => format!(
            "{}\nIs cdsctl installed? Set [cdsctl] binary or pass --cdsctl {}",
            e,
            binary.display()
        ),
        _ => e.to_string(),
    }
}
