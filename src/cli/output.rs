//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::AppError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &AppError) -> String {
    match e {
        AppError::Config(msg) => format!("Error: {}", msg),
        other => format!("Error: {}", other),
    }
}
