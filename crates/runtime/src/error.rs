//! Tool dispatch errors.

use thiserror::Error;

/// Why a tool invocation produced no useful output.
///
/// None of these abort a turn: dispatch folds the error text into the
/// tool-result message so the model can read it and adapt.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The model requested a capability absent from the registry.
    #[error("tool '{name}' is not available")]
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// The argument payload did not match the tool's schema.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArgs {
        /// The tool name.
        name: String,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// The capability itself failed (network error, upstream 5xx, ...).
    #[error("tool '{name}' failed: {reason}")]
    Failed {
        /// The tool name.
        name: String,
        /// The failure description.
        reason: String,
    },
}
