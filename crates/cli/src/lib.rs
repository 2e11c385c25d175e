//! `clipgen` library crate.
//!
//! Re-exports the argument surface, configuration and dispatch for
//! integration testing. The binary entrypoint lives in `main.rs`.

pub mod cli;
pub mod commands;
pub mod config;

use clipgen_core::output::CommandOutput;

/// Render a result document for standard output.
pub fn render(output: &CommandOutput) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|e| {
        format!(r#"{{"status":"error","code":"SERIALIZATION_FAILED","message":"{e}"}}"#)
    })
}
