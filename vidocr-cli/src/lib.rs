// vidocr-cli/src/lib.rs
//
// Library portion of the vidocr CLI application.
// Contains argument definitions, output path handling and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output_path;
pub mod region_prompt;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, parse_cli, parse_cli_from};
pub use commands::extract::{RunStatus, run_extract};
