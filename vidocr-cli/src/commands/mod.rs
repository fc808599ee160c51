// vidocr-cli/src/commands/mod.rs
//
// Command handlers invoked by the binary.

pub mod extract;
