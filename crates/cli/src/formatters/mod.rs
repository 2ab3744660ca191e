//! Rendering of resolved entries for the terminal

pub mod tree;

pub use tree::{KeyTree, TreeChars};

/// Replacement shown for secret values unless revealed
pub const MASK: &str = "********";

/// An `export` line that a POSIX shell can `eval`
pub fn export_line(name: &str, value: &str) -> String {
    format!("export {name}={}", shell_words::quote(value))
}
