//! Key hierarchy rendered as a tree
//!
//! Keys are split on `/`. Leaves show the value and the variable name the
//! key maps to.

use appenv_core::constants::KEY_DELIMITER;
use std::collections::BTreeMap;

/// Tree drawing characters
pub struct TreeChars {
    pub vertical: &'static str,
    pub branch: &'static str,
    pub last_branch: &'static str,
}

impl TreeChars {
    pub fn unicode() -> Self {
        Self {
            vertical: "│ ",
            branch: "├─",
            last_branch: "└─",
        }
    }

    pub fn ascii() -> Self {
        Self {
            vertical: "| ",
            branch: "|-",
            last_branch: "`-",
        }
    }

    /// Unicode on a UTF-8 locale, ASCII otherwise
    pub fn detect() -> Self {
        let utf8 = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .is_some_and(|value| value.to_ascii_uppercase().contains("UTF"));
        if utf8 {
            Self::unicode()
        } else {
            Self::ascii()
        }
    }
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    leaves: Vec<String>,
}

/// Builder for the tree printed by `appenv list`
#[derive(Default)]
pub struct KeyTree {
    root: Node,
}

impl KeyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key with the text to show next to it
    pub fn insert(&mut self, key: &str, text: impl Into<String>) {
        let mut node = &mut self.root;
        for segment in key.split(KEY_DELIMITER) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.leaves.push(text.into());
    }

    pub fn render(&self, chars: &TreeChars) -> String {
        let mut output = String::new();
        render_children(&self.root, chars, "", &mut output);
        output
    }
}

fn render_children(node: &Node, chars: &TreeChars, prefix: &str, output: &mut String) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last {
            chars.last_branch
        } else {
            chars.branch
        };
        let continuation = if is_last { "  " } else { chars.vertical };

        output.push_str(prefix);
        output.push_str(connector);
        output.push(' ');
        output.push_str(name);
        if let Some((first, rest)) = child.leaves.split_first() {
            output.push_str(" = ");
            output.push_str(first);
            // Duplicate keys in one pass each get their own line
            for extra in rest {
                output.push('\n');
                output.push_str(prefix);
                output.push_str(continuation);
                output.push_str("= ");
                output.push_str(extra);
            }
        }
        output.push('\n');

        let child_prefix = format!("{prefix}{continuation}");
        render_children(child, chars, &child_prefix, output);
    }
}
