//! Go parsing services.
//!
//! Wraps tree-sitter with the Go grammar. The tree is lossless, so comments
//! and string literals survive as distinct nodes and byte ranges map directly
//! back into the source buffer.

use anyhow::{anyhow, Result};
use tree_sitter::{Node, Parser, Tree};

/// Creates a parser configured for Go.
pub fn parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
    Ok(parser)
}

/// Parses Go source, failing if the tree contains any error nodes.
pub fn parse(source: &str) -> Result<Tree> {
    let tree = parser()?
        .parse(source, None)
        .ok_or_else(|| anyhow!("parser produced no tree"))?;
    if tree.root_node().has_error() {
        return Err(anyhow!("syntax errors in source"));
    }
    Ok(tree)
}

/// Source text covered by `node`.
pub fn text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Strips the quotes from an import path literal. Handles both interpreted
/// (`"fmt"`) and raw (`` `fmt` ``) string forms.
pub fn unquote(lit: &str) -> &str {
    lit.trim_matches(|c| c == '"' || c == '`')
}
