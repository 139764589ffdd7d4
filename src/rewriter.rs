//! Source rewriting for specialization.
//!
//! Walks a parsed Go file in pre-order collecting byte-span replacements,
//! then applies them in reverse offset order. Three rules fire by node kind:
//! a type declaration whose first specification names a parameter is deleted
//! outright, identifiers naming a parameter are renamed, and anonymous
//! interface type literals are swapped for the reserved `interface`
//! substitution. Matched nodes are not descended into, so spans never
//! overlap and offsets stay valid.

use anyhow::Result;
use tree_sitter::{Node, Tree};

use crate::decoder::Substitutions;
use crate::syntax;

/// A single text replacement with position information.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Parses `source` and rewrites it under `substitutions`.
pub fn rewrite(source: &str, substitutions: &Substitutions) -> Result<String> {
    let tree = syntax::parse(source)?;
    Ok(rewrite_parsed(&tree, source, substitutions))
}

/// Rewrites an already-parsed file.
pub fn rewrite_parsed(tree: &Tree, source: &str, substitutions: &Substitutions) -> String {
    let mut replacements = Vec::new();
    collect(tree.root_node(), source, substitutions, &mut replacements);
    apply_replacements(source, replacements)
}

fn collect(node: Node, source: &str, subs: &Substitutions, out: &mut Vec<Replacement>) {
    match node.kind() {
        "type_declaration" => {
            // The heuristic inspects only the first specification; a group
            // lives or dies with it.
            if first_spec_name(node, source).is_some_and(|name| subs.contains_key(name)) {
                out.push(Replacement {
                    start: node.start_byte(),
                    end: span_with_newline(node, source),
                    new_text: String::new(),
                });
                return;
            }
        }
        "identifier" | "type_identifier" | "field_identifier" | "package_identifier" => {
            if let Some(to) = subs.get(syntax::text(node, source)) {
                out.push(Replacement {
                    start: node.start_byte(),
                    end: node.end_byte(),
                    new_text: to.clone(),
                });
            }
            return;
        }
        "interface_type" => {
            // Only anonymous interface literals participate; the right-hand
            // side of a type declaration stays untouched.
            if let Some(to) = subs.get("interface") {
                if !is_type_declaration_rhs(node) {
                    out.push(Replacement {
                        start: node.start_byte(),
                        end: node.end_byte(),
                        new_text: to.clone(),
                    });
                    return;
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect(child, source, subs, out);
    }
}

/// Name of the first type specification in a declaration, grouped or not.
fn first_spec_name<'a>(decl: Node, source: &'a str) -> Option<&'a str> {
    let mut cursor = decl.walk();
    let spec = decl
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "type_spec" | "type_alias"))?;
    let name = spec.child_by_field_name("name")?;
    Some(syntax::text(name, source))
}

fn is_type_declaration_rhs(node: Node) -> bool {
    node.parent()
        .is_some_and(|p| matches!(p.kind(), "type_spec" | "type_alias"))
}

// Deleting a whole declaration swallows its trailing newline so no empty
// line is left behind.
fn span_with_newline(node: Node, source: &str) -> usize {
    let end = node.end_byte();
    if source.as_bytes().get(end) == Some(&b'\n') {
        end + 1
    } else {
        end
    }
}

/// Applies replacements to source content, returning the modified string.
///
/// Sorts replacements by start offset (descending) and applies each in turn.
/// This ensures earlier replacements don't invalidate later offsets.
pub fn apply_replacements(content: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        if rep.start <= result.len() && rep.end <= result.len() && rep.start <= rep.end {
            result.replace_range(rep.start..rep.end, &rep.new_text);
        }
    }

    result
}
