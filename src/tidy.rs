//! Formatting and import tidying.
//!
//! Rewrites are span edits into already-gofmt'd source, so the only scars to
//! clean are blank lines left by deleted declarations. The imports pass is a
//! syntactic subset of goimports: it drops imports whose package name is no
//! longer referenced and never adds any, since substituted types are bare
//! identifiers.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

use crate::rewriter::{apply_replacements, Replacement};
use crate::syntax;

/// Normalizes the buffer: collapses runs of blank lines to one, strips
/// leading blank lines and trailing whitespace, and ends the file with
/// exactly one newline.
pub fn format_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending_blank = false;
    for line in source.lines() {
        if line.trim().is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Removes imports that are no longer referenced and reformats the buffer.
///
/// `path` names the intended destination of the buffer and is used for
/// diagnostics. Blank (`_`) and dot (`.`) imports are always kept. A package
/// is considered referenced when its bound name appears as a qualifier
/// anywhere in the file; the bound name is the explicit alias or the last
/// path segment.
pub fn tidy_imports(path: &Path, source: &str) -> Result<String> {
    let tree = syntax::parse(source)
        .with_context(|| format!("{}: imports tidy failed", path.display()))?;
    let root = tree.root_node();

    let mut used = HashSet::new();
    collect_used_names(root, source, &mut used);

    let mut removals = Vec::new();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "import_declaration" {
            continue;
        }
        let specs = import_specs(decl);
        let dead: Vec<Node> = specs
            .iter()
            .copied()
            .filter(|spec| is_unreferenced(*spec, source, &used))
            .collect();
        if !specs.is_empty() && dead.len() == specs.len() {
            // Nothing left to import; drop the whole declaration.
            removals.push(line_span(source, decl.start_byte(), decl.end_byte()));
        } else {
            for spec in dead {
                removals.push(line_span(source, spec.start_byte(), spec.end_byte()));
            }
        }
    }

    let replacements = removals
        .into_iter()
        .map(|(start, end)| Replacement {
            start,
            end,
            new_text: String::new(),
        })
        .collect();
    Ok(format_source(&apply_replacements(source, replacements)))
}

/// Runs the tidy pass in place over each input path that is a file.
/// Directory arguments are left alone.
pub fn tidy_paths(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let meta =
            fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
        if meta.is_dir() {
            continue;
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let tidied = tidy_imports(path, &source)?;
        fs::write(path, tidied)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn import_specs(decl: Node) -> Vec<Node> {
    let mut specs = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => specs.push(child),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        specs.push(spec);
                    }
                }
            }
            _ => {}
        }
    }
    specs
}

fn is_unreferenced(spec: Node, source: &str, used: &HashSet<&str>) -> bool {
    match binding_names(spec, source) {
        Some(names) => !names.iter().any(|n| used.contains(n)),
        None => false,
    }
}

/// Candidate names an import binds, or `None` when the import must be kept
/// regardless (blank and dot imports, which bind nothing analyzable).
fn binding_names<'a>(spec: Node, source: &'a str) -> Option<Vec<&'a str>> {
    if let Some(name) = spec.child_by_field_name("name") {
        return match name.kind() {
            "blank_identifier" | "dot" => None,
            _ => Some(vec![syntax::text(name, source)]),
        };
    }
    let path_node = spec.child_by_field_name("path")?;
    let path = syntax::unquote(syntax::text(path_node, source));
    let segment = path.rsplit('/').next().unwrap_or(path);
    let mut names = vec![segment];
    // Suffixed paths like gopkg.in/yaml.v2 bind the unsuffixed name.
    if let Some(stem) = segment.split('.').next() {
        if stem != segment {
            names.push(stem);
        }
    }
    Some(names)
}

fn collect_used_names<'a>(node: Node, source: &'a str, used: &mut HashSet<&'a str>) {
    match node.kind() {
        // Import paths and aliases themselves don't count as references.
        "import_declaration" => return,
        "qualified_type" => {
            if let Some(package) = node.child_by_field_name("package") {
                used.insert(syntax::text(package, source));
            }
        }
        "selector_expression" => {
            if let Some(operand) = node.child_by_field_name("operand") {
                if operand.kind() == "identifier" {
                    used.insert(syntax::text(operand, source));
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_used_names(child, source, used);
    }
}

// Widens a span to whole lines when the spec sits alone on them, so removal
// takes the line's indentation and newline with it.
fn line_span(source: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[end..]
        .find('\n')
        .map(|i| end + i + 1)
        .unwrap_or(source.len());
    let before = &source[line_start..start];
    let after = source[end..line_end].trim_end_matches('\n');
    if before.trim().is_empty() && (after.trim().is_empty() || after.trim_start().starts_with("//"))
    {
        (line_start, line_end)
    } else {
        (start, end)
    }
}
