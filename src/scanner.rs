//! Go file scanner.
//!
//! Groups caller-supplied paths into `{directory -> [source files]}` and
//! extracts the import paths of each consumer file from its syntax tree.
//! Directory arguments are enumerated without recursion; `_test.go` files
//! never participate.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

use crate::syntax;

/// An import found in a consumer file.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRef {
    /// Unquoted import path, e.g. `"collections/set/Element/string"`.
    pub path: String,
    /// Source file containing the import.
    pub file: PathBuf,
    /// Line number, 1-indexed.
    pub line: usize,
    /// Column number, 1-indexed.
    pub column: usize,
}

/// Groups `paths` into a map from directory to the Go files to scan there.
///
/// An empty input defaults to the current working directory. Arguments
/// ending in `.go` are grouped under their parent directory; any other
/// argument is treated as a directory whose immediate non-test Go files are
/// listed. The map is ordered so iteration is deterministic.
pub fn list_packages(paths: &[PathBuf]) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
    let defaulted;
    let paths = if paths.is_empty() {
        defaulted = vec![PathBuf::from(".")];
        &defaulted
    } else {
        paths
    };

    let mut dirs: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for arg in paths {
        let abs = std::path::absolute(arg)
            .with_context(|| format!("failed to resolve {}", arg.display()))?;
        if abs.extension().is_some_and(|ext| ext == "go") {
            let dir = abs
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            dirs.entry(dir).or_default().push(abs);
            continue;
        }
        let files = go_sources_in(&abs)?;
        dirs.insert(abs, files);
    }
    Ok(dirs)
}

/// Lists the non-test Go files directly inside `dir`, sorted by filename.
pub fn go_sources_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.ends_with(".go") && !name.ends_with("_test.go") {
            files.push(dir.join(name));
        }
    }
    files.sort();
    Ok(files)
}

/// Parses a consumer file and returns its import records in source order.
///
/// Syntax errors are fatal for the file.
pub fn extract_imports(file: &Path) -> Result<Vec<ImportRef>> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let tree =
        syntax::parse(&source).with_context(|| format!("{}: parse failed", file.display()))?;

    let mut refs = Vec::new();
    collect_import_specs(tree.root_node(), &source, file, &mut refs);
    Ok(refs)
}

fn collect_import_specs(node: Node, source: &str, file: &Path, refs: &mut Vec<ImportRef>) {
    if node.kind() == "import_spec" {
        if let Some(path_node) = node.child_by_field_name("path") {
            let pos = path_node.start_position();
            refs.push(ImportRef {
                path: syntax::unquote(syntax::text(path_node, source)).to_string(),
                file: file.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_import_specs(child, source, file, refs);
    }
}

/// Extracts import paths from Go source code.
///
/// Unlike `extract_imports`, this operates on strings directly for testing.
#[cfg(test)]
pub fn extract_paths_from_source(source: &str) -> Vec<String> {
    let tree = syntax::parse(source).unwrap();
    let mut refs = Vec::new();
    collect_import_specs(tree.root_node(), source, Path::new("test.go"), &mut refs);
    refs.into_iter().map(|r| r.path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_import() {
        let source = "package use\n\nimport \"collections/set/Element/string\"\n";
        assert_eq!(
            extract_paths_from_source(source),
            vec!["collections/set/Element/string"]
        );
    }

    #[test]
    fn extracts_grouped_imports_in_order() {
        let source = r#"package use

import (
	"bytes"
	"fmt"
	int_set "ifaces/interface/int"
)
"#;
        assert_eq!(
            extract_paths_from_source(source),
            vec!["bytes", "fmt", "ifaces/interface/int"]
        );
    }

    #[test]
    fn extracts_blank_and_dot_imports() {
        let source = "package use\n\nimport (\n\t_ \"bytes\"\n\t. \"fmt\"\n)\n";
        assert_eq!(extract_paths_from_source(source), vec!["bytes", "fmt"]);
    }

    #[test]
    fn extracts_raw_string_path() {
        let source = "package use\n\nimport `basic/int/float32`\n";
        assert_eq!(extract_paths_from_source(source), vec!["basic/int/float32"]);
    }

    #[test]
    fn no_imports_yields_empty() {
        assert!(extract_paths_from_source("package use\n\nfunc F() {}\n").is_empty());
    }

    #[test]
    fn records_import_position() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("use.go");
        fs::write(&file, "package use\n\nimport \"fmt\"\n").unwrap();
        let refs = extract_imports(&file).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].line, 3);
        assert_eq!(refs[0].column, 8);
    }

    #[test]
    fn parse_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.go");
        fs::write(&file, "package use\n\nimport (\n").unwrap();
        let err = extract_imports(&file).unwrap_err();
        assert!(err.to_string().contains("parse failed"));
    }

    #[test]
    fn lists_directory_sources_sorted_without_tests() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.go", "a.go", "a_test.go", "notes.txt"] {
            fs::write(dir.path().join(name), "package p\n").unwrap();
        }
        let files = go_sources_in(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
    }

    #[test]
    fn groups_file_arguments_under_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("use.go");
        fs::write(&file, "package use\n").unwrap();
        let dirs = list_packages(&[file.clone()]).unwrap();
        let abs_dir = std::path::absolute(dir.path()).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[&abs_dir], vec![std::path::absolute(&file).unwrap()]);
    }

    #[test]
    fn directory_argument_enumerates_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.go"), "package p\n").unwrap();
        fs::write(dir.path().join("a_test.go"), "package p\n").unwrap();
        let dirs = list_packages(&[dir.path().to_path_buf()]).unwrap();
        let abs_dir = std::path::absolute(dir.path()).unwrap();
        assert_eq!(dirs[&abs_dir].len(), 1);
    }
}
