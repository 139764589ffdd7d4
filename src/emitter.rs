//! Specialized package emission.
//!
//! For one decoded stencil import, parses every non-test file of the stencil
//! directory, runs the rewrite, formats and tidies the result, and buffers
//! one output file per source file. Nothing touches disk until `persist`.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

use crate::decoder::Substitutions;
use crate::scanner;
use crate::syntax;
use crate::{rewriter, tidy};

/// A generated output file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Absolute destination path, `vendor/<import path>/<basename>`.
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Specializes the package in `stencil_dir` under `substitutions` and
/// appends one `GeneratedFile` per source file to `out`, each targeting
/// `target_dir/<basename>`.
///
/// The directory must hold exactly one package across its non-test files.
/// Files are processed in filename order so results are deterministic.
pub fn emit_package(
    stencil_dir: &Path,
    target_dir: &Path,
    substitutions: &Substitutions,
    out: &mut Vec<GeneratedFile>,
) -> Result<()> {
    let files = scanner::go_sources_in(stencil_dir)?;
    if files.is_empty() {
        bail!("{}: no Go source files", stencil_dir.display());
    }

    let mut packages = BTreeSet::new();
    let mut parsed = Vec::new();
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let tree = syntax::parse(&source)
            .with_context(|| format!("{}: errors parsing", file.display()))?;
        let package = package_name(tree.root_node(), &source)
            .with_context(|| format!("{}: missing package clause", file.display()))?
            .to_string();
        packages.insert(package);
        parsed.push((file, source, tree));
    }
    if packages.len() != 1 {
        bail!(
            "{}: expected 1 package, got {}",
            stencil_dir.display(),
            packages.len()
        );
    }

    for (file, source, tree) in &parsed {
        let basename = file.file_name().context("source file has no basename")?;
        let target = target_dir.join(basename);
        let rewritten = rewriter::rewrite_parsed(tree, source, substitutions);
        let formatted = tidy::format_source(&rewritten);
        let data = tidy::tidy_imports(&target, &formatted)
            .with_context(|| format!("{}: code generation failed", file.display()))?;
        out.push(GeneratedFile {
            path: target,
            data: data.into_bytes(),
        });
    }
    Ok(())
}

fn package_name<'a>(root: Node, source: &'a str) -> Option<&'a str> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|c| c.kind() == "package_clause")?;
    let mut inner = clause.walk();
    let ident = clause
        .named_children(&mut inner)
        .find(|c| c.kind() == "package_identifier")?;
    Some(syntax::text(ident, source))
}

/// Writes buffered files to disk: parent directories with mode `0755`,
/// files with mode `0644`.
pub fn persist(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let dir = file
            .path
            .parent()
            .with_context(|| format!("{}: no parent directory", file.path.display()))?;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let mut handle = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&file.path)
            .with_context(|| format!("failed to create {}", file.path.display()))?;
        handle
            .write_all(&file.data)
            .with_context(|| format!("failed to write {}", file.path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> Substitutions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn emits_one_file_per_source_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("b.go"),
            "package p\n\nfunc G(e Element) {}\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("a.go"),
            "package p\n\ntype Element interface{}\n",
        )
        .unwrap();
        fs::write(tmp.path().join("a_test.go"), "package p\n").unwrap();

        let mut out = Vec::new();
        let target = tmp.path().join("out");
        emit_package(tmp.path(), &target, &subs(&[("Element", "int")]), &mut out).unwrap();

        let names: Vec<_> = out
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
        assert_eq!(out[0].data, b"package p\n");
        assert_eq!(out[1].data, b"package p\n\nfunc G(e int) {}\n");
    }

    #[test]
    fn mixed_packages_fail() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.go"), "package a\n").unwrap();
        fs::write(tmp.path().join("b.go"), "package b\n").unwrap();

        let mut out = Vec::new();
        let err = emit_package(tmp.path(), &tmp.path().join("out"), &subs(&[]), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("expected 1 package, got 2"));
    }

    #[test]
    fn empty_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = emit_package(tmp.path(), &tmp.path().join("out"), &subs(&[]), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("no Go source files"));
    }

    #[test]
    fn stencil_parse_error_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.go"), "package p\n\nfunc (\n").unwrap();
        let mut out = Vec::new();
        let err = emit_package(tmp.path(), &tmp.path().join("out"), &subs(&[]), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("errors parsing"));
    }

    #[test]
    fn persist_creates_directories_and_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vendor/pkg/T/int/file.go");
        let files = vec![GeneratedFile {
            path: path.clone(),
            data: b"package pkg\n".to_vec(),
        }];
        persist(&files).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"package pkg\n");
        assert!(tmp.path().join("vendor/pkg/T/int").is_dir());
    }
}
