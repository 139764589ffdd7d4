//! Build environment oracle.
//!
//! Exposes the ordered list of Go source roots and the vendor-directory
//! resolution used to place generated packages. The root list is an injected
//! capability so callers (and tests) can substitute a fixed layout instead of
//! reading the ambient `GOROOT`/`GOPATH`.

use anyhow::{bail, Result};
use same_file::is_same_file;
use std::env;
use std::path::{Path, PathBuf};

/// Supplies the ordered list of source root directories against which import
/// paths are resolved.
pub trait BuildEnv {
    fn source_roots(&self) -> Vec<PathBuf>;
}

/// Reads the ambient Go build environment.
///
/// Roots are `$GOROOT/src` followed by `<entry>/src` for each `$GOPATH`
/// entry. An unset `GOPATH` defaults to `$HOME/go`, matching the toolchain.
pub struct HostEnv;

impl BuildEnv for HostEnv {
    fn source_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Ok(goroot) = env::var("GOROOT") {
            if !goroot.is_empty() {
                roots.push(PathBuf::from(goroot).join("src"));
            }
        }
        for entry in gopath_entries() {
            roots.push(entry.join("src"));
        }
        roots
    }
}

fn gopath_entries() -> Vec<PathBuf> {
    if let Ok(gopath) = env::var("GOPATH") {
        if !gopath.is_empty() {
            return env::split_paths(&gopath).collect();
        }
    }
    match env::var("HOME") {
        Ok(home) => vec![PathBuf::from(home).join("go")],
        Err(_) => Vec::new(),
    }
}

/// A fixed root list, for tests and embedding.
pub struct StaticEnv(pub Vec<PathBuf>);

impl BuildEnv for StaticEnv {
    fn source_roots(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// Returns the source root that is an ancestor of `dir`.
///
/// Tries a plain prefix match first. Roots reached through symlinks won't
/// prefix-match, so the fallback compares each ancestor of `dir` against each
/// root by filesystem identity and returns the ancestor as spelled in `dir`,
/// keeping it comparable with paths derived from `dir`.
pub fn src_root_of(roots: &[PathBuf], dir: &Path) -> Result<PathBuf> {
    for root in roots {
        if dir.starts_with(root) {
            return Ok(root.clone());
        }
    }
    for ancestor in dir.ancestors() {
        for root in roots {
            if is_same_file(ancestor, root).unwrap_or(false) {
                return Ok(ancestor.to_path_buf());
            }
        }
    }
    bail!("{}: not inside any known source root", dir.display());
}

/// Computes the vendor directory for a consumer in `dir`.
///
/// Walks upward from `dir` to (exclusive) `src_root` and returns the first
/// existing `vendor` subdirectory, so the vendor closest to the consumer
/// wins. If none exists the consumer's own `dir/vendor` is used.
pub fn vendor_for(dir: &Path, src_root: &Path) -> PathBuf {
    let mut d = dir;
    while d != src_root {
        let vendor = d.join("vendor");
        if vendor.is_dir() {
            return vendor;
        }
        match d.parent() {
            Some(parent) => d = parent,
            None => break,
        }
    }
    dir.join("vendor")
}
