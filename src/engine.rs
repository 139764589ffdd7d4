//! Engine facade.
//!
//! Orchestrates the full pipeline: group input paths by directory, resolve
//! each directory's source root and vendor directory, decode every import of
//! every file, and emit a specialized package for each stencil import found.
//! Results accumulate in encounter order and the whole run is deterministic
//! for a given tree.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::decoder::{self, Substitutions};
use crate::emitter::{self, GeneratedFile};
use crate::roots::{self, BuildEnv};
use crate::scanner::{self, ImportRef};
use crate::tidy;

/// A stencil import found during detection.
#[derive(Debug, Clone, Serialize)]
pub struct StencilMatch {
    #[serde(flatten)]
    pub import: ImportRef,
    /// Directory of the stencil package that would be specialized.
    pub stencil_dir: PathBuf,
    pub substitutions: Substitutions,
}

/// Summary statistics from a run.
#[derive(Debug, Default, Serialize)]
pub struct Diagnostics {
    pub files_scanned: usize,
    pub imports_seen: usize,
    pub stencil_imports: usize,
}

/// Complete detection results.
#[derive(Debug, Serialize)]
pub struct DetectionResult {
    pub matches: Vec<StencilMatch>,
    pub diagnostics: Diagnostics,
}

/// Generates and persists specialized packages for every stencil import
/// reachable from `paths`. With `tidy_inputs` set, each input path that is a
/// file additionally has its imports tidied in place afterwards.
///
/// This is the end-to-end operation behind the CLI's `generate` command;
/// `specialize` is the buffering core for callers that handle persistence
/// themselves.
pub fn process(
    paths: &[PathBuf],
    tidy_inputs: bool,
    env: &dyn BuildEnv,
) -> Result<Vec<GeneratedFile>> {
    let files = specialize(paths, env)?;
    emitter::persist(&files)?;
    if tidy_inputs {
        tidy::tidy_paths(paths)?;
    }
    Ok(files)
}

/// Generates specialized packages for every stencil import reachable from
/// `paths`, returning the buffered output files without writing them.
pub fn specialize(paths: &[PathBuf], env: &dyn BuildEnv) -> Result<Vec<GeneratedFile>> {
    let dirs = scanner::list_packages(paths)?;
    let mut generated = Vec::new();
    for (dir, files) in &dirs {
        process_dir(env, dir, files, &mut generated)?;
    }
    Ok(generated)
}

fn process_dir(
    env: &dyn BuildEnv,
    dir: &Path,
    files: &[PathBuf],
    out: &mut Vec<GeneratedFile>,
) -> Result<()> {
    let (vendor, search) = roots_for(env, dir)?;
    for file in files {
        for import in scanner::extract_imports(file)? {
            let Some(decoded) = decoder::decode(&search, &import.path)? else {
                continue;
            };
            emitter::emit_package(
                &decoded.dir,
                &vendor.join(&import.path),
                &decoded.substitutions,
                out,
            )?;
        }
    }
    Ok(())
}

/// Decodes every import reachable from `paths` without emitting anything.
pub fn detect(paths: &[PathBuf], env: &dyn BuildEnv) -> Result<DetectionResult> {
    let dirs = scanner::list_packages(paths)?;
    let mut matches = Vec::new();
    let mut diagnostics = Diagnostics::default();
    for (dir, files) in &dirs {
        let (_, search) = roots_for(env, dir)?;
        for file in files {
            diagnostics.files_scanned += 1;
            for import in scanner::extract_imports(file)? {
                diagnostics.imports_seen += 1;
                let Some(decoded) = decoder::decode(&search, &import.path)? else {
                    continue;
                };
                diagnostics.stencil_imports += 1;
                matches.push(StencilMatch {
                    import,
                    stencil_dir: decoded.dir,
                    substitutions: decoded.substitutions,
                });
            }
        }
    }
    Ok(DetectionResult {
        matches,
        diagnostics,
    })
}

// The vendor directory joins the search roots so that packages already
// specialized under it resolve like any other.
fn roots_for(env: &dyn BuildEnv, dir: &Path) -> Result<(PathBuf, Vec<PathBuf>)> {
    let roots = env.source_roots();
    let src_root = roots::src_root_of(&roots, dir)?;
    let vendor = roots::vendor_for(dir, &src_root);
    let mut search = roots;
    search.push(vendor.clone());
    Ok((vendor, search))
}
