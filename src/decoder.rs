//! Import path decoding.
//!
//! A stencil import encodes substitutions as trailing `/Param/Spec` segment
//! pairs, e.g. `collections/set/Element/string`. Decoding peels pairs off the
//! end until the remaining prefix names a package directory under one of the
//! search roots. An import that resolves without peeling anything is an
//! ordinary package and is not a stencil.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mapping from parameter name to the concrete type replacing it. The
/// reserved key `interface` addresses anonymous interface type literals
/// rather than a named identifier.
pub type Substitutions = BTreeMap<String, String>;

/// A decoded stencil import: the package directory to specialize and the
/// substitutions to apply to it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub dir: PathBuf,
    pub substitutions: Substitutions,
}

/// Decodes `import_path` against `roots`.
///
/// Returns `Ok(None)` when the path is not a stencil import: either it
/// already names an existing package, or no prefix of it does. Two segments
/// are the minimum meaningful prefix, so peeling stops there. Mentioning the
/// same parameter twice is a fatal error.
pub fn decode(roots: &[PathBuf], import_path: &str) -> Result<Option<Decoded>> {
    let mut parts: Vec<&str> = import_path.split('/').collect();
    let mut substitutions = Substitutions::new();
    loop {
        if let Some(dir) = package_dir(roots, &parts.join("/")) {
            if substitutions.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Decoded { dir, substitutions }));
        }
        if parts.len() <= 2 {
            return Ok(None);
        }
        let (Some(spec), Some(param)) = (parts.pop(), parts.pop()) else {
            return Ok(None);
        };
        if substitutions
            .insert(param.to_string(), spec.to_string())
            .is_some()
        {
            bail!("{}: parameter {} specialized twice", import_path, param);
        }
    }
}

// Rough heuristic for package existence: the joined path is a directory
// under some root.
fn package_dir(roots: &[PathBuf], pkg: &str) -> Option<PathBuf> {
    roots.iter().map(|r| r.join(pkg)).find(|d| d.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_with(dirs: &[&str]) -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        tmp
    }

    fn roots(tmp: &TempDir) -> Vec<PathBuf> {
        vec![tmp.path().to_path_buf()]
    }

    #[test]
    fn decodes_single_pair() {
        let tmp = root_with(&["collections/set"]);
        let decoded = decode(&roots(&tmp), "collections/set/Element/string")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.dir, tmp.path().join("collections/set"));
        assert_eq!(decoded.substitutions.len(), 1);
        assert_eq!(decoded.substitutions["Element"], "string");
    }

    #[test]
    fn decodes_multiple_pairs() {
        let tmp = root_with(&["pkg/pairs"]);
        let decoded = decode(&roots(&tmp), "pkg/pairs/K/string/V/int")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.dir, tmp.path().join("pkg/pairs"));
        assert_eq!(decoded.substitutions["K"], "string");
        assert_eq!(decoded.substitutions["V"], "int");
    }

    #[test]
    fn existing_package_is_not_a_stencil() {
        let tmp = root_with(&["collections/set"]);
        assert!(decode(&roots(&tmp), "collections/set").unwrap().is_none());
    }

    #[test]
    fn unknown_prefix_is_not_a_stencil() {
        let tmp = root_with(&[]);
        assert!(decode(&roots(&tmp), "nope/thing/Element/string")
            .unwrap()
            .is_none());
    }

    #[test]
    fn two_segments_are_never_peeled() {
        let tmp = root_with(&[]);
        assert!(decode(&roots(&tmp), "Element/string").unwrap().is_none());
    }

    #[test]
    fn duplicate_parameter_fails() {
        let tmp = root_with(&["pkg/pairs"]);
        let err = decode(&roots(&tmp), "pkg/pairs/T/int/T/string").unwrap_err();
        assert!(err.to_string().contains("specialized twice"));
        assert!(err.to_string().contains("T"));
    }

    #[test]
    fn later_roots_are_searched() {
        let empty = root_with(&[]);
        let tmp = root_with(&["basic"]);
        let search = vec![empty.path().to_path_buf(), tmp.path().to_path_buf()];
        let decoded = decode(&search, "basic/int/float32").unwrap().unwrap();
        assert_eq!(decoded.dir, tmp.path().join("basic"));
    }
}
