//! stencil library for generating specialized versions of Go packages.
//!
//! A stencil is a Go package written in terms of abstract placeholder types
//! such as `type Element interface{}`. Consumers import a path of the form
//! `<package>/<Param>/<Spec>` (e.g. `collections/set/Element/string`) and
//! this library synthesizes the package with every `Param` replaced by
//! `Spec`, placed under the consumer's nearest vendor directory so the
//! import resolves unchanged. The core workflow involves three phases:
//!
//! 1. **Scanning**: Group input paths by directory and extract each Go
//!    file's import paths
//! 2. **Decoding**: Peel `/Param/Spec` pairs off each import path until the
//!    prefix names a package directory under a source root
//! 3. **Emission**: Rewrite the stencil package's syntax trees with the
//!    substitutions applied and buffer the formatted output files
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use stencil::roots::HostEnv;
//! use stencil::{emitter, engine};
//!
//! // Buffer specialized packages for all stencil imports under ./cmd.
//! let files = engine::specialize(&[PathBuf::from("./cmd")], &HostEnv).unwrap();
//!
//! // Persisting is a separate step: parent dirs 0755, files 0644.
//! emitter::persist(&files).unwrap();
//!
//! for file in &files {
//!     println!("{}", file.path.display());
//! }
//! ```

pub mod decoder;
pub mod emitter;
pub mod engine;
pub mod rewriter;
pub mod roots;
pub mod scanner;
pub mod syntax;
pub mod tidy;

// Re-export commonly used types at crate root
pub use decoder::{Decoded, Substitutions};
pub use emitter::GeneratedFile;
pub use engine::{DetectionResult, Diagnostics, StencilMatch};
pub use scanner::ImportRef;
