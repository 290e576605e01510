// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

/// Errors raised while resolving a module name to an absolute path.
///
/// `Display` renders the exact diagnostic text the embedding test framework
/// surfaces to the user; `code()` gives the stable string code callers
/// pattern-match on (mirroring Node's `err.code`).
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
  #[error("Cannot find module '{name}' from '{}'", display_from(.from))]
  ModuleNotFound { name: String, from: PathBuf },

  #[error("invalid package.json at '{}': {source}", path.display())]
  InvalidPackageJson {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid moduleNameMapper pattern '{pattern}': {source}")]
  InvalidNameMapperPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },

  #[error("failed reading '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl ResolverError {
  /// Node-style error code, stable across releases of this crate.
  pub fn code(&self) -> &'static str {
    match self {
      ResolverError::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
      ResolverError::InvalidPackageJson { .. } => "INVALID_PACKAGE_CONFIG",
      ResolverError::InvalidNameMapperPattern { .. } => "INVALID_NAME_MAPPER",
      ResolverError::Io { .. } => "IO_ERROR",
    }
  }
}

/// Renders the caller path the way the distilled spec's literal scenarios
/// pin it: the file name alone (`"x.js"`), or `"."` when there isn't one
/// (an empty path, as used for REPL-style callers with no backing file).
fn display_from(from: &Path) -> String {
  match from.file_name() {
    Some(name) => name.to_string_lossy().into_owned(),
    None => ".".to_string(),
  }
}
