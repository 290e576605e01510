// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::PathBuf;

use module_resolver::ResolverError;

/// Errors raised while requiring or executing a module. See SPEC_FULL.md §7
/// for the taxonomy this enum implements.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  #[error(transparent)]
  Resolve(#[from] ResolverError),

  #[error("failed reading '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON module '{}': {source}", path.display())]
  InvalidJsonModule {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("native addon modules are not supported by this runtime: '{}'", path.display())]
  NativeAddonUnsupported { path: PathBuf },

  #[error("{message}")]
  Transform { message: String },

  #[error("automock introspection returned no metadata for '{}'", path.display())]
  AutomockIntrospectionFailed { path: PathBuf },

  #[error("invalid unmock pattern '{pattern}': {source}")]
  InvalidUnmockPattern {
    pattern: String,
    #[source]
    source: regex::Error,
  },

  #[error("module execution failed for '{}': {message}", path.display())]
  Execution { path: PathBuf, message: String },
}

impl RuntimeError {
  /// Node-style error code, as with `ResolverError::code`.
  pub fn code(&self) -> &'static str {
    match self {
      RuntimeError::Resolve(err) => err.code(),
      RuntimeError::Io { .. } => "IO_ERROR",
      RuntimeError::InvalidJsonModule { .. } => "INVALID_JSON_MODULE",
      RuntimeError::NativeAddonUnsupported { .. } => "NATIVE_ADDON_UNSUPPORTED",
      RuntimeError::Transform { .. } => "TRANSFORM_ERROR",
      RuntimeError::AutomockIntrospectionFailed { .. } => "AUTOMOCK_INTROSPECTION_FAILED",
      RuntimeError::InvalidUnmockPattern { .. } => "INVALID_UNMOCK_PATTERN",
      RuntimeError::Execution { .. } => "EXECUTION_ERROR",
    }
  }
}
