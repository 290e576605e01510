// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;

use crate::error::ResolverError;

/// Raw, serializable form of [`ResolverConfig`]. `moduleNameMapper` is kept as
/// an ordered list of `(replacement, pattern)` pairs on the wire (matching
/// the distilled spec's "insertion order significant" rule) and compiled to
/// `Regex` when turned into a `ResolverConfig` via [`ResolverConfig::compile`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfigSpec {
  #[serde(default)]
  pub browser: bool,
  #[serde(default)]
  pub default_platform: Option<String>,
  #[serde(default)]
  pub extensions: Vec<String>,
  #[serde(default = "default_true")]
  pub has_core_modules: bool,
  #[serde(default = "default_module_directories")]
  pub module_directories: Vec<String>,
  #[serde(default)]
  pub module_name_mapper: Vec<(String, String)>,
  #[serde(default)]
  pub module_paths: Vec<PathBuf>,
  #[serde(default)]
  pub platforms: Vec<String>,
}

fn default_true() -> bool {
  true
}

fn default_module_directories() -> Vec<String> {
  vec!["node_modules".to_string()]
}

/// Resolver configuration with the name-mapper patterns pre-compiled.
/// Construct via `ResolverConfigSpec::compile` (deserialize the spec, then
/// compile) rather than building this directly, so invalid regexes surface
/// as a `ResolverError` instead of a panic.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
  pub browser: bool,
  pub default_platform: Option<String>,
  pub extensions: Vec<String>,
  pub has_core_modules: bool,
  pub module_directories: Vec<String>,
  /// `(replacement template, compiled pattern)`, insertion order significant.
  pub module_name_mapper: Vec<(String, Regex)>,
  pub module_paths: Vec<PathBuf>,
  pub platforms: Vec<String>,
}

impl ResolverConfigSpec {
  pub fn compile(self) -> Result<ResolverConfig, ResolverError> {
    let module_name_mapper = self
      .module_name_mapper
      .into_iter()
      .map(|(replacement, pattern)| {
        Regex::new(&pattern)
          .map(|re| (replacement, re))
          .map_err(|source| ResolverError::InvalidNameMapperPattern {
            pattern,
            source,
          })
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolverConfig {
      browser: self.browser,
      default_platform: self.default_platform,
      extensions: self.extensions,
      has_core_modules: self.has_core_modules,
      module_directories: self.module_directories,
      module_name_mapper,
      module_paths: self.module_paths,
      platforms: self.platforms,
    })
  }
}

impl ResolverConfig {
  /// `true` when `"native"` is among the configured platforms, i.e. the
  /// haste `native` bucket should be preferred over `generic`.
  pub fn supports_native_platform(&self) -> bool {
    self.platforms.iter().any(|p| p == "native")
  }
}

impl Default for ResolverConfig {
  fn default() -> Self {
    ResolverConfigSpec::default().compile().unwrap()
  }
}
