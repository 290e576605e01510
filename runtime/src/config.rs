// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::RuntimeError;

/// Raw, serializable form of [`RuntimeConfig`]. Mirrors the distilled spec's
/// mentions of `automock` and `unmockedModulePathPatterns` in the mock-
/// decision cascade; compiled via [`RuntimeConfigSpec::compile`] the same way
/// `module_resolver::ResolverConfigSpec` compiles its name-mapper patterns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigSpec {
  #[serde(default)]
  pub automock: bool,
  #[serde(default)]
  pub unmocked_module_path_patterns: Vec<String>,
  /// Environment-provided data returned (frozen, shallow-copied) by
  /// `jest.getTestEnvData()`.
  #[serde(default)]
  pub test_env_data: serde_json::Map<String, serde_json::Value>,
}

impl RuntimeConfigSpec {
  /// Joins every pattern with `|` and compiles the result once, so
  /// `should_mock` never re-parses a regex per call.
  pub fn compile(self) -> Result<RuntimeConfig, RuntimeError> {
    let unmock_pattern = if self.unmocked_module_path_patterns.is_empty() {
      None
    } else {
      let joined = self.unmocked_module_path_patterns.join("|");
      let pattern = Regex::new(&joined).map_err(|source| RuntimeError::InvalidUnmockPattern {
        pattern: joined,
        source,
      })?;
      Some(pattern)
    };

    Ok(RuntimeConfig {
      automock: self.automock,
      unmock_pattern,
      test_env_data: self.test_env_data,
    })
  }
}

/// Runtime-level configuration with `unmockedModulePathPatterns` pre-compiled
/// into a single alternation regex, separate from
/// [`module_resolver::ResolverConfig`] (which only the resolver needs).
/// Construct via `RuntimeConfigSpec::compile` rather than building this
/// directly, so an invalid pattern surfaces as a `RuntimeError` instead of
/// being silently dropped.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
  pub automock: bool,
  pub unmock_pattern: Option<Regex>,
  pub test_env_data: serde_json::Map<String, serde_json::Value>,
}

impl RuntimeConfig {
  pub fn matches_unmock_pattern(&self, path: &Path) -> bool {
    self
      .unmock_pattern
      .as_ref()
      .map(|re| re.is_match(&path.to_string_lossy()))
      .unwrap_or(false)
  }
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    RuntimeConfigSpec::default().compile().unwrap()
  }
}
