// Copyright 2018-2026 the Deno authors. MIT license.

//! Layered module-name resolver: haste map → node-style resolution → haste
//! package + relative subpath. See `SPEC_FULL.md` §4.1.

pub mod config;
pub mod error;
pub mod haste;
mod node;

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::path::PathBuf;

pub use config::ResolverConfig;
pub use config::ResolverConfigSpec;
pub use error::ResolverError;
pub use haste::HasteEntry;
pub use haste::HasteEntryKind;
pub use haste::HasteIndex;
pub use haste::Platform;
pub use haste::StaticHasteIndex;

/// Options accepted by [`Resolver::resolve_module`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
  pub skip_node_resolution: bool,
}

const CORE_MODULES: &[&str] = &[
  "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns",
  "domain", "events", "fs", "http", "https", "net", "os", "path", "punycode",
  "querystring", "readline", "stream", "string_decoder", "timers", "tls",
  "tty", "url", "util", "v8", "vm", "zlib", "constants", "module", "perf_hooks",
  "process", "repl", "worker_threads",
];

/// The resolver: stateless with respect to module evaluation, but owns two
/// memoization tables keyed on caller directory (see SPEC_FULL.md §4.1).
pub struct Resolver<H: HasteIndex> {
  config: ResolverConfig,
  haste: H,
  node_path: Vec<PathBuf>,
  name_cache: RefCell<HashMap<(PathBuf, String), PathBuf>>,
  module_paths_cache: RefCell<HashMap<PathBuf, Vec<PathBuf>>>,
}

impl<H: HasteIndex> Resolver<H> {
  pub fn new(config: ResolverConfig, haste: H) -> Self {
    let node_path = env::var_os("NODE_PATH")
      .map(|raw| env::split_paths(&raw).collect())
      .unwrap_or_default();
    Self {
      config,
      haste,
      node_path,
      name_cache: RefCell::new(HashMap::new()),
      module_paths_cache: RefCell::new(HashMap::new()),
    }
  }

  pub fn config(&self) -> &ResolverConfig {
    &self.config
  }

  pub fn haste(&self) -> &H {
    &self.haste
  }

  /// `resolveModule` — returns the first of: haste module, node resolution,
  /// haste package + subpath. Never returns `None`; a miss is `Err`.
  pub fn resolve_module(
    &self,
    from: &Path,
    name: &str,
    options: ResolveOptions,
  ) -> Result<PathBuf, ResolverError> {
    let from_dir = from.parent().unwrap_or(from);
    let cache_key = (from_dir.to_path_buf(), name.to_string());
    if let Some(hit) = self.name_cache.borrow().get(&cache_key) {
      log::trace!("resolver cache hit for {name} from {}", from_dir.display());
      return Ok(hit.clone());
    }

    if let Some(entry) = self.get_module(name, HasteEntryKind::Module) {
      self.name_cache.borrow_mut().insert(cache_key, entry.clone());
      return Ok(entry);
    }

    if !options.skip_node_resolution {
      let mut search_paths = self.node_path.clone();
      search_paths.extend(self.config.module_paths.iter().cloned());
      if let Some(found) = node::resolve(from_dir, name, &self.config, &search_paths)? {
        self.name_cache.borrow_mut().insert(cache_key, found.clone());
        return Ok(found);
      }
    }

    let (first_segment, rest) = haste::split_first_segment(name);
    if let Some(package_path) = self.get_package(first_segment) {
      let package_dir = package_path.parent().unwrap_or(&package_path);
      if let Some(rest) = rest {
        let mut search_paths = self.node_path.clone();
        search_paths.extend(self.config.module_paths.iter().cloned());
        if let Ok(Some(found)) =
          node::resolve(package_dir, rest, &self.config, &search_paths)
        {
          self.name_cache.borrow_mut().insert(cache_key, found.clone());
          return Ok(found);
        }
      } else {
        self.name_cache.borrow_mut().insert(cache_key, package_path.clone());
        return Ok(package_path);
      }
    }

    log::trace!("resolver miss for {name} from {}", from_dir.display());
    Err(ResolverError::ModuleNotFound {
      name: name.to_string(),
      from: from.to_path_buf(),
    })
  }

  /// `isCoreModule`.
  pub fn is_core_module(&self, name: &str) -> bool {
    self.config.has_core_modules && CORE_MODULES.contains(&name)
  }

  /// `getModule(name, type = MODULE)`.
  pub fn get_module(&self, name: &str, kind: HasteEntryKind) -> Option<PathBuf> {
    let entry = haste::lookup_with_platform_preference(
      &self.haste,
      name,
      self.config.default_platform.as_deref(),
      self.config.supports_native_platform(),
    )?;
    (entry.kind == kind).then_some(entry.path)
  }

  /// `getPackage(name)`.
  pub fn get_package(&self, name: &str) -> Option<PathBuf> {
    self.get_module(name, HasteEntryKind::Package)
  }

  /// `getMockModule(from, name)` — haste mock table first, then the
  /// name-mapper, first matching pattern wins.
  pub fn get_mock_module(&self, from: &Path, name: &str) -> Option<PathBuf> {
    if let Some(path) = self.haste.mock(name) {
      return Some(path);
    }
    let from_dir = from.parent().unwrap_or(from);
    for (replacement, pattern) in &self.config.module_name_mapper {
      if pattern.is_match(name) {
        let mapped = pattern.replace(name, replacement.as_str()).into_owned();
        if let Some(path) = self.get_module(&mapped, HasteEntryKind::Module) {
          return Some(path);
        }
        if let Ok(Some(path)) =
          node::resolve(from_dir, &mapped, &self.config, &self.config.module_paths)
        {
          return Some(path);
        }
      }
    }
    None
  }

  /// `getModulePaths(from)`, memoized per caller directory.
  pub fn get_module_paths(&self, from: &Path) -> Vec<PathBuf> {
    if let Some(hit) = self.module_paths_cache.borrow().get(from) {
      return hit.clone();
    }
    let paths = node::module_paths(from, &self.config);
    self
      .module_paths_cache
      .borrow_mut()
      .insert(from.to_path_buf(), paths.clone());
    paths
  }
}
