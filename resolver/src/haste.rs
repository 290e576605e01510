// Copyright 2018-2026 the Deno authors. MIT license.

use std::collections::HashMap;
use std::path::PathBuf;

/// Kind of a haste entry, mirroring the distilled spec's `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasteEntryKind {
  Module,
  Package,
}

#[derive(Debug, Clone)]
pub struct HasteEntry {
  pub kind: HasteEntryKind,
  pub path: PathBuf,
}

/// Platform bucket a haste entry was declared under. `Generic` is the
/// fallback every name must have; `DefaultPlatform` and `Native` are
/// looked up first, in that order, per the distilled spec's preference
/// rule (`defaultPlatform → native (if supported) → generic`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
  Generic,
  Native,
  Named(String),
}

/// The haste index: out of scope to build (it's produced by a file-system
/// crawler this crate never runs), but every resolver needs *something*
/// behind this trait to look names up against.
pub trait HasteIndex {
  /// `hasteMap[name][platform]`.
  fn module(&self, name: &str, platform: &Platform) -> Option<HasteEntry>;
  /// `mocks[name]`.
  fn mock(&self, name: &str) -> Option<PathBuf>;
}

/// In-memory haste index, good enough to embed directly or to use in tests;
/// a real embedder plugs in whatever reads its project's haste crawl output.
#[derive(Debug, Clone, Default)]
pub struct StaticHasteIndex {
  modules: HashMap<String, HashMap<Platform, HasteEntry>>,
  mocks: HashMap<String, PathBuf>,
}

impl StaticHasteIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_module(
    &mut self,
    name: impl Into<String>,
    platform: Platform,
    entry: HasteEntry,
  ) -> &mut Self {
    self
      .modules
      .entry(name.into())
      .or_default()
      .insert(platform, entry);
    self
  }

  pub fn insert_mock(
    &mut self,
    name: impl Into<String>,
    path: impl Into<PathBuf>,
  ) -> &mut Self {
    self.mocks.insert(name.into(), path.into());
    self
  }
}

impl HasteIndex for StaticHasteIndex {
  fn module(&self, name: &str, platform: &Platform) -> Option<HasteEntry> {
    self.modules.get(name)?.get(platform).cloned()
  }

  fn mock(&self, name: &str) -> Option<PathBuf> {
    self.mocks.get(name).cloned()
  }
}

/// Lets `Resolver<Box<dyn HasteIndex>>` exist as a single non-generic type
/// alias for embedders that don't want to thread a haste-index type
/// parameter through their own API (see `module_runtime::BoxedResolver`).
/// Must live here, not in a downstream crate: `HasteIndex` is local to this
/// crate, so the orphan rule only allows this blanket impl where the trait
/// is defined.
impl HasteIndex for Box<dyn HasteIndex> {
  fn module(&self, name: &str, platform: &Platform) -> Option<HasteEntry> {
    (**self).module(name, platform)
  }

  fn mock(&self, name: &str) -> Option<PathBuf> {
    (**self).mock(name)
  }
}

/// Resolves the lookup order `defaultPlatform → native → generic` for one
/// name, trying each candidate bucket against `index` in turn.
pub(crate) fn lookup_with_platform_preference(
  index: &dyn HasteIndex,
  name: &str,
  default_platform: Option<&str>,
  native_supported: bool,
) -> Option<HasteEntry> {
  if let Some(default_platform) = default_platform {
    if let Some(entry) =
      index.module(name, &Platform::Named(default_platform.to_string()))
    {
      return Some(entry);
    }
  }
  if native_supported {
    if let Some(entry) = index.module(name, &Platform::Native) {
      return Some(entry);
    }
  }
  index.module(name, &Platform::Generic)
}

pub(crate) fn split_first_segment(name: &str) -> (&str, Option<&str>) {
  match name.split_once('/') {
    Some((first, rest)) => (first, Some(rest)),
    None => (name, None),
  }
}
