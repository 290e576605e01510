// Copyright 2018-2026 the Deno authors. MIT license.
//
// `_normalizeID` (SPEC_FULL.md §4.2.3): the runtime's canonical identity for
// a `(caller, requested name)` pair, fusing the real-module path and the
// mock path so a mocked module and its original share registry identity
// while staying distinguishable from unrelated modules.

use std::collections::HashSet;
use std::path::Path;

use crate::BoxedResolver;

const SEP: char = '\u{0}';

/// Builds the id string. `virtual_mocks` takes precedence over resolution
/// for the "absolute path" slot, matching `_shouldMock` step 1 and the
/// distilled spec's note that a virtual mock need not exist on disk.
pub(crate) fn normalize_id(
  resolver: &BoxedResolver,
  virtual_mocks: &HashSet<String>,
  from: &Path,
  name: &str,
) -> String {
  if resolver.is_core_module(name) {
    return format!("node{SEP}{name}{SEP}");
  }

  let absolute_path = if virtual_mocks.contains(name) {
    Some(name.to_string())
  } else {
    resolver
      .resolve_module(from, name, Default::default())
      .ok()
      .map(|p| p.to_string_lossy().into_owned())
  };

  let mock_path = resolver
    .get_mock_module(from, name)
    .map(|p| p.to_string_lossy().into_owned());

  format!(
    "user{SEP}{}{SEP}{}",
    absolute_path.unwrap_or_default(),
    mock_path.unwrap_or_default()
  )
}

/// `_shouldMock` step 7 normalizes `from` itself as if it were a requested
/// module name (`normalizeID(from)`, no second argument) to get an identity
/// for "the module currently doing the requiring". The distilled spec flags
/// this as intentionally ambiguous (SPEC_FULL.md §9 Open Questions); we
/// resolve it literally — `name` defaults to `from`'s own string form so
/// the id collides with whatever id a caller-site `normalize_id(resolver,
/// ..., from, from_as_str)` would have produced, which is what step 7's
/// cache keying relies on.
pub(crate) fn normalize_current_module_id(
  resolver: &BoxedResolver,
  virtual_mocks: &HashSet<String>,
  from: &Path,
) -> String {
  let from_as_name = from.to_string_lossy().into_owned();
  normalize_id(resolver, virtual_mocks, from, &from_as_name)
}
