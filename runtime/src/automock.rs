// Copyright 2018-2026 the Deno authors. MIT license.
//
// `_generateMock` (SPEC_FULL.md §4.2.5): builds an automatic mock by
// requiring the real module in isolation, reflecting its shape, and handing
// the shape back to `MockMetadataTooling::generate_from_metadata`.

use std::path::Path;

use crate::error::RuntimeError;
use crate::require::RequireModuleOptions;
use crate::value::JsValue;
use crate::value::Metadata;
use crate::CachedMockMetadata;
use crate::Runtime;

impl Runtime {
  /// Requires the real module in a throwaway registry so the introspection
  /// pass never pollutes what a subsequent real `require` would observe,
  /// then snapshots its shape and reconstructs a mock from that shape alone.
  /// Once computed, the metadata is kept (not discarded) so a later
  /// automock of the same module id reuses it instead of re-executing —
  /// and re-running the side effects of — the real module.
  pub(crate) fn generate_mock(&self, from: &Path, name: &str) -> Result<JsValue, RuntimeError> {
    let module_id = self.normalize_id(from, name);

    if let Some(cached) = self.0.mock_metadata_cache.borrow().get(&module_id) {
      return Ok(match cached {
        // A module that `require`s itself transitively while being
        // automocked (a dependency cycle reachable only through the mock
        // path) must not recurse into `_generateMock` again; back off with
        // an empty object, matching automock's isolation discipline.
        CachedMockMetadata::InProgress => JsValue::object(),
        CachedMockMetadata::Ready(metadata) => self.0.mock_metadata.generate_from_metadata(metadata),
      });
    }
    self
      .0
      .mock_metadata_cache
      .borrow_mut()
      .insert(module_id.clone(), CachedMockMetadata::InProgress);

    let metadata = self.compute_mock_metadata(from, name);

    match &metadata {
      Ok(metadata) => {
        self
          .0
          .mock_metadata_cache
          .borrow_mut()
          .insert(module_id, CachedMockMetadata::Ready(metadata.clone()));
      }
      Err(_) => {
        self.0.mock_metadata_cache.borrow_mut().remove(&module_id);
      }
    }
    let metadata = metadata?;

    let mock = self.0.mock_metadata.generate_from_metadata(&metadata);
    self.track_mock_functions_in(&mock);
    Ok(mock)
  }

  fn compute_mock_metadata(&self, from: &Path, name: &str) -> Result<Metadata, RuntimeError> {
    let saved_registry = self.0.module_registry.borrow().clone();
    let saved_mock_registry = self.0.mock_registry.borrow().clone();
    self.0.module_registry.borrow_mut().clear();

    let real_exports_result = self.require_module(from, Some(name), RequireModuleOptions::default());

    *self.0.module_registry.borrow_mut() = saved_registry;
    *self.0.mock_registry.borrow_mut() = saved_mock_registry;

    let real_exports = real_exports_result?;

    self.0.mock_metadata.get_metadata(&real_exports).ok_or_else(|| RuntimeError::AutomockIntrospectionFailed {
      path: self
        .0
        .resolver
        .resolve_module(from, name, Default::default())
        .unwrap_or_else(|_| from.to_path_buf()),
    })
  }

  fn track_mock_functions_in(&self, mock: &JsValue) {
    if let JsValue::Function(mock_fn) = mock {
      self.track_mock_fn(mock_fn.clone());
    }
    if let JsValue::Object(members) = mock {
      for value in members.values() {
        if let JsValue::Function(mock_fn) = value {
          self.track_mock_fn(mock_fn.clone());
        }
      }
    }
  }
}
