// Copyright 2018-2026 the Deno authors. MIT license.
//
// `_shouldMock` (SPEC_FULL.md §4.2.2): the cascade deciding whether
// `requireModuleOrMock` hands back the real module or its mock.

use std::path::Path;

use module_resolver::ResolveOptions;

use crate::error::RuntimeError;
use crate::Runtime;

impl Runtime {
  pub fn should_mock(&self, from: &Path, name: &str) -> Result<bool, RuntimeError> {
    let module_id = self.normalize_id(from, name);

    // 1. A virtual mock was registered for this specifier directly; it has
    // no real module behind it, so the decision is forced.
    if self.0.virtual_mocks.borrow().contains(name) {
      return Ok(true);
    }

    // 2. `jest.doMock`/`jest.dontMock` (and `jest.mock`/`jest.unmock` with no
    // factory) pin the decision explicitly, bypassing every later step.
    if let Some(explicit) = self.0.explicit_should_mock.borrow().get(&module_id).copied() {
      return Ok(explicit);
    }

    // 2b. `jest.deepUnmock` (and the flat-install branch in step 7b below)
    // pin `transitiveShouldMock` directly; honor it before automock is even
    // consulted, the same way an explicit decision is.
    if let Some(forced) = self.0.transitive_should_mock.borrow().get(&module_id).copied() {
      return Ok(forced);
    }

    // 3. Automock off: nothing is mocked unless explicitly requested above.
    if !self.0.config.borrow().automock {
      return Ok(false);
    }

    // 4. Core modules are never automocked.
    if self.0.resolver.is_core_module(name) {
      return Ok(false);
    }

    // 5. Memoized result from an earlier call with this exact id.
    if let Some(cached) = self.0.should_mock_module_cache.borrow().get(&module_id).copied() {
      return Ok(cached);
    }

    // 6. Resolution failure: fall back on manual-mock existence instead of
    // propagating the error, since "no real module" is itself meaningful
    // input to the decision (a manual mock with no real counterpart, e.g. a
    // mocked native module, must still mock successfully).
    let real_path = match self.0.resolver.resolve_module(from, name, ResolveOptions::default()) {
      Ok(path) => path,
      Err(_) => {
        let should_mock = self.0.resolver.get_mock_module(from, name).is_some();
        self.0.should_mock_module_cache.borrow_mut().insert(module_id, should_mock);
        return Ok(should_mock);
      }
    };

    // 7. `unmockedModulePathPatterns`: the pre-compiled alternation regex
    // matched against the resolved real path suppresses mocking outright.
    if self.0.config.borrow().matches_unmock_pattern(&real_path) {
      self.0.should_mock_module_cache.borrow_mut().insert(module_id, false);
      return Ok(false);
    }

    // 7b. Transitive unmock across flat installs: a dependency resolved
    // from *inside* `node_modules` whose requiring module also lives under
    // `node_modules` (the layout flat package managers produce) inherits
    // the requiring module's own unmocked status when that module was
    // itself explicitly unmocked or matches the unmock-list.
    if is_under_node_modules(from) && is_under_node_modules(&real_path) {
      let from_id = self.normalize_current_module_id(from);
      let from_explicitly_unmocked =
        self.0.explicit_should_mock.borrow().get(&from_id).copied() == Some(false);
      let from_matches_unmock_list = self.0.config.borrow().matches_unmock_pattern(from);
      if from_explicitly_unmocked || from_matches_unmock_list {
        self.0.transitive_should_mock.borrow_mut().insert(module_id.clone(), false);
        self.0.should_mock_module_cache.borrow_mut().insert(module_id, false);
        return Ok(false);
      }
    }

    // 8. Transitive unmock via same-id coincidence: a dependency pulled in
    // by a module that itself resolved to "don't mock" inherits that
    // decision, so a flat install doesn't end up with some of a library's
    // internals mocked and others not.
    let from_id = self.normalize_current_module_id(from);
    if self
      .0
      .should_unmock_transitive_dependencies_cache
      .borrow()
      .get(&from_id)
      .copied()
      == Some(true)
    {
      self.0.explicit_should_mock.borrow_mut().insert(module_id.clone(), false);
      self
        .0
        .should_unmock_transitive_dependencies_cache
        .borrow_mut()
        .insert(module_id.clone(), true);
      self.0.should_mock_module_cache.borrow_mut().insert(module_id, false);
      return Ok(false);
    }

    self.0.should_mock_module_cache.borrow_mut().insert(module_id, true);
    Ok(true)
  }

  /// `jest.doMock`/`jest.unmock` path: pins an explicit decision and, for
  /// `unmock`, propagates it to this module's own transitive dependents via
  /// `should_unmock_transitive_dependencies_cache` (step 8 above).
  pub fn set_explicit_should_mock(&self, from: &Path, name: &str, should_mock: bool) {
    let module_id = self.normalize_id(from, name);
    self.0.explicit_should_mock.borrow_mut().insert(module_id.clone(), should_mock);
    if !should_mock {
      self
        .0
        .should_unmock_transitive_dependencies_cache
        .borrow_mut()
        .insert(module_id, true);
    }
  }

  pub fn register_virtual_mock(&self, name: &str) {
    self.0.virtual_mocks.borrow_mut().insert(name.to_string());
  }
}

fn is_under_node_modules(path: &Path) -> bool {
  path.components().any(|c| c.as_os_str() == "node_modules")
}
