// Copyright 2018-2026 the Deno authors. MIT license.
//
// The `jest`-style control surface (SPEC_FULL.md §4.2.7): the handful of
// methods a test file calls to steer mocking and module lifecycle, layered
// on top of the `require*`/`_shouldMock`/`_generateMock` primitives the
// other modules implement.

use std::path::Path;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::JsValue;
use crate::value::MockFn;
use crate::Runtime;

#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
  pub virtual_mock: bool,
}

impl Runtime {
  /// `jest.mock(name, factory?, options?)`. With a factory, pins the
  /// module's mock exports to whatever it returns (evaluated lazily, once,
  /// on first `require`). Without one, pins only the should-mock decision,
  /// leaving `requireMock` to fall back to a manual mock or automock.
  pub fn mock(
    &self,
    from: &Path,
    name: &str,
    factory: Option<Rc<dyn Fn() -> JsValue>>,
    options: MockOptions,
  ) {
    if options.virtual_mock {
      self.register_virtual_mock(name);
    }
    self.set_explicit_should_mock(from, name, true);
    if let Some(factory) = factory {
      let module_id = self.normalize_id(from, name);
      self.0.mock_factories.borrow_mut().insert(module_id, factory);
    }
  }

  /// `jest.unmock(name)`.
  pub fn unmock(&self, from: &Path, name: &str) {
    self.set_explicit_should_mock(from, name, false);
  }

  /// `jest.deepUnmock(name)` — like `unmock`, but additionally pins
  /// `transitiveShouldMock[id] = false`, so this exact `(from, name)`
  /// decision can never be flipped back to mocked by a later transitive-
  /// unmock computation (step 7b/8 of `should_mock`).
  pub fn deep_unmock(&self, from: &Path, name: &str) {
    self.unmock(from, name);
    let module_id = self.normalize_id(from, name);
    self.0.transitive_should_mock.borrow_mut().insert(module_id, false);
  }

  /// `jest.doMock` — identical to `mock`, kept distinct because callers
  /// reach for it specifically when `jest.mock` hoisting would be wrong
  /// (e.g. inside a `beforeEach`).
  pub fn do_mock(
    &self,
    from: &Path,
    name: &str,
    factory: Option<Rc<dyn Fn() -> JsValue>>,
    options: MockOptions,
  ) {
    self.mock(from, name, factory, options);
  }

  /// `jest.dontMock` — alias of `unmock`.
  pub fn dont_mock(&self, from: &Path, name: &str) {
    self.unmock(from, name);
  }

  /// `jest.fn(implementation?)`.
  pub fn make_mock_fn(&self, implementation: Option<Rc<dyn Fn(&[JsValue]) -> JsValue>>) -> MockFn {
    let mock_fn = MockFn::new(implementation);
    self.track_mock_fn(mock_fn.clone());
    mock_fn
  }

  /// `jest.isMockFunction(value)`.
  pub fn is_mock_function(&self, value: &JsValue) -> bool {
    self.0.mock_metadata.is_mock_function(value)
  }

  /// `jest.genMockFromModule`/`createMockFromModule(name)` — automocks
  /// `name` regardless of the current should-mock decision.
  pub fn create_mock_from_module(&self, from: &Path, name: &str) -> Result<JsValue, RuntimeError> {
    self.generate_mock(from, name)
  }

  /// `jest.enableAutomock()` / `jest.disableAutomock()`. The config's
  /// `automock` flag is read by `should_mock`'s step 3; mutating it here
  /// mid-run is exactly what those two calls are for.
  pub fn set_automock(&self, enabled: bool) {
    self.0.config.borrow_mut().automock = enabled;
  }

  pub fn get_test_env_data(&self) -> serde_json::Map<String, serde_json::Value> {
    self.0.config.borrow().test_env_data.clone()
  }

  /// `jest.resetModuleRegistry()`: clears the module and mock-exports
  /// registries and `mockClear`s every tracked mock function. Mock
  /// factories, explicit-mock flags, the virtual-mock set and the compiled
  /// unmock pattern all survive a reset — none of them are tied to a
  /// module-registry generation, so losing them would silently undo a
  /// `jest.mock(name, factory)` call a test made before resetting.
  pub fn reset_module_registry(&self) {
    self.0.module_registry.borrow_mut().clear();
    self.0.mock_registry.borrow_mut().clear();

    for mock_fn in self.0.mock_fns.borrow().iter() {
      mock_fn.mock_clear();
    }
    self.0.environment.for_each_mock_fn(&mut |mock_fn| mock_fn.mock_clear());
  }

  pub(crate) fn track_mock_fn(&self, mock_fn: MockFn) {
    self.0.mock_fns.borrow_mut().push(mock_fn);
  }

  pub fn run_all_timers(&self) {
    self.0.environment.fake_timers().run_all_timers();
  }

  pub fn run_all_ticks(&self) {
    self.0.environment.fake_timers().run_all_ticks();
  }

  pub fn run_all_immediates(&self) {
    self.0.environment.fake_timers().run_all_immediates();
  }

  pub fn run_only_pending_timers(&self) {
    self.0.environment.fake_timers().run_only_pending_timers();
  }

  pub fn clear_all_timers(&self) {
    self.0.environment.fake_timers().clear_all_timers();
  }

  pub fn use_fake_timers(&self) {
    self.0.environment.fake_timers().use_fake_timers();
  }

  pub fn use_real_timers(&self) {
    self.0.environment.fake_timers().use_real_timers();
  }
}
