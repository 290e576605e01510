// Copyright 2018-2026 the Deno authors. MIT license.

//! Stateful, mock-aware module runtime layered on top of `module_resolver`.
//! See `SPEC_FULL.md` §3-4 for the module graph this crate maintains and
//! §4.2 for the `require`/mock-decision/automock pipeline.

mod automock;
pub mod config;
pub mod control;
pub mod env;
pub mod error;
mod mock_decision;
pub mod metadata;
mod normalize;
pub mod registry;
pub mod require;
pub mod transform;
pub mod value;

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::rc::Weak;

use module_resolver::HasteIndex;

pub use config::RuntimeConfig;
pub use config::RuntimeConfigSpec;
pub use control::MockOptions;
pub use env::Environment;
pub use env::FakeTimers;
pub use env::NoopFakeTimers;
pub use env::ScriptEnvironment;
pub use env::WrapperArgs;
pub use error::RuntimeError;
pub use metadata::MockMetadataTooling;
pub use metadata::StructuralMockMetadata;
pub use registry::ModuleRecord;
pub use require::RequireHandle;
pub use require::RequireModuleOptions;
pub use transform::CompiledModule;
pub use transform::PassthroughTransformer;
pub use transform::TransformError;
pub use transform::Transformer;
pub use value::JsValue;
pub use value::LeafValue;
pub use value::Metadata;
pub use value::MockFn;

/// `Runtime` is generic over nothing: the haste index, environment,
/// transformer and mock-metadata tooling are all trait objects, so one
/// concrete `Runtime` type serves every embedder regardless of which
/// collaborators it plugs in (SPEC_FULL.md §1).
pub type BoxedResolver = module_resolver::Resolver<Box<dyn HasteIndex>>;

/// `mock_metadata_cache`'s value: a recursion guard while the real module is
/// being introspected, replaced with the computed shape once introspection
/// finishes so later automock generations of the same module id reuse it
/// instead of re-executing (and re-running the side effects of) the real
/// module.
pub(crate) enum CachedMockMetadata {
  InProgress,
  Ready(Metadata),
}

pub(crate) struct RuntimeInner {
  resolver: BoxedResolver,
  environment: Box<dyn Environment>,
  transformer: Box<dyn Transformer>,
  mock_metadata: Box<dyn MockMetadataTooling>,
  config: RefCell<RuntimeConfig>,

  module_registry: RefCell<HashMap<PathBuf, Rc<RefCell<ModuleRecord>>>>,
  mock_registry: RefCell<HashMap<String, JsValue>>,
  mock_factories: RefCell<HashMap<String, Rc<dyn Fn() -> JsValue>>>,

  explicit_should_mock: RefCell<HashMap<String, bool>>,
  should_mock_module_cache: RefCell<HashMap<String, bool>>,
  should_unmock_transitive_dependencies_cache: RefCell<HashMap<String, bool>>,
  /// `transitiveShouldMock`: an explicit should-mock pin set by
  /// `jest.deepUnmock` (and by the flat-`node_modules` transitive-unmock
  /// branch in `should_mock`), distinct from `explicit_should_mock` in that
  /// it is never touched by plain `mock`/`unmock`.
  transitive_should_mock: RefCell<HashMap<String, bool>>,
  virtual_mocks: RefCell<HashSet<String>>,

  currently_executing_module: RefCell<Option<PathBuf>>,
  currently_executing_manual_mock: RefCell<Option<PathBuf>>,
  mock_metadata_cache: RefCell<HashMap<String, CachedMockMetadata>>,
  mock_fns: RefCell<Vec<MockFn>>,

  self_weak: Weak<RuntimeInner>,
}

/// The runtime. Cheaply cloneable (an `Rc` clone): every clone shares the
/// same registries, matching the single runtime instance a real test file
/// is handed (SPEC_FULL.md §5 — `!Sync` by construction, single-threaded
/// cooperative use only).
#[derive(Clone)]
pub struct Runtime(pub(crate) Rc<RuntimeInner>);

impl Runtime {
  pub fn new(
    resolver: BoxedResolver,
    environment: Box<dyn Environment>,
    transformer: Box<dyn Transformer>,
    mock_metadata: Box<dyn MockMetadataTooling>,
    config: RuntimeConfig,
  ) -> Self {
    Runtime(Rc::new_cyclic(|self_weak| RuntimeInner {
      resolver,
      environment,
      transformer,
      mock_metadata,
      config: RefCell::new(config),
      module_registry: RefCell::new(HashMap::new()),
      mock_registry: RefCell::new(HashMap::new()),
      mock_factories: RefCell::new(HashMap::new()),
      explicit_should_mock: RefCell::new(HashMap::new()),
      should_mock_module_cache: RefCell::new(HashMap::new()),
      should_unmock_transitive_dependencies_cache: RefCell::new(HashMap::new()),
      transitive_should_mock: RefCell::new(HashMap::new()),
      virtual_mocks: RefCell::new(HashSet::new()),
      currently_executing_module: RefCell::new(None),
      currently_executing_manual_mock: RefCell::new(None),
      mock_metadata_cache: RefCell::new(HashMap::new()),
      mock_fns: RefCell::new(Vec::new()),
      self_weak: self_weak.clone(),
    }))
  }

  pub fn resolver(&self) -> &BoxedResolver {
    &self.0.resolver
  }

  pub fn config(&self) -> RuntimeConfig {
    self.0.config.borrow().clone()
  }

  /// Entry point for an embedder: requires the test's own file as the
  /// first module in the graph.
  pub fn require_entry_point(&self, entry: &Path) -> Result<JsValue, RuntimeError> {
    self.require_module(entry, None, RequireModuleOptions::default())
  }

  pub(crate) fn downgrade(&self) -> Weak<RuntimeInner> {
    self.0.self_weak.clone()
  }

  pub(crate) fn normalize_id(&self, from: &Path, name: &str) -> String {
    normalize::normalize_id(&self.0.resolver, &self.0.virtual_mocks.borrow(), from, name)
  }

  pub(crate) fn normalize_current_module_id(&self, from: &Path) -> String {
    normalize::normalize_current_module_id(
      &self.0.resolver,
      &self.0.virtual_mocks.borrow(),
      from,
    )
  }
}
