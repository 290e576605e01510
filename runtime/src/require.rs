// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::rc::Weak;

use module_resolver::HasteEntryKind;
use module_resolver::ResolveOptions;

use crate::env::WrapperArgs;
use crate::error::RuntimeError;
use crate::registry::ModuleRecord;
use crate::transform::TransformError;
use crate::value::JsValue;
use crate::Runtime;
use crate::RuntimeInner;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequireModuleOptions {
  pub is_internal_module: bool,
}

/// The per-module `require`, built by `_createRequireImplementation`
/// (SPEC_FULL.md §4.2.6): a small struct carrying `{from, isInternal}`
/// that delegates into the shared runtime — the "closure" the distilled
/// spec's design notes say either form satisfies.
#[derive(Clone)]
pub struct RequireHandle {
  runtime: Weak<RuntimeInner>,
  from: PathBuf,
  is_internal: bool,
}

impl RequireHandle {
  pub(crate) fn new(runtime: Weak<RuntimeInner>, from: PathBuf, is_internal: bool) -> Self {
    Self {
      runtime,
      from,
      is_internal,
    }
  }

  fn runtime(&self) -> Runtime {
    Runtime(
      self
        .runtime
        .upgrade()
        .expect("RequireHandle outlived its Runtime"),
    )
  }

  /// `require(name)` — dispatches to `requireInternalModule` for internal
  /// callers, `requireModuleOrMock` otherwise.
  pub fn call(&self, name: &str) -> Result<JsValue, RuntimeError> {
    let runtime = self.runtime();
    if self.is_internal {
      runtime.require_internal_module(&self.from, Some(name))
    } else {
      runtime.require_module_or_mock(&self.from, name)
    }
  }

  pub fn require_actual(&self, name: &str) -> Result<JsValue, RuntimeError> {
    self
      .runtime()
      .require_module(&self.from, Some(name), RequireModuleOptions::default())
  }

  pub fn require_mock(&self, name: &str) -> Result<JsValue, RuntimeError> {
    self.runtime().require_mock(&self.from, name)
  }

  pub fn resolve(&self, name: &str) -> Result<PathBuf, RuntimeError> {
    Ok(self.runtime().0.resolver.resolve_module(
      &self.from,
      name,
      ResolveOptions::default(),
    )?)
  }

  /// The `cache` attribute every real `require` carries; this crate's
  /// module cache lives on `Runtime`, not per-handle, so this is always
  /// empty — present only so embedders that pattern-match on the shape of
  /// a require function don't need a special case.
  pub fn cache(&self) -> JsValue {
    JsValue::object()
  }
}

impl Runtime {
  /// `requireModule(from, name?, options?)`. `name = None` requires `from`
  /// itself (used by automock's isolated re-execution, SPEC_FULL.md
  /// §4.2.5, and by an embedder requiring the test's entry file directly).
  pub fn require_module(
    &self,
    from: &Path,
    name: Option<&str>,
    options: RequireModuleOptions,
  ) -> Result<JsValue, RuntimeError> {
    let (resolved, parent) = match name {
      None => (from.to_path_buf(), None),
      Some(name) => (self.resolve_for_require_module(from, name, options)?, Some(from.to_path_buf())),
    };

    if has_extension(&resolved, "json") {
      let contents = std::fs::read_to_string(&resolved)
        .map_err(|source| RuntimeError::Io { path: resolved.clone(), source })?;
      let json: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|source| RuntimeError::InvalidJsonModule { path: resolved.clone(), source })?;
      return Ok(json_to_js_value(json));
    }
    if has_extension(&resolved, "node") {
      return Err(RuntimeError::NativeAddonUnsupported { path: resolved });
    }

    if let Some(parent_path) = &parent {
      if let Some(parent_record) = self.0.module_registry.borrow().get(parent_path.as_path()).cloned() {
        let mut parent_record = parent_record.borrow_mut();
        if !parent_record.children.contains(&resolved) {
          parent_record.children.push(resolved.clone());
        }
      }
    }

    if let Some(record) = self.0.module_registry.borrow().get(&resolved).cloned() {
      return Ok(record.borrow().exports.clone());
    }

    let record = self.exec_module(&resolved, parent, options)?;
    let exports = record.borrow().exports.clone();
    Ok(exports)
  }

  fn resolve_for_require_module(
    &self,
    from: &Path,
    name: &str,
    options: RequireModuleOptions,
  ) -> Result<PathBuf, RuntimeError> {
    // Core modules are handed to the host's built-in loader: no caching,
    // no wrapping, no module record. This crate has no such loader (it is
    // not a JS engine), so it surfaces a distinguishable error instead of
    // silently treating the core module as missing.
    if self.0.resolver.is_core_module(name) {
      return Err(RuntimeError::NativeAddonUnsupported {
        path: PathBuf::from(format!("node:{name}")),
      });
    }

    if !options.is_internal_module {
      if let Some(mock_path) = self.manual_mock_substitution(from, name) {
        return Ok(mock_path);
      }
    }

    Ok(self.0.resolver.resolve_module(from, name, ResolveOptions::default())?)
  }

  /// "If the module lookup came up empty but a manual mock exists *and*
  /// the manual mock isn't currently executing itself *and* the caller
  /// hasn't explicitly set 'don't mock', substitute the manual mock path."
  fn manual_mock_substitution(&self, from: &Path, name: &str) -> Option<PathBuf> {
    if self.0.resolver.get_module(name, HasteEntryKind::Module).is_some() {
      return None;
    }
    let mock_path = self.0.resolver.get_mock_module(from, name)?;

    let currently_executing = self.0.currently_executing_manual_mock.borrow().clone();
    let self_executing = currently_executing.as_deref() == Some(mock_path.as_path());
    if self_executing {
      return None;
    }

    let module_id = self.normalize_id(from, name);
    let explicitly_unmocked = self.0.explicit_should_mock.borrow().get(&module_id) == Some(&false);
    if explicitly_unmocked {
      return None;
    }

    Some(mock_path)
  }

  /// `requireInternalModule(from, to?)` — bypasses manual-mock
  /// substitution; internal plumbing is never intercepted by user mocks.
  pub fn require_internal_module(
    &self,
    from: &Path,
    to: Option<&str>,
  ) -> Result<JsValue, RuntimeError> {
    self.require_module(from, to, RequireModuleOptions { is_internal_module: true })
  }

  /// `requireMock(from, name)`.
  pub fn require_mock(&self, from: &Path, name: &str) -> Result<JsValue, RuntimeError> {
    let module_id = self.normalize_id(from, name);
    if let Some(exports) = self.0.mock_registry.borrow().get(&module_id).cloned() {
      return Ok(exports);
    }

    if let Some(factory) = self.0.mock_factories.borrow().get(&module_id).cloned() {
      let exports = factory();
      self.0.mock_registry.borrow_mut().insert(module_id, exports.clone());
      return Ok(exports);
    }

    let manual_mock_path = self.0.resolver.get_mock_module(from, name).or_else(|| {
      let real_path = self.0.resolver.resolve_module(from, name, ResolveOptions::default()).ok()?;
      let sibling = real_path
        .parent()
        .unwrap_or(&real_path)
        .join("__mocks__")
        .join(real_path.file_name()?);
      sibling.is_file().then_some(sibling)
    });

    let exports = match manual_mock_path {
      Some(mock_path) => {
        let record = self.exec_module(&mock_path, Some(from.to_path_buf()), RequireModuleOptions::default())?;
        record.borrow().exports.clone()
      }
      None => self.generate_mock(from, name)?,
    };

    self.0.mock_registry.borrow_mut().insert(module_id, exports.clone());
    Ok(exports)
  }

  /// `requireModuleOrMock(from, name)`.
  pub fn require_module_or_mock(&self, from: &Path, name: &str) -> Result<JsValue, RuntimeError> {
    if self.should_mock(from, name)? {
      self.require_mock(from, name)
    } else {
      self.require_module(from, Some(name), RequireModuleOptions::default())
    }
  }

  /// `setMock(name, value)` at the runtime level — sugars to
  /// `mock(name, () => value)`.
  pub fn set_mock(&self, from: &Path, name: &str, value: JsValue) {
    let module_id = self.normalize_id(from, name);
    let factory: Rc<dyn Fn() -> JsValue> = {
      let value = value.clone();
      Rc::new(move || value.clone())
    };
    self.0.mock_factories.borrow_mut().insert(module_id.clone(), factory);
    self.0.explicit_should_mock.borrow_mut().insert(module_id, true);
  }

  /// `_execModule` (SPEC_FULL.md §4.2.4).
  pub(crate) fn exec_module(
    &self,
    filename: &Path,
    parent: Option<PathBuf>,
    options: RequireModuleOptions,
  ) -> Result<Rc<std::cell::RefCell<ModuleRecord>>, RuntimeError> {
    if self.0.environment.is_torn_down() {
      log::debug!("module execution skipped, environment torn down: {}", filename.display());
      let require = self.make_require_handle(filename, options.is_internal_module);
      return Ok(Rc::new(std::cell::RefCell::new(ModuleRecord::new_pending(
        filename.to_path_buf(),
        parent,
        Vec::new(),
        require,
      ))));
    }

    let previous_module = self
      .0
      .currently_executing_module
      .replace(Some(filename.to_path_buf()));
    let previous_manual_mock = self
      .0
      .currently_executing_manual_mock
      .replace(Some(filename.to_path_buf()));

    let result = self.exec_module_inner(filename, parent, options);

    *self.0.currently_executing_module.borrow_mut() = previous_module;
    *self.0.currently_executing_manual_mock.borrow_mut() = previous_manual_mock;

    result
  }

  fn exec_module_inner(
    &self,
    filename: &Path,
    parent: Option<PathBuf>,
    options: RequireModuleOptions,
  ) -> Result<Rc<std::cell::RefCell<ModuleRecord>>, RuntimeError> {
    let dirname = filename.parent().unwrap_or(filename);
    let paths = self.0.resolver.get_module_paths(dirname);
    let require = self.make_require_handle(filename, options.is_internal_module);
    let record = Rc::new(std::cell::RefCell::new(ModuleRecord::new_pending(
      filename.to_path_buf(),
      parent,
      paths,
      require.clone(),
    )));
    self
      .0
      .module_registry
      .borrow_mut()
      .insert(filename.to_path_buf(), record.clone());

    log::debug!("executing module {}", filename.display());
    let compiled = self
      .0
      .transformer
      .transform(filename, options.is_internal_module)
      .map_err(|err| self.wrap_transform_error(filename, err))?;

    self.0.environment.execute(
      &compiled,
      WrapperArgs {
        module: &record,
        require,
        dirname,
        filename,
      },
    )?;
    log::debug!("finished executing module {}", filename.display());

    Ok(record)
  }

  fn wrap_transform_error(&self, filename: &Path, err: TransformError) -> RuntimeError {
    if err.is_syntax_error {
      RuntimeError::Transform {
        message: format!(
          "{}: {}",
          filename.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| ".".to_string()),
          err.message
        ),
      }
    } else {
      RuntimeError::Transform { message: err.message }
    }
  }

  pub(crate) fn make_require_handle(&self, from: &Path, is_internal: bool) -> RequireHandle {
    RequireHandle::new(self.downgrade(), from.to_path_buf(), is_internal)
  }
}

fn has_extension(path: &Path, ext: &str) -> bool {
  path.extension().map(|e| e == ext).unwrap_or(false)
}

fn json_to_js_value(value: serde_json::Value) -> JsValue {
  match value {
    serde_json::Value::Null => JsValue::Null,
    serde_json::Value::Bool(b) => JsValue::Bool(b),
    serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
    serde_json::Value::String(s) => JsValue::String(s),
    serde_json::Value::Array(items) => JsValue::Array(items.into_iter().map(json_to_js_value).collect()),
    serde_json::Value::Object(map) => {
      let mut out = indexmap::IndexMap::new();
      for (key, val) in map {
        out.insert(key, json_to_js_value(val));
      }
      JsValue::Object(out)
    }
  }
}
