// Copyright 2018-2026 the Deno authors. MIT license.
//
// `Environment` is the seam to the out-of-scope sandbox host: whatever
// actually evaluates a compiled wrapper against a fresh global object and
// owns fake-timer state (SPEC_FULL.md §1, §6). This crate never embeds a JS
// engine; it only needs to call across this trait and read back `exports`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::registry::ModuleRecord;
use crate::require::RequireHandle;
use crate::transform::CompiledModule;
use crate::value::JsValue;
use crate::value::MockFn;

/// Everything the ABI in SPEC_FULL.md §6 hands a module body. The
/// distilled spec's two-phase "run_script then invoke the installed
/// wrapper" is collapsed into one trait call here (DESIGN.md records this
/// simplification): a Rust trait object is already the thing standing in
/// for "wherever the wrapper value lives on the sandbox", so there is no
/// separate named slot to thread through.
pub struct WrapperArgs<'a> {
  pub module: &'a Rc<RefCell<ModuleRecord>>,
  pub require: RequireHandle,
  pub dirname: &'a Path,
  pub filename: &'a Path,
}

pub trait Environment {
  /// Evaluate `compiled` with `args`, mutating `args.module.borrow_mut().exports`.
  fn execute(&self, compiled: &CompiledModule, args: WrapperArgs<'_>) -> Result<(), RuntimeError>;

  fn fake_timers(&self) -> &dyn FakeTimers;

  /// Visits every mock function reachable from the sandbox's global scope,
  /// so `resetModuleRegistry` can `mockClear` each one (SPEC_FULL.md §4.2.7).
  fn for_each_mock_fn(&self, f: &mut dyn FnMut(&MockFn));

  /// `_execModule` becomes a no-op once this is true (SPEC_FULL.md §7).
  fn is_torn_down(&self) -> bool;
}

pub trait FakeTimers {
  fn run_all_ticks(&self);
  fn run_all_immediates(&self);
  fn run_all_timers(&self);
  fn run_only_pending_timers(&self);
  fn clear_all_timers(&self);
  fn use_fake_timers(&self);
  fn use_real_timers(&self);
  fn mock_clear_timers(&self);
}

#[derive(Default)]
struct NoopFakeTimersState {
  using_fake_timers: bool,
}

/// A fake-timer façade that just records which controls were invoked;
/// useful wherever a real scheduler isn't available (tests, and embedders
/// that haven't wired up their sandbox's timer hooks yet).
#[derive(Default)]
pub struct NoopFakeTimers {
  state: RefCell<NoopFakeTimersState>,
  log: RefCell<Vec<&'static str>>,
}

impl NoopFakeTimers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn calls(&self) -> Vec<&'static str> {
    self.log.borrow().clone()
  }

  pub fn is_using_fake_timers(&self) -> bool {
    self.state.borrow().using_fake_timers
  }
}

impl FakeTimers for NoopFakeTimers {
  fn run_all_ticks(&self) {
    self.log.borrow_mut().push("runAllTicks");
  }
  fn run_all_immediates(&self) {
    self.log.borrow_mut().push("runAllImmediates");
  }
  fn run_all_timers(&self) {
    self.log.borrow_mut().push("runAllTimers");
  }
  fn run_only_pending_timers(&self) {
    self.log.borrow_mut().push("runOnlyPendingTimers");
  }
  fn clear_all_timers(&self) {
    self.log.borrow_mut().push("clearAllTimers");
  }
  fn use_fake_timers(&self) {
    self.state.borrow_mut().using_fake_timers = true;
    self.log.borrow_mut().push("useFakeTimers");
  }
  fn use_real_timers(&self) {
    self.state.borrow_mut().using_fake_timers = false;
    self.log.borrow_mut().push("useRealTimers");
  }
  fn mock_clear_timers(&self) {
    self.log.borrow_mut().push("mockClearTimers");
  }
}

type ModuleBody = Rc<dyn Fn(&Rc<RefCell<ModuleRecord>>, &RequireHandle)>;

/// An in-process stand-in for the sandbox host, driven by plain Rust
/// closures instead of compiled JavaScript. Every module body registered
/// here receives `(module, require)` and is expected to set
/// `module.borrow_mut().exports` itself, exactly like a real wrapper body
/// assigning to `module.exports`.
#[derive(Default)]
pub struct ScriptEnvironment {
  bodies: RefCell<HashMap<String, ModuleBody>>,
  fake_timers: NoopFakeTimers,
  torn_down: RefCell<bool>,
  mock_fns: RefCell<Vec<MockFn>>,
}

impl ScriptEnvironment {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers the body for `filename`. `transform()` produces a
  /// [`CompiledModule`] whose id is the filename string, which this
  /// environment uses to look the body back up.
  pub fn define(
    &self,
    filename: impl Into<String>,
    body: impl Fn(&Rc<RefCell<ModuleRecord>>, &RequireHandle) + 'static,
  ) {
    self.bodies.borrow_mut().insert(filename.into(), Rc::new(body));
  }

  pub fn tear_down(&self) {
    *self.torn_down.borrow_mut() = true;
  }

  pub fn track_mock_fn(&self, mock_fn: MockFn) {
    self.mock_fns.borrow_mut().push(mock_fn);
  }

  pub fn fake_timers_handle(&self) -> &NoopFakeTimers {
    &self.fake_timers
  }
}

impl Environment for ScriptEnvironment {
  fn execute(&self, compiled: &CompiledModule, args: WrapperArgs<'_>) -> Result<(), RuntimeError> {
    let body = self.bodies.borrow().get(&compiled.id).cloned();
    match body {
      Some(body) => {
        body(args.module, &args.require);
        Ok(())
      }
      None => Err(RuntimeError::Execution {
        path: args.filename.to_path_buf(),
        message: "no module body registered for this path in ScriptEnvironment".to_string(),
      }),
    }
  }

  fn fake_timers(&self) -> &dyn FakeTimers {
    &self.fake_timers
  }

  fn for_each_mock_fn(&self, f: &mut dyn FnMut(&MockFn)) {
    for mock_fn in self.mock_fns.borrow().iter() {
      f(mock_fn);
    }
  }

  fn is_torn_down(&self) -> bool {
    *self.torn_down.borrow()
  }
}
