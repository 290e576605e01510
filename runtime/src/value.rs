// Copyright 2018-2026 the Deno authors. MIT license.
//
// This crate has no embedded JS engine (the sandbox host that actually runs
// JavaScript is an out-of-scope collaborator, see SPEC_FULL.md §1). `JsValue`
// is the ambient stand-in for "exports: any": just enough shape to drive the
// mock-vs-real decision and automock generation, which are this crate's job.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// A module's exports, or any value reachable from them.
#[derive(Clone)]
pub enum JsValue {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(String),
  Array(Vec<JsValue>),
  Object(IndexMap<String, JsValue>),
  Function(MockFn),
}

impl fmt::Debug for JsValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      JsValue::Undefined => write!(f, "undefined"),
      JsValue::Null => write!(f, "null"),
      JsValue::Bool(b) => write!(f, "{b}"),
      JsValue::Number(n) => write!(f, "{n}"),
      JsValue::String(s) => write!(f, "{s:?}"),
      JsValue::Array(items) => f.debug_list().entries(items).finish(),
      JsValue::Object(map) => f.debug_map().entries(map.iter()).finish(),
      JsValue::Function(_) => write!(f, "[Function]"),
    }
  }
}

impl JsValue {
  pub fn object() -> Self {
    JsValue::Object(IndexMap::new())
  }

  pub fn is_function(&self) -> bool {
    matches!(self, JsValue::Function(_))
  }
}

type Implementation = Rc<dyn Fn(&[JsValue]) -> JsValue>;

struct MockFnState {
  calls: Vec<Vec<JsValue>>,
  implementation: Option<Implementation>,
}

/// A `jest.fn()` instance: a cheaply-cloneable handle (all clones share the
/// same call log) recording every invocation, with an optional backing
/// implementation. Automock turns real functions into `MockFn`s with no
/// implementation (no-ops that return `undefined`).
#[derive(Clone)]
pub struct MockFn {
  state: Rc<RefCell<MockFnState>>,
}

impl MockFn {
  pub fn new(implementation: Option<Implementation>) -> Self {
    Self {
      state: Rc::new(RefCell::new(MockFnState {
        calls: Vec::new(),
        implementation,
      })),
    }
  }

  pub fn call(&self, args: &[JsValue]) -> JsValue {
    self.state.borrow_mut().calls.push(args.to_vec());
    let implementation = self.state.borrow().implementation.clone();
    match implementation {
      Some(implementation) => implementation(args),
      None => JsValue::Undefined,
    }
  }

  pub fn calls(&self) -> Vec<Vec<JsValue>> {
    self.state.borrow().calls.clone()
  }

  /// `mockClear()` — wipes the call log, keeps the implementation. This is
  /// what `resetModuleRegistry`'s global-scope walk invokes on every mock
  /// function it finds (SPEC_FULL.md §4.2.7).
  pub fn mock_clear(&self) {
    self.state.borrow_mut().calls.clear();
  }

  pub fn set_implementation(&self, implementation: Option<Implementation>) {
    self.state.borrow_mut().implementation = implementation;
  }
}

/// Structural shape of a value, produced by [`crate::metadata::MockMetadataTooling::get_metadata`]
/// and turned back into a [`JsValue`] mock by `generate_from_metadata`.
#[derive(Clone, Debug)]
pub enum Metadata {
  Object(IndexMap<String, Metadata>),
  Array(Vec<Metadata>),
  Function { name: Option<String> },
  Leaf(LeafValue),
}

/// The non-function, non-container values automock copies verbatim.
#[derive(Clone, Debug)]
pub enum LeafValue {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(String),
}

impl From<LeafValue> for JsValue {
  fn from(leaf: LeafValue) -> Self {
    match leaf {
      LeafValue::Undefined => JsValue::Undefined,
      LeafValue::Null => JsValue::Null,
      LeafValue::Bool(b) => JsValue::Bool(b),
      LeafValue::Number(n) => JsValue::Number(n),
      LeafValue::String(s) => JsValue::String(s),
    }
  }
}
