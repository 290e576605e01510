// Copyright 2018-2026 the Deno authors. MIT license.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use module_resolver::HasteEntry;
use module_resolver::HasteEntryKind;
use module_resolver::Platform;
use module_resolver::Resolver;
use module_resolver::ResolverConfigSpec;
use module_resolver::StaticHasteIndex;
use module_runtime::JsValue;
use module_runtime::MockFn;
use module_runtime::PassthroughTransformer;
use module_runtime::RequireModuleOptions;
use module_runtime::Runtime;
use module_runtime::RuntimeConfig;
use module_runtime::ScriptEnvironment;
use module_runtime::StructuralMockMetadata;

fn build_runtime(haste: StaticHasteIndex, env: ScriptEnvironment, automock: bool) -> Runtime {
  let config = ResolverConfigSpec::default().compile().unwrap();
  let resolver = Resolver::new(config, Box::new(haste) as Box<dyn module_resolver::HasteIndex>);
  Runtime::new(
    resolver,
    Box::new(env),
    Box::new(PassthroughTransformer),
    Box::new(StructuralMockMetadata),
    RuntimeConfig {
      automock,
      ..Default::default()
    },
  )
}

fn object(entries: Vec<(&str, JsValue)>) -> JsValue {
  let mut map = IndexMap::new();
  for (key, value) in entries {
    map.insert(key.to_string(), value);
  }
  JsValue::Object(map)
}

#[test]
fn circular_require_observes_partial_exports() {
  let dir = tempfile::tempdir().unwrap();
  let a_path = dir.path().join("a.js");
  let b_path = dir.path().join("b.js");
  std::fs::write(&a_path, "").unwrap();
  std::fs::write(&b_path, "").unwrap();

  let mut haste = StaticHasteIndex::new();
  haste.insert_module(
    "a",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: a_path.clone() },
  );
  haste.insert_module(
    "b",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: b_path.clone() },
  );

  let observed_from_b: Rc<RefCell<Option<JsValue>>> = Rc::new(RefCell::new(None));
  let observed_from_b_clone = observed_from_b.clone();

  let env = ScriptEnvironment::new();
  env.define(a_path.to_string_lossy().into_owned(), move |module, require| {
    module.borrow_mut().exports = object(vec![("name", JsValue::String("a".to_string()))]);
    require.call("b").unwrap();
  });
  env.define(b_path.to_string_lossy().into_owned(), move |module, require| {
    module.borrow_mut().exports = object(vec![("name", JsValue::String("b".to_string()))]);
    let a_exports = require.call("a").unwrap();
    *observed_from_b_clone.borrow_mut() = Some(a_exports);
  });

  let runtime = build_runtime(haste, env, false);
  runtime.require_module(&a_path, Some("a"), RequireModuleOptions::default()).unwrap();

  match observed_from_b.borrow().as_ref().unwrap() {
    JsValue::Object(map) => {
      assert!(matches!(map.get("name"), Some(JsValue::String(s)) if s == "a"));
    }
    other => panic!("expected object, got {other:?}"),
  }
}

#[test]
fn automock_does_not_leave_a_stale_registry_entry() {
  let dir = tempfile::tempdir().unwrap();
  let leaf_path = dir.path().join("leaf.js");
  std::fs::write(&leaf_path, "").unwrap();

  let mut haste = StaticHasteIndex::new();
  haste.insert_module(
    "leaf",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: leaf_path.clone() },
  );

  let exec_count = Rc::new(Cell::new(0));
  let exec_count_clone = exec_count.clone();

  let env = ScriptEnvironment::new();
  env.define(leaf_path.to_string_lossy().into_owned(), move |module, _require| {
    exec_count_clone.set(exec_count_clone.get() + 1);
    let count = exec_count_clone.get();
    let greet = MockFn::new(Some(Rc::new(|_args: &[JsValue]| JsValue::String("hi".to_string()))));
    module.borrow_mut().exports = object(vec![
      ("greet", JsValue::Function(greet)),
      ("calls", JsValue::Number(count as f64)),
    ]);
  });

  let runtime = build_runtime(haste, env, true);

  let mocked = runtime.require_module_or_mock(&leaf_path, "leaf").unwrap();
  assert_eq!(exec_count.get(), 1, "automock must execute the real module once to learn its shape");

  let mocked_greet = match &mocked {
    JsValue::Object(map) => match map.get("greet") {
      Some(JsValue::Function(f)) => f.clone(),
      other => panic!("expected mocked function, got {other:?}"),
    },
    other => panic!("expected object, got {other:?}"),
  };
  assert!(matches!(mocked_greet.call(&[]), JsValue::Undefined));

  let real = runtime
    .require_module(&leaf_path, Some("leaf"), RequireModuleOptions::default())
    .unwrap();
  assert_eq!(
    exec_count.get(),
    2,
    "a real require after automock must re-execute the module, not reuse automock's isolated registry"
  );
  let real_greet = match &real {
    JsValue::Object(map) => match map.get("greet") {
      Some(JsValue::Function(f)) => f.clone(),
      other => panic!("expected real function, got {other:?}"),
    },
    other => panic!("expected object, got {other:?}"),
  };
  match real_greet.call(&[]) {
    JsValue::String(s) => assert_eq!(s, "hi"),
    other => panic!("expected real implementation to run, got {other:?}"),
  }
}

#[test]
fn resolution_failure_reports_module_not_found() {
  let haste = StaticHasteIndex::new();
  let env = ScriptEnvironment::new();
  let runtime = build_runtime(haste, env, false);

  let from = std::path::Path::new("/project/src/index.js");
  let err = runtime
    .require_module(from, Some("nope"), RequireModuleOptions::default())
    .unwrap_err();
  assert_eq!(err.code(), "MODULE_NOT_FOUND");
}

#[test]
fn unmocking_a_package_transitively_unmocks_its_own_requires() {
  let dir = tempfile::tempdir().unwrap();
  let pkg_path = dir.path().join("pkg.js");
  std::fs::write(&pkg_path, "").unwrap();
  let dep_path = dir.path().join("dep.js");
  let dep2_path = dir.path().join("dep2.js");

  let mut haste = StaticHasteIndex::new();
  haste.insert_module(
    "pkg",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: pkg_path.clone() },
  );
  haste.insert_module(
    "dep",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: dep_path.clone() },
  );
  haste.insert_module(
    "dep2",
    Platform::Generic,
    HasteEntry { kind: HasteEntryKind::Module, path: dep2_path.clone() },
  );

  let env = ScriptEnvironment::new();
  let runtime = build_runtime(haste, env, true);

  let main = std::path::Path::new("/project/src/main.js");
  runtime.unmock(main, "pkg");

  assert!(!runtime.should_mock(main, "pkg").unwrap());
  assert!(
    !runtime.should_mock(&pkg_path, "dep").unwrap(),
    "a dependency required from an explicitly-unmocked package must inherit that decision"
  );
  assert!(
    runtime.should_mock(main, "dep2").unwrap(),
    "automock still applies to modules outside the unmocked package"
  );
}
