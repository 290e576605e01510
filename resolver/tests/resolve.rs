// Copyright 2018-2026 the Deno authors. MIT license.

use std::fs;

use module_resolver::config::ResolverConfigSpec;
use module_resolver::haste::HasteEntry;
use module_resolver::haste::HasteEntryKind;
use module_resolver::haste::Platform;
use module_resolver::haste::StaticHasteIndex;
use module_resolver::ResolveOptions;
use module_resolver::Resolver;

fn config(extensions: &[&str]) -> ResolverConfigSpec {
  ResolverConfigSpec {
    extensions: extensions.iter().map(|s| s.to_string()).collect(),
    ..Default::default()
  }
}

#[test]
fn haste_wins_over_node_resolution() {
  let dir = tempfile::tempdir().unwrap();
  let proj = dir.path().join("proj");
  let node_modules = proj.join("node_modules").join("foo");
  fs::create_dir_all(&node_modules).unwrap();
  fs::write(node_modules.join("index.js"), "module.exports = 1;").unwrap();

  let haste_path = dir.path().join("h").join("foo.js");
  fs::create_dir_all(haste_path.parent().unwrap()).unwrap();
  fs::write(&haste_path, "module.exports = 2;").unwrap();

  let mut haste = StaticHasteIndex::new();
  haste.insert_module(
    "foo",
    Platform::Generic,
    HasteEntry {
      kind: HasteEntryKind::Module,
      path: haste_path.clone(),
    },
  );

  let resolver = Resolver::new(
    config(&[".js"]).compile().unwrap(),
    haste,
  );

  let from = proj.join("a.js");
  let resolved = resolver
    .resolve_module(&from, "foo", ResolveOptions::default())
    .unwrap();
  assert_eq!(resolved, haste_path);
}

#[test]
fn node_resolution_finds_extensionless_file_and_caches() {
  let dir = tempfile::tempdir().unwrap();
  let node_modules = dir.path().join("node_modules").join("bar");
  fs::create_dir_all(&node_modules).unwrap();
  fs::write(node_modules.join("index.js"), "module.exports = 1;").unwrap();

  let resolver = Resolver::new(
    config(&[".js"]).compile().unwrap(),
    StaticHasteIndex::new(),
  );
  let from = dir.path().join("a.js");

  let first = resolver
    .resolve_module(&from, "bar", ResolveOptions::default())
    .unwrap();
  assert_eq!(first, node_modules.join("index.js"));

  // Second call must hit the name cache: still the same answer even if the
  // file disappears (cache must not re-touch the filesystem).
  fs::remove_file(node_modules.join("index.js")).unwrap();
  let second = resolver
    .resolve_module(&from, "bar", ResolveOptions::default())
    .unwrap();
  assert_eq!(second, first);
}

#[test]
fn resolution_failure_has_module_not_found_code_and_message() {
  let resolver = Resolver::new(
    config(&[".js"]).compile().unwrap(),
    StaticHasteIndex::new(),
  );
  let from = std::path::PathBuf::from("/proj/src/x.js");
  let err = resolver
    .resolve_module(&from, "nope", ResolveOptions::default())
    .unwrap_err();
  assert_eq!(err.code(), "MODULE_NOT_FOUND");
  assert_eq!(err.to_string(), "Cannot find module 'nope' from 'x.js'");
}

#[test]
fn get_module_paths_has_no_empty_tail() {
  let resolver = Resolver::new(
    config(&[".js"]).compile().unwrap(),
    StaticHasteIndex::new(),
  );
  let paths = resolver.get_module_paths(std::path::Path::new("/a/b"));
  assert!(paths.iter().all(|p| !p.as_os_str().is_empty()));
  assert!(paths.contains(&std::path::PathBuf::from("/a/b/node_modules")));
  assert!(paths.contains(&std::path::PathBuf::from("/a/node_modules")));
}

#[test]
fn name_mapper_first_match_wins() {
  let dir = tempfile::tempdir().unwrap();
  let stub_dir = dir.path().join("node_modules").join("stub");
  fs::create_dir_all(&stub_dir).unwrap();
  fs::write(stub_dir.join("x.js"), "module.exports = 'stub';").unwrap();

  let mut spec = config(&[".js"]);
  spec.module_name_mapper = vec![("stub/$1".to_string(), r"^real/(.*)$".to_string())];
  let resolver = Resolver::new(spec.compile().unwrap(), StaticHasteIndex::new());

  let from = dir.path().join("a.js");
  let found = resolver.get_mock_module(&from, "real/x").unwrap();
  assert_eq!(found, stub_dir.join("x.js"));
}
