// Copyright 2018-2026 the Deno authors. MIT license.
//
// CommonJS-style `require()` resolution: the variant test frameworks embed,
// not ESM `"exports"` map resolution (out of scope — see SPEC_FULL.md §4.1).

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::ResolverConfig;
use crate::error::ResolverError;

/// Resolves `name` as seen from `from_dir`, trying relative/absolute
/// resolution first and falling back to a `moduleDirectories` walk for bare
/// specifiers. Returns `None` (never an error) on a plain miss; callers
/// upstream decide whether a miss is fatal.
pub(crate) fn resolve(
  from_dir: &Path,
  name: &str,
  config: &ResolverConfig,
  search_paths: &[PathBuf],
) -> Result<Option<PathBuf>, ResolverError> {
  if is_relative_or_absolute(name) {
    let base = if name.starts_with('/') {
      PathBuf::from(name)
    } else {
      from_dir.join(name)
    };
    return resolve_file_or_dir(&base, config);
  }

  for dir in module_search_dirs(from_dir, config, search_paths) {
    let candidate = dir.join(name);
    if let Some(found) = resolve_file_or_dir(&candidate, config)? {
      return Ok(Some(found));
    }
  }
  Ok(None)
}

fn is_relative_or_absolute(name: &str) -> bool {
  name.starts_with('/') || name.starts_with("./") || name.starts_with("../") || name == "." || name == ".."
}

/// Every directory this resolution should probe for a `node_modules`-style
/// sibling, walking from `from_dir` up to the filesystem root, then
/// `search_paths` (the already-concatenated `NODE_PATH` + `modulePaths`).
fn module_search_dirs(
  from_dir: &Path,
  config: &ResolverConfig,
  search_paths: &[PathBuf],
) -> Vec<PathBuf> {
  let mut dirs = Vec::new();
  for ancestor in from_dir.ancestors() {
    for module_dir_name in &config.module_directories {
      dirs.push(ancestor.join(module_dir_name));
    }
  }
  dirs.extend(search_paths.iter().cloned());
  dirs
}

/// `getModulePaths` — the `node_modules` walk alone, memoized by the caller.
/// The distilled spec calls out dropping a trailing empty entry some
/// libraries emit; `Path::ancestors()` never produces one, so there is
/// nothing to filter here, but the empty check is kept to document the
/// invariant the spec requires callers to test for.
pub(crate) fn module_paths(from_dir: &Path, config: &ResolverConfig) -> Vec<PathBuf> {
  let mut paths: Vec<PathBuf> = from_dir
    .ancestors()
    .flat_map(|ancestor| {
      config
        .module_directories
        .iter()
        .map(move |name| ancestor.join(name))
    })
    .collect();
  paths.retain(|p| !p.as_os_str().is_empty());
  paths
}

fn resolve_file_or_dir(
  candidate: &Path,
  config: &ResolverConfig,
) -> Result<Option<PathBuf>, ResolverError> {
  if candidate.is_file() {
    return Ok(Some(candidate.to_path_buf()));
  }
  if let Some(found) = try_extensions(candidate, &config.extensions) {
    return Ok(Some(found));
  }
  if candidate.is_dir() {
    return resolve_directory(candidate, config);
  }
  Ok(None)
}

fn try_extensions(base: &Path, extensions: &[String]) -> Option<PathBuf> {
  for ext in extensions {
    let mut with_ext = base.as_os_str().to_owned();
    with_ext.push(ext);
    let candidate = PathBuf::from(with_ext);
    if candidate.is_file() {
      return Some(candidate);
    }
  }
  None
}

fn resolve_directory(
  dir: &Path,
  config: &ResolverConfig,
) -> Result<Option<PathBuf>, ResolverError> {
  let package_json_path = dir.join("package.json");
  if package_json_path.is_file() {
    if let Some(main_field) = read_main_field(&package_json_path, config)? {
      let main_candidate = dir.join(&main_field);
      if let Some(found) = resolve_file_or_dir_no_recurse(&main_candidate, config) {
        return Ok(Some(found));
      }
    }
  }

  let index = dir.join("index");
  if let Some(found) = try_extensions(&index, &config.extensions) {
    return Ok(Some(found));
  }
  if index.is_file() {
    return Ok(Some(index));
  }
  Ok(None)
}

/// `resolve_directory`'s `main`/`index` candidate must not itself recurse
/// into another package.json lookup (Node doesn't chase `main` fields
/// transitively), but it should still try extensions and an `index` file
/// if `main` points at a directory.
fn resolve_file_or_dir_no_recurse(
  candidate: &Path,
  config: &ResolverConfig,
) -> Option<PathBuf> {
  if candidate.is_file() {
    return Some(candidate.to_path_buf());
  }
  if let Some(found) = try_extensions(candidate, &config.extensions) {
    return Some(found);
  }
  if candidate.is_dir() {
    let index = candidate.join("index");
    if let Some(found) = try_extensions(&index, &config.extensions) {
      return Some(found);
    }
    if index.is_file() {
      return Some(index);
    }
  }
  None
}

/// Reads `"browser"` (when `config.browser` is set) falling back to
/// `"main"`, per the distilled spec's "browser variant... fields like
/// `browser` in package.json redirect the result."
fn read_main_field(
  package_json_path: &Path,
  config: &ResolverConfig,
) -> Result<Option<String>, ResolverError> {
  let contents =
    std::fs::read_to_string(package_json_path).map_err(|source| ResolverError::Io {
      path: package_json_path.to_path_buf(),
      source,
    })?;
  let json: Value =
    serde_json::from_str(&contents).map_err(|source| ResolverError::InvalidPackageJson {
      path: package_json_path.to_path_buf(),
      source,
    })?;

  if config.browser {
    if let Some(browser) = json.get("browser") {
      if let Some(s) = browser.as_str() {
        return Ok(Some(s.to_string()));
      }
      // Object form remaps individual specifiers; the package's own main
      // entry point redirect (what resolveModule needs) is the `"."`/self
      // mapping when present, otherwise fall through to `"main"`.
      if let Some(map) = browser.as_object() {
        if let Some(Value::String(redirect)) = map.get(".") {
          return Ok(Some(redirect.clone()));
        }
      }
    }
  }

  Ok(json.get("main").and_then(|m| m.as_str()).map(|s| s.to_string()))
}
