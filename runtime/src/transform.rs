// Copyright 2018-2026 the Deno authors. MIT license.
//
// `Transformer` is the seam to the out-of-scope source transformer
// (SPEC_FULL.md §1, §6): `transform(filename, config, {isInternalModule}) →
// compiled wrapper`.

use std::path::Path;
use std::path::PathBuf;

/// Opaque result of transforming one file. What it actually contains is the
/// transformer's business; this crate only ever hands it back to the
/// `Environment` that produced the pairing.
#[derive(Debug, Clone)]
pub struct CompiledModule {
  pub id: String,
  pub source: String,
}

/// A transform failure. `is_syntax_error` drives the rewrap rule in
/// `Runtime::exec_module` (SPEC_FULL.md §4.2.4): syntax errors are
/// rewrapped with file-relative diagnostic context, everything else
/// propagates unchanged.
#[derive(Debug, Clone)]
pub struct TransformError {
  pub message: String,
  pub is_syntax_error: bool,
}

pub trait Transformer {
  fn transform(
    &self,
    filename: &Path,
    is_internal_module: bool,
  ) -> Result<CompiledModule, TransformError>;
}

/// Reads the file verbatim and uses its path as the compiled-module id.
/// Stands in for a real preprocessor (Babel/SWC/ts-jest equivalent) until an
/// embedder plugs one in; every module body in tests is addressed by path,
/// so this default is enough to drive `ScriptEnvironment`.
#[derive(Debug, Default)]
pub struct PassthroughTransformer;

impl Transformer for PassthroughTransformer {
  fn transform(
    &self,
    filename: &Path,
    _is_internal_module: bool,
  ) -> Result<CompiledModule, TransformError> {
    let source = std::fs::read_to_string(filename).map_err(|source| TransformError {
      message: format!("failed reading '{}': {source}", filename.display()),
      is_syntax_error: false,
    })?;
    Ok(CompiledModule {
      id: path_id(filename),
      source,
    })
  }
}

fn path_id(filename: &Path) -> String {
  filename.to_string_lossy().into_owned()
}

/// Helper a real `Transformer` can use to name the offending file the way
/// `Runtime::exec_module`'s syntax-error rewrap expects (SPEC_FULL.md
/// §4.2.4: "names the offending file relative to the project root").
pub fn relative_to_root(root: &Path, path: &Path) -> PathBuf {
  path
    .strip_prefix(root)
    .map(Path::to_path_buf)
    .unwrap_or_else(|_| path.to_path_buf())
}
