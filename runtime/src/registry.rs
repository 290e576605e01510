// Copyright 2018-2026 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use crate::require::RequireHandle;
use crate::value::JsValue;

/// `ModuleRecord` (SPEC_FULL.md §3). Pre-registered in the module registry
/// before its body runs, so a circular `require` observes the partially
/// populated `exports` instead of recursing forever.
pub struct ModuleRecord {
  pub filename: PathBuf,
  pub exports: JsValue,
  pub children: Vec<PathBuf>,
  pub parent: Option<PathBuf>,
  pub paths: Vec<PathBuf>,
  pub require: RequireHandle,
}

impl ModuleRecord {
  pub(crate) fn new_pending(
    filename: PathBuf,
    parent: Option<PathBuf>,
    paths: Vec<PathBuf>,
    require: RequireHandle,
  ) -> Self {
    Self {
      filename,
      exports: JsValue::object(),
      children: Vec::new(),
      parent,
      paths,
      require,
    }
  }

  pub fn dirname(&self) -> &Path {
    self.filename.parent().unwrap_or(&self.filename)
  }
}
