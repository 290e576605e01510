// Copyright 2018-2026 the Deno authors. MIT license.
//
// `MockMetadataTooling` is the seam to the out-of-scope mock metadata
// extractor/generator (SPEC_FULL.md §1, §6): `getMetadata(value) → Metadata |
// null`, `generateFromMetadata(meta) → any`, `getMockFunction()`,
// `isMockFunction(v)`.

use indexmap::IndexMap;

use crate::value::JsValue;
use crate::value::LeafValue;
use crate::value::Metadata;
use crate::value::MockFn;

pub trait MockMetadataTooling {
  fn get_metadata(&self, value: &JsValue) -> Option<Metadata>;
  fn generate_from_metadata(&self, meta: &Metadata) -> JsValue;
  fn make_mock_function(&self) -> MockFn;
  fn is_mock_function(&self, value: &JsValue) -> bool;
}

/// Walks a [`JsValue`] directly: functions become `Metadata::Function`,
/// containers recurse, everything else is a `Leaf`. This is the reflection
/// a real extractor performs against live sandbox objects; here the
/// "object" already is the structural `JsValue` this crate defines, so
/// there is nothing external left to introspect.
#[derive(Debug, Default)]
pub struct StructuralMockMetadata;

impl MockMetadataTooling for StructuralMockMetadata {
  fn get_metadata(&self, value: &JsValue) -> Option<Metadata> {
    Some(match value {
      JsValue::Undefined => Metadata::Leaf(LeafValue::Undefined),
      JsValue::Null => Metadata::Leaf(LeafValue::Null),
      JsValue::Bool(b) => Metadata::Leaf(LeafValue::Bool(*b)),
      JsValue::Number(n) => Metadata::Leaf(LeafValue::Number(*n)),
      JsValue::String(s) => Metadata::Leaf(LeafValue::String(s.clone())),
      JsValue::Array(items) => Metadata::Array(
        items
          .iter()
          .map(|item| self.get_metadata(item).unwrap_or(Metadata::Leaf(LeafValue::Undefined)))
          .collect(),
      ),
      JsValue::Object(map) => {
        let mut members = IndexMap::new();
        for (key, val) in map {
          members.insert(
            key.clone(),
            self
              .get_metadata(val)
              .unwrap_or(Metadata::Leaf(LeafValue::Undefined)),
          );
        }
        Metadata::Object(members)
      }
      JsValue::Function(_) => Metadata::Function { name: None },
    })
  }

  fn generate_from_metadata(&self, meta: &Metadata) -> JsValue {
    match meta {
      Metadata::Leaf(leaf) => leaf.clone().into(),
      Metadata::Array(items) => {
        JsValue::Array(items.iter().map(|item| self.generate_from_metadata(item)).collect())
      }
      Metadata::Object(members) => {
        let mut out = IndexMap::new();
        for (key, val) in members {
          out.insert(key.clone(), self.generate_from_metadata(val));
        }
        JsValue::Object(out)
      }
      Metadata::Function { .. } => JsValue::Function(self.make_mock_function()),
    }
  }

  fn make_mock_function(&self) -> MockFn {
    MockFn::new(None)
  }

  fn is_mock_function(&self, value: &JsValue) -> bool {
    // Every `MockFn` produced by this tooling carries no distinguishing tag
    // beyond being a `JsValue::Function` whose handle originated from
    // `make_mock_function`/automock; since real (non-mock) functions never
    // appear as `JsValue::Function` in this crate (there is no JS engine to
    // produce one), any function value here is a mock.
    matches!(value, JsValue::Function(_))
  }
}
