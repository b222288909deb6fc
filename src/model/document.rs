use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ID_FIELD, REFERENCE_TYPE, REF_FIELD, TYPE_FIELD, WEAK_FIELD};

/// A document as returned by the store: an opaque JSON tree with `_id` and `_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub Value);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.0.get(TYPE_FIELD).and_then(Value::as_str)
    }

    /// Best display label: `title`, then `name`
    pub fn title(&self) -> Option<&str> {
        self.0
            .get("title")
            .and_then(Value::as_str)
            .or_else(|| self.0.get("name").and_then(Value::as_str))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The parts of a reference descriptor the converter cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDescriptor<'a> {
    pub target_id: &'a str,
    pub weak: bool,
}

/// Closed classification of a JSON node, computed once before recursion
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Reference(ReferenceDescriptor<'a>),
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Scalar(&'a Value),
    Null,
}

impl<'a> Node<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => match ReferenceDescriptor::from_map(map) {
                Some(descriptor) => Node::Reference(descriptor),
                None => Node::Object(map),
            },
            Value::Array(items) => Node::Array(items),
            Value::Null => Node::Null,
            scalar => Node::Scalar(scalar),
        }
    }
}

impl<'a> ReferenceDescriptor<'a> {
    /// `_type == "reference"` with a non-empty string `_ref`. Only a literal `true` marks it weak.
    pub fn from_map(map: &'a Map<String, Value>) -> Option<Self> {
        if map.get(TYPE_FIELD).and_then(Value::as_str) != Some(REFERENCE_TYPE) {
            return None;
        }
        let target_id = map
            .get(REF_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())?;
        let weak = matches!(map.get(WEAK_FIELD), Some(Value::Bool(true)));
        Some(Self { target_id, weak })
    }
}
