//! Ordered, typed tree used as the payload of every tracked item and delta.

use serde::{Deserialize, Serialize};

/// A typed property value stored on a [`SerializedTree`] node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Loose read as bool. Numbers are truthy when non-zero; strings accept
    /// `"true"`/`"1"`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Int64(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::String(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i as i64),
            Value::Int64(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(*f as i64),
            Value::Float(_) => None,
            Value::String(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Int64(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse().ok(),
        }
    }

    /// Borrow the string content. Non-string values return `None`;
    /// use [`Value::to_text`] for a lossy conversion.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    /// Equality used by tree equivalence: numeric variants compare by value,
    /// so an `Int(4)` read back as `Int64(4)` is still the same property.
    pub fn is_equivalent_to(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(_), _) | (_, Value::String(_)) => false,
            (Value::Bool(_), _) | (_, Value::Bool(_)) => false,
            (Value::Float(_), _) | (_, Value::Float(_)) => match (self.as_f64(), other.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A node with a type tag, ordered named properties and ordered children.
///
/// Absence of a tree (no prior state) is expressed as `Option<SerializedTree>`;
/// a present tree with no children is an *empty* state, which diff routines
/// treat differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTree {
    type_tag: String,
    #[serde(default)]
    properties: Vec<(String, Value)>,
    #[serde(default)]
    children: Vec<SerializedTree>,
}

impl SerializedTree {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.type_tag == tag
    }

    /// Set a property, replacing an existing one of the same name in place.
    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    /// Builder form of [`SerializedTree::set_property`].
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        let idx = self.properties.iter().position(|(n, _)| n == name)?;
        Some(self.properties.remove(idx).1)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn num_properties(&self) -> usize {
        self.properties.len()
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.property(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_int(&self, name: &str, default: i32) -> i32 {
        self.property(name).and_then(Value::as_i32).unwrap_or(default)
    }

    pub fn get_int64(&self, name: &str, default: i64) -> i64 {
        self.property(name).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn get_float(&self, name: &str, default: f32) -> f32 {
        self.property(name)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.property(name)
            .map(Value::to_text)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn append_child(&mut self, child: SerializedTree) {
        self.children.push(child);
    }

    /// Builder form of [`SerializedTree::append_child`].
    pub fn with_child(mut self, child: SerializedTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, index: usize) -> Option<&SerializedTree> {
        self.children.get(index)
    }

    pub fn children(&self) -> &[SerializedTree] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// First child with the given type tag.
    pub fn child_with_type(&self, tag: &str) -> Option<&SerializedTree> {
        self.children.iter().find(|c| c.has_type(tag))
    }

    pub fn children_with_type<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a SerializedTree> + 'a {
        self.children.iter().filter(move |c| c.has_type(tag))
    }

    /// Structural equality: same tag, same property set by name (order
    /// ignored) with equivalent values, same children in the same order.
    pub fn is_equivalent_to(&self, other: &SerializedTree) -> bool {
        if self.type_tag != other.type_tag
            || self.properties.len() != other.properties.len()
            || self.children.len() != other.children.len()
        {
            return false;
        }

        let properties_match = self.properties.iter().all(|(name, value)| {
            other
                .property(name)
                .is_some_and(|v| value.is_equivalent_to(v))
        });

        properties_match
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.is_equivalent_to(b))
    }
}
