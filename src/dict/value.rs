use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dict::StructDef;

/// Dynamic value: decoder input and decoded output.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Explicit null marker.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	Int(i64),
	/// Floating point scalar.
	Float(f64),
	/// String scalar.
	Str(Box<str>),
	/// Heterogeneous sequence.
	List(Vec<Value>),
	/// Insertion-ordered mapping.
	Map(Map),
	/// Constructed structure instance.
	Object(ObjectValue),
}

impl Value {
	/// String value from anything string-like.
	pub fn str(value: impl Into<Box<str>>) -> Self {
		Self::Str(value.into())
	}

	/// Runtime type name used in diagnostics.
	pub fn kind_name(&self) -> &str {
		match self {
			Self::Null => "NoneType",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::Str(_) => "str",
			Self::List(_) => "list",
			Self::Map(_) => "dict",
			Self::Object(object) => object.type_name(),
		}
	}

	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Borrow as string slice.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(value) => Some(value),
			_ => None,
		}
	}

	/// Read as integer.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Borrow as sequence.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow as mapping.
	pub fn as_map(&self) -> Option<&Map> {
		match self {
			Self::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Borrow as constructed object.
	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Render as a mapping key inside a location, e.g. `'C'` or `11`.
	pub fn render_key(&self) -> String {
		match self {
			Self::Str(value) => format!("'{value}'"),
			other => other.key_text(),
		}
	}

	/// Render a key the way it is listed in unknown-argument reports.
	pub fn key_text(&self) -> String {
		match self {
			Self::Null => "None".to_owned(),
			Self::Bool(true) => "True".to_owned(),
			Self::Bool(false) => "False".to_owned(),
			Self::Int(value) => value.to_string(),
			Self::Float(value) => value.to_string(),
			Self::Str(value) => value.to_string(),
			other => format!("<{}>", other.kind_name()),
		}
	}

	/// Convert to JSON; objects become JSON objects of fields followed by bag entries.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Null => serde_json::Value::Null,
			Self::Bool(value) => serde_json::Value::Bool(*value),
			Self::Int(value) => serde_json::Value::from(*value),
			Self::Float(value) => serde_json::Number::from_f64(*value).map_or(serde_json::Value::Null, serde_json::Value::Number),
			Self::Str(value) => serde_json::Value::String(value.to_string()),
			Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
			Self::Map(map) => serde_json::Value::Object(map.iter().map(|(key, value)| (key.key_text(), value.to_json())).collect()),
			Self::Object(object) => {
				let mut out = serde_json::Map::new();
				for field in &object.fields {
					out.insert(field.name.to_string(), field.value.to_json());
				}
				if let Some(extra) = &object.extra {
					for (key, value) in extra.iter() {
						out.entry(key.key_text()).or_insert_with(|| value.to_json());
					}
				}
				serde_json::Value::Object(out)
			}
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => match number.as_i64() {
				Some(value) => Self::Int(value),
				None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(value) => Self::Str(value.into_boxed_str()),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(entries) => {
				let mut map = Map::with_capacity(entries.len());
				for (key, value) in entries {
					map.push(Self::Str(key.into_boxed_str()), Self::from(value));
				}
				Self::Map(map)
			}
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Str(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Str(value.into_boxed_str())
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::List(items)
	}
}

impl From<Map> for Value {
	fn from(map: Map) -> Self {
		Self::Map(map)
	}
}

impl From<ObjectValue> for Value {
	fn from(object: ObjectValue) -> Self {
		Self::Object(object)
	}
}

/// Insertion-ordered mapping with arbitrary scalar keys.
///
/// String, integer, boolean and null keys are hashed; other keys fall back to
/// a scan. Equality ignores entry order, like a dictionary.
#[derive(Clone, Default)]
pub struct Map {
	entries: Vec<(Value, Value)>,
	index: KeyIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ScalarKey {
	Null,
	Bool(bool),
	Int(i64),
}

impl ScalarKey {
	fn of(value: &Value) -> Option<Self> {
		match value {
			Value::Null => Some(Self::Null),
			Value::Bool(value) => Some(Self::Bool(*value)),
			Value::Int(value) => Some(Self::Int(*value)),
			_ => None,
		}
	}
}

/// Entry positions by key.
#[derive(Debug, Clone, Default)]
struct KeyIndex {
	strings: HashMap<Box<str>, usize>,
	scalars: HashMap<ScalarKey, usize>,
}

impl KeyIndex {
	fn with_capacity(capacity: usize) -> Self {
		Self {
			strings: HashMap::with_capacity(capacity),
			scalars: HashMap::new(),
		}
	}

	fn record(&mut self, key: &Value, pos: usize) {
		match key {
			Value::Str(name) => {
				self.strings.insert(name.clone(), pos);
			}
			other => {
				if let Some(scalar) = ScalarKey::of(other) {
					self.scalars.insert(scalar, pos);
				}
			}
		}
	}

	/// Drop `key` and close the gap left at `pos`.
	fn remove(&mut self, key: &Value, pos: usize) {
		match key {
			Value::Str(name) => {
				self.strings.remove(&**name);
			}
			other => {
				if let Some(scalar) = ScalarKey::of(other) {
					self.scalars.remove(&scalar);
				}
			}
		}
		for slot in self.strings.values_mut().chain(self.scalars.values_mut()) {
			if *slot > pos {
				*slot -= 1;
			}
		}
	}
}

impl Map {
	/// Empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty mapping with room for `capacity` entries.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: Vec::with_capacity(capacity),
			index: KeyIndex::with_capacity(capacity),
		}
	}

	fn position(&self, key: &Value) -> Option<usize> {
		match key {
			Value::Str(name) => self.position_str(name),
			other => match ScalarKey::of(other) {
				Some(scalar) => self.index.scalars.get(&scalar).copied(),
				None => self.entries.iter().position(|(existing, _)| existing == key),
			},
		}
	}

	fn position_str(&self, key: &str) -> Option<usize> {
		self.index.strings.get(key).copied()
	}

	/// Insert or replace; a replaced entry keeps its position.
	pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
		let key = key.into();
		let value = value.into();
		match self.position(&key) {
			Some(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
			None => {
				self.push(key, value);
				None
			}
		}
	}

	/// Append without searching for an equal key; the caller guarantees `key` is new.
	pub(crate) fn push(&mut self, key: Value, value: Value) {
		self.index.record(&key, self.entries.len());
		self.entries.push((key, value));
	}

	/// Look up by key.
	pub fn get(&self, key: &Value) -> Option<&Value> {
		self.position(key).map(|pos| &self.entries[pos].1)
	}

	/// Look up by string key.
	pub fn get_str(&self, key: &str) -> Option<&Value> {
		self.position_str(key).map(|pos| &self.entries[pos].1)
	}

	/// Whether an equal key exists.
	pub fn contains_key(&self, key: &Value) -> bool {
		self.position(key).is_some()
	}

	/// Remove an entry by key; later entries keep their relative order.
	pub fn remove(&mut self, key: &Value) -> Option<Value> {
		let pos = self.position(key)?;
		Some(self.remove_at(pos))
	}

	/// Remove an entry by string key.
	pub fn remove_str(&mut self, key: &str) -> Option<Value> {
		let pos = self.position_str(key)?;
		Some(self.remove_at(pos))
	}

	fn remove_at(&mut self, pos: usize) -> Value {
		let (key, value) = self.entries.remove(pos);
		self.index.remove(&key, pos);
		value
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the mapping is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
		self.entries.iter().map(|(key, value)| (key, value))
	}

	/// Iterate keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &Value> {
		self.entries.iter().map(|(key, _)| key)
	}
}

impl PartialEq for Map {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
	}
}

impl fmt::Debug for Map {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut map = Self::new();
		map.extend(iter);
		map
	}
}

impl<K: Into<Value>, V: Into<Value>> Extend<(K, V)> for Map {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl IntoIterator for Map {
	type Item = (Value, Value);
	type IntoIter = std::vec::IntoIter<(Value, Value)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

/// Constructed structure instance.
#[derive(Clone)]
pub struct ObjectValue {
	/// Structure this object instantiates.
	pub def: Arc<StructDef>,
	/// Constructed field values in constructor order.
	pub fields: Vec<FieldValue>,
	/// Extensible attribute bag; `None` when the structure accepts no extra attributes.
	pub extra: Option<Map>,
}

/// Named constructed field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field identifier.
	pub name: Box<str>,
	/// Field payload.
	pub value: Value,
}

impl ObjectValue {
	/// Object with the given fields and an empty bag when `def` is extensible.
	pub fn new(def: Arc<StructDef>, fields: Vec<FieldValue>) -> Self {
		let extra = def.extensible.then(Map::new);
		Self { def, fields, extra }
	}

	/// Name of the instantiated structure.
	pub fn type_name(&self) -> &str {
		&self.def.name
	}

	/// Constructed field by name.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| &*field.name == name).map(|field| &field.value)
	}

	/// Attribute lookup: constructed fields first, then the bag.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.field(name).or_else(|| self.extra.as_ref().and_then(|extra| extra.get_str(name)))
	}

	/// Add a bag entry unless the object has no bag or already carries the attribute.
	pub fn insert_extra_if_absent(&mut self, key: Value, value: Value) -> bool {
		if key.as_str().is_some_and(|name| self.field(name).is_some()) {
			return false;
		}
		let Some(extra) = self.extra.as_mut() else {
			return false;
		};
		if extra.contains_key(&key) {
			return false;
		}
		extra.insert(key, value);
		true
	}
}

impl PartialEq for ObjectValue {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.def, &other.def) && self.fields == other.fields && self.extra == other.extra
	}
}

impl fmt::Debug for ObjectValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectValue")
			.field("type_name", &self.type_name())
			.field("fields", &self.fields)
			.field("extra", &self.extra)
			.finish()
	}
}
