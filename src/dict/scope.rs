use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::dict::{TypeDesc, Value};

/// One named entry of a lookup scope.
#[derive(Debug, Clone)]
pub enum Binding {
	/// Name bound to a type; participates in forward-reference lookup.
	Type(TypeDesc),
	/// Ordinary value; ignored by lookup and by scope equivalence.
	Value(Value),
}

/// Read-only lookup table used to resolve forward references.
#[derive(Debug, Clone, Default)]
pub struct Scope {
	bindings: BTreeMap<Box<str>, Binding>,
}

impl Scope {
	/// Empty scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`Scope::insert_type`].
	pub fn with_type(mut self, name: &str, ty: TypeDesc) -> Self {
		self.insert_type(name, ty);
		self
	}

	/// Builder form of [`Scope::insert_value`].
	pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.insert_value(name, value);
		self
	}

	/// Bind a name to a type.
	pub fn insert_type(&mut self, name: &str, ty: TypeDesc) {
		self.bindings.insert(name.into(), Binding::Type(ty));
	}

	/// Bind a name to an ordinary value.
	pub fn insert_value(&mut self, name: &str, value: impl Into<Value>) {
		self.bindings.insert(name.into(), Binding::Value(value.into()));
	}

	/// Look up any binding.
	pub fn get(&self, name: &str) -> Option<&Binding> {
		self.bindings.get(name)
	}

	fn type_entries(&self) -> BTreeMap<Box<str>, TypeDesc> {
		self.bindings
			.iter()
			.filter_map(|(name, binding)| match binding {
				Binding::Type(ty) => Some((name.clone(), ty.clone())),
				Binding::Value(_) => None,
			})
			.collect()
	}
}

/// Type-bearing reduction of a (global, local) scope pair.
///
/// Equality and hashing only consider type bindings, so scopes that differ in
/// ordinary values or container identity map to the same cache entries.
#[derive(Debug, Clone)]
pub struct ScopeTypes {
	global: Option<BTreeMap<Box<str>, TypeDesc>>,
	local: Option<BTreeMap<Box<str>, TypeDesc>>,
	hash: u64,
}

impl ScopeTypes {
	/// Reduce the given scopes to their type bindings.
	pub fn new(global: Option<&Scope>, local: Option<&Scope>) -> Self {
		let global = global.map(Scope::type_entries);
		let local = local.map(Scope::type_entries);
		let mut hasher = DefaultHasher::new();
		global.hash(&mut hasher);
		local.hash(&mut hasher);
		Self {
			global,
			local,
			hash: hasher.finish(),
		}
	}

	/// No scopes supplied.
	pub fn empty() -> Self {
		Self::new(None, None)
	}

	/// Look up a type name, local scope first.
	pub fn lookup(&self, name: &str) -> Option<&TypeDesc> {
		self.local
			.as_ref()
			.and_then(|local| local.get(name))
			.or_else(|| self.global.as_ref().and_then(|global| global.get(name)))
	}

	/// Type bindings of the global scope.
	pub fn global_types(&self) -> Option<&BTreeMap<Box<str>, TypeDesc>> {
		self.global.as_ref()
	}

	/// Type bindings of the local scope.
	pub fn local_types(&self) -> Option<&BTreeMap<Box<str>, TypeDesc>> {
		self.local.as_ref()
	}
}

impl PartialEq for ScopeTypes {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self, other) || (self.hash == other.hash && self.global == other.global && self.local == other.local)
	}
}

impl Eq for ScopeTypes {}

impl Hash for ScopeTypes {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.hash);
	}
}
