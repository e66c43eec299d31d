use std::borrow::Cow;
use std::sync::Arc;

use crate::dict::cache::{FieldEntries, FieldsKey, RefKey};
use crate::dict::{Describe, FromDictError, ResolutionCache, Result, ScopeTypes, StructDef, StructRef, TypeDesc};

/// Resolved, ordered field schema of one structure type.
///
/// Fields declared as the null type are excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
	entries: FieldEntries,
}

impl FieldMap {
	/// Iterate `(name, declared type)` pairs in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDesc)> {
		self.entries.iter().map(|(name, ty)| (&**name, ty))
	}

	/// Declared type of a field.
	pub fn get(&self, name: &str) -> Option<&TypeDesc> {
		self.entries.iter().find(|(field, _)| &**field == name).map(|(_, ty)| ty)
	}

	/// Whether a field with this name exists.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Field names in declaration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| &**name)
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no fields.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Field-map and forward-reference resolution against one scope snapshot.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
	cache: &'a ResolutionCache,
	scope: Arc<ScopeTypes>,
}

impl<'a> Resolver<'a> {
	/// Resolver memoizing through `cache`.
	pub fn new(cache: &'a ResolutionCache, scope: Arc<ScopeTypes>) -> Self {
		Self { cache, scope }
	}

	/// Scope snapshot used for lookups.
	pub fn scope(&self) -> &ScopeTypes {
		&self.scope
	}

	/// Field schema of a structure type.
	///
	/// A forward-reference target is resolved first. Field types are left as
	/// declared; forward references inside them resolve lazily on use.
	pub fn fields(&self, ty: &TypeDesc) -> Result<FieldMap> {
		let key = FieldsKey {
			ty: ty.clone(),
			scope: Arc::clone(&self.scope),
		};
		let entries = self.cache.fields_or_insert_with(key, || -> Result<FieldEntries> {
			let target = self.resolve(ty, None)?;
			let described = target.describe_fields().unwrap_or_default();
			let entries: Vec<(Box<str>, TypeDesc)> = described.into_iter().filter(|(_, ty)| !ty.is_none_type()).collect();
			if entries.is_empty() {
				return Err(FromDictError::UnsupportedType { type_name: target.to_string() });
			}
			Ok(FieldEntries::from(entries))
		})?;
		Ok(FieldMap { entries })
	}

	/// Field schema, or `None` when the type is opaque or cannot be resolved.
	pub fn try_fields(&self, ty: &TypeDesc) -> Option<FieldMap> {
		self.fields(ty).ok()
	}

	/// Resolve a forward reference; other types are borrowed unchanged.
	pub fn resolve<'t>(&self, ty: &'t TypeDesc, owner: Option<&Arc<StructDef>>) -> Result<Cow<'t, TypeDesc>> {
		match ty {
			TypeDesc::Ref(name) => self.resolve_name(name, owner).map(Cow::Owned),
			other => Ok(Cow::Borrowed(other)),
		}
	}

	/// Look a name up in the local scope, the global scope, then the owner's declaring module.
	pub fn resolve_name(&self, name: &str, owner: Option<&Arc<StructDef>>) -> Result<TypeDesc> {
		let key = RefKey {
			name: name.into(),
			owner: owner.cloned().map(StructRef::new),
			scope: Arc::clone(&self.scope),
		};
		self.cache.ref_or_insert_with(key, || -> Result<TypeDesc> {
			if let Some(ty) = self.scope.lookup(name) {
				return Ok(ty.clone());
			}
			owner
				.and_then(|def| def.module())
				.and_then(|module| module.lookup(name))
				.ok_or_else(|| FromDictError::UnresolvedReference { name: name.to_owned() })
		})
	}
}

#[cfg(test)]
mod tests;
