use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dict::check::type_check;
use crate::dict::{FieldPath, FromDictError, Map, PathStep, ResolutionCache, Resolver, Result, Scope, ScopeTypes, StructDef, TypeDesc, Value};

/// Behavior switches for one decode call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
	/// Validate every decoded field against its declared type.
	pub check_types: bool,
	/// Copy leftover input keys into the result's attribute bag.
	pub copy_unknown: bool,
	/// Fail when leftover input keys remain.
	pub error_on_unknown: bool,
	/// Global lookup table for forward references.
	#[serde(skip)]
	pub global_scope: Option<Arc<Scope>>,
	/// Local lookup table for forward references; consulted before the global one.
	#[serde(skip)]
	pub local_scope: Option<Arc<Scope>>,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			check_types: false,
			copy_unknown: true,
			error_on_unknown: false,
			global_scope: None,
			local_scope: None,
		}
	}
}

impl DecodeOptions {
	/// Preset that validates types and rejects unknown keys.
	pub fn strict() -> Self {
		Self {
			check_types: true,
			copy_unknown: false,
			error_on_unknown: true,
			global_scope: None,
			local_scope: None,
		}
	}

	/// Attach a local scope.
	pub fn with_local_scope(mut self, scope: Scope) -> Self {
		self.local_scope = Some(Arc::new(scope));
		self
	}

	/// Attach a global scope.
	pub fn with_global_scope(mut self, scope: Scope) -> Self {
		self.global_scope = Some(Arc::new(scope));
		self
	}

	/// Type-bearing snapshot of the attached scopes.
	pub fn scope_types(&self) -> ScopeTypes {
		ScopeTypes::new(self.global_scope.as_deref(), self.local_scope.as_deref())
	}
}

/// Entry point bound to one resolution cache.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'c> {
	cache: &'c ResolutionCache,
}

impl<'c> Decoder<'c> {
	/// Decoder memoizing through `cache`.
	pub fn new(cache: &'c ResolutionCache) -> Self {
		Self { cache }
	}

	/// Decoder using the process-wide cache.
	pub fn shared() -> Decoder<'static> {
		Decoder::new(ResolutionCache::shared())
	}

	/// Cache used by this decoder.
	pub fn cache(&self) -> &'c ResolutionCache {
		self.cache
	}

	/// Build an instance of `target` from `source` with `overrides` merged on top.
	///
	/// An absent or null source is treated as an empty mapping.
	pub fn decode(&self, target: &TypeDesc, source: Option<&Value>, overrides: Map, opt: &DecodeOptions) -> Result<Value> {
		let mut given = match source {
			None | Some(Value::Null) => Map::new(),
			Some(Value::Map(map)) => map.clone(),
			Some(other) => {
				return Err(FromDictError::InvalidInput {
					found: other.kind_name().to_owned(),
				});
			}
		};
		given.extend(overrides);

		let walk = Walk {
			resolver: Resolver::new(self.cache, Arc::new(opt.scope_types())),
			opt,
		};
		let target = walk.resolver.resolve(target, None)?;
		walk.decode_struct(&target, given)
	}

	/// Validate an already decoded value against `target`.
	pub fn check(&self, target: &TypeDesc, value: &Value, opt: &DecodeOptions) -> Result<()> {
		let resolver = Resolver::new(self.cache, Arc::new(opt.scope_types()));
		type_check(&resolver, None, &FieldPath::root(), value, target)
	}
}

/// Build an instance of `target` from a mapping using the process-wide cache.
pub fn from_dict(target: &TypeDesc, source: &Value, opt: &DecodeOptions) -> Result<Value> {
	Decoder::shared().decode(target, Some(source), Map::new(), opt)
}

/// Like [`from_dict`], with `overrides` merged over the source before decoding.
pub fn from_dict_with_overrides(target: &TypeDesc, source: Option<&Value>, overrides: Map, opt: &DecodeOptions) -> Result<Value> {
	Decoder::shared().decode(target, source, overrides, opt)
}

/// Decode, then deserialize the resulting object graph into a Rust type.
pub fn from_dict_into<T: DeserializeOwned>(target: &TypeDesc, source: &Value, opt: &DecodeOptions) -> Result<T> {
	let value = from_dict(target, source, opt)?;
	Ok(serde_json::from_value(value.to_json())?)
}

struct Walk<'a> {
	resolver: Resolver<'a>,
	opt: &'a DecodeOptions,
}

impl Walk<'_> {
	fn decode_struct(&self, target: &TypeDesc, mut given: Map) -> Result<Value> {
		let fields = self.resolver.fields(target)?;
		let def = target.as_struct().ok_or_else(|| FromDictError::UnsupportedType { type_name: target.to_string() })?;

		let mut args = Vec::with_capacity(fields.len());
		for (name, ty) in fields.iter() {
			let Some(raw) = given.remove_str(name) else {
				continue;
			};

			let value = self.decode_item(def, ty, raw).map_err(|err| err.with_prefix(PathStep::Field(name.to_owned())))?;
			if self.opt.check_types {
				type_check(&self.resolver, Some(def), &FieldPath::field(name), &value, ty)?;
			}
			args.push((name.to_owned(), value));
		}

		let mut created = def.construct(args)?;
		if given.is_empty() {
			return Ok(created);
		}

		if self.opt.error_on_unknown {
			return Err(FromDictError::UnknownArguments {
				type_name: def.name.to_string(),
				keys: given.keys().map(Value::key_text).collect(),
			});
		}

		if !self.opt.copy_unknown {
			tracing::trace!(type_name = %def.name, dropped = given.len(), "dropped unknown keys");
			return Ok(created);
		}

		if let Value::Object(object) = &mut created {
			for (key, value) in given {
				if object.insert_extra_if_absent(key, value) {
					tracing::trace!(type_name = %def.name, "copied unknown key into attribute bag");
				}
			}
		}
		Ok(created)
	}

	fn decode_item(&self, owner: &Arc<StructDef>, declared: &TypeDesc, raw: Value) -> Result<Value> {
		match raw {
			Value::Map(map) if !map.is_empty() => {
				let ty = self.resolver.resolve(declared, Some(owner))?;
				self.decode_map(owner, &ty, map)
			}
			Value::List(items) if !items.is_empty() => {
				let ty = self.resolver.resolve(declared, Some(owner))?;
				self.decode_list(owner, &ty, items)
			}
			other => Ok(other),
		}
	}

	fn decode_map(&self, owner: &Arc<StructDef>, ty: &TypeDesc, map: Map) -> Result<Value> {
		match ty {
			ty if ty.is_structure() => self.decode_struct(ty, map),
			TypeDesc::Map(_, value_ty) => self.decode_entries(owner, value_ty, map),
			TypeDesc::Union(alternatives) => self.decode_union_map(owner, alternatives, map),
			_ => Ok(Value::Map(map)),
		}
	}

	fn decode_list(&self, owner: &Arc<StructDef>, ty: &TypeDesc, items: Vec<Value>) -> Result<Value> {
		match ty {
			TypeDesc::List(element) => self.decode_elements(owner, element, items),
			TypeDesc::Union(alternatives) => self.decode_union_list(owner, alternatives, items),
			_ => Ok(Value::List(items)),
		}
	}

	fn decode_entries(&self, owner: &Arc<StructDef>, value_ty: &TypeDesc, map: Map) -> Result<Value> {
		let value_ty = self.resolver.resolve(value_ty, Some(owner))?;
		if !needs_decoding(&value_ty) {
			return Ok(Value::Map(map));
		}

		let mut out = Map::new();
		for (key, value) in map {
			let decoded = self
				.decode_member(owner, &value_ty, value)
				.map_err(|err| err.with_prefix(PathStep::Key(key.render_key())))?;
			out.push(key, decoded);
		}
		Ok(Value::Map(out))
	}

	fn decode_elements(&self, owner: &Arc<StructDef>, element: &TypeDesc, items: Vec<Value>) -> Result<Value> {
		let element = self.resolver.resolve(element, Some(owner))?;
		if !needs_decoding(&element) {
			return Ok(Value::List(items));
		}

		items
			.into_iter()
			.enumerate()
			.map(|(idx, item)| self.decode_member(owner, &element, item).map_err(|err| err.with_prefix(PathStep::Index(idx))))
			.collect::<Result<Vec<_>>>()
			.map(Value::List)
	}

	/// Container member: unlike a field, an empty mapping still constructs a structure.
	fn decode_member(&self, owner: &Arc<StructDef>, ty: &TypeDesc, raw: Value) -> Result<Value> {
		match (ty, raw) {
			(TypeDesc::Union(alternatives), Value::Map(map)) => self.decode_union_map(owner, alternatives, map),
			(TypeDesc::Union(alternatives), Value::List(items)) => self.decode_union_list(owner, alternatives, items),
			(ty, Value::Map(map)) if ty.is_structure() => self.decode_struct(ty, map),
			(TypeDesc::List(_) | TypeDesc::Map(..), raw) => self.decode_item(owner, ty, raw),
			(_, raw) => Ok(raw),
		}
	}

	fn decode_union_map(&self, owner: &Arc<StructDef>, alternatives: &[TypeDesc], map: Map) -> Result<Value> {
		for alternative in alternatives.iter().filter(|alt| !alt.is_none_type()) {
			let alternative = self.resolver.resolve(alternative, Some(owner))?;
			if let TypeDesc::Map(_, value_ty) = &*alternative {
				return self.decode_entries(owner, value_ty, map);
			}

			let Some(fields) = self.resolver.try_fields(&alternative) else {
				continue;
			};
			if !map.keys().all(|key| key.as_str().is_some_and(|name| fields.contains(name))) {
				continue;
			}

			match self.decode_struct(&alternative, map.clone()) {
				Ok(value) => return Ok(value),
				Err(err) => tracing::debug!(%alternative, error = %err, "union alternative rejected"),
			}
		}
		Ok(Value::Map(map))
	}

	fn decode_union_list(&self, owner: &Arc<StructDef>, alternatives: &[TypeDesc], items: Vec<Value>) -> Result<Value> {
		for alternative in alternatives.iter().filter(|alt| !alt.is_none_type()) {
			let alternative = self.resolver.resolve(alternative, Some(owner))?;
			let TypeDesc::List(element) = &*alternative else {
				continue;
			};

			match self.decode_elements(owner, element, items.clone()) {
				Ok(value) => return Ok(value),
				Err(err) => tracing::debug!(%alternative, error = %err, "union alternative rejected"),
			}
		}
		Ok(Value::List(items))
	}
}

/// Whether members of this type can change shape when decoded.
fn needs_decoding(ty: &TypeDesc) -> bool {
	ty.is_structure() || matches!(ty, TypeDesc::Union(_) | TypeDesc::List(_) | TypeDesc::Map(..))
}
