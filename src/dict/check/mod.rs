use std::sync::Arc;

use crate::dict::{DecodeOptions, Decoder, FieldPath, FromDictError, FromDictTypeError, PathStep, Resolver, Result, StructDef, TypeDesc, Value};

/// Depth-first conformance check of `value` against `ty`.
///
/// Fails with a [`FromDictTypeError`] naming the first offending location.
/// Forward references inside `ty` are resolved against the resolver's scopes
/// and the declaring module of `owner`.
pub fn type_check(resolver: &Resolver<'_>, owner: Option<&Arc<StructDef>>, location: &FieldPath, value: &Value, ty: &TypeDesc) -> Result<()> {
	let ty = resolver.resolve(ty, owner)?;
	let mismatch = || -> Result<()> { Err(FromDictTypeError::new(location.clone(), ty.clone().into_owned(), value).into()) };

	match &*ty {
		TypeDesc::Any | TypeDesc::Param(_) | TypeDesc::Ref(_) => Ok(()),
		TypeDesc::NoneType if value.is_null() => Ok(()),
		TypeDesc::NoneType => mismatch(),
		TypeDesc::Plain(plain) if plain.accepts(value) => Ok(()),
		TypeDesc::Plain(_) => mismatch(),
		TypeDesc::Literal(literals) if literals.iter().any(|literal| literal.matches(value)) => Ok(()),
		TypeDesc::Literal(_) => mismatch(),
		TypeDesc::Struct(expected) | TypeDesc::Generic { base: expected, .. } => match value {
			Value::Object(object) if object.def.is_subtype_of(expected.def()) => Ok(()),
			_ => mismatch(),
		},
		TypeDesc::Union(alternatives) => {
			for alternative in alternatives {
				match type_check(resolver, owner, location, value, alternative) {
					Ok(()) => return Ok(()),
					Err(FromDictError::Type(_)) => {}
					Err(other) => return Err(other),
				}
			}
			mismatch()
		}
		TypeDesc::List(element) => {
			let Value::List(items) = value else {
				return mismatch();
			};
			for (idx, item) in items.iter().enumerate() {
				type_check(resolver, owner, &location.child(PathStep::Index(idx)), item, element)?;
			}
			Ok(())
		}
		TypeDesc::Map(key_ty, value_ty) => {
			let Value::Map(map) = value else {
				return mismatch();
			};
			for (key, item) in map.iter() {
				match type_check(resolver, owner, location, key, key_ty) {
					Ok(()) => {}
					Err(FromDictError::Type(_)) => return mismatch(),
					Err(other) => return Err(other),
				}
				type_check(resolver, owner, &location.child(PathStep::Key(key.render_key())), item, value_ty)?;
			}
			Ok(())
		}
	}
}

/// Validate a decoded value against `target` using the process-wide cache.
pub fn check_value(target: &TypeDesc, value: &Value, opt: &DecodeOptions) -> Result<()> {
	Decoder::shared().check(target, value, opt)
}

#[cfg(test)]
mod tests;
