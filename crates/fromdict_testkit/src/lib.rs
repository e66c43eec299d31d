//! Shared test fixtures for workspace crates.

use std::sync::Arc;

use fromdict::dict::{ConstructError, FieldValue, Module, ObjectValue, Scope, StructDef, TypeDesc, Value};

/// Convert a `serde_json::json!` literal into a decoder input value.
pub fn value(json: serde_json::Value) -> Value {
	Value::from(json)
}

/// Outer/inner structure pair: `Main { foo: int, baz: Sub }`, `Sub { foo: int, bar: str }`.
#[derive(Debug, Clone)]
pub struct Nested {
	/// Outer structure.
	pub main: TypeDesc,
	/// Inner structure.
	pub sub: TypeDesc,
	/// Whether instances carry an attribute bag.
	pub has_bag: bool,
}

/// Nested pair declared standalone.
pub fn nested() -> Nested {
	let sub = StructDef::new("Sub").field("foo", TypeDesc::INT).field("bar", TypeDesc::STR).finish();
	let main = StructDef::new("Main").field("foo", TypeDesc::INT).field("baz", sub.clone()).finish();
	Nested {
		main,
		sub,
		has_bag: true,
	}
}

/// Nested pair registered in a module; `Main.baz` names `Sub` by forward reference.
pub fn nested_forward_ref() -> Nested {
	let module = Module::new("nested");
	let main = module.define(StructDef::new("Main").field("foo", TypeDesc::INT).field("baz", TypeDesc::named("Sub")));
	let sub = module.define(StructDef::new("Sub").field("foo", TypeDesc::INT).field("bar", TypeDesc::STR));
	Nested {
		main,
		sub,
		has_bag: true,
	}
}

/// Nested pair whose instances accept no extra attributes.
pub fn nested_closed() -> Nested {
	let sub = StructDef::new("Sub").field("foo", TypeDesc::INT).field("bar", TypeDesc::STR).closed().finish();
	let main = StructDef::new("Main").field("foo", TypeDesc::INT).field("baz", sub.clone()).closed().finish();
	Nested {
		main,
		sub,
		has_bag: false,
	}
}

/// Nested pair whose constructors validate argument kinds.
pub fn nested_validated() -> Nested {
	let sub = StructDef::new("Sub")
		.field("foo", TypeDesc::INT)
		.field("bar", TypeDesc::STR)
		.constructor(validating_constructor)
		.finish();
	let main = StructDef::new("Main")
		.field("foo", TypeDesc::INT)
		.field("baz", sub.clone())
		.constructor(validating_constructor)
		.finish();
	Nested {
		main,
		sub,
		has_bag: true,
	}
}

/// Every variant of the nested pair.
pub fn nested_variants() -> Vec<(&'static str, Nested)> {
	vec![
		("standalone", nested()),
		("forward-ref", nested_forward_ref()),
		("closed", nested_closed()),
		("validated", nested_validated()),
	]
}

/// Reject arguments whose value does not satisfy the declared plain or structure type.
fn validating_constructor(def: &Arc<StructDef>, args: Vec<(String, Value)>) -> Result<Value, ConstructError> {
	let mut fields = Vec::with_capacity(def.fields.len());
	for field in &def.fields {
		let value = args
			.iter()
			.find(|(name, _)| name.as_str() == &*field.name)
			.map(|(_, value)| value.clone())
			.ok_or_else(|| ConstructError::MissingArgument {
				type_name: def.name.to_string(),
				name: field.name.to_string(),
			})?;

		let accepted = match &field.ty {
			TypeDesc::Plain(plain) => plain.accepts(&value),
			TypeDesc::Struct(expected) => value.as_object().is_some_and(|object| object.def.is_subtype_of(expected.def())),
			_ => true,
		};
		if !accepted {
			return Err(ConstructError::Rejected {
				type_name: def.name.to_string(),
				name: field.name.to_string(),
				reason: format!("expected {} but found {}", field.ty, value.kind_name()),
			});
		}

		fields.push(FieldValue {
			name: field.name.clone(),
			value,
		});
	}
	Ok(Value::Object(ObjectValue::new(Arc::clone(def), fields)))
}

/// `Row { a: int, b: Optional[str], c: List[int], d: Dict[str, int] }`.
pub fn scalar_row() -> TypeDesc {
	StructDef::new("Row")
		.field("a", TypeDesc::INT)
		.field("b", TypeDesc::optional(TypeDesc::STR))
		.field("c", TypeDesc::list(TypeDesc::INT))
		.field("d", TypeDesc::map(TypeDesc::STR, TypeDesc::INT))
		.finish()
}

/// Self-referential `Node` with a forward-referencing field of `field_ty(Node)` shape.
///
/// Returns the structure and a local scope binding `Node`.
pub fn local_node(field: &str, field_ty: impl FnOnce(TypeDesc) -> TypeDesc) -> (TypeDesc, Scope) {
	let node = StructDef::new("Node")
		.field("name", TypeDesc::STR)
		.field(field, field_ty(TypeDesc::named("Node")))
		.finish();
	let scope = Scope::new().with_type("Node", node.clone());
	(node, scope)
}

/// `Data1 { value: int }` and `Data2 { value: str }`.
pub fn data_pair() -> (TypeDesc, TypeDesc) {
	let data1 = StructDef::new("Data1").field("value", TypeDesc::INT).finish();
	let data2 = StructDef::new("Data2").field("value", TypeDesc::STR).finish();
	(data1, data2)
}

/// Generic `Holder[T1, T2] { field_1: T1, field_2: T2, field_3: str, field_4: int }`.
pub fn generic_holder() -> TypeDesc {
	StructDef::new("Holder")
		.param("T1")
		.param("T2")
		.field("field_1", TypeDesc::param("T1"))
		.field("field_2", TypeDesc::param("T2"))
		.field("field_3", TypeDesc::STR)
		.field("field_4", TypeDesc::INT)
		.finish()
}

/// Borrow a field of a decoded object, panicking with context when absent.
pub fn field<'v>(value: &'v Value, name: &str) -> &'v Value {
	value
		.as_object()
		.unwrap_or_else(|| panic!("expected an object, found {}", value.kind_name()))
		.get(name)
		.unwrap_or_else(|| panic!("object has no attribute {name}"))
}

/// Name of the structure a decoded value instantiates.
pub fn type_name(value: &Value) -> Option<&str> {
	value.as_object().map(ObjectValue::type_name)
}
