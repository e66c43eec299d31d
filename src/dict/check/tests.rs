use std::sync::Arc;

use crate::dict::{FieldPath, FromDictError, LiteralValue, Map, ResolutionCache, Resolver, ScopeTypes, StructDef, TypeDesc, Value};

fn check(value: &Value, ty: &TypeDesc) -> Result<(), String> {
	let cache = ResolutionCache::disabled();
	let resolver = Resolver::new(&cache, Arc::new(ScopeTypes::empty()));
	type_check_at(&resolver, "field", value, ty)
}

fn type_check_at(resolver: &Resolver<'_>, location: &str, value: &Value, ty: &TypeDesc) -> Result<(), String> {
	let location = FieldPath::parse(location).expect("valid location");
	crate::dict::type_check(resolver, None, &location, value, ty).map_err(|err| err.to_string())
}

fn list(items: impl IntoIterator<Item = Value>) -> Value {
	Value::List(items.into_iter().collect())
}

#[test]
fn scalars_follow_instance_rules() {
	assert!(check(&Value::Int(1), &TypeDesc::INT).is_ok());
	assert!(check(&Value::Bool(true), &TypeDesc::INT).is_ok(), "bool counts as int");
	assert_eq!(
		check(&Value::Int(1), &TypeDesc::FLOAT),
		Err("For \"field\", expected float but found int".to_owned())
	);
	assert!(check(&Value::from("x"), &TypeDesc::Any).is_ok());
	assert!(check(&Value::Null, &TypeDesc::NoneType).is_ok());
	assert!(check(&Value::Int(0), &TypeDesc::NoneType).is_err());
}

#[test]
fn optional_accepts_null_and_inner_type() {
	let ty = TypeDesc::optional(TypeDesc::STR);
	assert!(check(&Value::Null, &ty).is_ok());
	assert!(check(&Value::from("x"), &ty).is_ok());
	assert_eq!(check(&Value::Int(1), &ty), Err("For \"field\", expected Optional[str] but found int".to_owned()));
}

#[test]
fn sequence_elements_extend_location() {
	let ty = TypeDesc::list(TypeDesc::INT);
	let value = list([Value::Int(1), Value::Int(2), Value::Int(3), Value::from("bad")]);
	assert_eq!(check(&value, &ty), Err("For \"field[3]\", expected int but found str".to_owned()));
	assert_eq!(check(&Value::from("text"), &ty), Err("For \"field\", expected List[int] but found str".to_owned()));
}

#[test]
fn mapping_values_extend_location_and_keys_fail_at_the_mapping() {
	let ty = TypeDesc::map(TypeDesc::STR, TypeDesc::INT);
	let value: Map = [("A", Value::Int(1)), ("C", Value::from("x"))].into_iter().collect();
	assert_eq!(check(&Value::Map(value), &ty), Err("For \"field['C']\", expected int but found str".to_owned()));

	let mut bad_key = Map::new();
	bad_key.insert(Value::Int(4), Value::Int(1));
	assert_eq!(
		check(&Value::Map(bad_key), &ty),
		Err("For \"field\", expected Dict[str, int] but found dict".to_owned())
	);
}

#[test]
fn literals_require_equality() {
	let ty = TypeDesc::literal([LiteralValue::from("a"), LiteralValue::from(2_i64)]);
	assert!(check(&Value::from("a"), &ty).is_ok());
	assert!(check(&Value::Int(2), &ty).is_ok());
	assert_eq!(check(&Value::from("b"), &ty), Err("For \"field\", expected Literal['a', 2] but found str".to_owned()));
}

#[test]
fn structures_accept_subclass_instances() {
	let base = StructDef::new("Base").field("x", TypeDesc::INT).finish();
	let child = StructDef::new("Child").base(base.clone()).field("y", TypeDesc::INT).finish();
	let other = StructDef::new("Base").field("x", TypeDesc::INT).finish();

	let instance = child
		.as_struct()
		.expect("structure")
		.construct(vec![("x".into(), Value::Int(1)), ("y".into(), Value::Int(2))])
		.expect("constructs");

	assert!(check(&instance, &base).is_ok());
	assert!(check(&instance, &child).is_ok());
	assert_eq!(check(&instance, &other), Err("For \"field\", expected Base but found Child".to_owned()));
	assert!(check(&Value::Map(Map::new()), &base).is_err());
}

#[test]
fn union_failure_names_the_union() {
	let a = StructDef::new("A").field("x", TypeDesc::INT).finish();
	let ty = TypeDesc::union([a, TypeDesc::list(TypeDesc::INT)]);
	assert!(check(&list([Value::Int(1)]), &ty).is_ok());
	assert_eq!(
		check(&list([Value::from("no")]), &ty),
		Err("For \"field\", expected Union[A, List[int]] but found list".to_owned())
	);
}

#[test]
fn unresolved_reference_is_not_a_type_error() {
	let cache = ResolutionCache::disabled();
	let resolver = Resolver::new(&cache, Arc::new(ScopeTypes::empty()));
	let err = crate::dict::type_check(&resolver, None, &FieldPath::root(), &Value::Int(1), &TypeDesc::union([TypeDesc::named("Gone")]))
		.expect_err("unbound name");
	assert!(matches!(err, FromDictError::UnresolvedReference { .. }));
}
