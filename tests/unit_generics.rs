#![allow(missing_docs)]

use std::sync::Arc;

use fromdict::dict::{DecodeOptions, FieldValue, ObjectValue, Scope, StructDef, TypeDesc, Value, from_dict};
use fromdict_testkit::{data_pair, field, generic_holder, type_name, value};
use serde_json::json;

fn checked() -> DecodeOptions {
	DecodeOptions {
		check_types: true,
		..DecodeOptions::default()
	}
}

#[test]
fn type_arguments_drive_field_decoding() {
	let (data1, data2) = data_pair();
	let holder = generic_holder();
	let input = value(json!({"field_1": {"value": 1}, "field_2": {"value": "1"}, "field_3": "s", "field_4": 1}));

	let decoded = from_dict(&holder.apply([data1.clone(), data2.clone()]), &input, &checked()).expect("decodes");
	assert_eq!(type_name(field(&decoded, "field_1")), Some("Data1"));
	assert_eq!(type_name(field(&decoded, "field_2")), Some("Data2"));
	assert_eq!(field(&decoded, "field_3"), &Value::from("s"));

	let swapped = value(json!({"field_1": {"value": "1"}, "field_2": {"value": 1}, "field_3": "s", "field_4": 1}));
	let decoded = from_dict(&holder.apply([data2, data1]), &swapped, &checked()).expect("decodes");
	assert_eq!(type_name(field(&decoded, "field_1")), Some("Data2"));
	assert_eq!(type_name(field(&decoded, "field_2")), Some("Data1"));
}

#[test]
fn mismatched_arguments_fail_the_check() {
	let (data1, data2) = data_pair();
	let input = value(json!({"field_1": {"value": "not an int"}, "field_2": {"value": "1"}, "field_3": "s", "field_4": 1}));
	let err = from_dict(&generic_holder().apply([data1, data2]), &input, &checked()).expect_err("Data1.value is an int");
	assert_eq!(err.to_string(), "For \"field_1.value\", expected int but found str");
}

#[test]
fn subclass_of_parametrized_generic_inherits_fields() {
	let (data1, data2) = data_pair();
	let child = StructDef::new("Child").base(generic_holder().apply([data1, data2])).finish();
	let input = value(json!({"field_1": {"value": 1}, "field_2": {"value": "1"}, "field_3": "s", "field_4": 1}));

	let decoded = from_dict(&child, &input, &checked()).expect("decodes");
	assert_eq!(type_name(&decoded), Some("Child"));
	assert_eq!(type_name(field(&decoded, "field_1")), Some("Data1"));
	assert_eq!(type_name(field(&decoded, "field_2")), Some("Data2"));
}

#[test]
fn parameters_inside_containers_are_substituted() {
	let (data1, data2) = data_pair();
	let generic = StructDef::new("Wrapper")
		.param("T1")
		.param("T2")
		.field("f_1", TypeDesc::optional(TypeDesc::param("T1")))
		.field("f_2", TypeDesc::list(TypeDesc::param("T2")))
		.finish();
	let target = generic.apply([data1.clone(), data2.clone()]);

	let decoded = from_dict(&target, &value(json!({"f_1": {"value": 1}, "f_2": [{"value": "1"}]})), &checked()).expect("decodes");
	assert_eq!(type_name(field(&decoded, "f_1")), Some("Data1"));
	assert_eq!(type_name(&field(&decoded, "f_2").as_list().expect("list")[0]), Some("Data2"));

	let decoded = from_dict(&target, &value(json!({"f_1": null, "f_2": [{"value": "1"}]})), &checked()).expect("decodes");
	assert!(field(&decoded, "f_1").is_null());

	let child = StructDef::new("WrapperChild").base(generic.apply([data1, data2])).finish();
	let decoded = from_dict(&child, &value(json!({"f_1": {"value": 1}, "f_2": [{"value": "1"}]})), &checked()).expect("decodes");
	assert_eq!(type_name(field(&decoded, "f_1")), Some("Data1"));
}

#[test]
fn forward_referenced_arguments_resolve_through_scopes() {
	let (data1, data2) = data_pair();
	let generic = StructDef::new("Wrapper")
		.param("T1")
		.param("T2")
		.field("f_1", TypeDesc::optional(TypeDesc::param("T1")))
		.field("f_2", TypeDesc::list(TypeDesc::param("T2")))
		.finish();
	let target = generic.apply([TypeDesc::named("Data2"), TypeDesc::named("Data1")]);
	let opt = DecodeOptions {
		check_types: true,
		..DecodeOptions::default()
	}
	.with_local_scope(Scope::new().with_type("Data1", data1).with_type("Data2", data2));

	let decoded = from_dict(&target, &value(json!({"f_1": {"value": "1"}, "f_2": [{"value": 1}]})), &opt).expect("decodes");
	assert_eq!(type_name(field(&decoded, "f_1")), Some("Data2"));
	assert_eq!(type_name(&field(&decoded, "f_2").as_list().expect("list")[0]), Some("Data1"));
}

#[test]
fn custom_constructor_stores_parameters_under_other_names() {
	let (data1, data2) = data_pair();
	let generic = StructDef::new("Plain")
		.param("P1")
		.param("P2")
		.field("param_1", TypeDesc::param("P1"))
		.field("param_2", TypeDesc::param("P2"))
		.constructor(|def, args| {
			let fields = args
				.into_iter()
				.map(|(name, value)| FieldValue {
					name: name.replacen("param", "field", 1).into(),
					value,
				})
				.collect();
			Ok(Value::Object(ObjectValue::new(Arc::clone(def), fields)))
		})
		.finish();

	let input = value(json!({"param_1": {"value": 1}, "param_2": {"value": "1"}}));
	let decoded = from_dict(&generic.apply([data1, data2]), &input, &checked()).expect("decodes");
	assert_eq!(type_name(field(&decoded, "field_1")), Some("Data1"));
	assert_eq!(type_name(field(&decoded, "field_2")), Some("Data2"));
}
