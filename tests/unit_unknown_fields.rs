#![allow(missing_docs)]

use fromdict::dict::{DecodeOptions, FromDictError, StructDef, TypeDesc, Value, from_dict};
use fromdict_testkit::{field, nested, value};
use serde_json::json;

fn options(copy_unknown: bool, error_on_unknown: bool) -> DecodeOptions {
	DecodeOptions {
		check_types: true,
		copy_unknown,
		error_on_unknown,
		..DecodeOptions::default()
	}
}

#[test]
fn leftover_keys_follow_the_policy_matrix() {
	let sub = nested().sub;
	let input = value(json!({"foo": 1, "bar": "s", "sam": 1}));

	let dropped = from_dict(&sub, &input, &options(false, false)).expect("silently dropped");
	assert!(dropped.as_object().and_then(|object| object.get("sam")).is_none());

	let copied = from_dict(&sub, &input, &options(true, false)).expect("copied");
	assert_eq!(field(&copied, "sam"), &Value::Int(1));

	for copy_unknown in [false, true] {
		let err = from_dict(&sub, &input, &options(copy_unknown, true)).expect_err("unknown key rejected");
		match err {
			FromDictError::UnknownArguments { type_name, keys } => {
				assert_eq!(type_name, "Sub");
				assert_eq!(keys, ["sam"]);
			}
			other => panic!("unexpected error: {other}"),
		}
	}
}

#[test]
fn no_leftover_keys_never_errors() {
	let sub = nested().sub;
	let input = value(json!({"foo": 1, "bar": "s"}));
	for (copy_unknown, error_on_unknown) in [(false, false), (true, false), (false, true), (true, true)] {
		from_dict(&sub, &input, &options(copy_unknown, error_on_unknown)).expect("all keys are fields");
	}
}

#[test]
fn nested_leftover_keys_are_reported() {
	let main = nested().main;
	let input = value(json!({"foo": 1, "baz": {"foo": 5, "bar": "s", "sam": 2}}));

	let decoded = from_dict(&main, &input, &options(true, false)).expect("copied into the nested bag");
	assert_eq!(field(field(&decoded, "baz"), "sam"), &Value::Int(2));

	let err = from_dict(&main, &input, &options(false, true)).expect_err("nested unknown key rejected");
	assert_eq!(err.to_string(), "unknown arguments for Sub: sam");
}

#[test]
fn defaults_do_not_count_as_leftovers() {
	let with_defaults = StructDef::new("WithDefaults")
		.field_with_default("foo", TypeDesc::INT, 1_i64)
		.field_with_default("bar", TypeDesc::STR, "default")
		.finish();

	let decoded = from_dict(&with_defaults, &value(json!({"foo": 3})), &options(true, false)).expect("defaults fill bar");
	assert_eq!(field(&decoded, "bar"), &Value::from("default"));
	from_dict(&with_defaults, &value(json!({})), &options(false, true)).expect("nothing left over");
	from_dict(&with_defaults, &value(json!({"sam": 1})), &options(true, false)).expect("copied");

	let err = from_dict(&with_defaults, &value(json!({"sam": 1})), &options(false, true)).expect_err("sam is unknown");
	assert!(matches!(err, FromDictError::UnknownArguments { .. }));
}

#[test]
fn copying_never_overwrites_constructed_attributes() {
	let renamed = StructDef::new("Renamed")
		.field("param", TypeDesc::INT)
		.constructor(|def, args| {
			let value = args.into_iter().find(|(name, _)| name == "param").map(|(_, value)| value).unwrap_or(Value::Null);
			let mut object = fromdict::dict::ObjectValue::new(std::sync::Arc::clone(def), Vec::new());
			object.insert_extra_if_absent(Value::from("stored"), value);
			Ok(Value::Object(object))
		})
		.finish();

	let decoded = from_dict(&renamed, &value(json!({"param": 7, "stored": 99, "other": 1})), &DecodeOptions::default()).expect("decodes");
	assert_eq!(field(&decoded, "stored"), &Value::Int(7));
	assert_eq!(field(&decoded, "other"), &Value::Int(1));
}
