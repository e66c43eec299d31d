use thiserror::Error;

use crate::dict::{FieldPath, PathStep, TypeDesc, Value};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FromDictError>;

/// Errors produced while resolving, decoding, and checking values.
#[derive(Debug, Error)]
pub enum FromDictError {
	/// Target type exposes no field schema.
	#[error("given type {type_name} is not supported by from_dict")]
	UnsupportedType {
		/// Rendered target type.
		type_name: String,
	},
	/// Source value was present but not a mapping.
	#[error("source must be a mapping but was found to be {found}")]
	InvalidInput {
		/// Runtime type name of the source.
		found: String,
	},
	/// Textual forward reference was not found in any scope.
	#[error("type hint '{name}' could not be resolved")]
	UnresolvedReference {
		/// Referenced type name.
		name: String,
	},
	/// Decoded value does not conform to its declared type.
	#[error(transparent)]
	Type(#[from] FromDictTypeError),
	/// Leftover input keys while unknown keys are rejected.
	#[error("unknown arguments for {type_name}: {}", keys.join(", "))]
	UnknownArguments {
		/// Structure being constructed.
		type_name: String,
		/// Offending input keys in input order.
		keys: Vec<String>,
	},
	/// Host constructor refused the decoded arguments.
	#[error(transparent)]
	Construct(#[from] ConstructError),
	/// Location path syntax is invalid.
	#[error("invalid field path: {path}")]
	InvalidFieldPath {
		/// Original path string.
		path: String,
	},
	/// Typed extraction through serde failed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
}

impl FromDictError {
	/// Prepend one location step when this is a type error; other errors pass unchanged.
	pub fn with_prefix(self, step: PathStep) -> Self {
		match self {
			Self::Type(err) => Self::Type(err.with_prefix(step)),
			other => other,
		}
	}

	/// Borrow the type error, if this is one.
	pub fn as_type_error(&self) -> Option<&FromDictTypeError> {
		match self {
			Self::Type(err) => Some(err),
			_ => None,
		}
	}
}

/// Location-annotated type mismatch.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("For \"{location}\", expected {expected} but found {found}")]
pub struct FromDictTypeError {
	/// Path from the decoded root to the offending value.
	pub location: FieldPath,
	/// Declared type at that location.
	pub expected: TypeDesc,
	/// Runtime type name of the offending value.
	pub found: String,
}

impl FromDictTypeError {
	/// Build a mismatch for `value` against `expected` at `location`.
	pub fn new(location: FieldPath, expected: TypeDesc, value: &Value) -> Self {
		Self {
			location,
			expected,
			found: value.kind_name().to_owned(),
		}
	}

	/// Return the same error with `step` prepended to its location.
	pub fn with_prefix(mut self, step: PathStep) -> Self {
		self.location.prepend(step);
		self
	}
}

/// Failures raised by structure constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
	/// Required field was absent and has no default.
	#[error("{type_name}() missing required argument: '{name}'")]
	MissingArgument {
		/// Structure name.
		type_name: String,
		/// Missing field name.
		name: String,
	},
	/// Argument does not name any constructor parameter.
	#[error("{type_name}() got an unexpected argument '{name}'")]
	UnexpectedArgument {
		/// Structure name.
		type_name: String,
		/// Unexpected argument name.
		name: String,
	},
	/// Host validation refused an argument value.
	#[error("{type_name}() rejected argument '{name}': {reason}")]
	Rejected {
		/// Structure name.
		type_name: String,
		/// Argument that failed validation.
		name: String,
		/// Human-readable reason.
		reason: String,
	},
}
