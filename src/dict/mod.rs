mod cache;
mod check;
mod decode;
mod error;
mod path;
mod resolve;
mod schema;
mod scope;
mod ty;
mod value;

/// Memoization of field maps and forward references.
pub use cache::{CacheConfig, CacheStats, ResolutionCache};
/// Post-decode conformance check.
pub use check::{check_value, type_check};
/// Decode entry points and options.
pub use decode::{DecodeOptions, Decoder, from_dict, from_dict_into, from_dict_with_overrides};
/// Error and result aliases.
pub use error::{ConstructError, FromDictError, FromDictTypeError, Result};
/// Location paths used in diagnostics.
pub use path::{FieldPath, PathStep};
/// Field-map resolution against lookup scopes.
pub use resolve::{FieldMap, Resolver};
/// Structure declarations and their declaring modules.
pub use schema::{Constructor, Describe, FieldDef, Module, StructDef};
/// Forward-reference lookup scopes.
pub use scope::{Binding, Scope, ScopeTypes};
/// Type descriptor algebra.
pub use ty::{LiteralValue, PlainType, Shape, StructRef, TypeDesc};
/// Dynamic input and decoded output values.
pub use value::{FieldValue, Map, ObjectValue, Value};
