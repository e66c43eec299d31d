use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::dict::{Module, StructDef, Value};

/// Types without further decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlainType {
	/// Boolean.
	Bool,
	/// Integer; booleans are accepted as integers.
	Int,
	/// Floating point.
	Float,
	/// String.
	Str,
	/// Mapping without a declared schema.
	Dict,
	/// Sequence without a declared element type.
	List,
}

impl PlainType {
	/// Display name.
	pub fn name(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Str => "str",
			Self::Dict => "dict",
			Self::List => "list",
		}
	}

	/// Instance check for a runtime value.
	pub fn accepts(self, value: &Value) -> bool {
		matches!(
			(self, value),
			(Self::Bool, Value::Bool(_))
				| (Self::Int, Value::Int(_) | Value::Bool(_))
				| (Self::Float, Value::Float(_))
				| (Self::Str, Value::Str(_))
				| (Self::Dict, Value::Map(_))
				| (Self::List, Value::List(_))
		)
	}
}

/// One admissible value of a `Literal[...]` type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
	/// `None`.
	Null,
	/// Boolean literal.
	Bool(bool),
	/// Integer literal.
	Int(i64),
	/// String literal.
	Str(Box<str>),
}

impl LiteralValue {
	/// Whether `value` equals this literal.
	pub fn matches(&self, value: &Value) -> bool {
		match (self, value) {
			(Self::Null, Value::Null) => true,
			(Self::Bool(a), Value::Bool(b)) => a == b,
			(Self::Int(a), Value::Int(b)) => a == b,
			(Self::Str(a), Value::Str(b)) => a == b,
			_ => false,
		}
	}
}

impl From<&str> for LiteralValue {
	fn from(value: &str) -> Self {
		Self::Str(value.into())
	}
}

impl From<i64> for LiteralValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<bool> for LiteralValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

/// Identity handle to a structure declaration.
///
/// Two handles are equal only when they point at the same declaration, so
/// separately declared structures with the same name stay distinct. A handle
/// returned by [`Module::define`] also keeps the declaring module alive, so
/// names bound there stay resolvable for as long as the handle exists.
#[derive(Clone)]
pub struct StructRef {
	def: Arc<StructDef>,
	anchor: Option<Arc<Module>>,
}

impl StructRef {
	/// Wrap a shared declaration.
	pub fn new(def: Arc<StructDef>) -> Self {
		Self { def, anchor: None }
	}

	pub(crate) fn anchored(def: Arc<StructDef>, module: Arc<Module>) -> Self {
		Self {
			def,
			anchor: Some(module),
		}
	}

	/// Shared declaration.
	pub fn def(&self) -> &Arc<StructDef> {
		&self.def
	}

	fn detach_from(&self, module: &Module) -> Self {
		match &self.anchor {
			Some(anchor) if std::ptr::eq(Arc::as_ptr(anchor), module) => Self::new(Arc::clone(&self.def)),
			_ => self.clone(),
		}
	}
}

impl Deref for StructRef {
	type Target = StructDef;

	fn deref(&self) -> &StructDef {
		&self.def
	}
}

impl PartialEq for StructRef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.def, &other.def)
	}
}

impl Eq for StructRef {}

impl Hash for StructRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		(Arc::as_ptr(&self.def) as usize).hash(state);
	}
}

impl fmt::Debug for StructRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "StructRef({})", self.def.name)
	}
}

/// Declared type of a field or decode target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
	/// Unconstrained.
	Any,
	/// The null type; only `Value::Null` conforms.
	NoneType,
	/// Scalar or schemaless container.
	Plain(PlainType),
	/// Structure with describable fields.
	Struct(StructRef),
	/// Parametrized generic structure, e.g. `Pair[A, B]`.
	Generic {
		/// Generic structure declaration.
		base: StructRef,
		/// Type arguments in parameter order.
		args: Vec<TypeDesc>,
	},
	/// Any of the alternatives, in declaration order.
	Union(Vec<TypeDesc>),
	/// Sequence of one element type.
	List(Box<TypeDesc>),
	/// Mapping from key type to value type.
	Map(Box<TypeDesc>, Box<TypeDesc>),
	/// One of a fixed set of literal values.
	Literal(Vec<LiteralValue>),
	/// Textual forward reference resolved against scopes on use.
	Ref(Box<str>),
	/// Type parameter of a generic structure.
	Param(Box<str>),
}

/// Structural classification of a [`TypeDesc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
	/// Structure or parametrized generic structure.
	Structure,
	/// Union of one type with the null type.
	Optional,
	/// Any other union.
	Union,
	/// Typed sequence.
	SequenceOf,
	/// Typed mapping.
	MappingOf,
	/// Unconstrained, including unbound type parameters.
	Any,
	/// No further decomposition.
	Scalar,
	/// Forward reference not yet resolved.
	Reference,
}

impl TypeDesc {
	/// `bool`.
	pub const BOOL: Self = Self::Plain(PlainType::Bool);
	/// `int`.
	pub const INT: Self = Self::Plain(PlainType::Int);
	/// `float`.
	pub const FLOAT: Self = Self::Plain(PlainType::Float);
	/// `str`.
	pub const STR: Self = Self::Plain(PlainType::Str);
	/// Schemaless `dict`.
	pub const DICT: Self = Self::Plain(PlainType::Dict);
	/// Schemaless `list`.
	pub const LIST: Self = Self::Plain(PlainType::List);

	/// `Optional[inner]`, i.e. `Union[inner, None]`.
	pub fn optional(inner: TypeDesc) -> Self {
		Self::Union(vec![inner, Self::NoneType])
	}

	/// `Union[...]` in declaration order.
	pub fn union(alternatives: impl IntoIterator<Item = TypeDesc>) -> Self {
		Self::Union(alternatives.into_iter().collect())
	}

	/// `List[element]`.
	pub fn list(element: TypeDesc) -> Self {
		Self::List(Box::new(element))
	}

	/// `Dict[key, value]`.
	pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
		Self::Map(Box::new(key), Box::new(value))
	}

	/// `Literal[...]`.
	pub fn literal(values: impl IntoIterator<Item = LiteralValue>) -> Self {
		Self::Literal(values.into_iter().collect())
	}

	/// Forward reference by name.
	pub fn named(name: &str) -> Self {
		Self::Ref(name.into())
	}

	/// Type parameter by name.
	pub fn param(name: &str) -> Self {
		Self::Param(name.into())
	}

	/// Apply type arguments to a generic structure.
	///
	/// Non-structure types are returned unchanged.
	pub fn apply(&self, args: impl IntoIterator<Item = TypeDesc>) -> Self {
		match self {
			Self::Struct(base) | Self::Generic { base, .. } => Self::Generic {
				base: base.clone(),
				args: args.into_iter().collect(),
			},
			other => other.clone(),
		}
	}

	/// Structure declaration behind a structure or generic structure.
	pub fn as_struct(&self) -> Option<&Arc<StructDef>> {
		match self {
			Self::Struct(def) | Self::Generic { base: def, .. } => Some(def.def()),
			_ => None,
		}
	}

	/// Whether this is a structure or generic structure.
	pub fn is_structure(&self) -> bool {
		self.as_struct().is_some()
	}

	/// Whether this is the null type.
	pub fn is_none_type(&self) -> bool {
		matches!(self, Self::NoneType)
	}

	/// Derive the structural shape.
	pub fn shape(&self) -> Shape {
		match self {
			Self::Struct(_) | Self::Generic { .. } => Shape::Structure,
			Self::Union(alternatives) if alternatives.len() == 2 && alternatives.iter().any(Self::is_none_type) => Shape::Optional,
			Self::Union(_) => Shape::Union,
			Self::List(_) => Shape::SequenceOf,
			Self::Map(..) => Shape::MappingOf,
			Self::Any | Self::Param(_) => Shape::Any,
			Self::Ref(_) => Shape::Reference,
			Self::NoneType | Self::Plain(_) | Self::Literal(_) => Shape::Scalar,
		}
	}

	/// Replace type parameters by their bound arguments, recursively.
	pub fn substitute(&self, swaps: &[(Box<str>, TypeDesc)]) -> Self {
		match self {
			Self::Param(name) => swaps
				.iter()
				.find(|(param, _)| param == name)
				.map_or_else(|| self.clone(), |(_, arg)| arg.clone()),
			Self::Generic { base, args } => Self::Generic {
				base: base.clone(),
				args: args.iter().map(|arg| arg.substitute(swaps)).collect(),
			},
			Self::Union(alternatives) => Self::Union(alternatives.iter().map(|alt| alt.substitute(swaps)).collect()),
			Self::List(element) => Self::list(element.substitute(swaps)),
			Self::Map(key, value) => Self::map(key.substitute(swaps), value.substitute(swaps)),
			other => other.clone(),
		}
	}

	/// Drop handles that keep `module` alive, so the module can store the type without a cycle.
	pub(crate) fn detach_from(&self, module: &Module) -> Self {
		match self {
			Self::Struct(def) => Self::Struct(def.detach_from(module)),
			Self::Generic { base, args } => Self::Generic {
				base: base.detach_from(module),
				args: args.iter().map(|arg| arg.detach_from(module)).collect(),
			},
			Self::Union(alternatives) => Self::Union(alternatives.iter().map(|alt| alt.detach_from(module)).collect()),
			Self::List(element) => Self::list(element.detach_from(module)),
			Self::Map(key, value) => Self::map(key.detach_from(module), value.detach_from(module)),
			other => other.clone(),
		}
	}
}

impl From<PlainType> for TypeDesc {
	fn from(plain: PlainType) -> Self {
		Self::Plain(plain)
	}
}

impl fmt::Display for LiteralValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("None"),
			Self::Bool(true) => f.write_str("True"),
			Self::Bool(false) => f.write_str("False"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Str(value) => write!(f, "'{value}'"),
		}
	}
}

impl fmt::Display for TypeDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Any => f.write_str("Any"),
			Self::NoneType => f.write_str("None"),
			Self::Plain(plain) => f.write_str(plain.name()),
			Self::Struct(def) => f.write_str(&def.name),
			Self::Generic { base, args } => {
				write!(f, "{}[", base.name)?;
				write_joined(f, args)?;
				f.write_str("]")
			}
			Self::Union(alternatives) if self.shape() == Shape::Optional => {
				let inner = alternatives.iter().find(|alt| !alt.is_none_type()).unwrap_or(&Self::NoneType);
				write!(f, "Optional[{inner}]")
			}
			Self::Union(alternatives) => {
				f.write_str("Union[")?;
				write_joined(f, alternatives)?;
				f.write_str("]")
			}
			Self::List(element) => write!(f, "List[{element}]"),
			Self::Map(key, value) => write!(f, "Dict[{key}, {value}]"),
			Self::Literal(values) => {
				f.write_str("Literal[")?;
				write_joined(f, values)?;
				f.write_str("]")
			}
			Self::Ref(name) => write!(f, "'{name}'"),
			Self::Param(name) => write!(f, "~{name}"),
		}
	}
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{item}")?;
	}
	Ok(())
}
