use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::dict::{ConstructError, FieldValue, ObjectValue, StructRef, TypeDesc, Value};

/// Host constructor: receives decoded arguments in field order and builds the instance.
pub type Constructor = Arc<dyn Fn(&Arc<StructDef>, Vec<(String, Value)>) -> Result<Value, ConstructError> + Send + Sync>;

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldDef {
	/// Field identifier.
	pub name: Box<str>,
	/// Declared type; may contain forward references and type parameters.
	pub ty: TypeDesc,
	/// Value used by the default constructor when the field is absent.
	pub default: Option<Value>,
}

/// Structure declaration: named, ordered, typed fields plus construction behavior.
pub struct StructDef {
	/// Structure name.
	pub name: Box<str>,
	/// Declared type parameters, in order.
	pub params: Vec<Box<str>>,
	/// Fields declared directly on this structure.
	pub fields: Vec<FieldDef>,
	/// Single base structure, possibly a parametrized generic.
	pub base: Option<TypeDesc>,
	/// Whether instances carry an attribute bag for unknown keys.
	pub extensible: bool,
	constructor: Option<Constructor>,
	module: Weak<Module>,
}

impl StructDef {
	/// Start a declaration with no fields.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			params: Vec::new(),
			fields: Vec::new(),
			base: None,
			extensible: true,
			constructor: None,
			module: Weak::new(),
		}
	}

	/// Declare a type parameter.
	pub fn param(mut self, name: &str) -> Self {
		self.params.push(name.into());
		self
	}

	/// Declare a required field.
	pub fn field(mut self, name: &str, ty: TypeDesc) -> Self {
		self.fields.push(FieldDef {
			name: name.into(),
			ty,
			default: None,
		});
		self
	}

	/// Declare a field with a default value.
	pub fn field_with_default(mut self, name: &str, ty: TypeDesc, default: impl Into<Value>) -> Self {
		self.fields.push(FieldDef {
			name: name.into(),
			ty,
			default: Some(default.into()),
		});
		self
	}

	/// Inherit fields from a structure or parametrized generic structure.
	pub fn base(mut self, base: TypeDesc) -> Self {
		self.base = Some(base);
		self
	}

	/// Instances accept no attributes beyond their fields.
	pub fn closed(mut self) -> Self {
		self.extensible = false;
		self
	}

	/// Replace the default constructor.
	pub fn constructor<F>(mut self, constructor: F) -> Self
	where
		F: Fn(&Arc<StructDef>, Vec<(String, Value)>) -> Result<Value, ConstructError> + Send + Sync + 'static,
	{
		self.constructor = Some(Arc::new(constructor));
		self
	}

	/// Finish a standalone declaration with no declaring module.
	pub fn finish(self) -> TypeDesc {
		TypeDesc::Struct(StructRef::new(Arc::new(self)))
	}

	/// Declaring module, when registered through [`Module::define`].
	pub fn module(&self) -> Option<Arc<Module>> {
		self.module.upgrade()
	}

	/// Declaration of the direct base structure.
	pub fn base_def(&self) -> Option<&Arc<StructDef>> {
		self.base.as_ref().and_then(TypeDesc::as_struct)
	}

	/// Whether `self` is `other` or inherits from it.
	pub fn is_subtype_of(self: &Arc<Self>, other: &Arc<StructDef>) -> bool {
		let mut current = Some(self);
		while let Some(def) = current {
			if Arc::ptr_eq(def, other) {
				return true;
			}
			current = def.base_def();
		}
		false
	}

	/// Construct an instance from decoded arguments.
	pub fn construct(self: &Arc<Self>, args: Vec<(String, Value)>) -> Result<Value, ConstructError> {
		match &self.constructor {
			Some(constructor) => constructor(self, args),
			None => self.default_construct(args),
		}
	}

	/// Constructor parameters, inherited first; a redeclared name keeps its inherited position.
	pub fn constructor_fields(&self) -> Vec<&FieldDef> {
		let mut out: Vec<&FieldDef> = match self.base_def() {
			Some(base) => base.constructor_fields(),
			None => Vec::new(),
		};
		for field in &self.fields {
			match out.iter_mut().find(|existing| existing.name == field.name) {
				Some(slot) => *slot = field,
				None => out.push(field),
			}
		}
		out
	}

	fn default_construct(self: &Arc<Self>, mut args: Vec<(String, Value)>) -> Result<Value, ConstructError> {
		let params = self.constructor_fields();
		if let Some((name, _)) = args.iter().find(|(name, _)| !params.iter().any(|param| &*param.name == name.as_str())) {
			return Err(ConstructError::UnexpectedArgument {
				type_name: self.name.to_string(),
				name: name.clone(),
			});
		}

		let mut fields = Vec::with_capacity(params.len());
		for param in params {
			let value = match args.iter().position(|(name, _)| name.as_str() == &*param.name) {
				Some(pos) => args.swap_remove(pos).1,
				None => param.default.clone().ok_or_else(|| ConstructError::MissingArgument {
					type_name: self.name.to_string(),
					name: param.name.to_string(),
				})?,
			};
			fields.push(FieldValue {
				name: param.name.clone(),
				value,
			});
		}

		Ok(Value::Object(ObjectValue::new(Arc::clone(self), fields)))
	}
}

impl fmt::Debug for StructDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StructDef")
			.field("name", &self.name)
			.field("params", &self.params)
			.field("fields", &self.fields)
			.field("base", &self.base)
			.field("extensible", &self.extensible)
			.field("custom_constructor", &self.constructor.is_some())
			.finish()
	}
}

/// Declaring context of structures: the last tier of forward-reference lookup.
pub struct Module {
	name: Box<str>,
	bindings: RwLock<BTreeMap<Box<str>, TypeDesc>>,
}

impl Module {
	/// Empty module.
	pub fn new(name: &str) -> Arc<Self> {
		Arc::new(Self {
			name: name.into(),
			bindings: RwLock::new(BTreeMap::new()),
		})
	}

	/// Module name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Register a structure under its own name and make this module its declaring context.
	///
	/// The returned type keeps the module alive, so the structure's forward
	/// references still resolve after the caller drops its module handle.
	pub fn define(self: &Arc<Self>, mut def: StructDef) -> TypeDesc {
		def.module = Arc::downgrade(self);
		for field in &mut def.fields {
			field.ty = field.ty.detach_from(self);
		}
		def.base = def.base.map(|base| base.detach_from(self));
		let def = Arc::new(def);
		self.bind(&def.name, TypeDesc::Struct(StructRef::new(Arc::clone(&def))));
		TypeDesc::Struct(StructRef::anchored(def, Arc::clone(self)))
	}

	/// Bind a name to any type, e.g. an alias of a parametrized generic.
	pub fn bind(&self, name: &str, ty: TypeDesc) {
		self.bindings.write().insert(name.into(), ty.detach_from(self));
	}

	/// Look up a bound name. Looked-up types do not keep the module alive.
	pub fn lookup(&self, name: &str) -> Option<TypeDesc> {
		self.bindings.read().get(name).cloned()
	}
}

impl fmt::Debug for Module {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("name", &self.name)
			.field("bindings", &self.bindings.read().keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Field description capability consumed by the resolver.
pub trait Describe {
	/// Ordered `name -> declared type` pairs, or `None` when fields are not describable.
	fn describe_fields(&self) -> Option<Vec<(Box<str>, TypeDesc)>>;
}

impl Describe for StructDef {
	fn describe_fields(&self) -> Option<Vec<(Box<str>, TypeDesc)>> {
		let mut out = match &self.base {
			Some(base) => base.describe_fields()?,
			None => Vec::new(),
		};
		for field in &self.fields {
			match out.iter_mut().find(|(name, _)| *name == field.name) {
				Some(slot) => slot.1 = field.ty.clone(),
				None => out.push((field.name.clone(), field.ty.clone())),
			}
		}
		Some(out)
	}
}

impl Describe for TypeDesc {
	fn describe_fields(&self) -> Option<Vec<(Box<str>, TypeDesc)>> {
		match self {
			Self::Struct(def) => def.describe_fields(),
			Self::Generic { base, args } => {
				let swaps: Vec<(Box<str>, TypeDesc)> = base.params.iter().cloned().zip(args.iter().cloned()).collect();
				let fields = base.describe_fields()?;
				Some(fields.into_iter().map(|(name, ty)| (name, ty.substitute(&swaps))).collect())
			}
			_ => None,
		}
	}
}
