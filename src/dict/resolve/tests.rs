use std::sync::Arc;

use crate::dict::{FromDictError, Module, ResolutionCache, Resolver, Scope, ScopeTypes, StructDef, TypeDesc};

fn resolver(cache: &ResolutionCache) -> Resolver<'_> {
	Resolver::new(cache, Arc::new(ScopeTypes::empty()))
}

#[test]
fn fields_follow_declaration_order_and_skip_none_fields() {
	let cache = ResolutionCache::new(8);
	let ty = StructDef::new("Row")
		.field("a", TypeDesc::INT)
		.field("gone", TypeDesc::NoneType)
		.field("b", TypeDesc::optional(TypeDesc::STR))
		.finish();

	let fields = resolver(&cache).fields(&ty).expect("row has fields");
	assert_eq!(fields.names().collect::<Vec<_>>(), ["a", "b"]);
	assert_eq!(fields.get("b"), Some(&TypeDesc::optional(TypeDesc::STR)));
	assert!(!fields.contains("gone"));
}

#[test]
fn opaque_types_are_unsupported() {
	let cache = ResolutionCache::new(8);
	let err = resolver(&cache).fields(&TypeDesc::INT).expect_err("int has no fields");
	assert_eq!(err.to_string(), "given type int is not supported by from_dict");

	let empty = StructDef::new("Empty").finish();
	assert!(matches!(resolver(&cache).fields(&empty), Err(FromDictError::UnsupportedType { .. })));
	assert!(resolver(&cache).try_fields(&TypeDesc::list(TypeDesc::INT)).is_none());
}

#[test]
fn lookup_order_is_local_global_module() {
	let module = Module::new("shapes");
	let from_module = module.define(StructDef::new("Shape").field("sides", TypeDesc::INT));
	let owner = from_module.as_struct().cloned().expect("structure");
	let from_global = StructDef::new("Shape").field("area", TypeDesc::FLOAT).finish();
	let from_local = StructDef::new("Shape").field("name", TypeDesc::STR).finish();
	let cache = ResolutionCache::disabled();

	let scope = Arc::new(ScopeTypes::empty());
	let resolved = Resolver::new(&cache, scope).resolve_name("Shape", Some(&owner)).expect("module binding");
	assert_eq!(resolved, from_module);

	let globals = Scope::new().with_type("Shape", from_global.clone());
	let scope = Arc::new(ScopeTypes::new(Some(&globals), None));
	let resolved = Resolver::new(&cache, scope).resolve_name("Shape", Some(&owner)).expect("global binding");
	assert_eq!(resolved, from_global);

	let locals = Scope::new().with_type("Shape", from_local.clone());
	let scope = Arc::new(ScopeTypes::new(Some(&globals), Some(&locals)));
	let resolved = Resolver::new(&cache, scope).resolve_name("Shape", Some(&owner)).expect("local binding");
	assert_eq!(resolved, from_local);
}

#[test]
fn unresolved_names_report_the_name() {
	let cache = ResolutionCache::new(8);
	let err = resolver(&cache).resolve(&TypeDesc::named("Nowhere"), None).expect_err("unbound");
	assert_eq!(err.to_string(), "type hint 'Nowhere' could not be resolved");
}

#[test]
fn non_references_are_borrowed() {
	let cache = ResolutionCache::new(8);
	let ty = TypeDesc::list(TypeDesc::named("Later"));
	let resolved = resolver(&cache).resolve(&ty, None).expect("nothing to resolve");
	assert!(matches!(resolved, std::borrow::Cow::Borrowed(_)));
}

#[test]
fn reference_targets_resolve_before_describing() {
	let node = StructDef::new("Node").field("value", TypeDesc::INT).finish();
	let locals = Scope::new().with_type("Node", node);
	let cache = ResolutionCache::new(8);
	let resolver = Resolver::new(&cache, Arc::new(ScopeTypes::new(None, Some(&locals))));

	let fields = resolver.fields(&TypeDesc::named("Node")).expect("resolves through local scope");
	assert_eq!(fields.len(), 1);
}

#[test]
fn generic_fields_are_substituted() {
	let pair = StructDef::new("Pair")
		.param("A")
		.param("B")
		.field("first", TypeDesc::param("A"))
		.field("rest", TypeDesc::list(TypeDesc::param("B")))
		.finish();
	let cache = ResolutionCache::new(8);

	let fields = resolver(&cache)
		.fields(&pair.apply([TypeDesc::STR, TypeDesc::named("Item")]))
		.expect("generic fields");
	assert_eq!(fields.get("first"), Some(&TypeDesc::STR));
	assert_eq!(fields.get("rest"), Some(&TypeDesc::list(TypeDesc::named("Item"))));
}

#[test]
fn repeated_resolution_hits_the_cache() {
	let cache = ResolutionCache::new(8);
	let ty = StructDef::new("Row").field("a", TypeDesc::INT).finish();

	for _ in 0..3 {
		let resolver = Resolver::new(&cache, Arc::new(ScopeTypes::empty()));
		resolver.fields(&ty).expect("row has fields");
	}

	let stats = cache.stats();
	assert_eq!(stats.misses, 1);
	assert_eq!(stats.hits, 2);
}
