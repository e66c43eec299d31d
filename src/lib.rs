//! Decode loosely-typed nested maps into typed object graphs.
//!
//! Target types are described at runtime by [`dict::TypeDesc`] values built from
//! [`dict::StructDef`] declarations. The decoder walks a type and a [`dict::Value`]
//! in lockstep, constructing structure instances wherever the declared type asks
//! for one, and can optionally validate the result against the declared types.

/// Type descriptors, field resolution, recursive decoding and type checking.
pub mod dict;
