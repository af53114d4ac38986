//! Runtime type recovery for op dispatch.
//!
//! Rust generics are monomorphized away by the time a heterogeneous op
//! catalog sees an argument, so dispatch works on [`TypeDescriptor`]s
//! recovered from type-erased [`Value`]s by a priority-ordered chain of
//! [`TypeExtractor`]s.
//!
//! # Layout
//!
//! - [`descriptor`] - descriptors, nominal type classes and assignability
//! - [`value`] - the [`Object`] trait and the shared [`Value`] handle
//! - [`extract`] - the extractor trait, the registry and builtin extractors
//! - [`priority`] - priority constants shared with the op catalog

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod priority;
pub mod value;

pub use descriptor::{LIST, TypeClass, TypeDescriptor, TypeKind, Typed};
pub use error::ExtractorError;
pub use extract::{
	CatchAllExtractor, ExtractorReg, ExtractorRegistry, ExtractorRegistryBuilder,
	GenericTypedExtractor, ListExtractor, NullExtractor, TypeExtractor, extractors,
};
pub use priority::Priority;
pub use value::{GenericTyped, Object, Value, ValueList};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
}
