//! Type extractor chain.
//!
//! # Role
//!
//! Recovers a [`TypeDescriptor`] for any [`Value`], null included. Each
//! [`TypeExtractor`] knows one family of values; the registry orders them by
//! priority and asks them in turn.
//!
//! # Invariants
//!
//! - Exactly one extractor handles null, and it strictly outranks every other
//!   extractor. Non-null handlers are never shown a null value.
//! - [`ExtractorRegistry::resolve`] is total: the last resort classifies a
//!   value by its static type.
//! - First match wins. Equal priorities keep registration order.
//! - The registry is immutable once built.

use std::sync::LazyLock;

use tracing::{trace, warn};

use crate::{ExtractorError, Priority, TypeDescriptor, Value};

mod builtins;

pub use builtins::{CatchAllExtractor, GenericTypedExtractor, ListExtractor, NullExtractor};

/// Recovers the generic type of values it supports.
pub trait TypeExtractor: Send + Sync {
	/// Name used in logs and build errors.
	fn name(&self) -> &'static str;

	/// Position in the chain; higher is consulted first.
	fn priority(&self) -> Priority {
		Priority::NORMAL
	}

	/// Returns true for the extractor that classifies null values.
	fn handles_null(&self) -> bool {
		false
	}

	/// Returns true if this extractor can classify `value`.
	fn supports(&self, value: &Value) -> bool;

	/// Classifies `value`. Nested values may be resolved through `registry`.
	fn type_of(&self, value: &Value, registry: &ExtractorRegistry) -> Option<TypeDescriptor>;
}

/// Plugin registration for [`extractors`].
pub struct ExtractorReg(pub fn() -> Box<dyn TypeExtractor>);

inventory::collect!(ExtractorReg);

/// Priority-ordered chain of extractors.
pub struct ExtractorRegistry {
	chain: Vec<Box<dyn TypeExtractor>>,
}

impl ExtractorRegistry {
	/// Starts a new registry.
	pub fn builder() -> ExtractorRegistryBuilder {
		ExtractorRegistryBuilder::default()
	}

	/// Registry with the built-in extractors only.
	pub fn standard() -> Self {
		Self::standard_builder()
			.build()
			.unwrap_or_else(|_| unreachable!("built-in extractors are consistent"))
	}

	fn standard_builder() -> ExtractorRegistryBuilder {
		Self::builder()
			.with(NullExtractor)
			.with(GenericTypedExtractor)
			.with(ListExtractor)
			.with(CatchAllExtractor)
	}

	/// Recovers the descriptor of `value`.
	pub fn resolve(&self, value: &Value) -> TypeDescriptor {
		let null = value.is_null();
		let found = self
			.chain
			.iter()
			.filter(|ex| !null || ex.handles_null())
			.find(|ex| ex.supports(value));

		if let Some(ex) = found {
			trace!(extractor = ex.name(), value = value.type_name(), "extractor selected");
			if let Some(ty) = ex.type_of(value, self) {
				return ty;
			}
			warn!(
				extractor = ex.name(),
				value = value.type_name(),
				"extractor supported value but produced no type"
			);
		}

		Self::last_resort(value)
	}

	fn last_resort(value: &Value) -> TypeDescriptor {
		value
			.read()
			.map_or_else(TypeDescriptor::null, |obj| obj.static_type())
	}

	/// Extractor names in consultation order.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.chain.iter().map(|ex| ex.name())
	}

	pub fn len(&self) -> usize {
		self.chain.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}
}

impl std::fmt::Debug for ExtractorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(self.chain.iter().map(|ex| (ex.name(), ex.priority())))
			.finish()
	}
}

/// Collects extractors and validates the null-handler rules.
#[derive(Default)]
pub struct ExtractorRegistryBuilder {
	pending: Vec<Box<dyn TypeExtractor>>,
}

impl ExtractorRegistryBuilder {
	/// Adds an extractor.
	pub fn with(mut self, extractor: impl TypeExtractor + 'static) -> Self {
		self.pending.push(Box::new(extractor));
		self
	}

	/// Adds a boxed extractor.
	pub fn push(&mut self, extractor: Box<dyn TypeExtractor>) {
		self.pending.push(extractor);
	}

	/// Orders the chain and checks it.
	///
	/// A [`NullExtractor`] at [`Priority::FIRST`] is supplied when no
	/// extractor handles null.
	pub fn build(mut self) -> Result<ExtractorRegistry, ExtractorError> {
		let mut null_handler: Option<(&'static str, Priority)> = None;
		for ex in self.pending.iter().filter(|ex| ex.handles_null()) {
			if let Some((first, _)) = null_handler {
				return Err(ExtractorError::DuplicateNullHandler {
					first,
					second: ex.name(),
				});
			}
			null_handler = Some((ex.name(), ex.priority()));
		}

		let (null_name, null_priority) = match null_handler {
			Some(found) => found,
			None => {
				self.pending.push(Box::new(NullExtractor));
				(NullExtractor.name(), NullExtractor.priority())
			}
		};

		if let Some(ex) = self
			.pending
			.iter()
			.find(|ex| !ex.handles_null() && ex.priority() >= null_priority)
		{
			return Err(ExtractorError::NullHandlerOutranked {
				name: ex.name(),
				priority: ex.priority(),
				null_handler: null_name,
				null_priority,
			});
		}

		// Stable, so equal priorities keep registration order.
		self.pending.sort_by_key(|ex| std::cmp::Reverse(ex.priority()));

		Ok(ExtractorRegistry {
			chain: self.pending,
		})
	}
}

static EXTRACTORS: LazyLock<ExtractorRegistry> = LazyLock::new(|| {
	let mut builder = ExtractorRegistry::standard_builder();
	for reg in inventory::iter::<ExtractorReg> {
		builder.push((reg.0)());
	}
	match builder.build() {
		Ok(registry) => registry,
		Err(err) => {
			warn!(error = %err, "plugin extractors rejected, using built-ins only");
			ExtractorRegistry::standard()
		}
	}
});

/// Process-wide registry: built-in extractors plus every [`ExtractorReg`].
pub fn extractors() -> &'static ExtractorRegistry {
	&EXTRACTORS
}
