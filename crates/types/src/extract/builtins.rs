use std::cell::Cell;

use tracing::trace;

use super::{ExtractorRegistry, TypeExtractor};
use crate::{LIST, Priority, TypeDescriptor, Value, ValueList};

/// Classifies the null value. Always first in the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExtractor;

impl TypeExtractor for NullExtractor {
	fn name(&self) -> &'static str {
		"null"
	}

	fn priority(&self) -> Priority {
		Priority::FIRST
	}

	fn handles_null(&self) -> bool {
		true
	}

	fn supports(&self, value: &Value) -> bool {
		value.is_null()
	}

	fn type_of(&self, _value: &Value, _registry: &ExtractorRegistry) -> Option<TypeDescriptor> {
		Some(TypeDescriptor::null())
	}
}

/// Asks self-describing values for their own generic type.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericTypedExtractor;

impl TypeExtractor for GenericTypedExtractor {
	fn name(&self) -> &'static str {
		"generic-typed"
	}

	fn priority(&self) -> Priority {
		Priority::HIGH
	}

	fn supports(&self, value: &Value) -> bool {
		value
			.read()
			.is_some_and(|obj| obj.as_generic_typed().is_some())
	}

	fn type_of(&self, value: &Value, _registry: &ExtractorRegistry) -> Option<TypeDescriptor> {
		let obj = value.read()?;
		obj.as_generic_typed().map(|g| g.generic_type())
	}
}

/// Recovers `List<E>` from the first non-null element of a [`ValueList`].
///
/// An empty or all-null list yields a bare `List`: the element type is
/// unknown, so it is accepted by every `List<E>` bound. Nesting deeper than
/// [`ListExtractor::MAX_NESTING`] also stops at a bare `List`, which keeps a
/// list that contains itself finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListExtractor;

impl ListExtractor {
	/// Deepest list nesting resolved element-wise on one thread.
	pub const MAX_NESTING: usize = 32;
}

thread_local! {
	static LIST_NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Holds one level of list nesting for the current thread.
struct NestingGuard;

impl NestingGuard {
	fn enter() -> Option<Self> {
		LIST_NESTING.with(|depth| {
			let current = depth.get();
			(current < ListExtractor::MAX_NESTING).then(|| {
				depth.set(current + 1);
				NestingGuard
			})
		})
	}
}

impl Drop for NestingGuard {
	fn drop(&mut self) {
		LIST_NESTING.with(|depth| depth.set(depth.get().saturating_sub(1)));
	}
}

impl TypeExtractor for ListExtractor {
	fn name(&self) -> &'static str {
		"list"
	}

	fn supports(&self, value: &Value) -> bool {
		value.is::<ValueList>()
	}

	fn type_of(&self, value: &Value, registry: &ExtractorRegistry) -> Option<TypeDescriptor> {
		// Clone the element handle so the list lock is released before recursing.
		let first = value.downcast_ref::<ValueList>()?.first_present().cloned();
		let Some(first) = first else {
			return Some(TypeDescriptor::class(&LIST));
		};
		let Some(_guard) = NestingGuard::enter() else {
			trace!(limit = Self::MAX_NESTING, "list nesting limit reached");
			return Some(TypeDescriptor::class(&LIST));
		};
		let elem = registry.resolve(&first);
		Some(TypeDescriptor::generic(&LIST, [elem]))
	}
}

/// Classifies any non-null value by its declared static type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchAllExtractor;

impl TypeExtractor for CatchAllExtractor {
	fn name(&self) -> &'static str {
		"catch-all"
	}

	fn priority(&self) -> Priority {
		Priority::LAST
	}

	fn supports(&self, value: &Value) -> bool {
		!value.is_null()
	}

	fn type_of(&self, value: &Value, _registry: &ExtractorRegistry) -> Option<TypeDescriptor> {
		value.read().map(|obj| obj.static_type())
	}
}
