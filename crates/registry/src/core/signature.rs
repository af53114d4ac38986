//! Declared input and output bounds of an op.

use std::fmt;

use imops_types::{TypeDescriptor, Typed};
use smallvec::SmallVec;

/// One positional input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
	/// Every argument in this slot must be assignable to the bound.
	pub bound: TypeDescriptor,
	/// Optional slots may be omitted, but only from the end.
	pub optional: bool,
}

/// Positional input bounds plus an optional output bound.
///
/// The first input is the primary input; the rest are parameters handed to
/// the op factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpSignature {
	inputs: SmallVec<[Slot; 4]>,
	output: Option<TypeDescriptor>,
}

impl OpSignature {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a required input bounded by `T`.
	pub fn input<T: Typed>(self) -> Self {
		self.input_bound(T::type_descriptor())
	}

	/// Appends a required input with an explicit bound.
	pub fn input_bound(mut self, bound: TypeDescriptor) -> Self {
		self.inputs.push(Slot {
			bound,
			optional: false,
		});
		self
	}

	/// Appends an optional trailing parameter bounded by `T`.
	pub fn optional<T: Typed>(self) -> Self {
		self.optional_bound(T::type_descriptor())
	}

	/// Appends an optional trailing parameter with an explicit bound.
	pub fn optional_bound(mut self, bound: TypeDescriptor) -> Self {
		self.inputs.push(Slot {
			bound,
			optional: true,
		});
		self
	}

	/// Sets the output bound to `T`.
	pub fn output<T: Typed>(self) -> Self {
		self.output_bound(T::type_descriptor())
	}

	pub fn output_bound(mut self, bound: TypeDescriptor) -> Self {
		self.output = Some(bound);
		self
	}

	pub fn inputs(&self) -> &[Slot] {
		&self.inputs
	}

	pub fn output_type(&self) -> Option<&TypeDescriptor> {
		self.output.as_ref()
	}

	/// Number of inputs a request must supply.
	pub fn required_arity(&self) -> usize {
		self.inputs.iter().filter(|s| !s.optional).count()
	}

	/// Number of inputs a request may supply.
	pub fn max_arity(&self) -> usize {
		self.inputs.len()
	}

	/// Returns the first required slot that follows an optional one.
	pub(crate) fn misplaced_required(&self) -> Option<usize> {
		let first_optional = self.inputs.iter().position(|s| s.optional)?;
		self.inputs[first_optional..]
			.iter()
			.position(|s| !s.optional)
			.map(|i| first_optional + i)
	}
}

impl fmt::Display for OpSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("(")?;
		for (i, slot) in self.inputs.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", slot.bound)?;
			if slot.optional {
				f.write_str("?")?;
			}
		}
		f.write_str(")")?;
		if let Some(out) = &self.output {
			write!(f, " -> {out}")?;
		}
		Ok(())
	}
}
