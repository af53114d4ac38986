//! Op matching.
//!
//! # Role
//!
//! Turns an [`OpRequest`] (a name plus actual argument values) into exactly
//! one instantiated candidate. Matching selects; it never runs the op.
//!
//! # Pipeline
//!
//! 1. Recover a descriptor for every argument without an explicit type.
//! 2. Take the catalog's candidates for the exact name.
//! 3. Check arity, input bounds, the expected output type and the calling
//!    convention the request implies.
//! 4. Check the dimensionality of the primary input against the candidate's
//!    bounds.
//! 5. Instantiate survivors and ask their capability predicate, if any.
//! 6. Keep the highest priority. A tie at the top is an error unless the
//!    request pins a candidate or the tie-break is configured.
//!
//! # Invariants
//!
//! - Every dropped candidate is reported with a [`RejectReason`].
//! - [`MatchError::Inapplicable`] means some candidate passed steps 3 and 4;
//!   [`MatchError::NoMatch`] means none did.
//! - The result depends only on the catalog, the extractors, the
//!   configuration and the request.

use imops_types::{Priority, TypeDescriptor, Value};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::catalog::{Candidate, OpDef};
use crate::config::TieBreak;
use crate::core::{OpMeta, Variant};
use crate::env::OpEnvironment;
use crate::error::{MatchError, OpError};
use crate::exec::Op;

mod status;
#[cfg(test)]
mod tests;

pub use status::{RejectReason, Rejection};

/// One request argument.
#[derive(Debug, Clone)]
pub struct Arg {
	pub value: Value,
	/// Static type supplied by the caller; recovered from the value if absent.
	pub ty: Option<TypeDescriptor>,
}

/// A named op request.
#[derive(Debug, Clone, Default)]
pub struct OpRequest<'a> {
	name: &'a str,
	args: SmallVec<[Arg; 4]>,
	output: Option<Value>,
	expected_output: Option<TypeDescriptor>,
	pin: Option<&'a str>,
}

impl<'a> OpRequest<'a> {
	pub fn new(name: &'a str) -> Self {
		Self {
			name,
			..Self::default()
		}
	}

	/// Appends an argument whose type is recovered at match time.
	pub fn arg(mut self, value: Value) -> Self {
		self.args.push(Arg { value, ty: None });
		self
	}

	/// Appends an argument with an explicit static type.
	pub fn typed_arg(mut self, value: Value, ty: TypeDescriptor) -> Self {
		self.args.push(Arg {
			value,
			ty: Some(ty),
		});
		self
	}

	pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
		self.args
			.extend(values.into_iter().map(|value| Arg { value, ty: None }));
		self
	}

	/// Supplies a pre-allocated output, selecting the computer convention.
	pub fn output(mut self, output: Value) -> Self {
		self.output = Some(output);
		self
	}

	/// Requires the declared output to be assignable to `ty`.
	pub fn expect_output(mut self, ty: TypeDescriptor) -> Self {
		self.expected_output = Some(ty);
		self
	}

	/// Restricts matching to the candidate with this id.
	pub fn pin(mut self, id: &'a str) -> Self {
		self.pin = Some(id);
		self
	}

	pub fn name(&self) -> &str {
		self.name
	}

	pub fn arguments(&self) -> &[Arg] {
		&self.args
	}
}

/// The selected candidate, instantiated with the request parameters.
pub struct OpMatch {
	def: &'static OpDef,
	op: Box<dyn Op>,
	input: Value,
	output: Option<Value>,
}

impl OpMatch {
	pub fn meta(&self) -> &'static OpMeta {
		&self.def.meta
	}

	pub fn id(&self) -> &'static str {
		self.def.meta.id
	}

	pub fn priority(&self) -> Priority {
		self.def.meta.priority
	}

	/// The unbound instance.
	pub fn op(&self) -> &dyn Op {
		self.op.as_ref()
	}

	/// Binds the request's input and output and hands the instance over.
	pub fn into_bound(self) -> Result<Box<dyn Op>, OpError> {
		let mut op = self.op;
		op.bind_input(self.input);
		if let Some(output) = self.output {
			op.bind_output(output)?;
		}
		Ok(op)
	}

	/// Binds, runs and returns the output.
	pub fn run(self) -> Result<Value, OpError> {
		let mut op = self.into_bound()?;
		op.run()?;
		Ok(op.take_output())
	}
}

impl std::fmt::Debug for OpMatch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OpMatch")
			.field("id", &self.id())
			.field("priority", &self.priority())
			.finish_non_exhaustive()
	}
}

/// Selects the single best candidate for `request`.
pub fn find(env: &OpEnvironment, request: &OpRequest<'_>) -> Result<OpMatch, MatchError> {
	let extractors = env.extractors();
	let arg_types: Vec<TypeDescriptor> = request
		.args
		.iter()
		.map(|a| a.ty.clone().unwrap_or_else(|| extractors.resolve(&a.value)))
		.collect();
	let output_type = request.output.as_ref().map(|o| extractors.resolve(o));
	let values: Vec<Value> = request.args.iter().map(|a| a.value.clone()).collect();
	let primary = values.first().cloned().unwrap_or_default();
	let dims = primary.num_dimensions();

	let candidates = env
		.catalog()
		.named(request.name)
		.iter()
		.filter(|c| request.pin.is_none_or(|pin| c.id() == pin));

	let mut rejections = Vec::new();
	let mut survivors: Vec<(&Candidate, Box<dyn Op>)> = Vec::new();
	let mut statically_compatible = 0usize;
	for candidate in candidates {
		let outcome = check_static(
			candidate,
			&arg_types,
			output_type.as_ref(),
			request.expected_output.as_ref(),
			dims,
		)
		.and_then(|()| {
			statically_compatible += 1;
			instantiate(env, candidate, &values, &primary)
		});
		match outcome {
			Ok(op) => survivors.push((candidate, op)),
			Err(reason) => {
				trace!(op = request.name, candidate = candidate.id(), %reason, "candidate rejected");
				rejections.push(Rejection {
					candidate: candidate.id(),
					reason,
				});
			}
		}
	}

	let mut survivors = survivors.into_iter();
	let Some((best, op)) = survivors.next() else {
		let name = request.name.to_owned();
		debug!(op = %name, rejected = rejections.len(), "no candidate survived");
		return Err(if statically_compatible > 0 {
			MatchError::Inapplicable { name, rejections }
		} else {
			MatchError::NoMatch {
				name,
				arg_types,
				rejections,
			}
		});
	};

	let tied: Vec<&'static str> = survivors
		.take_while(|(c, _)| c.priority() == best.priority())
		.map(|(c, _)| c.id())
		.collect();
	if !tied.is_empty() {
		match env.config().matching.tie_break {
			TieBreak::Error => {
				return Err(MatchError::Ambiguous {
					name: request.name.to_owned(),
					priority: best.priority(),
					candidates: std::iter::once(best.id()).chain(tied).collect(),
				});
			}
			TieBreak::RegistrationOrder => {
				debug!(op = request.name, winner = best.id(), tied = tied.len(), "priority tie broken by catalog order");
			}
		}
	}

	debug!(
		op = request.name,
		candidate = best.id(),
		priority = %best.priority(),
		rejected = rejections.len(),
		"op matched"
	);

	Ok(OpMatch {
		def: best.def(),
		op,
		input: primary,
		output: request.output.clone(),
	})
}

/// Steps 3 and 4: types, calling convention and dimensionality.
fn check_static(
	candidate: &Candidate,
	arg_types: &[TypeDescriptor],
	output: Option<&TypeDescriptor>,
	expected: Option<&TypeDescriptor>,
	dims: Option<usize>,
) -> Result<(), RejectReason> {
	let sig = candidate.signature();
	let (min, max) = (sig.required_arity(), sig.max_arity());
	if !(min..=max).contains(&arg_types.len()) {
		return Err(RejectReason::Arity {
			min,
			max,
			actual: arg_types.len(),
		});
	}

	for (index, (slot, actual)) in sig.inputs().iter().zip(arg_types).enumerate() {
		if !slot.bound.is_assignable_from(actual) {
			return Err(RejectReason::InputType {
				index,
				expected: slot.bound.clone(),
				actual: actual.clone(),
			});
		}
	}

	let declared = sig.output_type();
	if let Some(expected) = expected
		&& !declared.is_some_and(|d| expected.is_assignable_from(d))
	{
		return Err(RejectReason::OutputType {
			expected: expected.clone(),
			declared: declared.cloned(),
		});
	}

	let variant = candidate.meta().variant;
	let required = if output.is_some() {
		Variant::COMPUTER
	} else {
		Variant::FUNCTION
	};
	if !variant.contains(required) {
		return Err(RejectReason::Variant {
			required,
			declared: variant,
		});
	}
	if let Some(supplied) = output
		&& !declared.is_some_and(|d| d.is_assignable_from(supplied))
	{
		return Err(RejectReason::OutputType {
			expected: supplied.clone(),
			declared: declared.cloned(),
		});
	}

	if let Some(actual) = dims {
		let meta = candidate.meta();
		if actual < meta.min_dims {
			return Err(RejectReason::TooFewDimensions {
				min: meta.min_dims,
				actual,
			});
		}
		if actual > meta.max_dims {
			return Err(RejectReason::TooManyDimensions {
				max: meta.max_dims,
				actual,
			});
		}
	}

	Ok(())
}

/// Step 5: instantiate and consult the capability predicate.
fn instantiate(
	env: &OpEnvironment,
	candidate: &Candidate,
	values: &[Value],
	primary: &Value,
) -> Result<Box<dyn Op>, RejectReason> {
	let op = candidate
		.instantiate(env, values)
		.map_err(|e| RejectReason::InstantiationFailed(e.to_string()))?;
	let refused = op.as_contingent().is_some_and(|c| !c.conforms(primary));
	if refused {
		return Err(RejectReason::Refused);
	}
	Ok(op)
}
