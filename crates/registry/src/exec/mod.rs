//! Execution contract.
//!
//! # Role
//!
//! Every candidate produces an [`Op`] instance: a type-erased object with
//! bound input/output state and a no-argument [`Op::run`]. Implementations
//! are usually written against the typed traits ([`FunctionOp`],
//! [`ComputerOp`], [`HybridOp`]) and wrapped in a cell from [`cells`].
//!
//! # Invariants
//!
//! - A function op allocates its own output; binding one beforehand fails.
//! - A computer op requires a bound output and fails eagerly without one.
//! - A hybrid op's function form is `create_output` followed by the computer
//!   form, so both forms produce equal results.
//! - Input and output never alias; a computer run over one value is rejected.
//! - [`Op::independent_instance`] returns an instance that shares no mutable
//!   state with its origin.

use imops_types::{Object, Value};

use crate::core::Variant;
use crate::error::OpError;

pub mod cells;

pub use cells::{ComputerCell, FunctionCell, HybridCell};

/// Runtime applicability check, consulted after static matching.
pub trait Contingent {
	/// Returns true if this instance can process `input`.
	fn conforms(&self, input: &Value) -> bool;
}

/// A type-erased op instance.
pub trait Op: Send {
	/// Conventions this instance supports.
	fn variant(&self) -> Variant;

	/// Binds the primary input.
	fn bind_input(&mut self, input: Value);

	/// Binds a pre-allocated output.
	fn bind_output(&mut self, output: Value) -> Result<(), OpError>;

	fn input(&self) -> &Value;

	fn output(&self) -> &Value;

	/// Returns the output and clears the binding.
	fn take_output(&mut self) -> Value;

	/// Executes against the bound state.
	fn run(&mut self) -> Result<(), OpError>;

	/// Returns an instance safe to run concurrently with this one.
	fn independent_instance(&self) -> Box<dyn Op>;

	/// The runtime applicability check, if this op has one.
	fn as_contingent(&self) -> Option<&dyn Contingent> {
		None
	}
}

impl std::fmt::Debug for dyn Op {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Op")
			.field("variant", &self.variant())
			.field("input", self.input())
			.field("output", self.output())
			.finish()
	}
}

/// Ops that can be duplicated for use on another thread.
///
/// The default duplicates by cloning, which is right for stateless ops.
/// Ops with scratch state override it to hand out fresh state.
pub trait Threadable: Clone + Send + Sync + 'static {
	fn independent_instance(&self) -> Self {
		self.clone()
	}
}

/// `calculate(input) -> output`.
pub trait FunctionOp<I, O>: Threadable {
	fn calculate(&mut self, input: &I) -> Result<O, OpError>;
}

/// `compute(input, output)`, writing in place.
pub trait ComputerOp<I, O>: Threadable {
	fn compute(&mut self, input: &I, output: &mut O) -> Result<(), OpError>;
}

/// Computer ops that can also allocate their own output.
pub trait HybridOp<I, O>: ComputerOp<I, O> {
	/// Allocates an output suitable for `input`.
	fn create_output(&self, input: &I) -> Result<O, OpError>;

	/// The function form: allocate, then compute.
	fn compute_fresh(&mut self, input: &I) -> Result<O, OpError> {
		let mut output = self.create_output(input)?;
		self.compute(input, &mut output)?;
		Ok(output)
	}
}

/// Reads factory parameter `index` as a `T`, or `default` when omitted or null.
pub fn param_or<T: Object + Clone>(args: &[Value], index: usize, default: T) -> Result<T, OpError> {
	match args.get(index) {
		None => Ok(default),
		Some(v) if v.is_null() => Ok(default),
		Some(v) => v.get::<T>().ok_or_else(|| OpError::ArgumentType {
			expected: std::any::type_name::<T>(),
			actual: v.type_name(),
		}),
	}
}
