//! Adapters from the typed op traits to [`Op`].
//!
//! A cell owns the typed op, the bound values and an optional
//! applicability predicate. Arguments are downcast to the op's concrete
//! input and output types at run time.

use std::any::type_name;
use std::marker::PhantomData;

use imops_types::{Object, Value};

use super::{ComputerOp, Contingent, FunctionOp, HybridOp, Op, Threadable};
use crate::core::Variant;
use crate::error::OpError;

/// Predicate over the typed op and its concrete input.
pub type Conforms<C, I> = fn(&C, &I) -> bool;

fn argument_error<T>(actual: &Value) -> OpError {
	OpError::ArgumentType {
		expected: type_name::<T>(),
		actual: actual.type_name(),
	}
}

fn check_conforms<C, I: Object>(op: &C, conforms: Option<Conforms<C, I>>, input: &Value) -> bool {
	match conforms {
		None => true,
		Some(f) => input.downcast_ref::<I>().is_some_and(|i| f(op, &i)),
	}
}

macro_rules! cell_common {
	() => {
		fn bind_input(&mut self, input: Value) {
			self.input = input;
		}

		fn input(&self) -> &Value {
			&self.input
		}

		fn output(&self) -> &Value {
			&self.output
		}

		fn take_output(&mut self) -> Value {
			std::mem::take(&mut self.output)
		}

		fn as_contingent(&self) -> Option<&dyn Contingent> {
			self.conforms.map(|_| self as &dyn Contingent)
		}
	};
}

/// Cell for a [`FunctionOp`].
pub struct FunctionCell<C, I, O> {
	op: C,
	conforms: Option<Conforms<C, I>>,
	input: Value,
	output: Value,
	_io: PhantomData<fn(&I) -> O>,
}

impl<C, I, O> FunctionCell<C, I, O>
where
	C: FunctionOp<I, O>,
	I: Object,
	O: Object,
{
	pub fn new(op: C) -> Self {
		Self {
			op,
			conforms: None,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		}
	}

	/// Attaches a runtime applicability predicate.
	pub fn with_conforms(mut self, conforms: Conforms<C, I>) -> Self {
		self.conforms = Some(conforms);
		self
	}

	pub fn boxed(self) -> Box<dyn Op> {
		Box::new(self)
	}
}

impl<C, I, O> Contingent for FunctionCell<C, I, O>
where
	C: FunctionOp<I, O>,
	I: Object,
	O: Object,
{
	fn conforms(&self, input: &Value) -> bool {
		check_conforms(&self.op, self.conforms, input)
	}
}

impl<C, I, O> Op for FunctionCell<C, I, O>
where
	C: FunctionOp<I, O>,
	I: Object,
	O: Object,
{
	cell_common!();

	fn variant(&self) -> Variant {
		Variant::FUNCTION
	}

	fn bind_output(&mut self, _output: Value) -> Result<(), OpError> {
		Err(OpError::OutputNotAccepted)
	}

	fn run(&mut self) -> Result<(), OpError> {
		if self.input.is_null() {
			return Err(OpError::MissingInput);
		}
		let out = {
			let input = self
				.input
				.downcast_ref::<I>()
				.ok_or_else(|| argument_error::<I>(&self.input))?;
			self.op.calculate(&input)?
		};
		self.output = Value::new(out);
		Ok(())
	}

	fn independent_instance(&self) -> Box<dyn Op> {
		Box::new(Self {
			op: Threadable::independent_instance(&self.op),
			conforms: self.conforms,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		})
	}
}

/// Cell for a [`ComputerOp`].
pub struct ComputerCell<C, I, O> {
	op: C,
	conforms: Option<Conforms<C, I>>,
	input: Value,
	output: Value,
	_io: PhantomData<fn(&I) -> O>,
}

impl<C, I, O> ComputerCell<C, I, O>
where
	C: ComputerOp<I, O>,
	I: Object,
	O: Object,
{
	pub fn new(op: C) -> Self {
		Self {
			op,
			conforms: None,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		}
	}

	/// Attaches a runtime applicability predicate.
	pub fn with_conforms(mut self, conforms: Conforms<C, I>) -> Self {
		self.conforms = Some(conforms);
		self
	}

	pub fn boxed(self) -> Box<dyn Op> {
		Box::new(self)
	}
}

/// Runs the computer form against bound values.
fn compute_into<C, I, O>(op: &mut C, input: &Value, output: &Value) -> Result<(), OpError>
where
	C: ComputerOp<I, O>,
	I: Object,
	O: Object,
{
	if input.is_null() {
		return Err(OpError::MissingInput);
	}
	if output.is_null() {
		return Err(OpError::MissingOutput);
	}
	// Both locks would be the same lock.
	if input.ptr_eq(output) {
		return Err(OpError::Aliased);
	}
	let i = input
		.downcast_ref::<I>()
		.ok_or_else(|| argument_error::<I>(input))?;
	let mut o = output
		.downcast_mut::<O>()
		.ok_or_else(|| argument_error::<O>(output))?;
	op.compute(&i, &mut o)
}

impl<C, I, O> Contingent for ComputerCell<C, I, O>
where
	C: ComputerOp<I, O>,
	I: Object,
	O: Object,
{
	fn conforms(&self, input: &Value) -> bool {
		check_conforms(&self.op, self.conforms, input)
	}
}

impl<C, I, O> Op for ComputerCell<C, I, O>
where
	C: ComputerOp<I, O>,
	I: Object,
	O: Object,
{
	cell_common!();

	fn variant(&self) -> Variant {
		Variant::COMPUTER
	}

	fn bind_output(&mut self, output: Value) -> Result<(), OpError> {
		if output.is_null() {
			return Err(OpError::MissingOutput);
		}
		self.output = output;
		Ok(())
	}

	fn run(&mut self) -> Result<(), OpError> {
		compute_into::<C, I, O>(&mut self.op, &self.input, &self.output)
	}

	fn independent_instance(&self) -> Box<dyn Op> {
		Box::new(Self {
			op: Threadable::independent_instance(&self.op),
			conforms: self.conforms,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		})
	}
}

/// Cell for a [`HybridOp`]: computer form when an output is bound,
/// function form otherwise.
pub struct HybridCell<C, I, O> {
	op: C,
	conforms: Option<Conforms<C, I>>,
	input: Value,
	output: Value,
	_io: PhantomData<fn(&I) -> O>,
}

impl<C, I, O> HybridCell<C, I, O>
where
	C: HybridOp<I, O>,
	I: Object,
	O: Object,
{
	pub fn new(op: C) -> Self {
		Self {
			op,
			conforms: None,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		}
	}

	/// Attaches a runtime applicability predicate.
	pub fn with_conforms(mut self, conforms: Conforms<C, I>) -> Self {
		self.conforms = Some(conforms);
		self
	}

	pub fn boxed(self) -> Box<dyn Op> {
		Box::new(self)
	}
}

impl<C, I, O> Contingent for HybridCell<C, I, O>
where
	C: HybridOp<I, O>,
	I: Object,
	O: Object,
{
	fn conforms(&self, input: &Value) -> bool {
		check_conforms(&self.op, self.conforms, input)
	}
}

impl<C, I, O> Op for HybridCell<C, I, O>
where
	C: HybridOp<I, O>,
	I: Object,
	O: Object,
{
	cell_common!();

	fn variant(&self) -> Variant {
		Variant::HYBRID
	}

	fn bind_output(&mut self, output: Value) -> Result<(), OpError> {
		self.output = output;
		Ok(())
	}

	fn run(&mut self) -> Result<(), OpError> {
		if !self.output.is_null() {
			return compute_into::<C, I, O>(&mut self.op, &self.input, &self.output);
		}
		if self.input.is_null() {
			return Err(OpError::MissingInput);
		}
		let out = {
			let input = self
				.input
				.downcast_ref::<I>()
				.ok_or_else(|| argument_error::<I>(&self.input))?;
			self.op.compute_fresh(&input)?
		};
		self.output = Value::new(out);
		Ok(())
	}

	fn independent_instance(&self) -> Box<dyn Op> {
		Box::new(Self {
			op: Threadable::independent_instance(&self.op),
			conforms: self.conforms,
			input: Value::null(),
			output: Value::null(),
			_io: PhantomData,
		})
	}
}
