//! Ops registered from outside the registry crate.

use imops_primitives::DoubleType;
use imops_registry::{
	ComputerCell, ComputerOp, FunctionCell, FunctionOp, OpError, OpSignature, Threadable,
};

/// Writes a constant into the caller's output.
#[derive(Debug, Clone)]
pub struct Fill(pub f64);

impl Threadable for Fill {}

impl ComputerOp<DoubleType, DoubleType> for Fill {
	fn compute(&mut self, _input: &DoubleType, output: &mut DoubleType) -> Result<(), OpError> {
		output.0 = self.0;
		Ok(())
	}
}

#[derive(Debug, Clone)]
pub struct Constant(pub f64);

impl Threadable for Constant {}

impl FunctionOp<DoubleType, DoubleType> for Constant {
	fn calculate(&mut self, _input: &DoubleType) -> Result<DoubleType, OpError> {
		Ok(DoubleType(self.0))
	}
}

fn scalar() -> OpSignature {
	OpSignature::new().input::<DoubleType>().output::<DoubleType>()
}

imops_registry::op!(fill, {
	name: "test.fill",
	variant: COMPUTER,
	description: "Fills the output with seven",
	signature: scalar,
	factory: |_env, _args| Ok(ComputerCell::<_, DoubleType, DoubleType>::new(Fill(7.0)).boxed()),
});

imops_registry::op!(tie_a, {
	name: "test.tie",
	variant: FUNCTION,
	signature: scalar,
	factory: |_env, _args| Ok(FunctionCell::<_, DoubleType, DoubleType>::new(Constant(1.0)).boxed()),
});

imops_registry::op!(tie_b, {
	name: "test.tie",
	variant: FUNCTION,
	signature: scalar,
	factory: |_env, _args| Ok(FunctionCell::<_, DoubleType, DoubleType>::new(Constant(2.0)).boxed()),
});
