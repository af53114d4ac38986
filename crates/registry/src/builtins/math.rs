//! Scalar arithmetic.

use imops_primitives::{DoubleType, FloatType, RealType};

use crate::exec::{ComputerOp, HybridCell, HybridOp, Threadable};
use crate::{OpDef, OpError, OpSignature, OpSource};

/// Secant of the real component.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sec;

impl Threadable for Sec {}

impl<T: RealType> ComputerOp<T, T> for Sec {
	fn compute(&mut self, input: &T, output: &mut T) -> Result<(), OpError> {
		output.set_real(1.0 / input.real().cos());
		Ok(())
	}
}

impl<T: RealType> HybridOp<T, T> for Sec {
	fn create_output(&self, _input: &T) -> Result<T, OpError> {
		Ok(T::default())
	}
}

macro_rules! sec_op {
	($ident:ident, $ty:ty) => {
		crate::op!($ident, {
			name: "math.sec",
			variant: HYBRID,
			description: "Secant of a real number",
			source: OpSource::Builtin,
			signature: || OpSignature::new().input::<$ty>().output::<$ty>(),
			factory: |_env, _args| Ok(HybridCell::<Sec, $ty, $ty>::new(Sec).boxed()),
		});
	};
}

sec_op!(sec_double, DoubleType);
sec_op!(sec_float, FloatType);

pub(super) static DEFS: &[&OpDef] = &[&OP_SEC_DOUBLE, &OP_SEC_FLOAT];
