//! Global thresholding.

use imops_primitives::classes::{IMG, ITERABLE_INTERVAL};
use imops_primitives::{
	ArrayImg, BitType, ByteType, IntegerType, UnsignedByteType, UnsignedShortType,
};
use imops_types::{TypeDescriptor, Typed};

use super::quantize;
use crate::exec::{ComputerOp, HybridCell, HybridOp, Threadable};
use crate::{OpDef, OpError, OpSignature, OpSource};

const BINS: usize = 256;

/// Otsu's method: the threshold maximizing between-class variance of a
/// 256-bin histogram spanning the image's value range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Otsu;

impl Threadable for Otsu {}

impl Otsu {
	/// Threshold bin; elements in higher bins are foreground.
	pub fn threshold(histogram: &[u64]) -> usize {
		let total: u64 = histogram.iter().sum();
		let weighted: f64 = histogram
			.iter()
			.enumerate()
			.map(|(i, &n)| i as f64 * n as f64)
			.sum();

		let (mut below, mut below_sum) = (0u64, 0.0f64);
		let (mut best, mut best_variance) = (0, -1.0f64);
		for (t, &n) in histogram.iter().enumerate() {
			below += n;
			below_sum += t as f64 * n as f64;
			let above = total - below;
			if below == 0 || above == 0 {
				continue;
			}
			let mean_below = below_sum / below as f64;
			let mean_above = (weighted - below_sum) / above as f64;
			let variance = below as f64 * above as f64 * (mean_below - mean_above).powi(2);
			if variance > best_variance {
				best = t;
				best_variance = variance;
			}
		}
		best
	}
}

impl<T: IntegerType> ComputerOp<ArrayImg<T>, ArrayImg<BitType>> for Otsu {
	fn compute(&mut self, input: &ArrayImg<T>, output: &mut ArrayImg<BitType>) -> Result<(), OpError> {
		input.ensure_same_shape(output)?;
		let bins = quantize(input, BINS);
		let mut histogram = [0u64; BINS];
		for &b in &bins {
			histogram[b] += 1;
		}
		let t = Self::threshold(&histogram);
		for (out, &b) in output.iter_mut().zip(&bins) {
			*out = BitType(b > t);
		}
		Ok(())
	}
}

impl<T: IntegerType> HybridOp<ArrayImg<T>, ArrayImg<BitType>> for Otsu {
	fn create_output(&self, input: &ArrayImg<T>) -> Result<ArrayImg<BitType>, OpError> {
		Ok(input.blank_like())
	}
}

fn signature<T: Typed>() -> OpSignature {
	OpSignature::new()
		.input_bound(TypeDescriptor::generic(&ITERABLE_INTERVAL, [T::type_descriptor()]))
		.output_bound(TypeDescriptor::generic(&IMG, [BitType::type_descriptor()]))
}

macro_rules! otsu_op {
	($ident:ident, $ty:ty) => {
		crate::op!($ident, {
			name: "threshold.otsu",
			variant: HYBRID,
			description: "Otsu global threshold",
			source: OpSource::Builtin,
			signature: signature::<$ty>,
			factory: |_env, _args| {
				Ok(HybridCell::<Otsu, ArrayImg<$ty>, ArrayImg<BitType>>::new(Otsu).boxed())
			},
		});
	};
}

otsu_op!(otsu_byte, ByteType);
otsu_op!(otsu_unsigned_byte, UnsignedByteType);
otsu_op!(otsu_unsigned_short, UnsignedShortType);

pub(super) static DEFS: &[&OpDef] = &[&OP_OTSU_BYTE, &OP_OTSU_UNSIGNED_BYTE, &OP_OTSU_UNSIGNED_SHORT];
