//! Value histograms.

use imops_primitives::classes::ITERABLE_INTERVAL;
use imops_primitives::{ArrayImg, DoubleType, FloatType, RealType, UnsignedByteType, UnsignedShortType};
use imops_types::{Object, TypeDescriptor, Typed, Value};

use crate::builtins::count_param;
use crate::env::OpEnvironment;
use crate::exec::{FunctionCell, FunctionOp, Op, Threadable};
use crate::{OpDef, OpError, OpSignature, OpSource};

const DEFAULT_BINS: i64 = 256;
/// Largest accepted bin count.
pub const MAX_BINS: usize = 1 << 20;

/// Equal-width histogram over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
	pub min: f64,
	pub max: f64,
	pub counts: Vec<u64>,
}

impl Histogram {
	pub fn total(&self) -> u64 {
		self.counts.iter().sum()
	}
}

impl Typed for Histogram {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::of::<Self>()
	}
}

impl Object for Histogram {
	fn static_type(&self) -> TypeDescriptor {
		Self::type_descriptor()
	}
}

/// Histogram op with a reusable scratch buffer.
///
/// The scratch is per instance; [`Threadable::independent_instance`] hands
/// out an empty one instead of sharing it.
#[derive(Debug, Clone)]
pub struct HistogramOp {
	bins: usize,
	scratch: Vec<u64>,
}

impl HistogramOp {
	pub fn new(bins: usize) -> Self {
		Self {
			bins,
			scratch: Vec::new(),
		}
	}
}

impl Threadable for HistogramOp {
	fn independent_instance(&self) -> Self {
		Self::new(self.bins)
	}
}

impl<T: RealType> FunctionOp<ArrayImg<T>, Histogram> for HistogramOp {
	fn calculate(&mut self, input: &ArrayImg<T>) -> Result<Histogram, OpError> {
		if !(1..=MAX_BINS).contains(&self.bins) {
			return Err(OpError::Failed(format!("bin count {} is out of range", self.bins)));
		}
		let (min, max) = input.min_max().unwrap_or((0.0, 0.0));
		let span = max - min;
		self.scratch.clear();
		self.scratch.resize(self.bins, 0);
		for v in input {
			let bin = if span == 0.0 {
				0
			} else {
				(((v.real() - min) / span * self.bins as f64) as usize).min(self.bins - 1)
			};
			self.scratch[bin] += 1;
		}
		Ok(Histogram {
			min,
			max,
			counts: self.scratch.clone(),
		})
	}
}

fn signature<T: Typed>() -> OpSignature {
	OpSignature::new()
		.input_bound(TypeDescriptor::generic(&ITERABLE_INTERVAL, [T::type_descriptor()]))
		.optional::<i64>()
		.output::<Histogram>()
}

fn factory<T: RealType>(_env: &OpEnvironment, args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	let bins = count_param(args, 1, DEFAULT_BINS, MAX_BINS, "bin count")?;
	let op = HistogramOp::new(bins);
	Ok(FunctionCell::<HistogramOp, ArrayImg<T>, Histogram>::new(op).boxed())
}

macro_rules! histogram_op {
	($ident:ident, $ty:ty) => {
		crate::op!($ident, {
			name: "image.histogram",
			variant: FUNCTION,
			description: "Equal-width value histogram",
			source: OpSource::Builtin,
			signature: signature::<$ty>,
			factory: factory::<$ty>,
		});
	};
}

histogram_op!(histogram_unsigned_byte, UnsignedByteType);
histogram_op!(histogram_unsigned_short, UnsignedShortType);
histogram_op!(histogram_float, FloatType);
histogram_op!(histogram_double, DoubleType);

pub(super) static DEFS: &[&OpDef] = &[
	&OP_HISTOGRAM_UNSIGNED_BYTE,
	&OP_HISTOGRAM_UNSIGNED_SHORT,
	&OP_HISTOGRAM_FLOAT,
	&OP_HISTOGRAM_DOUBLE,
];
