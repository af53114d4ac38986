use imops_primitives::{ArrayImg, DoubleType, FloatType, RealType, UnsignedByteType, UnsignedShortType};
use imops_types::{Object, TypeDescriptor, Typed, Value};

use super::{CooccurrenceParams, MAX_GREY_LEVELS, signature};
use crate::builtins::quantize;
use crate::env::OpEnvironment;
use crate::exec::{FunctionCell, FunctionOp, Op, Threadable};
use crate::{OpDef, OpError, OpSource};

/// Normalized grey-level co-occurrence matrix.
///
/// Entry `(i, j)` is the fraction of counted pairs whose first voxel has
/// level `i` and whose offset voxel has level `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct CooccurrenceMatrix {
	levels: usize,
	p: Vec<f64>,
	pairs: u64,
}

impl CooccurrenceMatrix {
	/// Counts pairs of a 3-D image.
	pub fn compute<T: RealType>(img: &ArrayImg<T>, params: &CooccurrenceParams) -> Result<Self, OpError> {
		if img.num_dimensions() != 3 {
			return Err(OpError::Failed(format!(
				"co-occurrence matrix needs a 3-D image, got {} dimensions",
				img.num_dimensions()
			)));
		}

		let levels = params.levels;
		if !(1..=MAX_GREY_LEVELS).contains(&levels) {
			return Err(OpError::InvalidParam {
				index: 1,
				reason: format!("grey levels must be between 1 and {MAX_GREY_LEVELS}, got {levels}"),
			});
		}
		let grey = quantize(img, levels);
		let delta = params.delta();
		let mut counts = vec![0u64; levels * levels];
		let mut pairs = 0u64;
		let mut index = 0;
		img.for_each_position(|pos, _| {
			if let Some(other) = img.offset_index(pos, &delta) {
				counts[grey[index] * levels + grey[other]] += 1;
				pairs += 1;
			}
			index += 1;
		});

		Ok(Self::from_counts(levels, &counts, pairs))
	}

	fn from_counts(levels: usize, counts: &[u64], pairs: u64) -> Self {
		let p = if pairs == 0 {
			vec![0.0; counts.len()]
		} else {
			counts.iter().map(|&c| c as f64 / pairs as f64).collect()
		};
		Self { levels, p, pairs }
	}

	pub fn levels(&self) -> usize {
		self.levels
	}

	/// Number of counted pairs before normalization.
	pub fn pairs(&self) -> u64 {
		self.pairs
	}

	pub fn get(&self, i: usize, j: usize) -> f64 {
		self.p[i * self.levels + j]
	}

	/// Non-zero entries as `(i, j, p)`.
	pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
		self.p
			.iter()
			.enumerate()
			.filter(|(_, p)| **p > 0.0)
			.map(|(k, &p)| (k / self.levels, k % self.levels, p))
	}

	/// Row marginal `p_x`.
	pub fn px(&self) -> Vec<f64> {
		self.p.chunks(self.levels).map(|row| row.iter().sum()).collect()
	}

	/// Column marginal `p_y`.
	pub fn py(&self) -> Vec<f64> {
		let mut py = vec![0.0; self.levels];
		for (_, j, p) in self.entries() {
			py[j] += p;
		}
		py
	}

	/// `p_{x+y}`, indexed by `i + j`.
	pub fn sum_marginal(&self) -> Vec<f64> {
		let mut out = vec![0.0; 2 * self.levels - 1];
		for (i, j, p) in self.entries() {
			out[i + j] += p;
		}
		out
	}

	/// `p_{x-y}`, indexed by `|i - j|`.
	pub fn difference_marginal(&self) -> Vec<f64> {
		let mut out = vec![0.0; self.levels];
		for (i, j, p) in self.entries() {
			out[i.abs_diff(j)] += p;
		}
		out
	}
}

impl Typed for CooccurrenceMatrix {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::of::<Self>()
	}
}

impl Object for CooccurrenceMatrix {
	fn static_type(&self) -> TypeDescriptor {
		Self::type_descriptor()
	}
}

#[derive(Debug, Clone)]
pub struct CooccurrenceOp {
	params: CooccurrenceParams,
}

impl Threadable for CooccurrenceOp {}

impl<T: RealType> FunctionOp<ArrayImg<T>, CooccurrenceMatrix> for CooccurrenceOp {
	fn calculate(&mut self, input: &ArrayImg<T>) -> Result<CooccurrenceMatrix, OpError> {
		CooccurrenceMatrix::compute(input, &self.params)
	}
}

fn factory<T: RealType>(_env: &OpEnvironment, args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	let op = CooccurrenceOp {
		params: CooccurrenceParams::from_args(args)?,
	};
	Ok(FunctionCell::<CooccurrenceOp, ArrayImg<T>, CooccurrenceMatrix>::new(op).boxed())
}

macro_rules! cooccurrence_op {
	($ident:ident, $ty:ty) => {
		crate::op!($ident, {
			name: "image.cooccurrenceMatrix",
			variant: FUNCTION,
			description: "3-D grey-level co-occurrence matrix",
			dims: 3 => 3,
			source: OpSource::Builtin,
			signature: signature::<$ty, CooccurrenceMatrix>,
			factory: factory::<$ty>,
		});
	};
}

cooccurrence_op!(cooccurrence_unsigned_byte, UnsignedByteType);
cooccurrence_op!(cooccurrence_unsigned_short, UnsignedShortType);
cooccurrence_op!(cooccurrence_float, FloatType);
cooccurrence_op!(cooccurrence_double, DoubleType);

pub(in crate::builtins) static DEFS: &[&OpDef] = &[
	&OP_COOCCURRENCE_UNSIGNED_BYTE,
	&OP_COOCCURRENCE_UNSIGNED_SHORT,
	&OP_COOCCURRENCE_FLOAT,
	&OP_COOCCURRENCE_DOUBLE,
];
