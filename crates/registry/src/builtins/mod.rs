//! Ops shipped with the crate.
//!
//! Every builtin is defined with [`crate::op!`], so it is also discovered
//! through `inventory`; [`all`] lists them explicitly for environments
//! built without discovery. The catalog drops the second sighting of a
//! definition.

use imops_primitives::{ArrayImg, RealType};
use imops_types::Value;

use crate::exec::param_or;
use crate::{OpDef, OpError};

pub mod featuresets;
pub mod haralick;
pub mod histogram;
pub mod math;
pub mod threshold;

/// Every builtin definition.
pub fn all() -> impl Iterator<Item = &'static OpDef> {
	[
		math::DEFS,
		threshold::DEFS,
		histogram::DEFS,
		haralick::cooccurrence::DEFS,
		haralick::features::DEFS,
		featuresets::DEFS,
	]
	.into_iter()
	.flatten()
	.copied()
}

/// Reads a count parameter at `index`, which must lie in `1..=max`.
///
/// The bound keeps buffers sized from the count allocatable.
pub(crate) fn count_param(
	args: &[Value],
	index: usize,
	default: i64,
	max: usize,
	what: &str,
) -> Result<usize, OpError> {
	let value = param_or(args, index, default)?;
	usize::try_from(value)
		.ok()
		.filter(|v| (1..=max).contains(v))
		.ok_or_else(|| OpError::InvalidParam {
			index,
			reason: format!("{what} must be between 1 and {max}, got {value}"),
		})
}

/// Maps the image's value range onto `0..levels`, in buffer order.
///
/// The last level is closed so the maximum lands in it; a constant image
/// maps entirely to level 0.
pub(crate) fn quantize<T: RealType>(img: &ArrayImg<T>, levels: usize) -> Vec<usize> {
	let Some((min, max)) = img.min_max() else {
		return Vec::new();
	};
	let span = max - min;
	img.iter()
		.map(|v| {
			if span == 0.0 {
				0
			} else {
				(((v.real() - min) / span * levels as f64) as usize).min(levels - 1)
			}
		})
		.collect()
}
