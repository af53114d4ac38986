//! Builtin feature sets.

use imops_primitives::classes::{ITERABLE_INTERVAL, REAL};
use imops_types::TypeDescriptor;

use super::haralick::{CooccurrenceParams, Feature};
use crate::featureset::{FeatureResults, FeatureSetOp, FeatureSetSpec, OpRef};
use crate::{OpDef, OpSignature, OpSource};

/// Every Haralick feature of one co-occurrence configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haralick3d {
	pub params: CooccurrenceParams,
}

impl FeatureSetSpec for Haralick3d {
	fn label(&self) -> &'static str {
		"3D Haralick Features"
	}

	fn init_op_refs(&self) -> Vec<OpRef> {
		let CooccurrenceParams {
			levels,
			distance,
			orientation,
		} = self.params;
		Feature::ALL
			.iter()
			.map(|f| {
				OpRef::new(f.op_name())
					.with(levels as i64)
					.with(distance as i64)
					.with(orientation.name())
			})
			.collect()
	}

	fn min_dimensions(&self) -> usize {
		3
	}

	fn max_dimensions(&self) -> usize {
		3
	}
}

crate::op!(haralick3d, {
	name: "features.haralick3d",
	variant: FUNCTION,
	description: "Calculates the 3D Haralick features",
	dims: 3 => 3,
	source: OpSource::Builtin,
	signature: || {
		OpSignature::new()
			.input_bound(TypeDescriptor::generic(&ITERABLE_INTERVAL, [TypeDescriptor::class(&REAL)]))
			.optional::<i64>()
			.optional::<i64>()
			.optional::<String>()
			.output::<FeatureResults>()
	},
	factory: |env, args| {
		let spec = Haralick3d {
			params: CooccurrenceParams::from_args(args)?,
		};
		Ok(FeatureSetOp::new(spec, env).boxed())
	},
});

pub(super) static DEFS: &[&OpDef] = &[&OP_HARALICK3D];
