use imops_primitives::{ArrayImg, BitType, DoubleType, FloatType, UnsignedByteType, VectorType};
use imops_registry::builtins::histogram::Histogram;
use imops_registry::builtins::threshold::OP_OTSU_UNSIGNED_BYTE;
use imops_registry::{MatchError, OpEnvironment, OpRequest, RejectReason, RunError};
use imops_types::Value;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::{bytes, volume};

fn mask(value: &Value) -> Vec<bool> {
	let img = value.downcast_ref::<ArrayImg<BitType>>().expect("mask output");
	img.iter().map(|b| b.0).collect()
}

#[test]
fn test_otsu_selects_the_byte_candidate() {
	let env = OpEnvironment::global();
	let img = Value::new(bytes(&[3, 2], [10, 12, 11, 200, 210, 205]));
	let m = env.find_op(&OpRequest::new("threshold.otsu").arg(img)).unwrap();
	assert_eq!(m.id(), OP_OTSU_UNSIGNED_BYTE.meta.id);
	assert_eq!(mask(&m.run().unwrap()), vec![false, false, false, true, true, true]);
}

/// Multi-channel pixels are not integers, so no threshold candidate fits.
#[test]
fn test_otsu_rejects_vector_pixels() {
	let pixels = vec![VectorType(vec![FloatType(0.0), FloatType(1.0)]); 4];
	let img = Value::new(ArrayImg::from_vec(&[2, 2], pixels).unwrap());
	let err = OpEnvironment::global().run("threshold.otsu", [img]).unwrap_err();

	let RunError::Match(MatchError::NoMatch { rejections, .. }) = &err else {
		panic!("expected no match, got {err}");
	};
	assert_eq!(rejections.len(), 3);
	assert!(
		rejections
			.iter()
			.all(|r| matches!(r.reason, RejectReason::InputType { index: 0, .. })),
		"{err}"
	);
}

#[test]
fn test_histogram_bin_parameter() {
	let env = OpEnvironment::global();
	let img = || Value::new(bytes(&[4], [0, 1, 2, 3]));

	let out = env.run("image.histogram", [img(), Value::new(2i64)]).unwrap();
	let histogram = out.get::<Histogram>().unwrap();
	assert_eq!(histogram.counts, vec![2, 2]);

	let default = env.run("image.histogram", [img()]).unwrap().get::<Histogram>().unwrap();
	assert_eq!(default.counts.len(), 256);
	assert_eq!(default.total(), 4);
}

/// A factory that refuses its parameters makes the op inapplicable rather
/// than unknown. Oversized counts are refused before anything is allocated.
#[rstest]
#[case::zero_bins(
	"image.histogram",
	vec![Value::new(bytes(&[4], [0, 1, 2, 3])), Value::new(0i64)],
	"bin count"
)]
#[case::huge_bins("image.histogram", vec![Value::new(volume(2)), Value::new(i64::MAX)], "bin count")]
#[case::huge_levels(
	"haralick.asm",
	vec![Value::new(volume(2)), Value::new(1i64 << 32), Value::new(1i64), Value::new("HORIZONTAL".to_owned())],
	"grey levels"
)]
fn test_invalid_parameter_is_inapplicable(
	#[case] name: &str,
	#[case] args: Vec<Value>,
	#[case] reason: &str,
) {
	let err = OpEnvironment::global().run(name, args).unwrap_err();
	let RunError::Match(MatchError::Inapplicable { rejections, .. }) = &err else {
		panic!("expected inapplicable, got {err}");
	};
	let failed: Vec<&RejectReason> = rejections
		.iter()
		.map(|r| &r.reason)
		.filter(|reason| reason.is_runtime())
		.collect();
	assert!(
		matches!(failed.as_slice(), [RejectReason::InstantiationFailed(msg)] if msg.contains(reason)),
		"{err}"
	);
}

#[test]
fn test_cooccurrence_needs_a_volume() {
	let img = Value::new(bytes(&[2, 2], [0, 1, 2, 3]));
	let err = OpEnvironment::global()
		.run("image.cooccurrenceMatrix", [img])
		.unwrap_err();
	let RunError::Match(MatchError::NoMatch { rejections, .. }) = &err else {
		panic!("expected no match, got {err}");
	};
	assert!(
		rejections
			.iter()
			.any(|r| matches!(r.reason, RejectReason::TooFewDimensions { min: 3, actual: 2 }))
	);
}

proptest! {
	/// Function and computer forms of a hybrid op produce the same result.
	#[test]
	fn prop_secant_forms_agree(x in -1.5f64..1.5) {
		let env = OpEnvironment::global();
		let allocated = env.run("math.sec", [Value::new(DoubleType(x))]).unwrap();
		let supplied = Value::new(DoubleType(0.0));
		env.run_into("math.sec", [Value::new(DoubleType(x))], supplied.clone()).unwrap();
		prop_assert_eq!(
			allocated.get::<DoubleType>().unwrap().0.to_bits(),
			supplied.get::<DoubleType>().unwrap().0.to_bits()
		);
	}

	#[test]
	fn prop_otsu_forms_agree(pixels in prop::collection::vec(any::<u8>(), 1..64)) {
		let env = OpEnvironment::global();
		let dims = [pixels.len()];
		let img = || Value::new(bytes(&dims, pixels.iter().copied()));

		let allocated = env.run("threshold.otsu", [img()]).unwrap();
		let supplied = Value::new(ArrayImg::<BitType>::new(&dims).unwrap());
		env.run_into("threshold.otsu", [img()], supplied.clone()).unwrap();
		prop_assert_eq!(mask(&allocated), mask(&supplied));
	}
}

#[test]
fn test_float_and_double_inputs_stay_distinct() {
	let env = OpEnvironment::global();
	let out = env.run("math.sec", [Value::new(FloatType(0.0))]).unwrap();
	assert_eq!(out.get::<FloatType>(), Some(FloatType(1.0)));
	assert!(out.get::<DoubleType>().is_none());

	let img = Value::new(ArrayImg::<UnsignedByteType>::new(&[2]).unwrap());
	assert!(env.run("math.sec", [img]).is_err());
}
