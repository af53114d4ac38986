use imops_primitives::{ArrayImg, DoubleType, UnsignedByteType};
use imops_registry::builtins::featuresets::Haralick3d;
use imops_registry::builtins::haralick::{CooccurrenceParams, Feature, MatrixOrientation3D};
use imops_registry::{
	FeatureError, FeatureResults, FeatureSetSpec, MatchError, OpEnvironment, OpRef,
	OpRefFeatureSet, OpsConfig, RejectReason, RunError,
};
use imops_types::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::{bytes, env_with, isolate, volume};

fn results(value: &Value) -> FeatureResults {
	value.get::<FeatureResults>().expect("feature results")
}

/// The full set over a 100^3 byte volume yields every feature, in order.
#[test]
fn test_haralick3d_over_a_volume() {
	let out = OpEnvironment::global()
		.run("features.haralick3d", [Value::new(volume(100))])
		.unwrap();
	let results = results(&out);

	assert!(results.is_complete());
	let names: Vec<&str> = results.values.keys().map(OpRef::name).collect();
	let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.op_name()).collect();
	assert_eq!(names, expected);
	assert_eq!(names.len(), 17);

	for (reference, value) in &results.values {
		let v = results.real(reference.name()).unwrap();
		assert!(v.is_finite(), "{reference} = {v} ({value:?})");
	}
	let asm = results.real("haralick.asm").unwrap();
	assert!(asm > 0.0 && asm <= 1.0, "asm {asm}");
	assert!(results.real("haralick.entropy").unwrap() >= 0.0);
}

/// Set parameters reach every reference unchanged.
#[test]
fn test_haralick3d_parameters_flow_to_references() {
	let env = OpEnvironment::global();
	let params = || {
		[
			Value::new(volume(8)),
			Value::new(16i64),
			Value::new(2i64),
			Value::new("depth".to_owned()),
		]
	};
	let out = env.run("features.haralick3d", params()).unwrap();
	let results = results(&out);

	let first = results.values.keys().next().unwrap();
	assert_eq!(first.to_string(), "haralick.asm(16, 2, DEPTH)");

	let contrast = env.run("haralick.contrast", params()).unwrap();
	assert_eq!(
		results.real("haralick.contrast"),
		contrast.get::<DoubleType>().map(|d| d.0)
	);
}

#[test]
fn test_haralick3d_rejects_unknown_orientation() {
	let err = OpEnvironment::global()
		.run(
			"features.haralick3d",
			[Value::new(volume(4)), Value::new(8i64), Value::new(1i64), Value::new("sideways".to_owned())],
		)
		.unwrap_err();
	assert!(matches!(err, RunError::Match(MatchError::Inapplicable { .. })), "{err}");
}

#[rstest]
#[case::plane(&[4, 4])]
#[case::hypervolume(&[2, 2, 2, 2])]
fn test_haralick3d_needs_exactly_three_dimensions(#[case] dims: &[usize]) {
	let img = ArrayImg::<UnsignedByteType>::new(dims).unwrap();
	let err = OpEnvironment::global()
		.run("features.haralick3d", [Value::new(img.clone())])
		.unwrap_err();
	let RunError::Match(MatchError::NoMatch { rejections, .. }) = &err else {
		panic!("expected no match, got {err}");
	};
	assert!(matches!(
		rejections[0].reason,
		RejectReason::TooFewDimensions { .. } | RejectReason::TooManyDimensions { .. }
	));

	let set = OpRefFeatureSet::new(Haralick3d::default());
	let err = set.compute(OpEnvironment::global(), &Value::new(img)).unwrap_err();
	assert!(
		matches!(err, FeatureError::Inapplicable { dims: Some(n), .. } if n == dims.len()),
		"{err}"
	);
}

#[test]
fn test_haralick3d_spec() {
	let spec = Haralick3d {
		params: CooccurrenceParams {
			orientation: MatrixOrientation3D::AntiDiagonalDiagonal,
			..CooccurrenceParams::default()
		},
	};
	assert_eq!(spec.label(), "3D Haralick Features");
	let refs = spec.init_op_refs();
	assert_eq!(refs.len(), Feature::ALL.len());
	assert!(refs.iter().all(|r| r.to_string().ends_with("(32, 1, ANTIDIAGONAL_DIAGONAL)")));
}

/// Two histograms, one with an invalid bin count.
#[derive(Debug, Clone)]
struct HistogramPair;

impl FeatureSetSpec for HistogramPair {
	fn label(&self) -> &'static str {
		"histogram pair"
	}

	fn init_op_refs(&self) -> Vec<OpRef> {
		vec![
			OpRef::new("image.histogram").with(0i64),
			OpRef::new("image.histogram").with(4i64),
		]
	}
}

#[test]
fn test_batch_mode_comes_from_configuration() {
	let input = Value::new(bytes(&[2, 2], [0, 50, 100, 150]));
	let set = OpRefFeatureSet::new(HistogramPair);

	let err = set.compute(&env_with(OpsConfig::default()), &input).unwrap_err();
	let FeatureError::Reference { reference, .. } = &err else {
		panic!("expected a failing reference, got {err}");
	};
	assert_eq!(reference.to_string(), "image.histogram(0)");

	let results = set.compute(&env_with(isolate()), &input).unwrap();
	assert_eq!(results.values.len(), 1);
	assert_eq!(results.failures.len(), 1);
	let (failed, _) = results.failures.first().unwrap();
	assert_eq!(failed.params().len(), 1);
	assert!(results.get("image.histogram").is_some());
}
