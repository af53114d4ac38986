use std::thread;

use imops_registry::builtins::histogram::Histogram;
use imops_registry::{FeatureResults, OpEnvironment, OpRequest};
use imops_types::Value;
use pretty_assertions::assert_eq;

use crate::common::{bytes, volume};

fn ramp(offset: u8) -> Value {
	Value::new(bytes(&[16], (0..16u8).map(|v| v.wrapping_mul(offset))))
}

/// Independent instances of one match run in parallel without sharing
/// scratch state.
#[test]
fn test_independent_histograms_in_parallel() {
	let env = OpEnvironment::global();
	let m = env
		.find_op(&OpRequest::new("image.histogram").arg(ramp(1)).arg(Value::new(8i64)))
		.unwrap();

	// One instance reused in sequence; its scratch carries over between runs.
	let mut shared = m.op().independent_instance();
	let expected: Vec<Histogram> = (1..=8u8)
		.map(|k| {
			shared.bind_input(ramp(k));
			shared.run().unwrap();
			shared.take_output().get::<Histogram>().unwrap()
		})
		.collect();

	let instances: Vec<_> = (1..=8u8).map(|k| (k, m.op().independent_instance())).collect();
	let actual: Vec<Histogram> = thread::scope(|s| {
		let handles: Vec<_> = instances
			.into_iter()
			.map(|(k, mut op)| {
				s.spawn(move || {
					for _ in 0..16 {
						op.bind_input(ramp(k));
						op.run().unwrap();
					}
					op.take_output().get::<Histogram>().unwrap()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(actual, expected);
}

/// The environment handle is shared across threads; each thread resolves
/// and runs its own feature set.
#[test]
fn test_feature_sets_from_many_threads() {
	let env = OpEnvironment::global();
	let input = Value::new(volume(6));
	let reference = env.run("features.haralick3d", [input.clone()]).unwrap();
	let reference = reference.get::<FeatureResults>().unwrap();

	let outputs: Vec<FeatureResults> = thread::scope(|s| {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let input = input.clone();
				s.spawn(move || {
					env.run("features.haralick3d", [input])
						.unwrap()
						.get::<FeatureResults>()
						.unwrap()
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	for out in outputs {
		let got: Vec<Option<f64>> = out.values.keys().map(|r| out.real(r.name())).collect();
		let want: Vec<Option<f64>> = reference.values.keys().map(|r| reference.real(r.name())).collect();
		assert_eq!(got, want);
	}
}
