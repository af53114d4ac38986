use imops_primitives::{DoubleType, FloatType};
use imops_registry::builtins;
use imops_registry::{
	MatchError, OpDef, OpEnvironment, OpError, OpRequest, OpSource, OpsConfig, RejectReason,
	RunError, Variant,
};
use imops_types::Value;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{env_with, registration_order};
use crate::ops::{OP_FILL, OP_TIE_A, OP_TIE_B};

fn real(value: &Value) -> f64 {
	value.get::<DoubleType>().expect("double output").0
}

fn tie_request() -> OpRequest<'static> {
	OpRequest::new("test.tie").arg(Value::new(DoubleType(0.0)))
}

/// Ops defined with `op!` in this crate sit next to the builtins.
#[test]
fn test_discovered_ops_join_the_global_environment() {
	let env = OpEnvironment::global();
	let fill = env.catalog().get(OP_FILL.meta.id).expect("discovered");
	assert_eq!(fill.meta().source, OpSource::Crate("imops-registry"));
	assert_eq!(fill.meta().variant, Variant::COMPUTER);
	assert!(!env.catalog().named("threshold.otsu").is_empty());
	assert!(env.catalog().collisions().is_empty());
}

#[test]
fn test_priority_tie_is_ambiguous_by_default() {
	let err = OpEnvironment::global().find_op(&tie_request()).unwrap_err();
	let MatchError::Ambiguous { candidates, .. } = &err else {
		panic!("expected ambiguity, got {err}");
	};
	assert_eq!(candidates, &vec![OP_TIE_A.meta.id, OP_TIE_B.meta.id]);
	assert!(err.rejections().is_empty());
}

#[test]
fn test_pin_selects_a_tied_candidate() {
	let out = OpEnvironment::global()
		.find_op(&tie_request().pin(OP_TIE_B.meta.id))
		.unwrap()
		.run()
		.unwrap();
	assert_eq!(real(&out), 2.0);
}

#[test]
fn test_registration_order_takes_first_in_catalog_order() {
	let env = env_with(registration_order());
	let m = env.find_op(&tie_request()).unwrap();
	assert_eq!(m.id(), OP_TIE_A.meta.id);
	assert_eq!(real(&m.run().unwrap()), 1.0);
}

/// A computer-only op cannot serve the function form.
#[test]
fn test_computer_only_op_needs_an_output() {
	let env = OpEnvironment::global();
	let err = env.run("test.fill", [Value::new(DoubleType(1.0))]).unwrap_err();
	let RunError::Match(MatchError::NoMatch { rejections, .. }) = &err else {
		panic!("expected no match, got {err}");
	};
	assert!(matches!(
		rejections[0].reason,
		RejectReason::Variant { required, .. } if required == Variant::FUNCTION
	));

	let output = Value::new(DoubleType(0.0));
	let returned = env
		.run_into("test.fill", [Value::new(DoubleType(1.0))], output.clone())
		.unwrap();
	assert!(returned.ptr_eq(&output));
	assert_eq!(real(&output), 7.0);
}

#[test]
fn test_unbound_computer_output_is_a_contract_violation() {
	let m = OpEnvironment::global()
		.find_op(
			&OpRequest::new("test.fill")
				.arg(Value::new(DoubleType(1.0)))
				.output(Value::new(DoubleType(0.0))),
		)
		.unwrap();
	let mut fresh = m.op().independent_instance();
	fresh.bind_input(Value::new(DoubleType(1.0)));
	assert_eq!(fresh.run().unwrap_err(), OpError::MissingOutput);
}

#[test]
fn test_unknown_name_reports_no_candidates() {
	let err = OpEnvironment::global()
		.find_op(&OpRequest::new("no.such.op").arg(Value::new(1i64)))
		.unwrap_err();
	assert!(matches!(&err, MatchError::NoMatch { rejections, .. } if rejections.is_empty()));
	assert!(err.to_string().contains("no.such.op"), "{err}");
}

fn reversed_builtins() -> OpEnvironment {
	let mut defs: Vec<&'static OpDef> = builtins::all().collect();
	defs.reverse();
	OpEnvironment::builder()
		.ops(defs)
		.build()
		.expect("reversed builtins")
}

proptest! {
	/// The same request against the same candidate set always selects the
	/// same op, whatever order the definitions were registered in.
	#[test]
	fn prop_resolution_is_deterministic(x in -1.0e3f64..1.0e3, single in any::<bool>()) {
		let arg = if single {
			Value::new(FloatType(x as f32))
		} else {
			Value::new(DoubleType(x))
		};
		let request = OpRequest::new("math.sec").arg(arg);
		let ordered = env_with(OpsConfig::default());
		let first = ordered.find_op(&request).unwrap().id();
		let second = ordered.find_op(&request).unwrap().id();
		let reversed = reversed_builtins().find_op(&request).unwrap().id();
		prop_assert_eq!(first, second);
		prop_assert_eq!(first, reversed);
	}
}
