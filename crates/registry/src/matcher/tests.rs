use std::sync::atomic::{AtomicUsize, Ordering};

use imops_primitives::{ArrayImg, DoubleType, FloatType, RealType};
use imops_types::{Object, Priority, Typed, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::catalog::OpFactory;
use crate::config::{MatchingConfig, OpsConfig, TieBreak};
use crate::core::{OpSignature, OpSource};
use crate::error::RunError;
use crate::exec::{ComputerOp, FunctionCell, FunctionOp, HybridCell, HybridOp, Threadable, param_or};

#[derive(Debug, Clone)]
struct Scale(f64);

impl Threadable for Scale {}

impl<T: RealType> ComputerOp<T, T> for Scale {
	fn compute(&mut self, input: &T, output: &mut T) -> Result<(), OpError> {
		output.set_real(input.real() * self.0);
		Ok(())
	}
}

impl<T: RealType> HybridOp<T, T> for Scale {
	fn create_output(&self, _input: &T) -> Result<T, OpError> {
		Ok(T::default())
	}
}

static SUM_RUNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
struct Sum;

impl Threadable for Sum {}

impl FunctionOp<ArrayImg<DoubleType>, DoubleType> for Sum {
	fn calculate(&mut self, input: &ArrayImg<DoubleType>) -> Result<DoubleType, OpError> {
		SUM_RUNS.fetch_add(1, Ordering::SeqCst);
		Ok(DoubleType(input.iter().map(|v| v.0).sum()))
	}
}

fn scale<T: RealType + Object>(_env: &OpEnvironment, args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	let k = param_or(args, 1, 2.0f64)?;
	Ok(HybridCell::<_, T, T>::new(Scale(k)).boxed())
}

fn scale_function(_env: &OpEnvironment, _args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	Ok(FunctionCell::<_, DoubleType, DoubleType>::new(ScaleFn).boxed())
}

#[derive(Debug, Clone)]
struct ScaleFn;

impl Threadable for ScaleFn {}

impl FunctionOp<DoubleType, DoubleType> for ScaleFn {
	fn calculate(&mut self, input: &DoubleType) -> Result<DoubleType, OpError> {
		Ok(DoubleType(input.0 * 10.0))
	}
}

fn non_negative(_env: &OpEnvironment, _args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	Ok(HybridCell::<_, DoubleType, DoubleType>::new(Scale(1.0))
		.with_conforms(|_, x| x.0 >= 0.0)
		.boxed())
}

fn sum(_env: &OpEnvironment, _args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	Ok(FunctionCell::<_, ArrayImg<DoubleType>, DoubleType>::new(Sum).boxed())
}

fn broken(_env: &OpEnvironment, _args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	Err(OpError::InvalidParam {
		index: 1,
		reason: "broken".into(),
	})
}

fn scalar<T: Typed>() -> OpSignature {
	OpSignature::new().input::<T>().optional::<f64>().output::<T>()
}

fn image() -> OpSignature {
	OpSignature::new().input::<ArrayImg<DoubleType>>().output::<DoubleType>()
}

struct Def {
	meta: OpMeta,
	signature: fn() -> OpSignature,
	factory: OpFactory,
}

impl Def {
	fn new(id: &'static str, name: &'static str, factory: OpFactory) -> Self {
		Self {
			meta: OpMeta::new(id, name, Variant::HYBRID),
			signature: scalar::<DoubleType>,
			factory,
		}
	}

	fn variant(mut self, variant: Variant) -> Self {
		self.meta.variant = variant;
		self
	}

	fn priority(mut self, priority: Priority) -> Self {
		self.meta = self.meta.with_priority(priority);
		self
	}

	fn source(mut self, source: OpSource) -> Self {
		self.meta = self.meta.with_source(source);
		self
	}

	fn dims(mut self, min: usize, max: usize) -> Self {
		self.meta = self.meta.with_dims(min, max);
		self
	}

	fn signature(mut self, signature: fn() -> OpSignature) -> Self {
		self.signature = signature;
		self
	}

	fn leak(self) -> &'static OpDef {
		Box::leak(Box::new(OpDef {
			meta: self.meta,
			signature: self.signature,
			factory: self.factory,
		}))
	}
}

fn env_with(config: OpsConfig, defs: impl IntoIterator<Item = Def>) -> OpEnvironment {
	OpEnvironment::builder()
		.config(config)
		.ops(defs.into_iter().map(Def::leak))
		.build()
		.unwrap()
}

fn env(defs: impl IntoIterator<Item = Def>) -> OpEnvironment {
	env_with(OpsConfig::default(), defs)
}

fn registration_order() -> OpsConfig {
	OpsConfig {
		matching: MatchingConfig {
			tie_break: TieBreak::RegistrationOrder,
			..MatchingConfig::default()
		},
		..OpsConfig::default()
	}
}

fn double(x: f64) -> Value {
	Value::new(DoubleType(x))
}

fn volume(dims: &[usize]) -> Value {
	Value::new(ArrayImg::<DoubleType>::new(dims).unwrap())
}

#[test]
fn test_argument_type_selects_candidate() {
	let env = env([
		Def::new("scale.double", "scale", scale::<DoubleType>),
		Def::new("scale.float", "scale", scale::<FloatType>).signature(scalar::<FloatType>),
	]);
	let m = env
		.find_op(&OpRequest::new("scale").arg(Value::new(FloatType(1.5))))
		.unwrap();
	assert_eq!(m.id(), "scale.float");
	assert_eq!(m.run().unwrap().get::<FloatType>(), Some(FloatType(3.0)));
}

#[test]
fn test_no_match_reports_every_candidate() {
	let env = env([
		Def::new("scale.double", "scale", scale::<DoubleType>),
		Def::new("scale.float", "scale", scale::<FloatType>).signature(scalar::<FloatType>),
	]);
	let err = env
		.find_op(&OpRequest::new("scale").arg(Value::new(3i64)))
		.unwrap_err();
	let MatchError::NoMatch {
		name,
		arg_types,
		rejections,
	} = &err
	else {
		panic!("expected no-match, got {err:?}");
	};
	assert_eq!(name, "scale");
	assert_eq!(arg_types, &vec![TypeDescriptor::of::<i64>()]);
	let rejected: Vec<_> = rejections.iter().map(|r| r.candidate).collect();
	assert_eq!(rejected, vec!["scale.double", "scale.float"]);
	assert!(rejections
		.iter()
		.all(|r| matches!(r.reason, RejectReason::InputType { index: 0, .. })));
	assert!(err.to_string().contains("i64"), "{err}");
}

#[test]
fn test_unknown_name_is_no_match() {
	let err = env([]).find_op(&OpRequest::new("missing").arg(double(1.0))).unwrap_err();
	assert!(matches!(err, MatchError::NoMatch { ref rejections, .. } if rejections.is_empty()));
}

#[rstest]
#[case::required_only(vec![double(1.0)], Ok(2.0))]
#[case::with_optional(vec![double(1.0), Value::new(5.0f64)], Ok(5.0))]
#[case::too_few(vec![], Err(()))]
#[case::too_many(vec![double(1.0), Value::new(1.0f64), Value::new(1.0f64)], Err(()))]
fn test_arity(#[case] args: Vec<Value>, #[case] expected: Result<f64, ()>) {
	let env = env([Def::new("scale.double", "scale", scale::<DoubleType>)]);
	let result = env.run("scale", args);
	match expected {
		Ok(v) => assert_eq!(result.unwrap().get::<DoubleType>(), Some(DoubleType(v))),
		Err(()) => {
			let err = result.unwrap_err();
			let RunError::Match(MatchError::NoMatch { rejections, .. }) = &err else {
				panic!("expected no-match, got {err:?}");
			};
			assert!(matches!(rejections[0].reason, RejectReason::Arity { min: 1, max: 2, .. }));
		}
	}
}

#[test]
fn test_highest_priority_wins() {
	let env = env([
		Def::new("low", "scale", scale::<DoubleType>).priority(Priority::LOW),
		Def::new("high", "scale", scale::<DoubleType>).priority(Priority::HIGH),
		Def::new("normal", "scale", scale::<DoubleType>),
	]);
	let m = env.find_op(&OpRequest::new("scale").arg(double(1.0))).unwrap();
	assert_eq!(m.id(), "high");
	assert_eq!(m.priority(), Priority::HIGH);
}

#[test]
fn test_tie_is_ambiguous() {
	let env = env([
		Def::new("tie.b", "scale", scale::<DoubleType>),
		Def::new("tie.a", "scale", scale::<DoubleType>),
		Def::new("below", "scale", scale::<DoubleType>).priority(Priority::LOW),
	]);
	let err = env.find_op(&OpRequest::new("scale").arg(double(1.0))).unwrap_err();
	let MatchError::Ambiguous {
		priority,
		candidates,
		..
	} = &err
	else {
		panic!("expected ambiguity, got {err:?}");
	};
	assert_eq!(*priority, Priority::NORMAL);
	assert_eq!(candidates, &vec!["tie.a", "tie.b"]);
}

#[test]
fn test_pin_disambiguates() {
	let env = env([
		Def::new("tie.a", "scale", scale::<DoubleType>),
		Def::new("tie.b", "scale", scale::<DoubleType>),
	]);
	let m = env
		.find_op(&OpRequest::new("scale").arg(double(1.0)).pin("tie.b"))
		.unwrap();
	assert_eq!(m.id(), "tie.b");

	let err = env
		.find_op(&OpRequest::new("scale").arg(double(1.0)).pin("nope"))
		.unwrap_err();
	assert!(matches!(err, MatchError::NoMatch { .. }));
}

#[test]
fn test_registration_order_tie_break() {
	let env = env_with(
		registration_order(),
		[
			Def::new("tie.a", "scale", scale::<DoubleType>).source(OpSource::Builtin),
			Def::new("tie.z", "scale", scale::<DoubleType>).source(OpSource::Runtime),
			Def::new("tie.b", "scale", scale::<DoubleType>).source(OpSource::Runtime),
		],
	);
	let m = env.find_op(&OpRequest::new("scale").arg(double(1.0))).unwrap();
	assert_eq!(m.id(), "tie.b");
}

#[rstest]
#[case::too_few(&[4, 4], "needs at least 3")]
#[case::too_many(&[2, 2, 2, 2], "at most 3")]
fn test_dimension_bounds(#[case] dims: &[usize], #[case] message: &str) {
	let env = env([Def::new("sum.3d", "sum", sum)
		.variant(Variant::FUNCTION)
		.signature(image)
		.dims(3, 3)]);
	let err = env.find_op(&OpRequest::new("sum").arg(volume(dims))).unwrap_err();
	assert!(matches!(err, MatchError::NoMatch { .. }), "{err:?}");
	assert!(err.to_string().contains(message), "{err}");

	assert!(env.find_op(&OpRequest::new("sum").arg(volume(&[2, 2, 2]))).is_ok());
}

#[test]
fn test_matching_does_not_run() {
	let env = env([Def::new("sum", "sum", sum).variant(Variant::FUNCTION).signature(image)]);
	let before = SUM_RUNS.load(Ordering::SeqCst);
	let m = env.find_op(&OpRequest::new("sum").arg(volume(&[3]))).unwrap();
	assert_eq!(SUM_RUNS.load(Ordering::SeqCst), before);
	m.run().unwrap();
	assert!(SUM_RUNS.load(Ordering::SeqCst) > before);
}

#[test]
fn test_refusal_falls_through_to_lower_priority() {
	let env = env([
		Def::new("guarded", "root", non_negative).priority(Priority::HIGH),
		Def::new("fallback", "root", scale::<DoubleType>),
	]);
	let accept = env.find_op(&OpRequest::new("root").arg(double(4.0))).unwrap();
	assert_eq!(accept.id(), "guarded");
	let refuse = env.find_op(&OpRequest::new("root").arg(double(-4.0))).unwrap();
	assert_eq!(refuse.id(), "fallback");
}

#[test]
fn test_refusal_is_inapplicable_not_no_match() {
	let env = env([Def::new("guarded", "root", non_negative)]);
	let err = env.find_op(&OpRequest::new("root").arg(double(-1.0))).unwrap_err();
	let MatchError::Inapplicable { rejections, .. } = &err else {
		panic!("expected inapplicable, got {err:?}");
	};
	assert_eq!(
		rejections,
		&vec![Rejection {
			candidate: "guarded",
			reason: RejectReason::Refused,
		}]
	);
}

#[test]
fn test_instantiation_failure_is_reported() {
	let env = env([Def::new("broken", "scale", broken)]);
	let err = env.find_op(&OpRequest::new("scale").arg(double(1.0))).unwrap_err();
	assert!(matches!(
		&err.rejections()[0].reason,
		RejectReason::InstantiationFailed(msg) if msg.contains("broken")
	));
	assert!(matches!(err, MatchError::Inapplicable { .. }));
}

#[test]
fn test_calling_convention_filters_candidates() {
	let env = env([
		Def::new("fn", "scale", scale_function)
			.variant(Variant::FUNCTION)
			.priority(Priority::HIGH),
		Def::new("computer", "scale", scale::<DoubleType>).variant(Variant::COMPUTER),
	]);

	let function = env.run("scale", [double(1.0)]).unwrap();
	assert_eq!(function.get::<DoubleType>(), Some(DoubleType(10.0)));

	let out = double(0.0);
	let m = env
		.find_op(&OpRequest::new("scale").arg(double(1.0)).output(out.clone()))
		.unwrap();
	assert_eq!(m.id(), "computer");
	let returned = m.run().unwrap();
	assert!(returned.ptr_eq(&out), "computer form returns the caller's output");
	assert_eq!(out.get::<DoubleType>(), Some(DoubleType(2.0)));
}

#[test]
fn test_supplied_output_type_is_checked() {
	let env = env([Def::new("computer", "scale", scale::<DoubleType>).variant(Variant::COMPUTER)]);
	let err = env
		.find_op(&OpRequest::new("scale").arg(double(1.0)).output(Value::new(FloatType(0.0))))
		.unwrap_err();
	assert!(matches!(
		err.rejections()[0].reason,
		RejectReason::OutputType { .. }
	));
}

#[test]
fn test_expected_output_filters_candidates() {
	let env = env([Def::new("sum", "sum", sum).variant(Variant::FUNCTION).signature(image)]);
	let ok = OpRequest::new("sum")
		.arg(volume(&[2]))
		.expect_output(DoubleType::type_descriptor());
	assert!(env.find_op(&ok).is_ok());

	let wrong = OpRequest::new("sum")
		.arg(volume(&[2]))
		.expect_output(FloatType::type_descriptor());
	assert!(env.find_op(&wrong).is_err());
}

#[test]
fn test_explicit_type_overrides_extraction() {
	let env = env([Def::new("scale.double", "scale", scale::<DoubleType>)]);
	let request = OpRequest::new("scale").typed_arg(double(1.0), FloatType::type_descriptor());
	assert!(matches!(env.find_op(&request), Err(MatchError::NoMatch { .. })));
}

#[test]
fn test_null_parameter_is_assignable() {
	let env = env([Def::new("scale.double", "scale", scale::<DoubleType>)]);
	let out = env.run("scale", [double(3.0), Value::null()]).unwrap();
	assert_eq!(out.get::<DoubleType>(), Some(DoubleType(6.0)));
}
