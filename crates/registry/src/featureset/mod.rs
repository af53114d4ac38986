//! Feature sets: batches of op references computed against one input.
//!
//! # Role
//!
//! A [`FeatureSetSpec`] declares, from its fixed configuration, which op
//! references make up the set and which inputs it applies to.
//! [`OpRefFeatureSet`] caches the reference list and runs the batch;
//! [`FeatureSetOp`] exposes a set as an ordinary op candidate.
//!
//! # Invariants
//!
//! - The reference list is built once, on first use, and shared by every
//!   independent instance.
//! - Results keep reference order.
//! - In fail-fast mode the first failing reference aborts the batch; in
//!   isolate mode every reference is attempted.

use std::sync::{Arc, OnceLock};

use imops_primitives::DoubleType;
use imops_types::{Object, TypeDescriptor, Typed, Value};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::BatchMode;
use crate::core::Variant;
use crate::env::OpEnvironment;
use crate::error::{FeatureError, OpError, RunError};
use crate::exec::{Contingent, Op};

mod opref;

pub use opref::{OpRef, Param};

/// Declares the contents and applicability of a feature set.
pub trait FeatureSetSpec: Clone + Send + Sync + 'static {
	/// Human-readable name.
	fn label(&self) -> &'static str;

	/// Builds the reference list. Called once per set.
	fn init_op_refs(&self) -> Vec<OpRef>;

	fn min_dimensions(&self) -> usize {
		0
	}

	fn max_dimensions(&self) -> usize {
		usize::MAX
	}

	/// Applicability check; by default the input's dimensionality must lie
	/// within the declared bounds.
	fn conforms(&self, input: &Value) -> bool {
		input
			.num_dimensions()
			.is_some_and(|n| n >= self.min_dimensions() && n <= self.max_dimensions())
	}
}

/// Results of one batch.
#[derive(Debug, Clone, Default)]
pub struct FeatureResults {
	pub values: IndexMap<OpRef, Value>,
	/// Failed references; only populated in isolate mode.
	pub failures: IndexMap<OpRef, RunError>,
}

impl FeatureResults {
	/// First value computed by an op named `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values
			.iter()
			.find_map(|(r, v)| (r.name() == name).then_some(v))
	}

	/// First value computed by an op named `name`, read as a real number.
	pub fn real(&self, name: &str) -> Option<f64> {
		self.get(name)?.get::<DoubleType>().map(|d| d.0)
	}

	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}
}

impl Typed for FeatureResults {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::of::<Self>()
	}
}

impl Object for FeatureResults {
	fn static_type(&self) -> TypeDescriptor {
		Self::type_descriptor()
	}
}

/// A feature set with a lazily built, cached reference list.
#[derive(Debug, Clone)]
pub struct OpRefFeatureSet<S> {
	spec: S,
	refs: Arc<OnceLock<Vec<OpRef>>>,
}

impl<S: FeatureSetSpec> OpRefFeatureSet<S> {
	pub fn new(spec: S) -> Self {
		Self {
			spec,
			refs: Arc::new(OnceLock::new()),
		}
	}

	pub fn spec(&self) -> &S {
		&self.spec
	}

	/// The reference list, built on first call.
	pub fn op_refs(&self) -> &[OpRef] {
		self.refs.get_or_init(|| {
			let refs = self.spec.init_op_refs();
			debug!(set = self.spec.label(), refs = refs.len(), "feature references built");
			refs
		})
	}

	pub fn conforms(&self, input: &Value) -> bool {
		self.spec.conforms(input)
	}

	/// Computes every reference against `input`.
	pub fn compute(&self, env: &OpEnvironment, input: &Value) -> Result<FeatureResults, FeatureError> {
		if !self.conforms(input) {
			return Err(FeatureError::Inapplicable {
				label: self.spec.label(),
				dims: input.num_dimensions(),
			});
		}

		let mode = env.config().features.batch;
		let mut results = FeatureResults::default();
		for (reference, outcome) in self.outcomes(env, input) {
			match outcome {
				Ok(value) => {
					results.values.insert(reference.clone(), value);
				}
				Err(source) => {
					debug!(set = self.spec.label(), %reference, error = %source, "feature failed");
					if mode == BatchMode::FailFast {
						return Err(FeatureError::Reference {
							reference: reference.clone(),
							source,
						});
					}
					results.failures.insert(reference.clone(), source);
				}
			}
		}
		Ok(results)
	}

	fn outcomes<'a>(
		&'a self,
		env: &'a OpEnvironment,
		input: &'a Value,
	) -> Box<dyn Iterator<Item = (&'a OpRef, Result<Value, RunError>)> + 'a> {
		let refs = self.op_refs();

		#[cfg(feature = "parallel")]
		if env.config().features.parallel {
			use rayon::prelude::*;
			let collected: Vec<_> = refs
				.par_iter()
				.map(|r| (r, run_reference(env, r, input)))
				.collect();
			return Box::new(collected.into_iter());
		}

		Box::new(refs.iter().map(move |r| (r, run_reference(env, r, input))))
	}
}

fn run_reference(env: &OpEnvironment, reference: &OpRef, input: &Value) -> Result<Value, RunError> {
	env.run(reference.name(), reference.arguments(input))
}

/// A feature set registered as an op candidate.
///
/// Its output is a [`FeatureResults`]; its capability predicate is the
/// set's own applicability check.
pub struct FeatureSetOp<S> {
	set: OpRefFeatureSet<S>,
	env: OpEnvironment,
	input: Value,
	output: Value,
}

impl<S: FeatureSetSpec> FeatureSetOp<S> {
	pub fn new(spec: S, env: &OpEnvironment) -> Self {
		Self {
			set: OpRefFeatureSet::new(spec),
			env: env.clone(),
			input: Value::null(),
			output: Value::null(),
		}
	}

	pub fn set(&self) -> &OpRefFeatureSet<S> {
		&self.set
	}

	pub fn boxed(self) -> Box<dyn Op> {
		Box::new(self)
	}
}

impl<S: FeatureSetSpec> Contingent for FeatureSetOp<S> {
	fn conforms(&self, input: &Value) -> bool {
		self.set.conforms(input)
	}
}

impl<S: FeatureSetSpec> Op for FeatureSetOp<S> {
	fn variant(&self) -> Variant {
		Variant::FUNCTION
	}

	fn bind_input(&mut self, input: Value) {
		self.input = input;
	}

	fn bind_output(&mut self, _output: Value) -> Result<(), OpError> {
		Err(OpError::OutputNotAccepted)
	}

	fn input(&self) -> &Value {
		&self.input
	}

	fn output(&self) -> &Value {
		&self.output
	}

	fn take_output(&mut self) -> Value {
		std::mem::take(&mut self.output)
	}

	fn run(&mut self) -> Result<(), OpError> {
		if self.input.is_null() {
			return Err(OpError::MissingInput);
		}
		let results = self.set.compute(&self.env, &self.input)?;
		self.output = Value::new(results);
		Ok(())
	}

	fn independent_instance(&self) -> Box<dyn Op> {
		Box::new(Self {
			set: self.set.clone(),
			env: self.env.clone(),
			input: Value::null(),
			output: Value::null(),
		})
	}

	fn as_contingent(&self) -> Option<&dyn Contingent> {
		Some(self)
	}
}
