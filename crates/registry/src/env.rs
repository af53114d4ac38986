//! The op environment: catalog, extractors and configuration in one handle.

use std::sync::{Arc, LazyLock};

use imops_types::{ExtractorRegistry, TypeDescriptor, Value, extractors};
use tracing::{debug, error};

use crate::catalog::{Catalog, CatalogBuilder, OpDef, discovered};
use crate::config::OpsConfig;
use crate::error::{CatalogError, MatchError, RunError};
use crate::matcher::{self, OpMatch, OpRequest};

enum Extractors {
	Global,
	Owned(ExtractorRegistry),
}

struct Inner {
	catalog: Catalog,
	extractors: Extractors,
	config: OpsConfig,
}

/// Cheaply cloneable handle used to find and run ops.
#[derive(Clone)]
pub struct OpEnvironment {
	inner: Arc<Inner>,
}

impl OpEnvironment {
	pub fn builder() -> OpEnvironmentBuilder {
		OpEnvironmentBuilder::default()
	}

	/// The process-wide environment: builtins plus every discovered op.
	pub fn global() -> &'static OpEnvironment {
		&GLOBAL
	}

	fn empty() -> Self {
		Self {
			inner: Arc::new(Inner {
				catalog: Catalog::default(),
				extractors: Extractors::Global,
				config: OpsConfig::default(),
			}),
		}
	}

	pub fn catalog(&self) -> &Catalog {
		&self.inner.catalog
	}

	pub fn extractors(&self) -> &ExtractorRegistry {
		match &self.inner.extractors {
			Extractors::Global => extractors(),
			Extractors::Owned(registry) => registry,
		}
	}

	pub fn config(&self) -> &OpsConfig {
		&self.inner.config
	}

	/// Recovers the descriptor of `value`.
	pub fn type_of(&self, value: &Value) -> TypeDescriptor {
		self.extractors().resolve(value)
	}

	/// Selects the best candidate for `request` without running it.
	pub fn find_op(&self, request: &OpRequest<'_>) -> Result<OpMatch, MatchError> {
		matcher::find(self, request)
	}

	/// Matches and runs `request`, returning its output.
	pub fn run_request(&self, request: &OpRequest<'_>) -> Result<Value, RunError> {
		Ok(self.find_op(request)?.run()?)
	}

	/// Function form: the op allocates the output.
	pub fn run(&self, name: &str, args: impl IntoIterator<Item = Value>) -> Result<Value, RunError> {
		self.run_request(&OpRequest::new(name).args(args))
	}

	/// Computer form: the op writes into `output`, which is returned.
	pub fn run_into(
		&self,
		name: &str,
		args: impl IntoIterator<Item = Value>,
		output: Value,
	) -> Result<Value, RunError> {
		self.run_request(&OpRequest::new(name).args(args).output(output))
	}
}

impl std::fmt::Debug for OpEnvironment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OpEnvironment")
			.field("ops", &self.catalog().len())
			.field("extractors", self.extractors())
			.field("config", self.config())
			.finish()
	}
}

/// Assembles an [`OpEnvironment`].
#[derive(Default)]
pub struct OpEnvironmentBuilder {
	defs: Vec<&'static OpDef>,
	extractors: Option<ExtractorRegistry>,
	config: OpsConfig,
}

impl OpEnvironmentBuilder {
	pub fn config(mut self, config: OpsConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the process-wide extractor registry.
	pub fn extractors(mut self, registry: ExtractorRegistry) -> Self {
		self.extractors = Some(registry);
		self
	}

	pub fn op(mut self, def: &'static OpDef) -> Self {
		self.defs.push(def);
		self
	}

	pub fn ops(mut self, defs: impl IntoIterator<Item = &'static OpDef>) -> Self {
		self.defs.extend(defs);
		self
	}

	/// Adds the ops shipped with this crate.
	#[cfg(feature = "builtins")]
	pub fn with_builtins(self) -> Self {
		self.ops(crate::builtins::all())
	}

	/// Adds every op submitted through [`crate::op!`].
	pub fn with_discovered(self) -> Self {
		self.ops(discovered())
	}

	pub fn build(self) -> Result<OpEnvironment, CatalogError> {
		let mut catalog = CatalogBuilder::new().duplicate_policy(self.config.matching.duplicate_ids);
		catalog.extend(self.defs);
		let catalog = catalog.build()?;
		let extractors = match self.extractors {
			Some(registry) => Extractors::Owned(registry),
			None => Extractors::Global,
		};
		Ok(OpEnvironment {
			inner: Arc::new(Inner {
				catalog,
				extractors,
				config: self.config,
			}),
		})
	}
}

static GLOBAL: LazyLock<OpEnvironment> = LazyLock::new(|| {
	let builder = OpEnvironment::builder();
	#[cfg(feature = "builtins")]
	let builder = builder.with_builtins();
	match builder.with_discovered().build() {
		Ok(env) => {
			debug!(ops = env.catalog().len(), "global op environment ready");
			env
		}
		Err(err) => {
			error!(error = %err, "discovered ops rejected, global environment has builtins only");
			let builder = OpEnvironment::builder();
			#[cfg(feature = "builtins")]
			let builder = builder.with_builtins();
			builder.build().unwrap_or_else(|_| OpEnvironment::empty())
		}
	}
});
