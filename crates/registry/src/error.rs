use std::fmt;
use std::path::PathBuf;

use imops_primitives::ImgError;
use imops_types::{Priority, TypeDescriptor};

use crate::core::OpSource;
use crate::featureset::OpRef;
use crate::matcher::Rejection;

/// Catalog construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
	/// Two definitions share a `meta.id`.
	#[error("duplicate op id '{id}' ({first} and {second})")]
	DuplicateId {
		id: &'static str,
		first: OpSource,
		second: OpSource,
	},
	/// A declared signature cannot be matched against.
	#[error("op '{id}' has an invalid signature: {reason}")]
	InvalidSignature {
		id: &'static str,
		reason: &'static str,
	},
}

/// Failures to select exactly one candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
	/// No candidate is compatible with the request.
	#[error("no op '{name}' accepts ({}){}", TypeList(.arg_types), Report(.rejections))]
	NoMatch {
		name: String,
		arg_types: Vec<TypeDescriptor>,
		rejections: Vec<Rejection>,
	},
	/// Several candidates tie at the highest priority.
	#[error("ambiguous op '{name}': {} tie at priority {priority}", .candidates.join(", "))]
	Ambiguous {
		name: String,
		priority: Priority,
		candidates: Vec<&'static str>,
	},
	/// Compatible candidates exist but all refused the actual input.
	#[error("op '{name}' is not applicable to this input{}", Report(.rejections))]
	Inapplicable {
		name: String,
		rejections: Vec<Rejection>,
	},
}

impl MatchError {
	/// Per-candidate rejections, empty for ambiguity.
	pub fn rejections(&self) -> &[Rejection] {
		match self {
			Self::NoMatch { rejections, .. } | Self::Inapplicable { rejections, .. } => rejections,
			Self::Ambiguous { .. } => &[],
		}
	}
}

struct TypeList<'a>(&'a [TypeDescriptor]);

impl fmt::Display for TypeList<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, ty) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{ty}")?;
		}
		Ok(())
	}
}

struct Report<'a>(&'a [Rejection]);

impl fmt::Display for Report<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for r in self.0 {
			write!(f, "\n  {}: {}", r.candidate, r.reason)?;
		}
		Ok(())
	}
}

/// Execution-contract violations and execution faults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpError {
	#[error("op run without a bound input")]
	MissingInput,
	/// A computer op needs somewhere to write.
	#[error("computer op run without a bound output")]
	MissingOutput,
	#[error("function op does not accept a pre-allocated output")]
	OutputNotAccepted,
	/// Input and output are the same value.
	#[error("input and output alias the same value")]
	Aliased,
	#[error("expected {expected}, got {actual}")]
	ArgumentType {
		expected: &'static str,
		actual: &'static str,
	},
	#[error("invalid parameter {index}: {reason}")]
	InvalidParam { index: usize, reason: String },
	#[error(transparent)]
	Img(#[from] ImgError),
	/// A feature-set op whose batch failed.
	#[error(transparent)]
	Feature(Box<FeatureError>),
	#[error("{0}")]
	Failed(String),
}

impl From<FeatureError> for OpError {
	fn from(err: FeatureError) -> Self {
		Self::Feature(Box::new(err))
	}
}

/// Either half of a `find` + `run` round trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
	#[error(transparent)]
	Match(#[from] MatchError),
	#[error(transparent)]
	Op(#[from] OpError),
}

/// Feature-set batch failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
	/// The input does not have the dimensionality the set requires.
	#[error("feature set '{label}' does not apply to an input of dimensionality {}", Dims(.dims))]
	Inapplicable {
		label: &'static str,
		dims: Option<usize>,
	},
	/// A reference failed and the batch stopped.
	#[error("feature '{reference}' failed: {source}")]
	Reference {
		reference: OpRef,
		#[source]
		source: RunError,
	},
}

struct Dims<'a>(&'a Option<usize>);

impl fmt::Display for Dims<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Some(n) => write!(f, "{n}"),
			None => f.write_str("unknown"),
		}
	}
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid config: {0}")]
	Parse(#[from] toml::de::Error),
}
