use std::fmt;

use imops_types::TypeDescriptor;

use crate::core::Variant;

/// Why a candidate was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
	/// Wrong number of arguments.
	Arity { min: usize, max: usize, actual: usize },
	/// Argument `index` is not assignable to its bound.
	InputType {
		index: usize,
		expected: TypeDescriptor,
		actual: TypeDescriptor,
	},
	/// The declared output does not satisfy the request.
	OutputType {
		expected: TypeDescriptor,
		declared: Option<TypeDescriptor>,
	},
	/// The candidate lacks the calling convention the request needs.
	Variant { required: Variant, declared: Variant },
	TooFewDimensions { min: usize, actual: usize },
	TooManyDimensions { max: usize, actual: usize },
	/// The capability predicate refused the input.
	Refused,
	/// The factory failed.
	InstantiationFailed(String),
}

impl RejectReason {
	/// True for reasons raised after static matching succeeded.
	pub fn is_runtime(&self) -> bool {
		matches!(self, Self::Refused | Self::InstantiationFailed(_))
	}
}

impl fmt::Display for RejectReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Arity { min, max, actual } if min == max => {
				write!(f, "takes {min} arguments, got {actual}")
			}
			Self::Arity { min, max, actual } => {
				write!(f, "takes {min} to {max} arguments, got {actual}")
			}
			Self::InputType {
				index,
				expected,
				actual,
			} => write!(f, "argument {index}: {actual} is not a {expected}"),
			Self::OutputType {
				expected,
				declared: Some(declared),
			} => write!(f, "output {declared} is not a {expected}"),
			Self::OutputType {
				expected,
				declared: None,
			} => write!(f, "declares no output, {expected} expected"),
			Self::Variant { required, declared } => {
				write!(f, "needs {required:?}, supports {declared:?}")
			}
			Self::TooFewDimensions { min, actual } => {
				write!(f, "needs at least {min} dimensions, input has {actual}")
			}
			Self::TooManyDimensions { max, actual } => {
				write!(f, "accepts at most {max} dimensions, input has {actual}")
			}
			Self::Refused => f.write_str("refused the input at runtime"),
			Self::InstantiationFailed(reason) => write!(f, "could not be instantiated: {reason}"),
		}
	}
}

/// A dropped candidate and the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
	pub candidate: &'static str,
	pub reason: RejectReason,
}
