use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use imops_types::Value;
use smallvec::SmallVec;

/// A fixed parameter of an [`OpRef`].
#[derive(Debug, Clone)]
pub enum Param {
	Int(i64),
	Real(f64),
	Text(Cow<'static, str>),
	Flag(bool),
}

impl Param {
	/// The runtime value handed to the matcher.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Int(v) => Value::new(*v),
			Self::Real(v) => Value::new(*v),
			Self::Text(v) => Value::new(v.to_string()),
			Self::Flag(v) => Value::new(*v),
		}
	}
}

// Reals compare by bit pattern so references can be map keys.
impl PartialEq for Param {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
			(Self::Text(a), Self::Text(b)) => a == b,
			(Self::Flag(a), Self::Flag(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Param {}

impl Hash for Param {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Self::Int(v) => v.hash(state),
			Self::Real(v) => v.to_bits().hash(state),
			Self::Text(v) => v.hash(state),
			Self::Flag(v) => v.hash(state),
		}
	}
}

impl fmt::Display for Param {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{v}"),
			Self::Real(v) => write!(f, "{v}"),
			Self::Text(v) => f.write_str(v),
			Self::Flag(v) => write!(f, "{v}"),
		}
	}
}

impl From<i64> for Param {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for Param {
	fn from(v: f64) -> Self {
		Self::Real(v)
	}
}

impl From<bool> for Param {
	fn from(v: bool) -> Self {
		Self::Flag(v)
	}
}

impl From<&'static str> for Param {
	fn from(v: &'static str) -> Self {
		Self::Text(Cow::Borrowed(v))
	}
}

impl From<String> for Param {
	fn from(v: String) -> Self {
		Self::Text(Cow::Owned(v))
	}
}

/// An op name plus fixed parameters, resolved against one input later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpRef {
	name: Cow<'static, str>,
	params: SmallVec<[Param; 4]>,
}

impl OpRef {
	pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			params: SmallVec::new(),
		}
	}

	/// Appends a parameter.
	pub fn with(mut self, param: impl Into<Param>) -> Self {
		self.params.push(param.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn params(&self) -> &[Param] {
		&self.params
	}

	/// Request arguments: `input` followed by the parameters.
	pub fn arguments(&self, input: &Value) -> impl Iterator<Item = Value> + '_ {
		std::iter::once(input.clone()).chain(self.params.iter().map(Param::to_value))
	}
}

impl fmt::Display for OpRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)?;
		if !self.params.is_empty() {
			f.write_str("(")?;
			for (i, p) in self.params.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{p}")?;
			}
			f.write_str(")")?;
		}
		Ok(())
	}
}
