use imops_types::Priority;

/// Represents where an op was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpSource {
	/// Shipped with this crate.
	Builtin,
	/// Defined in a downstream crate via [`crate::op!`].
	Crate(&'static str),
	/// Assembled at runtime and pushed into a catalog builder.
	Runtime,
}

impl OpSource {
	/// Returns the precedence rank of the source (higher is higher precedence).
	pub const fn rank(self) -> u8 {
		match self {
			Self::Builtin => 0,
			Self::Crate(_) => 1,
			Self::Runtime => 2,
		}
	}
}

impl std::fmt::Display for OpSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Builtin => write!(f, "builtin"),
			Self::Crate(name) => write!(f, "crate:{name}"),
			Self::Runtime => write!(f, "runtime"),
		}
	}
}

bitflags::bitflags! {
	/// Calling conventions an op supports.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Variant: u8 {
		/// `calculate(input) -> output`; the op allocates its result.
		const FUNCTION = 1 << 0;
		/// `compute(input, output)`; the caller supplies the output.
		const COMPUTER = 1 << 1;
		/// Both conventions, with observably equal results.
		const HYBRID = Self::FUNCTION.bits() | Self::COMPUTER.bits();
	}
}

/// Static metadata of an op candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpMeta {
	/// Unique identifier, `crate::local_name` by convention.
	pub id: &'static str,
	/// Namespaced op name requests are matched against, e.g. `threshold.otsu`.
	pub name: &'static str,
	pub description: &'static str,
	/// Higher wins among applicable candidates.
	pub priority: Priority,
	pub source: OpSource,
	pub variant: Variant,
	/// Inclusive dimensionality bounds of the primary input.
	pub min_dims: usize,
	pub max_dims: usize,
}

impl OpMeta {
	/// Metadata with normal priority and unconstrained dimensions.
	pub const fn new(id: &'static str, name: &'static str, variant: Variant) -> Self {
		Self {
			id,
			name,
			description: "",
			priority: Priority::NORMAL,
			source: OpSource::Runtime,
			variant,
			min_dims: 0,
			max_dims: usize::MAX,
		}
	}

	pub const fn with_priority(mut self, priority: Priority) -> Self {
		self.priority = priority;
		self
	}

	pub const fn with_dims(mut self, min: usize, max: usize) -> Self {
		self.min_dims = min;
		self.max_dims = max;
		self
	}

	pub const fn with_source(mut self, source: OpSource) -> Self {
		self.source = source;
		self
	}

	pub const fn with_description(mut self, description: &'static str) -> Self {
		self.description = description;
		self
	}

	/// Returns true if `dims` lies within the declared bounds.
	pub const fn accepts_dims(&self, dims: usize) -> bool {
		dims >= self.min_dims && dims <= self.max_dims
	}
}
