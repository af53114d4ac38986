/// Ordering weight for extractors and op candidates (higher wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(pub i16);

impl Priority {
	/// Reserved for the null handler.
	pub const FIRST: Self = Self(i16::MAX);
	pub const VERY_HIGH: Self = Self(10_000);
	pub const HIGH: Self = Self(100);
	pub const NORMAL: Self = Self(0);
	pub const LOW: Self = Self(-100);
	pub const VERY_LOW: Self = Self(-10_000);
	/// Reserved for catch-all fallbacks.
	pub const LAST: Self = Self(i16::MIN);

	/// Returns the raw priority value.
	pub const fn get(self) -> i16 {
		self.0
	}
}

impl From<i16> for Priority {
	fn from(value: i16) -> Self {
		Self(value)
	}
}

impl core::fmt::Display for Priority {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match *self {
			Self::FIRST => f.write_str("first"),
			Self::LAST => f.write_str("last"),
			Self(p) => write!(f, "{p}"),
		}
	}
}
