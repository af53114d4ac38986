//! Pixel element types.
//!
//! Each element is a thin newtype over its native value with a
//! [`Typed`] descriptor from [`crate::classes`], so images of different
//! element types are distinguishable at dispatch time.

use std::fmt;

use imops_types::{Object, TypeDescriptor, Typed};

use crate::classes::{BIT, BYTE, DOUBLE, FLOAT, UNSIGNED_BYTE, UNSIGNED_SHORT, VECTOR};

/// Element stored in an [`crate::ArrayImg`].
pub trait Element: Typed + Clone + Default + fmt::Debug + Send + Sync + 'static {}

impl<T: Typed + Clone + Default + fmt::Debug + Send + Sync + 'static> Element for T {}

/// Elements with a scalar real value.
pub trait RealType: Element + Copy {
	/// Smallest representable value.
	const MIN_VALUE: f64;
	/// Largest representable value.
	const MAX_VALUE: f64;

	/// Returns the value as `f64`.
	fn real(&self) -> f64;

	/// Stores `value`, rounding and saturating for integer types.
	fn set_real(&mut self, value: f64);

	/// Builds an element from `value`.
	fn from_real(value: f64) -> Self {
		let mut out = Self::default();
		out.set_real(value);
		out
	}
}

/// Real elements backed by an integer.
pub trait IntegerType: RealType {
	/// Returns the value as `i64`.
	fn integer(&self) -> i64;
}

macro_rules! integer_type {
	($(#[$meta:meta])* $name:ident($native:ty), $class:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(pub $native);

		impl Typed for $name {
			fn type_descriptor() -> TypeDescriptor {
				TypeDescriptor::class(&$class)
			}
		}

		impl Object for $name {
			fn static_type(&self) -> TypeDescriptor {
				Self::type_descriptor()
			}
		}

		impl RealType for $name {
			const MIN_VALUE: f64 = <$native>::MIN as f64;
			const MAX_VALUE: f64 = <$native>::MAX as f64;

			fn real(&self) -> f64 {
				self.0 as f64
			}

			fn set_real(&mut self, value: f64) {
				// `as` saturates and maps NaN to zero.
				self.0 = value.round() as $native;
			}
		}

		impl IntegerType for $name {
			fn integer(&self) -> i64 {
				i64::from(self.0)
			}
		}
	};
}

macro_rules! float_type {
	($(#[$meta:meta])* $name:ident($native:ty), $class:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
		pub struct $name(pub $native);

		impl Typed for $name {
			fn type_descriptor() -> TypeDescriptor {
				TypeDescriptor::class(&$class)
			}
		}

		impl Object for $name {
			fn static_type(&self) -> TypeDescriptor {
				Self::type_descriptor()
			}
		}

		impl RealType for $name {
			const MIN_VALUE: f64 = <$native>::MIN as f64;
			const MAX_VALUE: f64 = <$native>::MAX as f64;

			fn real(&self) -> f64 {
				f64::from(self.0)
			}

			fn set_real(&mut self, value: f64) {
				self.0 = value as $native;
			}
		}
	};
}

integer_type!(
	/// Signed 8-bit element.
	ByteType(i8),
	BYTE
);
integer_type!(
	/// Unsigned 8-bit element.
	UnsignedByteType(u8),
	UNSIGNED_BYTE
);
integer_type!(
	/// Unsigned 16-bit element.
	UnsignedShortType(u16),
	UNSIGNED_SHORT
);
float_type!(
	/// Single precision element.
	FloatType(f32),
	FLOAT
);
float_type!(
	/// Double precision element.
	DoubleType(f64),
	DOUBLE
);

/// One-bit element, used for masks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitType(pub bool);

impl Typed for BitType {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::class(&BIT)
	}
}

impl Object for BitType {
	fn static_type(&self) -> TypeDescriptor {
		Self::type_descriptor()
	}
}

impl RealType for BitType {
	const MIN_VALUE: f64 = 0.0;
	const MAX_VALUE: f64 = 1.0;

	fn real(&self) -> f64 {
		if self.0 { 1.0 } else { 0.0 }
	}

	fn set_real(&mut self, value: f64) {
		self.0 = value >= 0.5;
	}
}

impl IntegerType for BitType {
	fn integer(&self) -> i64 {
		i64::from(self.0)
	}
}

/// Multi-channel element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorType<T>(pub Vec<T>);

impl<T: Typed> Typed for VectorType<T> {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::generic(&VECTOR, [T::type_descriptor()])
	}
}
