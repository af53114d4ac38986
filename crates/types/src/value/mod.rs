//! Type-erased runtime values.
//!
//! [`Value`] is what op requests carry: a cheap, shareable handle that may
//! be null. The payload sits behind a reader/writer lock so an in-place
//! (computer) op can write into an output the caller keeps a handle to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{
	MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::descriptor::{LIST, TypeDescriptor, Typed};


/// A value that can travel through op dispatch.
///
/// Every method has a default, so plain data types opt in with an empty
/// impl and get classified by their Rust type name.
pub trait Object: Any + Send + Sync + fmt::Debug {
	/// Rust type name of the concrete value.
	fn type_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// The type this value declares statically, used by the catch-all extractor.
	fn static_type(&self) -> TypeDescriptor {
		TypeDescriptor::raw(self.type_name())
	}

	/// Returns the self-describing view of this value, if it has one.
	fn as_generic_typed(&self) -> Option<&dyn GenericTyped> {
		None
	}

	/// Number of dimensions for values that have a shape.
	fn num_dimensions(&self) -> Option<usize> {
		None
	}
}

/// Values that know their own full generic type.
pub trait GenericTyped {
	/// Returns the precise descriptor of this instance.
	fn generic_type(&self) -> TypeDescriptor;
}

macro_rules! impl_object_typed {
	($($ty:ty),* $(,)?) => {
		$(
			impl Object for $ty {
				fn static_type(&self) -> TypeDescriptor {
					<$ty as Typed>::type_descriptor()
				}
			}
		)*
	};
}

impl_object_typed!(
	bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

/// Shared, nullable handle to an [`Object`].
#[derive(Clone, Default)]
pub struct Value(Option<Arc<RwLock<dyn Object>>>);

impl Value {
	/// Wraps an object.
	pub fn new<T: Object>(object: T) -> Self {
		let cell: Arc<RwLock<dyn Object>> = Arc::new(RwLock::new(object));
		Self(Some(cell))
	}

	/// The null value.
	pub const fn null() -> Self {
		Self(None)
	}

	/// Returns true if this is the null value.
	pub fn is_null(&self) -> bool {
		self.0.is_none()
	}

	/// Locks the payload for reading.
	pub fn read(&self) -> Option<RwLockReadGuard<'_, dyn Object>> {
		self.0.as_ref().map(|cell| cell.read())
	}

	/// Locks the payload for writing.
	pub fn write(&self) -> Option<RwLockWriteGuard<'_, dyn Object>> {
		self.0.as_ref().map(|cell| cell.write())
	}

	/// Returns true if the payload is a `T`.
	pub fn is<T: Object>(&self) -> bool {
		self.read()
			.is_some_and(|obj| (&*obj as &dyn Any).is::<T>())
	}

	/// Borrows the payload as a `T`.
	pub fn downcast_ref<T: Object>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
		let guard = self.read()?;
		RwLockReadGuard::try_map(guard, |obj| (obj as &dyn Any).downcast_ref::<T>()).ok()
	}

	/// Mutably borrows the payload as a `T`.
	pub fn downcast_mut<T: Object>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
		let guard = self.write()?;
		RwLockWriteGuard::try_map(guard, |obj| (obj as &mut dyn Any).downcast_mut::<T>()).ok()
	}

	/// Returns a clone of the payload as a `T`.
	pub fn get<T: Object + Clone>(&self) -> Option<T> {
		self.downcast_ref::<T>().map(|v| T::clone(&v))
	}

	/// Returns true if both handles point at the same payload.
	pub fn ptr_eq(&self, other: &Value) -> bool {
		match (&self.0, &other.0) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// Rust type name of the payload, or `"null"`.
	pub fn type_name(&self) -> &'static str {
		self.read().map_or("null", |obj| obj.type_name())
	}

	/// Dimensionality of the payload, when it has a shape.
	pub fn num_dimensions(&self) -> Option<usize> {
		self.read().and_then(|obj| obj.num_dimensions())
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0 {
			None => f.write_str("null"),
			Some(cell) => match cell.try_read() {
				Some(obj) => fmt::Debug::fmt(&*obj, f),
				None => f.write_str("<locked>"),
			},
		}
	}
}

/// Heterogeneous list of values whose element type is recovered from content.
#[derive(Debug, Clone, Default)]
pub struct ValueList(pub Vec<Value>);

impl ValueList {
	/// Returns the first non-null element.
	pub fn first_present(&self) -> Option<&Value> {
		self.0.iter().find(|v| !v.is_null())
	}
}

impl FromIterator<Value> for ValueList {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl Object for ValueList {
	fn static_type(&self) -> TypeDescriptor {
		TypeDescriptor::class(&LIST)
	}
}
