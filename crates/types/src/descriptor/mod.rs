//! Recovered generic type descriptors.
//!
//! # Role
//!
//! A [`TypeDescriptor`] is the runtime stand-in for a generic type: a
//! [`TypeKind`] plus ordered type parameters. Nominal types form a small
//! hierarchy of [`TypeClass`] statics, and assignability walks it.
//!
//! # Invariants
//!
//! - Descriptors are immutable trees; parameters never refer back to an ancestor.
//! - Type parameters are treated as upper bounds (covariant), so `Img<RealType>`
//!   is assignable from `ArrayImg<UnsignedByteType>`.

use std::fmt;
use std::sync::Arc;


/// A nominal type in the dispatch type hierarchy.
///
/// Classes are declared as statics so descriptors can point at them without
/// allocation. Subclasses carry their parameters through to their supers
/// positionally.
pub struct TypeClass {
	/// Display name, unique across the process.
	pub name: &'static str,
	/// Direct supertypes.
	pub supers: &'static [&'static TypeClass],
	/// Number of type parameters.
	pub arity: usize,
}

impl TypeClass {
	/// Returns true if `self` is `other` or transitively extends it.
	pub fn is_subclass_of(&self, other: &TypeClass) -> bool {
		self == other || self.supers.iter().any(|s| s.is_subclass_of(other))
	}
}

impl PartialEq for TypeClass {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for TypeClass {}

impl std::hash::Hash for TypeClass {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.name.hash(state);
	}
}

impl fmt::Debug for TypeClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Generic list of values, see [`crate::ValueList`].
pub static LIST: TypeClass = TypeClass {
	name: "List",
	supers: &[],
	arity: 1,
};

/// Head of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	/// The type of the null value.
	Null,
	/// Unconstrained; every type is assignable to it.
	Any,
	/// A nominal type from the class hierarchy.
	Class(&'static TypeClass),
	/// A host type outside the hierarchy, identified by its Rust type name.
	Raw(&'static str),
}

/// Runtime description of a (possibly generic) type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
	kind: TypeKind,
	params: Arc<[TypeDescriptor]>,
}

impl TypeDescriptor {
	fn leaf(kind: TypeKind) -> Self {
		Self {
			kind,
			params: Arc::from([]),
		}
	}

	/// The descriptor of the null value.
	pub fn null() -> Self {
		Self::leaf(TypeKind::Null)
	}

	/// The unconstrained descriptor.
	pub fn any() -> Self {
		Self::leaf(TypeKind::Any)
	}

	/// A parameterless nominal type. Parameters of a generic class are left unknown.
	pub fn class(class: &'static TypeClass) -> Self {
		Self::leaf(TypeKind::Class(class))
	}

	/// A parameterized nominal type.
	pub fn generic(
		class: &'static TypeClass,
		params: impl IntoIterator<Item = TypeDescriptor>,
	) -> Self {
		let params: Arc<[TypeDescriptor]> = params.into_iter().collect();
		debug_assert!(
			params.len() <= class.arity,
			"{} takes {} type parameters, got {}",
			class.name,
			class.arity,
			params.len()
		);
		Self {
			kind: TypeKind::Class(class),
			params,
		}
	}

	/// A host type known only by name.
	pub fn raw(name: &'static str) -> Self {
		Self::leaf(TypeKind::Raw(name))
	}

	/// The raw descriptor of a Rust type.
	pub fn of<T: ?Sized>() -> Self {
		Self::raw(std::any::type_name::<T>())
	}

	/// Returns the head of this descriptor.
	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	/// Returns the type parameters in declaration order.
	pub fn params(&self) -> &[TypeDescriptor] {
		&self.params
	}

	/// Returns the type parameter at `index`, if present.
	pub fn param(&self, index: usize) -> Option<&TypeDescriptor> {
		self.params.get(index)
	}

	/// Returns true for the null descriptor.
	pub fn is_null(&self) -> bool {
		self.kind == TypeKind::Null
	}

	/// Returns the nominal class, if any.
	pub fn class_of(&self) -> Option<&'static TypeClass> {
		match self.kind {
			TypeKind::Class(c) => Some(c),
			_ => None,
		}
	}

	/// Nesting depth of the descriptor tree (a leaf has depth 1).
	pub fn depth(&self) -> usize {
		1 + self.params.iter().map(Self::depth).max().unwrap_or(0)
	}

	/// Returns true if a value of type `other` may be used where `self` is expected.
	///
	/// Null is assignable to every type. A parameter that `other` does not
	/// carry is unknown and accepted; present parameters must be assignable
	/// in turn.
	pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
		match (self.kind, other.kind) {
			(TypeKind::Any, _) => return true,
			(_, TypeKind::Null) => return true,
			(TypeKind::Null, _) => return false,
			(_, TypeKind::Any) => return false,
			(TypeKind::Raw(a), TypeKind::Raw(b)) if a != b => return false,
			(TypeKind::Class(a), TypeKind::Class(b)) if !b.is_subclass_of(a) => return false,
			(TypeKind::Raw(_), TypeKind::Class(_)) | (TypeKind::Class(_), TypeKind::Raw(_)) => {
				return false;
			}
			_ => {}
		}

		self.params.iter().enumerate().all(|(i, bound)| {
			other
				.params
				.get(i)
				.is_none_or(|actual| bound.is_assignable_from(actual))
		})
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			TypeKind::Null => f.write_str("null")?,
			TypeKind::Any => f.write_str("?")?,
			TypeKind::Class(c) => f.write_str(c.name)?,
			TypeKind::Raw(name) => f.write_str(name)?,
		}
		if !self.params.is_empty() {
			f.write_str("<")?;
			for (i, p) in self.params.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{p}")?;
			}
			f.write_str(">")?;
		}
		Ok(())
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeDescriptor({self})")
	}
}

/// Rust types with a statically known descriptor.
///
/// Op signatures are written in terms of this trait, so declared bounds and
/// recovered argument types share one vocabulary.
pub trait Typed {
	/// Returns the descriptor for `Self`.
	fn type_descriptor() -> TypeDescriptor;
}

macro_rules! impl_typed_raw {
	($($ty:ty),* $(,)?) => {
		$(
			impl Typed for $ty {
				fn type_descriptor() -> TypeDescriptor {
					TypeDescriptor::of::<$ty>()
				}
			}
		)*
	};
}

impl_typed_raw!(
	bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);
