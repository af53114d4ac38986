//! Nominal type classes of the numeric data model.
//!
//! Element classes form the chain numeric → real → integer → concrete
//! pixel type. Container classes take the element type as their single
//! parameter: `ArrayImg<T>` is an `Img<T>`, which is both an
//! `IterableInterval<T>` and a `RandomAccessibleInterval<T>`.

use imops_types::TypeClass;

macro_rules! type_class {
	($(#[$meta:meta])* $ident:ident = $name:literal, [$($sup:ident),*], $arity:literal) => {
		$(#[$meta])*
		pub static $ident: TypeClass = TypeClass {
			name: $name,
			supers: &[$(&$sup),*],
			arity: $arity,
		};
	};
}

type_class!(NUMERIC = "NumericType", [], 0);
type_class!(REAL = "RealType", [NUMERIC], 0);
type_class!(INTEGER = "IntegerType", [REAL], 0);
type_class!(BOOLEAN = "BooleanType", [INTEGER], 0);
type_class!(BIT = "BitType", [BOOLEAN], 0);
type_class!(BYTE = "ByteType", [INTEGER], 0);
type_class!(UNSIGNED_BYTE = "UnsignedByteType", [INTEGER], 0);
type_class!(UNSIGNED_SHORT = "UnsignedShortType", [INTEGER], 0);
type_class!(FLOAT = "FloatType", [REAL], 0);
type_class!(DOUBLE = "DoubleType", [REAL], 0);
type_class!(
	/// Multi-channel pixel. Not a [`REAL`]: channels have no scalar value.
	VECTOR = "VectorType", [], 1
);

type_class!(ITERABLE_INTERVAL = "IterableInterval", [], 1);
type_class!(RANDOM_ACCESSIBLE_INTERVAL = "RandomAccessibleInterval", [], 1);
type_class!(IMG = "Img", [ITERABLE_INTERVAL, RANDOM_ACCESSIBLE_INTERVAL], 1);
type_class!(ARRAY_IMG = "ArrayImg", [IMG], 1);
