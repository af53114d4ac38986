//! Numeric data model for imops: pixel element types, their nominal type
//! classes, and [`ArrayImg`], a dense n-dimensional image.
//!
//! Ops are written against these types and declare their bounds with the
//! classes in [`classes`], so an `ArrayImg<UnsignedByteType>` argument can
//! satisfy an `IterableInterval<IntegerType>` bound at dispatch time.

pub mod classes;
/// Pixel element types.
pub mod element;
mod error;
/// Dense n-dimensional images.
pub mod img;

pub use element::{
	BitType, ByteType, DoubleType, Element, FloatType, IntegerType, RealType, UnsignedByteType,
	UnsignedShortType, VectorType,
};
pub use error::ImgError;
pub use img::{ArrayImg, Dims};
