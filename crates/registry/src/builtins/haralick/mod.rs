//! 3-D grey-level co-occurrence texture features.
//!
//! # Role
//!
//! Every op here quantizes a 3-D image to a fixed number of grey levels,
//! counts voxel pairs separated by `distance` steps along one
//! [`MatrixOrientation3D`], and reduces the normalized counts.
//!
//! # Invariants
//!
//! - Quantization maps the image's value range onto `0..levels`; a constant
//!   image quantizes to level 0.
//! - The matrix counts ordered pairs `(voxel, voxel + offset)` only; it is
//!   not symmetrized.
//! - A matrix with no pairs is all zeros and every feature of it is finite.

use std::fmt;
use std::str::FromStr;

use imops_primitives::classes::ITERABLE_INTERVAL;
use imops_types::{TypeDescriptor, Typed, Value};

use crate::OpSignature;
use crate::builtins::count_param;
use crate::error::OpError;
use crate::exec::param_or;

pub mod cooccurrence;
pub mod features;

pub use cooccurrence::CooccurrenceMatrix;
pub use features::Feature;

pub const DEFAULT_GREY_LEVELS: i64 = 32;
pub const DEFAULT_DISTANCE: i64 = 1;
/// Largest accepted grey-level count; the matrix holds `levels^2` entries.
pub const MAX_GREY_LEVELS: usize = 1 << 10;

/// Direction of the voxel pairs counted into a co-occurrence matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatrixOrientation3D {
	#[default]
	Horizontal,
	Vertical,
	Diagonal,
	AntiDiagonal,
	HorizontalVertical,
	HorizontalDiagonal,
	VerticalVertical,
	VerticalDiagonal,
	DiagonalVertical,
	DiagonalDiagonal,
	AntiDiagonalVertical,
	AntiDiagonalDiagonal,
	Depth,
}

impl MatrixOrientation3D {
	pub const ALL: [Self; 13] = [
		Self::Horizontal,
		Self::Vertical,
		Self::Diagonal,
		Self::AntiDiagonal,
		Self::HorizontalVertical,
		Self::HorizontalDiagonal,
		Self::VerticalVertical,
		Self::VerticalDiagonal,
		Self::DiagonalVertical,
		Self::DiagonalDiagonal,
		Self::AntiDiagonalVertical,
		Self::AntiDiagonalDiagonal,
		Self::Depth,
	];

	/// Unit step as `(x, y, z)`.
	pub const fn offset(self) -> [isize; 3] {
		match self {
			Self::Horizontal => [1, 0, 0],
			Self::Vertical => [0, 1, 0],
			Self::Diagonal => [1, -1, 0],
			Self::AntiDiagonal => [1, 1, 0],
			Self::HorizontalVertical => [1, 0, -1],
			Self::HorizontalDiagonal => [1, 0, 1],
			Self::VerticalVertical => [0, 1, -1],
			Self::VerticalDiagonal => [0, 1, 1],
			Self::DiagonalVertical => [1, -1, -1],
			Self::DiagonalDiagonal => [1, -1, 1],
			Self::AntiDiagonalVertical => [1, 1, -1],
			Self::AntiDiagonalDiagonal => [1, 1, 1],
			Self::Depth => [0, 0, 1],
		}
	}

	/// Upper-case name, as accepted by [`FromStr`].
	pub const fn name(self) -> &'static str {
		match self {
			Self::Horizontal => "HORIZONTAL",
			Self::Vertical => "VERTICAL",
			Self::Diagonal => "DIAGONAL",
			Self::AntiDiagonal => "ANTIDIAGONAL",
			Self::HorizontalVertical => "HORIZONTAL_VERTICAL",
			Self::HorizontalDiagonal => "HORIZONTAL_DIAGONAL",
			Self::VerticalVertical => "VERTICAL_VERTICAL",
			Self::VerticalDiagonal => "VERTICAL_DIAGONAL",
			Self::DiagonalVertical => "DIAGONAL_VERTICAL",
			Self::DiagonalDiagonal => "DIAGONAL_DIAGONAL",
			Self::AntiDiagonalVertical => "ANTIDIAGONAL_VERTICAL",
			Self::AntiDiagonalDiagonal => "ANTIDIAGONAL_DIAGONAL",
			Self::Depth => "DEPTH",
		}
	}
}

impl fmt::Display for MatrixOrientation3D {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for MatrixOrientation3D {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|o| o.name().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown orientation '{s}'"))
	}
}

/// Parameters shared by every co-occurrence op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooccurrenceParams {
	pub levels: usize,
	pub distance: usize,
	pub orientation: MatrixOrientation3D,
}

impl Default for CooccurrenceParams {
	fn default() -> Self {
		Self {
			levels: DEFAULT_GREY_LEVELS as usize,
			distance: DEFAULT_DISTANCE as usize,
			orientation: MatrixOrientation3D::default(),
		}
	}
}

impl CooccurrenceParams {
	/// Reads `(levels, distance, orientation)` from request arguments 1..=3,
	/// defaulting any that are omitted.
	pub fn from_args(args: &[Value]) -> Result<Self, OpError> {
		let levels = count_param(args, 1, DEFAULT_GREY_LEVELS, MAX_GREY_LEVELS, "grey levels")?;
		let distance = count_param(args, 2, DEFAULT_DISTANCE, isize::MAX as usize, "distance")?;
		let orientation = param_or(args, 3, MatrixOrientation3D::default().name().to_owned())?
			.parse::<MatrixOrientation3D>()
			.map_err(|reason| OpError::InvalidParam { index: 3, reason })?;
		Ok(Self {
			levels,
			distance,
			orientation,
		})
	}

	/// Voxel offset of a counted pair.
	pub fn delta(&self) -> [isize; 3] {
		self.orientation.offset().map(|step| step * self.distance as isize)
	}
}

/// `(IterableInterval<T>, levels?, distance?, orientation?) -> O`
fn signature<T: Typed, O: Typed>() -> OpSignature {
	OpSignature::new()
		.input_bound(TypeDescriptor::generic(&ITERABLE_INTERVAL, [T::type_descriptor()]))
		.optional::<i64>()
		.optional::<i64>()
		.optional::<String>()
		.output::<O>()
}
