/// Image construction and access errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImgError {
	/// Buffer length does not match the product of the dimensions.
	#[error("buffer holds {actual} elements, dimensions {dims:?} need {expected}")]
	LengthMismatch {
		dims: Vec<usize>,
		expected: usize,
		actual: usize,
	},
	/// A dimension has zero extent.
	#[error("dimension {axis} has zero extent")]
	EmptyAxis { axis: usize },
	/// Two images that must share a shape do not.
	#[error("shape mismatch: {left:?} vs {right:?}")]
	ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
}
