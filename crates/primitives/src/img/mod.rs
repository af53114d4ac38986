use imops_types::{GenericTyped, Object, TypeDescriptor, Typed};
use smallvec::SmallVec;

use crate::classes::ARRAY_IMG;
use crate::{Element, ImgError, RealType};


/// Image extents, fastest-varying axis first.
pub type Dims = SmallVec<[usize; 4]>;

/// Dense image stored in one flat buffer, first axis fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayImg<T> {
	dims: Dims,
	data: Vec<T>,
}

impl<T: Element> ArrayImg<T> {
	/// Creates an image filled with `T::default()`.
	pub fn new(dims: &[usize]) -> Result<Self, ImgError> {
		let len = checked_len(dims)?;
		Ok(Self {
			dims: Dims::from_slice(dims),
			data: vec![T::default(); len],
		})
	}

	/// Wraps an existing buffer.
	pub fn from_vec(dims: &[usize], data: Vec<T>) -> Result<Self, ImgError> {
		let expected = checked_len(dims)?;
		if data.len() != expected {
			return Err(ImgError::LengthMismatch {
				dims: dims.to_vec(),
				expected,
				actual: data.len(),
			});
		}
		Ok(Self {
			dims: Dims::from_slice(dims),
			data,
		})
	}

	/// Creates an image whose element at each position is `f(position)`.
	pub fn from_fn(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Result<Self, ImgError> {
		let len = checked_len(dims)?;
		let mut pos = Dims::from_elem(0, dims.len());
		let mut data = Vec::with_capacity(len);
		for _ in 0..len {
			data.push(f(&pos));
			advance(&mut pos, dims);
		}
		Ok(Self {
			dims: Dims::from_slice(dims),
			data,
		})
	}

	/// Creates an image of the same shape with every element mapped.
	pub fn map<U: Element>(&self, f: impl FnMut(&T) -> U) -> ArrayImg<U> {
		ArrayImg {
			dims: self.dims.clone(),
			data: self.data.iter().map(f).collect(),
		}
	}

	/// Creates an image of the same shape filled with `U::default()`.
	pub fn blank_like<U: Element>(&self) -> ArrayImg<U> {
		ArrayImg {
			dims: self.dims.clone(),
			data: vec![U::default(); self.data.len()],
		}
	}
}

impl<T> ArrayImg<T> {
	pub fn dims(&self) -> &[usize] {
		&self.dims
	}

	pub fn num_dimensions(&self) -> usize {
		self.dims.len()
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Flat index of `pos`, or `None` when out of bounds.
	pub fn index_of(&self, pos: &[usize]) -> Option<usize> {
		if pos.len() != self.dims.len() {
			return None;
		}
		let mut index = 0;
		let mut stride = 1;
		for (&p, &d) in pos.iter().zip(&self.dims) {
			if p >= d {
				return None;
			}
			index += p * stride;
			stride *= d;
		}
		Some(index)
	}

	/// Flat index of `pos + delta`, or `None` when that leaves the image.
	///
	/// `delta` may be shorter than the image rank; missing axes are zero.
	pub fn offset_index(&self, pos: &[usize], delta: &[isize]) -> Option<usize> {
		let mut shifted = Dims::with_capacity(pos.len());
		for (axis, &p) in pos.iter().enumerate() {
			let d = delta.get(axis).copied().unwrap_or(0);
			shifted.push(p.checked_add_signed(d)?);
		}
		self.index_of(&shifted)
	}

	pub fn get(&self, pos: &[usize]) -> Option<&T> {
		self.index_of(pos).map(|i| &self.data[i])
	}

	pub fn get_mut(&mut self, pos: &[usize]) -> Option<&mut T> {
		self.index_of(pos).map(|i| &mut self.data[i])
	}

	pub fn as_slice(&self) -> &[T] {
		&self.data
	}

	pub fn as_mut_slice(&mut self) -> &mut [T] {
		&mut self.data
	}

	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.data.iter()
	}

	pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
		self.data.iter_mut()
	}

	/// Calls `f` with every position and its element, first axis fastest.
	pub fn for_each_position(&self, mut f: impl FnMut(&[usize], &T)) {
		let mut pos = Dims::from_elem(0, self.dims.len());
		for value in &self.data {
			f(&pos, value);
			advance(&mut pos, &self.dims);
		}
	}

	/// Fails unless `other` has exactly the same extents.
	pub fn ensure_same_shape<U>(&self, other: &ArrayImg<U>) -> Result<(), ImgError> {
		if self.dims == other.dims {
			Ok(())
		} else {
			Err(ImgError::ShapeMismatch {
				left: self.dims.to_vec(),
				right: other.dims.to_vec(),
			})
		}
	}
}

impl<T: RealType> ArrayImg<T> {
	/// Smallest and largest element value.
	pub fn min_max(&self) -> Option<(f64, f64)> {
		self.data.iter().map(RealType::real).fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
	}
}

fn checked_len(dims: &[usize]) -> Result<usize, ImgError> {
	if let Some(axis) = dims.iter().position(|&d| d == 0) {
		return Err(ImgError::EmptyAxis { axis });
	}
	Ok(dims.iter().product())
}

fn advance(pos: &mut [usize], dims: &[usize]) {
	for (p, &d) in pos.iter_mut().zip(dims) {
		*p += 1;
		if *p < d {
			return;
		}
		*p = 0;
	}
}

impl<'a, T> IntoIterator for &'a ArrayImg<T> {
	type Item = &'a T;
	type IntoIter = std::slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.data.iter()
	}
}

impl<T: Typed> Typed for ArrayImg<T> {
	fn type_descriptor() -> TypeDescriptor {
		TypeDescriptor::generic(&ARRAY_IMG, [T::type_descriptor()])
	}
}

impl<T: Element> GenericTyped for ArrayImg<T> {
	fn generic_type(&self) -> TypeDescriptor {
		Self::type_descriptor()
	}
}

impl<T: Element> Object for ArrayImg<T> {
	fn static_type(&self) -> TypeDescriptor {
		TypeDescriptor::class(&ARRAY_IMG)
	}

	fn as_generic_typed(&self) -> Option<&dyn GenericTyped> {
		Some(self)
	}

	fn num_dimensions(&self) -> Option<usize> {
		Some(self.dims.len())
	}
}
