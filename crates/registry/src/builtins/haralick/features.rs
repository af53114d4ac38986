use imops_primitives::{ArrayImg, DoubleType, FloatType, RealType, UnsignedByteType, UnsignedShortType};
use imops_types::Value;

use super::{CooccurrenceMatrix, CooccurrenceParams, signature};
use crate::exec::{FunctionCell, FunctionOp, Op, Threadable};
use crate::{OpDef, OpError, OpSource};

/// `-sum p ln p` over the non-zero probabilities.
fn entropy(p: impl IntoIterator<Item = f64>) -> f64 {
	-p.into_iter().filter(|&v| v > 0.0).map(|v| v * v.ln()).sum::<f64>()
}

fn mean(p: &[f64]) -> f64 {
	p.iter().enumerate().map(|(k, v)| k as f64 * v).sum()
}

fn variance(p: &[f64], mean: f64) -> f64 {
	p.iter().enumerate().map(|(k, v)| (k as f64 - mean).powi(2) * v).sum()
}

fn ratio(num: f64, den: f64) -> f64 {
	if den == 0.0 { 0.0 } else { num / den }
}

macro_rules! haralick_op {
	($ident:ident, $variant:ident, $name:literal, $ty:ty) => {
		crate::op!($ident, {
			name: $name,
			variant: FUNCTION,
			description: "3-D Haralick texture feature",
			dims: 3 => 3,
			source: OpSource::Builtin,
			signature: signature::<$ty, DoubleType>,
			factory: |_env, args| factory::<$ty>(Feature::$variant, args),
		});
	};
}

macro_rules! features {
	($($variant:ident => $local:ident, $name:literal;)*) => {
		/// One Haralick texture feature.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum Feature {
			$($variant,)*
		}

		impl Feature {
			pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

			/// Name of the op computing this feature.
			pub const fn op_name(self) -> &'static str {
				match self {
					$(Self::$variant => $name,)*
				}
			}
		}

		paste::paste! {
			$(
				haralick_op!([<haralick_ $local _unsigned_byte>], $variant, $name, UnsignedByteType);
				haralick_op!([<haralick_ $local _unsigned_short>], $variant, $name, UnsignedShortType);
				haralick_op!([<haralick_ $local _float>], $variant, $name, FloatType);
				haralick_op!([<haralick_ $local _double>], $variant, $name, DoubleType);
			)*

			pub(in crate::builtins) static DEFS: &[&OpDef] = &[
				$(
					&[<OP_HARALICK_ $local:upper _UNSIGNED_BYTE>],
					&[<OP_HARALICK_ $local:upper _UNSIGNED_SHORT>],
					&[<OP_HARALICK_ $local:upper _FLOAT>],
					&[<OP_HARALICK_ $local:upper _DOUBLE>],
				)*
			];
		}
	};
}

features! {
	Asm => asm, "haralick.asm";
	ClusterPromenence => cluster_promenence, "haralick.clusterPromenence";
	ClusterShade => cluster_shade, "haralick.clusterShade";
	Contrast => contrast, "haralick.contrast";
	Correlation => correlation, "haralick.correlation";
	DifferenceEntropy => difference_entropy, "haralick.differenceEntropy";
	DifferenceVariance => difference_variance, "haralick.differenceVariance";
	Entropy => entropy, "haralick.entropy";
	Icm1 => icm1, "haralick.icm1";
	Icm2 => icm2, "haralick.icm2";
	Ifdm => ifdm, "haralick.ifdm";
	MaxProbability => max_probability, "haralick.maxProbability";
	SumAverage => sum_average, "haralick.sumAverage";
	SumEntropy => sum_entropy, "haralick.sumEntropy";
	SumVariance => sum_variance, "haralick.sumVariance";
	TextureHomogeneity => texture_homogeneity, "haralick.textureHomogeneity";
	Variance => variance, "haralick.variance";
}

impl Feature {
	/// Reduces a normalized matrix to this feature.
	pub fn compute(self, m: &CooccurrenceMatrix) -> f64 {
		let (px, py) = (m.px(), m.py());
		let (mux, muy) = (mean(&px), mean(&py));
		match self {
			Self::Asm => m.entries().map(|(_, _, p)| p * p).sum(),
			Self::ClusterPromenence => m
				.entries()
				.map(|(i, j, p)| (i as f64 + j as f64 - mux - muy).powi(4) * p)
				.sum(),
			Self::ClusterShade => m
				.entries()
				.map(|(i, j, p)| (i as f64 + j as f64 - mux - muy).powi(3) * p)
				.sum(),
			Self::Contrast => m
				.entries()
				.map(|(i, j, p)| (i.abs_diff(j) as f64).powi(2) * p)
				.sum(),
			Self::Correlation => {
				let sdx = variance(&px, mux).sqrt();
				let sdy = variance(&py, muy).sqrt();
				let ij: f64 = m.entries().map(|(i, j, p)| (i * j) as f64 * p).sum();
				ratio(ij - mux * muy, sdx * sdy)
			}
			Self::DifferenceEntropy => entropy(m.difference_marginal()),
			Self::DifferenceVariance => {
				let d = m.difference_marginal();
				variance(&d, mean(&d))
			}
			Self::Entropy => entropy(m.entries().map(|(_, _, p)| p)),
			Self::Icm1 => {
				let (hx, hy) = (entropy(px.iter().copied()), entropy(py.iter().copied()));
				let hxy = entropy(m.entries().map(|(_, _, p)| p));
				ratio(hxy - hxy1(m, &px, &py), hx.max(hy))
			}
			Self::Icm2 => {
				let hxy = entropy(m.entries().map(|(_, _, p)| p));
				let hxy2 = entropy(px.iter().flat_map(|&x| py.iter().map(move |&y| x * y)));
				(1.0 - (-2.0 * (hxy2 - hxy)).exp()).max(0.0).sqrt()
			}
			Self::Ifdm => m
				.entries()
				.map(|(i, j, p)| p / (1.0 + (i.abs_diff(j) as f64).powi(2)))
				.sum(),
			Self::MaxProbability => m.entries().map(|(_, _, p)| p).fold(0.0, f64::max),
			Self::SumAverage => mean(&m.sum_marginal()),
			Self::SumEntropy => entropy(m.sum_marginal()),
			Self::SumVariance => {
				let s = m.sum_marginal();
				variance(&s, mean(&s))
			}
			Self::TextureHomogeneity => m
				.entries()
				.map(|(i, j, p)| p / (1.0 + i.abs_diff(j) as f64))
				.sum(),
			Self::Variance => m.entries().map(|(i, _, p)| (i as f64 - mux).powi(2) * p).sum(),
		}
	}
}

/// `-sum p(i,j) ln(p_x(i) p_y(j))`
fn hxy1(m: &CooccurrenceMatrix, px: &[f64], py: &[f64]) -> f64 {
	-m.entries()
		.map(|(i, j, p)| p * (px[i] * py[j]).ln())
		.sum::<f64>()
}

/// Computes one feature of the input's co-occurrence matrix.
#[derive(Debug, Clone)]
pub struct HaralickOp {
	feature: Feature,
	params: CooccurrenceParams,
}

impl HaralickOp {
	pub fn new(feature: Feature, params: CooccurrenceParams) -> Self {
		Self { feature, params }
	}
}

impl Threadable for HaralickOp {}

impl<T: RealType> FunctionOp<ArrayImg<T>, DoubleType> for HaralickOp {
	fn calculate(&mut self, input: &ArrayImg<T>) -> Result<DoubleType, OpError> {
		let matrix = CooccurrenceMatrix::compute(input, &self.params)?;
		Ok(DoubleType(self.feature.compute(&matrix)))
	}
}

fn factory<T: RealType>(feature: Feature, args: &[Value]) -> Result<Box<dyn Op>, OpError> {
	let op = HaralickOp::new(feature, CooccurrenceParams::from_args(args)?);
	Ok(FunctionCell::<HaralickOp, ArrayImg<T>, DoubleType>::new(op).boxed())
}
