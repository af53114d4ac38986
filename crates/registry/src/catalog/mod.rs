//! Op candidate catalog.
//!
//! # Role
//!
//! Holds every discoverable [`OpDef`], sorted so candidates sharing a name are
//! contiguous and already in preference order. The matcher only reads it.
//!
//! # Invariants
//!
//! - Ids are unique after build.
//! - Order within a name is priority descending, then source rank
//!   descending, then id ascending, independent of discovery order.
//! - Immutable after [`CatalogBuilder::build`].

use std::ops::Range;

use imops_types::{Priority, Value};
use rustc_hash::FxHashMap as HashMap;

use crate::core::{OpMeta, OpSignature};
use crate::env::OpEnvironment;
use crate::error::OpError;
use crate::exec::Op;

mod build;

pub use build::{CatalogBuilder, Collision, DuplicatePolicy};

/// Instantiates an op from the request arguments (primary input first).
pub type OpFactory = fn(&OpEnvironment, &[Value]) -> Result<Box<dyn Op>, OpError>;

/// Static op definition.
#[derive(Debug)]
pub struct OpDef {
	pub meta: OpMeta,
	/// Builds the declared bounds; called once per catalog.
	pub signature: fn() -> OpSignature,
	pub factory: OpFactory,
}

/// Wrapper for `inventory` collection.
pub struct OpReg(pub &'static OpDef);

inventory::collect!(OpReg);

/// Every op definition submitted through [`crate::op!`] anywhere in the binary.
pub fn discovered() -> impl Iterator<Item = &'static OpDef> {
	inventory::iter::<OpReg>.into_iter().map(|reg| reg.0)
}

/// A catalog entry: the definition plus its evaluated signature.
#[derive(Debug)]
pub struct Candidate {
	def: &'static OpDef,
	signature: OpSignature,
}

impl Candidate {
	pub fn def(&self) -> &'static OpDef {
		self.def
	}

	pub fn meta(&self) -> &'static OpMeta {
		&self.def.meta
	}

	pub fn id(&self) -> &'static str {
		self.def.meta.id
	}

	pub fn name(&self) -> &'static str {
		self.def.meta.name
	}

	pub fn priority(&self) -> Priority {
		self.def.meta.priority
	}

	pub fn signature(&self) -> &OpSignature {
		&self.signature
	}

	/// Runs the factory.
	pub fn instantiate(&self, env: &OpEnvironment, args: &[Value]) -> Result<Box<dyn Op>, OpError> {
		(self.def.factory)(env, args)
	}
}

/// Immutable, name-indexed op catalog.
#[derive(Debug, Default)]
pub struct Catalog {
	candidates: Vec<Candidate>,
	by_name: HashMap<&'static str, Range<usize>>,
	by_id: HashMap<&'static str, usize>,
	collisions: Vec<Collision>,
}

impl Catalog {
	pub fn builder() -> CatalogBuilder {
		CatalogBuilder::new()
	}

	/// Candidates registered under `name`, best first.
	pub fn named(&self, name: &str) -> &[Candidate] {
		self.by_name
			.get(name)
			.map(|range| &self.candidates[range.clone()])
			.unwrap_or_default()
	}

	pub fn get(&self, id: &str) -> Option<&Candidate> {
		self.by_id.get(id).map(|&i| &self.candidates[i])
	}

	/// All candidates in catalog order.
	pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
		self.candidates.iter()
	}

	/// Distinct op names, sorted.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		let mut last = None;
		self.candidates.iter().filter_map(move |c| {
			let name = c.name();
			(last.replace(name) != Some(name)).then_some(name)
		})
	}

	/// Duplicate ids resolved under [`DuplicatePolicy::ByPriority`].
	pub fn collisions(&self) -> &[Collision] {
		&self.collisions
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}
}
