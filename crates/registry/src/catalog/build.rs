use std::cmp::{Ordering, Reverse};

use imops_types::Priority;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Candidate, Catalog, OpDef};
use crate::core::{OpSource, Variant};
use crate::error::CatalogError;

/// How the builder treats two definitions with the same id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
	/// Fail the build.
	#[default]
	Error,
	/// Keep the winner by priority, then source rank, then ingest order.
	ByPriority,
}

/// One side of a duplicate-id conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Party {
	pub source: OpSource,
	pub priority: Priority,
	/// Stable ingest ordinal.
	pub ordinal: u32,
}

impl Party {
	fn of(def: &OpDef, ordinal: u32) -> Self {
		Self {
			source: def.meta.source,
			priority: def.meta.priority,
			ordinal,
		}
	}
}

/// A duplicate id resolved under [`DuplicatePolicy::ByPriority`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub id: &'static str,
	pub winner: Party,
	pub loser: Party,
}

/// Precedence: priority, then source rank, then later ingest.
fn cmp_party(a: &Party, b: &Party) -> Ordering {
	a.priority
		.cmp(&b.priority)
		.then_with(|| a.source.rank().cmp(&b.source.rank()))
		.then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// Builder for constructing a [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
	defs: Vec<&'static OpDef>,
	policy: DuplicatePolicy,
}

impl CatalogBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the duplicate id handling policy.
	pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Returns the number of definitions that have been registered so far.
	pub fn len(&self) -> usize {
		self.defs.len()
	}

	/// Returns true if no definitions have been registered so far.
	pub fn is_empty(&self) -> bool {
		self.defs.is_empty()
	}

	/// Adds a single definition to the builder.
	pub fn push(&mut self, def: &'static OpDef) {
		self.defs.push(def);
	}

	/// Adds multiple definitions to the builder.
	pub fn extend<I: IntoIterator<Item = &'static OpDef>>(&mut self, defs: I) {
		self.defs.extend(defs);
	}

	/// Deduplicates, validates and sorts the definitions.
	///
	/// The same static pushed twice (say, listed explicitly and also
	/// discovered through `inventory`) counts once.
	pub fn build(self) -> Result<Catalog, CatalogError> {
		let mut seen: HashSet<*const OpDef> =
			HashSet::with_capacity_and_hasher(self.defs.len(), Default::default());
		let mut kept: Vec<(&'static OpDef, Party)> = Vec::with_capacity(self.defs.len());
		let mut id_owner: HashMap<&'static str, usize> =
			HashMap::with_capacity_and_hasher(self.defs.len(), Default::default());
		let mut collisions = Vec::new();

		for def in self.defs {
			if !seen.insert(std::ptr::from_ref(def)) {
				continue;
			}
			let party = Party::of(def, kept.len() as u32);
			let Some(&slot) = id_owner.get(def.meta.id) else {
				id_owner.insert(def.meta.id, kept.len());
				kept.push((def, party));
				continue;
			};

			let (existing, existing_party) = kept[slot];
			match self.policy {
				DuplicatePolicy::Error => {
					return Err(CatalogError::DuplicateId {
						id: def.meta.id,
						first: existing.meta.source,
						second: def.meta.source,
					});
				}
				DuplicatePolicy::ByPriority => {
					let incoming_wins = cmp_party(&party, &existing_party) == Ordering::Greater;
					let (winner, loser) = if incoming_wins {
						kept[slot] = (def, party);
						(party, existing_party)
					} else {
						(existing_party, party)
					};
					warn!(
						id = def.meta.id,
						winner = %winner.source,
						loser = %loser.source,
						"duplicate op id resolved by priority"
					);
					collisions.push(Collision {
						id: def.meta.id,
						winner,
						loser,
					});
				}
			}
		}

		let mut candidates = Vec::with_capacity(kept.len());
		for (def, _) in kept {
			let signature = (def.signature)();
			validate(def, &signature)?;
			candidates.push(Candidate { def, signature });
		}

		candidates.sort_by_key(|c| {
			let meta = c.meta();
			(
				meta.name,
				Reverse(meta.priority),
				Reverse(meta.source.rank()),
				meta.id,
			)
		});

		let mut by_name: HashMap<&'static str, std::ops::Range<usize>> = HashMap::default();
		let mut by_id = HashMap::with_capacity_and_hasher(candidates.len(), Default::default());
		for (i, c) in candidates.iter().enumerate() {
			by_name.entry(c.name()).or_insert(i..i).end = i + 1;
			by_id.insert(c.id(), i);
		}

		debug!(
			ops = candidates.len(),
			names = by_name.len(),
			collisions = collisions.len(),
			"op catalog built"
		);

		Ok(Catalog {
			candidates,
			by_name,
			by_id,
			collisions,
		})
	}
}

fn validate(def: &OpDef, signature: &crate::core::OpSignature) -> Result<(), CatalogError> {
	let invalid = |reason| CatalogError::InvalidSignature {
		id: def.meta.id,
		reason,
	};
	if signature.misplaced_required().is_some() {
		return Err(invalid("required input follows an optional one"));
	}
	if def.meta.variant.contains(Variant::COMPUTER) && signature.output_type().is_none() {
		return Err(invalid("computer ops must declare an output bound"));
	}
	if def.meta.variant.is_empty() {
		return Err(invalid("no calling convention declared"));
	}
	if def.meta.min_dims > def.meta.max_dims {
		return Err(invalid("min_dims exceeds max_dims"));
	}
	Ok(())
}
