//! Runtime op resolution for image-processing ops.
//!
//! Ops are registered under namespaced names (`threshold.otsu`,
//! `haralick.contrast`) with declared type bounds, dimensionality bounds and
//! a priority. A request names an op and supplies type-erased argument
//! values; the matcher recovers their types through the extractor chain in
//! [`imops_types`] and selects exactly one candidate, or reports why none
//! or several qualified.
//!
//! # Layout
//!
//! - [`core`] - op metadata and signatures
//! - [`catalog`] - the immutable, name-indexed candidate catalog
//! - [`matcher`] - request matching and rejection reports
//! - [`exec`] - the function / computer / hybrid execution contract
//! - [`featureset`] - batches of op references over one input
//! - [`env`] - the handle bundling catalog, extractors and configuration
//! - [`config`] - TOML configuration
//! - `builtins` - ops shipped with the crate (feature `builtins`)
//!
//! # Defining an op
//!
//! Implement one of the typed traits in [`exec`], wrap it in a cell and
//! register it with [`op!`]. Registered ops are picked up by
//! [`OpEnvironment::global`] and [`OpEnvironmentBuilder::with_discovered`].

#[cfg(feature = "builtins")]
pub mod builtins;
pub mod catalog;
pub mod config;
pub mod core;
pub mod env;
pub mod error;
pub mod exec;
pub mod featureset;
mod macros;
pub mod matcher;

pub use catalog::{
	Candidate, Catalog, CatalogBuilder, Collision, DuplicatePolicy, OpDef, OpFactory, OpReg,
	discovered,
};
pub use config::{BatchMode, FeatureConfig, MatchingConfig, OpsConfig, TieBreak};
pub use crate::core::{OpMeta, OpSignature, OpSource, Slot, Variant};
pub use env::{OpEnvironment, OpEnvironmentBuilder};
pub use error::{CatalogError, ConfigError, FeatureError, MatchError, OpError, RunError};
pub use exec::{
	ComputerCell, ComputerOp, Contingent, FunctionCell, FunctionOp, HybridCell, HybridOp, Op,
	Threadable, param_or,
};
pub use featureset::{FeatureResults, FeatureSetOp, FeatureSetSpec, OpRef, OpRefFeatureSet, Param};
pub use imops_types::{Priority, TypeDescriptor, Typed, Value};
pub use matcher::{OpMatch, OpRequest, RejectReason, Rejection};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste;
}
