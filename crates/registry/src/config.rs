//! Environment configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! [matching]
//! tie-break = "error"          # or "registration-order"
//! duplicate-ids = "error"      # or "by-priority"
//!
//! [features]
//! batch = "fail-fast"          # or "isolate"
//! parallel = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::catalog::DuplicatePolicy;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct OpsConfig {
	pub matching: MatchingConfig,
	pub features: FeatureConfig,
}

impl OpsConfig {
	/// Parses a TOML document.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml(&text)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct MatchingConfig {
	pub tie_break: TieBreak,
	pub duplicate_ids: DuplicatePolicy,
}

/// What to do when several candidates share the top priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
	/// Report [`crate::MatchError::Ambiguous`].
	#[default]
	Error,
	/// Take the first in catalog order: higher source rank, then lower id.
	RegistrationOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FeatureConfig {
	pub batch: BatchMode,
	/// Spread references over the rayon pool (needs the `parallel` feature).
	pub parallel: bool,
}

/// How a feature-set batch handles a failing reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
	/// Stop at the first failure.
	#[default]
	FailFast,
	/// Attempt every reference and report failures individually.
	Isolate,
}
