use std::fs;

use imops_primitives::DoubleType;
use imops_registry::{BatchMode, ConfigError, OpEnvironment, OpRequest, OpsConfig, TieBreak};
use imops_types::Value;
use pretty_assertions::assert_eq;

use crate::common::env_with;
use crate::ops::OP_TIE_A;

#[test]
fn test_load_from_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("imops.toml");
	fs::write(
		&path,
		"[matching]\ntie-break = \"registration-order\"\n\n[features]\nbatch = \"isolate\"\n",
	)
	.unwrap();

	let config = OpsConfig::load(&path).unwrap();
	assert_eq!(config.matching.tie_break, TieBreak::RegistrationOrder);
	assert_eq!(config.features.batch, BatchMode::Isolate);

	let env = env_with(config);
	let m = env
		.find_op(&OpRequest::new("test.tie").arg(Value::new(DoubleType(0.0))))
		.unwrap();
	assert_eq!(m.id(), OP_TIE_A.meta.id);
}

#[test]
fn test_missing_file_names_the_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("absent.toml");
	let err = OpsConfig::load(&path).unwrap_err();
	assert!(matches!(&err, ConfigError::Io { path: p, .. } if *p == path));
	assert!(err.to_string().contains("absent.toml"), "{err}");
}

#[test]
fn test_invalid_value_is_a_parse_error() {
	let err = OpsConfig::from_toml("[features]\nbatch = \"sometimes\"\n").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

/// The global environment always runs with defaults.
#[test]
fn test_global_environment_uses_default_config() {
	assert_eq!(OpEnvironment::global().config(), &OpsConfig::default());
}
