//! Common fixtures for registry integration tests.

use imops_primitives::{ArrayImg, UnsignedByteType};
use imops_registry::{BatchMode, FeatureConfig, MatchingConfig, OpEnvironment, OpsConfig, TieBreak};

/// Installs a test-writer subscriber once per process.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Builtins plus every op discovered in this test binary.
pub fn env_with(config: OpsConfig) -> OpEnvironment {
	init_tracing();
	OpEnvironment::builder()
		.config(config)
		.with_builtins()
		.with_discovered()
		.build()
		.expect("test environment")
}

#[must_use]
pub fn registration_order() -> OpsConfig {
	OpsConfig {
		matching: MatchingConfig {
			tie_break: TieBreak::RegistrationOrder,
			..MatchingConfig::default()
		},
		..OpsConfig::default()
	}
}

#[must_use]
pub fn isolate() -> OpsConfig {
	OpsConfig {
		features: FeatureConfig {
			batch: BatchMode::Isolate,
			..FeatureConfig::default()
		},
		..OpsConfig::default()
	}
}

/// A textured cube with seven grey levels.
pub fn volume(side: usize) -> ArrayImg<UnsignedByteType> {
	ArrayImg::from_fn(&[side, side, side], |p| {
		UnsignedByteType((((p[0] + 2 * p[1] + 3 * p[2]) % 7) * 36) as u8)
	})
	.expect("volume")
}

pub fn bytes(dims: &[usize], values: impl IntoIterator<Item = u8>) -> ArrayImg<UnsignedByteType> {
	ArrayImg::from_vec(dims, values.into_iter().map(UnsignedByteType).collect()).expect("byte image")
}
