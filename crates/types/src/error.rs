use crate::Priority;

/// Extractor registry construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractorError {
	/// Two extractors both claim to classify null values.
	#[error("duplicate null handler: {first} and {second}")]
	DuplicateNullHandler {
		first: &'static str,
		second: &'static str,
	},
	/// An extractor ties with or outranks the null handler.
	#[error(
		"extractor '{name}' (priority {priority}) is not strictly below null handler '{null_handler}' (priority {null_priority})"
	)]
	NullHandlerOutranked {
		name: &'static str,
		priority: Priority,
		null_handler: &'static str,
		null_priority: Priority,
	},
}
