//! Op metadata shared by the catalog and the matcher.

pub mod meta;
pub mod signature;

pub use meta::{OpMeta, OpSource, Variant};
pub use signature::{OpSignature, Slot};
