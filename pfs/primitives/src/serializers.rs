#![warn(clippy::missing_docs_in_private_items)]

use serde::Serializer;
use web3::types::U256;

/// Serialize a U256 as a decimal string.
pub fn u256_to_str<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.collect_str(value)
}
