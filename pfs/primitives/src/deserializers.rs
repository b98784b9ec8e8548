#![warn(clippy::missing_docs_in_private_items)]

use serde::{
	de::Error,
	Deserialize,
	Deserializer,
};
use web3::types::U256;

/// Either encoding a 256-bit amount may arrive in: a plain JSON number for
/// values small enough, a decimal string otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum U256Repr {
	Number(u64),
	Text(String),
}

/// Deserialize a U256 from a decimal string or a JSON number.
pub fn u256_from_str<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	match U256Repr::deserialize(deserializer)? {
		U256Repr::Number(value) => Ok(U256::from(value)),
		U256Repr::Text(text) => U256::from_dec_str(&text)
			.map_err(|_| D::Error::custom("expected a decimal number")),
	}
}
