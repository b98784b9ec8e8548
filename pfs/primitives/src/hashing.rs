#![warn(clippy::missing_docs_in_private_items)]

use web3::signing::keccak256;

use crate::types::{
	Address,
	ChannelIdentifier,
	TokenAddress,
	TokenNetworkAddress,
};

/// Derives the channel identifier the way the token network contract does.
///
/// The identifier is the Keccak-256 hash of both participant addresses in
/// ascending byte order, followed by the token and the token network
/// addresses. Reordering the participants yields the same identifier.
pub fn calculate_channel_identifier(
	token: TokenAddress,
	token_network: TokenNetworkAddress,
	participant1: Address,
	participant2: Address,
) -> ChannelIdentifier {
	let (lower, higher) = if participant1.as_bytes() <= participant2.as_bytes() {
		(participant1, participant2)
	} else {
		(participant2, participant1)
	};

	let mut data = vec![];
	data.extend_from_slice(lower.as_bytes());
	data.extend_from_slice(higher.as_bytes());
	data.extend_from_slice(token.as_bytes());
	data.extend_from_slice(token_network.as_bytes());
	ChannelIdentifier::from_slice(&keccak256(&data))
}
