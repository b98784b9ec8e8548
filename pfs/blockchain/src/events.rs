use pfs_primitives::types::{
	Address,
	ChannelIdentifier,
	SettleTimeout,
	TokenAddress,
	TokenAmount,
	TokenNetworkAddress,
};

/// A chain state change delivered by the blockchain listener.
///
/// The listener guarantees per-channel delivery in on-chain order (block
/// number, then log index); ordering across channels is only partial.
#[derive(Clone, Debug)]
pub enum StateChange {
	ChannelOpened(ChannelOpened),
	ChannelDeposit(ChannelDeposit),
	ChannelWithdraw(ChannelWithdraw),
	ChannelClosed(ChannelClosed),
	TokenAdded(TokenAdded),
}

impl StateChange {
	pub fn type_name(&self) -> &'static str {
		match self {
			StateChange::ChannelOpened(_) => "ChannelOpened",
			StateChange::ChannelDeposit(_) => "ChannelDeposit",
			StateChange::ChannelWithdraw(_) => "ChannelWithdraw",
			StateChange::ChannelClosed(_) => "ChannelClosed",
			StateChange::TokenAdded(_) => "TokenAdded",
		}
	}
}

#[derive(Clone, Debug)]
pub struct ChannelOpened {
	pub token_network: TokenNetworkAddress,
	pub token: TokenAddress,
	pub channel_identifier: ChannelIdentifier,
	pub participant1: Address,
	pub participant2: Address,
	pub settle_timeout: SettleTimeout,
}

#[derive(Clone, Debug)]
pub struct ChannelDeposit {
	pub token_network: TokenNetworkAddress,
	pub channel_identifier: ChannelIdentifier,
	pub participant: Address,
	pub total_deposit: TokenAmount,
}

#[derive(Clone, Debug)]
pub struct ChannelWithdraw {
	pub token_network: TokenNetworkAddress,
	pub channel_identifier: ChannelIdentifier,
	pub participant1: Address,
	pub participant2: Address,
	pub participant1_balance: TokenAmount,
	pub participant2_balance: TokenAmount,
}

#[derive(Clone, Debug)]
pub struct ChannelClosed {
	pub token_network: TokenNetworkAddress,
	pub channel_identifier: ChannelIdentifier,
}

/// A token registered with the token network registry. `decimals` is read
/// from the ERC-20 contract by the listener.
#[derive(Clone, Debug)]
pub struct TokenAdded {
	pub token_network: TokenNetworkAddress,
	pub token: TokenAddress,
	pub decimals: u32,
}
