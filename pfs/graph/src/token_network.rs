#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashMap;

use pfs_primitives::types::{
	Address,
	ChannelIdentifier,
	LockedAmount,
	Nonce,
	SettleTimeout,
	TokenAddress,
	TokenAmount,
	TokenNetworkAddress,
	TransferredAmount,
};

use crate::{
	errors::TokenNetworkError,
	types::{
		Channel,
		ChannelStatus,
		FeePolicy,
		NodeStatus,
	},
};

/// The channel registry: an arena of channels keyed by identifier plus the
/// per-token adjacency index the path search walks.
///
/// The registry itself does no locking; the service layer wraps it in a
/// readers-writer lock so queries share the read side while event
/// application takes the write side.
#[derive(Clone, Debug, Default)]
pub struct TokenNetwork {
	/// All open channels by identifier.
	pub(crate) channels: HashMap<ChannelIdentifier, Channel>,
	/// Per-token channel identifiers, in the order the channels were opened.
	pub(crate) channel_views: HashMap<TokenAddress, Vec<ChannelIdentifier>>,
	/// Token to token network contract mapping.
	pub(crate) token_to_token_network: HashMap<TokenAddress, TokenNetworkAddress>,
	/// ERC-20 decimals per registered token.
	pub(crate) decimals: HashMap<TokenAddress, u32>,
	/// Liveness and device information per participant.
	pub(crate) participant_status: HashMap<Address, NodeStatus>,
}

impl TokenNetwork {
	/// Returns an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a token and its network contract together with the token's
	/// ERC-20 decimals.
	pub fn register_token(
		&mut self,
		token: TokenAddress,
		token_network: TokenNetworkAddress,
		decimals: u32,
	) {
		self.token_to_token_network.insert(token, token_network);
		self.decimals.insert(token, decimals);
	}

	/// Creates a channel with zero balances and makes it routable.
	///
	/// Both participants get a liveness entry, offline until the transport
	/// layer reports otherwise.
	pub fn handle_channel_opened(
		&mut self,
		token: TokenAddress,
		token_network: TokenNetworkAddress,
		channel_identifier: ChannelIdentifier,
		participant1: Address,
		participant2: Address,
		settle_timeout: SettleTimeout,
	) -> Result<(), TokenNetworkError> {
		if self.channels.contains_key(&channel_identifier) {
			return Err(TokenNetworkError::AlreadyExists)
		}

		self.token_to_token_network.entry(token).or_insert(token_network);
		self.channel_views.entry(token).or_default().push(channel_identifier);
		self.channels.insert(
			channel_identifier,
			Channel::new(token, token_network, participant1, participant2, settle_timeout),
		);

		for participant in [participant1, participant2] {
			self.participant_status.entry(participant).or_default();
		}

		Ok(())
	}

	/// Records the cumulative on-chain deposit of one side and refreshes
	/// that side's spendable balance.
	pub fn handle_channel_deposit(
		&mut self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
		total_deposit: TokenAmount,
	) -> Result<(), TokenNetworkError> {
		let channel = self
			.channels
			.get_mut(&channel_identifier)
			.filter(|channel| channel.status == ChannelStatus::Open)
			.ok_or(TokenNetworkError::NotFound)?;

		let (own, partner) =
			channel.ends_mut_for(participant).ok_or(TokenNetworkError::InvalidParticipant)?;
		own.total_deposit = total_deposit;
		let balance = own.spendable(partner);
		own.balance = balance;

		Ok(())
	}

	/// Sets both balances to the values the chain emitted for a withdraw.
	///
	/// The deposit bookkeeping is rebased so later balance proofs compute
	/// from the post-withdraw base.
	pub fn handle_channel_withdraw(
		&mut self,
		channel_identifier: ChannelIdentifier,
		participant1: Address,
		participant2: Address,
		participant1_balance: TokenAmount,
		participant2_balance: TokenAmount,
	) -> Result<(), TokenNetworkError> {
		let channel = self
			.channels
			.get_mut(&channel_identifier)
			.ok_or(TokenNetworkError::NotFound)?;

		if channel.end_for(participant1).is_none() ||
			channel.end_for(participant2).is_none() ||
			participant1 == participant2
		{
			return Err(TokenNetworkError::InvalidParticipant)
		}

		for (participant, balance) in
			[(participant1, participant1_balance), (participant2, participant2_balance)]
		{
			if let Some((own, partner)) = channel.ends_mut_for(participant) {
				own.balance = balance;
				own.total_deposit = balance
					.saturating_add(own.transferred_amount)
					.saturating_add(own.locked_amount)
					.checked_sub(partner.transferred_amount)
					.unwrap_or_default();
			}
		}

		Ok(())
	}

	/// Removes the channel from the arena and from its token's view.
	pub fn handle_channel_closed(
		&mut self,
		channel_identifier: ChannelIdentifier,
	) -> Result<(), TokenNetworkError> {
		let channel =
			self.channels.remove(&channel_identifier).ok_or(TokenNetworkError::NotFound)?;

		if let Some(view) = self.channel_views.get_mut(&channel.token) {
			view.retain(|identifier| *identifier != channel_identifier);
		}

		Ok(())
	}

	/// Applies an off-chain balance proof to one direction of the channel
	/// and refreshes both spendable balances.
	pub fn handle_balance_proof(
		&mut self,
		channel_identifier: ChannelIdentifier,
		from_participant: Address,
		transferred_amount: TransferredAmount,
		locked_amount: LockedAmount,
		nonce: Nonce,
	) -> Result<(), TokenNetworkError> {
		let channel = self
			.channels
			.get_mut(&channel_identifier)
			.ok_or(TokenNetworkError::NotFound)?;

		{
			let (own, _) = channel
				.ends_mut_for(from_participant)
				.ok_or(TokenNetworkError::InvalidParticipant)?;
			if nonce <= own.nonce {
				return Err(TokenNetworkError::StaleUpdate)
			}
			own.nonce = nonce;
			own.transferred_amount = transferred_amount;
			own.locked_amount = locked_amount;
		}
		channel.update_balances();

		Ok(())
	}

	/// Upserts the liveness and device information of a participant.
	pub fn set_node_status(&mut self, address: Address, is_mobile: bool, is_online: bool) {
		self.participant_status.insert(address, NodeStatus { is_mobile, is_online });
	}

	/// Updates the fee one side charges for relaying out of the channel.
	pub fn set_fee_policy(
		&mut self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
		policy: FeePolicy,
	) -> Result<(), TokenNetworkError> {
		let channel = self
			.channels
			.get_mut(&channel_identifier)
			.ok_or(TokenNetworkError::NotFound)?;
		let (own, _) =
			channel.ends_mut_for(participant).ok_or(TokenNetworkError::InvalidParticipant)?;
		own.fee = policy;

		Ok(())
	}

	/// Returns the channel with the given identifier, if any.
	pub fn channel(&self, channel_identifier: ChannelIdentifier) -> Option<&Channel> {
		self.channels.get(&channel_identifier)
	}

	/// Returns the channels of a token's subgraph in view order.
	pub fn channels_for_token(&self, token: TokenAddress) -> Vec<&Channel> {
		match self.channel_views.get(&token) {
			Some(view) => view
				.iter()
				.filter_map(|identifier| self.channels.get(identifier))
				.collect(),
			None => vec![],
		}
	}

	/// Returns the network contract registered for a token, if any.
	pub fn token_network_address(&self, token: TokenAddress) -> Option<TokenNetworkAddress> {
		self.token_to_token_network.get(&token).copied()
	}

	/// Returns the liveness entry of a participant, if any.
	pub fn participant_status(&self, address: Address) -> Option<NodeStatus> {
		self.participant_status.get(&address).copied()
	}
}
