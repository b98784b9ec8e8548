#![warn(clippy::missing_docs_in_private_items)]

use pfs_primitives::{
	deserializers::u256_from_str,
	serializers::u256_to_str,
	types::{
		Address,
		FeeAmount,
		LockedAmount,
		Nonce,
		SettleTimeout,
		TokenAddress,
		TokenAmount,
		TokenNetworkAddress,
		TransferredAmount,
	},
};
use serde::{
	Deserialize,
	Serialize,
};

/// Status of a channel known to the registry.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelStatus {
	Open,
	Closed,
}

/// Variants of fee schedules a participant may charge for mediating.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeePolicyKind {
	None,
	Constant,
	Percent,
	Combined,
}

/// The fee a participant charges when relaying transfers out of one of its
/// channels. `fee_percent` is expressed in parts per million.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct FeePolicy {
	pub kind: FeePolicyKind,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub fee_constant: FeeAmount,
	pub fee_percent: u32,
}

impl Default for FeePolicy {
	fn default() -> Self {
		Self {
			kind: FeePolicyKind::None,
			fee_constant: FeeAmount::zero(),
			fee_percent: 0,
		}
	}
}

/// Liveness and device information for a network participant.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NodeStatus {
	pub is_mobile: bool,
	pub is_online: bool,
}

/// One side of a channel.
///
/// `total_deposit` and the balance proof triple are the raw observations the
/// spendable `balance` is derived from; `balance` is what the path search
/// reads.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct ChannelEndState {
	pub address: Address,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub total_deposit: TokenAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub transferred_amount: TransferredAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub locked_amount: LockedAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub nonce: Nonce,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_str")]
	pub balance: TokenAmount,
	pub fee: FeePolicy,
}

impl ChannelEndState {
	/// Returns a fresh end state for `address` with zero balances and no fee.
	pub fn new(address: Address) -> Self {
		Self {
			address,
			total_deposit: TokenAmount::zero(),
			transferred_amount: TransferredAmount::zero(),
			locked_amount: LockedAmount::zero(),
			nonce: Nonce::zero(),
			balance: TokenAmount::zero(),
			fee: FeePolicy::default(),
		}
	}

	/// The amount this side can still send given the partner's state.
	pub fn spendable(&self, partner: &ChannelEndState) -> TokenAmount {
		self.total_deposit
			.saturating_add(partner.transferred_amount)
			.checked_sub(self.transferred_amount)
			.and_then(|amount| amount.checked_sub(self.locked_amount))
			.unwrap_or_default()
	}
}

/// A payment channel tracked by the registry, with its two sides stored in
/// the order observed at open time.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct Channel {
	pub token: TokenAddress,
	pub token_network: TokenNetworkAddress,
	pub settle_timeout: SettleTimeout,
	pub status: ChannelStatus,
	pub participant1: ChannelEndState,
	pub participant2: ChannelEndState,
}

impl Channel {
	/// Returns a freshly opened channel between `participant1` and
	/// `participant2`.
	pub fn new(
		token: TokenAddress,
		token_network: TokenNetworkAddress,
		participant1: Address,
		participant2: Address,
		settle_timeout: SettleTimeout,
	) -> Self {
		Self {
			token,
			token_network,
			settle_timeout,
			status: ChannelStatus::Open,
			participant1: ChannelEndState::new(participant1),
			participant2: ChannelEndState::new(participant2),
		}
	}

	/// Returns the end state of `participant` if it is part of the channel.
	pub fn end_for(&self, participant: Address) -> Option<&ChannelEndState> {
		if self.participant1.address == participant {
			Some(&self.participant1)
		} else if self.participant2.address == participant {
			Some(&self.participant2)
		} else {
			None
		}
	}

	/// Returns the `(own, partner)` end states of `participant` mutably.
	pub fn ends_mut_for(
		&mut self,
		participant: Address,
	) -> Option<(&mut ChannelEndState, &mut ChannelEndState)> {
		if self.participant1.address == participant {
			Some((&mut self.participant1, &mut self.participant2))
		} else if self.participant2.address == participant {
			Some((&mut self.participant2, &mut self.participant1))
		} else {
			None
		}
	}

	/// Recomputes both spendable balances from the deposit and balance proof
	/// observations.
	pub fn update_balances(&mut self) {
		let balance1 = self.participant1.spendable(&self.participant2);
		let balance2 = self.participant2.spendable(&self.participant1);
		self.participant1.balance = balance1;
		self.participant2.balance = balance2;
	}
}

/// A ranked route returned by a path query. `result` holds the hops after
/// the source; the full route is the source followed by `result` and the
/// target is the last element.
#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct Path {
	pub result: Vec<Address>,
	pub path_hop: usize,
	#[serde(serialize_with = "u256_to_str")]
	pub fee: FeeAmount,
}
