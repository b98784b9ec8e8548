//! Service level entry points of the path finding service.
//!
//! Path queries share the registry's read lock; configuration updates and
//! balance proofs take the write lock. Values destined for the store are
//! staged under the lock and persisted after it is released, so queries are
//! never blocked on disk.

use std::{
	sync::{
		atomic::{
			AtomicI64,
			Ordering,
		},
		Arc,
	},
	time::Instant,
};

use derive_more::Display;
use parking_lot::RwLock;
use pfs_graph::{
	errors::{
		RoutingError,
		TokenNetworkError,
	},
	token_network::TokenNetwork,
	types::{
		FeePolicy,
		Path,
	},
};
use pfs_primitives::types::{
	Address,
	BlockNumber,
	ChannelIdentifier,
	LockedAmount,
	Nonce,
	TokenAddress,
	TokenAmount,
	TransferredAmount,
};
use pfs_storage::{
	errors::StorageError,
	Database,
};
use thiserror::Error;
use tracing::{
	debug,
	info,
};

/// Number of blocks replayed below the persisted block number after a
/// restart, covering shallow reorganizations.
const DEFAULT_NUMBER_OF_BLOCK_CONFIRMATIONS: i64 = 5;

#[derive(Error, Display, Debug)]
pub enum ApiError {
	#[display(fmt = "{}", _0)]
	TokenNetwork(TokenNetworkError),
	#[display(fmt = "Persistence error: {}", _0)]
	Storage(StorageError),
}

impl From<TokenNetworkError> for ApiError {
	fn from(e: TokenNetworkError) -> Self {
		Self::TokenNetwork(e)
	}
}

impl From<StorageError> for ApiError {
	fn from(e: StorageError) -> Self {
		Self::Storage(e)
	}
}

pub struct Api {
	token_network: Arc<RwLock<TokenNetwork>>,
	storage: Arc<Database>,
	latest_block_number: Arc<AtomicI64>,
}

impl Api {
	pub fn new(
		token_network: Arc<RwLock<TokenNetwork>>,
		storage: Arc<Database>,
		latest_block_number: Arc<AtomicI64>,
	) -> Self {
		Self { token_network, storage, latest_block_number }
	}

	/// Searches ranked routes able to carry `amount` of `token` from
	/// `source` to `target` within `max_hops` channel hops.
	#[allow(clippy::too_many_arguments)]
	pub fn get_paths(
		&self,
		source: Address,
		target: Address,
		token: TokenAddress,
		amount: TokenAmount,
		max_hops: usize,
		sort_demand: &str,
		charge_source_fee: bool,
		deadline: Option<Instant>,
	) -> Result<Vec<Path>, RoutingError> {
		info!(
			message = "Querying paths",
			source = format!("{source:#x}"),
			target = format!("{target:#x}"),
			token = format!("{token:#x}"),
			amount = amount.to_string(),
		);
		self.token_network.read().get_paths(
			source,
			target,
			token,
			amount,
			max_hops,
			sort_demand,
			charge_source_fee,
			deadline,
		)
	}

	/// Updates the fee one side charges on a channel and persists it.
	///
	/// When the store write fails the in-memory value is already committed;
	/// the restart replay path reconciles.
	pub fn set_fee_policy(
		&self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
		policy: FeePolicy,
	) -> Result<(), ApiError> {
		{
			self.token_network.write().set_fee_policy(
				channel_identifier,
				participant,
				policy.clone(),
			)?;
		}
		debug!(message = "Fee policy updated", participant = format!("{participant:#x}"));
		self.storage.save_channel_fee_rate(channel_identifier, participant, &policy)?;

		Ok(())
	}

	/// Records liveness and device information reported by the transport
	/// layer.
	pub fn set_node_status(&self, address: Address, is_mobile: bool, is_online: bool) {
		self.token_network.write().set_node_status(address, is_mobile, is_online);
	}

	/// Applies a transport-verified balance proof to one direction of a
	/// channel.
	pub fn update_balance_proof(
		&self,
		channel_identifier: ChannelIdentifier,
		from_participant: Address,
		transferred_amount: TransferredAmount,
		locked_amount: LockedAmount,
		nonce: Nonce,
	) -> Result<(), ApiError> {
		self.token_network.write().handle_balance_proof(
			channel_identifier,
			from_participant,
			transferred_amount,
			locked_amount,
			nonce,
		)?;

		Ok(())
	}

	pub fn get_latest_block_number(&self) -> BlockNumber {
		self.latest_block_number.load(Ordering::SeqCst)
	}

	/// First block the chain client should replay from after a restart.
	pub fn replay_start_block(&self) -> BlockNumber {
		(self.get_latest_block_number() - DEFAULT_NUMBER_OF_BLOCK_CONFIRMATIONS).max(0)
	}

	/// Drops all graph state past `block_number` after a chain
	/// reorganization; the chain client rebuilds by replaying events.
	pub fn rewind_to(&self, block_number: BlockNumber) -> Result<(), ApiError> {
		info!(message = "Rewinding graph", block_number = block_number);
		{
			let mut token_network = self.token_network.write();
			*token_network = TokenNetwork::new();
		}

		let clamped = block_number.max(0).min(self.get_latest_block_number());
		self.latest_block_number.store(clamped, Ordering::SeqCst);
		self.storage.save_latest_block_number(clamped)?;

		Ok(())
	}
}
