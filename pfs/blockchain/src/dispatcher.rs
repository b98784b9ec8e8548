use std::sync::{
	atomic::{
		AtomicI64,
		Ordering,
	},
	Arc,
};

use parking_lot::RwLock;
use pfs_graph::{
	errors::TokenNetworkError,
	token_network::TokenNetwork,
	types::FeePolicy,
};
use pfs_primitives::types::{
	Address,
	BlockNumber,
	ChannelIdentifier,
};
use pfs_storage::{
	errors::StorageError,
	Database,
};
use tokio::sync::mpsc;
use tracing::{
	debug,
	error,
	warn,
};

use crate::events::{
	ChannelOpened,
	StateChange,
};

/// Capacity of the block number channel; the listener only ever needs the
/// latest value in flight.
const BLOCK_NUMBER_CHANNEL_SIZE: usize = 1;

/// Routes typed chain state changes into the token network graph and tracks
/// the latest observed block number.
///
/// Rejected state changes are logged and skipped: duplicates and unknown
/// channels are expected during reorgs and replays.
pub struct ChainEventDispatcher {
	token_network: Arc<RwLock<TokenNetwork>>,
	storage: Arc<Database>,
	latest_block_number: Arc<AtomicI64>,
	state_changes: mpsc::UnboundedReceiver<StateChange>,
	block_numbers: mpsc::Receiver<BlockNumber>,
}

impl ChainEventDispatcher {
	/// Creates a dispatcher resuming from the persisted block number and
	/// returns the sender halves the blockchain listener feeds.
	pub fn new(
		token_network: Arc<RwLock<TokenNetwork>>,
		storage: Arc<Database>,
	) -> Result<
		(Self, mpsc::UnboundedSender<StateChange>, mpsc::Sender<BlockNumber>),
		StorageError,
	> {
		let latest_block_number = storage.get_latest_block_number()?;
		let (state_change_sender, state_changes) = mpsc::unbounded_channel();
		let (block_number_sender, block_numbers) = mpsc::channel(BLOCK_NUMBER_CHANNEL_SIZE);

		let dispatcher = Self {
			token_network,
			storage,
			latest_block_number: Arc::new(AtomicI64::new(latest_block_number)),
			state_changes,
			block_numbers,
		};
		Ok((dispatcher, state_change_sender, block_number_sender))
	}

	/// Shared cell holding the latest observed block number.
	pub fn block_number_handle(&self) -> Arc<AtomicI64> {
		self.latest_block_number.clone()
	}

	pub fn get_latest_block_number(&self) -> BlockNumber {
		self.latest_block_number.load(Ordering::SeqCst)
	}

	/// Consumes the inbound streams until both senders are dropped.
	pub async fn run(mut self) {
		loop {
			tokio::select! {
				Some(state_change) = self.state_changes.recv() =>
					self.handle_state_change(state_change),
				Some(block_number) = self.block_numbers.recv() =>
					self.handle_block_number(block_number),
				else => break,
			}
		}
	}

	pub fn handle_state_change(&self, state_change: StateChange) {
		debug!(message = "Received chain state change", kind = state_change.type_name());

		let result = match state_change {
			StateChange::TokenAdded(inner) => {
				debug!(
					message = "Token registered",
					token = format!("{:#x}", inner.token),
					token_network = format!("{:#x}", inner.token_network),
				);
				self.token_network.write().register_token(
					inner.token,
					inner.token_network,
					inner.decimals,
				);
				Ok(())
			},
			StateChange::ChannelOpened(inner) => self.handle_channel_opened(inner),
			StateChange::ChannelDeposit(inner) => self.token_network.write().handle_channel_deposit(
				inner.channel_identifier,
				inner.participant,
				inner.total_deposit,
			),
			StateChange::ChannelWithdraw(inner) =>
				self.token_network.write().handle_channel_withdraw(
					inner.channel_identifier,
					inner.participant1,
					inner.participant2,
					inner.participant1_balance,
					inner.participant2_balance,
				),
			StateChange::ChannelClosed(inner) =>
				self.token_network.write().handle_channel_closed(inner.channel_identifier),
		};

		if let Err(e) = result {
			warn!(message = "Chain state change was not applied", error = e.to_string());
		}
	}

	fn handle_channel_opened(&self, inner: ChannelOpened) -> Result<(), TokenNetworkError> {
		// Fee policies outlive a channel's on-chain lifetime; fetch any
		// persisted ones before taking the write lock.
		let participant1_fee =
			self.restore_fee_policy(inner.channel_identifier, inner.participant1);
		let participant2_fee =
			self.restore_fee_policy(inner.channel_identifier, inner.participant2);

		let mut token_network = self.token_network.write();
		token_network.handle_channel_opened(
			inner.token,
			inner.token_network,
			inner.channel_identifier,
			inner.participant1,
			inner.participant2,
			inner.settle_timeout,
		)?;
		if let Some(policy) = participant1_fee {
			token_network.set_fee_policy(inner.channel_identifier, inner.participant1, policy)?;
		}
		if let Some(policy) = participant2_fee {
			token_network.set_fee_policy(inner.channel_identifier, inner.participant2, policy)?;
		}

		Ok(())
	}

	fn restore_fee_policy(
		&self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
	) -> Option<FeePolicy> {
		match self.storage.get_channel_fee_rate(channel_identifier, participant) {
			Ok(policy) => policy,
			Err(e) => {
				error!(
					message = "Could not restore channel fee policy",
					participant = format!("{participant:#x}"),
					error = e.to_string(),
				);
				None
			},
		}
	}

	pub fn handle_block_number(&self, block_number: BlockNumber) {
		// Block numbers never move backwards; late deliveries are dropped.
		if block_number < self.latest_block_number.load(Ordering::SeqCst) {
			return
		}

		self.latest_block_number.store(block_number, Ordering::SeqCst);
		if let Err(e) = self.storage.save_latest_block_number(block_number) {
			error!(
				message = "Could not persist latest block number",
				block_number = block_number,
				error = e.to_string(),
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use parking_lot::RwLock;
	use pfs_graph::{
		token_network::TokenNetwork,
		types::{
			FeePolicy,
			FeePolicyKind,
		},
	};
	use pfs_primitives::{
		hashing::calculate_channel_identifier,
		types::{
			Address,
			ChannelIdentifier,
			TokenAmount,
			H256,
		},
	};
	use pfs_storage::Database;
	use rusqlite::Connection;

	use super::ChainEventDispatcher;
	use crate::events::{
		ChannelDeposit,
		ChannelOpened,
		StateChange,
		TokenAdded,
	};

	struct TestNetwork {
		token: Address,
		token_network: Address,
		participant1: Address,
		participant2: Address,
		channel_identifier: ChannelIdentifier,
	}

	impl TestNetwork {
		fn new() -> Self {
			let token = Address::random();
			let token_network = Address::random();
			let participant1 = Address::random();
			let participant2 = Address::random();
			let channel_identifier =
				calculate_channel_identifier(token, token_network, participant1, participant2);
			Self { token, token_network, participant1, participant2, channel_identifier }
		}

		fn token_added(&self) -> StateChange {
			StateChange::TokenAdded(TokenAdded {
				token_network: self.token_network,
				token: self.token,
				decimals: 18,
			})
		}

		fn channel_opened(&self) -> StateChange {
			StateChange::ChannelOpened(ChannelOpened {
				token_network: self.token_network,
				token: self.token,
				channel_identifier: self.channel_identifier,
				participant1: self.participant1,
				participant2: self.participant2,
				settle_timeout: 500,
			})
		}

		fn deposit(&self, participant: Address, total_deposit: u64) -> StateChange {
			StateChange::ChannelDeposit(ChannelDeposit {
				token_network: self.token_network,
				channel_identifier: self.channel_identifier,
				participant,
				total_deposit: TokenAmount::from(total_deposit),
			})
		}
	}

	fn setup() -> (Arc<RwLock<TokenNetwork>>, Arc<Database>) {
		let token_network = Arc::new(RwLock::new(TokenNetwork::new()));
		let database =
			Database::new(Connection::open_in_memory().expect("Should open in-memory database"));
		database.setup_database().expect("Schema should apply");
		(token_network, Arc::new(database))
	}

	#[tokio::test]
	async fn run_drains_both_streams_before_stopping() {
		let (token_network, storage) = setup();
		let (dispatcher, state_changes, block_numbers) =
			ChainEventDispatcher::new(token_network.clone(), storage.clone())
				.expect("Dispatcher should initialize");
		let block_number_handle = dispatcher.block_number_handle();
		let network = TestNetwork::new();

		state_changes.send(network.token_added()).expect("Send should succeed");
		state_changes.send(network.channel_opened()).expect("Send should succeed");
		state_changes
			.send(network.deposit(network.participant1, 100))
			.expect("Send should succeed");
		block_numbers.send(42).await.expect("Send should succeed");
		drop(state_changes);
		drop(block_numbers);

		dispatcher.run().await;

		let view = token_network.read();
		let channel = view.channel(network.channel_identifier).expect("Channel should exist");
		assert_eq!(channel.participant1.balance, TokenAmount::from(100));
		assert_eq!(view.token_network_address(network.token), Some(network.token_network));

		assert_eq!(storage.get_latest_block_number().expect("Should read"), 42);
		assert_eq!(block_number_handle.load(std::sync::atomic::Ordering::SeqCst), 42);
	}

	#[test]
	fn rejected_state_changes_do_not_stop_dispatching() {
		let (token_network, storage) = setup();
		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network.clone(), storage)
				.expect("Dispatcher should initialize");
		let network = TestNetwork::new();

		// A deposit for a channel that was never opened is dropped.
		dispatcher.handle_state_change(network.deposit(network.participant1, 50));
		assert!(token_network.read().channel(network.channel_identifier).is_none());

		dispatcher.handle_state_change(network.channel_opened());
		assert!(token_network.read().channel(network.channel_identifier).is_some());
	}

	#[test]
	fn duplicate_open_keeps_existing_channel() {
		let (token_network, storage) = setup();
		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network.clone(), storage)
				.expect("Dispatcher should initialize");
		let network = TestNetwork::new();

		dispatcher.handle_state_change(network.channel_opened());
		dispatcher.handle_state_change(network.deposit(network.participant1, 77));
		dispatcher.handle_state_change(network.channel_opened());

		let view = token_network.read();
		let channel = view.channel(network.channel_identifier).expect("Channel should exist");
		assert_eq!(channel.participant1.balance, TokenAmount::from(77));
	}

	#[test]
	fn reopened_channel_restores_persisted_fee_policy() {
		let (token_network, storage) = setup();
		let network = TestNetwork::new();
		let policy = FeePolicy {
			kind: FeePolicyKind::Constant,
			fee_constant: TokenAmount::from(3),
			fee_percent: 0,
		};
		storage
			.save_channel_fee_rate(network.channel_identifier, network.participant1, &policy)
			.expect("Should save");

		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network.clone(), storage)
				.expect("Dispatcher should initialize");
		dispatcher.handle_state_change(network.channel_opened());

		let view = token_network.read();
		let channel = view.channel(network.channel_identifier).expect("Channel should exist");
		assert_eq!(channel.participant1.fee, policy);
		assert_eq!(channel.participant2.fee, FeePolicy::default());
	}

	#[test]
	fn block_numbers_never_move_backwards() {
		let (token_network, storage) = setup();
		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network, storage.clone())
				.expect("Dispatcher should initialize");

		dispatcher.handle_block_number(10);
		dispatcher.handle_block_number(5);

		assert_eq!(dispatcher.get_latest_block_number(), 10);
		assert_eq!(storage.get_latest_block_number().expect("Should read"), 10);
	}

	#[test]
	fn dispatcher_resumes_from_the_persisted_block() {
		let (token_network, storage) = setup();
		storage.save_latest_block_number(987).expect("Should save");

		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network, storage)
				.expect("Dispatcher should initialize");
		assert_eq!(dispatcher.get_latest_block_number(), 987);
	}

	#[test]
	fn unrelated_channels_close_independently() {
		let (token_network, storage) = setup();
		let (dispatcher, _state_changes, _block_numbers) =
			ChainEventDispatcher::new(token_network.clone(), storage)
				.expect("Dispatcher should initialize");
		let network = TestNetwork::new();

		dispatcher.handle_state_change(network.channel_opened());
		dispatcher.handle_state_change(StateChange::ChannelClosed(crate::events::ChannelClosed {
			token_network: network.token_network,
			channel_identifier: H256::random(),
		}));

		assert!(token_network.read().channel(network.channel_identifier).is_some());
	}
}
