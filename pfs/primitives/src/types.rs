#![warn(clippy::missing_docs_in_private_items)]

pub use web3::types::{
	Address,
	H256,
	U256,
};

/// Alias type for block numbers, signed to match the chain RPC interface.
pub type BlockNumber = i64;

/// Alias type for channel identifiers, derived from the participant pair.
pub type ChannelIdentifier = H256;

/// Alias type for fee amounts.
pub type FeeAmount = U256;

/// Alias type for locked amounts.
pub type LockedAmount = U256;

/// Alias type for balance proof nonces.
pub type Nonce = U256;

/// Alias type for settle timeouts.
pub type SettleTimeout = u64;

/// Alias type for token addresses.
pub type TokenAddress = Address;

/// Alias type for token amounts.
pub type TokenAmount = U256;

/// Alias type for token network addresses.
pub type TokenNetworkAddress = Address;

/// Alias type for token network registry addresses.
pub type TokenNetworkRegistryAddress = Address;

/// Alias type for transferred amounts.
pub type TransferredAmount = U256;
