use std::sync::Mutex;

use pfs_graph::types::FeePolicy;
use pfs_primitives::types::{
	Address,
	BlockNumber,
	ChannelIdentifier,
};
use rusqlite::{
	params,
	Connection,
	OptionalExtension,
};

use crate::{
	errors::StorageError,
	sqlite,
};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Settings key holding the latest processed block number.
const SETTING_LATEST_BLOCK_NUMBER: &str = "latest_block_number";

pub struct Database {
	conn: Mutex<Connection>,
}

impl Database {
	pub fn new(conn: Connection) -> Self {
		Self { conn: Mutex::new(conn) }
	}

	pub fn setup_database(&self) -> Result<()> {
		let setup_db_sql = format!(
			"
			PRAGMA foreign_keys=off;
			BEGIN TRANSACTION;
			{}{}
			COMMIT;
			PRAGMA foreign_keys=on;
			",
			sqlite::DB_CREATE_SETTINGS,
			sqlite::DB_CREATE_CHANNEL_FEE_RATES,
		);
		self.conn
			.lock()
			.map_err(|_| StorageError::CannotLock)?
			.execute_batch(&setup_db_sql)
			.map_err(StorageError::Sql)?;

		Ok(())
	}

	pub fn save_latest_block_number(&self, block_number: BlockNumber) -> Result<()> {
		self.conn
			.lock()
			.map_err(|_| StorageError::CannotLock)?
			.execute(
				"INSERT OR REPLACE INTO settings(name, value) VALUES(?1, ?2)",
				params![SETTING_LATEST_BLOCK_NUMBER, block_number.to_string()],
			)
			.map_err(StorageError::Sql)?;

		Ok(())
	}

	/// Returns the persisted block number, zero when nothing was stored yet.
	pub fn get_latest_block_number(&self) -> Result<BlockNumber> {
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		let value: Option<String> = conn
			.query_row(
				"SELECT value FROM settings WHERE name=?1",
				params![SETTING_LATEST_BLOCK_NUMBER],
				|row| row.get(0),
			)
			.optional()
			.map_err(StorageError::Sql)?;

		match value {
			Some(value) => value
				.parse()
				.map_err(|_| StorageError::Other("Stored block number is not a number")),
			None => Ok(0),
		}
	}

	pub fn save_channel_fee_rate(
		&self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
		policy: &FeePolicy,
	) -> Result<()> {
		let serialized_policy =
			serde_json::to_string(policy).map_err(StorageError::SerializationError)?;
		self.conn
			.lock()
			.map_err(|_| StorageError::CannotLock)?
			.execute(
				"INSERT OR REPLACE INTO channel_fee_rates(channel_id, participant, policy)
				VALUES(?1, ?2, ?3)",
				params![
					hex::encode(channel_identifier.as_bytes()),
					hex::encode(participant.as_bytes()),
					serialized_policy
				],
			)
			.map_err(StorageError::Sql)?;

		Ok(())
	}

	pub fn get_channel_fee_rate(
		&self,
		channel_identifier: ChannelIdentifier,
		participant: Address,
	) -> Result<Option<FeePolicy>> {
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		let serialized_policy: Option<String> = conn
			.query_row(
				"SELECT policy FROM channel_fee_rates WHERE channel_id=?1 AND participant=?2",
				params![
					hex::encode(channel_identifier.as_bytes()),
					hex::encode(participant.as_bytes())
				],
				|row| row.get(0),
			)
			.optional()
			.map_err(StorageError::Sql)?;

		match serialized_policy {
			Some(serialized_policy) => Ok(Some(
				serde_json::from_str(&serialized_policy)
					.map_err(StorageError::SerializationError)?,
			)),
			None => Ok(None),
		}
	}
}
