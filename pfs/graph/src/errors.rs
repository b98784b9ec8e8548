#![warn(clippy::missing_docs_in_private_items)]

use derive_more::Display;
use thiserror::Error;

use crate::types::Path;

/// Errors returned when applying channel lifecycle events to the registry.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum TokenNetworkError {
	#[display(fmt = "Channel already exists")]
	AlreadyExists,
	#[display(fmt = "Channel not found")]
	NotFound,
	#[display(fmt = "Address is not a channel participant")]
	InvalidParticipant,
	#[display(fmt = "Balance proof is older than the current one")]
	StaleUpdate,
}

/// Errors returned from path queries.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
	#[display(fmt = "Token is not registered")]
	UnknownToken,
	#[display(fmt = "No usable route between source and target")]
	NoPath,
	#[display(fmt = "Invalid argument: {}", _0)]
	InvalidArgument(&'static str),
	#[display(fmt = "Deadline exceeded after materializing {} candidates", "_0.len()")]
	DeadlineExceeded(Vec<Path>),
}
