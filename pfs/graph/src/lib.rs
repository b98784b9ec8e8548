#![warn(clippy::missing_docs_in_private_items)]

//! The token network graph engine: a per-token directed capacity graph fed
//! by channel lifecycle events and queried for fee-ranked routes.

/// Graph constants.
pub mod constants;
/// Graph errors.
pub mod errors;
/// Fee computation and weight projection.
pub mod fees;
/// Constrained path search.
pub mod routing;
/// The channel registry.
pub mod token_network;
/// Graph types.
pub mod types;
