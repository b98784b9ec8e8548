//! Chain-facing side of the path finding service: the typed state change
//! stream produced by the blockchain listener and the dispatcher that routes
//! it into the token network graph.

mod dispatcher;
/// Typed chain state changes.
pub mod events;

pub use dispatcher::ChainEventDispatcher;
