#![warn(clippy::missing_docs_in_private_items)]

//! Primitives crate defines the binary data types and utils shared by the
//! path finding service crates.

/// Base deserializers.
pub mod deserializers;
/// Channel identifier derivation.
pub mod hashing;
/// Base serializers.
pub mod serializers;
/// Base types some of which are aliases from rust-web3.
pub mod types;
