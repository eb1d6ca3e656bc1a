//! Wire types shared between the Waitline server and its waiter agents.
//!
//! - [`objects`] holds the JSON envelopes exchanged over the waiter
//!   channel and the REST objects the agent fetches.
//! - [`endpoint`] derives the WebSocket address of a waiter channel.
//! - `client` (feature `client`) is a typed HTTP client for the waiter
//!   REST API.

#[cfg(feature = "client")]
pub mod client;
pub mod endpoint;
pub mod objects;
