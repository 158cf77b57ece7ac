/// TCP server implementation for the leadstore daemon.
///
/// This module provides the [`Router`] which handles incoming TCP connections
/// and dispatches the fixed command set to the underlying store.
pub mod router;

pub use router::Router;
