/// Software Development Kit (SDK) for the lead store.
///
/// This is the only module callers import for persistence. It provides
/// automatic mode discovery, a remote TCP client with the same traits as
/// the embedded engine, query helpers layered over the raw operations,
/// and CSV export.
pub mod client;
pub mod discovery;
pub mod export;
pub mod queries;

pub use client::Client;
pub use discovery::new;
