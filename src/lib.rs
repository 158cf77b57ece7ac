//! Leadstore is the persistence and data-access core of a small CRM for
//! sales enquiries, bulk-imported advertisement leads, and operator accounts.
//!
//! The whole dataset is one JSON document with three independent collections,
//! owned by a privileged host and reachable only through a fixed set of named
//! operations. Callers use the typed SDK in either embedded or remote (TCP)
//! mode; the two modes implement the same traits.
//!
//! ## Core Components
//! - [`engine`]: The storage backend (in-memory document with flat-file persistence).
//! - [`model`]: Record types, the persisted document, and domain validators.
//! - [`sdk`]: Client libraries for both embedded and remote (TCP) modes, plus
//!   query helpers and CSV export.
//! - [`server`]: TCP daemon implementation.

pub mod engine;
pub mod model;
pub mod sdk;
pub mod server;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    AdvertisementDraft, AdvertisementEnquiry, AdvertisementPatch, Enquiry, EnquiryDraft,
    EnquiryPatch, Session, User, UserDraft, UserPatch,
};

/// Errors returned by the lead store.
#[derive(Error, Debug)]
pub enum Error {
    /// The update or delete target does not exist in its collection.
    #[error("record not found")]
    NotFound,
    /// The caller's session does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Login failed; wrong username and wrong password are not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// The candidate record failed validation or uniqueness checks.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during persistence or network communication.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Maps an `ERR` line received over the wire back onto the local taxonomy.
    pub fn from_wire(message: &str) -> Self {
        if message.starts_with("record not found") {
            Error::NotFound
        } else if let Some(reason) = message.strip_prefix("forbidden:") {
            Error::Forbidden(reason.trim().to_string())
        } else if message.starts_with("invalid username or password") {
            Error::InvalidCredentials
        } else {
            Error::Internal(message.to_string())
        }
    }
}

/// A specialized Result type for lead store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// File name of the persisted document inside the data directory.
pub const DATABASE_FILE: &str = "database.json";

/// File name under which the CLI keeps the logged-in session between runs.
pub const SESSION_FILE: &str = "session.json";

/// Operations on the directly-captured sales leads.
#[async_trait]
pub trait EnquiryOps: Send + Sync {
    /// Returns every enquiry in the collection.
    async fn list_enquiries(&self) -> Result<Vec<Enquiry>>;
    /// Appends a new enquiry; id and timestamps are generated host-side.
    async fn add_enquiry(&self, draft: EnquiryDraft) -> Result<Enquiry>;
    /// Merges the patch onto the record with the given id.
    async fn update_enquiry(&self, id: &str, patch: EnquiryPatch) -> Result<()>;
    /// Removes an enquiry. Requires an admin session; missing ids are a no-op.
    async fn delete_enquiry(&self, session: &Session, id: &str) -> Result<()>;
}

/// Operations on operator accounts.
#[async_trait]
pub trait UserOps: Send + Sync {
    /// Returns every account, active or not.
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Creates an account; the password is hashed before it is stored.
    async fn add_user(&self, draft: UserDraft) -> Result<User>;
    /// Merges the patch onto the account. A blank password keeps the current one.
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()>;
    /// Deactivates an account. Requires an admin session that is not the target's own.
    async fn delete_user(&self, session: &Session, id: &str) -> Result<()>;
    /// Verifies credentials against active accounts and returns a [`Session`].
    async fn login(&self, username: &str, password: &str) -> Result<Session>;
}

/// Operations on advertisement-sourced leads.
#[async_trait]
pub trait AdvertisementOps: Send + Sync {
    /// Returns every advertisement enquiry.
    async fn list_advertisements(&self) -> Result<Vec<AdvertisementEnquiry>>;
    /// Appends a single advertisement enquiry.
    async fn add_advertisement(&self, draft: AdvertisementDraft) -> Result<AdvertisementEnquiry>;
    /// Appends a whole batch with one read and one write.
    async fn bulk_add_advertisements(
        &self,
        drafts: Vec<AdvertisementDraft>,
    ) -> Result<Vec<AdvertisementEnquiry>>;
    /// Merges the patch onto the record with the given id.
    async fn update_advertisement(&self, id: &str, patch: AdvertisementPatch) -> Result<()>;
    /// Removes an advertisement enquiry. Requires an admin session.
    async fn delete_advertisement(&self, session: &Session, id: &str) -> Result<()>;
}

/// The full operation surface of the store.
///
/// Implemented by the embedded [`engine::DocStore`] and the remote
/// [`sdk::Client`] alike, so callers never care which mode they hold.
pub trait LeadStore: EnquiryOps + UserOps + AdvertisementOps {}

impl<T: EnquiryOps + UserOps + AdvertisementOps> LeadStore for T {}
