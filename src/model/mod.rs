//! Record types, the persisted document, and domain validators.

pub mod advertisement;
pub mod enquiry;
pub mod user;
pub mod validate;

pub use advertisement::{AdvertisementDraft, AdvertisementEnquiry, AdvertisementPatch, ImportReport};
pub use enquiry::{Enquiry, EnquiryDraft, EnquiryFilter, EnquiryPatch, EnquiryStats};
pub use user::{LoginRequest, Role, Session, User, UserDraft, UserPatch};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The single persisted document: three independent top-level collections.
///
/// There are no foreign keys between them; `created_by`/`imported_by` are
/// free-text references to a username with no enforced existence check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub enquiries: Vec<Enquiry>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub advertisements: Vec<AdvertisementEnquiry>,
}

/// Generates a collection-scoped record id, e.g. `ENQ-1754556000000-9f3ab2c1`.
pub fn record_id(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        hex::encode(rand::random::<[u8; 4]>())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_shape() {
        let id = record_id("ENQ");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ENQ");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_record_ids_are_distinct() {
        assert_ne!(record_id("USR"), record_id("USR"));
    }

    #[test]
    fn test_database_tolerates_missing_collections() {
        let db: Database = serde_json::from_str(r#"{"enquiries": []}"#).unwrap();
        assert!(db.users.is_empty());
        assert!(db.advertisements.is_empty());
    }
}
