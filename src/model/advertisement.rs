//! Leads bulk-imported from external advertisement spreadsheets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lead that arrived through the advertisement import pipeline.
///
/// Phone numbers are unique across the collection at import time, checked
/// against both stored records and earlier rows of the same batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementEnquiry {
    pub id: String,
    pub name: String,
    pub phone_no: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
    pub imported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_by: Option<String>,
}

impl AdvertisementEnquiry {
    pub const ID_PREFIX: &'static str = "ADV";

    /// Materializes a draft. PAN is stored upper-cased, matching how it
    /// is validated.
    pub fn from_draft(draft: AdvertisementDraft) -> Self {
        Self {
            id: super::record_id(Self::ID_PREFIX),
            name: draft.name,
            phone_no: draft.phone_no,
            email: draft.email,
            aadhar_no: draft.aadhar_no,
            pan_no: draft.pan_no.map(|p| p.to_uppercase()),
            imported_at: Utc::now(),
            imported_by: draft.imported_by,
        }
    }
}

/// One row of an import batch, or a single manual add.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvertisementDraft {
    pub name: String,
    pub phone_no: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_by: Option<String>,
}

/// Partial update for an advertisement enquiry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertisementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
}

impl AdvertisementPatch {
    pub fn apply(self, record: &mut AdvertisementEnquiry) {
        if let Some(v) = self.name {
            record.name = v;
        }
        if let Some(v) = self.phone_no {
            record.phone_no = v;
        }
        if let Some(v) = self.email {
            record.email = v;
        }
        if let Some(v) = self.aadhar_no {
            record.aadhar_no = Some(v);
        }
        if let Some(v) = self.pan_no {
            record.pan_no = Some(v.to_uppercase());
        }
    }
}

/// Outcome of a bulk import: how many rows landed, how many were turned
/// away, and a row-numbered message for every rejection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_uppercases_pan() {
        let record = AdvertisementEnquiry::from_draft(AdvertisementDraft {
            name: "Ravi Kumar".to_string(),
            phone_no: "9812345678".to_string(),
            email: "ravi@example.com".to_string(),
            pan_no: Some("abcde1234f".to_string()),
            ..Default::default()
        });
        assert!(record.id.starts_with("ADV-"));
        assert_eq!(record.pan_no.as_deref(), Some("ABCDE1234F"));
    }

    #[test]
    fn test_patch_merge() {
        let mut record = AdvertisementEnquiry::from_draft(AdvertisementDraft {
            name: "Ravi Kumar".to_string(),
            phone_no: "9812345678".to_string(),
            email: "ravi@example.com".to_string(),
            ..Default::default()
        });
        let patch = AdvertisementPatch {
            email: Some("ravi.k@example.com".to_string()),
            ..Default::default()
        };
        patch.apply(&mut record);
        assert_eq!(record.email, "ravi.k@example.com");
        assert_eq!(record.name, "Ravi Kumar");
        assert_eq!(record.phone_no, "9812345678");
    }
}
