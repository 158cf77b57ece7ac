//! The directly-captured sales lead and its draft/patch/query companions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sales lead captured directly in the system.
///
/// Mobile, email, aadhar and PAN are expected to be unique across the
/// collection; the store itself never enforces that, the SDK probes in
/// [`crate::sdk::queries`] do, before an insert is attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: String,
    pub full_name: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_mobile: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demat_account_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_account_no: Option<String>,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_market_knowledge: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enquiry {
    pub const ID_PREFIX: &'static str = "ENQ";

    /// Materializes a draft into a stored record: id and both timestamps
    /// are generated here, never supplied by the caller.
    pub fn from_draft(draft: EnquiryDraft) -> Self {
        let now = Utc::now();
        Self {
            id: super::record_id(Self::ID_PREFIX),
            full_name: draft.full_name,
            mobile: draft.mobile,
            alt_mobile: draft.alt_mobile,
            email: draft.email,
            address: draft.address,
            aadhar_no: draft.aadhar_no,
            pan_no: draft.pan_no,
            demat_account_no: draft.demat_account_no,
            trading_account_no: draft.trading_account_no,
            state: draft.state,
            source: draft.source,
            interest_level: draft.interest_level,
            referred_by: draft.referred_by,
            referred_by_other: draft.referred_by_other,
            profession: draft.profession,
            profession_other: draft.profession_other,
            share_market_knowledge: draft.share_market_knowledge,
            status: draft.status,
            callback_date: draft.callback_date,
            inbound_date: draft.inbound_date,
            outbound_date: draft.outbound_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller-supplied fields of a new enquiry; everything except id and
/// audit timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnquiryDraft {
    pub full_name: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_mobile: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demat_account_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_account_no: Option<String>,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_market_knowledge: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_date: Option<NaiveDate>,
}

/// A partial update: only fields carried as `Some` are merged onto the
/// stored record. Absent fields keep their values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnquiryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demat_account_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_account_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_market_knowledge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_date: Option<NaiveDate>,
}

impl EnquiryPatch {
    /// Shallow-merges the patch onto an existing record. The caller is
    /// responsible for refreshing `updated_at`.
    pub fn apply(self, enquiry: &mut Enquiry) {
        if let Some(v) = self.full_name {
            enquiry.full_name = v;
        }
        if let Some(v) = self.mobile {
            enquiry.mobile = v;
        }
        if let Some(v) = self.alt_mobile {
            enquiry.alt_mobile = Some(v);
        }
        if let Some(v) = self.email {
            enquiry.email = v;
        }
        if let Some(v) = self.address {
            enquiry.address = Some(v);
        }
        if let Some(v) = self.aadhar_no {
            enquiry.aadhar_no = Some(v);
        }
        if let Some(v) = self.pan_no {
            enquiry.pan_no = Some(v);
        }
        if let Some(v) = self.demat_account_no {
            enquiry.demat_account_no = Some(v);
        }
        if let Some(v) = self.trading_account_no {
            enquiry.trading_account_no = Some(v);
        }
        if let Some(v) = self.state {
            enquiry.state = v;
        }
        if let Some(v) = self.source {
            enquiry.source = Some(v);
        }
        if let Some(v) = self.interest_level {
            enquiry.interest_level = Some(v);
        }
        if let Some(v) = self.referred_by {
            enquiry.referred_by = Some(v);
        }
        if let Some(v) = self.referred_by_other {
            enquiry.referred_by_other = Some(v);
        }
        if let Some(v) = self.profession {
            enquiry.profession = Some(v);
        }
        if let Some(v) = self.profession_other {
            enquiry.profession_other = Some(v);
        }
        if let Some(v) = self.share_market_knowledge {
            enquiry.share_market_knowledge = Some(v);
        }
        if let Some(v) = self.status {
            enquiry.status = v;
        }
        if let Some(v) = self.callback_date {
            enquiry.callback_date = Some(v);
        }
        if let Some(v) = self.inbound_date {
            enquiry.inbound_date = Some(v);
        }
        if let Some(v) = self.outbound_date {
            enquiry.outbound_date = Some(v);
        }
    }
}

/// Multi-field filter; all criteria are optional and AND-combined.
/// The date range is matched against the created date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnquiryFilter {
    pub status: Option<String>,
    pub state: Option<String>,
    pub profession: Option<String>,
    pub share_market_knowledge: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EnquiryFilter {
    pub fn matches(&self, enquiry: &Enquiry) -> bool {
        if let Some(status) = &self.status {
            if &enquiry.status != status {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if &enquiry.state != state {
                return false;
            }
        }
        if let Some(profession) = &self.profession {
            if enquiry.profession.as_ref() != Some(profession) {
                return false;
            }
        }
        if let Some(knowledge) = &self.share_market_knowledge {
            if enquiry.share_market_knowledge.as_ref() != Some(knowledge) {
                return false;
            }
        }
        let created = enquiry.created_at.date_naive();
        if let Some(from) = self.from {
            if created < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if created > to {
                return false;
            }
        }
        true
    }
}

/// Aggregate counts over the enquiry collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnquiryStats {
    pub total: usize,
    pub by_status: HashMap<String, usize>,
    pub by_state: HashMap<String, usize>,
    pub today: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EnquiryDraft {
        EnquiryDraft {
            full_name: "Asha Patil".to_string(),
            mobile: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            state: "Maharashtra".to_string(),
            status: "New".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_draft_generates_identity() {
        let e = Enquiry::from_draft(draft());
        assert!(e.id.starts_with("ENQ-"));
        assert_eq!(e.created_at, e.updated_at);
        assert_eq!(e.full_name, "Asha Patil");
    }

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut e = Enquiry::from_draft(draft());
        let patch = EnquiryPatch {
            status: Some("Contacted".to_string()),
            ..Default::default()
        };
        patch.apply(&mut e);
        assert_eq!(e.status, "Contacted");
        assert_eq!(e.full_name, "Asha Patil");
        assert_eq!(e.mobile, "9876543210");
        assert_eq!(e.state, "Maharashtra");
    }

    #[test]
    fn test_filter_date_range() {
        let e = Enquiry::from_draft(draft());
        let today = e.created_at.date_naive();
        let filter = EnquiryFilter {
            from: Some(today),
            to: Some(today),
            ..Default::default()
        };
        assert!(filter.matches(&e));

        let yesterday = today.pred_opt().unwrap();
        let past = EnquiryFilter {
            to: Some(yesterday),
            ..Default::default()
        };
        assert!(!past.matches(&e));
    }

    #[test]
    fn test_filter_status_and_state() {
        let e = Enquiry::from_draft(draft());
        let hit = EnquiryFilter {
            status: Some("New".to_string()),
            state: Some("Maharashtra".to_string()),
            ..Default::default()
        };
        assert!(hit.matches(&e));

        let miss = EnquiryFilter {
            status: Some("Converted".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&e));
    }
}
