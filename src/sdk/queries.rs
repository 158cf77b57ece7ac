//! Query helpers layered over the raw collection operations.
//!
//! Everything here is a full-collection read followed by a linear scan;
//! there is no index to consult and none is wanted at this scale. The
//! helpers are generic over the operation traits, so they behave
//! identically in embedded and remote mode.

use std::collections::HashSet;

use chrono::Utc;

use crate::model::validate;
use crate::model::{
    AdvertisementDraft, Enquiry, EnquiryDraft, EnquiryFilter, EnquiryStats, ImportReport, User,
    UserDraft,
};
use crate::{AdvertisementOps, EnquiryOps, Error, Result, UserOps};

/// Case-insensitive substring search over name, mobile, email and id.
/// An empty query returns the whole collection.
pub async fn search_enquiries<S>(store: &S, query: &str) -> Result<Vec<Enquiry>>
where
    S: EnquiryOps + ?Sized,
{
    let all = store.list_enquiries().await?;
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|e| {
            e.full_name.to_lowercase().contains(&needle)
                || e.mobile.contains(&needle)
                || e.email.to_lowercase().contains(&needle)
                || e.id.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Applies an [`EnquiryFilter`] to the whole collection.
pub async fn filter_enquiries<S>(store: &S, filter: &EnquiryFilter) -> Result<Vec<Enquiry>>
where
    S: EnquiryOps + ?Sized,
{
    Ok(store
        .list_enquiries()
        .await?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect())
}

/// Aggregate counts over the enquiry collection.
pub async fn enquiry_stats<S>(store: &S) -> Result<EnquiryStats>
where
    S: EnquiryOps + ?Sized,
{
    let today = Utc::now().date_naive();
    let mut stats = EnquiryStats::default();
    for e in store.list_enquiries().await? {
        stats.total += 1;
        *stats.by_status.entry(e.status.clone()).or_insert(0) += 1;
        *stats.by_state.entry(e.state.clone()).or_insert(0) += 1;
        if e.created_at.date_naive() == today {
            stats.today += 1;
        }
    }
    Ok(stats)
}

/// Whether any enquiry other than `exclude_id` already carries this mobile.
pub async fn is_mobile_taken<S>(store: &S, mobile: &str, exclude_id: Option<&str>) -> Result<bool>
where
    S: EnquiryOps + ?Sized,
{
    Ok(store
        .list_enquiries()
        .await?
        .iter()
        .any(|e| exclude_id != Some(e.id.as_str()) && e.mobile == mobile))
}

/// Whether any enquiry other than `exclude_id` already carries this email.
pub async fn is_email_taken<S>(store: &S, email: &str, exclude_id: Option<&str>) -> Result<bool>
where
    S: EnquiryOps + ?Sized,
{
    Ok(store
        .list_enquiries()
        .await?
        .iter()
        .any(|e| exclude_id != Some(e.id.as_str()) && e.email.eq_ignore_ascii_case(email)))
}

/// Whether any enquiry other than `exclude_id` already carries this aadhar.
pub async fn is_aadhar_taken<S>(store: &S, aadhar: &str, exclude_id: Option<&str>) -> Result<bool>
where
    S: EnquiryOps + ?Sized,
{
    Ok(store.list_enquiries().await?.iter().any(|e| {
        exclude_id != Some(e.id.as_str()) && e.aadhar_no.as_deref() == Some(aadhar)
    }))
}

/// Whether any enquiry other than `exclude_id` already carries this PAN.
pub async fn is_pan_taken<S>(store: &S, pan: &str, exclude_id: Option<&str>) -> Result<bool>
where
    S: EnquiryOps + ?Sized,
{
    let pan = pan.to_uppercase();
    Ok(store.list_enquiries().await?.iter().any(|e| {
        exclude_id != Some(e.id.as_str())
            && e.pan_no
                .as_deref()
                .map(|p| p.to_uppercase() == pan)
                .unwrap_or(false)
    }))
}

/// Whether a username is already taken, inactive accounts included.
pub async fn is_username_taken<S>(store: &S, username: &str, exclude_id: Option<&str>) -> Result<bool>
where
    S: UserOps + ?Sized,
{
    Ok(store
        .list_users()
        .await?
        .iter()
        .any(|u| exclude_id != Some(u.id.as_str()) && u.username == username))
}

/// Runs every uniqueness probe against a candidate enquiry and returns
/// one message per collision.
pub async fn check_duplicates<S>(
    store: &S,
    draft: &EnquiryDraft,
    exclude_id: Option<&str>,
) -> Result<Vec<String>>
where
    S: EnquiryOps + ?Sized,
{
    let mut problems = Vec::new();
    if is_mobile_taken(store, &draft.mobile, exclude_id).await? {
        problems.push(format!(
            "Mobile number {} is already registered",
            draft.mobile
        ));
    }
    if is_email_taken(store, &draft.email, exclude_id).await? {
        problems.push(format!("Email {} is already registered", draft.email));
    }
    if let Some(aadhar) = draft.aadhar_no.as_deref().filter(|a| !a.is_empty()) {
        if is_aadhar_taken(store, aadhar, exclude_id).await? {
            problems.push(format!("Aadhar number {} is already registered", aadhar));
        }
    }
    if let Some(pan) = draft.pan_no.as_deref().filter(|p| !p.is_empty()) {
        if is_pan_taken(store, pan, exclude_id).await? {
            problems.push(format!("PAN {} is already registered", pan));
        }
    }
    Ok(problems)
}

/// The guarded save: field validation, then the duplicate probes, and only
/// then the store. Nothing is mutated when either step rejects.
pub async fn save_enquiry<S>(store: &S, draft: EnquiryDraft) -> Result<Enquiry>
where
    S: EnquiryOps + ?Sized,
{
    let report = validate::validate_enquiry(&draft);
    if !report.is_valid() {
        return Err(Error::Validation(report.errors));
    }
    let duplicates = check_duplicates(store, &draft, None).await?;
    if !duplicates.is_empty() {
        return Err(Error::Validation(duplicates));
    }
    store.add_enquiry(draft).await
}

/// The guarded account creation: validation plus the username probe.
pub async fn create_user<S>(store: &S, draft: UserDraft) -> Result<User>
where
    S: UserOps + ?Sized,
{
    let report = validate::validate_new_user(&draft);
    if !report.is_valid() {
        return Err(Error::Validation(report.errors));
    }
    if is_username_taken(store, &draft.username, None).await? {
        return Err(Error::Validation(vec![format!(
            "Username {} is already taken",
            draft.username
        )]));
    }
    store.add_user(draft).await
}

/// The advertisement import pipeline.
///
/// Each row is validated independently; phone numbers must be unused both
/// in the stored collection and among earlier rows of the same batch.
/// Accepted rows are stamped with `imported_by` and written in a single
/// bulk append, so the whole import is one read and one write.
pub async fn import_advertisements<S>(
    store: &S,
    rows: Vec<AdvertisementDraft>,
    imported_by: Option<&str>,
) -> Result<ImportReport>
where
    S: AdvertisementOps + ?Sized,
{
    let mut seen: HashSet<String> = store
        .list_advertisements()
        .await?
        .into_iter()
        .map(|a| a.phone_no)
        .collect();

    let mut accepted = Vec::new();
    let mut report = ImportReport::default();

    for (idx, mut row) in rows.into_iter().enumerate() {
        let row_no = idx + 1;

        let validation = validate::validate_advertisement(&row);
        if !validation.is_valid() {
            report.failed += 1;
            for msg in validation.errors {
                report.errors.push(format!("Row {}: {}", row_no, msg));
            }
            continue;
        }
        if seen.contains(&row.phone_no) {
            report.failed += 1;
            report.errors.push(format!(
                "Row {}: phone number {} already exists",
                row_no, row.phone_no
            ));
            continue;
        }

        seen.insert(row.phone_no.clone());
        row.imported_by = imported_by.map(|s| s.to_string());
        accepted.push(row);
    }

    report.imported = accepted.len();
    if !accepted.is_empty() {
        store.bulk_add_advertisements(accepted).await?;
    }
    Ok(report)
}
