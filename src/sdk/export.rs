//! CSV serialization for the export actions.
//!
//! Every field is double-quoted (embedded quotes doubled), one header row
//! plus one row per record. Spreadsheet tools on the receiving end are the
//! whole audience here, so the format stays deliberately dumb.

use chrono::{NaiveDate, Utc};

use crate::model::{AdvertisementEnquiry, Enquiry};

/// Column order of the enquiry export.
const ENQUIRY_COLUMNS: [&str; 23] = [
    "ID",
    "Full Name",
    "Mobile",
    "Alt Mobile",
    "Email",
    "Address",
    "Aadhar No",
    "PAN No",
    "Demat Account No",
    "Trading Account No",
    "State",
    "Source",
    "Interest Level",
    "Referred By",
    "Referred By (Other)",
    "Profession",
    "Profession (Other)",
    "Share Market Knowledge",
    "Status",
    "Callback Date",
    "Inbound Date",
    "Outbound Date",
    "Created At",
];

/// Column order of the advertisement export.
const ADVERTISEMENT_COLUMNS: [&str; 7] = [
    "ID",
    "Name",
    "Phone No",
    "Email",
    "Aadhar No",
    "PAN No",
    "Imported At",
];

fn csv_row<I>(fields: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| format!("\"{}\"", f.as_ref().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_date(value: &Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// Serializes the enquiry collection; always header + one line per record.
pub fn enquiries_to_csv(enquiries: &[Enquiry]) -> String {
    let mut lines = vec![csv_row(ENQUIRY_COLUMNS)];
    for e in enquiries {
        lines.push(csv_row([
            e.id.clone(),
            e.full_name.clone(),
            e.mobile.clone(),
            opt(&e.alt_mobile),
            e.email.clone(),
            opt(&e.address),
            opt(&e.aadhar_no),
            opt(&e.pan_no),
            opt(&e.demat_account_no),
            opt(&e.trading_account_no),
            e.state.clone(),
            opt(&e.source),
            opt(&e.interest_level),
            opt(&e.referred_by),
            opt(&e.referred_by_other),
            opt(&e.profession),
            opt(&e.profession_other),
            opt(&e.share_market_knowledge),
            e.status.clone(),
            opt_date(&e.callback_date),
            opt_date(&e.inbound_date),
            opt_date(&e.outbound_date),
            e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]));
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

/// Serializes the advertisement collection.
pub fn advertisements_to_csv(records: &[AdvertisementEnquiry]) -> String {
    let mut lines = vec![csv_row(ADVERTISEMENT_COLUMNS)];
    for a in records {
        lines.push(csv_row([
            a.id.clone(),
            a.name.clone(),
            a.phone_no.clone(),
            a.email.clone(),
            opt(&a.aadhar_no),
            opt(&a.pan_no),
            a.imported_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]));
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

/// Default export file name, date-stamped: `enquiries-2026-08-07.csv`.
pub fn export_filename(prefix: &str) -> String {
    format!("{}-{}.csv", prefix, Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdvertisementDraft, EnquiryDraft};

    fn sample() -> Enquiry {
        Enquiry::from_draft(EnquiryDraft {
            full_name: "Asha \"AP\" Patil".to_string(),
            mobile: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            state: "Maharashtra".to_string(),
            status: "New".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_header_plus_row_per_record() {
        let records = vec![sample(), sample()];
        let csv = enquiries_to_csv(&records);
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_every_field_is_quoted() {
        let csv = enquiries_to_csv(&[sample()]);
        let header = csv.lines().next().unwrap();
        assert_eq!(header.matches("\",\"").count(), ENQUIRY_COLUMNS.len() - 1);
        assert!(header.starts_with("\"ID\""));
        assert!(header.ends_with("\"Created At\""));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let csv = enquiries_to_csv(&[sample()]);
        assert!(csv.contains("\"Asha \"\"AP\"\" Patil\""));
    }

    #[test]
    fn test_advertisement_columns() {
        let record = AdvertisementEnquiry::from_draft(AdvertisementDraft {
            name: "Ravi Kumar".to_string(),
            phone_no: "9812345678".to_string(),
            email: "ravi@example.com".to_string(),
            ..Default::default()
        });
        let csv = advertisements_to_csv(&[record]);
        let header = csv.lines().next().unwrap();
        assert_eq!(header.split("\",\"").count(), 7);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row.split("\",\"").count(), 7);
    }

    #[test]
    fn test_export_filename_is_dated() {
        let name = export_filename("enquiries");
        assert!(name.starts_with("enquiries-"));
        assert!(name.ends_with(".csv"));
    }
}
