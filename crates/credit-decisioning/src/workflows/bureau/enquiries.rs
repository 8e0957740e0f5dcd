use super::fields::{date, money, text_or};
use super::report::Enquiry;
use chrono::{Days, NaiveDate};
use serde_json::Value;

pub(crate) fn parse_enquiry(value: &Value) -> Result<Enquiry, String> {
    if !value.is_object() {
        return Err("enquiry entry is not an object".to_string());
    }

    let date = date(value, &["Date", "EnquiryDate"])
        .ok_or_else(|| "enquiry date missing or unreadable".to_string())?;

    Ok(Enquiry {
        date,
        institution: text_or(value, "Institution", "Unknown"),
        purpose: text_or(value, "RequestPurpose", ""),
        amount: money(value, &["Amount"])?,
    })
}

/// Enquiries dated within `days` before `today`, inclusive of both ends.
/// Future-dated enquiries are ignored.
pub(crate) fn count_within(enquiries: &[Enquiry], today: NaiveDate, days: u64) -> u32 {
    let Some(window_start) = today.checked_sub_days(Days::new(days)) else {
        return 0;
    };

    enquiries
        .iter()
        .filter(|enquiry| enquiry.date >= window_start && enquiry.date <= today)
        .count() as u32
}
