use super::fields::{date, first_text, list, text, NULL};
use super::report::PersonalInfo;
use serde_json::Value;

const ADDRESS_COMPONENTS: &[&str] = &["Address", "Locality", "City", "State", "Postal"];

pub(crate) fn parse_personal_info(report: &Value) -> PersonalInfo {
    let contact = report.get("IDAndContactInfo").unwrap_or(report);
    let personal = contact.get("PersonalInfo").unwrap_or(&NULL);
    let name_block = personal.get("Name").unwrap_or(&NULL);

    let mut name = join_name(name_block);
    if name.is_empty() {
        name = first_text(name_block, &["FullName"]).unwrap_or_default();
    }

    let pan = contact
        .get("IdentityInfo")
        .map(|identity| list(identity, &["PANId"]))
        .unwrap_or_default()
        .into_iter()
        .find_map(|id| first_text(id, &["IdNumber"]))
        .unwrap_or_default();

    let addresses = list(contact, &["AddressInfo"])
        .into_iter()
        .map(join_address)
        .filter(|address| !address.is_empty())
        .collect();

    let phones = list(contact, &["PhoneInfo"])
        .into_iter()
        .filter_map(|phone| first_text(phone, &["Number"]))
        .collect();

    PersonalInfo {
        name,
        date_of_birth: date(personal, &["DateOfBirth"]),
        pan,
        gender: first_text(personal, &["Gender"]).unwrap_or_default(),
        addresses,
        phones,
    }
}

fn join_name(name_block: &Value) -> String {
    ["FirstName", "MiddleName", "LastName"]
        .iter()
        .filter_map(|key| text(name_block, key))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_address(address: &Value) -> String {
    ADDRESS_COMPONENTS
        .iter()
        .filter_map(|key| text(address, key))
        .collect::<Vec<_>>()
        .join(", ")
}
