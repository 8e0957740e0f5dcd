use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lookup data backing state resolution.
///
/// Keys of `names` are stored normalized (trimmed, lowercase, single spaces).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTables {
    pub names: HashMap<String, String>,
    pub pincode_prefixes: HashMap<String, String>,
}

impl StateTables {
    pub fn from_pairs(names: &[(&str, &str)], prefixes: &[(&str, &str)]) -> Self {
        let names = names
            .iter()
            .map(|(name, code)| (normalize_state_name(name), (*code).to_string()))
            .collect();
        let pincode_prefixes = prefixes
            .iter()
            .map(|(prefix, code)| ((*prefix).to_string(), (*code).to_string()))
            .collect();

        Self {
            names,
            pincode_prefixes,
        }
    }

    pub fn standard() -> Self {
        Self::from_pairs(STATE_NAMES, PINCODE_PREFIXES)
    }

    pub(crate) fn code_for_name(&self, normalized: &str) -> Option<&str> {
        self.names.get(normalized).map(String::as_str)
    }

    pub(crate) fn code_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.pincode_prefixes.get(prefix).map(String::as_str)
    }
}

impl Default for StateTables {
    fn default() -> Self {
        Self::standard()
    }
}

pub(crate) fn normalize_state_name(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

const STATE_NAMES: &[(&str, &str)] = &[
    // States
    ("andhra pradesh", "AP"),
    ("arunachal pradesh", "AR"),
    ("assam", "AS"),
    ("bihar", "BR"),
    ("chhattisgarh", "CG"),
    ("goa", "GA"),
    ("gujarat", "GJ"),
    ("haryana", "HR"),
    ("himachal pradesh", "HP"),
    ("jharkhand", "JH"),
    ("karnataka", "KA"),
    ("kerala", "KL"),
    ("madhya pradesh", "MP"),
    ("maharashtra", "MH"),
    ("manipur", "MN"),
    ("meghalaya", "ML"),
    ("mizoram", "MZ"),
    ("nagaland", "NL"),
    ("odisha", "OD"),
    ("punjab", "PB"),
    ("rajasthan", "RJ"),
    ("sikkim", "SK"),
    ("tamil nadu", "TN"),
    ("telangana", "TS"),
    ("tripura", "TR"),
    ("uttar pradesh", "UP"),
    ("uttarakhand", "UK"),
    ("west bengal", "WB"),
    // Union territories
    ("andaman and nicobar islands", "AN"),
    ("chandigarh", "CH"),
    ("dadra and nagar haveli and daman and diu", "DN"),
    ("delhi", "DL"),
    ("jammu and kashmir", "JK"),
    ("ladakh", "LA"),
    ("lakshadweep", "LD"),
    ("puducherry", "PY"),
    // Historical and alternate spellings
    ("orissa", "OD"),
    ("pondicherry", "PY"),
    ("uttaranchal", "UK"),
    ("chattisgarh", "CG"),
    ("new delhi", "DL"),
    ("nct of delhi", "DL"),
    ("andaman & nicobar islands", "AN"),
    ("jammu & kashmir", "JK"),
    ("dadra and nagar haveli", "DN"),
    ("daman and diu", "DD"),
];

// Coarse postal-circle mapping. Several circles straddle state borders, so the
// result is advisory only.
const PINCODE_PREFIXES: &[(&str, &str)] = &[
    ("10", "DL"),
    ("11", "DL"),
    ("12", "HR"),
    ("13", "HR"),
    ("14", "PB"),
    ("15", "PB"),
    ("16", "CH"),
    ("17", "HP"),
    ("18", "JK"),
    ("19", "JK"),
    ("20", "UP"),
    ("21", "UP"),
    ("22", "UP"),
    ("23", "UP"),
    ("24", "UK"),
    ("25", "UP"),
    ("26", "UP"),
    ("27", "UP"),
    ("28", "UP"),
    ("30", "RJ"),
    ("31", "RJ"),
    ("32", "RJ"),
    ("33", "RJ"),
    ("34", "RJ"),
    ("36", "GJ"),
    ("37", "GJ"),
    ("38", "GJ"),
    ("39", "GJ"),
    ("40", "MH"),
    ("41", "MH"),
    ("42", "MH"),
    ("43", "MH"),
    ("44", "MH"),
    ("45", "MP"),
    ("46", "MP"),
    ("47", "MP"),
    ("48", "MP"),
    ("49", "CG"),
    ("50", "TS"),
    ("51", "AP"),
    ("52", "AP"),
    ("53", "AP"),
    ("56", "KA"),
    ("57", "KA"),
    ("58", "KA"),
    ("59", "KA"),
    ("60", "TN"),
    ("61", "TN"),
    ("62", "TN"),
    ("63", "TN"),
    ("64", "TN"),
    ("67", "KL"),
    ("68", "KL"),
    ("69", "KL"),
    ("70", "WB"),
    ("71", "WB"),
    ("72", "WB"),
    ("73", "WB"),
    ("74", "WB"),
    ("75", "OD"),
    ("76", "OD"),
    ("77", "OD"),
    ("78", "AS"),
    ("79", "ML"),
    ("80", "BR"),
    ("81", "JH"),
    ("82", "JH"),
    ("83", "JH"),
    ("84", "BR"),
    ("85", "BR"),
    ("86", "BR"),
];
