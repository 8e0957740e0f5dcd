//! Free-text state / postal code to two-letter state code resolution.

mod tables;

pub use tables::StateTables;

use tables::normalize_state_name;

/// Resolves bureau state codes from whatever the applicant typed.
#[derive(Debug, Clone, Default)]
pub struct AddressStateResolver {
    tables: StateTables,
}

impl AddressStateResolver {
    pub fn new(tables: StateTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &StateTables {
        &self.tables
    }

    /// Returns a two-letter state code, or an empty string when nothing usable
    /// was supplied. Never fails. The last-resort prefix is taken only when
    /// both leading characters are letters, so "#1 Main" resolves to "".
    pub fn resolve(&self, state_name_or_code: Option<&str>, postal_code: Option<&str>) -> String {
        let raw = state_name_or_code.map(str::trim).unwrap_or_default();

        if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return raw.to_ascii_uppercase();
        }

        if !raw.is_empty() {
            if let Some(code) = self.tables.code_for_name(&normalize_state_name(raw)) {
                return code.to_string();
            }
        }

        if let Some(code) = postal_code.and_then(|postal| self.code_for_postal(postal)) {
            return code.to_string();
        }

        // Best effort only: "Atlantis" becomes "AT".
        let prefix: String = raw.chars().take(2).collect();
        if prefix.chars().count() == 2 && prefix.chars().all(char::is_alphabetic) {
            return prefix.to_uppercase();
        }

        String::new()
    }

    fn code_for_postal(&self, postal_code: &str) -> Option<&str> {
        let digits = postal_code.trim();
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.tables.code_for_prefix(&digits[..2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AddressStateResolver {
        AddressStateResolver::default()
    }

    #[test]
    fn two_letter_codes_pass_through_uppercased() {
        assert_eq!(resolver().resolve(Some("mh"), None), "MH");
        assert_eq!(resolver().resolve(Some(" ka "), Some("110001")), "KA");
    }

    #[test]
    fn historical_spellings_resolve() {
        assert_eq!(resolver().resolve(Some("Orissa"), None), "OD");
        assert_eq!(resolver().resolve(Some("PONDICHERRY"), None), "PY");
        assert_eq!(resolver().resolve(Some("  Tamil   Nadu "), None), "TN");
    }

    #[test]
    fn postal_prefix_used_when_name_missing() {
        assert_eq!(resolver().resolve(Some(""), Some("110001")), "DL");
        assert_eq!(resolver().resolve(None, Some("560034")), "KA");
    }

    #[test]
    fn malformed_postal_code_is_ignored() {
        assert_eq!(resolver().resolve(None, Some("11000")), "");
        assert_eq!(resolver().resolve(None, Some("11A001")), "");
        assert_eq!(resolver().resolve(None, Some("990001")), "");
    }

    #[test]
    fn unknown_name_falls_back_to_leading_letters() {
        assert_eq!(resolver().resolve(Some("Atlantis"), None), "AT");
        assert_eq!(resolver().resolve(Some("Atlantis"), Some("400001")), "MH");
    }

    #[test]
    fn non_letter_prefix_is_not_a_state_code() {
        assert_eq!(resolver().resolve(Some("#1 Main"), None), "");
        assert_eq!(resolver().resolve(Some("9 Lane"), None), "");
    }

    #[test]
    fn unresolvable_input_yields_empty_string() {
        assert_eq!(resolver().resolve(None, None), "");
        assert_eq!(resolver().resolve(Some("   "), None), "");
        assert_eq!(resolver().resolve(Some("9"), None), "");
        assert_eq!(resolver().resolve(Some("#1 Main"), None), "");
    }

    #[test]
    fn injected_tables_replace_the_standard_set() {
        let tables = StateTables::from_pairs(&[("bombay presidency", "MH")], &[("99", "LD")]);
        let resolver = AddressStateResolver::new(tables);
        assert_eq!(resolver.resolve(Some("Bombay Presidency"), None), "MH");
        assert_eq!(resolver.resolve(None, Some("990001")), "LD");
        assert_eq!(resolver.resolve(Some("Orissa"), None), "OR");
    }
}
