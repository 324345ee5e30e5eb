//! Customer model
//!
//! The person or company that owns operations. Listing search runs over the
//! name, email and document fields.

use serde::{Deserialize, Serialize};

use super::ids::CustomerId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,

    #[serde(default)]
    pub paternal_surname: String,

    #[serde(default)]
    pub maternal_surname: String,

    #[serde(default)]
    pub given_names: String,

    /// Legal representative's surnames (companies)
    #[serde(default)]
    pub rep_paternal_surname: String,

    #[serde(default)]
    pub rep_maternal_surname: String,

    /// Name printed on reports ("Cliente/Titular")
    #[serde(default)]
    pub business_name: String,

    #[serde(default)]
    pub business_name_2: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub document: String,

    #[serde(default)]
    pub document_2: String,

    #[serde(default)]
    pub third_party_document: String,

    /// Free-text type such as "persona" or "empresa"
    #[serde(default)]
    pub customer_type: String,
}

impl Customer {
    pub fn new(business_name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new(),
            business_name: business_name.into(),
            document: document.into(),
            ..Default::default()
        }
    }

    /// Name for reports: the business name, else surnames and given names
    pub fn display_name(&self) -> String {
        if !self.business_name.trim().is_empty() {
            return self.business_name.trim().to_string();
        }

        [
            self.paternal_surname.as_str(),
            self.maternal_surname.as_str(),
            self.given_names.as_str(),
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Case-insensitive substring match over every searchable field
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            &self.paternal_surname,
            &self.maternal_surname,
            &self.rep_paternal_surname,
            &self.rep_maternal_surname,
            &self.given_names,
            &self.business_name,
            &self.business_name_2,
            &self.email,
            &self.document,
            &self.document_2,
            &self.third_party_document,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match on the customer type
    pub fn matches_type(&self, customer_type: &str) -> bool {
        let wanted = customer_type.trim().to_lowercase();
        wanted.is_empty() || self.customer_type.to_lowercase().contains(&wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Customer {
        Customer {
            paternal_surname: "Quispe".into(),
            maternal_surname: "Mamani".into(),
            given_names: "Rosa Elena".into(),
            email: "rosa@example.pe".into(),
            document: "45871236".into(),
            customer_type: "persona".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name_prefers_business_name() {
        let company = Customer::new("Importadora Andina SAC", "20512345678");
        assert_eq!(company.display_name(), "Importadora Andina SAC");
        assert_eq!(person().display_name(), "Quispe Mamani Rosa Elena");
    }

    #[test]
    fn test_search_is_case_insensitive_over_fields() {
        let c = person();
        assert!(c.matches_search("QUISPE"));
        assert!(c.matches_search("elena"));
        assert!(c.matches_search("4587"));
        assert!(c.matches_search("example.pe"));
        assert!(c.matches_search(""));
        assert!(!c.matches_search("huaman"));
    }

    #[test]
    fn test_type_filter_is_substring() {
        let c = person();
        assert!(c.matches_type("pers"));
        assert!(c.matches_type(""));
        assert!(!c.matches_type("empresa"));
    }
}
