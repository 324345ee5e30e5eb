//! Strongly-typed ID wrappers
//!
//! Operations, customers, reconciliation records and entries each get their
//! own newtype so ids can't be swapped by accident.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short form shown to staff ("op-1a2b3c4d")
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }

            /// Whether `s` is a prefix of this id, with or without the display prefix
            pub fn matches_prefix(&self, s: &str) -> bool {
                let s = s.strip_prefix($display_prefix).unwrap_or(s).to_lowercase();
                !s.is_empty() && self.0.simple().to_string().starts_with(&s.replace('-', ""))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(OperationId, "op-");
define_id!(CustomerId, "cus-");
define_id!(RecordId, "rec-");
define_id!(EntryId, "ent-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_from_str() {
        let id = OperationId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("op-"));

        let parsed: OperationId = shown.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_bare_uuid_parses() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: EntryId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_short_form_and_prefix_match() {
        let id = EntryId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap());
        assert_eq!(id.short(), "ent-550e8400");
        assert!(id.matches_prefix("ent-550e84"));
        assert!(id.matches_prefix("550E8400-E29B"));
        assert!(!id.matches_prefix("ent-"));
        assert!(!id.matches_prefix("660e"));
    }

    #[test]
    fn test_id_serialization() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
