//! Strongly-typed identifier value objects.
//!
//! Two families exist:
//! - **Reference ids** (`UserId`, `LabId`, `EquipmentId`) are issued by
//!   systems outside this core (auth, lab registry) and arrive as strings.
//! - **Record ids** (`AlertId`, `BreakdownId`, `ReorderRequestId`) are minted
//!   here as random UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a non-empty string identifier.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates the id, rejecting empty or whitespace-only input.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Declares a UUID-backed record identifier.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

string_id!(
    /// Subject identifier issued by the authentication service.
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of the lab that owns a piece of equipment.
    LabId,
    "lab_id"
);

string_id!(
    /// Identifier of a piece of lab equipment (e.g. `EQ-1`).
    EquipmentId,
    "equipment_id"
);

uuid_id!(
    /// Unique identifier for an alert record.
    AlertId
);

uuid_id!(
    /// Unique identifier for a breakdown record.
    BreakdownId
);

uuid_id!(
    /// Unique identifier for a reorder request.
    ReorderRequestId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_id_rejects_empty() {
        assert!(EquipmentId::new("").is_err());
        assert!(EquipmentId::new("   ").is_err());
    }

    #[test]
    fn equipment_id_trims_whitespace() {
        let id = EquipmentId::new("  EQ-1 ").unwrap();
        assert_eq!(id.as_str(), "EQ-1");
    }

    #[test]
    fn user_id_deserialize_validates() {
        let ok: Result<UserId, _> = serde_json::from_str("\"user-1\"");
        assert!(ok.is_ok());

        let empty: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }

    #[test]
    fn string_id_serializes_as_plain_string() {
        let id = LabId::new("lab-7").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lab-7\"");
    }

    #[test]
    fn uuid_ids_are_unique() {
        assert_ne!(BreakdownId::new(), BreakdownId::new());
    }

    #[test]
    fn uuid_id_parses_from_display() {
        let id = AlertId::new();
        let parsed: AlertId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn uuid_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<ReorderRequestId>().is_err());
    }
}
