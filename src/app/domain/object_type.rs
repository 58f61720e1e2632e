use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Business object types governed by per-profile permissions.
///
/// This is a closed enumeration: a permission row naming anything else is a
/// configuration error and fails catalog validation at startup rather than
/// silently denying at request time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObjectType {
    Organization,
    Property,
    Unit,
    Tenant,
    Lease,
    Payment,
    Document,
    Report,
}

/// CRUD actions evaluated against an object permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ObjectAction {
    Read,
    Create,
    Edit,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_round_trips_through_storage_form() {
        assert_eq!("property".parse::<ObjectType>().unwrap(), ObjectType::Property);
        assert_eq!(ObjectType::Organization.to_string(), "organization");
    }

    #[test]
    fn unknown_object_type_fails_to_parse() {
        assert!("spaceship".parse::<ObjectType>().is_err());
    }

    #[test]
    fn action_parses_lowercase() {
        assert_eq!("edit".parse::<ObjectAction>().unwrap(), ObjectAction::Edit);
    }
}
