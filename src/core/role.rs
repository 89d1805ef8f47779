//! Session roles

use std::fmt::Display;

/// The acting user's permission class. Supplied per session, never stored.
///
/// Anything that is not one of the three named roles is treated as an
/// external owner identified by name (e.g. "External Owner 1").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    PartnerOne,
    PartnerTwo,
    Owner(String),
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "Admin" => Role::Admin,
            "Partner One" => Role::PartnerOne,
            "Partner Two" => Role::PartnerTwo,
            other => Role::Owner(other.to_string()),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::PartnerOne => write!(f, "Partner One"),
            Role::PartnerTwo => write!(f, "Partner Two"),
            Role::Owner(name) => write!(f, "{name}"),
        }
    }
}

impl Role {
    /// Document ingestion is limited to the dealership side of the house.
    pub fn can_upload(&self) -> bool {
        !matches!(self, Role::Owner(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("Admin"), Role::Admin);
        assert_eq!(Role::from("Partner One"), Role::PartnerOne);
        assert_eq!(Role::from("Partner Two"), Role::PartnerTwo);
        assert_eq!(
            Role::from("External Owner 1"),
            Role::Owner("External Owner 1".to_string())
        );
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in [
            Role::Admin,
            Role::PartnerOne,
            Role::PartnerTwo,
            Role::Owner("External Owner 2".to_string()),
        ] {
            assert_eq!(Role::from(role.to_string().as_str()), role);
        }
    }

    #[test]
    fn test_upload_permission() {
        assert!(Role::Admin.can_upload());
        assert!(Role::PartnerOne.can_upload());
        assert!(Role::PartnerTwo.can_upload());
        assert!(!Role::Owner("External Owner 1".to_string()).can_upload());
    }
}
