//! The role a person plays on a film, as recorded in `person_film_work`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Actor,
    Writer,
    Director,
}

impl Role {
    /// Parse the role column as stored in `person_film_work.role`. Unknown
    /// values are rejected rather than silently dropped — callers decide
    /// whether that is fatal to the row or the batch.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "actor" => Some(Role::Actor),
            "writer" => Some(Role::Writer),
            "director" => Some(Role::Director),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Actor => "actor",
            Role::Writer => "writer",
            Role::Director => "director",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::parse("actor"), Some(Role::Actor));
        assert_eq!(Role::parse("writer"), Some(Role::Writer));
        assert_eq!(Role::parse("director"), Some(Role::Director));
    }

    #[test]
    fn rejects_unknown_roles() {
        assert_eq!(Role::parse("producer"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn round_trips_through_as_str() {
        for role in [Role::Actor, Role::Writer, Role::Director] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }
}
