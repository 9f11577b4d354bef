//! Typed ID wrappers around UUIDs so a `FilmId` can never be swapped for a
//! `GenreId` at a call site.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(FilmId);
typed_id!(GenreId);
typed_id!(PersonId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_id_types_round_trip_through_uuid() {
        let uuid = Uuid::new_v4();
        let film = FilmId::from(uuid);
        let genre = GenreId::from(uuid);

        assert_eq!(Uuid::from(film), uuid);
        assert_eq!(Uuid::from(genre), uuid);
    }

    #[test]
    fn film_id_serializes_as_a_bare_uuid_string() {
        let id = FilmId::from(Uuid::new_v4());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));

        let back: FilmId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn person_id_is_hashable() {
        use std::collections::HashSet;
        let id = PersonId::from(Uuid::new_v4());
        let mut set = HashSet::new();
        set.insert(id);
        assert!(set.contains(&id));
    }
}
