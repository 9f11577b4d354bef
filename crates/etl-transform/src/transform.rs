//! Folds raw join rows into indexed documents.
//!
//! Name lowercasing is applied here: genre names and person full names are
//! lowercased before insertion. This is called out as a product
//! decision to verify, not a silent normalisation anyone should assume is
//! harmless for every consumer.
//!
//! `actors_names`, `writers_names`, and `directors_names` are each derived
//! from their own role list — unlike the system this was ported from, which
//! copied the `actors` rows into all three `*_names` fields.

use std::collections::BTreeMap;

use etl_common::Role;

use crate::documents::{GenreDocument, GenreRef, MovieDocument, PersonDocument, PersonRef};
use crate::rows::{FilmJoinRow, GenreJoinRow, PersonJoinRow};

fn lower(name: &str) -> String {
    name.to_lowercase()
}

/// Fold the movies pipeline's join rows into one document per film,
/// deduplicating genres and each role's people by id.
pub fn fold_movies(rows: Vec<FilmJoinRow>) -> Vec<MovieDocument> {
    struct Building {
        title: String,
        description: Option<String>,
        rating: Option<f64>,
        film_type: String,
        creation_date: Option<chrono::NaiveDate>,
        genres: BTreeMap<uuid::Uuid, String>,
        actors: BTreeMap<uuid::Uuid, String>,
        writers: BTreeMap<uuid::Uuid, String>,
        directors: BTreeMap<uuid::Uuid, String>,
    }

    let mut films: BTreeMap<uuid::Uuid, Building> = BTreeMap::new();

    for row in rows {
        let entry = films.entry(row.film_id).or_insert_with(|| Building {
            title: row.title.clone(),
            description: row.description.clone(),
            rating: row.rating,
            film_type: row.film_type.clone(),
            creation_date: row.creation_date,
            genres: BTreeMap::new(),
            actors: BTreeMap::new(),
            writers: BTreeMap::new(),
            directors: BTreeMap::new(),
        });

        if let (Some(id), Some(name)) = (row.genre_id, &row.genre_name) {
            entry.genres.insert(id, lower(name));
        }

        if let (Some(id), Some(name), Some(role)) =
            (row.person_id, &row.person_full_name, &row.person_role)
        {
            match Role::parse(role) {
                Some(Role::Actor) => {
                    entry.actors.insert(id, lower(name));
                }
                Some(Role::Writer) => {
                    entry.writers.insert(id, lower(name));
                }
                Some(Role::Director) => {
                    entry.directors.insert(id, lower(name));
                }
                None => {
                    tracing::warn!(film_id = %row.film_id, role, "unknown person role in merger row, skipping");
                }
            }
        }
    }

    films
        .into_iter()
        .map(|(film_id, b)| MovieDocument {
            id: film_id.into(),
            title: b.title,
            description: b.description,
            rating: b.rating,
            kind: b.film_type,
            creation_date: b.creation_date,
            genres: b
                .genres
                .into_iter()
                .map(|(id, name)| GenreRef { id: id.into(), name })
                .collect(),
            actors_names: b.actors.values().cloned().collect(),
            writers_names: b.writers.values().cloned().collect(),
            directors_names: b.directors.values().cloned().collect(),
            actors: b
                .actors
                .into_iter()
                .map(|(id, name)| PersonRef { id: id.into(), name })
                .collect(),
            writers: b
                .writers
                .into_iter()
                .map(|(id, name)| PersonRef { id: id.into(), name })
                .collect(),
            directors: b
                .directors
                .into_iter()
                .map(|(id, name)| PersonRef { id: id.into(), name })
                .collect(),
        })
        .collect()
}

/// Fold the genres pipeline's join rows into one document per genre.
pub fn fold_genres(rows: Vec<GenreJoinRow>) -> Vec<GenreDocument> {
    struct Building {
        name: String,
        description: Option<String>,
        film_works: std::collections::BTreeSet<uuid::Uuid>,
    }

    let mut genres: BTreeMap<uuid::Uuid, Building> = BTreeMap::new();

    for row in rows {
        let entry = genres.entry(row.genre_id).or_insert_with(|| Building {
            name: lower(&row.genre_name),
            description: row.genre_description.clone(),
            film_works: std::collections::BTreeSet::new(),
        });

        if let Some(film_id) = row.film_id {
            entry.film_works.insert(film_id);
        }
    }

    genres
        .into_iter()
        .map(|(id, b)| GenreDocument {
            id: id.into(),
            name: b.name,
            description: b.description,
            film_works: b.film_works.into_iter().map(Into::into).collect(),
        })
        .collect()
}

/// Fold the persons pipeline's join rows into one document per person.
pub fn fold_persons(rows: Vec<PersonJoinRow>) -> Vec<PersonDocument> {
    struct Building {
        full_name: String,
        roles: std::collections::BTreeSet<Role>,
        film_ids: std::collections::BTreeSet<uuid::Uuid>,
    }

    let mut people: BTreeMap<uuid::Uuid, Building> = BTreeMap::new();

    for row in rows {
        let entry = people.entry(row.person_id).or_insert_with(|| Building {
            full_name: lower(&row.person_full_name),
            roles: std::collections::BTreeSet::new(),
            film_ids: std::collections::BTreeSet::new(),
        });

        if let Some(role) = row.role.as_deref().and_then(Role::parse) {
            entry.roles.insert(role);
        }
        if let Some(film_id) = row.film_id {
            entry.film_ids.insert(film_id);
        }
    }

    people
        .into_iter()
        .map(|(id, b)| PersonDocument {
            id: id.into(),
            full_name: b.full_name,
            roles: b.roles.into_iter().collect(),
            film_ids: b.film_ids.into_iter().map(Into::into).collect(),
        })
        .collect()
}
