//! The indexed document models: the shapes written to Elasticsearch.

use etl_common::{FilmId, GenreId, PersonId, Role};
use serde::{Deserialize, Serialize};

/// A genre reference embedded in a [`MovieDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: GenreId,
    pub name: String,
}

/// A person reference embedded in a [`MovieDocument`]'s role lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
    pub id: FilmId,
    pub title: String,
    pub description: Option<String>,
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub creation_date: Option<chrono::NaiveDate>,
    pub genres: Vec<GenreRef>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub directors: Vec<PersonRef>,
    pub actors_names: Vec<String>,
    pub writers_names: Vec<String>,
    pub directors_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreDocument {
    pub id: GenreId,
    pub name: String,
    pub description: Option<String>,
    pub film_works: Vec<FilmId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id: PersonId,
    pub full_name: String,
    pub roles: Vec<Role>,
    pub film_ids: Vec<FilmId>,
}

/// Gives the Sink Writer a uniform way to read the `_id` meta field for a
/// bulk upsert without depending on any one document shape.
pub trait HasDocumentId {
    fn document_id(&self) -> String;
}

impl HasDocumentId for MovieDocument {
    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

impl HasDocumentId for GenreDocument {
    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

impl HasDocumentId for PersonDocument {
    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
