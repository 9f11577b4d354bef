//! Raw row shapes produced by the Merger, before the Transformer folds
//! them into documents.
//!
//! The merger queries are modelled as flat joins — one row per
//! (film × genre × person-role) combination — rather than Postgres
//! `array_agg` composites, so the rows decode straight into plain structs
//! with `sqlx::FromRow` and the folding logic (dedup, grouping) lives in
//! ordinary Rust instead of SQL.

use chrono::NaiveDate;
use uuid::Uuid;

/// One row of the movies pipeline's denormalising join (fw ⋈ genre_film_work
/// ⋈ genre, fw ⋈ person_film_work ⋈ person).
#[derive(Debug, Clone, PartialEq)]
pub struct FilmJoinRow {
    pub film_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub film_type: String,
    pub creation_date: Option<NaiveDate>,
    pub genre_id: Option<Uuid>,
    pub genre_name: Option<String>,
    pub person_id: Option<Uuid>,
    pub person_full_name: Option<String>,
    pub person_role: Option<String>,
}

/// One row of the genres pipeline's denormalising join (genre ⋈
/// genre_film_work ⋈ film_work).
#[derive(Debug, Clone, PartialEq)]
pub struct GenreJoinRow {
    pub genre_id: Uuid,
    pub genre_name: String,
    pub genre_description: Option<String>,
    pub film_id: Option<Uuid>,
}

/// One row of the persons pipeline's denormalising join (person ⋈
/// person_film_work ⋈ film_work).
#[derive(Debug, Clone, PartialEq)]
pub struct PersonJoinRow {
    pub person_id: Uuid,
    pub person_full_name: String,
    pub film_id: Option<Uuid>,
    pub role: Option<String>,
}
