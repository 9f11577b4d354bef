//! Merger: denormalise a set of ids into the raw join rows the Transformer
//! folds into documents.
//!
//! Queried as flat joins — one row per (film × genre × person-role)
//! combination — rather than Postgres `array_agg` composites, so sqlx can
//! decode each row into a plain struct and the folding (dedup, grouping)
//! lives in `etl_transform::transform` instead of SQL.

use etl_common::{BackoffConfig, Error, Result};
use etl_transform::{FilmJoinRow, GenreJoinRow, PersonJoinRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::reader::{in_list_placeholders, map_sqlx_err};

pub struct Merger {
    pool: PgPool,
    backoff: BackoffConfig,
}

impl Merger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// The movies pipeline's denormalising join. `genre_id` is selected
    /// alongside `genre_name` because the Movie document's `genres` field
    /// is `[{id, name}]`, so the id has to come from somewhere, and the
    /// merger is the only stage that still has it in scope.
    pub async fn merge_films(&self, film_ids: &[Uuid]) -> Result<Vec<FilmJoinRow>> {
        if film_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = in_list_placeholders(film_ids.len(), 1);
        let sql = format!(
            "SELECT fw.id AS film_id, fw.title, fw.description, fw.rating, fw.type AS film_type, \
             fw.creation_date, g.id AS genre_id, g.name AS genre_name, \
             p.id AS person_id, p.full_name AS person_full_name, pfw.role AS person_role \
             FROM content.film_work fw \
             LEFT JOIN content.genre_film_work gfw ON gfw.film_work_id = fw.id \
             LEFT JOIN content.genre g ON g.id = gfw.genre_id \
             LEFT JOIN content.person_film_work pfw ON pfw.film_work_id = fw.id \
             LEFT JOIN content.person p ON p.id = pfw.person_id \
             WHERE fw.id IN ({placeholders})",
        );

        let rows = self.fetch_with_ids(&sql, film_ids).await?;
        rows.iter()
            .map(|row| {
                Ok(FilmJoinRow {
                    film_id: get(row, "film_id")?,
                    title: get(row, "title")?,
                    description: get_opt(row, "description")?,
                    rating: get_opt(row, "rating")?,
                    film_type: get(row, "film_type")?,
                    creation_date: get_opt(row, "creation_date")?,
                    genre_id: get_opt(row, "genre_id")?,
                    genre_name: get_opt(row, "genre_name")?,
                    person_id: get_opt(row, "person_id")?,
                    person_full_name: get_opt(row, "person_full_name")?,
                    person_role: get_opt(row, "person_role")?,
                })
            })
            .collect()
    }

    /// The genres pipeline's denormalising join: each genre paired with
    /// every film-work id that references it.
    pub async fn merge_genres(&self, genre_ids: &[Uuid]) -> Result<Vec<GenreJoinRow>> {
        if genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = in_list_placeholders(genre_ids.len(), 1);
        let sql = format!(
            "SELECT g.id AS genre_id, g.name AS genre_name, g.description AS genre_description, \
             gfw.film_work_id AS film_id \
             FROM content.genre g \
             LEFT JOIN content.genre_film_work gfw ON gfw.genre_id = g.id \
             WHERE g.id IN ({placeholders})",
        );

        let rows = self.fetch_with_ids(&sql, genre_ids).await?;
        rows.iter()
            .map(|row| {
                Ok(GenreJoinRow {
                    genre_id: get(row, "genre_id")?,
                    genre_name: get(row, "genre_name")?,
                    genre_description: get_opt(row, "genre_description")?,
                    film_id: get_opt(row, "film_id")?,
                })
            })
            .collect()
    }

    /// The persons pipeline's denormalising join: each person paired with
    /// every (film-work id, role) pair referencing them.
    pub async fn merge_persons(&self, person_ids: &[Uuid]) -> Result<Vec<PersonJoinRow>> {
        if person_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = in_list_placeholders(person_ids.len(), 1);
        let sql = format!(
            "SELECT p.id AS person_id, p.full_name AS person_full_name, \
             pfw.film_work_id AS film_id, pfw.role AS role \
             FROM content.person p \
             LEFT JOIN content.person_film_work pfw ON pfw.person_id = p.id \
             WHERE p.id IN ({placeholders})",
        );

        let rows = self.fetch_with_ids(&sql, person_ids).await?;
        rows.iter()
            .map(|row| {
                Ok(PersonJoinRow {
                    person_id: get(row, "person_id")?,
                    person_full_name: get(row, "person_full_name")?,
                    film_id: get_opt(row, "film_id")?,
                    role: get_opt(row, "role")?,
                })
            })
            .collect()
    }

    async fn fetch_with_ids(
        &self,
        sql: &str,
        ids: &[Uuid],
    ) -> Result<Vec<sqlx::postgres::PgRow>> {
        etl_common::with_backoff(self.backoff, || {
            let sql = sql.to_string();
            let pool = self.pool.clone();
            let ids = ids.to_vec();
            async move {
                let mut query = sqlx::query(&sql);
                for id in &ids {
                    query = query.bind(id);
                }
                query.fetch_all(&pool).await.map_err(map_sqlx_err)
            }
        })
        .await
    }
}

fn get<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| Error::malformed_row(format!("{column}: {e}")))
}

fn get_opt<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(column)
        .map_err(|e| Error::malformed_row(format!("{column}: {e}")))
}
