//! Enricher: resolve primary keys from a person/genre producer into the
//! set of affected film-work ids via the corresponding join table.

use etl_common::{BackoffConfig, Error, Result};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::reader::{in_list_placeholders, map_sqlx_err};

/// The many-to-many join table an Enricher reads through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinTable {
    GenreFilmWork,
    PersonFilmWork,
}

impl JoinTable {
    fn table_and_key(self) -> (&'static str, &'static str) {
        match self {
            JoinTable::GenreFilmWork => ("content.genre_film_work", "genre_id"),
            JoinTable::PersonFilmWork => ("content.person_film_work", "person_id"),
        }
    }
}

pub struct Enricher {
    pool: PgPool,
    join_table: JoinTable,
    backoff: BackoffConfig,
}

impl Enricher {
    pub fn new(pool: PgPool, join_table: JoinTable) -> Self {
        Self {
            pool,
            join_table,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Resolve `ids` (genre or person primary keys) into the distinct set
    /// of film-work ids that reference them. An empty input short-circuits
    /// without a round-trip.
    pub async fn resolve(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (table, key_column) = self.join_table.table_and_key();
        let placeholders = in_list_placeholders(ids.len(), 1);
        let sql = format!(
            "SELECT DISTINCT film_work_id FROM {table} WHERE {key_column} IN ({placeholders})",
        );

        let rows = etl_common::with_backoff(self.backoff, || {
            let sql = sql.clone();
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
        .await?;

        rows.iter()
            .map(|row| {
                row.try_get("film_work_id")
                    .map_err(|e| Error::malformed_row(e.to_string()))
            })
            .collect()
    }
}

/// Identity enricher used by the movies pipeline's film-work producer,
/// whose output is already a set of film ids.
pub fn identity(ids: Vec<Uuid>) -> Vec<Uuid> {
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_enricher_passes_ids_through_unchanged() {
        let ids = vec![Uuid::nil(), Uuid::max()];
        assert_eq!(identity(ids.clone()), ids);
    }

    #[test]
    fn join_table_maps_to_the_expected_table_and_key_column() {
        assert_eq!(
            JoinTable::GenreFilmWork.table_and_key(),
            ("content.genre_film_work", "genre_id")
        );
        assert_eq!(
            JoinTable::PersonFilmWork.table_and_key(),
            ("content.person_film_work", "person_id")
        );
    }
}
