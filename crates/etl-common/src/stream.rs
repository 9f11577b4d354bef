//! Stream identifiers: the keys the Cursor Store persists cursors under.
//!
//! A stream is a (pipeline, source table) pair, plus the three driver-level
//! `<index>_last_updated` cursors kept for logging/ops.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stream {
    FilmWork,
    Genre,
    Person,
    MoviesLastUpdated,
    GenresLastUpdated,
    PersonsLastUpdated,
}

impl Stream {
    pub fn key(&self) -> &'static str {
        match self {
            Stream::FilmWork => "film_work",
            Stream::Genre => "genre",
            Stream::Person => "person",
            Stream::MoviesLastUpdated => "movies_last_updated",
            Stream::GenresLastUpdated => "genres_last_updated",
            Stream::PersonsLastUpdated => "persons_last_updated",
        }
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
