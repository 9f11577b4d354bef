//! Document models and folding logic for the Transformer stage.

pub mod documents;
pub mod rows;
pub mod transform;

pub use documents::{GenreDocument, GenreRef, HasDocumentId, MovieDocument, PersonDocument, PersonRef};
pub use rows::{FilmJoinRow, GenreJoinRow, PersonJoinRow};
pub use transform::{fold_genres, fold_movies, fold_persons};
