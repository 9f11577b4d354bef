//! Shared error types, typed IDs, and small cross-cutting enums used by
//! every crate in the movies-etl workspace.

pub mod backoff;
pub mod error;
pub mod ids;
pub mod role;
pub mod stream;

pub use backoff::{with_backoff, BackoffConfig};
pub use error::{Error, Result};
pub use ids::{FilmId, GenreId, PersonId};
pub use role::Role;
pub use stream::Stream;
