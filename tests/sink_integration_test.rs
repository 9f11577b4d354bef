//! End-to-end exercise of the search-engine-facing half of the pipeline:
//! schema → SinkWriter::ensure_index → Loader::load, against a mocked
//! search engine. Crosses the etl-sink/etl-transform boundary the way the
//! movies pipeline does at startup and on every tick.

use std::sync::Arc;
use std::time::Duration;

use etl_common::{BackoffConfig, Error, FilmId, GenreId};
use etl_sink::{schema, Loader, SinkWriter};
use etl_transform::{GenreDocument, GenreRef, MovieDocument};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn writer_for(server: &MockServer) -> Arc<SinkWriter> {
    let url = server.uri();
    let (host, port) = url.trim_start_matches("http://").split_once(':').unwrap();
    Arc::new(
        SinkWriter::new(host, port.parse().unwrap()).with_backoff(BackoffConfig::new(
            Duration::from_millis(1),
            2,
            Duration::from_millis(5),
        )),
    )
}

fn sample_movie() -> MovieDocument {
    MovieDocument {
        id: FilmId::new(uuid::Uuid::new_v4()),
        title: "arrival".to_string(),
        description: None,
        rating: Some(7.9),
        kind: "movie".to_string(),
        creation_date: None,
        genres: vec![GenreRef {
            id: GenreId::new(uuid::Uuid::new_v4()),
            name: "sci-fi".to_string(),
        }],
        actors: Vec::new(),
        writers: Vec::new(),
        directors: Vec::new(),
        actors_names: Vec::new(),
        writers_names: Vec::new(),
        directors_names: Vec::new(),
    }
}

/// A cold-start-shaped sequence: the index doesn't exist yet, gets created,
/// and the first batch of documents loads through cleanly.
#[tokio::test]
async fn bootstraps_a_missing_index_then_loads_documents() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(body_string_contains("arrival"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = writer_for(&server);
    sink.ensure_index("movies", &schema::movies_schema())
        .await
        .expect("index creation should succeed");

    let loader = Loader::new(sink, "movies");
    loader
        .load(&[sample_movie()])
        .await
        .expect("load should succeed once the index exists");
}

/// A rejected index schema must surface as a fatal error and never reach
/// the bulk-load stage: nothing downstream should run, and callers should
/// see the rejection rather than a generic failure.
#[tokio::test]
async fn an_invalid_schema_aborts_before_any_document_is_loaded() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/genres"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/genres"))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
        .mount(&server)
        .await;
    // No `/_bulk` mock registered: the test fails with an unexpected-request
    // panic if the loader is ever reached.

    let sink = writer_for(&server);
    let err = sink
        .ensure_index("genres", &schema::genres_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SearchRejected { status: 400, .. }));
}

/// A transient 503 on the bulk endpoint is retried rather than surfaced,
/// and a `GenreDocument` round-trips through the loader the same way a
/// movie document does.
#[tokio::test]
async fn genre_documents_survive_a_transient_bulk_failure() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/genres"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(body_string_contains("sci-fi"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sink = writer_for(&server);
    sink.ensure_index("genres", &schema::genres_schema())
        .await
        .unwrap();

    let loader = Loader::new(sink, "genres");
    let doc = GenreDocument {
        id: GenreId::new(uuid::Uuid::new_v4()),
        name: "sci-fi".to_string(),
        description: None,
        film_works: Vec::new(),
    };
    loader.load(&[doc]).await.expect("retry should recover");
}
