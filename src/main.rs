mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Mode};
use etl_cursor::{CursorStore, JsonFileCursorStore};
use etl_source::{Enricher, JoinTable, Merger, PgConnectParams, Producer};
use etl_pipeline::{CombinedPipeline, GenresPipeline, MoviesPipeline, Pipeline, PersonsPipeline, PipelineDriver};
use etl_sink::{schema, SinkWriter};
use etl_common::Stream;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "movies_etl=info,etl_pipeline=info,etl_source=info,etl_sink=info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .init();

    let rt = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    tracing::info!(mode = ?config.etl_mode, "starting movies-etl");

    let pool = etl_source::init_pool(&PgConnectParams {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_db.clone(),
        user: config.postgres_user.clone(),
        password: config.postgres_password.clone(),
    })
    .await
    .context("failed to connect to the content store")?;

    let cursor_store: Arc<dyn CursorStore> = Arc::new(
        JsonFileCursorStore::open(&config.etl_file_state)
            .context("failed to open the cursor store")?,
    );

    let sink = Arc::new(
        SinkWriter::new(&config.elasticsearch_host, config.elasticsearch_port)
            .with_chunk_size(config.etl_bulk_chunk_size)
            .with_backoff(config.backoff()),
    );

    let wants = |mode: Mode| config.etl_mode == Mode::All || config.etl_mode == mode;

    if wants(Mode::FilmWork) {
        sink.ensure_index("movies", &schema::movies_schema())
            .await
            .context("failed to ensure the movies index exists")?;
    }
    if wants(Mode::Genre) {
        sink.ensure_index("genres", &schema::genres_schema())
            .await
            .context("failed to ensure the genres index exists")?;
    }
    if wants(Mode::Person) {
        sink.ensure_index("persons", &schema::persons_schema())
            .await
            .context("failed to ensure the persons index exists")?;
    }

    let cancellation = CancellationToken::new();
    let shutdown = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c, shutting down after the current tick");
            shutdown.cancel();
        }
    });

    // `All` runs a single combined pipeline so the `genre`/`person` cursor
    // streams each have exactly one producer, rather than racing a
    // standalone genres/persons pipeline against the movies pipeline's own
    // copies of those producers. `FilmWork`/`Genre`/`Person` each run their
    // one corresponding pipeline alone, as when deployed as separate
    // workers against separate cursor files.
    let pipelines: Vec<Arc<dyn Pipeline>> = match config.etl_mode {
        Mode::All => vec![Arc::new(CombinedPipeline::new(
            Producer::new(pool.clone(), "film_work", Stream::FilmWork, config.batch_limit)
                .with_backoff(config.backoff()),
            Producer::new(pool.clone(), "genre", Stream::Genre, config.batch_limit)
                .with_backoff(config.backoff()),
            Producer::new(pool.clone(), "person", Stream::Person, config.batch_limit)
                .with_backoff(config.backoff()),
            Enricher::new(pool.clone(), JoinTable::GenreFilmWork).with_backoff(config.backoff()),
            Enricher::new(pool.clone(), JoinTable::PersonFilmWork).with_backoff(config.backoff()),
            Merger::new(pool.clone()).with_backoff(config.backoff()),
            sink.clone(),
            cursor_store.clone(),
            config.etl_default_date.clone(),
        ))],
        Mode::FilmWork => vec![Arc::new(MoviesPipeline::new(
            Producer::new(pool.clone(), "film_work", Stream::FilmWork, config.batch_limit)
                .with_backoff(config.backoff()),
            Producer::new(pool.clone(), "genre", Stream::Genre, config.batch_limit)
                .with_backoff(config.backoff()),
            Producer::new(pool.clone(), "person", Stream::Person, config.batch_limit)
                .with_backoff(config.backoff()),
            Enricher::new(pool.clone(), JoinTable::GenreFilmWork).with_backoff(config.backoff()),
            Enricher::new(pool.clone(), JoinTable::PersonFilmWork).with_backoff(config.backoff()),
            Merger::new(pool.clone()).with_backoff(config.backoff()),
            sink.clone(),
            cursor_store.clone(),
            config.etl_default_date.clone(),
        ))],
        Mode::Genre => vec![Arc::new(GenresPipeline::new(
            Producer::new(pool.clone(), "genre", Stream::Genre, config.batch_limit)
                .with_backoff(config.backoff()),
            Merger::new(pool.clone()).with_backoff(config.backoff()),
            sink.clone(),
            cursor_store.clone(),
            config.etl_default_date.clone(),
        ))],
        Mode::Person => vec![Arc::new(PersonsPipeline::new(
            Producer::new(pool.clone(), "person", Stream::Person, config.batch_limit)
                .with_backoff(config.backoff()),
            Merger::new(pool.clone()).with_backoff(config.backoff()),
            sink.clone(),
            cursor_store.clone(),
            config.etl_default_date.clone(),
        ))],
    };

    let driver = PipelineDriver::new(pipelines, config.sync_delay(), cancellation);
    driver
        .run()
        .await
        .context("a pipeline hit a process-fatal error")?;

    tracing::info!("movies-etl exited cleanly");
    Ok(())
}
