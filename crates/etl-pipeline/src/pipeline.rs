//! The concrete pipelines: wiring Producer → Enricher → Merger →
//! Transformer → Loader back-to-front behind one `tick`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use etl_common::{Result, Stream};
use etl_cursor::CursorStore;
use etl_sink::{Loader, SinkWriter};
use etl_source::{Enricher, Merger, Producer};
use etl_transform::transform::{fold_genres, fold_movies, fold_persons};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One activation of a pipeline's stage chain.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn name(&self) -> &'static str;
    async fn tick(&self) -> Result<()>;
}

/// The movies pipeline watches three producers, resolves each to a film-id
/// set, unions them, and runs merger → transformer → loader once per tick.
pub struct MoviesPipeline {
    film_work_producer: Producer,
    genre_producer: Producer,
    person_producer: Producer,
    genre_enricher: Enricher,
    person_enricher: Enricher,
    merger: Merger,
    loader: Loader,
    cursor_store: Arc<dyn CursorStore>,
    default_epoch: String,
}

impl MoviesPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        film_work_producer: Producer,
        genre_producer: Producer,
        person_producer: Producer,
        genre_enricher: Enricher,
        person_enricher: Enricher,
        merger: Merger,
        sink: Arc<SinkWriter>,
        cursor_store: Arc<dyn CursorStore>,
        default_epoch: String,
    ) -> Self {
        Self {
            film_work_producer,
            genre_producer,
            person_producer,
            genre_enricher,
            person_enricher,
            merger,
            loader: Loader::new(sink, "movies"),
            cursor_store,
            default_epoch,
        }
    }

    async fn collect_producer_ids(&self, producer: &Producer) -> Result<Vec<Uuid>> {
        let ids = Arc::new(Mutex::new(Vec::new()));
        let collector = ids.clone();
        producer
            .run(self.cursor_store.as_ref(), &self.default_epoch, move |batch| {
                let collector = collector.clone();
                async move {
                    collector.lock().await.extend(batch);
                    Ok(())
                }
            })
            .await?;

        // `run` has returned, so its closure (and the clone it held) has
        // been dropped; `ids` is the sole remaining owner.
        Ok(Arc::try_unwrap(ids)
            .expect("producer closure dropped after run() returns")
            .into_inner())
    }
}

#[async_trait]
impl Pipeline for MoviesPipeline {
    fn name(&self) -> &'static str {
        "movies"
    }

    async fn tick(&self) -> Result<()> {
        let mut film_ids: HashSet<Uuid> = HashSet::new();

        film_ids.extend(self.collect_producer_ids(&self.film_work_producer).await?);

        let genre_ids = self.collect_producer_ids(&self.genre_producer).await?;
        if !genre_ids.is_empty() {
            film_ids.extend(self.genre_enricher.resolve(&genre_ids).await?);
        }

        let person_ids = self.collect_producer_ids(&self.person_producer).await?;
        if !person_ids.is_empty() {
            film_ids.extend(self.person_enricher.resolve(&person_ids).await?);
        }

        if film_ids.is_empty() {
            tracing::debug!("movies tick: no film ids produced, skipping merge/load");
        } else {
            let mut ordered: Vec<Uuid> = film_ids.into_iter().collect();
            ordered.sort();

            let rows = self.merger.merge_films(&ordered).await?;
            let docs = fold_movies(rows);
            self.loader.load(&docs).await?;
        }

        self.cursor_store
            .set(Stream::MoviesLastUpdated.key(), Utc::now().to_rfc3339())?;
        Ok(())
    }
}

/// Linear single-producer pipeline shared by genres and persons: each
/// producer batch flows straight through merger → transformer → loader.
/// The single-process `ETL_MODE=all` mode runs one genre producer and one
/// person producer shared between the movies pipeline's enrichment and the
/// genres/persons pipelines' own loads, instead of three independent
/// pipelines racing on the same `genre`/`person` cursor stream.
pub struct CombinedPipeline {
    film_work_producer: Producer,
    genre_producer: Producer,
    person_producer: Producer,
    genre_enricher: Enricher,
    person_enricher: Enricher,
    merger: Merger,
    movies_loader: Loader,
    genres_loader: Loader,
    persons_loader: Loader,
    cursor_store: Arc<dyn CursorStore>,
    default_epoch: String,
}

impl CombinedPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        film_work_producer: Producer,
        genre_producer: Producer,
        person_producer: Producer,
        genre_enricher: Enricher,
        person_enricher: Enricher,
        merger: Merger,
        sink: Arc<SinkWriter>,
        cursor_store: Arc<dyn CursorStore>,
        default_epoch: String,
    ) -> Self {
        Self {
            film_work_producer,
            genre_producer,
            person_producer,
            genre_enricher,
            person_enricher,
            merger,
            movies_loader: Loader::new(sink.clone(), "movies"),
            genres_loader: Loader::new(sink.clone(), "genres"),
            persons_loader: Loader::new(sink, "persons"),
            cursor_store,
            default_epoch,
        }
    }
}

#[async_trait]
impl Pipeline for CombinedPipeline {
    fn name(&self) -> &'static str {
        "all"
    }

    async fn tick(&self) -> Result<()> {
        let film_ids: Arc<Mutex<HashSet<Uuid>>> = Arc::new(Mutex::new(HashSet::new()));

        {
            let film_ids = film_ids.clone();
            self.film_work_producer
                .run(self.cursor_store.as_ref(), &self.default_epoch, move |batch| {
                    let film_ids = film_ids.clone();
                    async move {
                        film_ids.lock().await.extend(batch);
                        Ok(())
                    }
                })
                .await?;
        }

        {
            let film_ids = film_ids.clone();
            self.genre_producer
                .run(self.cursor_store.as_ref(), &self.default_epoch, move |batch| {
                    let film_ids = film_ids.clone();
                    async move {
                        let rows = self.merger.merge_genres(&batch).await?;
                        let docs = fold_genres(rows);
                        self.genres_loader.load(&docs).await?;

                        let resolved = self.genre_enricher.resolve(&batch).await?;
                        film_ids.lock().await.extend(resolved);
                        Ok(())
                    }
                })
                .await?;
        }

        {
            let film_ids = film_ids.clone();
            self.person_producer
                .run(self.cursor_store.as_ref(), &self.default_epoch, move |batch| {
                    let film_ids = film_ids.clone();
                    async move {
                        let rows = self.merger.merge_persons(&batch).await?;
                        let docs = fold_persons(rows);
                        self.persons_loader.load(&docs).await?;

                        let resolved = self.person_enricher.resolve(&batch).await?;
                        film_ids.lock().await.extend(resolved);
                        Ok(())
                    }
                })
                .await?;
        }

        let film_ids = Arc::try_unwrap(film_ids)
            .expect("producer closures dropped after run() returns")
            .into_inner();

        if film_ids.is_empty() {
            tracing::debug!("combined tick: no film ids produced, skipping movies merge/load");
        } else {
            let mut ordered: Vec<Uuid> = film_ids.into_iter().collect();
            ordered.sort();

            let rows = self.merger.merge_films(&ordered).await?;
            let docs = fold_movies(rows);
            self.movies_loader.load(&docs).await?;
        }

        let now = Utc::now().to_rfc3339();
        self.cursor_store.set(Stream::MoviesLastUpdated.key(), now.clone())?;
        self.cursor_store.set(Stream::GenresLastUpdated.key(), now.clone())?;
        self.cursor_store.set(Stream::PersonsLastUpdated.key(), now)?;
        Ok(())
    }
}

pub struct GenresPipeline {
    producer: Producer,
    merger: Merger,
    loader: Loader,
    cursor_store: Arc<dyn CursorStore>,
    default_epoch: String,
}

impl GenresPipeline {
    pub fn new(
        producer: Producer,
        merger: Merger,
        sink: Arc<SinkWriter>,
        cursor_store: Arc<dyn CursorStore>,
        default_epoch: String,
    ) -> Self {
        Self {
            producer,
            merger,
            loader: Loader::new(sink, "genres"),
            cursor_store,
            default_epoch,
        }
    }
}

#[async_trait]
impl Pipeline for GenresPipeline {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn tick(&self) -> Result<()> {
        self.producer
            .run(self.cursor_store.as_ref(), &self.default_epoch, |batch| async move {
                let rows = self.merger.merge_genres(&batch).await?;
                let docs = fold_genres(rows);
                self.loader.load(&docs).await
            })
            .await?;

        self.cursor_store
            .set(Stream::GenresLastUpdated.key(), Utc::now().to_rfc3339())?;
        Ok(())
    }
}

pub struct PersonsPipeline {
    producer: Producer,
    merger: Merger,
    loader: Loader,
    cursor_store: Arc<dyn CursorStore>,
    default_epoch: String,
}

impl PersonsPipeline {
    pub fn new(
        producer: Producer,
        merger: Merger,
        sink: Arc<SinkWriter>,
        cursor_store: Arc<dyn CursorStore>,
        default_epoch: String,
    ) -> Self {
        Self {
            producer,
            merger,
            loader: Loader::new(sink, "persons"),
            cursor_store,
            default_epoch,
        }
    }
}

#[async_trait]
impl Pipeline for PersonsPipeline {
    fn name(&self) -> &'static str {
        "persons"
    }

    async fn tick(&self) -> Result<()> {
        self.producer
            .run(self.cursor_store.as_ref(), &self.default_epoch, |batch| async move {
                let rows = self.merger.merge_persons(&batch).await?;
                let docs = fold_persons(rows);
                self.loader.load(&docs).await
            })
            .await?;

        self.cursor_store
            .set(Stream::PersonsLastUpdated.key(), Utc::now().to_rfc3339())?;
        Ok(())
    }
}
