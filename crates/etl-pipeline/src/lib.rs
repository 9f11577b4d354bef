//! The concrete pipelines and the pipeline driver.

pub mod driver;
pub mod pipeline;

pub use driver::PipelineDriver;
pub use pipeline::{CombinedPipeline, GenresPipeline, MoviesPipeline, Pipeline, PersonsPipeline};
