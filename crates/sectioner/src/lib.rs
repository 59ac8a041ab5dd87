pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod model;
pub mod ocr;
pub mod pipeline;
pub mod plan;
pub mod query;
pub mod splitter;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{load_config, Config};
pub use db::{Database, DocumentRecord, DocumentStatus};
pub use error::{Result, SectionerError};
pub use pipeline::{ChildPipeline, Dispatcher, ParentPipeline, PipelineConfig};
pub use plan::{PlanSection, SplitPlan};
pub use query::QueryApi;
pub use storage::{FsObjectStore, ObjectStore};
