//! Workflow orchestration: the parent and child pipeline state machines
//! and the event dispatcher that starts their instances.

pub mod child;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod parent;
mod poll;

pub use child::ChildPipeline;
pub use config::PipelineConfig;
pub use dispatcher::{classify, Dispatcher, Trigger};
pub use error::PipelineError;
pub use parent::ParentPipeline;

/// Record timestamps are RFC 3339 UTC strings.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
