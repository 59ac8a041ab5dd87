use std::time::Duration;

/// Timing knobs for pipeline instances. Everything is injected so tests
/// can run with millisecond delays.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed delay before each text-detection poll. Deliberately coarse:
    /// this bounds external-API call volume, it is not a tight spin.
    pub poll_delay: Duration,
    /// Maximum polls per job before the instance fails with a timeout.
    pub max_poll_attempts: u32,
    /// Wall-clock ceiling for a parent pipeline instance.
    pub parent_ceiling: Duration,
    /// Wall-clock ceiling for a child pipeline instance.
    pub child_ceiling: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_secs(15),
            max_poll_attempts: 40,
            parent_ceiling: Duration::from_secs(600),
            child_ceiling: Duration::from_secs(300),
        }
    }
}
