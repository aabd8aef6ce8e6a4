//! Stage trait implemented by each step of the pipeline

use async_trait::async_trait;

use crate::error::Result;
use super::state::PipelineState;

/// One step of the pipeline
///
/// A stage reads the slots written by its predecessors and writes its own.
/// It never catches or retries another stage's error.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable stage name, used for chain wiring and logs
    fn name(&self) -> &'static str;

    /// Run the stage against the shared state
    async fn run(&self, state: &mut PipelineState) -> Result<()>;
}
