//! Pipeline orchestration: typed state, stages, and the linear chain

mod chain;
mod rag;
mod stage;
mod state;

pub use chain::{Pipeline, PipelineBuilder, END};
pub use rag::RagPipeline;
pub use stage::Stage;
pub use state::{PipelineOutcome, PipelineState};
