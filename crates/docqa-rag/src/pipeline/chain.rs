//! Linear stage executor
//!
//! The topology is an ordered list of (stage, predecessor) pairs with a single
//! entry point and a terminal marker. Stages run one after another; the first
//! failure aborts the rest of the chain and is returned unchanged.

use std::time::Instant;
use tracing::Instrument;

use crate::error::{Error, Result};
use super::stage::Stage;
use super::state::PipelineState;

/// Terminal marker of the chain
pub const END: &str = "__end__";

struct Step {
    stage: Box<dyn Stage>,
    predecessor: Option<&'static str>,
}

/// Builder appending stages to the chain in execution order
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Step>,
}

impl PipelineBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; its predecessor is the stage appended before it
    pub fn then<S: Stage + 'static>(mut self, stage: S) -> Self {
        let predecessor = self.steps.last().map(|step| step.stage.name());
        self.steps.push(Step {
            stage: Box::new(stage),
            predecessor,
        });
        self
    }

    /// Close the chain with the terminal marker
    pub fn build(self) -> Result<Pipeline> {
        if self.steps.is_empty() {
            return Err(Error::config("pipeline needs at least one stage"));
        }

        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            let name = step.stage.name();
            if name == END || !seen.insert(name) {
                return Err(Error::config(format!("duplicate or reserved stage name '{}'", name)));
            }
        }

        Ok(Pipeline { steps: self.steps })
    }
}

/// Compiled chain of stages
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Start building a chain
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// First stage of the chain
    pub fn entry_point(&self) -> &'static str {
        // build() guarantees at least one step
        self.steps[0].stage.name()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.stage.name()).collect()
    }

    /// Edges of the chain, ending at [`END`]
    pub fn edges(&self) -> Vec<(&'static str, &'static str)> {
        let names = self.stage_names();
        names
            .iter()
            .enumerate()
            .map(|(i, from)| (*from, names.get(i + 1).copied().unwrap_or(END)))
            .collect()
    }

    /// Run every stage in order against `state`
    pub async fn invoke(&self, state: &mut PipelineState) -> Result<()> {
        let started = Instant::now();

        for step in &self.steps {
            let name = step.stage.name();

            if state.last_completed() != step.predecessor {
                return Err(Error::state_contract(format!(
                    "stage '{}' expects predecessor {:?}, last completed was {:?}",
                    name,
                    step.predecessor,
                    state.last_completed()
                )));
            }

            let stage_start = Instant::now();
            let span = tracing::info_span!("stage", name);

            match step.stage.run(state).instrument(span).await {
                Ok(()) => {
                    state.mark_completed(name);
                    tracing::info!(
                        "Stage '{}' completed in {:.1}ms",
                        name,
                        stage_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
                Err(e) => {
                    tracing::error!("Stage '{}' failed ({}): {}", name, e.kind(), e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Pipeline reached {} in {:.1}ms",
            END,
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }
}
