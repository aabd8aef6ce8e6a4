//! Answer generation with grounded prompts

mod generator;
pub mod prompt;

pub use generator::AnswerGenerator;
pub use prompt::PromptBuilder;
