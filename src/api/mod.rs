//! High-level API for running the generate, critique, resolve workflow.

mod agent;
mod error;
mod llm_bridge;
mod progress;
mod prompts;
mod runner;
mod transcript;

pub use agent::{AgentConfig, OptionCount};
pub use error::{ConfigError, InputError, RunError, ServiceError, ServiceErrorKind};
pub use llm_bridge::{CompletionRequest, CompletionService, LlmService, Sampling};
pub use progress::{NoProgress, Stage, StageObserver};
pub use prompts::{render_template, Prompts, DEFAULT_CRITIQUE, DEFAULT_RESOLUTION};
pub use runner::{AnswerOption, Orchestrator, RunReport};
pub use transcript::{Role, Transcript, Turn};
