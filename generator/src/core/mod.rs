//! Generator core: request checks, prompt composition, stage parsing and the
//! two generation flows

pub mod parser;
pub mod pipeline;
pub mod plan;
pub mod prompt;
pub mod referee;
pub mod retry;
pub mod stages;
pub mod validator;

pub use pipeline::DrillPipeline;
pub use plan::{check_plan, PlanGenerator};
pub use prompt::{compose, ComposedPrompt, PromptContext};
pub use referee::{check_draft, RefereeContext};
pub use retry::RetryPolicy;
pub use stages::{DrillPattern, PipelineState, StageArtifact};
pub use validator::{validate, validate_plan};
