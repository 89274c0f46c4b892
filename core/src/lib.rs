// core/src/lib.rs

//! Orderline pipelines: small async step pipelines for running the side effects
//! of an order lifecycle transition.
//!
//! A pipeline is an ordered list of named steps. Each step carries a
//! [`StepPolicy`]:
//!  - `Required` steps abort the run when a handler fails.
//!  - `BestEffort` steps have their failures logged and recorded in the
//!    [`RunReport`], and the run moves on to the next step.
//!
//! Handlers receive a [`ContextData`] clone of the shared context and return a
//! [`PipelineControl`] signal. Lock guards must be dropped before any `.await`.

pub mod core;
pub mod error;
pub mod pipeline;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult, RunReport, StepOutcome, StepRecord};
pub use crate::core::step::{StepDef, StepPolicy};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{PipelineError, PipelineOutcome};
