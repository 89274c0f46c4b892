// core/src/core/context.rs

//! Defines the `Handler<TData, Err>` type for pipeline step handlers.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a pipeline step handler.
///
/// A handler takes a clone of the shared `ContextData<TData>` and returns a boxed
/// future resolving to `Result<PipelineControl, Err>`.
///
/// Handlers must release any `.read()` / `.write()` guard before awaiting, since
/// the guards are blocking `parking_lot` locks.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
