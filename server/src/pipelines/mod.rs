// server/src/pipelines/mod.rs

//! Effect pipelines: the side effects of a lifecycle transition, run as
//! best-effort steps over a shared `EffectCtxData`.

pub mod contexts;
pub mod effects;

pub use contexts::EffectCtxData;
pub use effects::{build_effect_pipeline, EffectPipeline};
