//! Content-gap analysis core: fan-out, batching, resilient model calls,
//! and reconciliation.
//!
//! The shape of a run is fetch → normalize → batch → model-assisted
//! analysis → reconcile → report. Everything model-facing goes through the
//! strict-JSON boundary in `gapscan-llm`; nothing untyped escapes past
//! [`types`]. Batches are processed strictly one after another with a
//! deliberate inter-batch delay, and every per-item failure is contained
//! where it happened.
pub mod caller;
pub mod memo;
pub mod pipeline;
pub mod planner;
pub mod prompt;
pub mod reconcile;
pub mod report;
pub mod types;
