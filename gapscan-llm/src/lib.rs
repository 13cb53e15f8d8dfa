//! Model integration for Gapscan.
//!
//! This crate exposes the [`traits::LlmClient`] interface the pipelines
//! program against, a Gemini REST implementation, and the strict-JSON
//! extraction helpers used to pull a structured payload out of free-form
//! model output. The core never assumes a response is pure JSON: it always
//! extracts-then-parses before trusting anything (see [`json`]).
pub mod gemini;
pub mod json;
pub mod traits;
