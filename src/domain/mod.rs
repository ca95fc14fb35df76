//! Domain layer containing the interview logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `interview` - Curriculum, prompt composer, response parser and progression state machine

pub mod foundation;
pub mod interview;
