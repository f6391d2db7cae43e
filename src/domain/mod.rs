//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `context` - Analysis inputs (documents, workspaces, conversation turns)
//! - `extract` - JSON payload extraction from raw model output
//! - `insight` - Single-document insight synthesis (total, never fails)
//! - `comparison` - Multi-document comparison synthesis (total, never fails)
//! - `prompts` - Pure system-prompt builders and the country legal registry

pub mod comparison;
pub mod context;
pub(crate) mod extract;
pub mod insight;
pub mod prompts;
