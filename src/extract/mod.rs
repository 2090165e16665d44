// src/extract/mod.rs

//! Task extraction layer.
//!
//! Turning a transcript into task records is an external concern; the job
//! engine only talks to an [`ExtractorBackend`].
//!
//! - [`backend`] provides the `ExtractorBackend` trait and the checks every
//!   extracted task list must pass before a graph is built.
//! - [`rules`] provides `RuleExtractor`, which accepts either a JSON task
//!   list (as emitted by an upstream model) or plain action-item lines.

pub mod backend;
pub mod rules;

pub use backend::{check_extracted, ExtractFuture, ExtractorBackend};
pub use rules::RuleExtractor;
