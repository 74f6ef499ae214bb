//! ieltsgrade-core: answer evaluation and scoring engine.
//!
//! This crate defines the question model, the answer matcher, per-part
//! aggregation and attempt statistics, plus the loading, batch grading and
//! reporting layers built on top of them.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod report;
pub mod review;
pub mod statistics;
