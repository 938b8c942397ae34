//! Pipeline orchestration
//!
//! Run specifications and their validation, stage observers, and the
//! runner that threads stage outputs into a [`runner::PipelineContext`].

pub mod errors;
pub mod observer;
pub mod runner;
pub mod spec;
pub mod validation;
