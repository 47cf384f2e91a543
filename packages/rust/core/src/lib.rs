//! Core pipeline and domain logic for slrkit.
//!
//! This crate ties together issue-body extraction, taxonomy updates, the
//! CSV dataset, and issue-form generation into the `add_entry` workflow.

pub mod form;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod submission;
pub mod taxonomy;
