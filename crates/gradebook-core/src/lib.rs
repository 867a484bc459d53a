//! gradebook-core — Grade engine, course store, and persistence.
//!
//! The engine turns a course snapshot into an overall grade and "what do I
//! need" projections. The store owns the snapshots and applies edits,
//! holding back weight changes that would exceed a course's budget until
//! they are confirmed.

pub mod display;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod persist;
pub mod store;

pub use error::{GradeError, StoreError};
pub use model::{Assignment, AssignmentId, Category, Course, Grade, GradeType, Weight};
pub use persist::{JsonFileSink, MemorySink, SnapshotSink};
pub use store::{Decision, GradebookState, PendingChange, Proposal, Store};
