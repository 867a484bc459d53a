//! Error types for the store and the grade engine.
//!
//! A `StoreError` is a declined mutation: the store keeps its current
//! snapshot and the caller re-prompts. Exceeding the weight budget is not an
//! error; see [`crate::store::Proposal`].

use thiserror::Error;

/// Reasons the store declines a mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A course or category name was empty after trimming.
    #[error("name must not be blank")]
    BlankName,

    /// Another course already uses this name.
    #[error("a course named '{0}' already exists")]
    DuplicateCourse(String),

    /// The course already has a category with this name.
    #[error("category '{0}' already exists in this course")]
    DuplicateCategory(String),

    /// The last remaining course cannot be deleted.
    #[error("cannot delete '{0}': it is the only course")]
    LastCourse(String),

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),

    /// Points-graded courses need a positive total.
    #[error("points courses need a total above 0, got {0}")]
    InvalidTotalPoints(f64),
}

impl StoreError {
    /// Returns `true` if the mutation named something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CourseNotFound(_)
                | StoreError::CategoryNotFound(_)
                | StoreError::AssignmentNotFound(_)
        )
    }
}

/// Lookup failures in the grade engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("category not found: {0}")]
    CategoryNotFound(String),
}
