//! Course / category / assignment store.
//!
//! The store holds one immutable [`GradebookState`] snapshot behind an `Arc`.
//! Every mutation clones the snapshot, edits the clone, and swaps it in, so a
//! snapshot handed out earlier stays valid for whoever is still reading it.
//! Mutations take `&mut self`; callers sharing a store across threads must
//! wrap it in a mutex so that a budget check and its apply stay together.
//!
//! Category weight changes go through a two-phase protocol: a proposal either
//! applies directly or returns a [`PendingChange`] that the caller resolves
//! with [`Store::resolve_pending`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::engine::total_committed_weight;
use crate::error::StoreError;
use crate::model::{
    Assignment, AssignmentEdit, AssignmentId, Category, Course, GradeType, Weight,
    DEFAULT_MAX_POINTS, DEFAULT_TOTAL_POINTS,
};
use crate::persist::SnapshotSink;

/// Name of the course present in a fresh state.
pub const DEFAULT_COURSE_NAME: &str = "Course 1";

/// Slack for float noise when comparing a total against the budget.
const BUDGET_EPSILON: f64 = 1e-9;

/// Every course, plus which one is active.
///
/// Always holds at least one course, and `active_course` always names one of
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradebookState {
    #[serde(rename = "classes")]
    courses: IndexMap<String, Course>,
    #[serde(rename = "activeClass")]
    active_course: String,
}

impl GradebookState {
    /// Build a state from loaded parts.
    ///
    /// Returns `None` when there are no courses. An `active` name that is not
    /// among the courses falls back to the first course.
    pub fn from_parts(courses: IndexMap<String, Course>, active: Option<&str>) -> Option<Self> {
        let active_course = match active {
            Some(name) if courses.contains_key(name) => name.to_string(),
            _ => courses.keys().next()?.clone(),
        };
        Some(Self {
            courses,
            active_course,
        })
    }

    pub fn courses(&self) -> &IndexMap<String, Course> {
        &self.courses
    }

    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.get(name)
    }

    pub fn active_course_name(&self) -> &str {
        &self.active_course
    }

    pub fn active_course(&self) -> &Course {
        // Invariant: active_course is always a key of courses.
        &self.courses[self.active_course.as_str()]
    }

    fn course_mut(&mut self, name: &str) -> Result<&mut Course, StoreError> {
        self.courses
            .get_mut(name)
            .ok_or_else(|| StoreError::CourseNotFound(name.to_string()))
    }

    fn category_mut(&mut self, course: &str, category: &str) -> Result<&mut Category, StoreError> {
        self.course_mut(course)?
            .categories
            .get_mut(category)
            .ok_or_else(|| StoreError::CategoryNotFound(category.to_string()))
    }
}

impl Default for GradebookState {
    /// A single empty percent course named "Course 1".
    fn default() -> Self {
        let mut courses = IndexMap::new();
        courses.insert(
            DEFAULT_COURSE_NAME.to_string(),
            Course::new(GradeType::Percent, DEFAULT_TOTAL_POINTS),
        );
        Self {
            courses,
            active_course: DEFAULT_COURSE_NAME.to_string(),
        }
    }
}

/// Outcome of checking a proposed weight against a course's budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetCheck {
    /// The change fits, or it is extra credit and never counts.
    Within,
    /// The committed total would rise above the budget.
    Exceeds { proposed_total: f64, budget: f64 },
}

/// Check whether `weight` fits into `course`'s weight budget.
///
/// `replacing` names a category whose current weight is being replaced and so
/// is left out of the running total. Pure; no store or prompt involved.
pub fn check_weight_budget(
    course: &Course,
    replacing: Option<&str>,
    weight: Weight,
) -> BudgetCheck {
    let Weight::Weighted(weight) = weight.sanitized() else {
        return BudgetCheck::Within;
    };

    let committed = match replacing {
        None => total_committed_weight(course),
        Some(name) => course
            .categories
            .iter()
            .filter(|(n, _)| n.as_str() != name)
            .filter_map(|(_, c)| c.weight.value())
            .sum(),
    };

    let proposed_total = committed + weight;
    let budget = course.weight_budget();
    if proposed_total > budget + BUDGET_EPSILON {
        BudgetCheck::Exceeds {
            proposed_total,
            budget,
        }
    } else {
        BudgetCheck::Within
    }
}

/// Which kind of weight change is waiting for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    AddCategory,
    UpdateWeight,
}

/// A weight change held back because it exceeds the budget.
///
/// Carries exactly what was proposed, so confirming it later applies that
/// proposal even if the course changed in between. Not `Clone`: a token is
/// resolved once.
#[derive(Debug, PartialEq)]
pub struct PendingChange {
    kind: PendingKind,
    course: String,
    category: String,
    weight: f64,
    grade_type: GradeType,
    proposed_total: f64,
    budget: f64,
}

impl PendingChange {
    pub fn kind(&self) -> PendingKind {
        self.kind
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn grade_type(&self) -> GradeType {
        self.grade_type
    }

    /// Committed total the change would produce, at proposal time.
    pub fn proposed_total(&self) -> f64 {
        self.proposed_total
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }
}

/// Result of proposing a weight change.
#[derive(Debug, PartialEq)]
pub enum Proposal {
    /// The change was committed.
    Applied,
    /// The change exceeds the budget and waits for a decision.
    NeedsConfirmation(PendingChange),
}

impl Proposal {
    pub fn is_applied(&self) -> bool {
        matches!(self, Proposal::Applied)
    }
}

/// How the caller resolves a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    ApplyAnyway,
    Abandon,
}

/// Owner of the current gradebook snapshot.
pub struct Store {
    snapshot: Arc<GradebookState>,
    sink: Option<Box<dyn SnapshotSink>>,
    default_max_points: f64,
}

impl Store {
    pub fn new(state: GradebookState) -> Self {
        Self {
            snapshot: Arc::new(state),
            sink: None,
            default_max_points: DEFAULT_MAX_POINTS,
        }
    }

    /// Notify `sink` after every committed mutation.
    pub fn with_sink(mut self, sink: Box<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Max points given to assignments created by [`Store::add_assignment`].
    pub fn with_default_max_points(mut self, max_points: f64) -> Self {
        self.default_max_points = max_points.max(0.0);
        self
    }

    /// A shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<GradebookState> {
        Arc::clone(&self.snapshot)
    }

    pub fn state(&self) -> &GradebookState {
        &self.snapshot
    }

    // -- courses ----------------------------------------------------------

    /// Create an empty course and make it active.
    pub fn create_course(
        &mut self,
        name: &str,
        grade_type: GradeType,
        total_points: f64,
    ) -> Result<(), StoreError> {
        let name = non_blank(name)?;
        if grade_type == GradeType::Points && !(total_points > 0.0 && total_points.is_finite()) {
            return Err(StoreError::InvalidTotalPoints(total_points));
        }
        self.edit(|state| {
            if state.courses.contains_key(name) {
                return Err(StoreError::DuplicateCourse(name.to_string()));
            }
            state
                .courses
                .insert(name.to_string(), Course::new(grade_type, total_points));
            state.active_course = name.to_string();
            Ok(())
        })
    }

    /// Delete a course. The last remaining course cannot be deleted; deleting
    /// the active course activates the first remaining one.
    pub fn delete_course(&mut self, name: &str) -> Result<(), StoreError> {
        self.edit(|state| {
            if !state.courses.contains_key(name) {
                return Err(StoreError::CourseNotFound(name.to_string()));
            }
            if state.courses.len() <= 1 {
                return Err(StoreError::LastCourse(name.to_string()));
            }
            state.courses.shift_remove(name);
            if state.active_course == name {
                if let Some(first) = state.courses.keys().next() {
                    state.active_course = first.clone();
                }
            }
            Ok(())
        })
    }

    /// Rename a course in place, keeping its position and active status.
    pub fn rename_course(&mut self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let new_name = non_blank(new_name)?;
        if !self.snapshot.courses.contains_key(old_name) {
            return Err(StoreError::CourseNotFound(old_name.to_string()));
        }
        if new_name == old_name {
            return Ok(());
        }
        self.edit(|state| {
            if state.courses.contains_key(new_name) {
                return Err(StoreError::DuplicateCourse(new_name.to_string()));
            }
            let Some((index, _, course)) = state.courses.shift_remove_full(old_name) else {
                return Err(StoreError::CourseNotFound(old_name.to_string()));
            };
            state.courses.shift_insert(index, new_name.to_string(), course);
            if state.active_course == old_name {
                state.active_course = new_name.to_string();
            }
            Ok(())
        })
    }

    pub fn set_active_course(&mut self, name: &str) -> Result<(), StoreError> {
        if self.snapshot.active_course == name {
            return Ok(());
        }
        self.edit(|state| {
            if !state.courses.contains_key(name) {
                return Err(StoreError::CourseNotFound(name.to_string()));
            }
            state.active_course = name.to_string();
            Ok(())
        })
    }

    /// Discard every course and start over with the default state.
    pub fn reset_to_default(&mut self) {
        self.commit(GradebookState::default());
    }

    // -- categories -------------------------------------------------------

    /// Propose a new, empty category.
    ///
    /// Extra-credit categories skip the budget check.
    pub fn add_category(
        &mut self,
        course_name: &str,
        category_name: &str,
        weight: Weight,
    ) -> Result<Proposal, StoreError> {
        let category_name = non_blank(category_name)?;
        let weight = weight.sanitized();
        let course = self.course(course_name)?;
        if course.categories.contains_key(category_name) {
            return Err(StoreError::DuplicateCategory(category_name.to_string()));
        }

        if let BudgetCheck::Exceeds {
            proposed_total,
            budget,
        } = check_weight_budget(course, None, weight)
        {
            let pending = PendingChange {
                kind: PendingKind::AddCategory,
                course: course_name.to_string(),
                category: category_name.to_string(),
                weight: weight.value().unwrap_or_default(),
                grade_type: course.grade_type,
                proposed_total,
                budget,
            };
            tracing::info!(
                "adding '{category_name}' would bring '{course_name}' to {proposed_total} of {budget}, awaiting confirmation"
            );
            return Ok(Proposal::NeedsConfirmation(pending));
        }

        self.insert_category(course_name, category_name, weight)?;
        Ok(Proposal::Applied)
    }

    /// Propose a new weight for an existing category.
    ///
    /// The category's current weight is left out of the budget total, since
    /// it is being replaced.
    pub fn update_category_weight(
        &mut self,
        course_name: &str,
        category_name: &str,
        new_weight: Weight,
    ) -> Result<Proposal, StoreError> {
        let new_weight = new_weight.sanitized();
        let course = self.course(course_name)?;
        if !course.categories.contains_key(category_name) {
            return Err(StoreError::CategoryNotFound(category_name.to_string()));
        }

        if let BudgetCheck::Exceeds {
            proposed_total,
            budget,
        } = check_weight_budget(course, Some(category_name), new_weight)
        {
            let pending = PendingChange {
                kind: PendingKind::UpdateWeight,
                course: course_name.to_string(),
                category: category_name.to_string(),
                weight: new_weight.value().unwrap_or_default(),
                grade_type: course.grade_type,
                proposed_total,
                budget,
            };
            tracing::info!(
                "reweighting '{category_name}' would bring '{course_name}' to {proposed_total} of {budget}, awaiting confirmation"
            );
            return Ok(Proposal::NeedsConfirmation(pending));
        }

        self.set_weight(course_name, category_name, new_weight)?;
        Ok(Proposal::Applied)
    }

    /// Apply or drop a pending change, bypassing the budget check.
    pub fn resolve_pending(
        &mut self,
        pending: PendingChange,
        decision: Decision,
    ) -> Result<(), StoreError> {
        if decision == Decision::Abandon {
            tracing::debug!(
                "abandoned pending change to '{}' in '{}'",
                pending.category,
                pending.course
            );
            return Ok(());
        }

        let weight = Weight::Weighted(pending.weight);
        match pending.kind {
            PendingKind::AddCategory => {
                if self.course(&pending.course)?.categories.contains_key(&pending.category) {
                    return Err(StoreError::DuplicateCategory(pending.category));
                }
                self.insert_category(&pending.course, &pending.category, weight)
            }
            PendingKind::UpdateWeight => self.set_weight(&pending.course, &pending.category, weight),
        }
    }

    /// Force-apply a pending category addition.
    pub fn confirm_add_category(&mut self, pending: PendingChange) -> Result<(), StoreError> {
        self.resolve_pending(pending, Decision::ApplyAnyway)
    }

    pub fn delete_category(
        &mut self,
        course_name: &str,
        category_name: &str,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            state
                .course_mut(course_name)?
                .categories
                .shift_remove(category_name)
                .map(|_| ())
                .ok_or_else(|| StoreError::CategoryNotFound(category_name.to_string()))
        })
    }

    pub fn toggle_category_expanded(
        &mut self,
        course_name: &str,
        category_name: &str,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            let category = state.category_mut(course_name, category_name)?;
            category.expanded = !category.expanded;
            Ok(())
        })
    }

    /// Remove every category of one course. Confirming with the user is the
    /// caller's job.
    pub fn reset_categories(&mut self, course_name: &str) -> Result<(), StoreError> {
        self.edit(|state| {
            state.course_mut(course_name)?.categories.clear();
            Ok(())
        })
    }

    // -- assignments ------------------------------------------------------

    /// Append an ungraded assignment named after the category and its
    /// position, e.g. "Homework 3".
    pub fn add_assignment(
        &mut self,
        course_name: &str,
        category_name: &str,
    ) -> Result<AssignmentId, StoreError> {
        let max_points = self.default_max_points;
        self.edit(|state| {
            let category = state.category_mut(course_name, category_name)?;
            let name = format!("{category_name} {}", category.assignments.len() + 1);
            let assignment = Assignment::new(name, max_points);
            let id = assignment.id.clone();
            category.assignments.push(assignment);
            Ok(id)
        })
    }

    /// Replace one field of one assignment.
    pub fn update_assignment_field(
        &mut self,
        course_name: &str,
        category_name: &str,
        assignment_id: &AssignmentId,
        edit: AssignmentEdit,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            let assignment = state
                .category_mut(course_name, category_name)?
                .assignments
                .iter_mut()
                .find(|a| &a.id == assignment_id)
                .ok_or_else(|| StoreError::AssignmentNotFound(assignment_id.to_string()))?;
            edit.apply(assignment);
            Ok(())
        })
    }

    pub fn delete_assignment(
        &mut self,
        course_name: &str,
        category_name: &str,
        assignment_id: &AssignmentId,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            let assignments = &mut state.category_mut(course_name, category_name)?.assignments;
            let before = assignments.len();
            assignments.retain(|a| &a.id != assignment_id);
            if assignments.len() == before {
                return Err(StoreError::AssignmentNotFound(assignment_id.to_string()));
            }
            Ok(())
        })
    }

    // -- internals --------------------------------------------------------

    fn course(&self, name: &str) -> Result<&Course, StoreError> {
        self.snapshot
            .course(name)
            .ok_or_else(|| StoreError::CourseNotFound(name.to_string()))
    }

    fn insert_category(
        &mut self,
        course_name: &str,
        category_name: &str,
        weight: Weight,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            state
                .course_mut(course_name)?
                .categories
                .insert(category_name.to_string(), Category::new(weight.sanitized()));
            Ok(())
        })
    }

    fn set_weight(
        &mut self,
        course_name: &str,
        category_name: &str,
        weight: Weight,
    ) -> Result<(), StoreError> {
        self.edit(|state| {
            state.category_mut(course_name, category_name)?.weight = weight.sanitized();
            Ok(())
        })
    }

    /// Run `f` against a copy of the snapshot and commit the copy on success.
    fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut GradebookState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = GradebookState::clone(&self.snapshot);
        match f(&mut next) {
            Ok(value) => {
                self.commit(next);
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("declined mutation: {e}");
                Err(e)
            }
        }
    }

    fn commit(&mut self, next: GradebookState) {
        self.snapshot = Arc::new(next);
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.persist(&self.snapshot) {
                tracing::warn!("failed to persist snapshot: {e:#}");
            }
        }
    }
}

fn non_blank(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(StoreError::BlankName)
    } else {
        Ok(trimmed)
    }
}
