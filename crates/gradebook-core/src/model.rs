//! Core data model types for gradebook.
//!
//! A course owns an ordered mapping of categories, and each category owns an
//! ordered list of assignments. The serialized form is the persisted record
//! schema: camelCase keys, `null` weight for extra credit, `null` grade for
//! ungraded work.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::input;

/// Max points given to a freshly added assignment.
pub const DEFAULT_MAX_POINTS: f64 = 100.0;

/// Total points given to a new course when none is supplied.
pub const DEFAULT_TOTAL_POINTS: f64 = 1000.0;

/// Weight budget of a percent-graded course.
pub const PERCENT_BUDGET: f64 = 100.0;

/// How category weights (and the overall grade) of a course are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeType {
    /// Weights are percentages summing to at most 100.
    #[default]
    Percent,
    /// Weights are point values summing to at most the course total.
    Points,
}

impl GradeType {
    /// Suffix appended to a number in this unit (`"%"` or `" pts"`).
    pub fn unit_suffix(self) -> &'static str {
        match self {
            GradeType::Percent => "%",
            GradeType::Points => " pts",
        }
    }
}

impl fmt::Display for GradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeType::Percent => write!(f, "percent"),
            GradeType::Points => write!(f, "points"),
        }
    }
}

impl FromStr for GradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "percentage" | "%" => Ok(GradeType::Percent),
            "points" | "pts" => Ok(GradeType::Points),
            other => Err(format!("unknown grade type: {other}")),
        }
    }
}

/// A category weight, or the extra-credit sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weight {
    /// Non-negative weight in the course's unit.
    Weighted(f64),
    /// No weight; earned points add directly to the overall grade.
    ExtraCredit,
}

impl Weight {
    /// The numeric weight, or `None` for extra credit.
    pub fn value(self) -> Option<f64> {
        match self {
            Weight::Weighted(w) => Some(w),
            Weight::ExtraCredit => None,
        }
    }

    pub fn is_extra_credit(self) -> bool {
        matches!(self, Weight::ExtraCredit)
    }

    /// Clamp a numeric weight to a finite, non-negative value.
    pub fn sanitized(self) -> Self {
        match self {
            Weight::Weighted(w) => Weight::Weighted(input::sanitize(w).max(0.0)),
            Weight::ExtraCredit => Weight::ExtraCredit,
        }
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<LenientNumber>::deserialize(deserializer)? {
            None => Weight::ExtraCredit,
            Some(LenientNumber::Number(n)) => Weight::Weighted(input::sanitize(n).max(0.0)),
            Some(LenientNumber::Text(s)) => input::parse_weight(&s),
        })
    }
}

/// An assignment score, or the ungraded sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grade {
    /// Points earned.
    Scored(f64),
    /// Not yet scored; excluded from averages.
    Ungraded,
}

impl Grade {
    /// Points earned, or `None` when ungraded.
    pub fn points(self) -> Option<f64> {
        match self {
            Grade::Scored(p) => Some(p),
            Grade::Ungraded => None,
        }
    }

    /// A non-finite score counts as not graded.
    pub fn sanitized(self) -> Self {
        match self {
            Grade::Scored(p) if p.is_finite() => Grade::Scored(p),
            _ => Grade::Ungraded,
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.points().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<LenientNumber>::deserialize(deserializer)? {
            None => Grade::Ungraded,
            Some(LenientNumber::Number(n)) if n.is_finite() => Grade::Scored(n),
            Some(LenientNumber::Number(_)) => Grade::Ungraded,
            Some(LenientNumber::Text(s)) => input::parse_grade(&s),
        })
    }
}

/// Numbers typed into text fields may have been persisted as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

fn deserialize_points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<LenientNumber>::deserialize(deserializer)? {
        None => 0.0,
        Some(LenientNumber::Number(n)) => input::sanitize(n).max(0.0),
        Some(LenientNumber::Text(s)) => input::parse_points(&s),
    })
}

fn default_max_points() -> f64 {
    DEFAULT_MAX_POINTS
}

fn default_total_points() -> f64 {
    DEFAULT_TOTAL_POINTS
}

/// Stable identifier of an assignment within its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssignmentId(String);

impl AssignmentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssignmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for AssignmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older records used millisecond timestamps as ids.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// A single scored (or not yet scored) piece of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default = "AssignmentId::generate")]
    pub id: AssignmentId,
    pub name: String,
    #[serde(default = "ungraded")]
    pub grade: Grade,
    #[serde(
        default = "default_max_points",
        deserialize_with = "deserialize_points"
    )]
    pub max_points: f64,
}

fn ungraded() -> Grade {
    Grade::Ungraded
}

impl Assignment {
    /// A new ungraded assignment with a generated id.
    pub fn new(name: impl Into<String>, max_points: f64) -> Self {
        Self {
            id: AssignmentId::generate(),
            name: name.into(),
            grade: Grade::Ungraded,
            max_points: input::sanitize(max_points).max(0.0),
        }
    }

    /// Builder-style setter for the grade.
    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = grade;
        self
    }

    pub fn is_graded(&self) -> bool {
        self.grade.points().is_some()
    }
}

/// A named group of assignments sharing one weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub weight: Weight,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Presentation state only; never read by the engine.
    #[serde(default)]
    pub expanded: bool,
}

impl Category {
    pub fn new(weight: Weight) -> Self {
        Self {
            weight,
            assignments: Vec::new(),
            expanded: false,
        }
    }

    /// Builder-style helper appending an assignment.
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn assignment(&self, id: &AssignmentId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }
}

/// A course and its categories, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub grade_type: GradeType,
    /// Only meaningful for points-graded courses.
    #[serde(
        default = "default_total_points",
        deserialize_with = "deserialize_points"
    )]
    pub total_points: f64,
    #[serde(default)]
    pub categories: IndexMap<String, Category>,
}

impl Course {
    pub fn new(grade_type: GradeType, total_points: f64) -> Self {
        Self {
            grade_type,
            total_points,
            categories: IndexMap::new(),
        }
    }

    /// Builder-style helper inserting a category.
    pub fn with_category(mut self, name: impl Into<String>, category: Category) -> Self {
        self.categories.insert(name.into(), category);
        self
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Cap on the sum of committed (non extra-credit) weights.
    pub fn weight_budget(&self) -> f64 {
        match self.grade_type {
            GradeType::Percent => PERCENT_BUDGET,
            GradeType::Points => self.total_points,
        }
    }
}

impl Default for Course {
    fn default() -> Self {
        Self::new(GradeType::Percent, DEFAULT_TOTAL_POINTS)
    }
}

/// Which assignment field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentField {
    Name,
    Grade,
    MaxPoints,
}

impl FromStr for AssignmentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(AssignmentField::Name),
            "grade" | "score" => Ok(AssignmentField::Grade),
            "max" | "maxpoints" | "max-points" | "max_points" => Ok(AssignmentField::MaxPoints),
            other => Err(format!("unknown assignment field: {other}")),
        }
    }
}

/// A single-field replacement applied to one assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentEdit {
    Name(String),
    Grade(Grade),
    MaxPoints(f64),
}

impl AssignmentEdit {
    /// Build an edit from raw user text, sanitizing numeric fields.
    pub fn parse(field: AssignmentField, raw: &str) -> Self {
        match field {
            AssignmentField::Name => AssignmentEdit::Name(raw.to_string()),
            AssignmentField::Grade => AssignmentEdit::Grade(input::parse_grade(raw)),
            AssignmentField::MaxPoints => AssignmentEdit::MaxPoints(input::parse_points(raw)),
        }
    }

    pub(crate) fn apply(self, assignment: &mut Assignment) {
        match self {
            AssignmentEdit::Name(name) => assignment.name = name,
            AssignmentEdit::Grade(grade) => assignment.grade = grade.sanitized(),
            AssignmentEdit::MaxPoints(max) => assignment.max_points = input::sanitize(max).max(0.0),
        }
    }
}
