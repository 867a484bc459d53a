//! Grade engine.
//!
//! Pure functions over an immutable course snapshot: category averages, the
//! overall grade, and the two "what do I need" projections. Nothing here
//! mutates its input, so every function is safe to call from any reader.

use std::fmt;

use crate::error::GradeError;
use crate::input::sanitize;
use crate::model::{Assignment, Category, Course, GradeType, Weight};

pub use crate::display::weight_display;

/// Average of the graded assignments as a percent.
///
/// Ungraded assignments are left out of both the earned points and the max
/// points. Returns 0 when nothing is graded or the graded max points sum to 0.
pub fn category_average(assignments: &[Assignment]) -> f64 {
    let (earned, possible) = assignments
        .iter()
        .filter_map(|a| a.grade.points().map(|g| (g, a.max_points)))
        .fold((0.0, 0.0), |(earned, possible), (g, max)| {
            (earned + g, possible + max)
        });

    if possible > 0.0 {
        earned / possible * 100.0
    } else {
        0.0
    }
}

/// Sum of the points earned on graded assignments.
pub fn earned_points(assignments: &[Assignment]) -> f64 {
    assignments.iter().filter_map(|a| a.grade.points()).sum()
}

/// Overall course grade in the course's native unit.
///
/// Percent courses return the weight-normalized average plus extra credit.
/// Points courses return the earned weighted points plus extra credit.
pub fn overall_grade(course: &Course) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut extra_credit = 0.0;

    for category in course.categories.values() {
        match category.weight {
            Weight::ExtraCredit => extra_credit += earned_points(&category.assignments),
            Weight::Weighted(weight) => {
                let average = category_average(&category.assignments);
                // An untouched category is skipped, but an earned zero counts.
                if average > 0.0 || category.assignments.iter().any(Assignment::is_graded) {
                    weighted_sum += average / 100.0 * weight;
                    weight_total += weight;
                }
            }
        }
    }

    match course.grade_type {
        GradeType::Percent => {
            let base = if weight_total > 0.0 {
                weighted_sum / weight_total * 100.0
            } else {
                0.0
            };
            base + extra_credit
        }
        GradeType::Points => weighted_sum + extra_credit,
    }
}

/// Overall grade of a points course as a percent of its total points.
///
/// Percent courses return their overall grade unchanged.
pub fn overall_percent(course: &Course) -> f64 {
    let overall = overall_grade(course);
    match course.grade_type {
        GradeType::Percent => overall,
        GradeType::Points => overall / course.total_points.max(1.0) * 100.0,
    }
}

/// Sum of all non extra-credit category weights.
pub fn total_committed_weight(course: &Course) -> f64 {
    course
        .categories
        .values()
        .filter_map(|c| c.weight.value())
        .sum()
}

/// Result of a "what do I need" projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// The required value, clamped at 0 and rounded to one decimal.
    Required(f64),
    /// The category is extra credit and has no required grade.
    NotApplicable,
    /// The category has weight 0, so no grade in it moves the overall grade.
    ZeroWeight,
}

impl Projection {
    pub fn value(self) -> Option<f64> {
        match self {
            Projection::Required(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Required(v) => write!(f, "{v:.1}"),
            Projection::NotApplicable => write!(f, "N/A for extra credit"),
            Projection::ZeroWeight => write!(f, "N/A for a category with no weight"),
        }
    }
}

/// Average (as a percent) the named category must show for the overall grade
/// to reach `target`.
///
/// The target is always read as a percent of 100, whatever the course's
/// grade type.
pub fn required_category_average(
    course: &Course,
    category_name: &str,
    target: f64,
) -> Result<Projection, GradeError> {
    let category = lookup(course, category_name)?;
    let weight = match solvable_weight(category) {
        Ok(weight) => weight,
        Err(projection) => return Ok(projection),
    };

    let required = solve_average(course, category_name, weight, target);
    Ok(Projection::Required(round_tenth(required.max(0.0))))
}

/// Raw points needed on one more assignment worth `next_max_points` for the
/// overall grade to reach `target`.
///
/// Unlike [`category_average`], the category's current max points include
/// ungraded assignments.
pub fn required_next_assignment_score(
    course: &Course,
    category_name: &str,
    target: f64,
    next_max_points: f64,
) -> Result<Projection, GradeError> {
    let category = lookup(course, category_name)?;
    let weight = match solvable_weight(category) {
        Ok(weight) => weight,
        Err(projection) => return Ok(projection),
    };

    let required_average = solve_average(course, category_name, weight, target);

    let current_max_total: f64 = category.assignments.iter().map(|a| a.max_points).sum();
    let new_max_total = current_max_total + sanitize(next_max_points).max(0.0);
    let required_total = required_average / 100.0 * new_max_total;
    let current_earned = earned_points(&category.assignments);

    Ok(Projection::Required(round_tenth(
        (required_total - current_earned).max(0.0),
    )))
}

/// A required next-assignment score as a percent of that assignment's max.
///
/// `None` when there is nothing to show: no requirement, a zero requirement,
/// or a zero max.
pub fn next_assignment_percent(required: Projection, next_max_points: f64) -> Option<f64> {
    let points = required.value().filter(|p| *p > 0.0)?;
    let max = sanitize(next_max_points);
    if max <= 0.0 {
        return None;
    }
    Some(round_tenth(points / max * 100.0))
}

fn lookup<'a>(course: &'a Course, category_name: &str) -> Result<&'a Category, GradeError> {
    course
        .category(category_name)
        .ok_or_else(|| GradeError::CategoryNotFound(category_name.to_string()))
}

fn solvable_weight(category: &Category) -> Result<f64, Projection> {
    match category.weight {
        Weight::ExtraCredit => Err(Projection::NotApplicable),
        Weight::Weighted(w) if w > 0.0 => Ok(w),
        Weight::Weighted(_) => Err(Projection::ZeroWeight),
    }
}

/// Unclamped, unrounded category average needed to hit `target`.
///
/// Every other weighted category counts with its current average, graded or
/// not.
fn solve_average(course: &Course, category_name: &str, weight: f64, target: f64) -> f64 {
    let (other_weighted_sum, other_weight) = course
        .categories
        .iter()
        .filter(|(name, _)| name.as_str() != category_name)
        .filter_map(|(_, c)| c.weight.value().map(|w| (category_average(&c.assignments), w)))
        .fold((0.0, 0.0), |(sum, total), (average, w)| {
            (sum + average / 100.0 * w, total + w)
        });

    let target = sanitize(target).max(0.0);
    let required_weighted = target / 100.0 * (other_weight + weight) - other_weighted_sum;
    required_weighted / weight * 100.0
}

/// Round half away from zero to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grade, PERCENT_BUDGET};

    fn scored(earned: f64, max: f64) -> Assignment {
        Assignment::new("a", max).with_grade(Grade::Scored(earned))
    }

    fn category(weight: Weight, assignments: Vec<Assignment>) -> Category {
        Category {
            weight,
            assignments,
            expanded: false,
        }
    }

    fn homework_exam_course() -> Course {
        Course::new(GradeType::Percent, 1000.0)
            .with_category(
                "Homework",
                category(
                    Weight::Weighted(40.0),
                    vec![scored(8.0, 10.0), scored(9.0, 10.0)],
                ),
            )
            .with_category("Exam", category(Weight::Weighted(60.0), vec![]))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn average_ignores_ungraded() {
        let assignments = vec![scored(8.0, 10.0), Assignment::new("later", 90.0)];
        assert!(approx(category_average(&assignments), 80.0));
    }

    #[test]
    fn average_of_nothing_graded_is_zero() {
        assert_eq!(category_average(&[]), 0.0);
        assert_eq!(category_average(&[Assignment::new("x", 10.0)]), 0.0);
    }

    #[test]
    fn average_with_zero_max_points_is_zero() {
        assert_eq!(category_average(&[scored(5.0, 0.0)]), 0.0);
    }

    #[test]
    fn average_stays_in_range_when_grades_fit() {
        let sets = [
            vec![scored(0.0, 10.0)],
            vec![scored(10.0, 10.0), scored(3.0, 7.0)],
            vec![scored(49.5, 50.0), scored(0.25, 1.0), Assignment::new("x", 5.0)],
        ];
        for set in &sets {
            let avg = category_average(set);
            assert!((0.0..=100.0).contains(&avg), "average out of range: {avg}");
        }
    }

    #[test]
    fn homework_exam_scenario() {
        let course = homework_exam_course();
        let homework = course.category("Homework").unwrap();
        assert!(approx(category_average(&homework.assignments), 85.0));
        assert!(approx(overall_grade(&course), 85.0));
        assert_eq!(
            required_category_average(&course, "Exam", 90.0).unwrap(),
            Projection::Required(93.3)
        );
    }

    #[test]
    fn earned_zero_counts_but_untouched_does_not() {
        let mut course = homework_exam_course();
        course.categories["Exam"]
            .assignments
            .push(scored(0.0, 100.0));
        // (34 + 0) / 100 * 100
        assert!(approx(overall_grade(&course), 34.0));
    }

    #[test]
    fn points_course_returns_raw_weighted_sum() {
        let course = Course::new(GradeType::Points, 1000.0).with_category(
            "Everything",
            category(Weight::Weighted(1000.0), vec![scored(450.0, 500.0)]),
        );
        assert!(approx(overall_grade(&course), 450.0));
        assert!(approx(overall_percent(&course), 45.0));
    }

    #[test]
    fn extra_credit_only_course_sums_points() {
        let course = Course::default()
            .with_category(
                "Bonus",
                category(
                    Weight::ExtraCredit,
                    vec![scored(2.0, 5.0), scored(1.5, 5.0), Assignment::new("x", 5.0)],
                ),
            )
            .with_category("More", category(Weight::ExtraCredit, vec![scored(3.0, 3.0)]));
        assert!(approx(overall_grade(&course), 6.5));
    }

    #[test]
    fn extra_credit_adds_on_top() {
        let course = homework_exam_course().with_category(
            "Bonus",
            category(Weight::ExtraCredit, vec![scored(2.0, 0.0)]),
        );
        assert!(approx(overall_grade(&course), 87.0));
    }

    #[test]
    fn extra_credit_projection_not_applicable() {
        let course = Course::default().with_category("Bonus", category(Weight::ExtraCredit, vec![]));
        assert_eq!(
            required_category_average(&course, "Bonus", 90.0).unwrap(),
            Projection::NotApplicable
        );
        assert_eq!(
            required_next_assignment_score(&course, "Bonus", 90.0, 10.0).unwrap(),
            Projection::NotApplicable
        );
        assert_eq!(Projection::NotApplicable.to_string(), "N/A for extra credit");
    }

    #[test]
    fn zero_weight_projection() {
        let course = Course::default().with_category("Ungraded", category(Weight::Weighted(0.0), vec![]));
        assert_eq!(
            required_category_average(&course, "Ungraded", 90.0).unwrap(),
            Projection::ZeroWeight
        );
    }

    #[test]
    fn unknown_category_is_an_error() {
        let course = homework_exam_course();
        assert_eq!(
            required_category_average(&course, "Quizzes", 90.0),
            Err(GradeError::CategoryNotFound("Quizzes".into()))
        );
    }

    #[test]
    fn required_average_clamps_negative() {
        let course = homework_exam_course();
        assert_eq!(
            required_category_average(&course, "Exam", 10.0).unwrap(),
            Projection::Required(0.0)
        );
        assert_eq!(
            required_category_average(&course, "Exam", -50.0).unwrap(),
            Projection::Required(0.0)
        );
    }

    #[test]
    fn required_average_round_trips_through_overall() {
        let course = homework_exam_course();
        let target = 90.0;
        let required = required_category_average(&course, "Exam", target)
            .unwrap()
            .value()
            .unwrap();

        let mut filled = course.clone();
        filled.categories["Exam"]
            .assignments
            .push(scored(required, 100.0));
        assert!((overall_grade(&filled) - target).abs() <= 0.1);
    }

    #[test]
    fn required_next_score() {
        // Exam: one ungraded 100-pt assignment already on the books.
        let mut course = homework_exam_course();
        course.categories["Exam"]
            .assignments
            .push(Assignment::new("Midterm", 100.0));

        // required avg 93.333..., max total 100 + 100 = 200, earned 0
        assert_eq!(
            required_next_assignment_score(&course, "Exam", 90.0, 100.0).unwrap(),
            Projection::Required(186.7)
        );
    }

    #[test]
    fn required_next_score_subtracts_earned_points() {
        let course = homework_exam_course();
        // The untouched Exam still counts its weight here, so Homework
        // needs (0.9 * 100 - 0) / 40 * 100 = 225%.
        // 225% of (20 + 10) max points = 67.5, minus the 17 already earned.
        assert_eq!(
            required_next_assignment_score(&course, "Homework", 90.0, 10.0).unwrap(),
            Projection::Required(50.5)
        );
    }

    #[test]
    fn next_percent() {
        assert_eq!(
            next_assignment_percent(Projection::Required(45.0), 50.0),
            Some(90.0)
        );
        assert_eq!(next_assignment_percent(Projection::Required(0.0), 50.0), None);
        assert_eq!(next_assignment_percent(Projection::Required(5.0), 0.0), None);
        assert_eq!(next_assignment_percent(Projection::NotApplicable, 50.0), None);
    }

    #[test]
    fn committed_weight_skips_extra_credit() {
        let course = homework_exam_course()
            .with_category("Bonus", category(Weight::ExtraCredit, vec![]));
        assert!(approx(total_committed_weight(&course), PERCENT_BUDGET));
    }

    #[test]
    fn rounding() {
        assert_eq!(round_tenth(93.3333), 93.3);
        assert_eq!(round_tenth(186.6666), 186.7);
        assert_eq!(round_tenth(0.04), 0.0);
    }
}
