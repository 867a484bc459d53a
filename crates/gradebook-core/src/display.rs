//! Unit-aware formatting of weights and grades.

use crate::engine::{
    category_average, earned_points, overall_grade, overall_percent, total_committed_weight,
};
use crate::model::{Category, Course, GradeType, Weight};
use crate::store::PendingChange;

/// Which unit to show a points course's overall grade in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverallView {
    #[default]
    Percent,
    Points,
}

/// `"Extra Credit"`, `"{w} pts"` or `"{w}%"`.
pub fn weight_display(weight: Weight, grade_type: GradeType) -> String {
    match weight {
        Weight::ExtraCredit => "Extra Credit".to_string(),
        Weight::Weighted(w) => format!("{w}{}", grade_type.unit_suffix()),
    }
}

/// The course's overall grade as shown in a header.
///
/// Percent courses always render as a percent; points courses honor `view`.
pub fn overall_display(course: &Course, view: OverallView) -> String {
    match (course.grade_type, view) {
        (GradeType::Points, OverallView::Points) => {
            format!("{:.1} / {}", overall_grade(course), course.total_points)
        }
        _ => format!("{:.1}%", overall_percent(course)),
    }
}

/// Committed weight against the budget, e.g. `"40% / 100%"`.
pub fn budget_summary(course: &Course) -> String {
    let unit = course.grade_type.unit_suffix();
    format!(
        "{}{unit} / {}{unit}",
        total_committed_weight(course),
        course.weight_budget()
    )
}

/// Short per-category grade: `"+{earned} pts"` for extra credit, otherwise
/// the category average.
pub fn category_summary(category: &Category) -> String {
    match category.weight {
        Weight::ExtraCredit => format!("+{} pts", earned_points(&category.assignments)),
        Weight::Weighted(_) => format!("{:.1}%", category_average(&category.assignments)),
    }
}

/// Confirmation prompt for a change that would exceed the weight budget.
pub fn pending_warning(pending: &PendingChange) -> String {
    let unit = pending.grade_type().unit_suffix();
    format!(
        "The weight you entered ({}{unit}) would make the total weight {}{unit}, \
         which exceeds the maximum allowed ({}{unit}). Continue?",
        pending.weight(),
        pending.proposed_total(),
        pending.budget()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Grade};

    #[test]
    fn weights() {
        assert_eq!(weight_display(Weight::ExtraCredit, GradeType::Points), "Extra Credit");
        assert_eq!(weight_display(Weight::Weighted(40.0), GradeType::Percent), "40%");
        assert_eq!(weight_display(Weight::Weighted(12.5), GradeType::Percent), "12.5%");
        assert_eq!(weight_display(Weight::Weighted(300.0), GradeType::Points), "300 pts");
    }

    #[test]
    fn overall_views() {
        let course = Course::new(GradeType::Points, 1000.0).with_category(
            "All",
            Category::new(Weight::Weighted(1000.0))
                .with_assignment(Assignment::new("Final", 500.0).with_grade(Grade::Scored(450.0))),
        );
        assert_eq!(overall_display(&course, OverallView::Points), "450.0 / 1000");
        assert_eq!(overall_display(&course, OverallView::Percent), "45.0%");

        let empty = Course::default();
        assert_eq!(overall_display(&empty, OverallView::Points), "0.0%");
    }

    #[test]
    fn budget_and_category_summaries() {
        let course = Course::default()
            .with_category("Homework", Category::new(Weight::Weighted(40.0)))
            .with_category(
                "Bonus",
                Category::new(Weight::ExtraCredit)
                    .with_assignment(Assignment::new("b", 5.0).with_grade(Grade::Scored(3.0))),
            );
        assert_eq!(budget_summary(&course), "40% / 100%");
        assert_eq!(category_summary(&course.categories["Bonus"]), "+3 pts");
        assert_eq!(category_summary(&course.categories["Homework"]), "0.0%");

        let points = Course::new(GradeType::Points, 1000.0)
            .with_category("Labs", Category::new(Weight::Weighted(300.0)));
        assert_eq!(budget_summary(&points), "300 pts / 1000 pts");
    }
}
