//! The `gradebook show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::display::{
    budget_summary, category_summary, overall_display, weight_display, OverallView,
};

use super::Session;

pub fn execute(
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    course: Option<String>,
    points: bool,
) -> Result<()> {
    let session = Session::open(state, config)?;
    let name = session.course_name(course);
    let snapshot = session.store.snapshot();
    let Some(course) = snapshot.course(&name) else {
        anyhow::bail!("course not found: {name}");
    };

    println!("Course: {name} ({})", course.grade_type);

    if course.categories.is_empty() {
        println!("No categories yet. Add one with `gradebook category add`.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Weight", "Grade", "Graded"]);
        for (category_name, category) in &course.categories {
            let graded = category.assignments.iter().filter(|a| a.is_graded()).count();
            table.add_row(vec![
                Cell::new(category_name),
                Cell::new(weight_display(category.weight, course.grade_type)),
                Cell::new(category_summary(category)),
                Cell::new(format!("{graded}/{}", category.assignments.len())),
            ]);
        }
        println!("{table}");
    }

    let view = if points {
        OverallView::Points
    } else {
        OverallView::Percent
    };
    println!("Overall: {}", overall_display(course, view));
    println!("Weights: {}", budget_summary(course));

    Ok(())
}
