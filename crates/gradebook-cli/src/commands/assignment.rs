//! The `gradebook assignment` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::model::AssignmentEdit;
use gradebook_core::{AssignmentId, Grade};

use crate::AssignmentCommand;

use super::Session;

pub fn execute(
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    command: AssignmentCommand,
) -> Result<()> {
    let mut session = Session::open(state, config)?;

    match command {
        AssignmentCommand::Add { category, course } => {
            let course = session.course_name(course);
            let id = session.store.add_assignment(&course, &category)?;
            let snapshot = session.store.snapshot();
            let name = snapshot
                .course(&course)
                .and_then(|c| c.category(&category))
                .and_then(|c| c.assignment(&id))
                .map(|a| a.name.as_str())
                .unwrap_or_default();
            println!("Added '{name}' with id {id}");
        }
        AssignmentCommand::Set {
            category,
            id,
            field,
            value,
            course,
        } => {
            let course = session.course_name(course);
            let id = AssignmentId::from(id.as_str());
            let edit = AssignmentEdit::parse(field, &value);
            session
                .store
                .update_assignment_field(&course, &category, &id, edit)?;
            println!("Updated assignment {id}");
        }
        AssignmentCommand::Delete {
            category,
            id,
            course,
        } => {
            let course = session.course_name(course);
            let id = AssignmentId::from(id.as_str());
            session.store.delete_assignment(&course, &category, &id)?;
            println!("Deleted assignment {id}");
        }
        AssignmentCommand::List { category, course } => {
            let course = session.course_name(course);
            let snapshot = session.store.snapshot();
            let Some(found) = snapshot.course(&course).and_then(|c| c.category(&category)) else {
                anyhow::bail!("category not found: {category}");
            };

            let mut table = Table::new();
            table.set_header(vec!["Id", "Name", "Grade", "Max"]);
            for a in &found.assignments {
                let grade = match a.grade {
                    Grade::Scored(points) => points.to_string(),
                    Grade::Ungraded => "-".to_string(),
                };
                table.add_row(vec![
                    Cell::new(a.id.as_str()),
                    Cell::new(&a.name),
                    Cell::new(grade),
                    Cell::new(a.max_points),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
