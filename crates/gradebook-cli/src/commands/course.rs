//! The `gradebook course` commands.

use std::path::PathBuf;

use anyhow::Result;

use crate::CourseCommand;

use super::Session;

pub fn execute(
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    command: CourseCommand,
) -> Result<()> {
    let mut session = Session::open(state, config)?;
    let store = &mut session.store;

    match command {
        CourseCommand::List => {
            let snapshot = store.snapshot();
            for name in snapshot.courses().keys() {
                let marker = if name == snapshot.active_course_name() {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
        CourseCommand::Add {
            name,
            grade_type,
            total_points,
        } => {
            let grade_type = grade_type.unwrap_or(session.config.default_grade_type);
            let total_points = total_points.unwrap_or(session.config.default_total_points);
            store.create_course(&name, grade_type, total_points)?;
            println!("Created course '{}' ({grade_type})", name.trim());
        }
        CourseCommand::Delete { name } => {
            store.delete_course(&name)?;
            println!(
                "Deleted course '{name}'. Active course: {}",
                store.state().active_course_name()
            );
        }
        CourseCommand::Rename { old, new } => {
            store.rename_course(&old, &new)?;
            println!("Renamed course '{old}' to '{}'", new.trim());
        }
        CourseCommand::Use { name } => {
            store.set_active_course(&name)?;
            println!("Active course: {name}");
        }
        CourseCommand::ResetCategories { name, yes } => {
            if !yes {
                anyhow::bail!("resetting '{name}' removes all its categories; pass --yes to confirm");
            }
            store.reset_categories(&name)?;
            println!("Reset all categories of '{name}'");
        }
        CourseCommand::ResetAll { yes } => {
            if !yes {
                anyhow::bail!("resetting discards every course; pass --yes to confirm");
            }
            store.reset_to_default();
            println!(
                "Reset to the default course '{}'",
                store.state().active_course_name()
            );
        }
    }

    Ok(())
}
