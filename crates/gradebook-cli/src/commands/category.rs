//! The `gradebook category` commands.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::display::{pending_warning, weight_display};
use gradebook_core::input::parse_weight;
use gradebook_core::{Decision, Proposal, Store, Weight};

use crate::CategoryCommand;

use super::Session;

/// Exit status when a change needs confirmation and `--yes` was not given.
const NEEDS_CONFIRMATION: i32 = 2;

pub fn execute(
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    command: CategoryCommand,
) -> Result<()> {
    let mut session = Session::open(state, config)?;

    match command {
        CategoryCommand::Add {
            name,
            weight,
            course,
            yes,
        } => {
            let course = session.course_name(course);
            let weight = parse_weight(weight.as_deref().unwrap_or(""));
            let proposal = session.store.add_category(&course, &name, weight)?;
            settle(&mut session.store, proposal, yes)?;
            println!(
                "Added category '{}' ({})",
                name.trim(),
                describe(&session.store, &course, weight)
            );
        }
        CategoryCommand::Weight {
            name,
            weight,
            course,
            yes,
        } => {
            let course = session.course_name(course);
            let weight = parse_weight(&weight);
            let proposal = session
                .store
                .update_category_weight(&course, &name, weight)?;
            settle(&mut session.store, proposal, yes)?;
            println!(
                "Set weight of '{name}' to {}",
                describe(&session.store, &course, weight)
            );
        }
        CategoryCommand::Delete { name, course } => {
            let course = session.course_name(course);
            session.store.delete_category(&course, &name)?;
            println!("Deleted category '{name}'");
        }
        CategoryCommand::Toggle { name, course } => {
            let course = session.course_name(course);
            session.store.toggle_category_expanded(&course, &name)?;
            let expanded = session
                .store
                .state()
                .course(&course)
                .and_then(|c| c.category(&name))
                .is_some_and(|c| c.expanded);
            println!(
                "Category '{name}' is now {}",
                if expanded { "expanded" } else { "collapsed" }
            );
        }
    }

    Ok(())
}

/// Apply a pending change when `--yes` was given; otherwise show the warning
/// and exit without touching the state.
fn settle(store: &mut Store, proposal: Proposal, yes: bool) -> Result<()> {
    let Proposal::NeedsConfirmation(pending) = proposal else {
        return Ok(());
    };
    if !yes {
        println!("{}", pending_warning(&pending));
        println!("Re-run with --yes to apply anyway.");
        std::process::exit(NEEDS_CONFIRMATION);
    }
    store.resolve_pending(pending, Decision::ApplyAnyway)?;
    Ok(())
}

fn describe(store: &Store, course: &str, weight: Weight) -> String {
    let grade_type = store
        .state()
        .course(course)
        .map(|c| c.grade_type)
        .unwrap_or_default();
    weight_display(weight, grade_type)
}
