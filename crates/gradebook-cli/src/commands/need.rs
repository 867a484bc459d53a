//! The `gradebook need` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::engine::{
    next_assignment_percent, required_category_average, required_next_assignment_score,
    Projection,
};
use gradebook_core::input::{parse_points, parse_target};

use super::Session;

pub fn execute(
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    category: String,
    target: String,
    next_max: Option<String>,
    course: Option<String>,
) -> Result<()> {
    let session = Session::open(state, config)?;
    let name = session.course_name(course);
    let snapshot = session.store.snapshot();
    let Some(course) = snapshot.course(&name) else {
        anyhow::bail!("course not found: {name}");
    };
    let Some(target) = parse_target(&target) else {
        anyhow::bail!("target must be a number, got '{target}'");
    };

    let average = required_category_average(course, &category, target)?;
    match average {
        Projection::Required(v) => {
            println!("Required average in {category} for {target}% overall: {v:.1}%")
        }
        other => println!("Required average in {category}: {other}"),
    }

    if let Some(raw) = next_max {
        let max = parse_points(&raw);
        let next = required_next_assignment_score(course, &category, target, max)?;
        match (next, next_assignment_percent(next, max)) {
            (Projection::Required(points), Some(percent)) => println!(
                "Required on the next assignment: {points:.1} / {max} pts ({percent:.1}%)"
            ),
            (Projection::Required(points), None) => {
                println!("Required on the next assignment: {points:.1} / {max} pts")
            }
            (other, _) => println!("Required on the next assignment: {other}"),
        }
    }

    Ok(())
}
