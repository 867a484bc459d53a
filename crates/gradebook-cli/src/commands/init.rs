//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: gradebook course add \"Biology\"");
    println!("  2. Run: gradebook category add Homework --weight 40");
    println!("  3. Run: gradebook show");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

# Where the gradebook record lives. ${VAR} references are expanded,
# and GRADEBOOK_STATE overrides this value.
state_file = "./gradebook-state.json"

# Defaults for `gradebook course add`.
default_grade_type = "percent"
default_total_points = 1000

# Max points of a new assignment.
default_max_points = 100
"#;
