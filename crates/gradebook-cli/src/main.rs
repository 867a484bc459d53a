//! gradebook CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use gradebook_core::model::{AssignmentField, GradeType};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Weighted grade tracking calculator")]
struct Cli {
    /// Gradebook state file (overrides config and GRADEBOOK_STATE)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter gradebook.toml
    Init,

    /// Show a course's categories and overall grade
    Show {
        /// Course to show (default: the active course)
        #[arg(long)]
        course: Option<String>,

        /// Show a points course's overall grade in points
        #[arg(long)]
        points: bool,
    },

    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommand),

    /// Manage grading categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage assignments
    #[command(subcommand)]
    Assignment(AssignmentCommand),

    /// What a category needs for a target overall grade
    Need {
        /// Category name
        category: String,

        /// Target overall grade, as a percent
        #[arg(long, allow_hyphen_values = true)]
        target: String,

        /// Max points of the next assignment in the category
        #[arg(long)]
        next_max: Option<String>,

        #[arg(long)]
        course: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CourseCommand {
    /// List courses (active course marked with *)
    List,

    /// Create a course and make it active
    Add {
        name: String,

        /// percent or points (default from config)
        #[arg(long, value_parser = parse_grade_type)]
        grade_type: Option<GradeType>,

        /// Total points of a points course (default from config)
        #[arg(long)]
        total_points: Option<f64>,
    },

    /// Delete a course
    Delete { name: String },

    /// Rename a course
    Rename { old: String, new: String },

    /// Make a course active
    Use { name: String },

    /// Remove every category of a course
    ResetCategories {
        name: String,

        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Discard all courses and start over
    ResetAll {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Add a category (no --weight means extra credit)
    Add {
        name: String,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long)]
        course: Option<String>,

        /// Apply even if the weight budget is exceeded
        #[arg(long)]
        yes: bool,
    },

    /// Change a category's weight ("" means extra credit)
    Weight {
        name: String,

        weight: String,

        #[arg(long)]
        course: Option<String>,

        /// Apply even if the weight budget is exceeded
        #[arg(long)]
        yes: bool,
    },

    /// Delete a category and its assignments
    Delete {
        name: String,

        #[arg(long)]
        course: Option<String>,
    },

    /// Flip a category's expanded flag
    Toggle {
        name: String,

        #[arg(long)]
        course: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AssignmentCommand {
    /// Append an ungraded assignment
    Add {
        category: String,

        #[arg(long)]
        course: Option<String>,
    },

    /// Set one field: name, grade, or max
    Set {
        category: String,

        id: String,

        #[arg(value_parser = parse_field)]
        field: AssignmentField,

        /// New value (an empty grade means ungraded)
        value: String,

        #[arg(long)]
        course: Option<String>,
    },

    /// Delete an assignment
    Delete {
        category: String,

        id: String,

        #[arg(long)]
        course: Option<String>,
    },

    /// List a category's assignments
    List {
        category: String,

        #[arg(long)]
        course: Option<String>,
    },
}

fn parse_grade_type(s: &str) -> Result<GradeType, String> {
    s.parse()
}

fn parse_field(s: &str) -> Result<AssignmentField, String> {
    s.parse()
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradebook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let state = cli.state;
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Show { course, points } => commands::show::execute(state, config, course, points),
        Commands::Course(command) => commands::course::execute(state, config, command),
        Commands::Category(command) => commands::category::execute(state, config, command),
        Commands::Assignment(command) => commands::assignment::execute(state, config, command),
        Commands::Need {
            category,
            target,
            next_max,
            course,
        } => commands::need::execute(state, config, category, target, next_max, course),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
