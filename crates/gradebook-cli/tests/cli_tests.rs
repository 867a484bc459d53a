//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated inside `dir`: its state file, config search, and HOME
/// all resolve there.
fn gradebook(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("gradebook").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("GRADEBOOK_STATE")
        .env_remove("RUST_LOG");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) {
    gradebook(dir).args(args).assert().success();
}

/// Add an assignment and return its id.
fn add_assignment(dir: &TempDir, category: &str) -> String {
    let output = gradebook(dir)
        .args(["assignment", "add", category])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout.split_whitespace().last().unwrap().to_string()
}

fn score(dir: &TempDir, category: &str, earned: &str, max: &str) {
    let id = add_assignment(dir, category);
    run(dir, &["assignment", "set", category, &id, "grade", earned]);
    run(dir, &["assignment", "set", category, &id, "max", max]);
}

#[test]
fn show_default_course() {
    let dir = TempDir::new().unwrap();
    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Course: Course 1 (percent)"))
        .stdout(predicate::str::contains("No categories yet"))
        .stdout(predicate::str::contains("Overall: 0.0%"))
        .stdout(predicate::str::contains("Weights: 0% / 100%"));
}

#[test]
fn homework_and_exam() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["category", "add", "Homework", "--weight", "40"]);
    run(&dir, &["category", "add", "Exam", "--weight", "60"]);
    score(&dir, "Homework", "8", "10");
    score(&dir, "Homework", "9", "10");

    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("85.0%"))
        .stdout(predicate::str::contains("Overall: 85.0%"))
        .stdout(predicate::str::contains("Weights: 100% / 100%"))
        .stdout(predicate::str::contains("2/2"));

    gradebook(&dir)
        .args(["need", "Exam", "--target", "90", "--next-max", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("93.3%"))
        .stdout(predicate::str::contains("93.3 / 100 pts"));

    gradebook(&dir)
        .args(["need", "Exam", "--target", "-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0%"));
}

#[test]
fn over_budget_needs_yes() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["category", "add", "Homework", "--weight", "70"]);

    gradebook(&dir)
        .args(["category", "add", "Exam", "--weight", "40"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "would make the total weight 110%, which exceeds the maximum allowed (100%)",
        ));

    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam").not());

    run(&dir, &["category", "add", "Exam", "--weight", "40", "--yes"]);
    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weights: 110% / 100%"));
}

#[test]
fn reweight_excludes_own_weight() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["category", "add", "Homework", "--weight", "40"]);
    run(&dir, &["category", "add", "Exam", "--weight", "60"]);

    gradebook(&dir)
        .args(["category", "weight", "Exam", "55"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set weight of 'Exam' to 55%"));

    gradebook(&dir)
        .args(["category", "weight", "Exam", "61"])
        .assert()
        .code(2);
}

#[test]
fn extra_credit_category() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["category", "add", "Everything", "--weight", "100"]);

    gradebook(&dir)
        .args(["category", "add", "Bonus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extra Credit"));

    score(&dir, "Bonus", "3", "5");
    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("+3 pts"))
        .stdout(predicate::str::contains("Overall: 3.0%"));

    gradebook(&dir)
        .args(["need", "Bonus", "--target", "90", "--next-max", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A for extra credit"));
}

#[test]
fn points_course() {
    let dir = TempDir::new().unwrap();
    run(
        &dir,
        &[
            "course",
            "add",
            "Physics",
            "--grade-type",
            "points",
            "--total-points",
            "1000",
        ],
    );
    run(&dir, &["category", "add", "Everything", "--weight", "1000"]);
    score(&dir, "Everything", "450", "500");

    gradebook(&dir)
        .args(["show", "--points"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Course: Physics (points)"))
        .stdout(predicate::str::contains("Overall: 450.0 / 1000"))
        .stdout(predicate::str::contains("Weights: 1000 pts / 1000 pts"));

    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 45.0%"));
}

#[test]
fn course_lifecycle() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["course", "add", "Bio"]);

    gradebook(&dir)
        .args(["course", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* Bio"))
        .stdout(predicate::str::contains("  Course 1"));

    gradebook(&dir)
        .args(["course", "rename", "Bio", "Course 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    run(&dir, &["course", "rename", "Bio", "Biology"]);
    gradebook(&dir)
        .args(["course", "delete", "Biology"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active course: Course 1"));

    gradebook(&dir)
        .args(["course", "delete", "Course 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only course"));
}

#[test]
fn blank_course_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    gradebook(&dir)
        .args(["course", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));
}

#[test]
fn resets_need_yes() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["category", "add", "Homework", "--weight", "40"]);

    gradebook(&dir)
        .args(["course", "reset-categories", "Course 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    run(&dir, &["course", "reset-categories", "Course 1", "--yes"]);
    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No categories yet"));

    run(&dir, &["course", "add", "Bio"]);
    run(&dir, &["course", "reset-all", "--yes"]);
    gradebook(&dir)
        .args(["course", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bio").not());
}

#[test]
fn malformed_state_file_falls_back() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gradebook-state.json"), "{ not json").unwrap();

    gradebook(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Course: Course 1"));
}

#[test]
fn state_file_uses_persisted_schema() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("terms").join("fall.json");
    gradebook(&dir)
        .arg("--state")
        .arg(&state)
        .args(["category", "add", "Labs", "--weight", "25"])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(json["activeClass"], "Course 1");
    assert_eq!(json["classes"]["Course 1"]["gradeType"], "percent");
    assert_eq!(json["classes"]["Course 1"]["categories"]["Labs"]["weight"], 25.0);
}

#[test]
fn config_sets_state_file_and_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("gradebook.toml"),
        "state_file = \"custom.json\"\ndefault_max_points = 20\n",
    )
    .unwrap();

    run(&dir, &["category", "add", "Quizzes", "--weight", "10"]);
    add_assignment(&dir, "Quizzes");

    assert!(dir.path().join("custom.json").exists());
    gradebook(&dir)
        .args(["assignment", "list", "Quizzes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quizzes 1"))
        .stdout(predicate::str::contains("20"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    gradebook(&dir)
        .args(["--config", "nope.toml", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_and_skips() {
    let dir = TempDir::new().unwrap();

    gradebook(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gradebook.toml"));
    assert!(dir.path().join("gradebook.toml").exists());

    gradebook(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    gradebook(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weighted grade tracking calculator"));
}
