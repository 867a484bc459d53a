//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gradebook_core::model::{GradeType, DEFAULT_MAX_POINTS, DEFAULT_TOTAL_POINTS};

/// Top-level gradebook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Where the gradebook record is stored.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Grade type for `course add` when none is given.
    #[serde(default)]
    pub default_grade_type: GradeType,
    /// Total points for `course add` when none is given.
    #[serde(default = "default_total_points")]
    pub default_total_points: f64,
    /// Max points of a newly added assignment.
    #[serde(default = "default_max_points")]
    pub default_max_points: f64,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./gradebook-state.json")
}
fn default_total_points() -> f64 {
    DEFAULT_TOTAL_POINTS
}
fn default_max_points() -> f64 {
    DEFAULT_MAX_POINTS
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            default_grade_type: GradeType::Percent,
            default_total_points: default_total_points(),
            default_max_points: default_max_points(),
        }
    }
}

/// Expand a configured state path: a leading `~/` becomes `$HOME/`, and
/// `${VAR}` references are replaced with the variable's value (empty if unset).
fn expand_state_path(raw: &str) -> PathBuf {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = match (raw.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => {
            expanded.push_str(&home);
            expanded.push('/');
            tail
        }
        _ => raw,
    };

    while let Some((before, after)) = rest.split_once("${") {
        expanded.push_str(before);
        match after.split_once('}') {
            Some((name, tail)) => {
                expanded.push_str(&std::env::var(name).unwrap_or_default());
                rest = tail;
            }
            None => {
                expanded.push_str("${");
                rest = after;
                break;
            }
        }
    }
    expanded.push_str(rest);
    PathBuf::from(expanded)
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// `GRADEBOOK_STATE` overrides `state_file`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("gradebook.toml");
            if local.exists() {
                Some(local)
            } else {
                user_config_file().filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradebookConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradebookConfig::default(),
    };

    if let Ok(state) = std::env::var("GRADEBOOK_STATE") {
        if !state.trim().is_empty() {
            config.state_file = PathBuf::from(state);
        }
    }

    config.state_file = expand_state_path(&config.state_file.to_string_lossy());

    Ok(config)
}

/// `$HOME/.config/gradebook/config.toml`, when HOME is set.
fn user_config_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        [".config", "gradebook", "config.toml"]
            .iter()
            .fold(PathBuf::from(home), |path, part| path.join(part)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_path_expansion() {
        std::env::set_var("_GRADEBOOK_TERM", "fall");
        assert_eq!(
            expand_state_path("/data/${_GRADEBOOK_TERM}/grades.json"),
            PathBuf::from("/data/fall/grades.json")
        );
        assert_eq!(
            expand_state_path("${_GRADEBOOK_UNSET_VAR}grades.json"),
            PathBuf::from("grades.json")
        );
        assert_eq!(expand_state_path("broken/${TERM"), PathBuf::from("broken/${TERM"));
        assert_eq!(expand_state_path("plain.json"), PathBuf::from("plain.json"));
        std::env::remove_var("_GRADEBOOK_TERM");
    }

    #[test]
    fn state_path_expands_home() {
        let home = std::env::var("HOME").unwrap_or_default();
        let expanded = expand_state_path("~/grades.json");
        if home.is_empty() {
            assert_eq!(expanded, PathBuf::from("~/grades.json"));
        } else {
            assert_eq!(expanded, PathBuf::from(format!("{home}/grades.json")));
        }
    }

    #[test]
    fn default_config() {
        let config = GradebookConfig::default();
        assert_eq!(config.state_file, PathBuf::from("./gradebook-state.json"));
        assert_eq!(config.default_grade_type, GradeType::Percent);
        assert_eq!(config.default_total_points, 1000.0);
        assert_eq!(config.default_max_points, 100.0);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
state_file = "/tmp/grades.json"
default_grade_type = "points"
default_max_points = 20
"#;
        let config: GradebookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.state_file, PathBuf::from("/tmp/grades.json"));
        assert_eq!(config.default_grade_type, GradeType::Points);
        assert_eq!(config.default_total_points, 1000.0);
        assert_eq!(config.default_max_points, 20.0);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
