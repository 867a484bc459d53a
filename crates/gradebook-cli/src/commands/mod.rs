//! Subcommand implementations.

pub mod assignment;
pub mod category;
pub mod course;
pub mod init;
pub mod need;
pub mod show;

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::persist::load_state_file;
use gradebook_core::{JsonFileSink, Store};

use crate::config::{load_config_from, GradebookConfig};

/// A store loaded from the state file, persisting back to it on every change.
pub struct Session {
    pub store: Store,
    pub config: GradebookConfig,
}

impl Session {
    pub fn open(state_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let path = state_path.unwrap_or_else(|| config.state_file.clone());
        tracing::debug!("using gradebook state at {}", path.display());

        let store = Store::new(load_state_file(&path))
            .with_sink(Box::new(JsonFileSink::new(path)))
            .with_default_max_points(config.default_max_points);
        Ok(Self { store, config })
    }

    /// The named course, or the active one.
    pub fn course_name(&self, explicit: Option<String>) -> String {
        explicit.unwrap_or_else(|| self.store.state().active_course_name().to_string())
    }
}
