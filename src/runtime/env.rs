//! Environment variables and dotenv files.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn load_env_file_impl(&self, path: &Path) -> Result<()> {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load environment file {:?}", path))
    }
}
