//! Runtime abstraction for system operations.
//!
//! The session layer reads the environment and edits `.env` files only
//! through [`Runtime`], so tests can swap in a mock.
//!
//! # Structure
//!
//! - `env` - Environment variables and `.env` loading
//! - `fs` - File reads and writes

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Load `KEY=value` pairs from a dotenv file into the process environment.
    /// Variables that are already set are left alone.
    fn load_env_file(&self, path: &Path) -> Result<()>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        self.load_env_file_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }
}
