//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use region_core::Config;

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Region configuration.
    pub config: Config,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from a config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            Config::load(path)?
        } else {
            Self::find_config(&cwd, &output).unwrap_or_default()
        };

        Ok(Self {
            config,
            output,
            cwd,
        })
    }

    /// Find a config file in the directory tree.
    fn find_config(start: &Path, output: &Output) -> Option<Config> {
        let config_names = ["region.toml", ".region.toml", "region.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    match Config::load(&config_path) {
                        Ok(config) => {
                            output.debug(&format!("Using config {}", config_path.display()));
                            return Some(config);
                        }
                        Err(e) => output.warn(&format!("{:#}", e)),
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
