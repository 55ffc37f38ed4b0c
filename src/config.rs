use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "smallsh.toml";
pub const CONFIG_ENV: &str = "SMALLSH_CONFIG";

/// What happens to still-running background jobs when the interpreter exits.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExitPolicy {
    /// SIGTERM every tracked job, SIGKILL any that outlive the grace period,
    /// and reap them before leaving.
    #[default]
    Terminate,
    /// Leave tracked jobs running.
    Abandon,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    pub prompt: String,
    pub job_capacity: usize,
    pub max_line_length: usize,
    pub max_args: usize,
    pub exit_policy: ExitPolicy,
    pub color: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: ": ".to_string(),
            job_capacity: 100,
            max_line_length: 2048,
            max_args: 512,
            exit_policy: ExitPolicy::Terminate,
            color: true,
        }
    }
}

impl ShellConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ShellConfig = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.job_capacity == 0 {
            bail!("Configuration Error: 'job_capacity' must be at least 1");
        }
        if self.max_line_length == 0 {
            bail!("Configuration Error: 'max_line_length' must be at least 1");
        }
        if self.max_args == 0 {
            bail!("Configuration Error: 'max_args' must be at least 1");
        }
        Ok(())
    }
}

/// Resolves and loads the configuration.
///
/// An explicit path must exist. Otherwise `smallsh.toml` in `dir` is tried,
/// then the file named by `$SMALLSH_CONFIG`; if neither exists the defaults
/// are used.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ShellConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover(dir),
    };

    let Some(path) = path else {
        debug!("No configuration file found, using defaults");
        return Ok(ShellConfig::default());
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config = ShellConfig::from_toml(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn discover(dir: &Path) -> Option<PathBuf> {
    let local = dir.join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from)?;
    if from_env.is_file() {
        Some(from_env)
    } else {
        warn!("{} points at {}, which is not a file; ignoring", CONFIG_ENV, from_env.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_is_default() {
        let config = ShellConfig::from_toml("").unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ShellConfig::from_toml(
            r#"
            prompt = "$ "
            job_capacity = 4
            exit_policy = "abandon"
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.job_capacity, 4);
        assert_eq!(config.exit_policy, ExitPolicy::Abandon);
        assert_eq!(config.max_line_length, 2048);
        assert!(config.color);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ShellConfig::from_toml("job_capacity = 0").is_err());
        assert!(ShellConfig::from_toml("max_args = 0").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ShellConfig::from_toml("promtp = \"x\"").is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "max_args = 8\n").unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.max_args, 8);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }
}
