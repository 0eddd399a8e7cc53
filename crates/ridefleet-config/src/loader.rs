use crate::FleetConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Builder for loading a [`FleetConfig`] from its sources in precedence
/// order: built-in defaults, project `ridefleet.toml`, gitignored
/// `ridefleet.local.toml`, then `RIDEFLEET_*` environment variables.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "RIDEFLEET".to_string(),
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(self) -> Result<FleetConfig> {
        let mut builder = config::Config::builder();

        let defaults = FleetConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        let project_file = self.project_dir.join("ridefleet.toml");
        if project_file.exists() {
            builder = builder.add_source(
                config::File::from(project_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        let local_file = self.project_dir.join("ridefleet.local.toml");
        if local_file.exists() {
            builder = builder.add_source(
                config::File::from(local_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("_")
                .try_parsing(true),
        );

        let built = builder.build().context("failed to build configuration")?;
        let fleet_config: FleetConfig = built
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Ok(fleet_config)
    }

    pub fn load_or_default(self) -> FleetConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_spec_table() {
        let dir = tempdir().unwrap();
        let config = ConfigLoader::new().with_project_dir(dir.path()).load().unwrap();

        assert_eq!(config.monitor.interval_ms, 5000);
        assert_eq!(config.monitor.timeout_ms, 3000);
        assert_eq!(config.monitor.failure_threshold, 3);
        assert_eq!(config.handoff.overall_timeout_ms, 30_000);
        assert_eq!(config.buffer.max_per_region, 1000);
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ridefleet.toml"),
            r#"
[monitor]
interval_ms = 1000
failure_threshold = 5

[regions]
us-west = "http://127.0.0.1:9001"
us-east = "http://127.0.0.1:9002"
"#,
        )
        .unwrap();

        let config = ConfigLoader::new().with_project_dir(dir.path()).load().unwrap();
        assert_eq!(config.monitor.interval_ms, 1000);
        assert_eq!(config.monitor.failure_threshold, 5);
        assert_eq!(
            config.regions.get("us-west").map(String::as_str),
            Some("http://127.0.0.1:9001")
        );
    }

    #[test]
    fn local_file_overrides_project_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("ridefleet.toml"),
            "[buffer]\nmax_per_region = 1000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("ridefleet.local.toml"),
            "[buffer]\nmax_per_region = 50\n",
        )
        .unwrap();

        let config = ConfigLoader::new().with_project_dir(dir.path()).load().unwrap();
        assert_eq!(config.buffer.max_per_region, 50);
    }
}
