//! Project configuration
//!
//! Handles loading of `.cloneplan.yaml`, either from an explicit path or by
//! walking up from a start directory until one is found.

use crate::compile::CompileOptions;
use crate::error::{Error, Result};
use crate::render::{RenderConfig, Target};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file name
pub const CONFIG_FILE: &str = ".cloneplan.yaml";

/// Project configuration (`.cloneplan.yaml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "cloneplan project configuration")]
pub struct ProjectConfig {
    /// Schema version for migrations
    pub version: u32,

    /// Plan compilation settings
    #[serde(default)]
    pub compile: CompileOptions,

    /// Rendering settings
    #[serde(default)]
    pub render: RenderSettings,
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderSettings {
    /// Target languages to generate
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,

    /// Emit a provenance header
    #[serde(default = "default_true")]
    pub provenance: bool,

    /// Include a generation timestamp in the provenance header
    #[serde(default)]
    pub timestamp: bool,

    /// Emit doc comments on generated operations
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Directory with template overrides, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

fn default_targets() -> Vec<Target> {
    vec![Target::CSharp]
}

fn default_true() -> bool {
    true
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            provenance: true,
            timestamp: false,
            comments: true,
            template_dir: None,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: 1,
            compile: CompileOptions::default(),
            render: RenderSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Parse and validate config text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ProjectConfig = serde_norway::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        if config.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, config.version
            )));
        }
        Ok(config)
    }

    /// Load a config file; a relative `template_dir` resolves against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut config = Self::from_yaml(&content)?;

        if let (Some(dir), Some(base)) = (&config.render.template_dir, path.parent()) {
            if dir.is_relative() {
                config.render.template_dir = Some(base.join(dir));
            }
        }
        debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Find the nearest config walking up from `start_dir`
    pub fn discover(start_dir: &Path) -> Result<Option<Self>> {
        match find_config(start_dir)? {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Render configuration derived from the settings
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            comments: self.render.comments,
            provenance: self.render.provenance,
            timestamp: self.render.timestamp,
            template_dir: self.render.template_dir.clone(),
        }
    }
}

/// Path of the nearest `.cloneplan.yaml` at or above `start_dir`
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = start_dir.canonicalize().map_err(Error::Io)?;

    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::IgnorePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::from_yaml("version: 1\n").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.render.targets, vec![Target::CSharp]);
        assert_eq!(config.compile.operations.fast, "Clone");
    }

    #[test]
    fn test_full_config() {
        let config = ProjectConfig::from_yaml(
            r#"
version: 1
compile:
  ignore_policy: omit
  operations:
    fast: DeepCopy
render:
  targets: [csharp, typescript]
  timestamp: true
  comments: false
"#,
        )
        .unwrap();

        assert_eq!(config.compile.ignore_policy, IgnorePolicy::Omit);
        assert_eq!(config.compile.operations.fast, "DeepCopy");
        assert_eq!(config.compile.operations.safe, "CloneSafe");
        assert_eq!(config.render.targets.len(), 2);

        let render = config.render_config();
        assert!(render.timestamp);
        assert!(!render.comments);
        assert!(render.provenance);
    }

    #[test]
    fn test_unsupported_version() {
        let err = ProjectConfig::from_yaml("version: 2\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "version: 1\nrender:\n  template_dir: overrides\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config(&nested).unwrap().unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap().join(CONFIG_FILE));

        let config = ProjectConfig::discover(&nested).unwrap().unwrap();
        let template_dir = config.render.template_dir.unwrap();
        assert!(template_dir.ends_with("overrides"));
        assert!(template_dir.is_absolute());
    }
}
