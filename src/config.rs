//! Bridge configuration file.
//!
//! The configuration is optional. When present it declares the compiler
//! plugins to run and tunes how their diagnostics are picked up.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::PLUGIN_DIAGNOSTIC_CODE;
use crate::project::{CommandPlugin, CompilerPlugin};

/// Configuration file names searched for in the project directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["bridge.yaml", ".bridge.yaml"];

/// Top-level bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BridgeConfig {
    /// External plugins run on every module.
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    /// Code marking plugin-origin diagnostics (default: SCAN_TOOL_DIAGNOSTICS)
    #[serde(default)]
    pub diagnostic_code: Option<String>,
    /// Glob patterns of documents to skip, relative to the project root
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Whether to report the placeholder local issue (default: true)
    #[serde(default)]
    pub local_check: Option<bool>,
}

/// An out-of-process compiler plugin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl BridgeConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BridgeConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a configuration file in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn diagnostic_code(&self) -> &str {
        self.diagnostic_code
            .as_deref()
            .unwrap_or(PLUGIN_DIAGNOSTIC_CODE)
    }

    pub fn local_check(&self) -> bool {
        self.local_check.unwrap_or(true)
    }

    /// Build the configured plugins.
    pub fn plugins(&self) -> Vec<Box<dyn CompilerPlugin>> {
        self.plugins
            .iter()
            .map(|p| {
                Box::new(CommandPlugin::new(&p.name, &p.command, p.args.clone()))
                    as Box<dyn CompilerPlugin>
            })
            .collect()
    }

    /// Compile `excluded_paths`, or `None` when there are none.
    pub fn exclusions(&self) -> anyhow::Result<Option<GlobSet>> {
        if self.excluded_paths.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Some(builder.build()?))
    }
}

/// Validate a configuration.
pub fn validate(config: &BridgeConfig) -> anyhow::Result<()> {
    if let Some(code) = &config.diagnostic_code {
        if code.trim().is_empty() {
            anyhow::bail!("diagnostic_code must not be empty");
        }
    }

    for (i, plugin) in config.plugins.iter().enumerate() {
        if plugin.name.trim().is_empty() {
            anyhow::bail!("plugin #{} has no name", i + 1);
        }
        if plugin.command.trim().is_empty() {
            anyhow::bail!("plugin {:?} has no command", plugin.name);
        }
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
