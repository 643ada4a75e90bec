//! Configuration file loading for gesso.
//!
//! Reads `gesso.config.json` from the current working directory, or an
//! explicit path given on the command line.

use serde::{Deserialize, Serialize};
use std::path::Path;

use gesso_carton::String;
use gesso_relief::{CompatConfig, ParserOptions, WhitespaceStrategy};

use crate::error::CliError;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gesso.config.json";

/// Top-level gesso configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GessoConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<std::string::String>,

    /// Parser configuration.
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Which platform rules the parser applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Platform-neutral rules only
    Base,
    /// Browser rules: void tags, namespaces, raw text elements, HTML entities
    #[default]
    Dom,
}

/// Configuration for the parser.
///
/// Every field is optional; unset fields keep the preset's value.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    #[serde(default)]
    pub preset: Preset,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiters: Option<(String, String)>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<WhitespaceStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compat: Option<CompatConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl ParserConfig {
    /// Parser options for the configured preset with every set field applied.
    pub fn to_options(&self) -> ParserOptions {
        let mut options = match self.preset {
            Preset::Base => ParserOptions::default(),
            Preset::Dom => gesso_atelier_dom::parser_options(),
        };
        if let Some(delimiters) = &self.delimiters {
            options.delimiters = delimiters.clone();
        }
        if let Some(whitespace) = self.whitespace {
            options.whitespace = whitespace;
        }
        if let Some(comments) = self.comments {
            options.comments = comments;
        }
        if let Some(compat) = &self.compat {
            options.compat = Some(compat.clone());
        }
        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
        }
        options
    }
}

/// Load `gesso.config.json` from the given directory (or CWD if None).
///
/// A missing file yields the defaults. An unreadable or malformed file is
/// reported and also yields the defaults.
pub fn load_config(dir: Option<&Path>) -> GessoConfig {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no config file");
        return GessoConfig::default();
    }

    match load_config_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            GessoConfig::default()
        }
    }
}

/// Load a config file named explicitly. Any failure is an error.
pub fn load_config_file(path: &Path) -> Result<GessoConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&content).map_err(|e| CliError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
