//! Generator configuration
//!
//! Read from an `httpbind.toml` file that usually sits next to the model:
//!
//! ```toml
//! output_dir = "src/transport"
//! runtime_crate = "httpbind::runtime"
//!
//! [openapi]
//! enabled = true
//! versions = ["v2", "v3"]
//! formats = ["json", "yaml"]
//!
//! [emit]
//! server = true
//! client = false
//! ```
//!
//! Every key is optional.

use crate::codegen::CodegenOptions;
use crate::openapi::{DocumentFormat, DocumentVersion};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up next to the model.
pub const CONFIG_FILE_NAME: &str = "httpbind.toml";

/// Generator configuration loaded from `httpbind.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory generated files are written to
    pub output_dir: PathBuf,
    /// Path generated code imports the runtime from
    pub runtime_crate: String,
    pub openapi: OpenApiConfig,
    pub emit: EmitConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("gen"),
            runtime_crate: "httpbind::runtime".to_string(),
            openapi: OpenApiConfig::default(),
            emit: EmitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpenApiConfig {
    pub enabled: bool,
    pub versions: Vec<DocumentVersion>,
    pub formats: Vec<DocumentFormat>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            versions: vec![DocumentVersion::V2, DocumentVersion::V3],
            formats: vec![DocumentFormat::Json, DocumentFormat::Yaml],
        }
    }
}

/// Which sides of the transport to generate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmitConfig {
    pub server: bool,
    pub client: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            server: true,
            client: true,
        }
    }
}

impl GeneratorConfig {
    /// Code generator options derived from this configuration. Modules are
    /// written directly under `output_dir`.
    #[must_use]
    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            runtime_crate: self.runtime_crate.clone(),
            module_dir: String::new(),
            emit_server: self.emit.server,
            emit_client: self.emit.client,
        }
    }
}

/// Load a configuration file
///
/// Returns `Ok(None)` when the file does not exist and an error when it
/// exists but cannot be read or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read generator config: {}", config_path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse generator config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// `httpbind.toml` in the model's directory, if it exists.
#[must_use]
pub fn auto_detect_config_path(model_path: &Path) -> Option<PathBuf> {
    let path = model_path.parent()?.join(CONFIG_FILE_NAME);
    path.exists().then_some(path)
}

/// Resolve the configuration path
///
/// Priority:
/// 1. Explicitly provided path (via CLI), when it exists
/// 2. Auto-detected alongside the model
/// 3. None (defaults apply)
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>, model_path: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }
    auto_detect_config_path(model_path)
}

/// Configuration for a model: the resolved file, or defaults.
pub fn load_for_model(
    explicit_path: Option<&Path>,
    model_path: &Path,
) -> anyhow::Result<GeneratorConfig> {
    match resolve_config_path(explicit_path, model_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading generator config");
            Ok(load_config(&path)?.unwrap_or_default())
        }
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: GeneratorConfig = toml::from_str(
            r#"
runtime_crate = "crate::rt"

[openapi]
versions = ["v3"]

[emit]
client = false
"#,
        )
        .unwrap();
        assert_eq!(config.runtime_crate, "crate::rt");
        assert_eq!(config.output_dir, PathBuf::from("gen"));
        assert_eq!(config.openapi.versions, vec![DocumentVersion::V3]);
        assert_eq!(config.openapi.formats.len(), 2);
        assert!(config.openapi.enabled);
        assert!(config.emit.server);
        assert!(!config.emit.client);

        let options = config.codegen_options();
        assert_eq!(options.runtime_crate, "crate::rt");
        assert!(!options.emit_client);
    }

    #[test]
    fn explicit_path_wins_over_detected() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("api.yaml");
        let detected = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&detected, "runtime_crate = \"a\"\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "runtime_crate = \"b\"\n").unwrap();

        assert_eq!(resolve_config_path(None, &model), Some(detected.clone()));
        assert_eq!(resolve_config_path(Some(&explicit), &model), Some(explicit.clone()));
        let missing = dir.path().join("missing.toml");
        assert_eq!(resolve_config_path(Some(&missing), &model), Some(detected));

        let config = load_for_model(Some(&explicit), &model).unwrap();
        assert_eq!(config.runtime_crate, "b");
    }
}
