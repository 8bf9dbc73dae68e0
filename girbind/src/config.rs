//! Configuration types for `girbind.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub output: OutputConfig,
    /// Additional directories searched when resolving GIR file paths, tried
    /// in order after `base_dir` (the TOML file's parent directory).
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// GLib shared library used for GError descriptors on throwing calls.
    /// Required as soon as any loaded namespace declares a throwing
    /// callable.
    #[serde(default)]
    pub glib_library: Option<String>,
    /// Qualified name of the root widget class for widget-metadata
    /// detection.
    #[serde(default = "default_widget_root")]
    pub widget_root: String,
    #[serde(default, rename = "namespace")]
    pub namespaces: Vec<NamespaceConfig>,
}

/// Output settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory generated namespaces are written into (one subdirectory
    /// per namespace).
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Module specifier the fixed runtime contract is imported from.
    #[serde(default = "default_runtime_module")]
    pub runtime: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_runtime_module() -> String {
    "../runtime.js".to_string()
}

fn default_widget_root() -> String {
    "Gtk.Widget".to_string()
}

/// One GIR document to load.
#[derive(Debug, Deserialize)]
pub struct NamespaceConfig {
    /// Path to the `.gir` file, resolved through `include_paths`.
    pub gir: PathBuf,
    /// Whether to emit bindings for this namespace, or only load it for
    /// cross-namespace resolution.
    #[serde(default = "default_true")]
    pub generate: bool,
}

fn default_true() -> bool {
    true
}

/// Resolve a GIR path by searching `base_dir` first, then each
/// `include_paths` entry. Absolute paths are returned as-is. If the file is
/// not found anywhere, falls back to `base_dir.join(path)` so the caller
/// gets a meaningful I/O error.
pub fn resolve_gir(path: &Path, base_dir: &Path, include_paths: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = base_dir.join(path);
    if candidate.exists() {
        return candidate;
    }
    for inc in include_paths {
        let candidate = inc.join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    base_dir.join(path)
}

/// Load and parse a `girbind.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
