//! Configuration types for the bindflow pipeline.
//!
//! This module provides configuration structures that control where
//! snapshots are read from, where artifacts are written and how the
//! external diagram renderer is invoked. All types implement
//! [`serde::Deserialize`] so they can be loaded from TOML, and every field
//! has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining directories and rendering.
//! - [`DirectoriesConfig`] - Snapshot input directory and artifact output root.
//! - [`RenderConfig`] - Renderer program, image formats and sizing options.
//!
//! # Example
//!
//! ```
//! # use bindflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.render().program(), "mmdc");
//! assert_eq!(config.render().scale(), Some(8));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::render::RenderFormat;

const DEFAULT_JSON_DIR: &str = "./json";
const DEFAULT_OUTPUT_DIR: &str = "./output";
const DEFAULT_PROGRAM: &str = "mmdc";
const DEFAULT_SCALE: u32 = 8;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Directory configuration section.
    #[serde(default)]
    directories: DirectoriesConfig,

    /// Renderer configuration section.
    #[serde(default)]
    render: RenderConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(directories: DirectoriesConfig, render: RenderConfig) -> Self {
        Self {
            directories,
            render,
        }
    }

    /// Returns the directory configuration.
    pub fn directories(&self) -> &DirectoriesConfig {
        &self.directories
    }

    /// Returns the renderer configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Replaces the snapshot input directory.
    pub fn with_json_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories.json = path.into();
        self
    }

    /// Replaces the artifact output root.
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories.output = path.into();
        self
    }

    /// Enables or disables image rendering.
    pub fn with_rendering(mut self, enabled: bool) -> Self {
        self.render.enabled = enabled;
        self
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    /// Directory holding the configuration snapshot documents.
    json: PathBuf,

    /// Root directory for every produced artifact.
    output: PathBuf,
}

impl DirectoriesConfig {
    /// Creates a new [`DirectoriesConfig`].
    ///
    /// # Arguments
    ///
    /// * `json` - Directory holding the snapshot documents.
    /// * `output` - Root directory for produced artifacts.
    pub fn new(json: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            json: json.into(),
            output: output.into(),
        }
    }

    pub fn json(&self) -> &Path {
        &self.json
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self::new(DEFAULT_JSON_DIR, DEFAULT_OUTPUT_DIR)
    }
}

/// Options passed to the external diagram renderer.
///
/// Nothing here is read from the environment; the renderer only sees what
/// is configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether images are produced at all.
    enabled: bool,

    /// Renderer executable, resolved through `PATH` when not absolute.
    program: String,

    /// Image formats to produce, in order.
    formats: Vec<RenderFormat>,

    /// Device scale factor, applied to raster output only.
    scale: Option<u32>,

    width: Option<u32>,

    height: Option<u32>,

    /// Browser sandbox configuration file handed to the renderer.
    puppeteer_config: Option<PathBuf>,
}

impl RenderConfig {
    /// Returns whether images should be produced.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the renderer executable.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the configured image formats.
    pub fn formats(&self) -> &[RenderFormat] {
        &self.formats
    }

    /// Returns the raster scale factor.
    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn puppeteer_config(&self) -> Option<&Path> {
        self.puppeteer_config.as_deref()
    }

    /// Replaces the renderer executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Replaces the list of image formats.
    pub fn with_formats(mut self, formats: impl Into<Vec<RenderFormat>>) -> Self {
        self.formats = formats.into();
        self
    }

    pub fn with_scale(mut self, scale: Option<u32>) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the requested image width and height.
    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_puppeteer_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.puppeteer_config = Some(path.into());
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: DEFAULT_PROGRAM.to_string(),
            formats: vec![RenderFormat::Svg, RenderFormat::Png],
            scale: Some(DEFAULT_SCALE),
            width: None,
            height: None,
            puppeteer_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.directories().json(), Path::new("./json"));
        assert_eq!(config.directories().output(), Path::new("./output"));
        assert!(config.render().enabled());
        assert_eq!(
            config.render().formats(),
            &[RenderFormat::Svg, RenderFormat::Png]
        );
        assert_eq!(config.render().width(), None);
        assert_eq!(config.render().puppeteer_config(), None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_json_dir("/data/snapshot")
            .with_output_dir("/data/out")
            .with_rendering(false);

        assert_eq!(config.directories().json(), Path::new("/data/snapshot"));
        assert_eq!(config.directories().output(), Path::new("/data/out"));
        assert!(!config.render().enabled());
    }

    #[test]
    fn test_render_builder() {
        let render = RenderConfig::default()
            .with_program("/usr/local/bin/mmdc")
            .with_formats([RenderFormat::Png])
            .with_scale(None)
            .with_size(Some(1200), None)
            .with_puppeteer_config("/app/puppeteer-config.json");

        assert_eq!(render.program(), "/usr/local/bin/mmdc");
        assert_eq!(render.formats(), &[RenderFormat::Png]);
        assert_eq!(render.scale(), None);
        assert_eq!(render.width(), Some(1200));
        assert_eq!(
            render.puppeteer_config(),
            Some(Path::new("/app/puppeteer-config.json"))
        );
    }
}
