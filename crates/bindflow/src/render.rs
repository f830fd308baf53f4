//! Diagram rendering through an external engine.
//!
//! Images are produced by a separate process (the Mermaid CLI by default)
//! that reads the `.mmd` graph source and writes one image per invocation.
//! Process execution goes through the [`CommandRunner`] trait so callers
//! can substitute a deterministic implementation.
//!
//! The process's own exit status decides success. Diagnostics it prints on
//! stderr are logged as warnings unless they carry the engine's completion
//! marker, and never turn a successful run into a failure.

use std::{
    ffi::{OsStr, OsString},
    fmt, io,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    BindflowError,
    artifact::{ArtifactKind, ArtifactStore},
    config::RenderConfig,
};

/// Marker the renderer prints on stderr when it finishes normally.
const COMPLETION_MARKER: &str = "Done";

/// Image format produced by one renderer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Vector output.
    Svg,
    /// Raster output.
    Png,
}

impl RenderFormat {
    /// Returns the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// Returns `true` for raster formats, which honor the scale option.
    pub fn is_raster(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What a finished process reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    success: bool,
    code: Option<i32>,
    stderr: String,
}

impl CommandOutput {
    /// Creates an output for a process that exited successfully.
    pub fn succeeded(stderr: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: stderr.into(),
        }
    }

    /// Creates an output for a process that failed.
    ///
    /// `code` is `None` when the process was terminated without an exit
    /// code, for example by a signal.
    pub fn failed(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

/// Runs external commands to completion.
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the process could not be started.
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] that spawns real operating-system processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let output = Command::new(invocation.program())
            .args(invocation.args())
            .output()?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if output.status.success() {
            Ok(CommandOutput::succeeded(stderr))
        } else {
            Ok(CommandOutput::failed(output.status.code(), stderr))
        }
    }
}

/// Failures of the external renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start `{invocation}`: {source}")]
    Spawn {
        invocation: Invocation,
        #[source]
        source: io::Error,
    },

    #[error("`{invocation}` {}: {}", exit_description(.code), .stderr.trim())]
    Failed {
        invocation: Invocation,
        code: Option<i32>,
        stderr: String,
    },
}

impl RenderError {
    /// Returns the command that was attempted.
    pub fn invocation(&self) -> &Invocation {
        match self {
            Self::Spawn { invocation, .. } | Self::Failed { invocation, .. } => invocation,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated".to_string(),
    }
}

/// Renders graph sources stored in an [`ArtifactStore`] into images.
pub struct Renderer<'a> {
    store: &'a ArtifactStore,
    config: &'a RenderConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer writing into `store` with the given options.
    pub fn new(
        store: &'a ArtifactStore,
        config: &'a RenderConfig,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            store,
            config,
            runner,
        }
    }

    /// Builds the renderer command for one image.
    pub fn invocation(&self, source: &Path, destination: &Path, format: RenderFormat) -> Invocation {
        let mut invocation = Invocation::new(self.config.program())
            .arg("-i")
            .arg(source)
            .arg("-o")
            .arg(destination);

        if let Some(path) = self.config.puppeteer_config() {
            invocation = invocation.arg("--puppeteerConfigFile").arg(path);
        }
        if let Some(scale) = self.config.scale().filter(|_| format.is_raster()) {
            invocation = invocation.arg("--scale").arg(scale.to_string());
        }
        if let Some(width) = self.config.width() {
            invocation = invocation.arg("--width").arg(width.to_string());
        }
        if let Some(height) = self.config.height() {
            invocation = invocation.arg("--height").arg(height.to_string());
        }

        invocation
    }

    /// Renders `source` into the `format` image artifact named `name`.
    ///
    /// Returns the path of the produced image. A failed run leaves whatever
    /// the renderer wrote in place.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::NotFound`] if `source` does not exist.
    /// - [`BindflowError::Io`] if the output root cannot be created.
    /// - [`BindflowError::Render`] if the process cannot be started or
    ///   reports failure.
    pub fn render(
        &self,
        source: &Path,
        name: &str,
        format: RenderFormat,
    ) -> Result<PathBuf, BindflowError> {
        if !source.exists() {
            return Err(BindflowError::not_found(source));
        }
        self.store.ensure_root()?;

        let destination = self.store.path_for(name, ArtifactKind::Image(format));
        let invocation = self.invocation(source, &destination, format);
        debug!(format:%, command = invocation.to_string(); "Executing renderer");

        let output = self
            .runner
            .run(&invocation)
            .map_err(|source| RenderError::Spawn {
                invocation: invocation.clone(),
                source,
            })?;

        if !output.success() {
            return Err(RenderError::Failed {
                invocation,
                code: output.code(),
                stderr: output.stderr().to_string(),
            }
            .into());
        }

        let stderr = output.stderr().trim();
        if !stderr.is_empty() && !stderr.contains(COMPLETION_MARKER) {
            warn!(format:%, stderr; "Renderer reported diagnostics");
        }

        info!(format:%, path = destination.display().to_string(); "Image generated");
        Ok(destination)
    }
}
