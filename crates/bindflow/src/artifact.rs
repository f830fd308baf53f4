//! Persisted pipeline artifacts.
//!
//! Every artifact lives directly under one output root and is addressed by
//! a caller-chosen base name plus an extension fixed by its [`ArtifactKind`].
//! Base names are sanitized with [`artifact_name`] before use, so a name
//! can never escape the root.
//!
//! Writers targeting the same name race with last-writer-wins semantics;
//! no locking is performed.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use bindflow_core::{identifier::artifact_name, record::MatchResult};

use crate::{BindflowError, render::RenderFormat};

/// The kinds of file the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Ordered match results (`.json`).
    Results,
    /// Textual graph source (`.mmd`).
    GraphSource,
    /// Rendered image in the given format.
    Image(RenderFormat),
}

impl ArtifactKind {
    /// Returns the file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Results => "json",
            Self::GraphSource => "mmd",
            Self::Image(format) => format.extension(),
        }
    }
}

/// A directory that holds named artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path an artifact of `kind` named `name` lives at.
    pub fn path_for(&self, name: &str, kind: ArtifactKind) -> PathBuf {
        self.root
            .join(format!("{}.{}", artifact_name(name), kind.extension()))
    }

    /// Creates the root directory if it does not exist yet.
    ///
    /// Safe to call concurrently; a directory created by someone else in
    /// the meantime is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BindflowError::Io`] if the directory cannot be created.
    pub fn ensure_root(&self) -> Result<(), BindflowError> {
        if self.root.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.root)
            .map_err(|err| BindflowError::io("creating directory", &self.root, err))?;
        info!(path = self.root.display().to_string(); "Created output directory");
        Ok(())
    }

    /// Writes `contents` as the artifact `name` of `kind`, returning its path.
    ///
    /// # Errors
    ///
    /// Returns [`BindflowError::Io`] if the root cannot be created or the
    /// file cannot be written.
    pub fn write(
        &self,
        name: &str,
        kind: ArtifactKind,
        contents: &str,
    ) -> Result<PathBuf, BindflowError> {
        self.ensure_root()?;

        let path = self.path_for(name, kind);
        fs::write(&path, contents).map_err(|err| BindflowError::io("writing", &path, err))?;
        debug!(path = path.display().to_string(), bytes = contents.len(); "Artifact written");

        Ok(path)
    }

    /// Persists match results as a two-space indented JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`BindflowError::Io`] if serialization or the write fails.
    pub fn write_results(
        &self,
        name: &str,
        results: &[MatchResult],
    ) -> Result<PathBuf, BindflowError> {
        let path = self.path_for(name, ArtifactKind::Results);
        let json = serde_json::to_string_pretty(results)
            .map_err(|err| BindflowError::io("serializing results for", &path, err.into()))?;

        self.write(name, ArtifactKind::Results, &json)
    }

    /// Reads a results file stored directly under the root.
    ///
    /// `file_name` is taken as given (for example `flowchart.json`), but
    /// may not point outside the root.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::Validation`] if `file_name` is not a plain file
    ///   name or the file is not a results array.
    /// - [`BindflowError::NotFound`] if the file does not exist.
    /// - [`BindflowError::Io`] if the file cannot be read.
    pub fn read_results(&self, file_name: &str) -> Result<Vec<MatchResult>, BindflowError> {
        let path = self.stored_path(file_name)?;

        let text = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => BindflowError::not_found(&path),
            _ => BindflowError::io("reading", &path, err),
        })?;

        serde_json::from_str(&text).map_err(|err| {
            BindflowError::validation(format!(
                "{} is not a match results array: {err}",
                path.display()
            ))
        })
    }

    fn stored_path(&self, file_name: &str) -> Result<PathBuf, BindflowError> {
        let candidate = Path::new(file_name);
        match candidate.file_name() {
            Some(name) if name == candidate.as_os_str() => Ok(self.root.join(name)),
            _ => Err(BindflowError::validation(format!(
                "expected a file name inside the output directory, got `{file_name}`"
            ))),
        }
    }
}
