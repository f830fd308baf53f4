//! Bindflow - flow graphs from routing-binding snapshots.
//!
//! Matching, ordering, graph construction and rendering for routing
//! bindings grouped by exchange. A query runs as one chain:
//!
//! 1. **Read** the snapshot directory ([`source`])
//! 2. **Match** the exchange and persist ordered results ([`matcher`])
//! 3. **Build** Mermaid graph text and persist it ([`graph`])
//! 4. **Render** one image per configured format ([`render`])
//!
//! Every step writes its artifact under the configured output root before
//! the next one starts, so a failed render leaves the earlier artifacts in
//! place.

pub mod artifact;
pub mod config;
pub mod graph;
pub mod matcher;
pub mod render;
pub mod source;

mod error;

pub use bindflow_core::{identifier, record, version};

pub use error::BindflowError;

use std::{
    panic,
    path::{Path, PathBuf},
    thread,
};

use indexmap::IndexSet;
use log::{debug, info, trace};

use artifact::{ArtifactKind, ArtifactStore};
use config::AppConfig;
use graph::FlowGraph;
use matcher::ExchangeMatcher;
use record::MatchResult;
use render::{CommandRunner, ProcessRunner, RenderFormat, Renderer};
use source::SnapshotDir;

/// Paths of the artifacts produced by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    results: PathBuf,
    graph_source: PathBuf,
    images: Vec<(RenderFormat, PathBuf)>,
}

impl Artifacts {
    /// Path of the match results JSON.
    pub fn results(&self) -> &Path {
        &self.results
    }

    /// Path of the Mermaid graph source.
    pub fn graph_source(&self) -> &Path {
        &self.graph_source
    }

    /// Rendered images, in configured format order.
    pub fn images(&self) -> &[(RenderFormat, PathBuf)] {
        &self.images
    }

    /// Returns the image rendered in `format`, if any.
    pub fn image(&self, format: RenderFormat) -> Option<&Path> {
        self.images
            .iter()
            .find(|(candidate, _)| *candidate == format)
            .map(|(_, path)| path.as_path())
    }
}

/// Outcome of a flowchart run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowchartSummary {
    name: String,
    results: Vec<MatchResult>,
    skipped_documents: usize,
    skipped_records: usize,
    artifacts: Artifacts,
}

impl FlowchartSummary {
    /// The sanitized base name shared by all artifacts.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered match results the graph was built from.
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Number of snapshot documents that could not be loaded.
    pub fn skipped_documents(&self) -> usize {
        self.skipped_documents
    }

    /// Number of array elements dropped from otherwise loaded documents.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }
}

/// Builder for running the bindflow pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use bindflow::{FlowchartBuilder, config::AppConfig};
///
/// let config = AppConfig::default().with_json_dir("./snapshot");
/// let builder = FlowchartBuilder::new(config);
///
/// let summary = builder
///     .generate("orders", "orders-flow")
///     .expect("Failed to generate flowchart");
///
/// println!("{} results", summary.results().len());
/// ```
pub struct FlowchartBuilder {
    config: AppConfig,
    runner: Box<dyn CommandRunner>,
}

impl Default for FlowchartBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl FlowchartBuilder {
    /// Create a builder that renders by spawning real processes.
    pub fn new(config: AppConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }

    /// Create a builder that renders through `runner`.
    ///
    /// # Arguments
    ///
    /// * `config` - Directory and renderer configuration
    /// * `runner` - Executes renderer commands
    pub fn with_runner(config: AppConfig, runner: impl CommandRunner + 'static) -> Self {
        Self {
            config,
            runner: Box::new(runner),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the artifact store under the configured output root.
    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.config.directories().output())
    }

    /// Generate all artifacts for `exchange` under the base name `name`.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::Validation`] for an empty exchange or an empty
    ///   snapshot directory.
    /// - [`BindflowError::NotFound`] if the snapshot directory is missing.
    /// - [`BindflowError::NoResults`] if no binding matches; the empty
    ///   results file has been written at that point.
    /// - [`BindflowError::Io`] or [`BindflowError::Render`] from later steps.
    pub fn generate(&self, exchange: &str, name: &str) -> Result<FlowchartSummary, BindflowError> {
        matcher::validate_exchange(exchange)?;
        info!(exchange, name; "Generating flowchart");

        let report = SnapshotDir::new(self.config.directories().json()).read()?;
        let skipped_documents = report.skipped_count();
        let skipped_records = report.rejected_count();

        let store = self.store();
        let matcher = ExchangeMatcher::new(&store, name);
        let results = matcher.find(report.entries(), exchange)?;
        if results.is_empty() {
            return Err(BindflowError::NoResults {
                exchange: exchange.to_string(),
            });
        }

        let (graph_source, images) = self.build_diagrams(&store, name, &results)?;

        info!(exchange, results = results.len(); "Flowchart generated");
        Ok(FlowchartSummary {
            name: identifier::artifact_name(name),
            artifacts: Artifacts {
                results: matcher.results_path(),
                graph_source,
                images,
            },
            results,
            skipped_documents,
            skipped_records,
        })
    }

    /// Regenerate diagrams from a results file stored in the output root.
    ///
    /// The file stem of `file_name` becomes the base name for the new
    /// artifacts.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::NotFound`] if the file does not exist.
    /// - [`BindflowError::Validation`] if it is not a results array.
    /// - [`BindflowError::Io`] or [`BindflowError::Render`] from later steps.
    pub fn generate_from_json(&self, file_name: &str) -> Result<FlowchartSummary, BindflowError> {
        info!(file_name; "Generating diagrams from stored results");

        let store = self.store();
        let results = store.read_results(file_name)?;
        let name = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());

        let (graph_source, images) = self.build_diagrams(&store, &name, &results)?;

        info!(file_name, results = results.len(); "Diagrams generated");
        Ok(FlowchartSummary {
            name: identifier::artifact_name(&name),
            artifacts: Artifacts {
                results: store.root().join(file_name),
                graph_source,
                images,
            },
            results,
            skipped_documents: 0,
            skipped_records: 0,
        })
    }

    /// List the exchanges bound in the snapshot directory.
    ///
    /// # Errors
    ///
    /// Fails as reading the snapshot directory does.
    pub fn list_exchanges(&self, prefix: Option<&str>) -> Result<Vec<String>, BindflowError> {
        let report = SnapshotDir::new(self.config.directories().json()).read()?;
        let exchanges = source::list_exchanges(report.entries(), prefix);
        info!(count = exchanges.len(), prefix:?; "Listed exchanges");
        Ok(exchanges)
    }

    /// Writes the graph source and renders every configured image.
    fn build_diagrams(
        &self,
        store: &ArtifactStore,
        name: &str,
        results: &[MatchResult],
    ) -> Result<(PathBuf, Vec<(RenderFormat, PathBuf)>), BindflowError> {
        let graph = FlowGraph::from_results(results);
        debug!(edges = graph.edges().len(), nodes = graph.nodes().len(); "Graph built");

        let text = graph.to_mermaid();
        trace!(text = text.as_str(); "Graph source");
        let graph_source = store.write(name, ArtifactKind::GraphSource, &text)?;
        info!(path = graph_source.display().to_string(); "Graph source written");

        let images = if self.config.render().enabled() {
            self.render_images(store, &graph_source, name)?
        } else {
            debug!("Rendering disabled, skipping images");
            Vec::new()
        };

        Ok((graph_source, images))
    }

    /// Renders each configured format concurrently.
    ///
    /// All renders run to completion; the first failure in format order is
    /// returned.
    fn render_images(
        &self,
        store: &ArtifactStore,
        source: &Path,
        name: &str,
    ) -> Result<Vec<(RenderFormat, PathBuf)>, BindflowError> {
        let formats: IndexSet<RenderFormat> =
            self.config.render().formats().iter().copied().collect();
        let renderer = Renderer::new(store, self.config.render(), self.runner.as_ref());
        let renderer = &renderer;

        let outcomes: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = formats
                .iter()
                .map(|&format| scope.spawn(move || renderer.render(source, name, format)))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        formats
            .into_iter()
            .zip(outcomes)
            .map(|(format, outcome)| outcome.map(|path| (format, path)))
            .collect()
    }
}
