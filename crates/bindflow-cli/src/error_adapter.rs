//! Error adapter for converting BindflowError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use bindflow::{BindflowError, render::RenderError};

/// Adapter for [`BindflowError`] values.
///
/// Bindflow errors carry no source spans, so the adapter contributes an
/// error code and, where a fix is known, help text.
pub struct ErrorAdapter<'a>(pub &'a BindflowError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            BindflowError::Validation(_) => "bindflow::validation",
            BindflowError::NotFound { .. } => "bindflow::not_found",
            BindflowError::Io { .. } => "bindflow::io",
            BindflowError::Render(_) => "bindflow::render",
            BindflowError::NoResults { .. } => "bindflow::no_results",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            BindflowError::NoResults { .. } => {
                "run with --list-exchanges to see the exchanges in the snapshot"
            }
            BindflowError::Render(RenderError::Spawn { .. }) => {
                "install the Mermaid CLI (mmdc) or set `render.program` in the configuration"
            }
            BindflowError::Render(RenderError::Failed { .. }) => {
                "pass --no-render to keep the Mermaid source without images"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
