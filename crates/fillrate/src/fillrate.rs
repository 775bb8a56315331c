//! Main Fillrate struct and public API.

use std::io::{self, Write};

use tracing::info;

use crate::config::Configuration;
use crate::engine::{self, Evaluator, ProgressConfig};
use crate::error::{FillrateError, Result};
use crate::report::CompletenessReport;

/// Runs a configured completeness check.
pub struct Fillrate {
    config: Configuration,
    progress: ProgressConfig,
}

impl Fillrate {
    /// Create a checker with the default progress settings.
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            progress: ProgressConfig::default(),
        }
    }

    /// Change how progress is displayed.
    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Check the data file, drawing progress on stderr.
    pub fn run(&self) -> Result<CompletenessReport> {
        self.run_with_writer(io::stderr())
    }

    /// Check the data file, drawing progress on `writer`.
    ///
    /// The file is reopened for this pass; its header must still match the one
    /// the configuration was built from.
    pub fn run_with_writer<W: Write>(&self, writer: W) -> Result<CompletenessReport> {
        let source = self.config.source();
        let (headers, rows) = source.open()?;
        if headers != self.config.headers() {
            return Err(FillrateError::Config(format!(
                "header of '{}' changed since the configuration was built",
                source.path().display()
            )));
        }

        info!(
            path = %source.path().display(),
            combinations = self.config.combinations().len(),
            "checking completeness"
        );

        let evaluator = Evaluator::from_configuration(&self.config);
        let tally = engine::run(&evaluator, rows, &self.progress, writer)?;

        info!(rows = tally.total_rows, "completeness check finished");

        let metadata = source.metadata(headers.len())?;
        Ok(CompletenessReport::new(
            metadata,
            self.config.combinations(),
            &tally,
        ))
    }
}
