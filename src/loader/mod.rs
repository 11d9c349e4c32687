//! Output loading
//!
//! Narrow seam between the harness and the output-file parser. The core
//! treats a loaded output opaquely: a matrix of time samples by channels
//! plus ordered channel names.

mod text;

pub use text::TextOutputLoader;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::Category;
use crate::workspace::WorkspaceLayout;

/// Output loading errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("output file not found: {0}")]
    Missing(PathBuf),

    #[error("unreadable output file {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Time-series output of one case: ordered channel names plus one sample
/// series per channel.
#[derive(Clone, Debug)]
pub struct OutputData {
    channels: Vec<String>,
    series: Vec<Vec<f64>>,
}

impl OutputData {
    /// `series` is channel-major and must carry one entry per channel.
    pub fn new(channels: Vec<String>, series: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(channels.len(), series.len());
        Self { channels, series }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn n_samples(&self) -> usize {
        self.series.first().map(Vec::len).unwrap_or(0)
    }

    pub fn series(&self, channel: usize) -> &[f64] {
        &self.series[channel]
    }
}

/// Converts an output file into a channel matrix plus channel metadata.
pub trait OutputLoader {
    fn load(&self, path: &Path) -> Result<OutputData, OutputError>;
}

/// The (local, baseline) output files compared for one case.
///
/// Linear cases have no supported output reader yet and yield `None`; such
/// a case surfaces as skipped, never as silently passed.
pub fn output_pair(layout: &WorkspaceLayout) -> Option<(PathBuf, PathBuf)> {
    let file = match layout.category {
        Category::Regression => format!("{}.outb", layout.case),
        Category::Beamdyn => "bd_driver.out".to_string(),
        Category::Linear => return None,
    };

    Some((
        layout.build_dir.join(&file),
        layout.baseline_dir.join(&file),
    ))
}
