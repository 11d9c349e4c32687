//! ASCII tabular output reader
//!
//! Reads the whitespace-separated text output format: a free-form header
//! preamble, a channel-name row, a units row, then one row of samples per
//! time step.

use std::path::Path;

use super::{OutputData, OutputError, OutputLoader};

/// Loader for text-format output files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextOutputLoader;

impl TextOutputLoader {
    pub fn new() -> Self {
        Self
    }
}

impl OutputLoader for TextOutputLoader {
    fn load(&self, path: &Path) -> Result<OutputData, OutputError> {
        if !path.is_file() {
            return Err(OutputError::Missing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        parse(&content, path)
    }
}

fn parse(content: &str, path: &Path) -> Result<OutputData, OutputError> {
    let format_err = |reason: String| OutputError::Format {
        path: path.to_path_buf(),
        reason,
    };

    let lines: Vec<&str> = content.lines().collect();

    // The first row whose every field is numeric marks the start of the
    // data block; the two rows above it are channel names and units.
    let first_data = lines
        .iter()
        .position(|line| is_data_row(line))
        .ok_or_else(|| format_err("no numeric data rows".to_string()))?;
    if first_data < 2 {
        return Err(format_err("missing channel name and unit rows".to_string()));
    }

    let channels: Vec<String> = lines[first_data - 2]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if channels.is_empty() {
        return Err(format_err("empty channel name row".to_string()));
    }

    let mut series: Vec<Vec<f64>> = vec![Vec::new(); channels.len()];
    for (offset, line) in lines[first_data..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let row: Vec<&str> = line.split_whitespace().collect();
        if row.len() != channels.len() {
            return Err(format_err(format!(
                "data row {} has {} values, expected {}",
                first_data + offset + 1,
                row.len(),
                channels.len()
            )));
        }

        for (column, field) in row.into_iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| {
                format_err(format!(
                    "non-numeric value {field:?} in data row {}",
                    first_data + offset + 1
                ))
            })?;
            series[column].push(value);
        }
    }

    Ok(OutputData::new(channels, series))
}

fn is_data_row(line: &str) -> bool {
    let mut fields = line.split_whitespace().peekable();
    fields.peek().is_some() && fields.all(|field| field.parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
Predictions were generated by the simulation driver
description line

Time      RootFxr     RootFyr
(s)       (N)         (N)
0.0       100.0       -5.0
0.1       101.5       -4.5
0.2       103.0       -4.0
";

    fn write_sample(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bd_driver.out");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_channels_and_samples() {
        let (_dir, path) = write_sample(SAMPLE);
        let data = TextOutputLoader::new().load(&path).unwrap();

        assert_eq!(data.channels(), ["Time", "RootFxr", "RootFyr"]);
        assert_eq!(data.n_channels(), 3);
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.series(1), [100.0, 101.5, 103.0]);
        assert_eq!(data.series(2)[2], -4.0);
    }

    #[test]
    fn missing_file_is_distinguished_from_malformed() {
        let dir = tempdir().unwrap();
        let result = TextOutputLoader::new().load(&dir.path().join("absent.out"));
        assert!(matches!(result, Err(OutputError::Missing(_))));
    }

    #[test]
    fn file_without_data_rows_is_a_format_error() {
        let (_dir, path) = write_sample("header only\nno data here\n");
        let result = TextOutputLoader::new().load(&path);
        assert!(matches!(result, Err(OutputError::Format { .. })));
    }

    #[test]
    fn ragged_rows_are_a_format_error() {
        let ragged = "\
header
Time      RootFxr
(s)       (N)
0.0       100.0
0.1
";
        let (_dir, path) = write_sample(ragged);
        let result = TextOutputLoader::new().load(&path);
        assert!(matches!(result, Err(OutputError::Format { .. })));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let (_dir, path) = write_sample(&format!("{SAMPLE}\n\n"));
        let data = TextOutputLoader::new().load(&path).unwrap();
        assert_eq!(data.n_samples(), 3);
    }
}
