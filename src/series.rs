//! Wind-speed time series and its text loader.

use crate::error::AnalysisError;
use std::{fs, path::Path};

/// Time/speed samples read from one measurement file.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Sample times in seconds.
    pub time: Vec<f64>,
    /// Instantaneous wind speed.
    pub speed: Vec<f64>,
}

impl Series {
    /// Load a [`Series`] from a whitespace-delimited two-column text file.
    ///
    /// The first `skip_rows` lines are discarded. After that, lines that do not
    /// parse are ignored until the first sample is found; once samples have
    /// started, the first non-numeric line ends the data block. Numeric lines
    /// without exactly two tokens are skipped.
    ///
    /// # Errors
    /// Returns [`AnalysisError::FileRead`] if the file cannot be read and
    /// [`AnalysisError::DataFormat`] if fewer than 2 samples are found or a
    /// sample is not finite.
    pub fn from_file<P: AsRef<Path>>(file: P, skip_rows: usize) -> Result<Self, AnalysisError> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).map_err(|source| AnalysisError::FileRead {
            path: file.to_path_buf(),
            source,
        })?;

        let format_error = |reason: String| AnalysisError::DataFormat {
            path: file.to_path_buf(),
            reason,
        };

        let mut time = Vec::new();
        let mut speed = Vec::new();

        for (i_line, line) in contents.lines().enumerate().skip(skip_rows) {
            let vals: Result<Vec<f64>, _> = line.split_whitespace().map(str::parse).collect();
            let vals = match vals {
                Ok(vals) => vals,
                Err(_) if time.is_empty() => continue,
                Err(_) => break,
            };
            if vals.len() != 2 {
                continue;
            }
            if vals.iter().any(|val| !val.is_finite()) {
                return Err(format_error(format!(
                    "non-finite value on line {}",
                    i_line + 1
                )));
            }
            time.push(vals[0]);
            speed.push(vals[1]);
        }

        let n_samples = time.len();
        if n_samples < 2 {
            return Err(format_error(format!(
                "need at least 2 two-column samples after skipping {skip_rows} lines, found {n_samples}"
            )));
        }

        Ok(Self { time, speed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("failed to write temp file");
        file
    }

    #[test]
    fn skips_header_rows() {
        let file = write_tmp("# station 4\n1.0 2.0\n0.0 5.0\n0.5 6.0\n1.0 7.0\n");
        let series = Series::from_file(file.path(), 2).unwrap();
        assert_eq!(series.time, vec![0.0, 0.5, 1.0]);
        assert_eq!(series.speed, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn tolerates_metadata_before_data() {
        let file = write_tmp("Probe: CTA\nRate: 2 kHz\n\n0.0 5.0\n0.5 6.0\n");
        let series = Series::from_file(file.path(), 0).unwrap();
        assert_eq!(series.time.len(), 2);
    }

    #[test]
    fn stops_at_trailing_text() {
        let file = write_tmp("0.0 5.0\n0.5 6.0\nEND OF DATA\n1.0 7.0\n");
        let series = Series::from_file(file.path(), 0).unwrap();
        assert_eq!(series.speed, vec![5.0, 6.0]);
    }

    #[test]
    fn ignores_lines_with_wrong_column_count() {
        let file = write_tmp("0.0 5.0\n0.5 6.0 1.0\n1.0\n1.5 7.0\n");
        let series = Series::from_file(file.path(), 0).unwrap();
        assert_eq!(series.time, vec![0.0, 1.5]);
    }

    #[test]
    fn single_column_is_format_error() {
        let file = write_tmp("0.0\n0.5\n1.0\n");
        let err = Series::from_file(file.path(), 0).unwrap_err();
        assert!(matches!(err, AnalysisError::DataFormat { .. }));
    }

    #[test]
    fn one_sample_is_format_error() {
        let file = write_tmp("0.0 5.0\n");
        let err = Series::from_file(file.path(), 0).unwrap_err();
        assert!(matches!(err, AnalysisError::DataFormat { .. }));
    }

    #[test]
    fn non_finite_is_format_error() {
        let file = write_tmp("0.0 5.0\n0.5 NaN\n");
        let err = Series::from_file(file.path(), 0).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Series::from_file("/nonexistent/turbscale/series.txt", 0).unwrap_err();
        assert!(matches!(err, AnalysisError::FileRead { .. }));
    }
}
