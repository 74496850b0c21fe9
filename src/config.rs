use crate::scales::Backend;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path, path::PathBuf};

/// Batch configuration.
///
/// Loaded from an optional TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Extension of the measurement files, without the dot.
    pub suffix: String,
    /// Header lines discarded before parsing.
    pub skip_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            suffix: "txt".to_string(),
            skip_rows: 0,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub backend: Backend,
    /// Relative deviation of a sampling step from the mean step above which a
    /// warning is logged.
    pub dt_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Direct,
            dt_tolerance: 0.01,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("results.xlsx"),
        }
    }
}

/// Supported result table formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str());
        match ext.map(str::to_ascii_lowercase).as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => bail!("output file must end in .xlsx or .csv, but is {path:?}"),
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_suffix(&self.input.suffix).context("invalid input suffix")?;
        check_num(self.input.skip_rows, 0..1_000_000).context("invalid number of skipped rows")?;

        check_num(self.analysis.dt_tolerance, 0.0..=1.0)
            .context("invalid sampling interval tolerance")?;

        OutputFormat::from_path(&self.output.file).context("invalid output file")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_suffix(suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        bail!("suffix must not be empty");
    }
    if suffix
        .chars()
        .any(|c| c == '.' || c == '/' || c == '\\' || c == '*' || c == '?' || c == '[')
    {
        bail!("suffix must be a bare extension, but is {suffix:?}");
    }
    Ok(())
}
