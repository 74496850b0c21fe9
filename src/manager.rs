use crate::config::Config;
use crate::scales::{Correlator, IntegralScales, integral_scales};
use crate::series::Series;
use crate::stats::turbulence_intensity;
use crate::table::{Metrics, Record, save_results};
use anyhow::{Context, Result, bail};
use glob::{MatchOptions, Pattern, glob_with};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
    correlator: Box<dyn Correlator>,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P, cfg: Config) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            bail!("{data_dir:?} is not a valid directory");
        }

        cfg.validate().context("failed to validate cfg")?;
        log::info!("{cfg:#?}");

        let correlator = cfg.analysis.backend.correlator();

        Ok(Self {
            data_dir,
            cfg,
            correlator,
        })
    }

    /// Analyze every data file in the directory and save the result table.
    pub fn run_batch(&self) -> Result<Vec<Record>> {
        let start = Instant::now();

        let files = self.data_files().context("failed to list data files")?;
        if files.is_empty() {
            log::warn!(
                "no *.{} files found in {:?}",
                self.cfg.input.suffix,
                self.data_dir
            );
        } else {
            log::info!("processing {} files in {:?}", files.len(), self.data_dir);
        }

        let mut records = Vec::with_capacity(files.len());
        for (i_file, file) in files.iter().enumerate() {
            let record = self.analyze_file(file);
            for msg in record.errors() {
                log::warn!("{}: {msg}", record.file);
            }
            records.push(record);

            let progress = 100.0 * (i_file + 1) as f64 / files.len() as f64;
            log::info!("completed {progress:06.2}%");
        }

        let output_file = &self.cfg.output.file;
        save_results(&records, output_file).context("failed to save results")?;

        let n_invalid = records.iter().filter(|rec| !rec.is_valid()).count();
        log::info!(
            "processed {} files ({} invalid) in {:.2} s, results saved to {output_file:?}",
            records.len(),
            n_invalid,
            start.elapsed().as_secs_f64()
        );

        Ok(records)
    }

    /// Analyze a single file; failures are kept inside the [`Record`].
    pub fn analyze_file(&self, file: &Path) -> Record {
        let start = Instant::now();
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        let metrics = Series::from_file(file, self.cfg.input.skip_rows).map(|series| {
            let intensity = turbulence_intensity(&series.speed);
            let scales = integral_scales(&series, self.correlator.as_ref());
            if let Ok(scales) = &scales {
                self.check_sampling(&name, scales);
            }
            Metrics { intensity, scales }
        });

        Record {
            file: name,
            metrics,
            elapsed_s: start.elapsed().as_secs_f64(),
        }
    }

    fn check_sampling(&self, name: &str, scales: &IntegralScales) {
        let tol = self.cfg.analysis.dt_tolerance;
        if scales.dt_deviation > tol {
            log::warn!(
                "{name}: sampling is not uniform (max step deviation {:.3} > {tol} of dt = {})",
                scales.dt_deviation,
                scales.dt
            );
        }
    }

    fn data_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.data_dir.to_str().context("data dir is not valid UTF-8")?;
        let pattern = Path::new(&Pattern::escape(dir)).join(format!("*.{}", self.cfg.input.suffix));
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let mut files: Vec<_> = glob_with(pattern, options)
            .context("failed to glob data files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }
}
