//! Per-file results and their tabular export.

use crate::config::OutputFormat;
use crate::error::AnalysisError;
use crate::scales::IntegralScales;
use crate::stats::Intensity;
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use std::path::Path;

/// Cell content marking a metric that could not be computed.
pub const INVALID: &str = "invalid";

pub const COLUMNS: [&str; 10] = [
    "file",
    "status",
    "mean_speed",
    "std_dev",
    "turbulence_intensity",
    "dt",
    "time_scale",
    "length_scale",
    "elapsed_s",
    "error",
];

/// Metrics of a file whose series loaded.
#[derive(Debug)]
pub struct Metrics {
    pub intensity: Result<Intensity, AnalysisError>,
    pub scales: Result<IntegralScales, AnalysisError>,
}

/// Outcome of analyzing one measurement file.
#[derive(Debug)]
pub struct Record {
    pub file: String,
    pub metrics: Result<Metrics, AnalysisError>,
    pub elapsed_s: f64,
}

impl Record {
    pub fn is_valid(&self) -> bool {
        matches!(&self.metrics, Ok(m) if m.intensity.is_ok() && m.scales.is_ok())
    }

    fn status(&self) -> &'static str {
        if self.is_valid() { "ok" } else { INVALID }
    }

    /// Error messages of the row, empty when valid.
    pub fn errors(&self) -> Vec<String> {
        let metrics = match &self.metrics {
            Ok(metrics) => metrics,
            Err(err) => return vec![err.to_string()],
        };
        let mut msgs = Vec::new();
        if let Err(err) = &metrics.intensity {
            msgs.push(format!("intensity: {err}"));
        }
        if let Err(err) = &metrics.scales {
            msgs.push(format!("integral scales: {err}"));
        }
        msgs
    }

    /// Values of the row, `None` for an invalid metric.
    fn values(&self) -> [Option<f64>; 7] {
        let metrics = self.metrics.as_ref().ok();
        let intensity = metrics.and_then(|m| m.intensity.as_ref().ok());
        let scales = metrics.and_then(|m| m.scales.as_ref().ok());
        let mean_speed = intensity
            .map(|res| res.mean_speed)
            .or(scales.map(|res| res.mean_speed));
        [
            mean_speed,
            intensity.map(|res| res.std_dev),
            intensity.map(|res| res.intensity),
            scales.map(|res| res.dt),
            scales.map(|res| res.time_scale),
            scales.map(|res| res.length_scale),
            Some(self.elapsed_s),
        ]
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    file: &'a str,
    status: &'a str,
    mean_speed: String,
    std_dev: String,
    turbulence_intensity: String,
    dt: String,
    time_scale: String,
    length_scale: String,
    elapsed_s: String,
    error: String,
}

fn cell(val: Option<f64>) -> String {
    val.map_or_else(|| INVALID.to_string(), |val| val.to_string())
}

/// Write `records` to `file`, in the format implied by its extension.
///
/// An empty slice still produces a table with the header row.
pub fn save_results<P: AsRef<Path>>(records: &[Record], file: P) -> Result<()> {
    let file = file.as_ref();
    let res = match OutputFormat::from_path(file)? {
        OutputFormat::Xlsx => save_xlsx(records, file),
        OutputFormat::Csv => save_csv(records, file),
    };
    res.with_context(|| format!("failed to write {file:?}"))
}

fn save_csv(records: &[Record], file: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file).context("failed to create csv writer")?;

    if records.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for record in records {
        let [mean_speed, std_dev, intensity, dt, time_scale, length_scale, elapsed_s] =
            record.values();
        writer.serialize(CsvRow {
            file: &record.file,
            status: record.status(),
            mean_speed: cell(mean_speed),
            std_dev: cell(std_dev),
            turbulence_intensity: cell(intensity),
            dt: cell(dt),
            time_scale: cell(time_scale),
            length_scale: cell(length_scale),
            elapsed_s: cell(elapsed_s),
            error: record.errors().join("; "),
        })?;
    }

    writer.flush().context("failed to flush csv writer")?;
    Ok(())
}

fn save_xlsx(records: &[Record], file: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (i_col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, i_col as u16, *name)?;
    }

    for (i_rec, record) in records.iter().enumerate() {
        let row = i_rec as u32 + 1;
        worksheet.write_string(row, 0, record.file.as_str())?;
        worksheet.write_string(row, 1, record.status())?;
        for (i_val, val) in record.values().into_iter().enumerate() {
            let col = i_val as u16 + 2;
            match val {
                Some(val) => worksheet.write_number(row, col, val)?,
                None => worksheet.write_string(row, col, INVALID)?,
            };
        }
        worksheet.write_string(row, COLUMNS.len() as u16 - 1, record.errors().join("; ").as_str())?;
    }

    workbook.save(file).context("failed to save workbook")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_record() -> Record {
        Record {
            file: "a.txt".to_string(),
            metrics: Ok(Metrics {
                intensity: Ok(Intensity {
                    mean_speed: 6.0,
                    std_dev: 1.0,
                    intensity: 1.0 / 6.0,
                }),
                scales: Ok(IntegralScales {
                    dt: 1.0,
                    mean_speed: 6.0,
                    time_scale: 0.5,
                    length_scale: 3.0,
                    dt_deviation: 0.0,
                }),
            }),
            elapsed_s: 0.001,
        }
    }

    fn degenerate_record() -> Record {
        Record {
            file: "b.txt".to_string(),
            metrics: Ok(Metrics {
                intensity: Ok(Intensity {
                    mean_speed: 4.0,
                    std_dev: 0.0,
                    intensity: 0.0,
                }),
                scales: Err(AnalysisError::degenerate("speed has zero variance")),
            }),
            elapsed_s: 0.001,
        }
    }

    #[test]
    fn csv_marks_invalid_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_results(&[valid_record(), degenerate_record()], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "ok");
        assert_eq!(&rows[0][6], "0.5");
        assert_eq!(&rows[1][1], INVALID);
        assert_eq!(&rows[1][4], "0");
        assert_eq!(&rows[1][6], INVALID);
        assert!(rows[1][9].contains("zero variance"));
    }

    #[test]
    fn unreadable_file_invalidates_every_metric() {
        let record = Record {
            file: "c.txt".to_string(),
            metrics: Err(AnalysisError::DataFormat {
                path: "c.txt".into(),
                reason: "single column".to_string(),
            }),
            elapsed_s: 0.0,
        };
        assert!(!record.is_valid());
        assert_eq!(record.values()[..6], [None; 6]);
        assert_eq!(record.errors().len(), 1);
    }

    #[test]
    fn empty_csv_has_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_results(&[], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn writes_xlsx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        save_results(&[valid_record(), degenerate_record()], &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        assert!(save_results(&[], dir.path().join("out.json")).is_err());
    }
}
