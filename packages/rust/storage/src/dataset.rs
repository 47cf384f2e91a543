//! CSV dataset of reviewed studies (`slr.csv`).
//!
//! The whole table is held in memory: it is loaded, one row is appended, and
//! the file is rewritten. That is fine for literature-review corpora of a few
//! hundred rows.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use slrkit_shared::{Result, SlrError};
use tracing::{debug, info, instrument};

use crate::write_atomic;

/// Row counts per year, then per category value.
pub type YearTally = BTreeMap<i32, BTreeMap<String, usize>>;

/// In-memory copy of the CSV dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Load the dataset at `path`. Header names are trimmed and short rows
    /// padded with empty cells.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SlrError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_error(path, e))?;
            if record.len() > headers.len() {
                return Err(SlrError::Storage(format!(
                    "{}: row {} has {} fields but the header has {}",
                    path.display(),
                    i + 2,
                    record.len(),
                    headers.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        debug!(columns = headers.len(), rows = rows.len(), "dataset loaded");

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Load the dataset, or start an empty one with `headers` when the file
    /// is missing or has no header line.
    pub fn open_or_create(path: &Path, headers: &[&str]) -> Result<Self> {
        if path.exists() {
            let dataset = Self::open(path)?;
            if !dataset.headers.is_empty() {
                return Ok(dataset);
            }
        }

        info!(path = %path.display(), "starting a new dataset");
        Ok(Self {
            path: path.to_path_buf(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of `column` in row `row`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Append a row given as `(column, value)` pairs.
    ///
    /// Columns not yet in the header are added at the end, with empty cells
    /// in the existing rows. Header columns absent from `cells` stay empty.
    pub fn append(&mut self, cells: &[(&str, String)]) {
        for (name, _) in cells {
            if self.column(name).is_none() {
                debug!(column = *name, "adding new column");
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let mut row = vec![String::new(); self.headers.len()];
        for (name, value) in cells {
            if let Some(idx) = self.column(name) {
                row[idx] = value.clone();
            }
        }
        self.rows.push(row);
    }

    /// Rewrite the whole file.
    #[instrument(skip_all, fields(path = %self.path.display(), rows = self.rows.len()))]
    pub fn save(&self) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| csv_error(&self.path, e))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| csv_error(&self.path, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| SlrError::Storage(format!("{}: {e}", self.path.display())))?;

        write_atomic(&self.path, &bytes)?;
        info!("dataset saved");
        Ok(())
    }

    /// Count rows per year and value of `category`.
    ///
    /// Rows whose year is not a whole number, or whose category is blank,
    /// are left out.
    pub fn tally(&self, year_column: &str, category: &str) -> Result<YearTally> {
        let year_idx = self
            .column(year_column)
            .ok_or_else(|| SlrError::Storage(format!("no '{year_column}' column in dataset")))?;
        let cat_idx = self
            .column(category)
            .ok_or_else(|| SlrError::Storage(format!("no '{category}' column in dataset")))?;

        let mut tally = YearTally::new();
        for row in &self.rows {
            let Some(year) = parse_year(&row[year_idx]) else {
                continue;
            };
            let value = row[cat_idx].trim();
            if value.is_empty() {
                continue;
            }
            *tally
                .entry(year)
                .or_default()
                .entry(value.to_string())
                .or_default() += 1;
        }
        Ok(tally)
    }
}

/// Accepts `2024` as well as float renderings like `2024.0`.
fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let float: f64 = raw.parse().ok()?;
    (float.is_finite() && float.fract() == 0.0).then_some(float as i32)
}

fn csv_error(path: &Path, e: csv::Error) -> SlrError {
    SlrError::Storage(format!("{}: {e}", path.display()))
}
