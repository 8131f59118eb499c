//! Tabular data sources
//!
//! The relationship graph is built from two named tables. Anything that can
//! hand back rows of strings (header row first) can feed it: a directory of
//! CSV exports, an in-memory fixture, or a remote spreadsheet adapter living
//! outside this crate.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use miette::Diagnostic;
use thiserror::Error;

/// Name of the table listing every physical valve
pub const VALVE_SHEET: &str = "Valve Sheet";

/// Name of the table mapping valves to zones and lots
pub const ZONE_SHEET: &str = "Zone Sheet";

/// Raw rows of a table, header row first
pub type Table = Vec<Vec<String>>;

/// A provider of named tables
pub trait TabularSource {
    /// Fetch every row of the named table, header row first
    fn fetch_table(&self, name: &str) -> Result<Table, SourceError>;
}

impl<T: TabularSource + ?Sized> TabularSource for Box<T> {
    fn fetch_table(&self, name: &str) -> Result<Table, SourceError> {
        (**self).fetch_table(name)
    }
}

/// Errors raised by a tabular source
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("Sheet \"{sheet}\" not found. Available sheets: {available}")]
    #[diagnostic(code(valves::source::not_found))]
    SheetNotFound { sheet: String, available: String },

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(valves::source::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in {path}: {source}")]
    #[diagnostic(code(valves::source::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(valves::source::unavailable))]
    Unavailable(String),
}

/// Reads each sheet from `<dir>/<sheet name>.csv`
///
/// Sheet names are matched case-insensitively against file stems, so an
/// export saved as `valve sheet.csv` still answers for "Valve Sheet".
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the sheet names available in the directory
    pub fn sheet_names(&self) -> Result<Vec<String>, SourceError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| SourceError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
            })
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }

    fn sheet_path(&self, name: &str) -> Result<PathBuf, SourceError> {
        let names = self.sheet_names()?;
        let wanted = name.to_lowercase();

        match names.iter().find(|n| n.to_lowercase() == wanted) {
            Some(stem) => Ok(self.dir.join(format!("{}.csv", stem))),
            None => Err(SourceError::SheetNotFound {
                sheet: name.to_string(),
                available: if names.is_empty() {
                    "(none)".to_string()
                } else {
                    names.join(", ")
                },
            }),
        }
    }
}

impl TabularSource for CsvDirSource {
    fn fetch_table(&self, name: &str) -> Result<Table, SourceError> {
        let path = self.sheet_path(name)?;
        log::debug!("Reading sheet \"{}\" from {}", name, path.display());

        let file = File::open(&path).map_err(|e| SourceError::Io {
            path: path.clone(),
            source: e,
        })?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| SourceError::Csv {
                path: path.clone(),
                source: e,
            })?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(rows)
    }
}

/// Serves tables held in memory
///
/// Used by tests and by embedders that already fetched the rows elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Table>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table, builder style
    pub fn with_table<R, C>(mut self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.insert(name, rows);
        self
    }

    /// Add or replace a table
    pub fn insert<R, C>(&mut self, name: &str, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let table = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.tables.insert(name.to_string(), table);
    }
}

impl TabularSource for MemorySource {
    fn fetch_table(&self, name: &str) -> Result<Table, SourceError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound {
                sheet: name.to_string(),
                available: {
                    let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
                    names.sort();
                    names.join(", ")
                },
            })
    }
}
