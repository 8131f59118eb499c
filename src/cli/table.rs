//! Table formatting for CLI list output
//!
//! Commands collect rows into a [`TableOutput`] and render it in the
//! requested format. JSON and YAML render each row as an object keyed by
//! column, so commands with richer data serialize their own types instead.

use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;
use crate::core::ValveRecord;

/// Rows of plain cells under fixed headers
#[derive(Debug, Clone, Default)]
pub struct TableOutput {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TableOutput {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Auto => Ok(self.build(false)),
            OutputFormat::Md => Ok(self.build(true)),
            OutputFormat::Csv => Ok(self.csv()),
            OutputFormat::Id => Ok(self
                .rows
                .iter()
                .filter_map(|r| r.first())
                .map(|id| format!("{}\n", id))
                .collect()),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&self.objects()).into_diagnostic()?;
                Ok(format!("{}\n", json))
            }
            OutputFormat::Yaml => serde_yml::to_string(&self.objects()).into_diagnostic(),
        }
    }

    fn build(&self, markdown: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().copied());
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }

        let mut table = builder.build();
        if markdown {
            table.with(Style::markdown());
        } else {
            table.with(Style::rounded());
        }
        format!("{}\n", table)
    }

    fn csv(&self) -> String {
        let mut out = self.headers.join(",");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    fn objects(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (header, cell) in self.headers.iter().zip(row) {
                    obj.insert(header_key(header), Value::String(cell.clone()));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

fn header_key(header: &str) -> String {
    header
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Render valves as a table, or serialize them for json/yaml
pub fn render_valves(valves: &[ValveRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(valves).into_diagnostic()?;
            Ok(format!("{}\n", json))
        }
        OutputFormat::Yaml => serde_yml::to_string(valves).into_diagnostic(),
        _ => valve_table(valves).render(format),
    }
}

fn valve_table(valves: &[ValveRecord]) -> TableOutput {
    let mut table = TableOutput::new(&[
        "Valve",
        "Location",
        "Location Notes",
        "Function",
        "Zones",
        "Lots",
    ]);
    for valve in valves {
        table.push(vec![
            valve.valve_id.clone(),
            valve.location.clone(),
            valve.location_notes.clone(),
            valve.function.clone(),
            valve.zones.join("; "),
            valve.lots.join("; "),
        ]);
    }
    table
}
