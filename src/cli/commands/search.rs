//! `valves search` command - Find valves and classify the shutoff impact
//!
//! Terms may be valve ids, zone names, lot numbers, or free text. Several
//! terms (repeated or comma-separated) are searched together, as when a
//! shutoff notice lists every valve being closed.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{data_failure, open_session, warn_if_stale};
use crate::cli::helpers::{natural_sort, split_terms};
use crate::cli::table::render_valves;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Freshness, Impact, ScopeSource};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Valve ids, zone names, lot numbers, or free text (comma-separated allowed)
    #[arg(required = true)]
    pub terms: Vec<String>,

    /// List the matching valves only, without the shutoff summary
    #[arg(long)]
    pub no_impact: bool,

    /// Show only the number of matching valves
    #[arg(long)]
    pub count: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    #[serde(flatten)]
    freshness: Option<Freshness>,
    #[serde(flatten)]
    impact: &'a Impact,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let terms = split_terms(&args.terms);
    if terms.is_empty() {
        return Err(miette::miette!("Nothing to search for"));
    }

    let mut session = open_session(global)?;
    let result = session
        .catalog
        .impact(&terms)
        .map_err(|e| data_failure(e, session.format))?;
    let freshness = session.catalog.freshness();
    warn_if_stale(freshness, global.quiet);

    log::debug!(
        "Search for {:?} matched {} valve(s), closing {}",
        terms,
        result.search.valves.len(),
        result.search.closing_valve_ids.len()
    );

    if args.count {
        println!("{}", result.search.valves.len());
        return Ok(());
    }

    print!(
        "{}",
        render_impact(&result, freshness, session.format, !args.no_impact)?
    );
    Ok(())
}

/// Render a search and its impact in the requested format
pub(crate) fn render_impact(
    result: &Impact,
    freshness: Option<Freshness>,
    format: OutputFormat,
    with_impact: bool,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let output = SearchOutput {
                freshness,
                impact: result,
            };
            let json = serde_json::to_string_pretty(&output).into_diagnostic()?;
            Ok(format!("{}\n", json))
        }
        OutputFormat::Yaml => serde_yml::to_string(&SearchOutput {
            freshness,
            impact: result,
        })
        .into_diagnostic(),
        OutputFormat::Csv | OutputFormat::Id => render_valves(&result.search.valves, format),
        OutputFormat::Md => {
            let mut out = String::new();
            if result.search.is_empty() {
                out.push_str(&format!("No valves found for '{}'.\n", result.search.terms.join(", ")));
                return Ok(out);
            }
            out.push_str(&format!("## Valves for {}\n\n", result.search.terms.join(", ")));
            out.push_str(&render_valves(&result.search.valves, OutputFormat::Md)?);
            if with_impact {
                out.push_str("\n## Shutoff impact\n\n");
                for (label, values) in impact_lines(result) {
                    out.push_str(&format!("- **{}**: {}\n", label, values));
                }
            }
            Ok(out)
        }
        OutputFormat::Auto => {
            let mut out = String::new();
            if result.search.is_empty() {
                out.push_str(&format!(
                    "No valves found for '{}'.\n",
                    style(result.search.terms.join(", ")).yellow()
                ));
                return Ok(out);
            }
            out.push_str(&format!(
                "{} valve(s) for '{}':\n",
                style(result.search.valves.len()).cyan(),
                style(result.search.terms.join(", ")).yellow()
            ));
            out.push_str(&render_valves(&result.search.valves, OutputFormat::Auto)?);
            if with_impact {
                out.push('\n');
                out.push_str(&format!("{}\n", style("Shutoff impact").bold().underlined()));
                for (label, values) in impact_lines(result) {
                    let label = match label {
                        "Completely shut off" => style(label).red().bold(),
                        "Reduced pressure" | "Affected lots" => style(label).yellow().bold(),
                        _ => style(label).bold(),
                    };
                    out.push_str(&format!("  {}: {}\n", label, values));
                }
            }
            Ok(out)
        }
    }
}

/// Labelled summary lines, omitting anything empty
fn impact_lines(result: &Impact) -> Vec<(&'static str, String)> {
    let report = &result.shutoff;
    let mut lines = Vec::new();

    let scope = match report.scope_source {
        ScopeSource::Primary => "searched valves and zones",
        ScopeSource::LotLookup => "zones of the searched lot",
        ScopeSource::AllResults => "every zone in the results",
        ScopeSource::Empty => "none",
    };
    lines.push(("Scope", scope.to_string()));

    let mut push = |label: &'static str, values: &[String]| {
        if !values.is_empty() {
            let mut sorted = values.to_vec();
            natural_sort(&mut sorted);
            lines.push((label, sorted.join(", ")));
        }
    };
    push("Completely shut off", &report.completely_shut_off);
    push("Reduced pressure", &report.affected_zones);
    push("Lots in zone", &report.lots_in_zone);
    push("Affected lots", &report.affected_lots);
    push("Zones for lot", &report.lot_zones);

    for zv in &report.valves_by_zone {
        let mut valves = zv.valves.clone();
        natural_sort(&mut valves);
        lines.push(("Valves", format!("{} <- {}", zv.zone, valves.join(", "))));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemorySource, ValveCatalog, DEFAULT_TTL, VALVE_SHEET, ZONE_SHEET};

    fn catalog() -> ValveCatalog<MemorySource> {
        let source = MemorySource::new()
            .with_table(
                VALVE_SHEET,
                vec![vec!["Valve", "Location"], vec!["V1", "Gate"], vec!["V2", "Pool"]],
            )
            .with_table(
                ZONE_SHEET,
                vec![
                    vec!["Valve", "Zone", "Lot #"],
                    vec!["V1", "Z1", "101"],
                    vec!["V2", "Z1", "102"],
                    vec!["V2", "Z2", "201"],
                ],
            );
        ValveCatalog::new(source, DEFAULT_TTL)
    }

    fn rendered(terms: &[&str], format: OutputFormat, with_impact: bool) -> String {
        let mut catalog = catalog();
        let result = catalog.impact(terms).unwrap();
        render_impact(&result, catalog.freshness(), format, with_impact).unwrap()
    }

    #[test]
    fn test_auto_output_lists_impact() {
        let out = rendered(&["Z1"], OutputFormat::Auto, true);

        assert!(out.contains("Completely shut off: Z1"));
        assert!(out.contains("Lots in zone: 101, 102"));
        assert!(out.contains("Affected lots: 201"));
        assert!(out.contains("Z1 <- V1, V2"));
    }

    #[test]
    fn test_no_impact_skips_summary() {
        let out = rendered(&["Z1"], OutputFormat::Auto, false);
        assert!(!out.contains("Shutoff impact"));
    }

    #[test]
    fn test_json_output_flattens_impact() {
        let out = rendered(&["V1"], OutputFormat::Json, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["stale"], false);
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["search"]["singleValveLookup"], true);
        assert_eq!(value["shutoff"]["affectedZones"][0], "Z1");
        assert_eq!(value["shutoff"]["scopeSource"], "primary");
    }

    #[test]
    fn test_empty_result_message() {
        let out = rendered(&["nowhere"], OutputFormat::Md, true);
        assert_eq!(out, "No valves found for 'nowhere'.\n");
    }
}
