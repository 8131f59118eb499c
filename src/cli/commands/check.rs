//! `valves check` command - Sanity-check the two sheets
//!
//! Every zone is expected to be fed by two or more valves; a zone with only
//! one cannot be isolated without cutting it off entirely, which usually
//! means a missing Zone Sheet row.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{data_failure, open_session};
use crate::cli::helpers::natural_sort;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{JoinStats, RelationshipGraph};

/// Zones fed by fewer valves than this are reported
const MIN_VALVES_PER_ZONE: usize = 2;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Exit with an error if any problem is found
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    valves: usize,
    zones: usize,
    #[serde(flatten)]
    stats: JoinStats,
    unmapped_valves: Vec<String>,
    thin_zones: Vec<String>,
}

impl CheckReport {
    fn from_graph(graph: &RelationshipGraph) -> Self {
        let mut unmapped_valves: Vec<String> = graph
            .unmapped_valves()
            .into_iter()
            .map(|v| v.valve_id.clone())
            .collect();
        natural_sort(&mut unmapped_valves);

        let zone_names = graph.zone_names();
        let mut thin_zones: Vec<String> = zone_names
            .iter()
            .filter(|z| graph.valves_for_zone(z).len() < MIN_VALVES_PER_ZONE)
            .map(|z| z.to_string())
            .collect();
        natural_sort(&mut thin_zones);

        Self {
            valves: graph.len(),
            zones: zone_names.len(),
            stats: graph.stats().clone(),
            unmapped_valves,
            thin_zones,
        }
    }

    fn problem_count(&self) -> usize {
        self.stats.orphaned_rows
            + self.stats.duplicate_valves
            + self.unmapped_valves.len()
            + self.thin_zones.len()
    }
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let snapshot = session
        .catalog
        .snapshot()
        .map_err(|e| data_failure(e, session.format))?;

    let report = CheckReport::from_graph(&snapshot.graph);
    let problems = report.problem_count();

    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&report).into_diagnostic()?),
        _ => print_report(&report, global.quiet),
    }

    if args.strict && problems > 0 {
        return Err(miette::miette!("{} problem(s) found in the valve data", problems));
    }
    Ok(())
}

fn print_report(report: &CheckReport, quiet: bool) {
    let ok = style("✓").green();
    let warn = style("⚠").yellow();

    if !quiet {
        println!(
            "{} {} valve(s) from {} Valve Sheet row(s), {} zone(s) from {} Zone Sheet row(s)",
            ok,
            report.valves,
            report.stats.valve_rows,
            report.zones,
            report.stats.zone_rows
        );
    }

    if report.stats.orphaned_rows > 0 {
        println!(
            "{} {} Zone Sheet row(s) reference valves not in Valve Sheet",
            warn, report.stats.orphaned_rows
        );
    }
    if report.stats.duplicate_valves > 0 {
        println!(
            "{} {} duplicate valve row(s) ignored (first row wins)",
            warn, report.stats.duplicate_valves
        );
    }
    if !report.unmapped_valves.is_empty() {
        println!(
            "{} Not mapped to any zone: {}",
            warn,
            report.unmapped_valves.join(", ")
        );
    }
    if !report.thin_zones.is_empty() {
        println!(
            "{} Fed by fewer than {} valves: {}",
            warn,
            MIN_VALVES_PER_ZONE,
            report.thin_zones.join(", ")
        );
    }

    if report.problem_count() == 0 {
        println!("{} No problems found", ok);
    }
}
