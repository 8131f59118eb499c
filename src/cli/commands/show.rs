//! `valves show` command - Show one valve and its neighbours

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{data_failure, open_session, warn_if_stale};
use crate::cli::helpers::natural_sort;
use crate::cli::table::render_valves;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Freshness, ValveRecord};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Valve id (exact match first, then case-insensitive)
    pub id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    #[serde(flatten)]
    freshness: Option<Freshness>,
    #[serde(flatten)]
    valve: &'a ValveRecord,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let record = session
        .catalog
        .find_valve(&args.id)
        .map_err(|e| data_failure(e, session.format))?
        .ok_or_else(|| miette::miette!("No valve found matching '{}'", args.id))?;
    let freshness = session.catalog.freshness();
    warn_if_stale(freshness, global.quiet);
    let valve = &record;

    match session.format {
        OutputFormat::Json => {
            let output = ShowOutput { freshness, valve };
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let output = ShowOutput { freshness, valve };
            print!("{}", serde_yml::to_string(&output).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", valve.valve_id),
        OutputFormat::Csv | OutputFormat::Md => {
            print!("{}", render_valves(std::slice::from_ref(valve), session.format)?);
        }
        OutputFormat::Auto => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Valve").bold(),
                style(&valve.valve_id).cyan()
            );
            print_field("Location", &valve.location);
            print_field("Location Notes", &valve.location_notes);
            print_field("Function", &valve.function);
            println!("{}", style("─".repeat(60)).dim());

            if valve.zones.is_empty() {
                println!("{}", style("Not mapped to any zone").yellow());
                return Ok(());
            }

            println!("{}", style("Zones").bold());
            for zone in &valve.zones {
                let mut partners: Vec<String> = session
                    .catalog
                    .get_valves_for_zone(zone)
                    .map_err(|e| data_failure(e, session.format))?
                    .into_iter()
                    .map(|v| v.valve_id)
                    .filter(|id| *id != valve.valve_id)
                    .collect();
                natural_sort(&mut partners);
                if partners.is_empty() {
                    println!("  {} (only valve)", style(zone).yellow());
                } else {
                    println!("  {} also fed by {}", style(zone).yellow(), partners.join(", "));
                }
            }

            let mut lots = valve.lots.clone();
            natural_sort(&mut lots);
            println!("{}: {}", style("Lots").bold(), lots.join(", "));
        }
    }

    Ok(())
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{}: {}", style(label).bold(), value);
    }
}
