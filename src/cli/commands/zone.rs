//! `valves zone` command - The lots and valves of one zone

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{data_failure, open_session, warn_if_stale};
use crate::cli::helpers::natural_sort;
use crate::cli::table::TableOutput;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct ZoneArgs {
    /// Zone name ("Zone 4", "Z4", and "4" are the same zone)
    pub zone: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZoneOutput {
    zone: String,
    stale: bool,
    lots: Vec<String>,
    valves: Vec<String>,
}

pub fn run(args: ZoneArgs, global: &GlobalOpts) -> Result<()> {
    let zone = args.zone.trim();
    let mut session = open_session(global)?;
    let mut lots = session
        .catalog
        .get_lots_for_zone(zone)
        .map_err(|e| data_failure(e, session.format))?;
    natural_sort(&mut lots);

    let mut valves: Vec<String> = session
        .catalog
        .get_valves_for_zone(zone)
        .map_err(|e| data_failure(e, session.format))?
        .into_iter()
        .map(|v| v.valve_id)
        .collect();
    natural_sort(&mut valves);

    let freshness = session.catalog.freshness();
    warn_if_stale(freshness, global.quiet);

    let output = ZoneOutput {
        zone: zone.to_string(),
        stale: freshness.is_some_and(|f| f.stale),
        lots,
        valves,
    };

    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&output).into_diagnostic()?),
        OutputFormat::Auto => {
            if output.valves.is_empty() {
                println!("No valves serve zone {}.", style(&output.zone).yellow());
                return Ok(());
            }
            println!(
                "Zone {} is fed by {}",
                style(&output.zone).cyan(),
                style(output.valves.join(", ")).yellow()
            );
            if output.lots.is_empty() {
                println!("{}: none", style("Lots").bold());
            } else {
                println!("{}: {}", style("Lots").bold(), output.lots.join(", "));
            }
        }
        format => {
            let mut table = TableOutput::new(&["Lot"]);
            for lot in &output.lots {
                table.push(vec![lot.clone()]);
            }
            print!("{}", table.render(format)?);
        }
    }

    Ok(())
}
