//! `valves lot` command - Which zone(s) a lot belongs to

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::{data_failure, open_session, warn_if_stale};
use crate::cli::helpers::natural_sort;
use crate::cli::table::TableOutput;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct LotArgs {
    /// Lot number
    pub lot: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LotOutput {
    lot: String,
    stale: bool,
    zones: Vec<String>,
    valves: Vec<String>,
}

pub fn run(args: LotArgs, global: &GlobalOpts) -> Result<()> {
    let lot = args.lot.trim();
    let mut session = open_session(global)?;
    let mut zones = session
        .catalog
        .get_zones_for_lot(lot)
        .map_err(|e| data_failure(e, session.format))?;
    natural_sort(&mut zones);

    // Valves feeding any of the lot's zones
    let mut valves: Vec<String> = Vec::new();
    for zone in &zones {
        for valve in session
            .catalog
            .get_valves_for_zone(zone)
            .map_err(|e| data_failure(e, session.format))?
        {
            if !valves.contains(&valve.valve_id) {
                valves.push(valve.valve_id);
            }
        }
    }
    natural_sort(&mut valves);

    let freshness = session.catalog.freshness();
    warn_if_stale(freshness, global.quiet);

    let output = LotOutput {
        lot: lot.to_string(),
        stale: freshness.is_some_and(|f| f.stale),
        zones,
        valves,
    };

    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&output).into_diagnostic()?),
        OutputFormat::Auto => {
            if output.zones.is_empty() {
                println!("Lot {} is not in any zone.", style(&output.lot).yellow());
                return Ok(());
            }
            println!(
                "Lot {} is in zone {}",
                style(&output.lot).cyan(),
                style(output.zones.join(", ")).yellow()
            );
            println!("{}: {}", style("Valves").bold(), output.valves.join(", "));
        }
        format => {
            let mut table = TableOutput::new(&["Zone"]);
            for zone in &output.zones {
                table.push(vec![zone.clone()]);
            }
            print!("{}", table.render(format)?);
        }
    }

    Ok(())
}
