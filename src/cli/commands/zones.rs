//! `valves zones` command - List zones with the valves feeding them

use console::style;
use miette::Result;

use crate::cli::commands::utils::{data_failure, open_session, print_stale_notice};
use crate::cli::helpers::natural_sort;
use crate::cli::table::TableOutput;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct ZonesArgs {
    /// Only zones fed by fewer than this many valves
    #[arg(long)]
    pub below: Option<usize>,
}

pub fn run(args: ZonesArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let snapshot = session
        .catalog
        .snapshot()
        .map_err(|e| data_failure(e, session.format))?;
    if snapshot.stale {
        print_stale_notice(snapshot.updated_at, global.quiet);
    }

    let graph = &snapshot.graph;
    let mut zones: Vec<&str> = graph.zone_names().into_iter().collect();
    natural_sort(&mut zones);

    let mut table = TableOutput::new(&["Zone", "Valve Count", "Valves", "Lot Count"]);
    for zone in zones {
        let mut valves: Vec<&str> = graph
            .valves_for_zone(zone)
            .into_iter()
            .map(|v| v.valve_id.as_str())
            .collect();
        if args.below.is_some_and(|limit| valves.len() >= limit) {
            continue;
        }
        natural_sort(&mut valves);
        table.push(vec![
            zone.to_string(),
            valves.len().to_string(),
            valves.join(", "),
            graph.lots_for_zone(zone).len().to_string(),
        ]);
    }

    if session.format == OutputFormat::Auto && table.is_empty() {
        println!("No zones found.");
        return Ok(());
    }

    print!("{}", table.render(session.format)?);
    if session.format == OutputFormat::Auto && !global.quiet {
        println!("{} zone(s)", style(table.len()).cyan());
    }
    Ok(())
}
