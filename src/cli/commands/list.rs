//! `valves list` command - List every valve

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{data_failure, open_session, print_stale_notice};
use crate::cli::helpers::{format_age, natural_cmp};
use crate::cli::table::render_valves;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::ident::{ids_match, zones_match};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only valves serving this zone
    #[arg(long, short = 'z')]
    pub zone: Option<String>,

    /// Only valves covering this lot
    #[arg(long, short = 'l')]
    pub lot: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let mut listing = session
        .catalog
        .get_all_valves()
        .map_err(|e| data_failure(e, session.format))?;
    if listing.stale {
        print_stale_notice(listing.updated_at, global.quiet);
    }

    if let Some(zone) = &args.zone {
        listing
            .valves
            .retain(|v| v.zones.iter().any(|z| zones_match(z, zone)));
    }
    if let Some(lot) = &args.lot {
        listing
            .valves
            .retain(|v| v.lots.iter().any(|l| ids_match(l, lot)));
    }
    listing
        .valves
        .sort_by(|a, b| natural_cmp(&a.valve_id, &b.valve_id));
    listing.count = listing.valves.len();

    if args.count {
        println!("{}", listing.count);
        return Ok(());
    }

    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&listing).into_diagnostic()?);
        }
        OutputFormat::Auto => {
            if listing.valves.is_empty() {
                println!("No valves found.");
                return Ok(());
            }
            print!("{}", render_valves(&listing.valves, OutputFormat::Auto)?);
            if !global.quiet {
                println!(
                    "{} valve(s), updated {}{}",
                    style(listing.count).cyan(),
                    format_age(listing.updated_at, Utc::now()),
                    if listing.stale {
                        style(" (stale)").yellow().to_string()
                    } else {
                        String::new()
                    }
                );
            }
        }
        format => print!("{}", render_valves(&listing.valves, format)?),
    }

    Ok(())
}
