//! `valves interactive` command - Answer repeated searches from a prompt
//!
//! One catalog lives for the whole session, so the sheets are read once and
//! re-read only after the cache TTL, falling back to the last good data when
//! a refresh fails.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::search::render_impact;
use crate::cli::commands::utils::{open_session, warn_if_stale};
use crate::cli::helpers::split_terms;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct InteractiveArgs {}

/// What one line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Request {
    Quit,
    Refresh,
    Search(Vec<String>),
    Nothing,
}

fn parse_request(line: &str) -> Request {
    match line.trim().to_lowercase().as_str() {
        "q" | "quit" | "exit" => Request::Quit,
        ":refresh" | ":r" => Request::Refresh,
        _ => {
            let terms = split_terms(&[line]);
            if terms.is_empty() {
                Request::Nothing
            } else {
                Request::Search(terms)
            }
        }
    }
}

pub fn run(_args: InteractiveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let theme = ColorfulTheme::default();

    if !global.quiet {
        println!(
            "Enter a valve, zone, lot, or text ({} to reload sheets, {} to exit)",
            style(":refresh").yellow(),
            style("quit").yellow()
        );
    }

    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("Search")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;

        let terms = match parse_request(&line) {
            Request::Quit => break,
            Request::Nothing => continue,
            Request::Refresh => {
                session.catalog.cache_mut().invalidate();
                println!("{} Sheets will be re-read on the next search", style("✓").green());
                continue;
            }
            Request::Search(terms) => terms,
        };

        // A failed load ends this query, not the session
        let result = match session.catalog.impact(&terms) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                continue;
            }
        };
        let freshness = session.catalog.freshness();
        warn_if_stale(freshness, global.quiet);

        print!("{}", render_impact(&result, freshness, session.format, true)?);
        println!();
    }

    Ok(())
}
