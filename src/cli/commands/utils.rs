//! Shared utilities for CLI commands

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::helpers::format_age;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, CsvDirSource, DataError, Freshness, Project, ProjectError, ValveCatalog};

/// Everything a command needs to answer queries
pub struct Session {
    pub format: OutputFormat,
    pub catalog: ValveCatalog<CsvDirSource>,
}

/// Discover the project, load config, and open a catalog over its sheets
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let project = resolve_project(global)?;
    let config = Config::load(project.as_ref());
    let data_dir = config.data_dir(project.as_ref());
    log::debug!("Reading sheets from {}", data_dir.display());

    let format = resolve_format(global.format, &config);
    let catalog = ValveCatalog::new(CsvDirSource::new(data_dir), config.cache_ttl());

    Ok(Session { format, catalog })
}

/// Outside a project, commands fall back to `./data`
fn resolve_project(global: &GlobalOpts) -> Result<Option<Project>> {
    match &global.project {
        Some(path) => Project::discover_from(path)
            .map(Some)
            .map_err(|e| miette::miette!("{}", e)),
        None => match Project::discover() {
            Ok(project) => Ok(Some(project)),
            Err(ProjectError::NotFound { .. }) => {
                log::debug!("No .valves/ project found, using ./data");
                Ok(None)
            }
            Err(e) => Err(miette::miette!("{}", e)),
        },
    }
}

/// Apply the configured default when `--format` was left at auto
pub fn resolve_format(requested: OutputFormat, config: &Config) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    match config.default_format.as_deref() {
        Some(name) => OutputFormat::from_str(name, true).unwrap_or_else(|_| {
            log::warn!("Ignoring unknown default_format {:?}", name);
            OutputFormat::Auto
        }),
        None => OutputFormat::Auto,
    }
}

/// Turn a data failure into a diagnostic, echoing it as JSON when requested
pub fn data_failure(err: DataError, format: OutputFormat) -> miette::Report {
    if format == OutputFormat::Json {
        let body = serde_json::json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    }
    miette::Report::new(err)
}

/// Warn on stderr that the data shown is from an earlier fetch
pub fn print_stale_notice(updated_at: DateTime<Utc>, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!(
        "{} Showing cached data from {} ({}); the latest refresh failed",
        style("!").yellow(),
        updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_age(updated_at, Utc::now())
    );
}

/// Print the stale notice when the latest answer came from an earlier fetch
pub fn warn_if_stale(freshness: Option<Freshness>, quiet: bool) {
    if let Some(freshness) = freshness.filter(|f| f.stale) {
        print_stale_notice(freshness.updated_at, quiet);
    }
}
