use clap::Parser;
use miette::Result;
use valves::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => valves::cli::commands::init::run(args),
        Commands::Search(args) => valves::cli::commands::search::run(args, &global),
        Commands::Show(args) => valves::cli::commands::show::run(args, &global),
        Commands::List(args) => valves::cli::commands::list::run(args, &global),
        Commands::Zones(args) => valves::cli::commands::zones::run(args, &global),
        Commands::Lot(args) => valves::cli::commands::lot::run(args, &global),
        Commands::Zone(args) => valves::cli::commands::zone::run(args, &global),
        Commands::Check(args) => valves::cli::commands::check::run(args, &global),
        Commands::Interactive(args) => valves::cli::commands::interactive::run(args, &global),
        Commands::Completions(args) => valves::cli::commands::completions::run(args),
    }
}

fn init_logging(global: &GlobalOpts) {
    let default_level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    // RUST_LOG, when set, takes precedence over --quiet/--verbose
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}
