mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "STAMPER_LOG";

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // a second init only happens in tests; ignore it
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            manifest,
            output,
            data,
            overwrite,
            dry_run,
        } => commands::generate::run(manifest, output, data, overwrite, dry_run, cli.verbose),
        Commands::Render {
            manifest,
            builder,
            data,
        } => commands::render::run(manifest, builder, data),
        Commands::Diff {
            manifest,
            output,
            data,
        } => commands::diff::run(manifest, output, data),
    }
}
