use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stamper",
    about = "Render source files from templates, one builder per output",
    version
)]
pub struct Cli {
    /// Enable debug logging (overridden by STAMPER_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every builder of a manifest into an output directory
    Generate {
        /// Manifest file or directory holding stamper.toml
        #[arg(default_value = ".")]
        manifest: String,

        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Set variable values (can be repeated: -D key=value)
        #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Overwrite files that already exist
        #[arg(long)]
        overwrite: bool,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Render one builder and print the result
    Render {
        /// Manifest file or directory holding stamper.toml
        #[arg(default_value = ".")]
        manifest: String,

        /// Builder id (last segment of its type name)
        #[arg(short, long)]
        builder: String,

        /// Set variable values (can be repeated: -D key=value)
        #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
        data: Vec<String>,
    },

    /// Show how rendered output differs from files already on disk
    Diff {
        /// Manifest file or directory holding stamper.toml
        #[arg(default_value = ".")]
        manifest: String,

        /// Output directory to compare against
        #[arg(short, long)]
        output: String,

        /// Set variable values (can be repeated: -D key=value)
        #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
        data: Vec<String>,
    },
}
