mod commands;

use clap::{Parser, Subcommand};
use git_seal::config::Settings;
use git_seal::{logging, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-seal")]
#[command(version)]
#[command(about = "Encrypted files in git without re-encryption noise", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key and register the git filters
    Init,

    /// Restore the git filters, optionally importing a key first
    Unlock {
        /// Path to key file (optional)
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },

    /// Remove the git filters (sealed files show their envelopes)
    Lock,

    /// Export the repository key
    ExportKey {
        /// Output file path
        output: PathBuf,
    },

    /// Import a repository key
    ImportKey {
        /// Input file path
        input: PathBuf,
    },

    /// Clean filter (used internally by git)
    Clean {
        /// Path of the file being cleaned, relative to the repository root
        path: String,
        #[command(flatten)]
        formats: FormatArgs,
    },

    /// Smudge filter (used internally by git)
    Smudge {
        path: String,
        #[command(flatten)]
        formats: FormatArgs,
    },

    /// Diff textconv (used internally by git)
    Diff {
        /// File to convert; stdin when omitted
        file: Option<PathBuf>,
    },

    /// Show how git sees sealed files
    Status {
        /// Paths to inspect; every sealed path in the index when omitted
        paths: Vec<String>,
    },
}

#[derive(clap::Args)]
struct FormatArgs {
    /// Format of the plaintext (binary, dotenv, ini, json, yaml); only used
    /// as the envelope format when --output-type is not given
    #[arg(long = "input-type")]
    input_type: Option<String>,

    /// Format the envelope is sealed and opened under
    #[arg(long = "output-type")]
    output_type: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let settings = commands::load_settings();
    logging::init(
        settings
            .as_ref()
            .ok()
            .and_then(|settings| settings.log_level.as_deref()),
    );

    if let Err(e) = settings.and_then(|settings| run(cli.command, &settings)) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Init => commands::init(settings),
        Commands::Unlock { key_file } => commands::unlock(settings, key_file.as_deref()),
        Commands::Lock => commands::lock(settings),
        Commands::ExportKey { output } => commands::export_key(settings, &output),
        Commands::ImportKey { input } => commands::import_key(settings, &input),
        Commands::Clean { path, formats } => commands::clean(
            settings,
            &path,
            formats.input_type.as_deref(),
            formats.output_type.as_deref(),
        ),
        Commands::Smudge { path, formats } => commands::smudge(
            settings,
            &path,
            formats.input_type.as_deref(),
            formats.output_type.as_deref(),
        ),
        Commands::Diff { file } => commands::diff(settings, file.as_deref()),
        Commands::Status { paths } => commands::status(&paths),
    }
}
