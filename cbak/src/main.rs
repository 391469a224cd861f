//! cbak - main entry point

use anyhow::Result;
use cbak::config::DEFAULT_CONFIG_FILE;
use cbak::{utils, BackupRequest, Environment, Manager, Mode, Outcome, TagRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack paths, tags and config-declared locations into an archive
    Backup(BackupArgs),

    /// Put every file of an archive back where it came from
    Restore {
        /// Archive to restore
        file: PathBuf,
    },

    /// Unpack an archive into a directory under the current one
    Extract {
        /// Archive to extract
        file: PathBuf,
    },

    /// Print the version
    Version,
}

#[derive(clap::Args, Debug)]
struct BackupArgs {
    /// Files and directories to back up
    paths: Vec<PathBuf>,

    /// Path to leave out (repeatable)
    #[arg(short, long = "exclude", value_name = "PATH")]
    exclude: Vec<PathBuf>,

    /// Predefined location to back up (repeatable)
    #[arg(short, long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Archive to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also read a backup config file
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CONFIG_FILE,
    )]
    config: Option<PathBuf>,
}

impl From<BackupArgs> for BackupRequest {
    fn from(args: BackupArgs) -> Self {
        let use_config = args.config.is_some();
        Self {
            input_paths: args.paths,
            exclude_paths: args.exclude,
            tags: args.tags,
            output_path: args.output,
            use_config,
            config_path: args
                .config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    utils::logger::init(args.log_level.as_deref())?;

    let mode = args.command.map(|command| match command {
        Command::Backup(backup) => Mode::Backup(backup.into()),
        Command::Restore { file } => Mode::Restore { archive: file },
        Command::Extract { file } => Mode::Extract { archive: file },
        Command::Version => Mode::Version,
    });

    let manager = Manager::new(Environment::detect()?, TagRegistry::builtin());
    match manager.manage(mode)? {
        Outcome::BackedUp { archive, summary } => {
            tracing::info!(
                "Backup complete: {} ({} entries, {} bytes)",
                archive.display(),
                summary.entries,
                summary.bytes
            );
        }
        Outcome::Restored(summary) => {
            tracing::info!("Restore complete: {} entries", summary.entries);
        }
        Outcome::Extracted(summary) => {
            if let Some(destination) = summary.destination {
                tracing::info!(
                    "Extraction complete: {} entries in {}",
                    summary.entries,
                    destination.display()
                );
            }
        }
        Outcome::Version(version) => println!("{version}"),
    }

    Ok(())
}
