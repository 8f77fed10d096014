//! cpf - copy one file
//!
//! Copies a single file with its timestamps and permissions, powered by
//! cpfile.

use clap::Parser;
use cpfile::{CopyError, CopyOptions, CopyOutcome, copy_with_metadata, copy_with_metadata_sync};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// cpf - copy a file with its metadata
///
/// Copies SOURCE to DEST, creating missing parent directories of DEST and
/// preserving timestamps and permissions.
#[derive(Parser, Debug)]
#[command(name = "cpf", version, about, long_about = None)]
struct Args {
    /// File to copy
    source: PathBuf,

    /// Destination file path
    dest: PathBuf,

    /// Do not overwrite an existing destination
    #[arg(short = 'n', long)]
    no_clobber: bool,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Do not preserve file permissions
    #[arg(long)]
    no_perms: bool,

    /// Use the blocking copy instead of the async one
    #[arg(long)]
    blocking: bool,

    /// Verbose output (repeat for more logging)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("{source}")]
    Copy { source: CopyError },

    #[error("Failed to start async runtime: {source}")]
    Runtime { source: io::Error },
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Copy { source } => copy_error_code(source),
            Self::Runtime { .. } => "internal",
        }
    }
}

impl From<CopyError> for CliError {
    fn from(source: CopyError) -> Self {
        Self::Copy { source }
    }
}

fn copy_error_code(error: &CopyError) -> &'static str {
    if error.is_no_space() {
        return "no-space";
    }
    match error.kind() {
        io::ErrorKind::NotFound => "not-found",
        io::ErrorKind::PermissionDenied => "permission-denied",
        io::ErrorKind::AlreadyExists => "already-exists",
        io::ErrorKind::IsADirectory => "is-a-directory",
        _ => "io",
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(error) = run(&args) {
        eprintln!("error[{}]: {}", error.code(), error);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 | 1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &Args) -> CliResult<()> {
    let options = build_options(args);
    tracing::debug!(?options, blocking = args.blocking, "copying");

    let outcome = if args.blocking {
        copy_with_metadata_sync(&args.source, &args.dest, &options)?
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| CliError::Runtime { source })?;
        runtime.block_on(copy_with_metadata(&args.source, &args.dest, &options))?
    };

    if args.verbose > 0 {
        print_outcome(&args.source, &args.dest, outcome);
    }
    Ok(())
}

fn build_options(args: &Args) -> CopyOptions {
    let mut options = CopyOptions::default().with_overwrite(!args.no_clobber);
    if args.no_times {
        options = options.without_timestamps();
    }
    if args.no_perms {
        options = options.without_permissions();
    }
    options
}

fn print_outcome(source: &Path, dest: &Path, outcome: CopyOutcome) {
    match outcome {
        CopyOutcome::Copied { bytes } => println!(
            "'{}' -> '{}' ({})",
            source.display(),
            dest.display(),
            format_bytes(bytes)
        ),
        CopyOutcome::Skipped => println!("skipped '{}' (already exists)", dest.display()),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(11), "11 bytes");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
    }

    #[test]
    fn test_build_options_flags() {
        let args = Args::parse_from(["cpf", "-n", "--no-times", "a", "b"]);
        let options = build_options(&args);
        assert!(!options.overwrite);
        assert!(!options.preserve_timestamps);
        assert!(options.preserve_permissions);
    }

    #[test]
    fn test_copy_error_code() {
        let err = CopyError::wrap(
            cpfile::Operation::Stat,
            "x",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(copy_error_code(&err), "not-found");
    }
}
