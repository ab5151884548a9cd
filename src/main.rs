//! PatchKit CLI - directory snapshot and comparison utility

use clap::Parser;
use patchkit::config::{CliArgs, Commands, OutputFormat, SnapshotConfig};
use patchkit::error::{PatchKitError, Result};
use patchkit::fs::{get_file_paths, relative_path};
use patchkit::memory::Buffer;
use patchkit::sync::{DirectorySnapshot, SnapshotDiff};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging; RUST_LOG wins over -v/-q
    let default_level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Handle result
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let config = SnapshotConfig::from_cli(args).map_err(PatchKitError::Config)?;
    let format = args.output_format;

    match &args.command {
        Commands::Hash { path } => cmd_hash(path, format),
        Commands::Snapshot { directory, output, json } => {
            cmd_snapshot(directory, output, *json, &config, args.quiet)
        }
        Commands::Diff { old, new } => cmd_diff(old, new, &config, format),
        Commands::Inspect { snapshot } => cmd_inspect(snapshot, format),
        Commands::Paths { directory } => cmd_paths(directory, &config),
    }
}

fn cmd_hash(path: &Path, format: OutputFormat) -> Result<()> {
    let mut buffer = Buffer::read_file(path)?;
    let hash = buffer.hash();

    match format {
        OutputFormat::Text => println!("{}  {}", hash, path.display()),
        OutputFormat::Json => {
            let report = serde_json::json!({
                "path": path.display().to_string(),
                "size": buffer.len(),
                "hash": hash.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn cmd_snapshot(
    directory: &Path,
    output: &Path,
    json: bool,
    config: &SnapshotConfig,
    quiet: bool,
) -> Result<()> {
    let snapshot = DirectorySnapshot::capture(directory, config)?;

    if json {
        snapshot.save_json(output)?;
    } else {
        snapshot.save(output)?;
    }

    if !quiet {
        snapshot.print_summary();
        println!("Written: {}", output.display());
    }
    Ok(())
}

fn cmd_diff(old: &Path, new: &Path, config: &SnapshotConfig, format: OutputFormat) -> Result<()> {
    let before = open_snapshot(old, config)?;
    let after = open_snapshot(new, config)?;
    let diff = SnapshotDiff::calculate(&before, &after);

    match format {
        OutputFormat::Text => {
            for path in &diff.added {
                println!("+ {}", path);
            }
            for path in &diff.modified {
                println!("M {}", path);
            }
            for path in &diff.deleted {
                println!("- {}", path);
            }
            println!();
            diff.print_summary();
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
    }

    if diff.has_changes() {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_inspect(path: &Path, format: OutputFormat) -> Result<()> {
    let snapshot = open_snapshot_file(path)?;

    match format {
        OutputFormat::Text => {
            snapshot.print_summary();
            println!();
            for entry in &snapshot.entries {
                println!(
                    "{}  {:>10}  {}",
                    entry.hash,
                    humansize::format_size(entry.size, humansize::BINARY),
                    entry.path
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }
    Ok(())
}

fn cmd_paths(directory: &Path, config: &SnapshotConfig) -> Result<()> {
    for file in get_file_paths(directory, &config.walk_options())? {
        println!("{}", relative_path(&file, directory));
    }
    Ok(())
}

/// A directory is captured on the fly; anything else is read as a snapshot file
fn open_snapshot(path: &Path, config: &SnapshotConfig) -> Result<DirectorySnapshot> {
    if path.is_dir() {
        DirectorySnapshot::capture(path, config)
    } else {
        open_snapshot_file(path)
    }
}

fn open_snapshot_file(path: &Path) -> Result<DirectorySnapshot> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        DirectorySnapshot::load_json(path)
    } else {
        DirectorySnapshot::load(path)
    }
}
