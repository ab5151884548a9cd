//! Configuration settings for PatchKit
//!
//! Defines CLI arguments, subcommands and the snapshot capture options
//! derived from them.

use crate::fs::WalkOptions;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// PatchKit - directory snapshot and patch toolkit
#[derive(Parser, Debug, Clone)]
#[command(name = "patchkit")]
#[command(author = "PatchKit Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Snapshot, hash and compare directory trees")]
#[command(long_about = r#"
PatchKit records the content hash of every file in a directory tree and
compares snapshots to find what changed between two states.

Examples:
  patchkit hash ./file.bin                     # Content hash of one file
  patchkit snapshot ./app -o app.snap          # Binary snapshot
  patchkit snapshot ./app -o app.json --json   # JSON snapshot
  patchkit diff old.snap new.snap              # What changed
"#)]
pub struct CliArgs {
    /// Follow symbolic links while walking directories
    #[arg(long, global = true)]
    pub follow_symlinks: bool,

    /// Include hidden files and directories
    #[arg(long, global = true)]
    pub include_hidden: bool,

    /// Skip files larger than this (e.g., 512M, 2G)
    #[arg(long, global = true, value_name = "SIZE")]
    pub max_file_size: Option<String>,

    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Verbose output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the content hash of a file
    #[command(name = "hash")]
    Hash {
        /// File to hash
        path: PathBuf,
    },

    /// Capture a directory snapshot
    #[command(name = "snapshot")]
    Snapshot {
        /// Directory to capture
        directory: PathBuf,
        /// Output file
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
        /// Write JSON instead of the binary format
        #[arg(long)]
        json: bool,
    },

    /// Compare two snapshots (binary or JSON) or directories
    #[command(name = "diff")]
    Diff {
        /// Older snapshot file or directory
        old: PathBuf,
        /// Newer snapshot file or directory
        new: PathBuf,
    },

    /// Show the contents of a snapshot file
    #[command(name = "inspect")]
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// List the files a snapshot of a directory would include
    #[command(name = "paths")]
    Paths {
        /// Directory to walk
        directory: PathBuf,
    },
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Options controlling snapshot capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Include hidden files
    pub include_hidden: bool,
    /// Files larger than this are skipped
    pub max_file_size: Option<u64>,
}

impl SnapshotConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let max_file_size = args
            .max_file_size
            .as_deref()
            .map(parse_size)
            .transpose()?;

        Ok(Self {
            follow_symlinks: args.follow_symlinks,
            include_hidden: args.include_hidden,
            max_file_size,
        })
    }

    /// Directory walk options for this configuration
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            max_depth: None,
        }
    }

    /// Whether a file of `size` bytes should be captured
    pub fn accepts_size(&self, size: u64) -> bool {
        self.max_file_size.map_or(true, |limit| size <= limit)
    }
}

/// Binary unit suffixes accepted by [`parse_size`], upper-cased
const SIZE_UNITS: &[(&str, u32)] = &[
    ("", 0),
    ("B", 0),
    ("K", 10),
    ("KB", 10),
    ("KIB", 10),
    ("M", 20),
    ("MB", 20),
    ("MIB", 20),
    ("G", 30),
    ("GB", 30),
    ("GIB", 30),
    ("T", 40),
    ("TB", 40),
    ("TIB", 40),
];

/// Parse a human-readable size such as `"64K"`, `"1.5G"` or `"1024"`
///
/// Units are binary. Values that do not fit in a `u64` are rejected.
pub fn parse_size(size: &str) -> Result<u64, String> {
    let trimmed = size.trim();
    if trimmed.is_empty() {
        return Err("Empty size string".to_string());
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let unit = unit.trim().to_ascii_uppercase();
    let shift = SIZE_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|&(_, shift)| shift)
        .ok_or_else(|| format!("Invalid size: {}", size))?;
    let multiplier = 1u64 << shift;
    let too_large = || format!("Size too large: {}", size);

    if let Ok(whole) = number.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(too_large);
    }

    let fractional: f64 = number
        .parse()
        .map_err(|_| format!("Invalid number: {}", number))?;
    let bytes = fractional * multiplier as f64;
    // u64::MAX rounds up to 2^64 as f64, so anything at or above it overflows
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(too_large());
    }
    Ok(bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1g").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("1.5G").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("-1K").is_err());
        assert!(parse_size("1X").is_err());
        assert_eq!(parse_size(" 2 mib ").unwrap(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_overflow() {
        assert!(parse_size("1e30T").is_err());
        assert!(parse_size("16777216T").is_err());
        assert!(parse_size("18446744073709551616").is_err());
        assert!(parse_size("99999999999999999999.5").is_err());
        assert_eq!(parse_size("16777215T").unwrap(), 16_777_215u64 << 40);
        assert_eq!(parse_size("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn test_from_cli() {
        let args = CliArgs::parse_from([
            "patchkit",
            "--include-hidden",
            "--max-file-size",
            "2K",
            "paths",
            "/tmp",
        ]);
        let config = SnapshotConfig::from_cli(&args).unwrap();
        assert!(config.include_hidden);
        assert!(!config.follow_symlinks);
        assert_eq!(config.max_file_size, Some(2048));
        assert!(config.accepts_size(2048));
        assert!(!config.accepts_size(2049));
        assert!(matches!(args.command, Commands::Paths { .. }));
    }

    #[test]
    fn test_subcommand_parsing() {
        let args = CliArgs::parse_from(["patchkit", "snapshot", "dir", "-o", "out.json", "--json", "-vv"]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Commands::Snapshot { directory, output, json } => {
                assert_eq!(directory, PathBuf::from("dir"));
                assert_eq!(output, PathBuf::from("out.json"));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let bad = CliArgs::try_parse_from(["patchkit", "--max-file-size", "1M", "paths"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_default_accepts_everything() {
        let config = SnapshotConfig::default();
        assert!(config.accepts_size(u64::MAX));
        assert_eq!(config.walk_options().max_depth, None);
    }
}
