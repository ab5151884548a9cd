//! Directory enumeration and well-known locations
//!
//! Paths handed to the snapshot layer are always run through
//! [`sanitize_path`] so that the same tree produces the same relative names
//! on every platform.

use crate::error::{IoResultExt, PatchKitError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Options for [`get_file_paths`]
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Include hidden files and descend into hidden directories
    pub include_hidden: bool,
    /// Maximum depth (None = unlimited)
    pub max_depth: Option<usize>,
}

/// List every regular file below `directory`, sorted by path
///
/// Any entry that cannot be read (permissions, a dangling link when links
/// are followed, a link cycle) fails the whole walk with the entry's path.
pub fn get_file_paths(directory: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    if !directory.exists() {
        return Err(PatchKitError::NotFound(directory.to_path_buf()));
    }
    let metadata = std::fs::metadata(directory).with_path(directory)?;
    if !metadata.is_dir() {
        return Err(PatchKitError::config(format!(
            "not a directory: {}",
            directory.display()
        )));
    }

    let mut walker = WalkDir::new(directory)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name();
    if let Some(max_depth) = options.max_depth {
        walker = walker.max_depth(max_depth);
    }

    let include_hidden = options.include_hidden;
    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| directory.to_path_buf());
                tracing::warn!("Unreadable entry {}: {}", path.display(), err);
                return Err(PatchKitError::io(path, err.into()));
            }
        }
    }

    files.sort();
    tracing::debug!("Found {} files under {}", files.len(), directory.display());
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Path to the user's desktop folder
pub fn desktop_path() -> Option<PathBuf> {
    desktop_from(|key| std::env::var_os(key))
}

/// Path to the user's start menu (application launcher) folder
pub fn start_menu_path() -> Option<PathBuf> {
    start_menu_from(|key| std::env::var_os(key))
}

/// Directory containing the running executable
pub fn running_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| PatchKitError::config(format!("executable has no parent: {}", exe.display())))
}

fn desktop_from(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let home = if cfg!(windows) {
        lookup("USERPROFILE")
    } else {
        lookup("HOME")
    }?;
    Some(PathBuf::from(home).join("Desktop"))
}

fn start_menu_from(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if cfg!(windows) {
        let appdata = lookup("APPDATA")?;
        return Some(
            PathBuf::from(appdata)
                .join("Microsoft")
                .join("Windows")
                .join("Start Menu"),
        );
    }
    let data_home = match lookup("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(lookup("HOME")?).join(".local").join("share"),
    };
    Some(data_home.join("applications"))
}

/// Normalise separators in a path string
///
/// Backslashes become `/`, runs of separators collapse to one and a trailing
/// separator is dropped unless the path is the root itself.
pub fn sanitize_path(path: &str) -> String {
    let mut sanitized = String::with_capacity(path.len());
    for ch in path.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' && sanitized.ends_with('/') {
            continue;
        }
        sanitized.push(ch);
    }
    if sanitized.len() > 1 && sanitized.ends_with('/') {
        sanitized.pop();
    }
    sanitized
}

/// Sanitized path of `path` relative to `root`
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    sanitize_path(&relative.to_string_lossy())
}
