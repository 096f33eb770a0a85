use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// Total apparent size of a file or directory tree, in bytes.
///
/// Symlinks are not followed. Entries that vanish or cannot be read are
/// skipped so one bad subdirectory does not hide its siblings.
pub fn dir_size(path: &Path) -> u64 {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_file() => return meta.len(),
        Ok(meta) if meta.file_type().is_symlink() => return 0,
        Ok(_) => {}
        Err(err) => {
            tracing::debug!("Skipping {}: {}", path.display(), err);
            return 0;
        }
    }

    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Direct children of `dir`, sorted by name.
///
/// A missing or unreadable `dir` yields an empty list; any other I/O error
/// is returned.
pub fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(err) if is_skippable(&err) => {
            tracing::debug!("Skipping {}: {}", dir.display(), err);
            return Ok(Vec::new());
        }
        Err(err) => return Err(err),
    };

    let mut entries: Vec<PathBuf> = read_dir.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    entries.sort();
    Ok(entries)
}

/// Errors a probe silently steps over.
pub fn is_skippable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

/// Build a matcher from file-name glob patterns such as `*.log*`.
pub fn name_matcher(patterns: &[&str]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Regular files under `root` whose file name matches `matcher`, in walk order.
pub fn matching_files(root: &Path, matcher: &GlobSet) -> Vec<(PathBuf, fs::Metadata)> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && matcher.is_match(e.file_name()))
        .filter_map(|e| {
            let meta = e.metadata().ok()?;
            Some((e.into_path(), meta))
        })
        .collect()
}

/// Sum of the sizes of files under `root` matching `matcher`.
pub fn matching_size(root: &Path, matcher: &GlobSet) -> u64 {
    matching_files(root, matcher).iter().map(|(_, m)| m.len()).sum()
}

/// Whether `path` contains a `..` component, which lexical prefix checks
/// cannot see through.
pub fn escapes_upward(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Whether `path` is one of `roots` or lies beneath one of them.
pub fn within_roots(path: &Path, roots: &[PathBuf]) -> bool {
    !escapes_upward(path) && roots.iter().any(|root| path.starts_with(root))
}
