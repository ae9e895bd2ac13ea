pub mod files;

pub use files::{SourceFile, SourceFileError, SourceFileId, SourceFiles};

use crate::utils::collect_accumulate;
use log::debug;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions of Stata do-files, ado-files and do-file includes
pub const STATA_EXTENSIONS: [&str; 3] = ["do", "ado", "doh"];

/// Collect every Stata file under `root`, which can also be a single file.
///
/// Files are ordered by path. We don't support non-UTF8 characters in path.
pub fn load_sources(root: &Path) -> Result<SourceFiles, Vec<SourceFileError>> {
    // Names are relative to the directory holding the files
    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };

    // Unreadable entries (including a missing root) are load errors too
    let walk = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter(|entry| match entry {
            Ok(entry) => entry.file_type().is_file() && is_stata_file(entry.path()),
            Err(_) => true,
        })
        .map(|entry| match entry {
            Ok(entry) => SourceFile::load(entry.into_path(), base),
            Err(err) => Err(SourceFileError::walk(err, root)),
        });

    let files = collect_accumulate(walk)?;

    let mut sources = SourceFiles::new();
    for file in files {
        debug!("loaded {}", file.relative_path().display());
        sources.add_file(file);
    }

    Ok(sources)
}

pub fn is_stata_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => STATA_EXTENSIONS.contains(&ext),
        None => false,
    }
}
