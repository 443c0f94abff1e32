//! Source scanning: enumerate `*-i.h` interface headers in the input directory.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix identifying an interface declaration header.
pub const INTERFACE_SUFFIX: &str = "-i.h";

/// List interface headers directly inside `interface_dir`, sorted by file name.
///
/// The walk is non-recursive: generated output lives in a subdirectory of the
/// interface directory and must not be rescanned as input. Sorting makes the
/// processing order (and therefore the emitted warnings and report) stable
/// across platforms whose directory enumeration order differs.
pub fn scan_interface_files(interface_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(interface_dir)
        .max_depth(Some(1))
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| file_name_of(path).ends_with(INTERFACE_SUFFIX))
        .collect();

    files.sort_by_key(|p| file_name_of(p).to_string());
    debug!(dir = %interface_dir.display(), count = files.len(), "Interface scan");
    files
}

/// File name component as UTF-8, empty when unrepresentable.
pub fn file_name_of(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("STimer-i.h"), "").unwrap();
        fs::write(dir.path().join("SWindow-i.h"), "").unwrap();
        fs::write(dir.path().join("SAdapter-i.h"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("soui-capi.h"), "").unwrap();

        let files = scan_interface_files(dir.path());
        let names: Vec<&str> = files.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(names, vec!["SAdapter-i.h", "STimer-i.h", "SWindow-i.h"]);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("STimer-i.h"), "").unwrap();
        fs::create_dir(dir.path().join("capi")).unwrap();
        fs::write(dir.path().join("capi").join("SNested-i.h"), "").unwrap();

        let files = scan_interface_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(file_name_of(&files[0]), "STimer-i.h");
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_interface_files(&missing).is_empty());
    }
}
