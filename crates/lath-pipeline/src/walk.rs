//! Source tree traversal shared by the tasks.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Every file under `root`, sorted for a deterministic processing order.
/// Non-recursive mode only looks at the directory's own entries. A missing
/// root yields nothing; an absent category simply has no files to process.
pub(crate) fn all_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }
    let mut files = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    files
}

/// Files under `root` with the given extension (lowercase, without dot).
pub(crate) fn files_with_extension(root: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
    all_files(root, recursive)
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(all_files(&dir.path().join("absent"), true).is_empty());
    }

    #[test]
    fn non_recursive_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.hbs"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/inner.hbs"), "b").unwrap();

        let top_only = files_with_extension(dir.path(), "hbs", false);
        assert_eq!(top_only, vec![dir.path().join("top.hbs")]);

        let everything = files_with_extension(dir.path(), "hbs", true);
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("photo.JPG"), "j").unwrap();
        fs::write(dir.path().join("notes.txt"), "t").unwrap();

        let jpgs = files_with_extension(dir.path(), "jpg", false);
        assert_eq!(jpgs, vec![dir.path().join("photo.JPG")]);
    }

    #[test]
    fn results_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.css", "alpha.css", "mid.css"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let files = all_files(dir.path(), false);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.css", "mid.css", "zeta.css"]);
    }
}
