//! File discovery and filtering for forma.

use std::collections::HashSet;
use std::io;
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::info;

use forma_error::Result;

use crate::FormaOptions;

/// Blueprint fragment extensions accepted as input.
const EXTENSIONS: &[&str] = &["py"];

/// Directories to skip during file discovery.
fn should_skip_dir(name: &str) -> bool {
    matches!(
        name,
        "test"
            | "tests"
            | "testing"
            | "doc"
            | "docs"
            // Build output directories
            | "target"
            | "build"
            | "dist"
            | "out"
            // Vendor/dependency directories
            | "vendor"
            | "node_modules"
            | "third_party"
            // Python tooling caches
            | "__pycache__"
            | ".venv"
            | "venv"
    )
}

/// Discover blueprint fragment files.
///
/// Walks `opts.dirs` and collects files with matching extensions,
/// plus any explicit `opts.files`.
pub fn discover_files(opts: &FormaOptions) -> Result<Vec<String>> {
    let discovery_start = Instant::now();

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let mut add_path = |path: &str| {
        if seen.contains(path) {
            return;
        }
        seen.insert(path.to_string());
        files.push(path.to_string());
    };

    // Add explicit files
    for file in &opts.files {
        add_path(file);
    }

    // Walk directories
    if !opts.dirs.is_empty() {
        let walker_threads = std::thread::available_parallelism()
            .map(|v| v.get())
            .unwrap_or(1);

        for dir in &opts.dirs {
            let mut builder = WalkBuilder::new(dir);
            builder
                .standard_filters(true)
                .follow_links(false)
                .threads(walker_threads)
                .filter_entry(|entry| {
                    // Always include root
                    if entry.depth() == 0 {
                        return true;
                    }
                    // Non-directories pass through
                    let Some(file_type) = entry.file_type() else {
                        return true;
                    };
                    if !file_type.is_dir() {
                        return true;
                    }
                    // Filter directories by name
                    let Some(name) = entry.file_name().to_str() else {
                        return true;
                    };
                    !should_skip_dir(&name.to_ascii_lowercase())
                });

            for entry in builder.build() {
                let entry = entry.map_err(|e| {
                    io::Error::other(format!("Failed to walk directory {dir}: {e}"))
                })?;

                // Only process files
                if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                    continue;
                }

                let path = entry.path();
                let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                    continue;
                };

                if EXTENSIONS.contains(&ext) {
                    add_path(&path.to_string_lossy());
                }
            }
        }
    }

    // Directory walks are multi-threaded, so make the aggregate order stable
    files.sort();

    info!(
        "File discovery: {:.2}s ({} files)",
        discovery_start.elapsed().as_secs_f64(),
        files.len()
    );

    if files.is_empty() {
        return Err(
            "No input files found. Check that the directory contains blueprint fragments.".into(),
        );
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(files: Vec<String>, dirs: Vec<String>) -> FormaOptions {
        FormaOptions {
            files,
            dirs,
            output: None,
            pretty: false,
            comments_only: false,
            parallel: false,
        }
    }

    #[test]
    fn test_explicit_files_deduplicated() {
        let opts = options(
            vec!["a.py".to_string(), "a.py".to_string(), "b.py".to_string()],
            vec![],
        );
        let files = discover_files(&opts).unwrap();
        assert_eq!(files, vec!["a.py".to_string(), "b.py".to_string()]);
    }

    #[test]
    fn test_directory_walk_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        fs::create_dir(dir.path().join("__pycache__")).unwrap();
        fs::write(dir.path().join("__pycache__").join("two.py"), "x = 2\n").unwrap();

        let opts = options(vec![], vec![dir.path().to_string_lossy().to_string()]);
        let files = discover_files(&opts).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("one.py"));
    }

    #[test]
    fn test_empty_discovery_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(vec![], vec![dir.path().to_string_lossy().to_string()]);
        assert!(discover_files(&opts).is_err());
    }
}
