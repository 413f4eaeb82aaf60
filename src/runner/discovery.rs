use crate::Result;
use crate::error::StagehandError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Collect test files below the given roots.
///
/// A root that is a file is taken verbatim, anything else is walked
/// recursively for regular files. Finding nothing is an error.
pub fn discover(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        for entry in WalkDir::new(root).follow_links(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => tracing::warn!(root = %root.display(), "skipping unreadable entry: {}", e),
            }
        }
    }

    if files.is_empty() {
        return Err(StagehandError::Configuration(format!(
            "no test files found under {}",
            roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    tracing::debug!(count = files.len(), "discovered test files");
    Ok(files)
}

/// Fix the execution order: lexicographic, or shuffled with `seed`.
///
/// Files are sorted before shuffling so a seed reproduces the same order
/// regardless of directory traversal order.
pub fn order(mut files: Vec<PathBuf>, seed: Option<u64>) -> Vec<PathBuf> {
    files.sort();
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        files.shuffle(&mut rng);
    }
    files
}
