//! Resolution of include/exclude patterns to the files to sign

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolve include and exclude patterns to existing files
///
/// Exclude patterns are expanded first. Every path matched by an include
/// pattern is then kept, in pattern order, unless it was excluded, no longer
/// exists, or was already matched by an earlier pattern. Patterns support
/// recursive `**` matching.
pub fn find_files(include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut excluded = HashSet::new();
    for pattern in exclude {
        excluded.extend(expand(pattern)?);
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in include {
        for path in expand(pattern)? {
            if excluded.contains(&path) {
                tracing::debug!(path = %path.display(), "excluded");
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Existing paths matching `pattern`
fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("skipping unreadable match for `{}`: {}", pattern, e);
                None
            }
        })
        // a match may vanish between listing and now
        .filter(|path| path.exists())
        .collect())
}
