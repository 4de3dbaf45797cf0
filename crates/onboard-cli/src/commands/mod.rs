//! Subcommands and the helpers they share.

pub mod append;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use glob::glob;

/// Expand file arguments. Existing paths are taken as-is, anything else is
/// treated as a glob pattern that must match at least one file.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }

        let before = files.len();
        files.extend(glob(input)?.filter_map(|r| r.ok()).filter(|p| p.is_file()));
        if files.len() == before {
            anyhow::bail!("No matching files found for pattern: {}", input);
        }
    }
    Ok(files)
}

/// File name used for kind detection and in reports.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string())
}
