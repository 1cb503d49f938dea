//! Reference library and uploaded document loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use tracing::{debug, warn};

/// Read every file matched by `patterns` into one text
///
/// Files are read in sorted path order and each one is introduced by a
/// `# {file name}` heading. Unreadable files are skipped with a warning.
pub fn load_library(patterns: &[String]) -> Result<String> {
    debug!(?patterns, "load_library: called");
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let entries = glob::glob(pattern).context(format!("Invalid library pattern: {}", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "load_library: unreadable glob entry"),
            }
        }
    }

    paths.sort();
    paths.dedup();
    debug!(file_count = paths.len(), "load_library: files matched");

    let mut sections = Vec::with_capacity(paths.len());
    for path in &paths {
        match fs::read_to_string(path) {
            Ok(text) => {
                let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                sections.push(format!("# {}\n{}", name, text.trim_end()));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "load_library: skipping unreadable file"),
        }
    }

    Ok(sections.join("\n\n"))
}

/// Read the uploaded document; no path means no document
pub fn read_document(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        debug!("read_document: no document");
        return Ok(String::new());
    };
    debug!(path = %path.display(), "read_document: called");

    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        return Err(eyre!(
            "PDF documents are not supported: {}. Convert it to text first (e.g. pdftotext).",
            path.display()
        ));
    }

    fs::read_to_string(path).context(format!("Failed to read document: {}", path.display()))
}
