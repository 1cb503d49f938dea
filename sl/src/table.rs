//! Curriculum table loading
//!
//! Reads the curriculum CSV into a [`RawTable`]. Spreadsheet exports in
//! French locales use `;` as the separator, so the delimiter is sniffed from
//! the header line.

use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use studycore::{Curriculum, RawTable};

/// Read a CSV file; `Ok(None)` when the file does not exist
pub fn read_table(path: &Path) -> Result<Option<RawTable>> {
    debug!(?path, "read_table: called");
    if !path.exists() {
        info!("No curriculum table at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).context(format!("Failed to read table: {}", path.display()))?;
    parse_table(&content)
        .map(Some)
        .context(format!("Failed to parse table: {}", path.display()))
}

/// Parse CSV text with a header row
pub fn parse_table(content: &str) -> Result<RawTable> {
    let delimiter = sniff_delimiter(content);
    debug!(delimiter = %(delimiter as char), "parse_table: delimiter chosen");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read table row")?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Load the curriculum at `path`
///
/// A malformed table is reported alongside an empty curriculum so the caller
/// can warn and carry on.
pub fn load_curriculum(path: &Path) -> (Curriculum, Option<eyre::Report>) {
    let table = match read_table(path) {
        Ok(table) => table,
        Err(e) => {
            warn!(error = %e, "load_curriculum: unreadable table, using empty curriculum");
            return (Curriculum::empty(), Some(e));
        }
    };

    match Curriculum::load(table.as_ref()) {
        Ok(curriculum) => (curriculum, None),
        Err(e) => {
            warn!(error = %e, "load_curriculum: malformed table, using empty curriculum");
            let report = eyre::Report::new(e).wrap_err(format!("Malformed curriculum table: {}", path.display()));
            (Curriculum::empty(), Some(report))
        }
    }
}

fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_comma_table() {
        let table = parse_table("subject,chapter\nMath,Fractions\nMath, Equations \n").unwrap();
        assert_eq!(table.headers, vec!["subject", "chapter"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Math", "Equations"]);
    }

    #[test]
    fn test_parse_semicolon_table_with_bom() {
        let table = parse_table("\u{feff}Matière;Chapitre;Ordre\nHistoire;La Grande Guerre, 1914-1918;1\n").unwrap();
        assert_eq!(table.headers[0], "Matière");
        assert_eq!(table.rows[0][1], "La Grande Guerre, 1914-1918");
    }

    #[test]
    fn test_parse_quoted_fields() {
        let table = parse_table("subject,chapter\nMath,\"Fractions, part 1\"\n").unwrap();
        assert_eq!(table.rows[0][1], "Fractions, part 1");
    }

    #[test]
    fn test_read_missing_table() {
        let temp = TempDir::new().unwrap();
        assert!(read_table(&temp.path().join("missing.csv")).unwrap().is_none());
    }

    #[test]
    fn test_load_curriculum() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("programme.csv");
        fs::write(&path, "subject,chapter\nMath,Fractions\nMath,Equations\nHistory,WWI\n").unwrap();

        let (curriculum, warning) = load_curriculum(&path);
        assert!(warning.is_none());
        assert_eq!(curriculum.len(), 2);
        assert_eq!(curriculum.chapter_count("Math"), 2);
    }

    #[test]
    fn test_load_malformed_curriculum_falls_back_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("programme.csv");
        fs::write(&path, "subject,title\nMath,Fractions\n").unwrap();

        let (curriculum, warning) = load_curriculum(&path);
        assert!(curriculum.is_empty());
        let warning = warning.unwrap();
        assert!(format!("{:#}", warning).contains("missing required column 'chapter'"));
    }

    #[test]
    fn test_load_absent_curriculum_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let (curriculum, warning) = load_curriculum(&temp.path().join("none.csv"));
        assert!(curriculum.is_empty());
        assert!(warning.is_none());
    }
}
