//! Context Assembler
//!
//! Concatenates the reference library, the uploaded document and the
//! progress summary into one labelled blob. Only the library is bounded: it
//! is cut to its first `max_library_chars` characters. The cut does not look
//! for a word or sentence boundary, so the result is a deterministic prefix.

use tracing::debug;

/// Block label for the reference library
pub const LIBRARY_LABEL: &str = "BIBLIOTHÈQUE DE RÉFÉRENCE";

/// Block label for the uploaded document
pub const DOCUMENT_LABEL: &str = "DOCUMENT FOURNI";

/// Block label for the progress summary
pub const PROGRESS_LABEL: &str = "PROGRESSION";

/// Assembled context handed to the prompt builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlob {
    text: String,
    library_chars_dropped: usize,
}

impl ContextBlob {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Characters of library text cut by the budget
    pub fn library_chars_dropped(&self) -> usize {
        self.library_chars_dropped
    }

    pub fn was_truncated(&self) -> bool {
        self.library_chars_dropped > 0
    }
}

impl std::fmt::Display for ContextBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Assemble the context blob
///
/// Empty (or whitespace-only) sources are left out; when all three are empty
/// the blob is empty. Document and progress text are never truncated.
pub fn assemble(library: &str, document: &str, progress: &str, max_library_chars: usize) -> ContextBlob {
    debug!(
        library_len = library.len(),
        document_len = document.len(),
        progress_len = progress.len(),
        max_library_chars,
        "assemble: called"
    );

    let (library, library_chars_dropped) = head_chars(library, max_library_chars);
    if library_chars_dropped > 0 {
        debug!(library_chars_dropped, "assemble: library truncated");
    }

    let blocks: Vec<String> = [
        (LIBRARY_LABEL, library),
        (DOCUMENT_LABEL, document),
        (PROGRESS_LABEL, progress),
    ]
    .into_iter()
    .filter(|(_, text)| !text.trim().is_empty())
    .map(|(label, text)| format!("=== {} ===\n{}", label, text))
    .collect();

    ContextBlob {
        text: blocks.join("\n\n"),
        library_chars_dropped,
    }
}

/// First `max` characters of `text` and the number of characters cut
fn head_chars(text: &str, max: usize) -> (&str, usize) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (&text[..byte_idx], text[byte_idx..].chars().count()),
        None => (text, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_empty_gives_empty_blob() {
        let blob = assemble("", "", "", 100);
        assert!(blob.is_empty());
        assert!(!blob.was_truncated());

        let blob = assemble("  \n", "\t", "", 100);
        assert!(blob.is_empty());
    }

    #[test]
    fn test_blocks_are_labelled_in_order() {
        let blob = assemble("lib", "doc", "- Math : 0%", 100);
        assert_eq!(
            blob.as_str(),
            "=== BIBLIOTHÈQUE DE RÉFÉRENCE ===\nlib\n\n=== DOCUMENT FOURNI ===\ndoc\n\n=== PROGRESSION ===\n- Math : 0%"
        );
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let blob = assemble("", "doc", "", 100);
        assert_eq!(blob.as_str(), "=== DOCUMENT FOURNI ===\ndoc");
    }

    #[test]
    fn test_library_head_truncation_counts_chars() {
        // Multi-byte characters must not be split
        let blob = assemble("éèàùç-rest", "", "", 5);
        assert_eq!(blob.as_str(), "=== BIBLIOTHÈQUE DE RÉFÉRENCE ===\néèàùç");
        assert_eq!(blob.library_chars_dropped(), 5);
        assert!(blob.was_truncated());
    }

    #[test]
    fn test_library_within_budget_is_verbatim() {
        let library = "exactly ten";
        let blob = assemble(library, "", "", library.chars().count());
        assert!(blob.as_str().ends_with(library));
        assert!(!blob.was_truncated());
    }

    #[test]
    fn test_document_and_progress_not_truncated() {
        let doc = "d".repeat(500);
        let progress = "p".repeat(500);
        let blob = assemble("library", &doc, &progress, 3);
        assert!(blob.as_str().contains(&doc));
        assert!(blob.as_str().contains(&progress));
        assert!(blob.as_str().contains("\nlib\n"));
    }

    #[test]
    fn test_zero_budget_drops_library_block() {
        let blob = assemble("library", "doc", "", 0);
        assert_eq!(blob.as_str(), "=== DOCUMENT FOURNI ===\ndoc");
        assert_eq!(blob.library_chars_dropped(), 7);
    }
}
