//! Curriculum Store
//!
//! Groups a flat (subject, chapter) table into per-subject ordered chapter
//! lists. The curriculum is immutable once built; a fresh table load builds a
//! fresh curriculum.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CurriculumError;

/// A curriculum track name (e.g. "Math")
pub type Subject = String;

/// Header names accepted for the subject column
const SUBJECT_COLUMNS: &[&str] = &["subject", "matiere", "matière"];

/// Header names accepted for the chapter column
const CHAPTER_COLUMNS: &[&str] = &["chapter", "chapitre"];

/// An ordered unit of content within a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    subject: Subject,
    name: String,
    position: usize,
}

impl Chapter {
    /// Subject this chapter belongs to
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Raw chapter name as written in the table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 0-based rank within the subject (table row order)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Human-readable label
    ///
    /// Names that already start with a digit keep the author's numbering;
    /// others get a `"{position+1}. "` prefix. The label is never parsed back.
    pub fn display_name(&self) -> String {
        if self.name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            self.name.clone()
        } else {
            format!("{}. {}", self.position + 1, self.name)
        }
    }
}

impl std::fmt::Display for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// All chapters of one subject, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTrack {
    subject: Subject,
    chapters: Vec<Chapter>,
}

impl SubjectTrack {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// A header row plus data rows, as handed over by the table loader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header matching one of `aliases` (case-insensitive, trimmed)
    fn column(&self, aliases: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            let h = h.trim().to_lowercase();
            aliases.iter().any(|a| *a == h)
        })
    }
}

/// Ordered chapter lists per subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Curriculum {
    tracks: Vec<SubjectTrack>,
}

impl Curriculum {
    /// A curriculum with no subjects ("no curriculum available")
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from (subject, chapter) rows
    ///
    /// Subjects keep their first-seen order, chapters their row order. Rows
    /// with a blank cell and chapter names repeated within a subject are
    /// skipped.
    pub fn from_rows<I, S, C>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: AsRef<str>,
    {
        let mut tracks: Vec<SubjectTrack> = Vec::new();

        for (row, (subject, chapter)) in rows.into_iter().enumerate() {
            let subject = subject.as_ref().trim();
            let chapter = chapter.as_ref().trim();

            if subject.is_empty() || chapter.is_empty() {
                warn!(row, subject, chapter, "Curriculum::from_rows: skipping row with blank cell");
                continue;
            }

            let track = match tracks.iter().position(|t| t.subject == subject) {
                Some(idx) => &mut tracks[idx],
                None => {
                    debug!(subject, "Curriculum::from_rows: new subject");
                    tracks.push(SubjectTrack {
                        subject: subject.to_string(),
                        chapters: Vec::new(),
                    });
                    let last = tracks.len() - 1;
                    &mut tracks[last]
                }
            };

            if track.chapters.iter().any(|c| c.name == chapter) {
                warn!(row, subject, chapter, "Curriculum::from_rows: skipping duplicate chapter");
                continue;
            }

            let position = track.chapters.len();
            track.chapters.push(Chapter {
                subject: subject.to_string(),
                name: chapter.to_string(),
                position,
            });
        }

        info!(subjects = tracks.len(), "Curriculum built");
        Self { tracks }
    }

    /// Build from a loaded table
    ///
    /// An absent table yields an empty curriculum. A table without the
    /// subject or chapter column is malformed.
    pub fn load(table: Option<&RawTable>) -> Result<Self, CurriculumError> {
        let Some(table) = table else {
            debug!("Curriculum::load: no table, using empty curriculum");
            return Ok(Self::empty());
        };

        let subject_col = table
            .column(SUBJECT_COLUMNS)
            .ok_or(CurriculumError::MissingColumn { column: "subject" })?;
        let chapter_col = table
            .column(CHAPTER_COLUMNS)
            .ok_or(CurriculumError::MissingColumn { column: "chapter" })?;
        debug!(subject_col, chapter_col, rows = table.rows.len(), "Curriculum::load: columns found");

        let needed = subject_col.max(chapter_col) + 1;
        let mut pairs = Vec::with_capacity(table.rows.len());
        for (idx, row) in table.rows.iter().enumerate() {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            if row.len() < needed {
                return Err(CurriculumError::ShortRow {
                    // 1-based, counting the header line
                    row: idx + 2,
                    found: row.len(),
                    expected: needed,
                });
            }
            pairs.push((row[subject_col].as_str(), row[chapter_col].as_str()));
        }

        Ok(Self::from_rows(pairs))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of subjects
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Subject names in first-seen order
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.subject.as_str())
    }

    pub fn tracks(&self) -> &[SubjectTrack] {
        &self.tracks
    }

    pub fn track(&self, subject: &str) -> Option<&SubjectTrack> {
        let subject = subject.trim();
        self.tracks.iter().find(|t| t.subject == subject)
    }

    /// Chapters of `subject`; empty for an unknown subject
    pub fn chapters(&self, subject: &str) -> &[Chapter] {
        self.track(subject).map(|t| t.chapters()).unwrap_or(&[])
    }

    pub fn chapter_count(&self, subject: &str) -> usize {
        self.chapters(subject).len()
    }

    pub fn chapter_at(&self, subject: &str, index: usize) -> Option<&Chapter> {
        self.chapters(subject).get(index)
    }

    /// Look up a chapter by its raw name within `subject`
    pub fn find_chapter(&self, subject: &str, name: &str) -> Option<&Chapter> {
        let name = name.trim();
        self.chapters(subject).iter().find(|c| c.name == name)
    }
}
