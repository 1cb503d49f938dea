//! Progress Tracker
//!
//! Records the last completed chapter per subject and derives completion
//! percentages from the curriculum. State lives only as long as the current
//! session; durable storage goes through [`ProgressSnapshot`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::curriculum::{Chapter, Curriculum, Subject};
use crate::error::ProgressError;

/// Completion of one subject, ready for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Fraction of chapters completed, in [0, 1]
    Percent(f64),
    /// The subject has no chapters
    NoData,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{:.0}%", p * 100.0),
            Self::NoData => write!(f, "no data"),
        }
    }
}

/// Serialisable progress: subject -> name of the last completed chapter
///
/// Names are stored instead of positions so a snapshot survives a curriculum
/// reload where rows were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub completed: BTreeMap<Subject, String>,

    #[serde(default, rename = "updated-at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Last completed chapter per subject; absent means "not started"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    last_completed: HashMap<Subject, usize>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `chapter` as the last completed chapter of `subject`
    ///
    /// `None` marks the subject as not started. A chapter outside the subject
    /// is rejected and the previous state is kept.
    pub fn set_last_completed(
        &mut self,
        curriculum: &Curriculum,
        subject: &str,
        chapter: Option<&str>,
    ) -> Result<(), ProgressError> {
        debug!(subject, ?chapter, "ProgressState::set_last_completed: called");
        let subject = subject.trim();

        match chapter {
            None => {
                debug!(subject, "ProgressState::set_last_completed: reset to not started");
                self.last_completed.remove(subject);
            }
            Some(name) => {
                let found = curriculum
                    .find_chapter(subject, name)
                    .ok_or_else(|| ProgressError::InvalidChapter {
                        subject: subject.to_string(),
                        chapter: name.to_string(),
                    })?;
                debug!(subject, position = found.position(), "ProgressState::set_last_completed: recorded");
                self.last_completed.insert(subject.to_string(), found.position());
            }
        }
        Ok(())
    }

    /// Index of the last completed chapter, `None` if not started
    pub fn index(&self, subject: &str) -> Option<usize> {
        self.last_completed.get(subject.trim()).copied()
    }

    pub fn last_completed<'c>(&self, curriculum: &'c Curriculum, subject: &str) -> Option<&'c Chapter> {
        self.index(subject).and_then(|i| curriculum.chapter_at(subject, i))
    }

    /// Fraction of `subject` completed, in [0, 1]
    pub fn percent(&self, curriculum: &Curriculum, subject: &str) -> Result<f64, ProgressError> {
        let total = curriculum.chapter_count(subject);
        if total == 0 {
            debug!(subject, "ProgressState::percent: no chapters");
            return Err(ProgressError::DivisionUndefined {
                subject: subject.trim().to_string(),
            });
        }
        let done = self.index(subject).map_or(0, |i| i + 1).min(total);
        Ok(done as f64 / total as f64)
    }

    pub fn completion(&self, curriculum: &Curriculum, subject: &str) -> Completion {
        match self.percent(curriculum, subject) {
            Ok(p) => Completion::Percent(p),
            Err(_) => Completion::NoData,
        }
    }

    /// Whether every chapter of `subject` is done (false for empty subjects)
    pub fn is_complete(&self, curriculum: &Curriculum, subject: &str) -> bool {
        let total = curriculum.chapter_count(subject);
        total > 0 && self.index(subject).is_some_and(|i| i + 1 >= total)
    }

    pub fn reset(&mut self) {
        info!(subjects = self.last_completed.len(), "Progress reset");
        self.last_completed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.last_completed.is_empty()
    }

    /// One line per curriculum subject, in curriculum order
    ///
    /// ```text
    /// - Math : dernier chapitre terminé « 1. Fractions » (1/2, 50%)
    /// - History : pas encore commencé (0/1, 0%)
    /// ```
    pub fn summary(&self, curriculum: &Curriculum) -> String {
        let mut lines = Vec::with_capacity(curriculum.len());
        for track in curriculum.tracks() {
            let subject = track.subject();
            let total = track.len();
            let line = match (total, self.last_completed(curriculum, subject)) {
                (0, _) => format!("- {} : aucune donnée", subject),
                (_, Some(chapter)) => format!(
                    "- {} : dernier chapitre terminé « {} » ({}/{}, {})",
                    subject,
                    chapter.display_name(),
                    chapter.position() + 1,
                    total,
                    self.completion(curriculum, subject)
                ),
                (_, None) => format!(
                    "- {} : pas encore commencé (0/{}, {})",
                    subject,
                    total,
                    self.completion(curriculum, subject)
                ),
            };
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Snapshot for an external persistence collaborator
    pub fn export(&self, curriculum: &Curriculum) -> ProgressSnapshot {
        let completed = self
            .last_completed
            .iter()
            .filter_map(|(subject, &idx)| {
                curriculum
                    .chapter_at(subject, idx)
                    .map(|c| (subject.clone(), c.name().to_string()))
            })
            .collect();

        ProgressSnapshot {
            completed,
            updated_at: Some(Utc::now()),
        }
    }

    /// Rebuild state from a snapshot
    ///
    /// Entries that no longer match the curriculum are dropped and returned
    /// alongside the state so the caller can report them.
    pub fn load(snapshot: &ProgressSnapshot, curriculum: &Curriculum) -> (Self, Vec<ProgressError>) {
        let mut state = Self::new();
        let mut rejected = Vec::new();

        for (subject, chapter) in &snapshot.completed {
            if let Err(e) = state.set_last_completed(curriculum, subject, Some(chapter)) {
                warn!(error = %e, "ProgressState::load: dropping stale entry");
                rejected.push(e);
            }
        }

        debug!(
            kept = state.last_completed.len(),
            rejected = rejected.len(),
            "ProgressState::load: done"
        );
        (state, rejected)
    }
}
