//! Session Request Resolver
//!
//! Maps an explicit topic, or a request for "the next logical lesson", to the
//! concrete thing to teach. An explicit topic passes through untouched. A
//! "next" request walks every subject in scope and picks the chapter after
//! the last completed one.
//!
//! Scope problems are surfaced as errors; the resolver never guesses a
//! default subject.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::SUITE_SENTINEL;
use crate::curriculum::{Chapter, Curriculum, Subject};
use crate::error::ResolveError;
use crate::progress::ProgressState;

/// What the learner asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicRequest {
    /// Teach exactly this topic
    Literal(String),
    /// Continue with the next chapter of each subject in scope
    Next,
}

impl TopicRequest {
    /// Interpret free-form input
    ///
    /// The empty string and the `SUITE` sentinel (any case, whitespace
    /// ignored) mean [`TopicRequest::Next`]. Any other input, blank input
    /// included, is a literal topic. A topic genuinely named "Suite" cannot be
    /// expressed this way; build [`TopicRequest::Literal`] directly for that.
    pub fn parse(input: &str) -> Self {
        if input.is_empty() {
            debug!("TopicRequest::parse: empty input, using Next");
            return Self::Next;
        }
        if is_sentinel(input) {
            warn!(input, "TopicRequest::parse: sentinel matched, treating as next-chapter request");
            return Self::Next;
        }
        Self::Literal(input.to_string())
    }

    pub fn literal(topic: impl Into<String>) -> Self {
        Self::Literal(topic.into())
    }
}

/// Whether `input` is the reserved "next chapter" sentinel
pub fn is_sentinel(input: &str) -> bool {
    let squashed: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    squashed.eq_ignore_ascii_case(SUITE_SENTINEL)
}

/// One subject and the chapter to teach next in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextCandidate {
    pub subject: Subject,
    pub chapter: Chapter,
}

/// Outcome of a next-chapter request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NextPlan {
    /// Next chapters, in scope-selection order
    pub candidates: Vec<NextCandidate>,
    /// Subjects whose chapters are all done (to acknowledge)
    pub completed: Vec<Subject>,
    /// Subjects with no chapters in the curriculum
    pub no_data: Vec<Subject>,
}

/// The concrete teaching topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTopic {
    Literal(String),
    Next(NextPlan),
}

impl ResolvedTopic {
    /// One-line description, e.g. `Math : 2. Equations ; History : 1. WWI`
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(topic) => topic.clone(),
            Self::Next(plan) => plan
                .candidates
                .iter()
                .map(|c| format!("{} : {}", c.subject, c.chapter.display_name()))
                .collect::<Vec<_>>()
                .join(" ; "),
        }
    }

    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }
}

/// Trim `scope`, drop blank entries and duplicates, keep first-seen order
pub fn normalize_scope(scope: &[Subject]) -> Vec<Subject> {
    let mut subjects: Vec<Subject> = Vec::with_capacity(scope.len());
    for s in scope.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !subjects.iter().any(|seen| seen == s) {
            subjects.push(s.to_string());
        }
    }
    subjects
}

/// Resolve `request` against the learner's progress
///
/// `scope` goes through [`normalize_scope`] first.
pub fn resolve(
    request: &TopicRequest,
    scope: &[Subject],
    progress: &ProgressState,
    curriculum: &Curriculum,
) -> Result<ResolvedTopic, ResolveError> {
    debug!(?request, ?scope, "resolve: called");

    if let TopicRequest::Literal(topic) = request {
        debug!("resolve: literal topic, pass-through");
        return Ok(ResolvedTopic::Literal(topic.clone()));
    }

    let subjects = normalize_scope(scope);
    if subjects.is_empty() {
        debug!("resolve: empty scope");
        return Err(ResolveError::NoScopeSelected);
    }

    let mut plan = NextPlan::default();
    for subject in subjects.iter().map(String::as_str) {
        let total = curriculum.chapter_count(subject);
        if total == 0 {
            debug!(subject, "resolve: subject has no chapters");
            plan.no_data.push(subject.to_string());
            continue;
        }

        let next_index = progress.index(subject).map_or(0, |i| i + 1);
        match curriculum.chapter_at(subject, next_index) {
            Some(chapter) => {
                debug!(subject, next_index, "resolve: candidate found");
                plan.candidates.push(NextCandidate {
                    subject: subject.to_string(),
                    chapter: chapter.clone(),
                });
            }
            None => {
                debug!(subject, next_index, total, "resolve: subject complete");
                plan.completed.push(subject.to_string());
            }
        }
    }

    if plan.candidates.is_empty() {
        if plan.no_data.is_empty() {
            return Err(ResolveError::NothingLeft {
                completed: plan.completed,
            });
        }
        return Err(ResolveError::NoChapters { subjects: plan.no_data });
    }

    info!(
        candidates = plan.candidates.len(),
        completed = plan.completed.len(),
        "Resolved next chapters"
    );
    Ok(ResolvedTopic::Next(plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Curriculum {
        Curriculum::from_rows([("Math", "Fractions"), ("Math", "Equations"), ("History", "WWI")])
    }

    fn scope(subjects: &[&str]) -> Vec<Subject> {
        subjects.iter().map(|s| s.to_string()).collect()
    }

    fn next_plan(topic: ResolvedTopic) -> NextPlan {
        match topic {
            ResolvedTopic::Next(plan) => plan,
            other => panic!("expected next plan, got {:?}", other),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(TopicRequest::parse(""), TopicRequest::Next);
        assert_eq!(TopicRequest::parse("   "), TopicRequest::Literal("   ".to_string()));
        assert_eq!(TopicRequest::parse("SUITE"), TopicRequest::Next);
        assert_eq!(TopicRequest::parse(" suite "), TopicRequest::Next);
        assert_eq!(TopicRequest::parse("Su ite"), TopicRequest::Next);
        assert_eq!(
            TopicRequest::parse("Suite arithmétique"),
            TopicRequest::Literal("Suite arithmétique".to_string())
        );
        assert_eq!(
            TopicRequest::parse(" Les Volcans "),
            TopicRequest::Literal(" Les Volcans ".to_string())
        );
    }

    // Scenario A
    #[test]
    fn test_next_after_first_chapter() {
        let c = table();
        let mut p = ProgressState::new();
        p.set_last_completed(&c, "Math", Some("Fractions")).unwrap();

        let plan = next_plan(resolve(&TopicRequest::parse("SUITE"), &scope(&["Math"]), &p, &c).unwrap());
        assert_eq!(plan.candidates.len(), 1);
        assert_eq!(plan.candidates[0].subject, "Math");
        assert_eq!(plan.candidates[0].chapter.name(), "Equations");
        assert!(plan.completed.is_empty());
    }

    // Scenario B
    #[test]
    fn test_last_chapter_done_is_nothing_left() {
        let c = table();
        let mut p = ProgressState::new();
        p.set_last_completed(&c, "Math", Some("Equations")).unwrap();

        let err = resolve(&TopicRequest::Next, &scope(&["Math"]), &p, &c).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NothingLeft {
                completed: vec!["Math".to_string()]
            }
        );
    }

    // Scenario C
    #[test]
    fn test_empty_scope() {
        let c = table();
        let p = ProgressState::new();
        assert_eq!(
            resolve(&TopicRequest::parse("SUITE"), &[], &p, &c),
            Err(ResolveError::NoScopeSelected)
        );
        assert_eq!(
            resolve(&TopicRequest::Next, &scope(&["", "  "]), &p, &c),
            Err(ResolveError::NoScopeSelected)
        );
    }

    // Scenario D
    #[test]
    fn test_literal_pass_through() {
        let c = table();
        let p = ProgressState::new();
        let topic = resolve(&TopicRequest::parse("Photosynthesis"), &[], &p, &c).unwrap();
        assert_eq!(topic, ResolvedTopic::Literal("Photosynthesis".to_string()));
        assert_eq!(topic.describe(), "Photosynthesis");
        assert!(!topic.is_next());
    }

    #[test]
    fn test_blank_topic_is_literal() {
        let c = table();
        let p = ProgressState::new();
        let topic = resolve(&TopicRequest::parse("   "), &[], &p, &c).unwrap();
        assert_eq!(topic, ResolvedTopic::Literal("   ".to_string()));
    }

    #[test]
    fn test_normalize_scope() {
        assert_eq!(
            normalize_scope(&scope(&[" Math", "", "History", "Math ", "  "])),
            scope(&["Math", "History"])
        );
        assert!(normalize_scope(&[]).is_empty());
    }

    #[test]
    fn test_not_started_gives_first_chapter() {
        let c = table();
        let p = ProgressState::new();
        let plan = next_plan(resolve(&TopicRequest::Next, &scope(&["History"]), &p, &c).unwrap());
        assert_eq!(plan.candidates[0].chapter.position(), 0);
        assert_eq!(plan.candidates[0].chapter.name(), "WWI");
    }

    #[test]
    fn test_mixed_scope_keeps_order_and_reports_complete() {
        let c = table();
        let mut p = ProgressState::new();
        p.set_last_completed(&c, "History", Some("WWI")).unwrap();

        let topic = resolve(&TopicRequest::Next, &scope(&["History", "Math", "History"]), &p, &c).unwrap();
        assert_eq!(topic.describe(), "Math : 1. Fractions");

        let plan = next_plan(topic);
        assert_eq!(plan.candidates.len(), 1);
        assert_eq!(plan.completed, vec!["History".to_string()]);
    }

    #[test]
    fn test_candidates_follow_scope_order() {
        let c = table();
        let p = ProgressState::new();
        let topic = resolve(&TopicRequest::Next, &scope(&["History", "Math"]), &p, &c).unwrap();
        assert_eq!(topic.describe(), "History : 1. WWI ; Math : 1. Fractions");
    }

    #[test]
    fn test_unknown_subject_is_no_data() {
        let c = table();
        let p = ProgressState::new();

        let err = resolve(&TopicRequest::Next, &scope(&["Physics"]), &p, &c).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoChapters {
                subjects: vec!["Physics".to_string()]
            }
        );

        let plan = next_plan(resolve(&TopicRequest::Next, &scope(&["Physics", "Math"]), &p, &c).unwrap());
        assert_eq!(plan.no_data, vec!["Physics".to_string()]);
        assert_eq!(plan.candidates.len(), 1);
    }

    #[test]
    fn test_empty_curriculum() {
        let c = Curriculum::empty();
        let p = ProgressState::new();
        assert!(matches!(
            resolve(&TopicRequest::Next, &scope(&["Math"]), &p, &c),
            Err(ResolveError::NoChapters { .. })
        ));
    }
}
