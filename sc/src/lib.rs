//! StudyCore - curriculum progression and context assembly for study sessions
//!
//! Decides *what to teach next* and packs everything the text generator needs
//! into one bounded instruction payload. No I/O happens here: callers hand in
//! the curriculum table, reference text and uploaded document as plain values
//! and receive plain values back.
//!
//! # Pipeline
//!
//! ```text
//! RawTable ──► Curriculum ──┐
//!                           ├──► resolve() ──► ResolvedTopic ──┐
//! ProgressState ────────────┘                                  ├──► SessionRequest ──► PromptBuilder ──► PromptPayload
//! library + document + progress summary ──► assemble() ─────────┘
//! ```
//!
//! # Modules
//!
//! - [`curriculum`] - per-subject ordered chapter lists
//! - [`progress`] - last completed chapter per subject, completion percentage
//! - [`context`] - bounded concatenation of reference/document/progress text
//! - [`resolver`] - explicit topic or "next chapter" resolution
//! - [`session`] - mood, tool preference and the assembled session request
//! - [`prompts`] - Handlebars prompt templates and the payload builder
//!
//! # Example
//!
//! ```ignore
//! use studycore::{Curriculum, ProgressState, TopicRequest, resolve};
//!
//! let curriculum = Curriculum::from_rows([("Math", "Fractions"), ("Math", "Equations")]);
//! let mut progress = ProgressState::new();
//! progress.set_last_completed(&curriculum, "Math", Some("Fractions"))?;
//! let topic = resolve(&TopicRequest::Next, &["Math".to_string()], &progress, &curriculum)?;
//! ```

pub mod context;
pub mod curriculum;
pub mod error;
pub mod progress;
pub mod prompts;
pub mod resolver;
pub mod session;

pub use context::{ContextBlob, assemble};
pub use curriculum::{Chapter, Curriculum, RawTable, Subject, SubjectTrack};
pub use error::{CurriculumError, ProgressError, ResolveError};
pub use progress::{Completion, ProgressSnapshot, ProgressState};
pub use prompts::{PromptBuilder, PromptContext, PromptLoader, PromptPayload};
pub use resolver::{NextCandidate, NextPlan, ResolvedTopic, TopicRequest, is_sentinel, normalize_scope, resolve};
pub use session::{Learner, Mood, SessionInputs, SessionRequest, ToolPreference};

/// Default budget for the reference-library portion of the context (characters)
pub const DEFAULT_MAX_LIBRARY_CHARS: usize = 20_000;

/// Reserved topic meaning "infer the next chapter automatically"
pub const SUITE_SENTINEL: &str = "SUITE";
