//! Workspace: the loaded curriculum, progress and prompt builder for one run
//!
//! The workspace is the only place where core values meet the filesystem. It
//! loads the curriculum and the progress snapshot once, hands plain values to
//! `studycore`, and persists progress after explicit user changes.

use std::collections::BTreeMap;
use std::path::Path;

use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use studycore::{
    Curriculum, Mood, ProgressError, ProgressSnapshot, ProgressState, PromptBuilder, PromptLoader, PromptPayload,
    SessionInputs, SessionRequest, Subject, ToolPreference, TopicRequest,
};

use crate::config::Config;
use crate::library::{load_library, read_document};
use crate::llm::{CompletionRequest, LlmClient};
use crate::store::ProgressStore;
use crate::table::load_curriculum;

/// Everything needed to turn a form submission into a session sheet
pub struct Workspace {
    config: Config,
    curriculum: Curriculum,
    progress: ProgressState,
    /// Snapshot entries for subjects the current curriculum does not list
    carried: BTreeMap<Subject, String>,
    store: ProgressStore,
    /// The saved progress could not be read; only `reset` may overwrite it
    store_unreadable: bool,
    builder: PromptBuilder,
    warnings: Vec<String>,
}

impl Workspace {
    /// Load the curriculum and progress named in `config`
    ///
    /// A malformed curriculum table becomes a warning and an empty curriculum.
    /// An unreadable progress file becomes a warning and empty progress; it
    /// is left on disk until [`Workspace::reset`] replaces it.
    pub fn open(config: Config) -> Result<Self> {
        debug!(curriculum = %config.paths.curriculum.display(), progress = %config.paths.progress.display(), "Workspace::open: called");
        let mut warnings = Vec::new();

        let (curriculum, problem) = load_curriculum(&config.paths.curriculum);
        if let Some(report) = problem {
            warnings.push(format!("{:#}", report));
        }

        let store = ProgressStore::new(config.paths.progress.clone());
        let (snapshot, store_unreadable) = match store.load() {
            Ok(snapshot) => (snapshot, false),
            Err(e) => {
                warn!(error = %e, "Workspace::open: unreadable progress, starting empty");
                warnings.push(format!("{:#}. Run `sl reset` to start over.", e));
                (ProgressSnapshot::default(), true)
            }
        };
        let (progress, rejected) = ProgressState::load(&snapshot, &curriculum);

        let carried: BTreeMap<Subject, String> = snapshot
            .completed
            .iter()
            .filter(|(subject, _)| curriculum.chapter_count(subject) == 0)
            .map(|(s, c)| (s.clone(), c.clone()))
            .collect();
        for error in rejected {
            let unlisted = matches!(&error, ProgressError::InvalidChapter { subject, .. } if carried.contains_key(subject));
            if !unlisted {
                warnings.push(format!("Ignoring saved progress: {}", error));
            }
        }
        if !carried.is_empty() {
            debug!(subjects = ?carried.keys().collect::<Vec<_>>(), "Workspace::open: keeping progress for unlisted subjects");
        }

        let loader = PromptLoader::new(&config.paths.prompts_dir);
        let builder = PromptBuilder::new(loader, config.learner.clone());

        info!(
            subjects = curriculum.len(),
            saved = snapshot.completed.len(),
            "Workspace opened"
        );
        Ok(Self {
            config,
            curriculum,
            progress,
            carried,
            store,
            store_unreadable,
            builder,
            warnings,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    /// Problems found while loading, for display
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Collect form inputs, reading the library and the optional document
    pub fn inputs(
        &self,
        subjects: Vec<Subject>,
        topic: TopicRequest,
        mood: Mood,
        tool: ToolPreference,
        document: Option<&Path>,
    ) -> Result<SessionInputs> {
        debug!(?subjects, ?topic, "Workspace::inputs: called");
        let library_text = load_library(&self.config.paths.library)?;
        let document_text = read_document(document)?;

        Ok(SessionInputs {
            topic,
            subjects,
            mood,
            tool,
            document_text,
            library_text,
        })
    }

    /// Resolve the topic and render the prompt
    pub fn prepare(&self, inputs: &SessionInputs) -> Result<(SessionRequest, PromptPayload)> {
        debug!(subjects = ?inputs.subjects, "Workspace::prepare: called");
        let request = SessionRequest::prepare(
            inputs,
            &self.curriculum,
            &self.progress,
            self.config.context.max_library_chars,
        )?;

        if request.context.was_truncated() {
            warn!(
                dropped = request.context.library_chars_dropped(),
                "Workspace::prepare: reference library truncated"
            );
        }

        let payload = self.builder.build(&request)?;
        Ok((request, payload))
    }

    /// Send a rendered prompt and return the markdown sheet
    pub async fn send(&self, client: &dyn LlmClient, payload: &PromptPayload) -> Result<String> {
        debug!(system_len = payload.system.len(), user_len = payload.user.len(), "Workspace::send: called");
        let request = CompletionRequest {
            system_prompt: payload.system.clone(),
            prompt: payload.user.clone(),
            max_tokens: self.config.llm.max_tokens,
        };

        let response = client.complete(request).await.context("Session generation failed")?;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Session generated"
        );
        Ok(response.content)
    }

    /// Prepare and send in one step
    pub async fn generate(&self, client: &dyn LlmClient, inputs: &SessionInputs) -> Result<String> {
        let (_, payload) = self.prepare(inputs)?;
        self.send(client, &payload).await
    }

    /// Record `chapter` as the last completed chapter of `subject` and save
    pub fn complete(&mut self, subject: &str, chapter: Option<&str>) -> Result<()> {
        debug!(subject, ?chapter, "Workspace::complete: called");
        if self.store_unreadable {
            return Err(eyre!(
                "Saved progress at {} is unreadable; run `sl reset` before recording progress",
                self.store.path().display()
            ));
        }
        self.progress.set_last_completed(&self.curriculum, subject, chapter)?;
        self.carried.remove(subject.trim());
        self.save()
    }

    /// Forget all progress and save
    pub fn reset(&mut self) -> Result<()> {
        debug!("Workspace::reset: called");
        self.progress.reset();
        self.carried.clear();
        self.save()?;
        self.store_unreadable = false;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let mut snapshot = self.progress.export(&self.curriculum);
        for (subject, chapter) in &self.carried {
            snapshot
                .completed
                .entry(subject.clone())
                .or_insert_with(|| chapter.clone());
        }
        self.store.save(&snapshot)
    }
}
