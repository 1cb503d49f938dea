//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to the
//! embedded defaults, and renders them with Handlebars.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::resolver::ResolvedTopic;
use crate::session::{Learner, SessionRequest};

/// One next-chapter line of the session request
#[derive(Debug, Clone, Serialize)]
pub struct CandidateLine {
    pub subject: String,
    pub chapter: String,
}

/// Context for rendering prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub learner_name: String,
    pub learner_profile: String,
    /// Literal topic (empty in next-chapter mode)
    pub topic: String,
    /// Next-chapter mode?
    pub is_next: bool,
    pub candidates: Vec<CandidateLine>,
    /// Completed subjects, comma separated
    pub completed: String,
    /// Mood label as shown to the learner
    pub mood: String,
    pub minutes: u32,
    /// Tool preference label as shown to the learner
    pub tool: String,
    /// Assembled context blob (may be empty)
    pub context: String,
}

impl PromptContext {
    /// Create the context for one session request
    pub fn for_session(request: &SessionRequest, learner: &Learner) -> Self {
        debug!(learner = %learner.name, is_next = request.topic.is_next(), "PromptContext::for_session: called");
        let (topic, candidates, completed) = match &request.topic {
            ResolvedTopic::Literal(topic) => (topic.clone(), Vec::new(), String::new()),
            ResolvedTopic::Next(plan) => (
                String::new(),
                plan.candidates
                    .iter()
                    .map(|c| CandidateLine {
                        subject: c.subject.clone(),
                        chapter: c.chapter.display_name(),
                    })
                    .collect(),
                plan.completed.join(", "),
            ),
        };

        Self {
            learner_name: learner.name.clone(),
            learner_profile: learner.profile.clone(),
            topic,
            is_next: request.topic.is_next(),
            candidates,
            completed,
            mood: request.mood.label().to_string(),
            minutes: request.mood.minutes(),
            tool: request.tool.label().to_string(),
            context: request.context.as_str().to_string(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine (HTML escaping disabled, output is markdown)
    hbs: Handlebars<'static>,
    /// Override directory holding `{name}.pmt` files
    prompts_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `prompts_dir` before the embedded defaults
    pub fn new(prompts_dir: impl AsRef<Path>) -> Self {
        let dir = prompts_dir.as_ref();
        let prompts_dir = if dir.is_dir() {
            Some(dir.to_path_buf())
        } else {
            debug!(?dir, "PromptLoader::new: override directory not found, using embedded only");
            None
        };
        Self {
            hbs: markdown_handlebars(),
            prompts_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self {
            hbs: markdown_handlebars(),
            prompts_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{prompts_dir}/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.prompts_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}' for {}", template_name, context.learner_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

fn markdown_handlebars() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    hbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::assemble;
    use crate::curriculum::Curriculum;
    use crate::progress::ProgressState;
    use crate::resolver::{TopicRequest, resolve};
    use crate::session::{Mood, ToolPreference};

    fn literal_request(topic: &str) -> SessionRequest {
        SessionRequest {
            subjects: vec![],
            topic: ResolvedTopic::Literal(topic.to_string()),
            mood: Mood::Chill,
            tool: ToolPreference::Lumni,
            context: assemble("", "", "", 100),
        }
    }

    #[test]
    fn test_context_for_literal_topic() {
        let ctx = PromptContext::for_session(&literal_request("Les Volcans"), &Learner::default());
        assert_eq!(ctx.topic, "Les Volcans");
        assert!(!ctx.is_next);
        assert!(ctx.candidates.is_empty());
        assert_eq!(ctx.minutes, 15);
        assert!(ctx.tool.contains("Lumni"));
    }

    #[test]
    fn test_context_for_next_topic() {
        let c = Curriculum::from_rows([("Math", "Fractions"), ("History", "WWI")]);
        let mut p = ProgressState::new();
        p.set_last_completed(&c, "History", Some("WWI")).unwrap();
        let topic = resolve(
            &TopicRequest::Next,
            &["Math".to_string(), "History".to_string()],
            &p,
            &c,
        )
        .unwrap();

        let request = SessionRequest {
            subjects: vec![],
            topic,
            mood: Mood::Focus,
            tool: ToolPreference::Ipad,
            context: assemble("", "", "", 100),
        };
        let ctx = PromptContext::for_session(&request, &Learner::default());
        assert!(ctx.is_next);
        assert_eq!(ctx.candidates.len(), 1);
        assert_eq!(ctx.candidates[0].chapter, "1. Fractions");
        assert_eq!(ctx.completed, "History");
    }

    #[test]
    fn test_render_does_not_escape_markdown() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::for_session(&literal_request("Forces & <mouvement>"), &Learner::default());
        let out = loader.render("session-request", &ctx).unwrap();
        assert!(out.contains("- SUJET : Forces & <mouvement>"));
    }

    #[test]
    fn test_override_directory_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("session-request.pmt"), "Custom for {{learner_name}}").unwrap();

        let loader = PromptLoader::new(temp.path());
        let ctx = PromptContext::for_session(&literal_request("x"), &Learner::default());
        assert_eq!(loader.render("session-request", &ctx).unwrap(), "Custom for l'élève");

        // Templates not overridden still come from the embedded set
        assert!(loader.load_template("session-system").is_ok());
    }

    #[test]
    fn test_missing_override_directory_falls_back() {
        let loader = PromptLoader::new("/nonexistent/prompts/dir");
        assert!(loader.load_template("session-system").is_ok());
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
