//! Prompt Builder
//!
//! Turns a [`SessionRequest`] into the instruction payload for the text
//! generator.

use eyre::Result;
use tracing::debug;

use super::loader::{PromptContext, PromptLoader};
use crate::session::{Learner, SessionRequest};

/// Separator placed between the request and the system rules in [`PromptPayload::combined`]
const SYSTEM_PREAMBLE: &str = "Instructions système à suivre impérativement : ";

/// Rendered prompts for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    /// Pedagogical rules and output format
    pub system: String,
    /// Parameters of this session
    pub user: String,
}

impl PromptPayload {
    /// Single text payload: request first, then the system rules
    pub fn combined(&self) -> String {
        format!("{}\n{}{}", self.user.trim_end(), SYSTEM_PREAMBLE, self.system)
    }
}

/// Builds prompt payloads for a learner
pub struct PromptBuilder {
    loader: PromptLoader,
    learner: Learner,
}

impl PromptBuilder {
    pub fn new(loader: PromptLoader, learner: Learner) -> Self {
        Self { loader, learner }
    }

    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    /// Render the system and request templates for `request`
    pub fn build(&self, request: &SessionRequest) -> Result<PromptPayload> {
        debug!(topic = %request.topic.describe(), "PromptBuilder::build: called");
        let ctx = PromptContext::for_session(request, &self.learner);

        let system = self.loader.render("session-system", &ctx)?;
        let user = self.loader.render("session-request", &ctx)?;
        debug!(system_len = system.len(), user_len = user.len(), "PromptBuilder::build: rendered");

        Ok(PromptPayload { system, user })
    }
}
