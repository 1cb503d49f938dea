//! Prompt templates
//!
//! Handlebars templates for the session prompts, with embedded defaults and
//! an optional override directory.

mod builder;
mod embedded;
mod loader;

pub use builder::{PromptBuilder, PromptPayload};
pub use embedded::get_embedded;
pub use loader::{CandidateLine, PromptContext, PromptLoader};
