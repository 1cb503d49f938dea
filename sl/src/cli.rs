//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use studycore::{Mood, ToolPreference, TopicRequest};

/// StudyLab - personal tutoring assistant
#[derive(Parser, Debug)]
#[command(
    name = "sl",
    author,
    version,
    about = "Personal tutoring assistant: picks the next lesson and generates a study session",
    after_help = "Logs are written to: ~/.local/share/studylab/logs/studylab.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a study session
    Session {
        #[command(flatten)]
        request: RequestArgs,

        /// Energy level: chill, curious, focus
        #[arg(short, long, default_value = "curious")]
        mood: Mood,

        /// Tool preference: surprise, lumni, ipad
        #[arg(short = 'T', long, default_value = "surprise")]
        tool: ToolPreference,

        /// Plain-text document to include in the context
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Write the generated sheet to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the prompt without calling the generator
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what would be taught next
    Next {
        /// Subjects in scope (repeatable, in priority order)
        #[arg(short, long = "subject", required = true)]
        subjects: Vec<String>,
    },

    /// Show completion per subject
    Progress,

    /// Record the last completed chapter of a subject
    Complete {
        /// Subject name
        subject: String,

        /// Chapter name; omit to mark the subject as not started
        chapter: Option<String>,
    },

    /// Forget all recorded progress
    Reset,

    /// List subjects and chapters
    Curriculum,
}

/// Topic and scope of a session request
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Subjects in scope (repeatable, in priority order)
    #[arg(short, long = "subject")]
    pub subjects: Vec<String>,

    /// Topic to explore; empty or "SUITE" continues the curriculum
    #[arg(short, long, conflicts_with = "next")]
    pub topic: Option<String>,

    /// Continue with the next chapter of each subject
    #[arg(short, long)]
    pub next: bool,

    /// Treat --topic literally, even if it reads "SUITE"
    #[arg(long, requires = "topic")]
    pub literal: bool,
}

impl RequestArgs {
    /// Interpret the topic flags
    pub fn topic_request(&self) -> TopicRequest {
        match (&self.topic, self.next, self.literal) {
            (_, true, _) => TopicRequest::Next,
            (Some(topic), false, true) => TopicRequest::literal(topic.clone()),
            (Some(topic), false, false) => TopicRequest::parse(topic),
            (None, false, _) => TopicRequest::Next,
        }
    }
}
