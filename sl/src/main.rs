//! StudyLab - personal tutoring assistant
//!
//! CLI entry point for resolving the next lesson and generating study sessions.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use studycore::{Mood, ProgressError, ResolveError, ResolvedTopic, ToolPreference, TopicRequest, resolve};
use studylab::cli::{Cli, Command, RequestArgs};
use studylab::config::Config;
use studylab::llm::create_client;
use studylab::workspace::Workspace;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studylab")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other.to_lowercase());
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("studylab.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("StudyLab loaded config: provider={} model={}", config.llm.provider, config.llm.model);

    let mut workspace = Workspace::open(config).context("Failed to open workspace")?;
    for warning in workspace.warnings() {
        eprintln!("{} {}", "⚠".yellow(), warning.yellow());
    }

    debug!(command = ?cli.command, "main: dispatching command");
    let result = match cli.command {
        Command::Session {
            request,
            mood,
            tool,
            document,
            output,
            dry_run,
        } => {
            debug!(?mood, ?tool, dry_run, "main: matched Session command");
            cmd_session(&workspace, request, mood, tool, document, output, dry_run).await
        }
        Command::Next { subjects } => {
            debug!(?subjects, "main: matched Next command");
            cmd_next(&workspace, &subjects)
        }
        Command::Progress => {
            debug!("main: matched Progress command");
            cmd_progress(&workspace)
        }
        Command::Complete { subject, chapter } => {
            debug!(%subject, ?chapter, "main: matched Complete command");
            cmd_complete(&mut workspace, &subject, chapter.as_deref())
        }
        Command::Reset => {
            debug!("main: matched Reset command");
            cmd_reset(&mut workspace)
        }
        Command::Curriculum => {
            debug!("main: matched Curriculum command");
            cmd_curriculum(&workspace)
        }
    };

    // Resolver and progress failures ask the learner to change the request, not crash
    if let Err(e) = result {
        if let Some(resolve_error) = e.downcast_ref::<ResolveError>() {
            warn!(error = %resolve_error, "main: request could not be resolved");
            eprintln!("{} {}", "⚠".yellow(), resolve_error.to_string().yellow());
            if !resolve_error.is_user_actionable() {
                eprintln!(
                    "  Check the curriculum table at {}",
                    workspace.config().paths.curriculum.display()
                );
            }
            return Ok(());
        }
        if let Some(progress_error) = e.chain().find_map(|cause| cause.downcast_ref::<ProgressError>()) {
            warn!(error = %progress_error, "main: progress not recorded");
            eprintln!("{} {}", "⚠".yellow(), progress_error.to_string().yellow());
            print_chapter_hint(&workspace, progress_error);
            return Ok(());
        }
        return Err(e);
    }
    Ok(())
}

/// List the valid chapters of the subject a progress update was rejected for
fn print_chapter_hint(workspace: &Workspace, error: &ProgressError) {
    let subject = match error {
        ProgressError::InvalidChapter { subject, .. } | ProgressError::DivisionUndefined { subject } => subject,
    };
    let chapters: Vec<String> = workspace
        .curriculum()
        .chapters(subject)
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    if chapters.is_empty() {
        eprintln!(
            "  '{}' has no chapters in {}",
            subject,
            workspace.config().paths.curriculum.display()
        );
    } else {
        eprintln!("  Chapters of {}: {}", subject, chapters.join(", "));
    }
}

async fn cmd_session(
    workspace: &Workspace,
    request: RequestArgs,
    mood: Mood,
    tool: ToolPreference,
    document: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    debug!(subjects = ?request.subjects, "cmd_session: called");
    let inputs = workspace.inputs(
        request.subjects.clone(),
        request.topic_request(),
        mood,
        tool,
        document.as_deref(),
    )?;
    let (session, payload) = workspace.prepare(&inputs)?;

    print_topic(&session.topic);
    if session.context.was_truncated() {
        eprintln!(
            "{} Reference library truncated: {} characters dropped",
            "⚠".yellow(),
            session.context.library_chars_dropped()
        );
    }

    if dry_run {
        debug!("cmd_session: dry run, printing prompt");
        println!("{}", payload.combined());
        return Ok(());
    }

    workspace.config().validate()?;
    let client = create_client(&workspace.config().llm)?;

    eprintln!("{} {}", "…".cyan(), mood.label());
    let sheet = workspace.send(client.as_ref(), &payload).await?;

    match output {
        Some(path) => {
            fs::write(&path, &sheet).context(format!("Failed to write {}", path.display()))?;
            println!("{} Session written to {}", "✓".green(), path.display());
        }
        None => println!("{}", sheet),
    }
    Ok(())
}

fn print_topic(topic: &ResolvedTopic) {
    match topic {
        ResolvedTopic::Literal(text) => {
            eprintln!("{} {}", "Topic:".bold(), text.cyan());
        }
        ResolvedTopic::Next(plan) => {
            for candidate in &plan.candidates {
                eprintln!(
                    "{} {} : {}",
                    "→".green(),
                    candidate.subject.bold(),
                    candidate.chapter.display_name().cyan()
                );
            }
            for subject in &plan.completed {
                eprintln!("{} {} : complete", "✓".green(), subject.bold());
            }
            for subject in &plan.no_data {
                eprintln!("{} {} : no chapters", "⚠".yellow(), subject.bold());
            }
        }
    }
}

fn cmd_next(workspace: &Workspace, subjects: &[String]) -> Result<()> {
    debug!(?subjects, "cmd_next: called");
    let topic = resolve(
        &TopicRequest::Next,
        subjects,
        workspace.progress(),
        workspace.curriculum(),
    )?;
    print_topic(&topic);
    println!("{}", topic.describe());
    Ok(())
}

fn cmd_progress(workspace: &Workspace) -> Result<()> {
    debug!("cmd_progress: called");
    let curriculum = workspace.curriculum();
    let progress = workspace.progress();

    if curriculum.is_empty() {
        println!(
            "No curriculum loaded from {}",
            workspace.config().paths.curriculum.display()
        );
        return Ok(());
    }

    for track in curriculum.tracks() {
        let subject = track.subject();
        let done = progress.index(subject).map(|i| i + 1).unwrap_or(0);
        let last = progress
            .last_completed(curriculum, subject)
            .map(|c| c.display_name())
            .unwrap_or_else(|| "not started".to_string());
        let completion = progress.completion(curriculum, subject).to_string();

        let completion = if progress.is_complete(curriculum, subject) {
            completion.green()
        } else {
            completion.normal()
        };
        println!(
            "{} {:>5} ({}/{})  {}",
            format!("{:<24}", subject).bold(),
            completion,
            done,
            track.len(),
            last.dimmed()
        );
    }
    Ok(())
}

fn cmd_complete(workspace: &mut Workspace, subject: &str, chapter: Option<&str>) -> Result<()> {
    debug!(subject, ?chapter, "cmd_complete: called");
    workspace
        .complete(subject, chapter)
        .context(format!("Could not record progress for {}", subject))?;

    match workspace.progress().last_completed(workspace.curriculum(), subject) {
        Some(last) => println!(
            "{} {} : last completed « {} » ({})",
            "✓".green(),
            subject.bold(),
            last.display_name(),
            workspace.progress().completion(workspace.curriculum(), subject)
        ),
        None => println!("{} {} : not started", "✓".green(), subject.bold()),
    }
    Ok(())
}

fn cmd_reset(workspace: &mut Workspace) -> Result<()> {
    debug!("cmd_reset: called");
    workspace.reset()?;
    println!("{} Progress cleared", "✓".green());
    Ok(())
}

fn cmd_curriculum(workspace: &Workspace) -> Result<()> {
    debug!("cmd_curriculum: called");
    let curriculum = workspace.curriculum();
    if curriculum.is_empty() {
        println!(
            "No curriculum loaded from {}",
            workspace.config().paths.curriculum.display()
        );
        return Ok(());
    }

    for track in curriculum.tracks() {
        println!("{}", track.subject().bold());
        let last = workspace.progress().index(track.subject());
        for chapter in track.chapters() {
            let marker = match last {
                Some(idx) if chapter.position() <= idx => "✓".green(),
                Some(idx) if chapter.position() == idx + 1 => "→".cyan(),
                None if chapter.position() == 0 => "→".cyan(),
                _ => " ".normal(),
            };
            println!("  {} {}", marker, chapter.display_name());
        }
    }
    Ok(())
}
