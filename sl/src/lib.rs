//! StudyLab - personal tutoring assistant
//!
//! Wires the `studycore` progression resolver and context assembler to the
//! outside world: the curriculum CSV, the reference library on disk, the
//! persisted progress snapshot and a hosted text generator.
//!
//! # Modules
//!
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`table`] - Curriculum CSV reading
//! - [`library`] - Reference library and uploaded document text
//! - [`store`] - Progress snapshot persistence
//! - [`llm`] - Generation client trait and Gemini implementation
//! - [`workspace`] - One run's curriculum, progress and prompt builder

pub mod cli;
pub mod config;
pub mod library;
pub mod llm;
pub mod store;
pub mod table;
pub mod workspace;

pub use config::Config;
pub use workspace::Workspace;
