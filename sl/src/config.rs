//! StudyLab configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use studycore::{DEFAULT_MAX_LIBRARY_CHARS, Learner};

/// Main StudyLab configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text generation provider configuration
    pub llm: LlmConfig,

    /// Who sessions are generated for
    pub learner: Learner,

    /// Context assembly limits
    pub context: ContextConfig,

    /// Input and state file locations
    pub paths: PathsConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before a generation call
    ///
    /// Checks that the API key environment variable is set, so a missing key
    /// is reported before any work is done.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .studylab.yml
        let local_config = PathBuf::from(".studylab.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/studylab/studylab.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("studylab").join("studylab.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed: a broken config file is reported later by
    /// [`Config::load`].
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [
                Some(PathBuf::from(".studylab.yml")),
                dirs::config_dir().map(|d| d.join("studylab").join("studylab.yml")),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Text generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Context assembly limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Budget for the reference-library text, in characters
    #[serde(rename = "max-library-chars")]
    pub max_library_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_library_chars: DEFAULT_MAX_LIBRARY_CHARS,
        }
    }
}

/// Input and state file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Curriculum CSV (subject, chapter[, order])
    pub curriculum: PathBuf,

    /// Progress snapshot (JSON)
    pub progress: PathBuf,

    /// Glob patterns for reference-library files
    pub library: Vec<String>,

    /// Directory holding prompt template overrides (`{name}.pmt`)
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/studylab on Linux)
        let progress = dirs::data_dir()
            .map(|d| d.join("studylab"))
            .unwrap_or_else(|| PathBuf::from(".studylab"))
            .join("progress.json");

        Self {
            curriculum: PathBuf::from("programme.csv"),
            progress,
            library: vec!["bibliotheque/**/*.md".to_string(), "bibliotheque/**/*.txt".to_string()],
            prompts_dir: PathBuf::from(".studylab/prompts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.context.max_library_chars, DEFAULT_MAX_LIBRARY_CHARS);
        assert_eq!(config.paths.curriculum, PathBuf::from("programme.csv"));
        assert!(config.paths.progress.ends_with("progress.json"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.provider, "gemini");
        assert!(config.model.starts_with("gemini"));
        assert_eq!(config.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: gemini
  model: gemini-1.5-pro
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 4096
  timeout-ms: 60000

learner:
  name: Anna
  profile: 14 ans, 3ème, Réunion

context:
  max-library-chars: 30000

paths:
  curriculum: cours/programme.csv
  progress: /tmp/progress.json
  library:
    - "docs/*.md"
  prompts-dir: prompts

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.learner.name, "Anna");
        assert_eq!(config.context.max_library_chars, 30000);
        assert_eq!(config.paths.library, vec!["docs/*.md".to_string()]);
        assert_eq!(config.paths.prompts_dir, PathBuf::from("prompts"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
learner:
  name: Anna
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.learner.name, "Anna");

        // Defaults for unspecified
        assert!(config.learner.profile.is_empty());
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.context.max_library_chars, DEFAULT_MAX_LIBRARY_CHARS);
    }

    #[test]
    fn test_load_explicit_path_and_log_level() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("studylab.yml");
        fs::write(&path, "log-level: warn\ncontext:\n  max-library-chars: 15000\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.context.max_library_chars, 15000);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let missing = PathBuf::from("/nonexistent/studylab.yml");
        assert!(Config::load(Some(&missing)).is_err());
        assert!(Config::load_log_level(Some(&missing)).is_none());
    }

    #[test]
    #[serial]
    fn test_validate_checks_api_key_env() {
        let mut config = Config::default();
        config.llm.api_key_env = "STUDYLAB_TEST_API_KEY".to_string();

        // SAFETY: serialised with other env-mutating tests
        unsafe { std::env::remove_var("STUDYLAB_TEST_API_KEY") };
        assert!(config.validate().is_err());
        assert!(config.llm.get_api_key().is_err());

        unsafe { std::env::set_var("STUDYLAB_TEST_API_KEY", "secret") };
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.get_api_key().unwrap(), "secret");

        unsafe { std::env::remove_var("STUDYLAB_TEST_API_KEY") };
    }
}
