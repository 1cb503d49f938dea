//! Session request types
//!
//! A [`SessionRequest`] is everything one "generate" action needs: the
//! resolved topic, the learner's mood and tool preference, and the assembled
//! context. It is built fresh for every interaction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{ContextBlob, assemble};
use crate::curriculum::{Curriculum, Subject};
use crate::error::ResolveError;
use crate::progress::ProgressState;
use crate::resolver::{ResolvedTopic, TopicRequest, normalize_scope, resolve};

/// Energy level, which sets session length and intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// 15 minutes, listen/watch only
    Chill,
    /// 30 minutes, content plus one interactive activity
    #[default]
    Curious,
    /// 45 minutes, full plan
    Focus,
}

impl Mood {
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Chill => 15,
            Self::Curious => 30,
            Self::Focus => 45,
        }
    }

    /// Label as shown to the learner
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chill => "😴 Mode Chill (15 min - Juste écouter)",
            Self::Curious => "🧐 Mode Curieuse (30 min - Vidéo + Jeu)",
            Self::Focus => "🚀 Mode Focus (45 min - Plan complet)",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chill => write!(f, "chill"),
            Self::Curious => write!(f, "curious"),
            Self::Focus => write!(f, "focus"),
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chill" => Ok(Self::Chill),
            "curious" | "curieuse" | "curieux" => Ok(Self::Curious),
            "focus" => Ok(Self::Focus),
            _ => Err(format!("Unknown mood: {}. Use: chill, curious, or focus", s)),
        }
    }
}

/// Preferred kind of learning material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolPreference {
    /// Balanced mix
    #[default]
    Surprise,
    /// Lumni videos only
    Lumni,
    /// Native tablet apps and interactive sites
    Ipad,
}

impl ToolPreference {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Surprise => "🎲 Surprends-moi",
            Self::Lumni => "📺 Full Lumni (Vidéo)",
            Self::Ipad => "📱 Team iPad (Apps & Tactile)",
        }
    }
}

impl std::fmt::Display for ToolPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surprise => write!(f, "surprise"),
            Self::Lumni => write!(f, "lumni"),
            Self::Ipad => write!(f, "ipad"),
        }
    }
}

impl std::str::FromStr for ToolPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "surprise" | "mix" => Ok(Self::Surprise),
            "lumni" | "video" => Ok(Self::Lumni),
            "ipad" | "tablet" => Ok(Self::Ipad),
            _ => Err(format!("Unknown tool preference: {}. Use: surprise, lumni, or ipad", s)),
        }
    }
}

/// Who the session is generated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Learner {
    pub name: String,

    /// Free-text profile: age, grade, location, constraints
    pub profile: String,
}

impl Default for Learner {
    fn default() -> Self {
        Self {
            name: "l'élève".to_string(),
            profile: String::new(),
        }
    }
}

/// Raw form input for one "generate" action
#[derive(Debug, Clone)]
pub struct SessionInputs {
    pub topic: TopicRequest,
    pub subjects: Vec<Subject>,
    pub mood: Mood,
    pub tool: ToolPreference,
    pub document_text: String,
    pub library_text: String,
}

impl Default for SessionInputs {
    fn default() -> Self {
        Self {
            topic: TopicRequest::Next,
            subjects: Vec::new(),
            mood: Mood::default(),
            tool: ToolPreference::default(),
            document_text: String::new(),
            library_text: String::new(),
        }
    }
}

/// The resolved teaching instruction
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    /// Subjects in scope, trimmed and de-duplicated
    pub subjects: Vec<Subject>,
    pub topic: ResolvedTopic,
    pub mood: Mood,
    pub tool: ToolPreference,
    pub context: ContextBlob,
}

impl SessionRequest {
    /// Resolve the topic and assemble the context for `inputs`
    pub fn prepare(
        inputs: &SessionInputs,
        curriculum: &Curriculum,
        progress: &ProgressState,
        max_library_chars: usize,
    ) -> Result<Self, ResolveError> {
        debug!(subjects = ?inputs.subjects, mood = %inputs.mood, tool = %inputs.tool, "SessionRequest::prepare: called");
        let topic = resolve(&inputs.topic, &inputs.subjects, progress, curriculum)?;

        let summary = progress.summary(curriculum);
        let context = assemble(&inputs.library_text, &inputs.document_text, &summary, max_library_chars);
        debug!(context_len = context.as_str().len(), truncated = context.was_truncated(), "SessionRequest::prepare: context assembled");

        Ok(Self {
            subjects: normalize_scope(&inputs.subjects),
            topic,
            mood: inputs.mood,
            tool: inputs.tool,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_parse_and_display() {
        assert_eq!("chill".parse::<Mood>().unwrap(), Mood::Chill);
        assert_eq!("Curieuse".parse::<Mood>().unwrap(), Mood::Curious);
        assert_eq!("FOCUS".parse::<Mood>().unwrap(), Mood::Focus);
        assert!("sleepy".parse::<Mood>().is_err());

        assert_eq!(Mood::Focus.to_string(), "focus");
        assert_eq!(Mood::Chill.minutes(), 15);
        assert_eq!(Mood::default(), Mood::Curious);
        assert!(Mood::Curious.label().contains("30 min"));
    }

    #[test]
    fn test_tool_parse_and_display() {
        assert_eq!("ipad".parse::<ToolPreference>().unwrap(), ToolPreference::Ipad);
        assert_eq!("Lumni".parse::<ToolPreference>().unwrap(), ToolPreference::Lumni);
        assert!("tv".parse::<ToolPreference>().is_err());
        assert_eq!(ToolPreference::default().to_string(), "surprise");
    }

    #[test]
    fn test_mood_serde() {
        let json = serde_json::to_string(&Mood::Focus).unwrap();
        assert_eq!(json, "\"focus\"");
        let tool: ToolPreference = serde_json::from_str("\"ipad\"").unwrap();
        assert_eq!(tool, ToolPreference::Ipad);
    }

    #[test]
    fn test_prepare_next_session() {
        let c = Curriculum::from_rows([("Math", "Fractions"), ("Math", "Equations")]);
        let mut p = ProgressState::new();
        p.set_last_completed(&c, "Math", Some("Fractions")).unwrap();

        let inputs = SessionInputs {
            subjects: vec!["Math".to_string()],
            mood: Mood::Focus,
            document_text: "Exercice 3 page 42".to_string(),
            library_text: "Programme officiel".to_string(),
            ..Default::default()
        };

        let request = SessionRequest::prepare(&inputs, &c, &p, 1000).unwrap();
        assert_eq!(request.topic.describe(), "Math : 2. Equations");
        assert_eq!(request.mood, Mood::Focus);
        assert!(request.context.as_str().contains("Programme officiel"));
        assert!(request.context.as_str().contains("Exercice 3 page 42"));
        assert!(request.context.as_str().contains("- Math : dernier chapitre terminé"));
    }

    #[test]
    fn test_prepare_keeps_normalized_scope() {
        let c = Curriculum::from_rows([("Math", "Fractions"), ("History", "WWI")]);
        let inputs = SessionInputs {
            subjects: vec![" Math ".to_string(), "History".to_string(), "Math".to_string(), "".to_string()],
            ..Default::default()
        };

        let request = SessionRequest::prepare(&inputs, &c, &ProgressState::new(), 1000).unwrap();
        assert_eq!(request.subjects, vec!["Math".to_string(), "History".to_string()]);
        assert_eq!(request.topic.describe(), "Math : 1. Fractions ; History : 1. WWI");
    }

    #[test]
    fn test_prepare_propagates_resolve_error() {
        let inputs = SessionInputs::default();
        let err = SessionRequest::prepare(&inputs, &Curriculum::empty(), &ProgressState::new(), 1000).unwrap_err();
        assert_eq!(err, ResolveError::NoScopeSelected);
    }

    #[test]
    fn test_prepare_with_nothing_to_assemble() {
        let inputs = SessionInputs {
            topic: TopicRequest::literal("Les Volcans"),
            ..Default::default()
        };
        let request = SessionRequest::prepare(&inputs, &Curriculum::empty(), &ProgressState::new(), 1000).unwrap();
        assert!(request.context.is_empty());
    }
}
