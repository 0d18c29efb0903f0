use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn. Closed set — a session never stores anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One role-tagged message within a session. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Style sub-variant selector. Fixed vocabulary; anything else coerces to Mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    #[default]
    Mirror,
    Plain,
    Ritual,
    Dream,
}

impl GateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mirror => "mirror",
            Self::Plain => "plain",
            Self::Ritual => "ritual",
            Self::Dream => "dream",
        }
    }

    /// Strict parse — `None` for anything outside the vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mirror" => Some(Self::Mirror),
            "plain" => Some(Self::Plain),
            "ritual" => Some(Self::Ritual),
            "dream" => Some(Self::Dream),
            _ => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Mirror)
    }
}

/// Legacy coarse persona selector. Older clients send aliases ("test",
/// "derin", "cocuk") which collapse onto the three fixed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    User,
    Deep,
    Child,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Deep => "deep",
            Self::Child => "child",
        }
    }

    /// Strict parse including legacy aliases — `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Self::User),
            "deep" | "test" | "derin" => Some(Self::Deep),
            "child" | "cocuk" => Some(Self::Child),
            _ => None,
        }
    }
}

/// Reply language. Turkish is the configured fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Tr,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tr => "tr",
            Self::En => "en",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tr" => Some(Self::Tr),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

/// Inbound ask body. Several generations of clients are live at once, so the
/// same selector can arrive as `gate_mode`, as the overloaded legacy `mode`,
/// or inline in the text — the normalizer reconciles them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    pub message: Option<String>,
    pub question: Option<String>,
    pub session_id: Option<String>,
    pub domain: Option<String>,
    pub gate_mode: Option<String>,
    pub persona: Option<String>,
    pub plate: Option<String>,
    pub lang: Option<String>,
    /// Legacy single field: may hold a gate mode or a persona value.
    pub mode: Option<String>,
}

impl AskRequest {
    /// The message body, whichever field the client used.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.question.as_deref())
            .unwrap_or("")
    }
}

/// Canonical per-request context after normalization. Exactly one domain and
/// one gate mode, no matter how many input shapes were present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub domain: String,
    pub gate_mode: GateMode,
    pub persona: Persona,
    pub plate: Option<String>,
    pub lang: Lang,
}

/// A labeled text block inside a module answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    pub text: String,
}

impl Section {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { label: label.into(), text: text.into() }
    }
}

/// Structured answer produced by a module handler. Built fresh per call.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutput {
    pub module: String,
    pub title: String,
    pub answer: String,
    pub sections: Vec<Section>,
    pub tags: Vec<String>,
}

impl ModuleOutput {
    /// Plain-text output with no sections or tags.
    pub fn text(module: impl Into<String>, title: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            title: title.into(),
            answer: answer.into(),
            sections: Vec::new(),
            tags: Vec::new(),
        }
    }
}
