use crate::catalog::Challenge;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SEED_MARKUP: &str = r#"<h1>Hello, Tinkerpad!</h1>
<p id="message">Edit the code and press Run.</p>
"#;

pub const SEED_STYLE: &str = r#"body {
  font-family: "Inter", sans-serif;
  margin: 2rem;
}

h1 {
  color: #3b82f6;
}
"#;

pub const SEED_BEHAVIOR: &str = r#"const message = document.getElementById("message");
message.textContent = "Ready.";
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    Markup,
    Style,
    Behavior,
}

impl BufferKind {
    pub const ALL: [BufferKind; 3] = [Self::Markup, Self::Style, Self::Behavior];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Style => "style",
            Self::Behavior => "behavior",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Style => "CSS",
            Self::Behavior => "JavaScript",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three buffer texts at a point in time. This is the shape that crosses
/// the persistence and share-link boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub markup: String,
    pub style: String,
    pub behavior: String,
}

impl BufferSnapshot {
    pub fn seed() -> Self {
        Self {
            markup: SEED_MARKUP.to_string(),
            style: SEED_STYLE.to_string(),
            behavior: SEED_BEHAVIOR.to_string(),
        }
    }
}

/// Holds exactly one current text value per buffer kind plus which kind is
/// active in the editor. Buffers are never destroyed during a session, only
/// replaced wholesale by `load_challenge`, `load_snapshot` or
/// `reset_to_default`.
#[derive(Debug, Clone)]
pub struct SourceBufferSet {
    markup: String,
    style: String,
    behavior: String,
    active: BufferKind,
    last_edited: Option<BufferKind>,
    seed: BufferSnapshot,
}

impl SourceBufferSet {
    /// `seed` is the session's initial content; `reset_to_default` returns to
    /// it, not to whatever challenge was loaded later.
    pub fn new(seed: BufferSnapshot) -> Self {
        Self {
            markup: seed.markup.clone(),
            style: seed.style.clone(),
            behavior: seed.behavior.clone(),
            active: BufferKind::Behavior,
            last_edited: None,
            seed,
        }
    }

    pub fn text(&self, kind: BufferKind) -> &str {
        match kind {
            BufferKind::Markup => &self.markup,
            BufferKind::Style => &self.style,
            BufferKind::Behavior => &self.behavior,
        }
    }

    /// Direct editor access; callers report edits through `mark_edited`.
    pub fn text_mut(&mut self, kind: BufferKind) -> &mut String {
        match kind {
            BufferKind::Markup => &mut self.markup,
            BufferKind::Style => &mut self.style,
            BufferKind::Behavior => &mut self.behavior,
        }
    }

    /// Replaces one buffer unconditionally; no validation.
    pub fn set_text(&mut self, kind: BufferKind, text: impl Into<String>) {
        *self.text_mut(kind) = text.into();
        self.last_edited = Some(kind);
    }

    pub fn mark_edited(&mut self, kind: BufferKind) {
        self.last_edited = Some(kind);
    }

    pub fn active(&self) -> BufferKind {
        self.active
    }

    /// UI state only; buffer contents are untouched.
    pub fn set_active(&mut self, kind: BufferKind) {
        self.active = kind;
    }

    pub fn last_edited(&self) -> Option<BufferKind> {
        self.last_edited
    }

    /// Atomically replaces all three buffers with the challenge starter code
    /// and moves focus to the behavior buffer.
    pub fn load_challenge(&mut self, challenge: &Challenge) {
        self.markup = challenge.starter_code.markup.clone();
        self.style = challenge.starter_code.style.clone();
        self.behavior = challenge.starter_code.behavior.clone();
        self.active = BufferKind::Behavior;
        self.last_edited = None;
    }

    /// Replaces all three buffers from a snapshot (restored project or
    /// imported share token). Active kind is left as-is.
    pub fn load_snapshot(&mut self, snapshot: &BufferSnapshot) {
        self.markup = snapshot.markup.clone();
        self.style = snapshot.style.clone();
        self.behavior = snapshot.behavior.clone();
        self.last_edited = None;
    }

    /// Returns to the session's initial seed text, not the currently loaded
    /// challenge's starter.
    pub fn reset_to_default(&mut self) {
        let seed = self.seed.clone();
        self.load_snapshot(&seed);
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            markup: self.markup.clone(),
            style: self.style.clone(),
            behavior: self.behavior.clone(),
        }
    }
}

impl Default for SourceBufferSet {
    fn default() -> Self {
        Self::new(BufferSnapshot::seed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StarterCode;

    fn sample_challenge() -> Challenge {
        Challenge {
            id: "test.counter".to_string(),
            title: "Counter".to_string(),
            description: "A click counter".to_string(),
            category: "interactivity".to_string(),
            starter_code: StarterCode {
                markup: "<button id=\"b\">0</button>".to_string(),
                style: "button { font-size: 2rem; }".to_string(),
                behavior: "let n = 0;".to_string(),
            },
        }
    }

    #[test]
    fn set_text_leaves_other_buffers_untouched() {
        let mut buffers = SourceBufferSet::default();
        let markup_before = buffers.text(BufferKind::Markup).to_string();
        let behavior_before = buffers.text(BufferKind::Behavior).to_string();

        buffers.set_text(BufferKind::Style, "p { color: red }");

        assert_eq!(buffers.text(BufferKind::Style), "p { color: red }");
        assert_eq!(buffers.text(BufferKind::Markup), markup_before);
        assert_eq!(buffers.text(BufferKind::Behavior), behavior_before);
        assert_eq!(buffers.last_edited(), Some(BufferKind::Style));
    }

    #[test]
    fn set_active_does_not_affect_contents() {
        let mut buffers = SourceBufferSet::default();
        let snapshot_before = buffers.snapshot();

        buffers.set_active(BufferKind::Markup);

        assert_eq!(buffers.active(), BufferKind::Markup);
        assert_eq!(buffers.snapshot(), snapshot_before);
    }

    #[test]
    fn load_challenge_replaces_all_three_buffers() {
        let mut buffers = SourceBufferSet::default();
        buffers.set_active(BufferKind::Style);
        let challenge = sample_challenge();

        buffers.load_challenge(&challenge);

        assert_eq!(
            buffers.text(BufferKind::Markup),
            challenge.starter_code.markup
        );
        assert_eq!(buffers.text(BufferKind::Style), challenge.starter_code.style);
        assert_eq!(
            buffers.text(BufferKind::Behavior),
            challenge.starter_code.behavior
        );
        assert_eq!(buffers.active(), BufferKind::Behavior);
    }

    #[test]
    fn reset_returns_to_session_seed_not_challenge_starter() {
        let mut buffers = SourceBufferSet::default();
        buffers.load_challenge(&sample_challenge());
        buffers.set_text(BufferKind::Markup, "<div>scratch</div>");

        buffers.reset_to_default();

        assert_eq!(buffers.snapshot(), BufferSnapshot::seed());
    }

    #[test]
    fn reset_honours_a_custom_session_seed() {
        let seed = BufferSnapshot {
            markup: "<p>restored</p>".to_string(),
            style: String::new(),
            behavior: "console.log('restored');".to_string(),
        };
        let mut buffers = SourceBufferSet::new(seed.clone());
        buffers.set_text(BufferKind::Behavior, "changed");

        buffers.reset_to_default();

        assert_eq!(buffers.snapshot(), seed);
    }
}
