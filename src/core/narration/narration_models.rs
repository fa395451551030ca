use std::fmt;

use tokio::sync::mpsc;

/// Which trigger control drives a narration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NarrationTarget {
    /// The dashboard-wide "read aloud" control.
    Main,
    /// The control on one report card, keyed by file name.
    Card(String),
}

impl fmt::Display for NarrationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrationTarget::Main => f.write_str("main control"),
            NarrationTarget::Card(name) => write!(f, "card {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationState {
    Idle,
    Loading,
    Speaking,
    Paused,
    Error,
}

impl fmt::Display for NarrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NarrationState::Idle => "idle",
            NarrationState::Loading => "loading",
            NarrationState::Speaking => "speaking",
            NarrationState::Paused => "paused",
            NarrationState::Error => "error",
        };
        f.write_str(label)
    }
}

/// What a trigger control currently shows.
///
/// The idle label/icon are captured at creation and restored whenever narration
/// on the control ends, is stopped or recovers from an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    idle_label: String,
    idle_icon: String,
    pub label: String,
    pub icon: String,
    pub state: NarrationState,
    /// Narration session currently bound to the control.
    pub(super) session: Option<u64>,
}

impl TriggerControl {
    pub fn new(label: impl Into<String>, icon: impl Into<String>) -> Self {
        let label = label.into();
        let icon = icon.into();
        Self {
            idle_label: label.clone(),
            idle_icon: icon.clone(),
            label,
            icon,
            state: NarrationState::Idle,
            session: None,
        }
    }

    pub fn for_target(target: &NarrationTarget) -> Self {
        match target {
            NarrationTarget::Main => Self::new("Read summary aloud", "🔊"),
            NarrationTarget::Card(_) => Self::new("Listen", "🎧"),
        }
    }

    pub fn show_loading(&mut self, session: u64) {
        self.state = NarrationState::Loading;
        self.session = Some(session);
        self.label = "Preparing...".to_string();
        self.icon = "⏳".to_string();
    }

    pub fn show_speaking(&mut self) {
        self.state = NarrationState::Speaking;
        self.label = "Reading...".to_string();
        self.icon = "🗣️".to_string();
    }

    pub fn show_paused(&mut self) {
        self.state = NarrationState::Paused;
        self.label = "Paused".to_string();
        self.icon = "⏸️".to_string();
    }

    pub fn show_error(&mut self, message: &str) {
        self.state = NarrationState::Error;
        self.label = format!("Narration failed: {}", message);
        self.icon = "⚠️".to_string();
    }

    pub fn reset(&mut self) {
        self.state = NarrationState::Idle;
        self.session = None;
        self.label = self.idle_label.clone();
        self.icon = self.idle_icon.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier the engine accepts when asked for this voice.
    pub id: String,
    pub name: String,
}

/// One piece of text handed to a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub session: u64,
    pub text: String,
    /// `None` leaves voice choice to the engine.
    pub voice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEventKind {
    Started,
    Finished,
    Failed(String),
    /// The error display on a control has been shown long enough.
    ErrorExpired,
}

/// Reported back to the narrator for a given session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationEvent {
    pub session: u64,
    pub kind: NarrationEventKind,
}

impl NarrationEvent {
    pub fn started(session: u64) -> Self {
        Self {
            session,
            kind: NarrationEventKind::Started,
        }
    }

    pub fn finished(session: u64) -> Self {
        Self {
            session,
            kind: NarrationEventKind::Finished,
        }
    }

    pub fn failed(session: u64, message: impl Into<String>) -> Self {
        Self {
            session,
            kind: NarrationEventKind::Failed(message.into()),
        }
    }
}

pub type NarrationEventSender = mpsc::UnboundedSender<NarrationEvent>;
pub type NarrationEventReceiver = mpsc::UnboundedReceiver<NarrationEvent>;

/// Text chosen for narration and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationScript {
    pub text: String,
    /// Set when a storytelling companion replaced the report content.
    pub companion_path: Option<String>,
}
