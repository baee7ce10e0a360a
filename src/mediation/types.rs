use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification of a UI change somewhere on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiStateChangeEvent {
    /// Package of the application that produced the change
    pub source_package: String,
}

impl UiStateChangeEvent {
    pub fn new(source_package: impl Into<String>) -> Self {
        Self {
            source_package: source_package.into(),
        }
    }
}

/// Why an event was filtered out before any search happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotTargetPackage,
    NoActiveWindow,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotTargetPackage => "not target package",
            SkipReason::NoActiveWindow => "no active window",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SEARCH_ABORTED_PREFIX: &str = "search aborted: ";

/// Result of handling one event. Every variant is a normal return value;
/// none of them represents a failure escaping the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MediationOutcome {
    /// Event was filtered before searching
    Skipped(SkipReason),
    /// No node matched any configured text
    NotFound,
    /// Matching nodes exist but none is clickable
    NoClickableMatch,
    /// Click dispatched and accepted; carries the clicked node's text
    Acted(String),
    /// Platform rejected the click
    ActionFailed,
    /// Platform raised a failure during dispatch
    ActionError(String),
}

impl MediationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            MediationOutcome::Skipped(_) => OutcomeKind::Skipped,
            MediationOutcome::NotFound => OutcomeKind::NotFound,
            MediationOutcome::NoClickableMatch => OutcomeKind::NoClickableMatch,
            MediationOutcome::Acted(_) => OutcomeKind::Acted,
            MediationOutcome::ActionFailed => OutcomeKind::ActionFailed,
            MediationOutcome::ActionError(_) => OutcomeKind::ActionError,
        }
    }

    /// `ActionError` for a failure raised while walking the tree, before any
    /// node was selected for clicking
    pub fn search_aborted(message: impl fmt::Display) -> Self {
        MediationOutcome::ActionError(format!("{}{}", SEARCH_ABORTED_PREFIX, message))
    }

    pub fn is_search_aborted(&self) -> bool {
        matches!(self, MediationOutcome::ActionError(message) if message.starts_with(SEARCH_ABORTED_PREFIX))
    }

    /// Whether a click was dispatched to the platform for this outcome
    pub fn dispatched(&self) -> bool {
        match self {
            MediationOutcome::Acted(_) | MediationOutcome::ActionFailed => true,
            MediationOutcome::ActionError(_) => !self.is_search_aborted(),
            _ => false,
        }
    }

    /// Free-form detail carried by the variant, if any
    pub fn detail(&self) -> Option<String> {
        match self {
            MediationOutcome::Skipped(reason) => Some(reason.to_string()),
            MediationOutcome::Acted(text) => Some(text.clone()),
            MediationOutcome::ActionError(message) => Some(message.clone()),
            _ => None,
        }
    }
}

/// Fieldless mirror of [`MediationOutcome`] for counting and storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Skipped,
    NotFound,
    NoClickableMatch,
    Acted,
    ActionFailed,
    ActionError,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 6] = [
        OutcomeKind::Skipped,
        OutcomeKind::NotFound,
        OutcomeKind::NoClickableMatch,
        OutcomeKind::Acted,
        OutcomeKind::ActionFailed,
        OutcomeKind::ActionError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::NoClickableMatch => "no_clickable_match",
            OutcomeKind::Acted => "acted",
            OutcomeKind::ActionFailed => "action_failed",
            OutcomeKind::ActionError => "action_error",
        }
    }
}

impl std::str::FromStr for OutcomeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutcomeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// How node text is compared against configured match texts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Node text must equal the configured text exactly
    #[default]
    Exact,
    /// Node text must contain the configured text, ignoring case
    ContainsIgnoreCase,
}

impl MatchMode {
    pub fn matches(&self, node_text: &str, wanted: &str) -> bool {
        match self {
            MatchMode::Exact => node_text == wanted,
            MatchMode::ContainsIgnoreCase => node_text
                .to_lowercase()
                .contains(&wanted.to_lowercase()),
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "contains" | "contains_ignore_case" => Ok(MatchMode::ContainsIgnoreCase),
            other => Err(format!("unknown match mode: {}", other)),
        }
    }
}
