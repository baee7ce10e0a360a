use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

use super::snapshot::NodeRef;
use super::{EventSource, SourceSignal};
use crate::mediation::UiStateChangeEvent;

/// One scripted platform delivery
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayStep {
    Event {
        source_package: String,
        #[serde(default)]
        window: Option<NodeRef>,
    },
    Interrupt,
}

/// Plays back a recorded sequence of platform deliveries
pub struct ReplaySource {
    steps: VecDeque<ReplayStep>,
}

impl ReplaySource {
    pub fn new(steps: Vec<ReplayStep>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Load a JSON array of steps
    pub fn from_json(raw: &str) -> Result<Self> {
        let steps: Vec<ReplayStep> = serde_json::from_str(raw).context("Invalid replay script")?;
        Ok(Self::new(steps))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    type Node = NodeRef;

    async fn next_signal(&mut self) -> Option<SourceSignal<NodeRef>> {
        match self.steps.pop_front()? {
            ReplayStep::Event {
                source_package,
                window,
            } => Some(SourceSignal::Event {
                event: UiStateChangeEvent::new(source_package),
                window,
            }),
            ReplayStep::Interrupt => Some(SourceSignal::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_yields_steps_in_order() {
        let mut source = ReplaySource::from_json(
            r#"[
                {"type": "event", "source_package": "com.gojek.app",
                 "window": {"text": "Pesan", "clickable": true}},
                {"type": "interrupt"},
                {"type": "event", "source_package": "com.other.app"}
            ]"#,
        )
        .unwrap();
        assert_eq!(source.remaining(), 3);

        match source.next_signal().await {
            Some(SourceSignal::Event { event, window }) => {
                assert_eq!(event, UiStateChangeEvent::new("com.gojek.app"));
                assert_eq!(window.and_then(|w| w.text.clone()), Some("Pesan".to_string()));
            }
            other => panic!("expected an event, got {:?}", other),
        }

        assert!(matches!(source.next_signal().await, Some(SourceSignal::Interrupted)));

        assert!(matches!(
            source.next_signal().await,
            Some(SourceSignal::Event { window: None, .. })
        ));

        assert!(source.next_signal().await.is_none());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_rejects_malformed_script() {
        assert!(ReplaySource::from_json(r#"[{"type": "teleport"}]"#).is_err());
    }
}
