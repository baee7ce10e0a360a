use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{EventSource, SourceSignal};
use crate::mediation::{UiNode, UiStateChangeEvent};

enum Delivery<N> {
    Event {
        event: UiStateChangeEvent,
        window: Option<N>,
    },
    Interrupted,
}

/// Sending half given to the platform bridge
pub struct PlatformHandle<N> {
    tx: mpsc::Sender<Delivery<N>>,
}

impl<N> Clone for PlatformHandle<N> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<N: Send> PlatformHandle<N> {
    /// Deliver an event with the window tree captured at delivery time.
    /// Returns `false` once the service has stopped.
    pub async fn push_event(&self, event: UiStateChangeEvent, window: Option<N>) -> bool {
        self.tx.send(Delivery::Event { event, window }).await.is_ok()
    }

    pub async fn interrupt(&self) -> bool {
        self.tx.send(Delivery::Interrupted).await.is_ok()
    }
}

/// Event source fed by a live platform bridge over a bounded channel
pub struct ChannelSource<N> {
    rx: mpsc::Receiver<Delivery<N>>,
}

impl<N: UiNode + Send> ChannelSource<N> {
    pub fn new(capacity: usize) -> (PlatformHandle<N>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (PlatformHandle { tx }, Self { rx })
    }
}

#[async_trait]
impl<N: UiNode + Send> EventSource for ChannelSource<N> {
    type Node = N;

    async fn next_signal(&mut self) -> Option<SourceSignal<N>> {
        match self.rx.recv().await? {
            Delivery::Event { event, window } => Some(SourceSignal::Event { event, window }),
            Delivery::Interrupted => Some(SourceSignal::Interrupted),
        }
    }
}
