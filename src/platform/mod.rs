//! Event sources feeding the mediation service
//!
//! The host platform pushes UI-state-change notifications and exposes the
//! foreground window's element tree. [`EventSource`] abstracts both so the
//! service loop does not care whether signals come from a live bridge
//! ([`ChannelSource`]) or a recorded script ([`ReplaySource`]).

pub mod channel;
pub mod replay;
pub mod snapshot;

use async_trait::async_trait;

use crate::mediation::{UiNode, UiStateChangeEvent};

pub use channel::{ChannelSource, PlatformHandle};
pub use replay::{ReplaySource, ReplayStep};
pub use snapshot::{ClickBehavior, NodeRef, SnapshotNode};

/// One delivery from the platform
///
/// An event owns the foreground window captured with it. Whoever receives the
/// signal takes the only handle the source had, so the tree is released as
/// soon as the event has been handled.
#[derive(Debug)]
pub enum SourceSignal<N> {
    Event {
        event: UiStateChangeEvent,
        window: Option<N>,
    },
    /// The platform interrupted the service
    Interrupted,
}

#[async_trait]
pub trait EventSource: Send {
    type Node: UiNode + Send;

    /// Wait for the next signal. `None` means the platform tore the service down.
    async fn next_signal(&mut self) -> Option<SourceSignal<Self::Node>>;
}
